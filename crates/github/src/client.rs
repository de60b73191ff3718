//! [`PackageRegistry`] over the GitHub Packages REST API.

use std::collections::HashSet;

use async_trait::async_trait;
use cleanup::{
    OwnerName, OwnerScope, PackageName, PackageRegistry, PackageVersion, PackageVersionId,
    RegistryError,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, ClientBuilder, Response, Url};
use thiserror::Error;
use tracing::{debug, warn};

use crate::pagination::next_link;
use crate::wire::{error_message, PackageVersionResponse};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Versions requested per page when listing.
pub const PAGE_SIZE: u32 = 100;

const API_VERSION: &str = "2022-11-28";
const PACKAGE_TYPE: &str = "container";

/// Connection settings for [`GitHubPackagesClient`].
#[derive(Clone)]
pub struct GitHubConfig {
    /// REST API base, e.g. `https://api.github.com` or a GHES `https://host/api/v3`.
    pub api_url: String,
    /// Token with package read and delete permission. Anonymous when `None`.
    pub token: Option<String>,
    /// `User-Agent` sent with every request; GitHub rejects requests without one.
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: concat!("ghcr-cleanup/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// The client could not be constructed from its [`GitHubConfig`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The API base URL is not an absolute hierarchical URL.
    #[error("Invalid GitHub API URL '{url}'")]
    InvalidApiUrl {
        /// The rejected URL.
        url: String,
    },

    /// The token contains characters that cannot appear in an HTTP header.
    #[error("GitHub token contains characters that are not valid in an HTTP header")]
    InvalidToken,

    /// The underlying HTTP client could not be initialised.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// GitHub Packages client for container packages.
#[derive(Debug, Clone)]
pub struct GitHubPackagesClient {
    http: Client,
    api_url: Url,
}

impl GitHubPackagesClient {
    /// Builds a client with GitHub's JSON media type, API version and
    /// (when configured) bearer token set as default headers.
    pub fn new(config: GitHubConfig) -> Result<Self, ClientBuildError> {
        Self::with_builder(config, Client::builder())
    }

    fn with_builder(config: GitHubConfig, builder: ClientBuilder) -> Result<Self, ClientBuildError> {
        let api_url = Url::parse(config.api_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientBuildError::InvalidApiUrl {
                url: config.api_url.clone(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientBuildError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = builder
            .user_agent(config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, api_url })
    }

    /// `{api}/{orgs|users}/{owner}/packages/container/{package}/versions`, with
    /// each segment percent-encoded (so `a/b` becomes `a%2Fb`).
    pub fn versions_url(&self, owner: &OwnerName, package: &PackageName, scope: OwnerScope) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                scope_segment(scope),
                owner.as_str(),
                "packages",
                PACKAGE_TYPE,
                package.as_str(),
                "versions",
            ]);
        }
        url
    }

    /// `versions_url` followed by `/{id}`.
    pub fn version_url(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        id: PackageVersionId,
        scope: OwnerScope,
    ) -> Url {
        let mut url = self.versions_url(owner, package, scope);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }
}

#[async_trait]
impl PackageRegistry for GitHubPackagesClient {
    async fn list_versions(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        scope: OwnerScope,
    ) -> Result<Vec<PackageVersion>, RegistryError> {
        let mut first = self.versions_url(owner, package, scope);
        first
            .query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string());

        let mut versions = Vec::new();
        let mut fetched = HashSet::new();
        let mut next = Some(first);
        while let Some(url) = next.take() {
            if !fetched.insert(url.clone()) {
                warn!(%url, "{owner}/{package}: pagination revisits a fetched page, stopping");
                break;
            }
            debug!(%url, scope = %scope, "Listing package versions page");
            let response = self.http.get(url).send().await.map_err(transport)?;
            let response = ensure_success(response).await?;

            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_link)
                .and_then(|link| Url::parse(&link).ok());

            let page: Vec<PackageVersionResponse> = response.json().await.map_err(transport)?;
            versions.extend(page.into_iter().map(PackageVersion::from));
        }

        debug!(count = versions.len(), "{owner}/{package}: listed versions");
        Ok(versions)
    }

    async fn delete_version(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        id: PackageVersionId,
        scope: OwnerScope,
    ) -> Result<(), RegistryError> {
        let url = self.version_url(owner, package, id, scope);
        debug!(%url, scope = %scope, "Deleting package version");
        let response = self.http.delete(url).send().await.map_err(transport)?;
        ensure_success(response).await?;
        Ok(())
    }
}

fn scope_segment(scope: OwnerScope) -> &'static str {
    match scope {
        OwnerScope::Organization => "orgs",
        OwnerScope::User => "users",
    }
}

fn transport(error: reqwest::Error) -> RegistryError {
    RegistryError::Transport {
        message: error.to_string(),
    }
}

/// Passes 2xx responses through and turns anything else into
/// [`RegistryError::Api`], preferring GitHub's JSON `message` over the reason phrase.
async fn ensure_success(response: Response) -> Result<Response, RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .or_else(|| status.canonical_reason().map(String::from))
        .unwrap_or_else(|| "unknown".to_string());
    Err(RegistryError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(api_url: &str) -> GitHubPackagesClient {
        GitHubPackagesClient::new(GitHubConfig {
            api_url: api_url.into(),
            token: Some("ghs_example".into()),
            ..GitHubConfig::default()
        })
        .expect("client builds")
    }

    fn owner(value: &str) -> OwnerName {
        OwnerName::new(value).unwrap()
    }

    fn package(value: &str) -> PackageName {
        PackageName::new(value).unwrap()
    }

    #[rstest]
    #[case(
        OwnerScope::Organization,
        "https://api.github.com/orgs/acme/packages/container/app/versions"
    )]
    #[case(
        OwnerScope::User,
        "https://api.github.com/users/acme/packages/container/app/versions"
    )]
    fn builds_versions_url_per_scope(#[case] scope: OwnerScope, #[case] expected: &str) {
        let url = client(DEFAULT_API_URL).versions_url(&owner("acme"), &package("app"), scope);
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn encodes_nested_package_names() {
        let url = client(DEFAULT_API_URL).version_url(
            &owner("acme"),
            &package("tools/builder"),
            PackageVersionId::new(42),
            OwnerScope::Organization,
        );
        assert_eq!(
            url.as_str(),
            "https://api.github.com/orgs/acme/packages/container/tools%2Fbuilder/versions/42"
        );
    }

    #[test]
    fn keeps_enterprise_api_prefix() {
        let url = client("https://github.example.com/api/v3/").versions_url(
            &owner("acme"),
            &package("app"),
            OwnerScope::User,
        );
        assert_eq!(
            url.as_str(),
            "https://github.example.com/api/v3/users/acme/packages/container/app/versions"
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn rejects_unusable_api_url(#[case] api_url: &str) {
        let result = GitHubPackagesClient::new(GitHubConfig {
            api_url: api_url.into(),
            ..GitHubConfig::default()
        });
        assert!(matches!(result, Err(ClientBuildError::InvalidApiUrl { .. })));
    }

    #[test]
    fn rejects_token_with_newline() {
        let result = GitHubPackagesClient::new(GitHubConfig {
            token: Some("abc\ndef".into()),
            ..GitHubConfig::default()
        });
        assert!(matches!(result, Err(ClientBuildError::InvalidToken)));
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = GitHubConfig {
            token: Some("ghs_secret".into()),
            ..GitHubConfig::default()
        };
        let text = format!("{config:?}");
        assert!(!text.contains("ghs_secret"));
        assert!(text.contains("<redacted>"));
    }

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(
            http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[rstest]
    #[case(404, r#"{"message":"Package not found."}"#, "Package not found.")]
    #[case(422, "", "Unprocessable Entity")]
    #[case(502, "<html>bad gateway</html>", "Bad Gateway")]
    #[case(599, "", "unknown")]
    #[tokio::test]
    async fn maps_error_status_and_message(
        #[case] status: u16,
        #[case] body: &'static str,
        #[case] expected: &str,
    ) {
        let error = ensure_success(response(status, body)).await.unwrap_err();
        assert_eq!(
            error,
            RegistryError::Api {
                status,
                message: expected.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn wrong_scope_statuses_reach_the_domain() {
        let not_found = ensure_success(response(404, "")).await.unwrap_err();
        let unprocessable = ensure_success(response(422, "")).await.unwrap_err();
        let forbidden = ensure_success(response(403, "")).await.unwrap_err();
        assert!(not_found.is_wrong_scope());
        assert!(unprocessable.is_wrong_scope());
        assert!(!forbidden.is_wrong_scope());
        assert!(forbidden.is_forbidden());
    }

    #[rstest]
    #[case(200)]
    #[case(204)]
    #[tokio::test]
    async fn success_passes_through(#[case] status: u16) {
        let passed = ensure_success(response(status, "[]")).await.unwrap();
        assert_eq!(passed.status().as_u16(), status);
    }

    mod listing {
        use std::sync::{Arc, Mutex};

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        use super::*;

        struct Reply {
            status: u16,
            link: Option<String>,
            body: String,
        }

        impl Reply {
            fn ok(body: &str) -> Self {
                Self {
                    status: 200,
                    link: None,
                    body: body.to_string(),
                }
            }

            fn with_next(mut self, url: String) -> Self {
                self.link = Some(format!("<{url}>; rel=\"next\""));
                self
            }
        }

        /// Serves one request per connection. `handler` receives the base URL
        /// and the request target (path and query).
        async fn serve<F>(handler: F) -> (String, Arc<Mutex<Vec<String>>>)
        where
            F: Fn(&str, &str) -> Reply + Send + Sync + 'static,
        {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));

            let server_base = base.clone();
            let seen = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&request);
                    let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target.clone());

                    let reply = handler(&server_base, &target);
                    let mut head = format!(
                        "HTTP/1.1 {} Reply\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    if let Some(link) = &reply.link {
                        head.push_str(&format!("link: {link}\r\n"));
                    }
                    head.push_str("\r\n");
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(reply.body.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            (base, requests)
        }

        fn local_client(base: &str) -> GitHubPackagesClient {
            GitHubPackagesClient::with_builder(
                GitHubConfig {
                    api_url: base.to_string(),
                    token: Some("ghs_example".into()),
                    ..GitHubConfig::default()
                },
                Client::builder().no_proxy(),
            )
            .unwrap()
        }

        const FIRST_PAGE: &str = "/orgs/acme/packages/container/app/versions?per_page=100";

        #[tokio::test]
        async fn follows_next_links_to_the_last_page() {
            let (base, requests) = serve(|base, target| {
                if target.ends_with("&page=2") {
                    Reply::ok(r#"[{"id": 2, "metadata": {"container": {"tags": ["app-pr2-abcdef1"]}}}]"#)
                        .with_next(format!("{base}{FIRST_PAGE}&page=3"))
                } else if target.ends_with("&page=3") {
                    Reply::ok(r#"[{"id": 3}]"#)
                } else {
                    Reply::ok(r#"[{"id": 1, "updated_at": "2026-10-01T00:00:00Z"}]"#)
                        .with_next(format!("{base}{FIRST_PAGE}&page=2"))
                }
            })
            .await;

            let versions = local_client(&base)
                .list_versions(&owner("acme"), &package("app"), OwnerScope::Organization)
                .await
                .unwrap();

            let ids: Vec<u64> = versions.iter().map(|v| v.id.as_u64()).collect();
            assert_eq!(ids, vec![1, 2, 3]);
            assert_eq!(versions[1].tags, vec!["app-pr2-abcdef1".to_string()]);
            assert_eq!(
                *requests.lock().unwrap(),
                vec![
                    FIRST_PAGE.to_string(),
                    format!("{FIRST_PAGE}&page=2"),
                    format!("{FIRST_PAGE}&page=3"),
                ]
            );
        }

        #[tokio::test]
        async fn stops_when_next_link_revisits_a_page() {
            let (base, requests) = serve(|base, target| {
                if target.ends_with("&page=2") {
                    Reply::ok(r#"[{"id": 2}]"#).with_next(format!("{base}{FIRST_PAGE}"))
                } else {
                    Reply::ok(r#"[{"id": 1}]"#).with_next(format!("{base}{FIRST_PAGE}&page=2"))
                }
            })
            .await;

            let versions = local_client(&base)
                .list_versions(&owner("acme"), &package("app"), OwnerScope::Organization)
                .await
                .unwrap();

            assert_eq!(versions.len(), 2);
            assert_eq!(requests.lock().unwrap().len(), 2);
        }

        #[tokio::test]
        async fn user_scope_not_found_is_reported_with_status() {
            let (base, requests) = serve(|_, _| Reply {
                status: 404,
                link: None,
                body: r#"{"message":"Not Found"}"#.to_string(),
            })
            .await;

            let error = local_client(&base)
                .list_versions(&owner("acme"), &package("app"), OwnerScope::User)
                .await
                .unwrap_err();

            assert!(error.is_wrong_scope());
            assert_eq!(error.message(), "Not Found");
            assert_eq!(
                *requests.lock().unwrap(),
                vec!["/users/acme/packages/container/app/versions?per_page=100".to_string()]
            );
        }

        #[tokio::test]
        async fn delete_targets_the_version_url() {
            let (base, requests) = serve(|_, _| Reply {
                status: 204,
                link: None,
                body: String::new(),
            })
            .await;

            local_client(&base)
                .delete_version(
                    &owner("acme"),
                    &package("tools/builder"),
                    PackageVersionId::new(42),
                    OwnerScope::Organization,
                )
                .await
                .unwrap();

            assert_eq!(
                *requests.lock().unwrap(),
                vec!["/orgs/acme/packages/container/tools%2Fbuilder/versions/42".to_string()]
            );
        }
    }
}
