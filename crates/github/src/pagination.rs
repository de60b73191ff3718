//! `Link` response header handling for paginated list endpoints.

/// Returns the URL tagged `rel="next"` in an RFC 8288 `Link` header value.
///
/// GitHub sends entries such as
/// `<https://api.github.com/...&page=2>; rel="next", <...&page=5>; rel="last"`.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';').map(str::trim);
        let target = parts.next()?.strip_prefix('<')?.strip_suffix('>')?;
        parts
            .any(|param| {
                param
                    .strip_prefix("rel=")
                    .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
                    .unwrap_or(false)
            })
            .then(|| target.to_string())
    })
}
