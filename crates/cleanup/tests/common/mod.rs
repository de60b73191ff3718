//! In-memory `PackageRegistry` used by the stage tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cleanup::{
    OwnerName, OwnerScope, PackageName, PackageRegistry, PackageVersion, PackageVersionId,
    RegistryError, Timestamp,
};

/// Fixed "now" used by every test: 2026-10-19T12:00:00Z.
pub fn now() -> Timestamp {
    Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap())
}

/// RFC 3339 string for `days` before [`now`].
pub fn days_ago(days: u32) -> String {
    now().days_before(days).unwrap().to_iso8601()
}

pub fn version(id: u64, tags: &[&str], updated_at: Option<&str>) -> PackageVersion {
    PackageVersion {
        id: PackageVersionId::new(id),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        updated_at: updated_at.map(String::from),
        created_at: None,
    }
}

pub fn api_error(status: u16, message: &str) -> RegistryError {
    RegistryError::Api {
        status,
        message: message.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        scope: OwnerScope,
        image: String,
    },
    Delete {
        scope: OwnerScope,
        image: String,
        id: u64,
    },
}

type Key = (OwnerScope, String);

/// Registry fake. Unconfigured listings answer 404; unconfigured deletes succeed.
#[derive(Default)]
pub struct FakeRegistry {
    listings: HashMap<Key, Result<Vec<PackageVersion>, RegistryError>>,
    deletes: HashMap<(OwnerScope, u64), RegistryError>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(
        mut self,
        scope: OwnerScope,
        image: &str,
        result: Result<Vec<PackageVersion>, RegistryError>,
    ) -> Self {
        self.listings.insert((scope, image.to_string()), result);
        self
    }

    pub fn with_delete_error(mut self, scope: OwnerScope, id: u64, error: RegistryError) -> Self {
        self.deletes.insert((scope, id), error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageRegistry for FakeRegistry {
    async fn list_versions(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        scope: OwnerScope,
    ) -> Result<Vec<PackageVersion>, RegistryError> {
        let image = format!("{owner}/{package}");
        self.calls.lock().unwrap().push(Call::List {
            scope,
            image: image.clone(),
        });
        self.listings
            .get(&(scope, image))
            .cloned()
            .unwrap_or_else(|| Err(api_error(404, "Not Found")))
    }

    async fn delete_version(
        &self,
        owner: &OwnerName,
        package: &PackageName,
        id: PackageVersionId,
        scope: OwnerScope,
    ) -> Result<(), RegistryError> {
        self.calls.lock().unwrap().push(Call::Delete {
            scope,
            image: format!("{owner}/{package}"),
            id: id.as_u64(),
        });
        match self.deletes.get(&(scope, id.as_u64())) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
