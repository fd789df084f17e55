//! Key namespacing for the metric store
//!
//! Every stored value is addressed by `<host>:<domain>:<kind>:<resource>`.
//! Keys are derived here and nowhere else, so compatibility with anything
//! already persisted under this scheme stays testable in one place.

use crate::{Domain, HostIdentity, storage::error::StorageError};

/// What a key points at: the latest snapshot or the bounded history series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Current,
    History,
}

impl KeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Current => "current",
            KeyKind::History => "history",
        }
    }
}

/// Derives collision-free storage keys scoped to one host.
///
/// Pure formatting, no side effects. The only failure mode is empty input,
/// which is rejected synchronously.
#[derive(Debug, Clone)]
pub struct KeySpace {
    host_id: String,
}

impl KeySpace {
    pub fn new(host: &HostIdentity) -> Result<Self, StorageError> {
        if host.id.trim().is_empty() {
            return Err(StorageError::Validation(
                "host id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            host_id: host.id.clone(),
        })
    }

    /// Format the storage key for one resource.
    ///
    /// Mount points and other resources containing `/` are sanitized to `_`
    /// so the key stays a flat, separator-safe string.
    pub fn format_key(
        &self,
        domain: Domain,
        kind: KeyKind,
        resource: &str,
    ) -> Result<String, StorageError> {
        if resource.trim().is_empty() {
            return Err(StorageError::Validation(format!(
                "empty resource for domain {domain}"
            )));
        }

        Ok(format!(
            "{}:{}:{}:{}",
            self.host_id,
            domain.as_str(),
            kind.as_str(),
            sanitize_resource(resource)
        ))
    }

    /// Wildcard pattern for bulk enumeration by domain. Read paths only.
    pub fn format_pattern(&self, domain: Domain, kind: KeyKind) -> String {
        format!(
            "{}:{}:{}:*",
            self.host_id,
            domain.as_str(),
            kind.as_str()
        )
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }
}

/// Replace path separators so `/var/lib` becomes `_var_lib`, matching the
/// disk key convention of the persisted format.
pub fn sanitize_resource(resource: &str) -> String {
    resource.replace('/', "_")
}
