//! Storage backend trait definition

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StorageResult;
use crate::Sample;

/// Latest field mapping for one (domain, resource), replaced wholesale on
/// every collection cycle.
#[derive(Debug, Clone)]
pub struct CurrentEntry {
    pub fields: HashMap<String, String>,
    pub captured_at: DateTime<Utc>,
}

/// Health status of the storage backend
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,
}

/// Trait for metric storage backends
///
/// Implementations must be `Send + Sync` as they are shared across the
/// collector and evaluator tasks.
///
/// ## Concurrency contract
///
/// - Mutations to the *same* key are serialized: a reader never observes a
///   half-applied append/trim or field replacement.
/// - Mutations to *different* keys must not block each other.
///
/// ## Error handling
///
/// Absent keys are empty results, never errors. `StorageError::Unavailable`
/// is transient; callers degrade and retry on their next cycle.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Append one sample to the history series for `key`, creating the
    /// series if absent, then trim it to the retention cap.
    ///
    /// Appends may arrive out of timestamp order; the trim step always
    /// evicts the smallest timestamps, not the oldest arrivals.
    async fn append(&self, key: &str, sample: Sample) -> StorageResult<()>;

    /// All retained samples for `key`, most-recent first.
    ///
    /// Finite and restartable: no cursor state is kept across calls, and a
    /// reissued query with no intervening writes returns the same sequence.
    async fn query(&self, key: &str) -> StorageResult<Vec<Sample>>;

    /// Number of retained samples for `key` (0 for an absent key).
    async fn size(&self, key: &str) -> StorageResult<usize>;

    /// Replace the entire field mapping stored under `key`.
    async fn set_current(&self, key: &str, fields: HashMap<String, String>) -> StorageResult<()>;

    /// The field mapping stored under `key`, if any.
    async fn get_current(&self, key: &str) -> StorageResult<Option<CurrentEntry>>;

    /// All current-value keys matching a wildcard pattern (`prefix:*`).
    async fn list_current_keys(&self, pattern: &str) -> StorageResult<Vec<String>>;

    /// Lightweight check that the backend is operational.
    async fn health_check(&self) -> StorageResult<HealthStatus>;
}
