//! The bounded metric store
//!
//! This module provides a trait-based abstraction over the store holding
//! current-value snapshots and bounded history series.
//!
//! ## Design
//!
//! - **Trait-based**: `MetricsBackend` allows swapping implementations
//! - **Async**: all operations are async for compatibility with Tokio actors
//! - **Bounded**: every history series is trimmed to a configured cap after
//!   each append, so memory use stays flat no matter how long the process runs
//!
//! Writers never observe an error for an absent key; querying one returns an
//! empty result instead.

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::{CurrentEntry, HealthStatus, MetricsBackend};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
