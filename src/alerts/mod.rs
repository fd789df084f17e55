//! Alert lifecycle management
//!
//! An alert lives under a *dedupe key* and has exactly two states:
//!
//! ```text
//! Cleared --fire--> Active --resolve--> Cleared
//! ```
//!
//! `fire` while active is idempotent (no duplicate record); `resolve` while
//! cleared is a no-op. Records are never hard-deleted: resolved alerts stay
//! queryable through the per-source history.

pub mod notify;
pub mod rules;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use notify::{AlertEvent, BroadcastSink, NotificationSink, WebhookSink};
pub use rules::{AlertRule, AlertTransition, Comparator, CurrentView, RuleEngine, RuleScope};
pub use store::AlertStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
    Critical,
}

/// Enumerated cause of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    HighCpuUsage,
    HighMemoryUsage,
    DiskSpaceLow,
    DockerContainerDown,
    RtspStreamDown,
    NetworkBandwidthHigh,
    StorageError,
    SystemError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Opaque unique id
    pub id: String,

    /// Identity under which active/resolved state is tracked
    pub dedupe_key: String,

    pub message: String,
    pub level: AlertLevel,
    pub kind: AlertKind,

    /// Subsystem that raised the alert (SYSTEM, STORAGE, DOCKER, RTSP, ...)
    pub source: String,

    pub created_at: DateTime<Utc>,
    pub active: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}
