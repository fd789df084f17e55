pub mod actors;
pub mod alerts;
pub mod collectors;
pub mod config;
pub mod hub;
pub mod keys;
pub mod storage;
pub mod util;

use serde::{Deserialize, Serialize};

/// Metric category a resource belongs to.
///
/// The domain is the second component of every storage key
/// (`<host>:<domain>:<kind>:<resource>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    System,
    Server,
    Storage,
    Network,
    Docker,
    Rtsp,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::System => "system",
            Domain::Server => "server",
            Domain::Storage => "storage",
            Domain::Network => "network",
            Domain::Docker => "docker",
            Domain::Rtsp => "rtsp",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the monitored host. Built once from config, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostIdentity {
    pub id: String,
    pub display_name: String,
    pub location: String,
}

/// One time-series data point. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}
