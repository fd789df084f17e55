//! Shared utilities for collectors and actors

use tracing::{info, warn};

const CONFIG_PATH: &str = "MONITOR_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "./monitor.json";

pub fn get_default_config_path() -> String {
    std::env::var(CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Rate limiter for repeated failure logging.
///
/// The first few consecutive failures are logged in full; after that only
/// every Nth is, so a backend outage does not flood the logs. A success
/// resets the counter and announces the recovery.
#[derive(Debug, Clone)]
pub struct FailureGate {
    context: String,
    consecutive: u32,
    log_first: u32,
    log_every: u32,
}

impl FailureGate {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            consecutive: 0,
            log_first: 3,
            log_every: 10,
        }
    }

    /// Record a failure; returns true if this one should be logged.
    pub fn failure(&mut self) -> bool {
        self.consecutive += 1;

        if self.consecutive == self.log_first {
            warn!(
                "{}: suppressing further errors, will log every {}th",
                self.context, self.log_every
            );
        }

        self.consecutive <= self.log_first || self.consecutive % self.log_every == 0
    }

    /// Record a success, announcing recovery if failures preceded it.
    pub fn success(&mut self) {
        if self.consecutive > 0 {
            info!(
                "{}: recovered after {} consecutive failures",
                self.context, self.consecutive
            );
            self.consecutive = 0;
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive
    }
}
