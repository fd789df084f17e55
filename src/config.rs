use tracing::trace;

use crate::HostIdentity;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub host: HostConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub docker: DockerConfig,

    #[serde(default)]
    pub rtsp: RtspConfig,

    /// Optional webhook target for alert lifecycle notifications
    pub webhook: Option<Webhook>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct HostConfig {
    pub id: String,
    pub display: Option<String>,
    pub location: Option<String>,
}

impl HostConfig {
    pub fn identity(&self) -> HostIdentity {
        HostIdentity {
            id: self.id.clone(),
            display_name: self.display.clone().unwrap_or_else(|| self.id.clone()),
            location: self.location.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RetentionConfig {
    /// Samples kept per time series
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Alert ids kept per source in the alert history
    #[serde(default = "default_alert_history")]
    pub alert_history: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            alert_history: default_alert_history(),
        }
    }
}

/// Collection and evaluation intervals, in seconds. Each domain runs on its
/// own cadence.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_system_secs")]
    pub system_secs: u64,

    #[serde(default = "default_storage_secs")]
    pub storage_secs: u64,

    #[serde(default = "default_system_secs")]
    pub network_secs: u64,

    #[serde(default = "default_docker_secs")]
    pub docker_secs: u64,

    #[serde(default = "default_rtsp_secs")]
    pub rtsp_secs: u64,

    #[serde(default = "default_alerts_secs")]
    pub alerts_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            system_secs: default_system_secs(),
            storage_secs: default_storage_secs(),
            network_secs: default_system_secs(),
            docker_secs: default_docker_secs(),
            rtsp_secs: default_rtsp_secs(),
            alerts_secs: default_alerts_secs(),
        }
    }
}

/// Static alert thresholds, in percent.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_cpu_threshold")]
    pub cpu_percent: f64,

    #[serde(default = "default_memory_threshold")]
    pub memory_percent: f64,

    #[serde(default = "default_disk_threshold")]
    pub disk_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_percent: default_cpu_threshold(),
            memory_percent: default_memory_threshold(),
            disk_percent: default_disk_threshold(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RtspConfig {
    #[serde(default)]
    pub streams: Vec<StreamConfig>,

    /// Probe timeout in milliseconds
    #[serde(default = "default_rtsp_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct StreamConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

fn default_max_records() -> usize {
    3
}

fn default_alert_history() -> usize {
    100
}

fn default_system_secs() -> u64 {
    15
}

fn default_storage_secs() -> u64 {
    30
}

fn default_docker_secs() -> u64 {
    30
}

fn default_rtsp_secs() -> u64 {
    60
}

fn default_alerts_secs() -> u64 {
    15
}

fn default_cpu_threshold() -> f64 {
    80.0
}

fn default_memory_threshold() -> f64 {
    85.0
}

fn default_disk_threshold() -> f64 {
    90.0
}

fn default_true() -> bool {
    true
}

fn default_rtsp_timeout_ms() -> u64 {
    5000
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
