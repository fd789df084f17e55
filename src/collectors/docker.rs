//! Docker collector: container state via the docker CLI.
//!
//! Shells out to `docker ps -a` with a pipe-delimited format string rather
//! than talking to the daemon socket directly. Resource usage comes from a
//! second, best-effort `docker stats --no-stream` call; when that fails the
//! state snapshot still lands. A container whose state cannot be parsed is
//! reported as `unknown` and still counts as down for alerting, since its
//! `running` field stays 0.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::Domain;
use crate::keys::sanitize_resource;

use super::{Collector, CollectorCycle, fmt2};

const PS_FORMAT: &str = "{{.ID}}|{{.Names}}|{{.Image}}|{{.Status}}";
const STATS_FORMAT: &str = "{{.Name}}|{{.CPUPerc}}|{{.MemPerc}}";

#[derive(Debug, PartialEq)]
struct ContainerRow {
    id: String,
    name: String,
    image: String,
    status: String,
}

impl ContainerRow {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '|');

        Some(Self {
            id: parts.next()?.trim().to_string(),
            name: parts.next()?.trim().to_string(),
            image: parts.next()?.trim().to_string(),
            status: parts.next()?.trim().to_string(),
        })
    }

    /// Maps docker's human status line onto a coarse state.
    fn state(&self) -> &'static str {
        if self.status.starts_with("Up") {
            "running"
        } else if self.status.starts_with("Exited") || self.status.starts_with("Created") {
            "stopped"
        } else {
            "unknown"
        }
    }
}

/// Per-container usage parsed from `docker stats`.
#[derive(Debug, Clone, Copy)]
struct ContainerStats {
    cpu_percent: f64,
    memory_percent: f64,
}

fn parse_stats(stdout: &str) -> Result<HashMap<String, ContainerStats>> {
    // CPUPerc/MemPerc come out as "12.34%"
    let percent = Regex::new(r"([\d.]+)\s*%").context("invalid percent pattern")?;

    let grab = |raw: &str| -> Option<f64> {
        percent
            .captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    };

    let mut stats = HashMap::new();

    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.splitn(3, '|');
        let (Some(name), Some(cpu), Some(mem)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let (Some(cpu_percent), Some(memory_percent)) = (grab(cpu), grab(mem)) else {
            continue;
        };

        stats.insert(
            name.trim().to_string(),
            ContainerStats {
                cpu_percent,
                memory_percent,
            },
        );
    }

    Ok(stats)
}

pub struct DockerCollector;

impl DockerCollector {
    pub fn new() -> Self {
        Self
    }

    async fn docker(args: &[&str]) -> Result<String> {
        let output = Command::new("docker")
            .args(args)
            .output()
            .await
            .with_context(|| format!("failed to run docker {}", args[0]))?;

        if !output.status.success() {
            anyhow::bail!(
                "docker {} exited with {}: {}",
                args[0],
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for DockerCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for DockerCollector {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn collect(&mut self) -> Result<CollectorCycle> {
        let ps = Self::docker(&["ps", "-a", "--format", PS_FORMAT]).await?;

        let mut cycle = CollectorCycle::default();

        // Usage stats are best-effort; a failure here must not drop the
        // state snapshots that drive the container-down alert.
        let stats = match Self::docker(&["stats", "--no-stream", "--format", STATS_FORMAT]).await
        {
            Ok(stdout) => parse_stats(&stdout)?,
            Err(e) => {
                cycle.failure("stats", e);
                HashMap::new()
            }
        };

        for line in ps.lines().filter(|l| !l.trim().is_empty()) {
            let Some(row) = ContainerRow::parse(line) else {
                cycle.failure(line, anyhow::anyhow!("unparseable docker ps row"));
                continue;
            };

            let state = row.state();
            let running = if state == "running" { 1.0 } else { 0.0 };
            let resource = sanitize_resource(&row.name);

            let mut fields = HashMap::from([
                ("id".to_string(), row.id),
                ("name".to_string(), row.name.clone()),
                ("image".to_string(), row.image),
                ("status".to_string(), row.status),
                ("state".to_string(), state.to_string()),
                ("running".to_string(), format!("{running:.0}")),
            ]);

            if let Some(usage) = stats.get(&row.name) {
                fields.insert("cpu_percent".to_string(), fmt2(usage.cpu_percent));
                fields.insert("memory_percent".to_string(), fmt2(usage.memory_percent));
            }

            cycle.snapshot(Domain::Docker, &resource, fields);
            cycle.point(Domain::Docker, &resource, None, running);
        }

        Ok(cycle)
    }
}
