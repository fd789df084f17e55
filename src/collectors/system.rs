//! System collector: CPU, memory, load and process counts via sysinfo.
//!
//! Keeps its `System` instance across cycles so CPU usage is measured
//! between ticks instead of over an artificial sleep.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sysinfo::System;

use crate::{Domain, HostIdentity};

use super::{Collector, CollectorCycle, fmt2};

pub struct SystemCollector {
    sys: System,
    identity: HostIdentity,
}

impl SystemCollector {
    pub fn new(identity: HostIdentity) -> Self {
        Self {
            sys: System::new_all(),
            identity,
        }
    }

    fn cpu_fields(&self) -> (HashMap<String, String>, f64) {
        let usage = self.sys.global_cpu_usage() as f64;
        let load = System::load_average();

        let fields = HashMap::from([
            ("usage_percent".to_string(), fmt2(usage)),
            ("cores".to_string(), self.sys.cpus().len().to_string()),
            ("load_1m".to_string(), fmt2(load.one)),
            ("load_5m".to_string(), fmt2(load.five)),
            ("load_15m".to_string(), fmt2(load.fifteen)),
        ]);

        (fields, usage)
    }

    fn memory_fields(&self) -> (HashMap<String, String>, f64) {
        let total = self.sys.total_memory();
        let used = self.sys.used_memory();
        let usage = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };

        let fields = HashMap::from([
            ("total_mb".to_string(), (total / 1024 / 1024).to_string()),
            ("used_mb".to_string(), (used / 1024 / 1024).to_string()),
            (
                "free_mb".to_string(),
                ((total.saturating_sub(used)) / 1024 / 1024).to_string(),
            ),
            ("usage_percent".to_string(), fmt2(usage)),
        ]);

        (fields, usage)
    }

    fn info_fields(&self) -> HashMap<String, String> {
        let unknown = || "unknown".to_string();

        HashMap::from([
            ("id".to_string(), self.identity.id.clone()),
            ("display_name".to_string(), self.identity.display_name.clone()),
            ("location".to_string(), self.identity.location.clone()),
            (
                "hostname".to_string(),
                System::host_name().unwrap_or_else(unknown),
            ),
            ("os".to_string(), System::name().unwrap_or_else(unknown)),
            (
                "os_version".to_string(),
                System::os_version().unwrap_or_else(unknown),
            ),
            (
                "kernel".to_string(),
                System::kernel_version().unwrap_or_else(unknown),
            ),
            ("arch".to_string(), System::cpu_arch()),
        ])
    }
}

#[async_trait]
impl Collector for SystemCollector {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn collect(&mut self) -> Result<CollectorCycle> {
        self.sys.refresh_all();

        let mut cycle = CollectorCycle::default();

        let (cpu, cpu_usage) = self.cpu_fields();
        cycle.snapshot(Domain::System, "cpu", cpu);
        cycle.point(Domain::System, "cpu", None, cpu_usage);

        let (memory, memory_usage) = self.memory_fields();
        cycle.snapshot(Domain::System, "memory", memory);
        cycle.point(Domain::System, "memory", None, memory_usage);

        cycle.snapshot(
            Domain::System,
            "processes",
            HashMap::from([("count".to_string(), self.sys.processes().len().to_string())]),
        );

        cycle.snapshot(Domain::Server, "info", self.info_fields());

        Ok(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> HostIdentity {
        HostIdentity {
            id: "test".to_string(),
            display_name: "Test".to_string(),
            location: "lab".to_string(),
        }
    }

    #[tokio::test]
    async fn test_cycle_shape() {
        let mut collector = SystemCollector::new(identity());
        let cycle = collector.collect().await.unwrap();

        let resources: Vec<_> = cycle
            .snapshots
            .iter()
            .map(|s| (s.domain, s.resource.as_str()))
            .collect();

        assert!(resources.contains(&(Domain::System, "cpu")));
        assert!(resources.contains(&(Domain::System, "memory")));
        assert!(resources.contains(&(Domain::System, "processes")));
        assert!(resources.contains(&(Domain::Server, "info")));

        assert_eq!(cycle.points.len(), 2);
        assert!(cycle.failures.is_empty());
    }

    #[tokio::test]
    async fn test_usage_fields_are_parseable_percentages() {
        let mut collector = SystemCollector::new(identity());
        let cycle = collector.collect().await.unwrap();

        for snapshot in &cycle.snapshots {
            if let Some(raw) = snapshot.fields.get("usage_percent") {
                let value: f64 = raw.parse().unwrap();
                assert!((0.0..=100.0).contains(&value), "{raw} out of range");
            }
        }
    }
}
