//! Test helpers shared by the integration tests

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use host_monitoring::{
    Domain, HostIdentity,
    alerts::AlertStore,
    collectors::{Collector, CollectorCycle},
    hub::MonitorHub,
    storage::MemoryBackend,
};

pub fn test_identity() -> HostIdentity {
    HostIdentity {
        id: "test-host".to_string(),
        display_name: "Test Host".to_string(),
        location: "lab".to_string(),
    }
}

/// Hub over a fresh in-memory backend retaining 3 samples per series.
pub fn test_hub() -> MonitorHub {
    MonitorHub::new(
        test_identity(),
        Arc::new(MemoryBackend::new(3)),
        Arc::new(AlertStore::new(100, vec![])),
    )
    .unwrap()
}

pub async fn set_usage(hub: &MonitorHub, domain: Domain, resource: &str, usage: &str) {
    hub.record_snapshot(
        domain,
        resource,
        HashMap::from([("usage_percent".to_string(), usage.to_string())]),
    )
    .await
    .unwrap();
}

/// Collector that replays a fixed sequence of CPU usage readings, one per
/// cycle, and repeats the last one when the script runs out.
pub struct ScriptedCpuCollector {
    script: VecDeque<f64>,
    last: f64,
}

impl ScriptedCpuCollector {
    pub fn new(readings: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: readings.into_iter().collect(),
            last: 0.0,
        }
    }
}

#[async_trait]
impl Collector for ScriptedCpuCollector {
    fn name(&self) -> &'static str {
        "scripted-cpu"
    }

    async fn collect(&mut self) -> anyhow::Result<CollectorCycle> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        let usage = self.last;

        let mut cycle = CollectorCycle::default();
        cycle.snapshot(
            Domain::System,
            "cpu",
            HashMap::from([("usage_percent".to_string(), format!("{usage:.2}"))]),
        );
        cycle.point(Domain::System, "cpu", None, usage);

        Ok(cycle)
    }
}
