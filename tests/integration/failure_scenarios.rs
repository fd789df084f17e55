//! Failure handling across module boundaries
//!
//! Partial or bad collector output must never fabricate alerts, and a dead
//! source must never take the rest of the pipeline with it.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use host_monitoring::{
    Domain,
    actors::{collector::CollectorHandle, evaluator::EvaluatorHandle},
    alerts::RuleEngine,
    collectors::{Collector, CollectorCycle},
    config::Thresholds,
};

use crate::helpers::{set_usage, test_hub};

const MANUAL: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_unparseable_usage_neither_fires_nor_clears() {
    let hub = test_hub();
    let evaluator = EvaluatorHandle::spawn(
        RuleEngine::with_thresholds(&Thresholds::default()),
        hub.clone(),
        MANUAL,
    );

    // Active alert from a real reading
    set_usage(&hub, Domain::System, "cpu", "95.00").await;
    evaluator.evaluate_now().await.unwrap();
    assert_eq!(hub.list_active_alerts().await.len(), 1);

    // A broken reading must not resolve it
    set_usage(&hub, Domain::System, "cpu", "n/a").await;
    evaluator.evaluate_now().await.unwrap();
    assert_eq!(hub.list_active_alerts().await.len(), 1);

    // Neither must a missing field
    hub.record_snapshot(Domain::System, "cpu", HashMap::new())
        .await
        .unwrap();
    evaluator.evaluate_now().await.unwrap();
    assert_eq!(hub.list_active_alerts().await.len(), 1);

    // Only a real recovery reading clears
    set_usage(&hub, Domain::System, "cpu", "12.00").await;
    evaluator.evaluate_now().await.unwrap();
    assert!(hub.list_active_alerts().await.is_empty());

    evaluator.shutdown().await;
}

#[tokio::test]
async fn test_dead_source_leaves_other_collectors_running() {
    struct DeadCollector;

    #[async_trait]
    impl Collector for DeadCollector {
        fn name(&self) -> &'static str {
            "dead"
        }

        async fn collect(&mut self) -> anyhow::Result<CollectorCycle> {
            anyhow::bail!("connection refused")
        }
    }

    struct HealthyCollector;

    #[async_trait]
    impl Collector for HealthyCollector {
        fn name(&self) -> &'static str {
            "healthy"
        }

        async fn collect(&mut self) -> anyhow::Result<CollectorCycle> {
            let mut cycle = CollectorCycle::default();
            cycle.snapshot(
                Domain::Storage,
                "_data",
                HashMap::from([("usage_percent".to_string(), "33.00".to_string())]),
            );
            Ok(cycle)
        }
    }

    let hub = test_hub();
    let dead = CollectorHandle::spawn(Box::new(DeadCollector), hub.clone(), MANUAL);
    let healthy = CollectorHandle::spawn(Box::new(HealthyCollector), hub.clone(), MANUAL);

    assert!(dead.collect_now().await.is_err());
    healthy.collect_now().await.unwrap();

    // The dead source failed repeatedly, the healthy one still lands data
    assert!(dead.collect_now().await.is_err());
    healthy.collect_now().await.unwrap();

    let current = hub
        .query_current(Domain::Storage, "_data")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.fields["usage_percent"], "33.00");

    dead.shutdown().await;
    healthy.shutdown().await;
}

#[tokio::test]
async fn test_resource_gone_between_cycles_keeps_alert_until_observed_recovery() {
    let hub = test_hub();
    let evaluator = EvaluatorHandle::spawn(
        RuleEngine::with_thresholds(&Thresholds::default()),
        hub.clone(),
        MANUAL,
    );

    set_usage(&hub, Domain::Storage, "_backup", "97.00").await;
    evaluator.evaluate_now().await.unwrap();
    assert_eq!(hub.list_active_alerts().await.len(), 1);

    // The mount disappears from subsequent snapshots (current values are
    // replaced wholesale, but the _backup entry itself is never rewritten)
    set_usage(&hub, Domain::Storage, "_data", "10.00").await;
    evaluator.evaluate_now().await.unwrap();

    // No observation of _backup below threshold, so the alert stands
    let active = hub.list_active_alerts().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].dedupe_key, "DISK_SPACE_LOW:_backup");

    evaluator.shutdown().await;
}
