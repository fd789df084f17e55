//! End-to-end pipeline tests: collector actor through storage to evaluation
//!
//! Actors are spawned with hour-long intervals and driven manually, so every
//! test is deterministic.

use std::time::Duration;

use host_monitoring::{
    Domain,
    actors::{collector::CollectorHandle, evaluator::EvaluatorHandle},
    alerts::{AlertKind, RuleEngine},
    config::Thresholds,
};
use pretty_assertions::assert_eq;

use crate::helpers::{ScriptedCpuCollector, test_hub};

const MANUAL: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_collected_metrics_reach_current_and_history() {
    let hub = test_hub();
    let collector = CollectorHandle::spawn(
        Box::new(ScriptedCpuCollector::new([40.0, 45.0])),
        hub.clone(),
        MANUAL,
    );

    collector.collect_now().await.unwrap();
    collector.collect_now().await.unwrap();

    let current = hub
        .query_current(Domain::System, "cpu")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.fields["usage_percent"], "45.00");

    let history = hub
        .query_history(Domain::System, "cpu", None)
        .await
        .unwrap();
    let values: Vec<f64> = history.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![45.0, 40.0]);

    collector.shutdown().await;
}

#[tokio::test]
async fn test_history_stays_bounded_across_cycles() {
    let hub = test_hub();
    let collector = CollectorHandle::spawn(
        Box::new(ScriptedCpuCollector::new([10.0, 20.0, 30.0, 40.0, 50.0])),
        hub.clone(),
        MANUAL,
    );

    for _ in 0..5 {
        collector.collect_now().await.unwrap();
    }

    // Backend retains 3 samples; the oldest cycles fall off
    let history = hub
        .query_history(Domain::System, "cpu", None)
        .await
        .unwrap();
    let values: Vec<f64> = history.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![50.0, 40.0, 30.0]);

    collector.shutdown().await;
}

#[tokio::test]
async fn test_full_alert_round_trip_through_actors() {
    let hub = test_hub();
    let collector = CollectorHandle::spawn(
        Box::new(ScriptedCpuCollector::new([92.0, 95.0, 30.0])),
        hub.clone(),
        MANUAL,
    );
    let evaluator = EvaluatorHandle::spawn(
        RuleEngine::with_thresholds(&Thresholds::default()),
        hub.clone(),
        MANUAL,
    );

    // Over threshold: one alert
    collector.collect_now().await.unwrap();
    evaluator.evaluate_now().await.unwrap();

    let active = hub.list_active_alerts().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, AlertKind::HighCpuUsage);
    let alert_id = active[0].id.clone();

    // Still over: deduped, same record
    collector.collect_now().await.unwrap();
    evaluator.evaluate_now().await.unwrap();
    assert_eq!(hub.list_active_alerts().await.len(), 1);

    // Recovered: resolved but kept in history
    collector.collect_now().await.unwrap();
    evaluator.evaluate_now().await.unwrap();

    assert!(hub.list_active_alerts().await.is_empty());
    assert_eq!(hub.list_alert_history("SYSTEM").await, vec![alert_id.clone()]);

    let record = hub.alerts().get(&alert_id).await.unwrap();
    assert!(!record.active);
    assert!(record.resolved_at.is_some());

    collector.shutdown().await;
    evaluator.shutdown().await;
}
