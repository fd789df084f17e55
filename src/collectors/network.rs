//! Network collector: per-interface throughput via sysinfo.
//!
//! Rates are derived from cumulative byte counters, so the collector keeps
//! the previous tick's totals per interface. The first cycle has no
//! baseline and reports zero rates.

use std::collections::HashMap;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use sysinfo::Networks;

use crate::Domain;
use crate::keys::sanitize_resource;

use super::{Collector, CollectorCycle, fmt2};

pub struct NetworkCollector {
    networks: Networks,

    /// Cumulative (received, transmitted) bytes per interface at last tick
    previous: HashMap<String, (u64, u64)>,
    last_tick: Option<Instant>,
}

impl NetworkCollector {
    pub fn new() -> Self {
        Self {
            networks: Networks::new(),
            previous: HashMap::new(),
            last_tick: None,
        }
    }

    /// KB/s over the elapsed window, zero when no baseline exists.
    ///
    /// Counter resets (interface bounce) would otherwise produce a huge
    /// negative delta; those are clamped to zero as well.
    fn rate_kb_s(previous: Option<u64>, current: u64, elapsed_secs: f64) -> f64 {
        let Some(previous) = previous else {
            return 0.0;
        };
        if elapsed_secs <= 0.0 || current < previous {
            return 0.0;
        }

        (current - previous) as f64 / 1024.0 / elapsed_secs
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for NetworkCollector {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn collect(&mut self) -> Result<CollectorCycle> {
        self.networks.refresh(true);

        let now = Instant::now();
        let elapsed_secs = self
            .last_tick
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let mut cycle = CollectorCycle::default();
        let mut next_previous = HashMap::new();
        let mut total_rx_rate = 0.0;
        let mut total_tx_rate = 0.0;

        for (interface, data) in self.networks.iter() {
            let rx_total = data.total_received();
            let tx_total = data.total_transmitted();

            let previous = self.previous.get(interface).copied();
            let rx_rate = Self::rate_kb_s(previous.map(|p| p.0), rx_total, elapsed_secs);
            let tx_rate = Self::rate_kb_s(previous.map(|p| p.1), tx_total, elapsed_secs);

            total_rx_rate += rx_rate;
            total_tx_rate += tx_rate;
            next_previous.insert(interface.clone(), (rx_total, tx_total));

            let resource = sanitize_resource(interface);

            cycle.snapshot(
                Domain::Network,
                &resource,
                HashMap::from([
                    ("interface".to_string(), interface.clone()),
                    ("received_kb_s".to_string(), fmt2(rx_rate)),
                    ("sent_kb_s".to_string(), fmt2(tx_rate)),
                    (
                        "total_received_mb".to_string(),
                        fmt2(rx_total as f64 / 1024.0 / 1024.0),
                    ),
                    (
                        "total_sent_mb".to_string(),
                        fmt2(tx_total as f64 / 1024.0 / 1024.0),
                    ),
                ]),
            );
            cycle.point(Domain::Network, &resource, Some("received"), rx_rate);
            cycle.point(Domain::Network, &resource, Some("sent"), tx_rate);
        }

        self.previous = next_previous;

        cycle.snapshot(
            Domain::Network,
            "overall",
            HashMap::from([
                ("received_kb_s".to_string(), fmt2(total_rx_rate)),
                ("sent_kb_s".to_string(), fmt2(total_tx_rate)),
            ]),
        );

        Ok(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_without_baseline_is_zero() {
        assert_eq!(NetworkCollector::rate_kb_s(None, 4096, 2.0), 0.0);
    }

    #[test]
    fn test_rate_from_byte_delta() {
        // 4096 bytes over 2 seconds is 2 KB/s
        assert_eq!(NetworkCollector::rate_kb_s(Some(0), 4096, 2.0), 2.0);
    }

    #[test]
    fn test_counter_reset_clamps_to_zero() {
        assert_eq!(NetworkCollector::rate_kb_s(Some(9000), 100, 2.0), 0.0);
    }

    #[tokio::test]
    async fn test_first_cycle_reports_zero_rates() {
        let mut collector = NetworkCollector::new();
        let cycle = collector.collect().await.unwrap();

        for snapshot in &cycle.snapshots {
            assert_eq!(snapshot.fields["received_kb_s"], "0.00");
            assert_eq!(snapshot.fields["sent_kb_s"], "0.00");
        }

        // Overall summary is always present
        assert!(cycle.snapshots.iter().any(|s| s.resource == "overall"));
    }
}
