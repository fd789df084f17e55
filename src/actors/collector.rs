//! CollectorActor - drives one collector on its own cadence
//!
//! Each metric domain gets its own collector actor. The actor ticks at the
//! configured interval, asks its [`Collector`] for a cycle, and records the
//! results through the hub. Acquisition failures are isolated per resource;
//! storage failures degrade to no-ops with rate-limited logging and the next
//! cycle simply retries.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, instrument, trace, warn};

use crate::collectors::{Collector, CollectorCycle};
use crate::hub::MonitorHub;
use crate::util::FailureGate;

use super::messages::CollectorCommand;

pub struct CollectorActor {
    collector: Box<dyn Collector>,
    hub: MonitorHub,
    command_rx: mpsc::Receiver<CollectorCommand>,
    interval_duration: Duration,

    /// Suppresses repeated backend-failure logging across cycles
    backend_gate: FailureGate,
}

impl CollectorActor {
    pub fn new(
        collector: Box<dyn Collector>,
        hub: MonitorHub,
        command_rx: mpsc::Receiver<CollectorCommand>,
        interval_duration: Duration,
    ) -> Self {
        let backend_gate = FailureGate::new(format!("{} collector backend", collector.name()));

        Self {
            collector,
            hub,
            command_rx,
            interval_duration,
            backend_gate,
        }
    }

    #[instrument(skip(self), fields(collector = %self.collector.name()))]
    pub async fn run(mut self) {
        debug!("starting collector actor");

        let mut ticker = interval(self.interval_duration);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("collection cycle failed: {e:#}");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        CollectorCommand::CollectNow { respond_to } => {
                            debug!("received CollectNow command");
                            let result = self.run_cycle().await;
                            let _ = respond_to.send(result);
                        }

                        CollectorCommand::UpdateInterval { interval_secs } => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs);
                            ticker = interval(self.interval_duration);
                        }

                        CollectorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("collector actor stopped");
    }

    /// Run one collection cycle and record its output.
    ///
    /// The collector's per-resource failures are logged, not propagated; a
    /// cycle only errors as a whole if the source itself is unreachable.
    async fn run_cycle(&mut self) -> Result<()> {
        let cycle = self.collector.collect().await?;

        for failure in &cycle.failures {
            warn!(
                "{}: failed to collect {}: {:#}",
                self.collector.name(),
                failure.resource,
                failure.error
            );
        }

        self.record_cycle(cycle).await;

        Ok(())
    }

    async fn record_cycle(&mut self, cycle: CollectorCycle) {
        let mut backend_failed = false;

        for snapshot in cycle.snapshots {
            if let Err(e) = self
                .hub
                .record_snapshot(snapshot.domain, &snapshot.resource, snapshot.fields)
                .await
            {
                backend_failed = true;
                if self.backend_gate.failure() {
                    error!("failed to store snapshot for {}: {e}", snapshot.resource);
                }
            }
        }

        for point in cycle.points {
            if let Err(e) = self
                .hub
                .record_sample(
                    point.domain,
                    &point.resource,
                    point.field.as_deref(),
                    point.value,
                    point.timestamp,
                )
                .await
            {
                backend_failed = true;
                if self.backend_gate.failure() {
                    error!("failed to store sample for {}: {e}", point.resource);
                }
            }
        }

        if !backend_failed {
            self.backend_gate.success();
            trace!("{}: cycle recorded", self.collector.name());
        }
    }
}

/// Handle for controlling a CollectorActor
#[derive(Clone)]
pub struct CollectorHandle {
    sender: mpsc::Sender<CollectorCommand>,
}

impl CollectorHandle {
    /// Spawn a collector actor ticking at `interval_duration`.
    pub fn spawn(
        collector: Box<dyn Collector>,
        hub: MonitorHub,
        interval_duration: Duration,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = CollectorActor::new(collector, hub, cmd_rx, interval_duration);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Trigger one collection cycle immediately.
    pub async fn collect_now(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::CollectNow { respond_to: tx })
            .await?;

        rx.await?
    }

    pub async fn update_interval(&self, interval_secs: u64) {
        let _ = self
            .sender
            .send(CollectorCommand::UpdateInterval { interval_secs })
            .await;
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(CollectorCommand::Shutdown).await;
    }
}
