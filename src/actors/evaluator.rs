//! EvaluatorActor - periodic threshold evaluation
//!
//! Runs the rule engine against a fresh snapshot of current values on its
//! own cadence and applies the resulting transitions to the alert store.
//! Each transition is applied independently; one failing dedupe key never
//! aborts the rest of the cycle.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, instrument, trace, warn};

use crate::Domain;
use crate::alerts::{AlertTransition, RuleEngine};
use crate::hub::MonitorHub;
use crate::util::FailureGate;

use super::messages::EvaluatorCommand;

pub struct EvaluatorActor {
    engine: RuleEngine,
    hub: MonitorHub,
    command_rx: mpsc::Receiver<EvaluatorCommand>,
    interval_duration: Duration,

    /// Domains the rule table actually references
    domains: Vec<Domain>,

    backend_gate: FailureGate,
}

impl EvaluatorActor {
    pub fn new(
        engine: RuleEngine,
        hub: MonitorHub,
        command_rx: mpsc::Receiver<EvaluatorCommand>,
        interval_duration: Duration,
    ) -> Self {
        let mut seen = HashSet::new();
        let domains = engine
            .rules()
            .iter()
            .map(|rule| rule.domain)
            .filter(|domain| seen.insert(*domain))
            .collect();

        Self {
            engine,
            hub,
            command_rx,
            interval_duration,
            domains,
            backend_gate: FailureGate::new("alert evaluation backend"),
        }
    }

    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting evaluator actor");

        let mut ticker = interval(self.interval_duration);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.evaluate_cycle().await {
                        error!("evaluation cycle failed: {e:#}");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        EvaluatorCommand::EvaluateNow { respond_to } => {
                            debug!("received EvaluateNow command");
                            let result = self.evaluate_cycle().await;
                            let _ = respond_to.send(result);
                        }

                        EvaluatorCommand::Shutdown => {
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

        debug!("evaluator actor stopped");
    }

    /// Run one evaluation cycle; returns the number of transitions applied.
    async fn evaluate_cycle(&mut self) -> Result<usize> {
        let view = match self.hub.current_view(&self.domains).await {
            Ok(view) => {
                self.backend_gate.success();
                view
            }
            Err(e) => {
                // Backend unreachable: degrade to a no-op cycle, retry next tick
                if self.backend_gate.failure() {
                    error!("cannot read current values: {e}");
                }
                return Ok(0);
            }
        };

        let transitions = self.engine.evaluate(&view);
        let applied = transitions.len();

        trace!("evaluation produced {applied} transitions");

        let alerts = self.hub.alerts().clone();

        for transition in transitions {
            match transition {
                AlertTransition::Fire {
                    dedupe_key,
                    message,
                    level,
                    kind,
                    source,
                } => {
                    alerts.fire(&dedupe_key, &message, level, kind, &source).await;
                }
                AlertTransition::Clear { dedupe_key } => {
                    alerts.resolve(&dedupe_key).await;
                }
            }
        }

        Ok(applied)
    }
}

/// Handle for controlling the EvaluatorActor
#[derive(Clone)]
pub struct EvaluatorHandle {
    sender: mpsc::Sender<EvaluatorCommand>,
}

impl EvaluatorHandle {
    pub fn spawn(engine: RuleEngine, hub: MonitorHub, interval_duration: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = EvaluatorActor::new(engine, hub, cmd_rx, interval_duration);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Trigger one evaluation cycle immediately.
    pub async fn evaluate_now(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(EvaluatorCommand::EvaluateNow { respond_to: tx })
            .await?;

        rx.await?
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(EvaluatorCommand::Shutdown).await;
    }
}
