//! Command types for actor control channels

use tokio::sync::oneshot;

/// Commands accepted by a [`CollectorActor`](super::collector::CollectorActor)
#[derive(Debug)]
pub enum CollectorCommand {
    /// Run one collection cycle immediately, bypassing the interval timer.
    ///
    /// Used for testing and manual refresh.
    CollectNow {
        respond_to: oneshot::Sender<anyhow::Result<()>>,
    },

    /// Update the collection interval; takes effect immediately.
    UpdateInterval { interval_secs: u64 },

    /// Gracefully shut down the collector
    Shutdown,
}

/// Commands accepted by the [`EvaluatorActor`](super::evaluator::EvaluatorActor)
#[derive(Debug)]
pub enum EvaluatorCommand {
    /// Run one evaluation cycle immediately; responds with the number of
    /// transitions applied.
    EvaluateNow {
        respond_to: oneshot::Sender<anyhow::Result<usize>>,
    },

    /// Gracefully shut down the evaluator
    Shutdown,
}
