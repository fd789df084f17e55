//! Actor-based monitoring runtime
//!
//! Each periodic task runs as an independent Tokio task on its own cadence:
//! one collector actor per metric domain, plus one evaluator actor for the
//! alert rules. They share the metric store and the alert store; nothing
//! else couples them.
//!
//! ```text
//!  CollectorActor(system) ─┐
//!  CollectorActor(storage) ├─ write path ──> MonitorHub ──> MetricsBackend
//!  CollectorActor(...)    ─┘                     ▲
//!                                                │ current values
//!  EvaluatorActor ───────────────────────────────┘
//!        │ transitions
//!        ▼
//!  AlertStore ──> NotificationSink(s)
//! ```
//!
//! Actors are controlled through mpsc command channels wrapped in cloneable
//! handles; a dropped handle shuts the actor down.

pub mod collector;
pub mod evaluator;
pub mod messages;
