//! Metric acquisition adapters
//!
//! Collectors are thin glue between an external signal source and the hub's
//! write path. Each one implements [`Collector`] and returns a
//! [`CollectorCycle`] per tick: the snapshots and history points it managed
//! to gather, plus an explicit list of per-resource failures. A failed
//! resource never aborts the rest of the cycle.
//!
//! Rate-derived collectors (CPU load, network throughput) keep their
//! previous-tick state as instance fields; nothing here is shared or global.

pub mod docker;
pub mod network;
pub mod rtsp;
pub mod storage;
pub mod system;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

use crate::Domain;

/// Replacement snapshot of one resource's current fields.
#[derive(Debug)]
pub struct Snapshot {
    pub domain: Domain,
    pub resource: String,
    pub fields: HashMap<String, String>,
}

/// One history sample to append.
#[derive(Debug)]
pub struct Point {
    pub domain: Domain,
    pub resource: String,
    pub field: Option<String>,
    pub value: f64,
    pub timestamp: i64,
}

/// A resource that could not be collected this cycle.
#[derive(Debug)]
pub struct ResourceFailure {
    pub resource: String,
    pub error: anyhow::Error,
}

/// Everything one collection cycle produced.
#[derive(Debug, Default)]
pub struct CollectorCycle {
    pub snapshots: Vec<Snapshot>,
    pub points: Vec<Point>,
    pub failures: Vec<ResourceFailure>,
}

impl CollectorCycle {
    pub fn snapshot(&mut self, domain: Domain, resource: &str, fields: HashMap<String, String>) {
        self.snapshots.push(Snapshot {
            domain,
            resource: resource.to_string(),
            fields,
        });
    }

    pub fn point(&mut self, domain: Domain, resource: &str, field: Option<&str>, value: f64) {
        self.points.push(Point {
            domain,
            resource: resource.to_string(),
            field: field.map(String::from),
            value,
            timestamp: now_millis(),
        });
    }

    pub fn failure(&mut self, resource: &str, error: anyhow::Error) {
        self.failures.push(ResourceFailure {
            resource: resource.to_string(),
            error,
        });
    }
}

/// A source of samples for one metric domain.
#[async_trait]
pub trait Collector: Send {
    fn name(&self) -> &'static str;

    async fn collect(&mut self) -> anyhow::Result<CollectorCycle>;
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a float the way the persisted snapshots expect it.
pub(crate) fn fmt2(value: f64) -> String {
    format!("{value:.2}")
}
