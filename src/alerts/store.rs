//! Alert record store
//!
//! Holds every alert record ever raised, the active-alert index, and a
//! bounded per-source history of alert ids. `fire`/`resolve` take the table
//! mutex for the whole check-then-act, so two concurrent evaluation cycles
//! cannot both decide "no active record" and create duplicates.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{AlertEvent, AlertKind, AlertLevel, AlertRecord, NotificationSink};

#[derive(Debug, Default)]
struct AlertTable {
    /// Every record, keyed by id. Never pruned.
    records: HashMap<String, AlertRecord>,

    /// dedupe key -> id of the currently active record
    active: HashMap<String, String>,

    /// Per-source alert ids, newest first, trimmed to the cap
    history: HashMap<String, VecDeque<String>>,
}

pub struct AlertStore {
    table: Mutex<AlertTable>,
    history_cap: usize,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl AlertStore {
    pub fn new(history_cap: usize, sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self {
            table: Mutex::new(AlertTable::default()),
            history_cap: history_cap.max(1),
            sinks,
        }
    }

    /// Raise an alert for `dedupe_key`.
    ///
    /// Idempotent while an active record exists: the existing record is
    /// returned and nothing is published. Otherwise a new record is created,
    /// indexed, prepended to the source history, and a `Created` event goes
    /// out to all sinks.
    pub async fn fire(
        &self,
        dedupe_key: &str,
        message: &str,
        level: AlertLevel,
        kind: AlertKind,
        source: &str,
    ) -> AlertRecord {
        let (record, event) = {
            let mut table = self.table.lock().await;

            if let Some(id) = table.active.get(dedupe_key) {
                let existing = table.records[id].clone();
                return existing;
            }

            let record = AlertRecord {
                id: Uuid::new_v4().to_string(),
                dedupe_key: dedupe_key.to_string(),
                message: message.to_string(),
                level,
                kind,
                source: source.to_string(),
                created_at: Utc::now(),
                active: true,
                resolved_at: None,
            };

            table
                .records
                .insert(record.id.clone(), record.clone());
            table
                .active
                .insert(dedupe_key.to_string(), record.id.clone());

            let history = table.history.entry(source.to_string()).or_default();
            history.push_front(record.id.clone());
            history.truncate(self.history_cap);

            (record.clone(), AlertEvent::Created(record))
        };

        info!("created alert: {}", record.message);
        self.publish(&event).await;

        record
    }

    /// Resolve the active alert for `dedupe_key`, if any.
    ///
    /// Returns the final record state, or `None` if nothing was active
    /// (resolving twice is a no-op).
    pub async fn resolve(&self, dedupe_key: &str) -> Option<AlertRecord> {
        let (record, event) = {
            let mut table = self.table.lock().await;

            let id = table.active.remove(dedupe_key)?;
            let record = table.records.get_mut(&id)?;

            record.active = false;
            record.resolved_at = Some(Utc::now());

            let record = record.clone();
            (record.clone(), AlertEvent::Resolved(record))
        };

        info!("resolved alert: {dedupe_key}");
        self.publish(&event).await;

        Some(record)
    }

    pub async fn list_active(&self) -> Vec<AlertRecord> {
        let table = self.table.lock().await;
        table
            .active
            .values()
            .filter_map(|id| table.records.get(id))
            .cloned()
            .collect()
    }

    /// Alert ids raised by `source`, newest first.
    pub async fn history(&self, source: &str) -> Vec<String> {
        let table = self.table.lock().await;
        table
            .history
            .get(source)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn get(&self, id: &str) -> Option<AlertRecord> {
        let table = self.table.lock().await;
        table.records.get(id).cloned()
    }

    /// The currently active record for a dedupe key, if any.
    pub async fn get_active(&self, dedupe_key: &str) -> Option<AlertRecord> {
        let table = self.table.lock().await;
        table
            .active
            .get(dedupe_key)
            .and_then(|id| table.records.get(id))
            .cloned()
    }

    pub async fn active_keys(&self) -> HashSet<String> {
        let table = self.table.lock().await;
        table.active.keys().cloned().collect()
    }

    async fn publish(&self, event: &AlertEvent) {
        for sink in &self.sinks {
            sink.publish(event).await;
        }
        debug!("published alert event to {} sinks", self.sinks.len());
    }
}
