//! In-memory storage backend
//!
//! Series are held in a two-level map: an outer `RwLock` over the key table,
//! with each series behind its own `Mutex`. The outer lock is only held long
//! enough to find or create the series entry, so appends to different keys
//! proceed without blocking each other while appends to the same key are
//! fully serialized (the trim step never sees a half-applied write).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::trace;

use super::backend::{CurrentEntry, HealthStatus, MetricsBackend};
use super::error::{StorageError, StorageResult};
use crate::Sample;

#[derive(Debug, Clone, Copy)]
struct SeriesEntry {
    sample: Sample,
    /// Insertion order, used to break timestamp ties (earlier in, first out)
    seq: u64,
}

#[derive(Debug, Default)]
struct Series {
    entries: Vec<SeriesEntry>,
    next_seq: u64,
}

impl Series {
    fn push_and_trim(&mut self, sample: Sample, max_records: usize) {
        self.entries.push(SeriesEntry {
            sample,
            seq: self.next_seq,
        });
        self.next_seq += 1;

        if self.entries.len() > max_records {
            self.entries
                .sort_by_key(|e| (e.sample.timestamp, e.seq));
            let excess = self.entries.len() - max_records;
            self.entries.drain(..excess);
        }
    }

    /// Retained samples, most-recent first.
    fn snapshot_descending(&self) -> Vec<Sample> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| (e.sample.timestamp, e.seq));
        entries.iter().rev().map(|e| e.sample).collect()
    }
}

/// Bounded in-memory metric store.
pub struct MemoryBackend {
    max_records: usize,
    series: RwLock<HashMap<String, Arc<Mutex<Series>>>>,
    current: RwLock<HashMap<String, CurrentEntry>>,
}

impl MemoryBackend {
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records: max_records.max(1),
            series: RwLock::new(HashMap::new()),
            current: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    async fn series_for(&self, key: &str) -> Arc<Mutex<Series>> {
        // Fast path: series already exists
        {
            let series = self.series.read().await;
            if let Some(handle) = series.get(key) {
                return handle.clone();
            }
        }

        let mut series = self.series.write().await;
        series
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Series::default())))
            .clone()
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::Validation(
            "storage key must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl MetricsBackend for MemoryBackend {
    async fn append(&self, key: &str, sample: Sample) -> StorageResult<()> {
        validate_key(key)?;

        if !sample.value.is_finite() {
            return Err(StorageError::Validation(format!(
                "non-finite sample value for {key}"
            )));
        }

        let handle = self.series_for(key).await;
        let mut series = handle.lock().await;
        series.push_and_trim(sample, self.max_records);

        trace!(
            "appended sample to {key} ({} retained)",
            series.entries.len()
        );

        Ok(())
    }

    async fn query(&self, key: &str) -> StorageResult<Vec<Sample>> {
        validate_key(key)?;

        let handle = {
            let series = self.series.read().await;
            series.get(key).cloned()
        };

        match handle {
            Some(handle) => Ok(handle.lock().await.snapshot_descending()),
            None => Ok(vec![]),
        }
    }

    async fn size(&self, key: &str) -> StorageResult<usize> {
        validate_key(key)?;

        let handle = {
            let series = self.series.read().await;
            series.get(key).cloned()
        };

        match handle {
            Some(handle) => Ok(handle.lock().await.entries.len()),
            None => Ok(0),
        }
    }

    async fn set_current(&self, key: &str, fields: HashMap<String, String>) -> StorageResult<()> {
        validate_key(key)?;

        let entry = CurrentEntry {
            fields,
            captured_at: Utc::now(),
        };

        self.current.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get_current(&self, key: &str) -> StorageResult<Option<CurrentEntry>> {
        validate_key(key)?;

        Ok(self.current.read().await.get(key).cloned())
    }

    async fn list_current_keys(&self, pattern: &str) -> StorageResult<Vec<String>> {
        validate_key(pattern)?;

        let current = self.current.read().await;

        let keys = match pattern.strip_suffix('*') {
            Some(prefix) => current
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect(),
            None => current
                .keys()
                .filter(|k| k.as_str() == pattern)
                .cloned()
                .collect(),
        };

        Ok(keys)
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let series = self.series.read().await;
        Ok(HealthStatus {
            healthy: true,
            message: format!("in-memory store: {} series", series.len()),
        })
    }
}
