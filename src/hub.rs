//! The monitoring hub
//!
//! `MonitorHub` is the single surface collectors write through and the read
//! side queries. It owns the key namespace for this host, so call sites
//! never build storage keys by hand.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    Domain, HostIdentity, Sample,
    alerts::{AlertRecord, AlertStore, CurrentView},
    keys::{KeyKind, KeySpace},
    storage::{CurrentEntry, MetricsBackend, StorageResult},
};

#[derive(Clone)]
pub struct MonitorHub {
    identity: HostIdentity,
    keys: KeySpace,
    backend: Arc<dyn MetricsBackend>,
    alerts: Arc<AlertStore>,
}

impl MonitorHub {
    pub fn new(
        identity: HostIdentity,
        backend: Arc<dyn MetricsBackend>,
        alerts: Arc<AlertStore>,
    ) -> StorageResult<Self> {
        let keys = KeySpace::new(&identity)?;

        Ok(Self {
            identity,
            keys,
            backend,
            alerts,
        })
    }

    pub fn identity(&self) -> &HostIdentity {
        &self.identity
    }

    pub fn alerts(&self) -> &Arc<AlertStore> {
        &self.alerts
    }

    /// Series resource component: `resource` alone for a domain's primary
    /// signal, `resource:field` when one resource carries several series
    /// (e.g. an interface's received and sent rates).
    fn series_resource(resource: &str, field: Option<&str>) -> String {
        match field {
            Some(field) => format!("{resource}:{field}"),
            None => resource.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Write path (collectors)
    // ------------------------------------------------------------------

    /// Append one history sample for a resource.
    pub async fn record_sample(
        &self,
        domain: Domain,
        resource: &str,
        field: Option<&str>,
        value: f64,
        timestamp: i64,
    ) -> StorageResult<()> {
        let key = self.keys.format_key(
            domain,
            KeyKind::History,
            &Self::series_resource(resource, field),
        )?;

        self.backend.append(&key, Sample::new(timestamp, value)).await
    }

    /// Replace the current-value snapshot for a resource.
    pub async fn record_snapshot(
        &self,
        domain: Domain,
        resource: &str,
        fields: HashMap<String, String>,
    ) -> StorageResult<()> {
        let key = self.keys.format_key(domain, KeyKind::Current, resource)?;

        self.backend.set_current(&key, fields).await
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    /// Retained history for a resource, most-recent first.
    pub async fn query_history(
        &self,
        domain: Domain,
        resource: &str,
        field: Option<&str>,
    ) -> StorageResult<Vec<Sample>> {
        let key = self.keys.format_key(
            domain,
            KeyKind::History,
            &Self::series_resource(resource, field),
        )?;

        self.backend.query(&key).await
    }

    pub async fn query_current(
        &self,
        domain: Domain,
        resource: &str,
    ) -> StorageResult<Option<CurrentEntry>> {
        let key = self.keys.format_key(domain, KeyKind::Current, resource)?;

        self.backend.get_current(&key).await
    }

    /// Resource ids with a current-value snapshot in `domain`.
    pub async fn list_resources(&self, domain: Domain) -> StorageResult<Vec<String>> {
        let pattern = self.keys.format_pattern(domain, KeyKind::Current);
        let prefix = pattern.trim_end_matches('*');

        let keys = self.backend.list_current_keys(&pattern).await?;

        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(prefix).map(String::from))
            .collect())
    }

    /// Snapshot of all current values in the given domains, as the rule
    /// engine consumes them.
    pub async fn current_view(&self, domains: &[Domain]) -> StorageResult<CurrentView> {
        let mut view = CurrentView::new();

        for &domain in domains {
            for resource in self.list_resources(domain).await? {
                if let Some(entry) = self.query_current(domain, &resource).await? {
                    view.insert(domain, &resource, entry.fields);
                }
            }
        }

        Ok(view)
    }

    pub async fn list_active_alerts(&self) -> Vec<AlertRecord> {
        self.alerts.list_active().await
    }

    pub async fn list_alert_history(&self, source: &str) -> Vec<String> {
        self.alerts.history(source).await
    }
}
