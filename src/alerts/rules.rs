//! Threshold rule evaluation
//!
//! Rules are a static table built from the configured thresholds. Evaluation
//! is a pure synchronous pass over a snapshot of current values: it decides
//! transitions but mutates nothing. The engine re-fires on every cycle the
//! condition holds; the [`AlertStore`](super::AlertStore) dedupes, so only
//! the first fire of a run creates a record.

use std::collections::HashMap;

use tracing::trace;

use crate::{Domain, config::Thresholds};

use super::{AlertKind, AlertLevel};

/// Snapshot of current values the engine evaluates against, keyed by
/// (domain, resource).
#[derive(Debug, Default)]
pub struct CurrentView {
    values: HashMap<(Domain, String), HashMap<String, String>>,
}

impl CurrentView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, domain: Domain, resource: &str, fields: HashMap<String, String>) {
        self.values.insert((domain, resource.to_string()), fields);
    }

    fn field(&self, domain: Domain, resource: &str, field: &str) -> Option<&str> {
        self.values
            .get(&(domain, resource.to_string()))
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    fn resources(&self, domain: Domain) -> Vec<&str> {
        let mut resources: Vec<&str> = self
            .values
            .keys()
            .filter(|(d, _)| *d == domain)
            .map(|(_, r)| r.as_str())
            .collect();
        resources.sort_unstable();
        resources
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparator {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Gt => value > threshold,
            Comparator::Lt => value < threshold,
            Comparator::Ge => value >= threshold,
            Comparator::Le => value <= threshold,
        }
    }
}

/// Whether one rule tracks a single dedupe key or one per resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    /// One fixed resource, dedupe key is the rule id
    Global { resource: String },

    /// Applied independently to every resource of the rule's domain, each
    /// with dedupe key `<rule_id>:<resource>`
    PerResource,
}

#[derive(Debug, Clone)]
pub struct AlertRule {
    pub id: String,
    pub domain: Domain,
    pub field: String,
    pub comparator: Comparator,
    pub threshold: f64,
    pub level: AlertLevel,
    pub kind: AlertKind,
    pub source: String,
    pub scope: RuleScope,

    /// Message template; `{resource}` and `{value}` are substituted
    pub message: String,
}

impl AlertRule {
    fn dedupe_key(&self, resource: &str) -> String {
        match self.scope {
            RuleScope::Global { .. } => self.id.clone(),
            RuleScope::PerResource => format!("{}:{}", self.id, resource),
        }
    }

    fn render_message(&self, resource: &str, raw_value: &str) -> String {
        self.message
            .replace("{resource}", resource)
            .replace("{value}", raw_value)
    }
}

/// One decided transition for a dedupe key.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertTransition {
    Fire {
        dedupe_key: String,
        message: String,
        level: AlertLevel,
        kind: AlertKind,
        source: String,
    },
    Clear {
        dedupe_key: String,
    },
}

pub struct RuleEngine {
    rules: Vec<AlertRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self { rules }
    }

    /// The built-in rule table for the configured thresholds.
    pub fn with_thresholds(thresholds: &Thresholds) -> Self {
        let rules = vec![
            AlertRule {
                id: "HIGH_CPU_USAGE".to_string(),
                domain: Domain::System,
                field: "usage_percent".to_string(),
                comparator: Comparator::Gt,
                threshold: thresholds.cpu_percent,
                level: AlertLevel::Warning,
                kind: AlertKind::HighCpuUsage,
                source: "SYSTEM".to_string(),
                scope: RuleScope::Global {
                    resource: "cpu".to_string(),
                },
                message: "System CPU usage is high: {value}%".to_string(),
            },
            AlertRule {
                id: "HIGH_MEMORY_USAGE".to_string(),
                domain: Domain::System,
                field: "usage_percent".to_string(),
                comparator: Comparator::Gt,
                threshold: thresholds.memory_percent,
                level: AlertLevel::Warning,
                kind: AlertKind::HighMemoryUsage,
                source: "SYSTEM".to_string(),
                scope: RuleScope::Global {
                    resource: "memory".to_string(),
                },
                message: "System memory usage is high: {value}%".to_string(),
            },
            AlertRule {
                id: "DISK_SPACE_LOW".to_string(),
                domain: Domain::Storage,
                field: "usage_percent".to_string(),
                comparator: Comparator::Gt,
                threshold: thresholds.disk_percent,
                level: AlertLevel::Warning,
                kind: AlertKind::DiskSpaceLow,
                source: "STORAGE".to_string(),
                scope: RuleScope::PerResource,
                message: "Disk {resource} usage is high: {value}%".to_string(),
            },
            AlertRule {
                id: "DOCKER_CONTAINER_DOWN".to_string(),
                domain: Domain::Docker,
                field: "running".to_string(),
                comparator: Comparator::Lt,
                threshold: 1.0,
                level: AlertLevel::Error,
                kind: AlertKind::DockerContainerDown,
                source: "DOCKER".to_string(),
                scope: RuleScope::PerResource,
                message: "Docker container {resource} is not running".to_string(),
            },
            AlertRule {
                id: "RTSP_STREAM_DOWN".to_string(),
                domain: Domain::Rtsp,
                field: "connected".to_string(),
                comparator: Comparator::Lt,
                threshold: 1.0,
                level: AlertLevel::Error,
                kind: AlertKind::RtspStreamDown,
                source: "RTSP".to_string(),
                scope: RuleScope::PerResource,
                message: "RTSP stream {resource} is down".to_string(),
            },
        ];

        Self::new(rules)
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Evaluate all rules against a snapshot of current values.
    ///
    /// A missing or unparseable field yields neither a fire nor a clear for
    /// that rule/resource; partial collection must not fabricate either a
    /// false alert or a false recovery.
    pub fn evaluate(&self, view: &CurrentView) -> Vec<AlertTransition> {
        let mut transitions = vec![];

        for rule in &self.rules {
            let resources: Vec<String> = match &rule.scope {
                RuleScope::Global { resource } => vec![resource.clone()],
                RuleScope::PerResource => view
                    .resources(rule.domain)
                    .into_iter()
                    .map(String::from)
                    .collect(),
            };

            for resource in resources {
                let Some(raw) = view.field(rule.domain, &resource, &rule.field) else {
                    trace!("{}: no value for {}/{resource}, skipping", rule.id, rule.domain);
                    continue;
                };

                let Ok(value) = raw.parse::<f64>() else {
                    trace!("{}: unparseable value {raw:?} for {resource}, skipping", rule.id);
                    continue;
                };

                let dedupe_key = rule.dedupe_key(&resource);

                if rule.comparator.holds(value, rule.threshold) {
                    transitions.push(AlertTransition::Fire {
                        dedupe_key,
                        message: rule.render_message(&resource, raw),
                        level: rule.level,
                        kind: rule.kind,
                        source: rule.source.clone(),
                    });
                } else {
                    transitions.push(AlertTransition::Clear { dedupe_key });
                }
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_view(usage: &str) -> CurrentView {
        let mut view = CurrentView::new();
        view.insert(
            Domain::System,
            "cpu",
            HashMap::from([("usage_percent".to_string(), usage.to_string())]),
        );
        view
    }

    fn engine() -> RuleEngine {
        RuleEngine::with_thresholds(&Thresholds::default())
    }

    #[test]
    fn test_fire_when_threshold_exceeded() {
        let transitions = engine().evaluate(&cpu_view("85.00"));

        assert!(transitions.iter().any(|t| matches!(
            t,
            AlertTransition::Fire { dedupe_key, level, .. }
                if dedupe_key == "HIGH_CPU_USAGE" && *level == AlertLevel::Warning
        )));
    }

    #[test]
    fn test_clear_when_value_below_threshold() {
        let transitions = engine().evaluate(&cpu_view("50.00"));

        assert!(transitions.contains(&AlertTransition::Clear {
            dedupe_key: "HIGH_CPU_USAGE".to_string()
        }));
    }

    #[test]
    fn test_missing_field_yields_no_transition() {
        let mut view = CurrentView::new();
        view.insert(Domain::System, "cpu", HashMap::new());

        let transitions = engine().evaluate(&view);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_unparseable_value_yields_no_transition() {
        let transitions = engine().evaluate(&cpu_view("n/a"));
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_per_resource_rule_enumerates_all_resources() {
        let mut view = CurrentView::new();
        view.insert(
            Domain::Storage,
            "_data",
            HashMap::from([("usage_percent".to_string(), "95.00".to_string())]),
        );
        view.insert(
            Domain::Storage,
            "_var",
            HashMap::from([("usage_percent".to_string(), "40.00".to_string())]),
        );

        let transitions = engine().evaluate(&view);

        assert!(transitions.iter().any(|t| matches!(
            t,
            AlertTransition::Fire { dedupe_key, .. } if dedupe_key == "DISK_SPACE_LOW:_data"
        )));
        assert!(transitions.contains(&AlertTransition::Clear {
            dedupe_key: "DISK_SPACE_LOW:_var".to_string()
        }));
    }

    #[test]
    fn test_container_down_fires_on_running_flag() {
        let mut view = CurrentView::new();
        view.insert(
            Domain::Docker,
            "abc123",
            HashMap::from([("running".to_string(), "0".to_string())]),
        );

        let transitions = engine().evaluate(&view);

        assert!(transitions.iter().any(|t| matches!(
            t,
            AlertTransition::Fire { dedupe_key, kind, .. }
                if dedupe_key == "DOCKER_CONTAINER_DOWN:abc123"
                    && *kind == AlertKind::DockerContainerDown
        )));
    }

    #[test]
    fn test_message_templates_render() {
        let mut view = CurrentView::new();
        view.insert(
            Domain::Storage,
            "_data",
            HashMap::from([("usage_percent".to_string(), "95.50".to_string())]),
        );

        let transitions = engine().evaluate(&view);
        let Some(AlertTransition::Fire { message, .. }) = transitions.first() else {
            panic!("expected a fire transition");
        };

        assert_eq!(message, "Disk _data usage is high: 95.50%");
    }

    #[test]
    fn test_comparators() {
        assert!(Comparator::Gt.holds(81.0, 80.0));
        assert!(!Comparator::Gt.holds(80.0, 80.0));
        assert!(Comparator::Ge.holds(80.0, 80.0));
        assert!(Comparator::Lt.holds(0.0, 1.0));
        assert!(!Comparator::Lt.holds(1.0, 1.0));
        assert!(Comparator::Le.holds(1.0, 1.0));
    }
}
