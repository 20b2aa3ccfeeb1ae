use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Closed set of target kinds the monitoring core understands.
///
/// The core never inspects a target's kind beyond bucketing and display —
/// concrete adapters (systemd, docker, kubernetes, …) live outside this
/// crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Systemd,
    Openrc,
    #[serde(rename = "bsd-rc")]
    BsdRc,
    Docker,
    Podman,
    Kubernetes,
    Nomad,
    Remote,
    Custom,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TargetType::Systemd => "systemd",
            TargetType::Openrc => "openrc",
            TargetType::BsdRc => "bsd-rc",
            TargetType::Docker => "docker",
            TargetType::Podman => "podman",
            TargetType::Kubernetes => "kubernetes",
            TargetType::Nomad => "nomad",
            TargetType::Remote => "remote",
            TargetType::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

/// Whether a target was registered by the host or ingested by a discoverer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    Static,
    Discovered,
}

/// An externally owned entity under observation.
///
/// A `Target` never controls the lifecycle of what it describes; it only
/// carries the identity and probe binding the monitoring core needs in
/// order to watch it. `id` is treated as immutable by the registry once a
/// target has been registered — constructing a new `Target` with the same
/// id and re-registering it is an update, not a mutation in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    id: String,
    name: String,
    target_type: TargetType,
    source: TargetSource,
    labels: HashMap<String, String>,
    probe_type: String,
    probe_target: String,
    interval: Duration,
    timeout: Duration,
    success_threshold: u32,
    failure_threshold: u32,
}

impl Target {
    /// Create a bare target with no probe binding. Use the `with_*` builders
    /// to attach a probe, labels, or timing overrides.
    pub fn new(id: impl Into<String>, name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target_type,
            source: TargetSource::Static,
            labels: HashMap::new(),
            probe_type: String::new(),
            probe_target: String::new(),
            interval: Duration::ZERO,
            timeout: Duration::ZERO,
            success_threshold: 0,
            failure_threshold: 0,
        }
    }

    pub fn with_source(mut self, source: TargetSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach a probe binding. An empty `probe_type` disables probing for
    /// this target, regardless of `probe_target`.
    pub fn with_probe(mut self, probe_type: impl Into<String>, probe_target: impl Into<String>) -> Self {
        self.probe_type = probe_type.into();
        self.probe_target = probe_target.into();
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn source(&self) -> TargetSource {
        self.source
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    pub fn probe_type(&self) -> &str {
        &self.probe_type
    }

    pub fn probe_target(&self) -> &str {
        &self.probe_target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn success_threshold(&self) -> u32 {
        self.success_threshold
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// A target has a probe iff its probe type is non-empty. This is the
    /// single source of truth for the `probe_type == "" <=> !has_probe`
    /// invariant — there is no separate flag to fall out of sync.
    pub fn has_probe(&self) -> bool {
        !self.probe_type.is_empty()
    }

    pub fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            target_type: Some(self.target_type),
            source: Some(self.source),
            labels: self.labels.clone(),
        }
    }
}

/// A denormalized, serializable view of a [`Target`] carried in event
/// payloads. `target_type`/`source`/`labels` are absent for a `removed`
/// event, where only the id is known to still be meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub id: String,
    pub name: String,
    pub target_type: Option<TargetType>,
    pub source: Option<TargetSource>,
    pub labels: HashMap<String, String>,
}

impl TargetSnapshot {
    /// A snapshot carrying only an id, used for `removed` events where the
    /// target no longer exists in the registry.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            target_type: None,
            source: None,
            labels: HashMap::new(),
        }
    }
}
