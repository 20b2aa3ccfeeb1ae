use crate::traits::{Discoverer, ProberFactory, Watcher};
use sentinel_types::{Event, HealthState, MonitorDefaults};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Callback fired whenever a target's health state changes, with the
/// target id and the previous/new `HealthState`.
pub type HealthChangeCallback = Arc<dyn Fn(&str, HealthState, HealthState) + Send + Sync>;

/// Callback fired when a target transitions into `unhealthy`, with the
/// target id and the reason text from the triggering probe.
pub type UnhealthyCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Callback fired when a target recovers from `unhealthy` to `healthy`.
pub type HealthyCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Wiring for a `Monitor`: the optional prober factory that turns probe
/// types into probers, the default timing applied to targets that don't
/// override it, and the optional discovery/watch/notification collaborators.
///
/// Built with a fluent, consuming builder. The prober factory is optional —
/// a monitor watching only non-probing targets (pure discovery/watch
/// ingestion) needs no way to build probers at all; adding a probing target
/// without one fails with `ProberFactoryMissing`.
pub struct Config {
    pub(crate) prober_factory: Option<Arc<dyn ProberFactory>>,
    pub(crate) defaults: MonitorDefaults,
    pub(crate) discoverers: Vec<Arc<dyn Discoverer>>,
    pub(crate) watchers: Vec<Arc<dyn Watcher>>,
    pub(crate) event_sender: Option<mpsc::Sender<Event>>,
    pub(crate) on_health_change: Option<HealthChangeCallback>,
    pub(crate) on_unhealthy: Option<UnhealthyCallback>,
    pub(crate) on_healthy: Option<HealthyCallback>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            prober_factory: None,
            defaults: MonitorDefaults::default(),
            discoverers: Vec::new(),
            watchers: Vec::new(),
            event_sender: None,
            on_health_change: None,
            on_unhealthy: None,
            on_healthy: None,
        }
    }

    pub fn with_prober_factory(mut self, prober_factory: Arc<dyn ProberFactory>) -> Self {
        self.prober_factory = Some(prober_factory);
        self
    }

    pub fn with_defaults(mut self, defaults: MonitorDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the discoverer set. Passing a non-empty list is what turns
    /// discovery polling on; an empty monitor never runs a discovery loop.
    pub fn with_discoverers(mut self, discoverers: Vec<Arc<dyn Discoverer>>) -> Self {
        self.discoverers = discoverers;
        self
    }

    pub fn with_watchers(mut self, watchers: Vec<Arc<dyn Watcher>>) -> Self {
        self.watchers = watchers;
        self
    }

    /// Targets for outbound lifecycle/health events. Sends use `try_send`
    /// and drop silently on a full channel — a slow consumer never blocks
    /// probing.
    pub fn with_event_sender(mut self, sender: mpsc::Sender<Event>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    pub fn with_health_change_callback(mut self, callback: HealthChangeCallback) -> Self {
        self.on_health_change = Some(callback);
        self
    }

    pub fn with_unhealthy_callback(mut self, callback: UnhealthyCallback) -> Self {
        self.on_unhealthy = Some(callback);
        self
    }

    pub fn with_healthy_callback(mut self, callback: HealthyCallback) -> Self {
        self.on_healthy = Some(callback);
        self
    }

    pub fn defaults(&self) -> &MonitorDefaults {
        &self.defaults
    }

    pub fn has_discovery(&self) -> bool {
        !self.discoverers.is_empty()
    }

    pub fn has_watchers(&self) -> bool {
        !self.watchers.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
