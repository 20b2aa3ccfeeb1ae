use miette::Diagnostic;
use thiserror::Error;

/// Error taxonomy for the monitoring core. Registry and monitor APIs
/// surface these verbatim; probe execution failures never reach this type —
/// they are recovered locally into a `ProbeResult` and fed through the
/// state machine instead.
#[derive(Error, Debug, Diagnostic)]
pub enum MonitorError {
    /// Duplicate id on insert.
    #[error("target already registered: {id}")]
    #[diagnostic(
        code(sentinel::target_exists),
        help("remove the existing target first, or call add_or_update instead of add")
    )]
    TargetExists {
        #[allow(unused)]
        id: String,
    },

    /// Lookup, remove, or update of an id the registry does not hold.
    #[error("target not found: {id}")]
    #[diagnostic(
        code(sentinel::target_not_found),
        help("the target may have been removed concurrently; re-check registry.all() for the current set")
    )]
    TargetNotFound {
        #[allow(unused)]
        id: String,
    },

    /// A target declares a probe but the monitor has no prober factory.
    #[error("prober factory missing for target {id}")]
    #[diagnostic(
        code(sentinel::prober_factory_missing),
        help("construct the monitor's Config with a prober factory before adding probing targets")
    )]
    ProberFactoryMissing {
        #[allow(unused)]
        id: String,
    },

    /// Probe type was blank while building a prober.
    #[error("empty probe type for target {id}")]
    #[diagnostic(
        code(sentinel::empty_probe_type),
        help("set a non-empty probe_type on the target, or leave probe_type empty and drop with_probe entirely")
    )]
    EmptyProbeType {
        #[allow(unused)]
        id: String,
    },

    /// Reserved for external use; the core's start/stop are idempotent and
    /// never return this variant themselves.
    #[error("monitor is not running")]
    #[diagnostic(code(sentinel::monitor_not_running))]
    MonitorNotRunning,

    /// Reserved for external use; the core's start/stop are idempotent and
    /// never return this variant themselves.
    #[error("monitor is already running")]
    #[diagnostic(code(sentinel::monitor_already_running))]
    MonitorAlreadyRunning,

    /// The prober factory itself failed to build a prober for a target.
    #[error("prober factory failed for target {id}: {message}")]
    #[diagnostic(
        code(sentinel::factory_failed),
        help("check the factory's handling of probe_type \"{probe_type}\"")
    )]
    Factory {
        #[allow(unused)]
        id: String,
        #[allow(unused)]
        probe_type: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    pub fn target_exists(id: impl Into<String>) -> Self {
        Self::TargetExists { id: id.into() }
    }

    pub fn target_not_found(id: impl Into<String>) -> Self {
        Self::TargetNotFound { id: id.into() }
    }

    pub fn prober_factory_missing(id: impl Into<String>) -> Self {
        Self::ProberFactoryMissing { id: id.into() }
    }

    pub fn empty_probe_type(id: impl Into<String>) -> Self {
        Self::EmptyProbeType { id: id.into() }
    }

    pub fn factory(
        id: impl Into<String>,
        probe_type: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let message = source.to_string();
        Self::Factory {
            id: id.into(),
            probe_type: probe_type.into(),
            message,
            source: Some(source),
        }
    }
}
