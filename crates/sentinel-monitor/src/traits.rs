use async_trait::async_trait;
use sentinel_types::{Event, MonitorError, ProbeResult, Target, TargetType};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What a target is probed with: the probe type string and the opaque
/// address/selector that identifies it within that probe's domain (a unit
/// name, a container id, a URL, ...).
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub probe_type: String,
    pub address: String,
}

impl ProbeTarget {
    pub fn from_target(target: &Target) -> Self {
        Self {
            probe_type: target.probe_type().to_string(),
            address: target.probe_target().to_string(),
        }
    }
}

/// A single probe mechanism, e.g. "exec a health check command" or "open a
/// TCP connection". Implementations must be cheap to hold for a target's
/// entire lifetime and safe to call concurrently for distinct targets.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, ctx: CancellationToken, target: &ProbeTarget) -> ProbeResult;
}

/// Builds a `Prober` for a probe type on demand. The monitor asks the
/// factory once per target, when the target is first scheduled, and keeps
/// the resulting `Prober` for the target's lifetime.
#[async_trait]
pub trait ProberFactory: Send + Sync {
    fn create(
        &self,
        probe_type: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn Prober>, MonitorError>;
}

/// Produces the current set of targets that should exist, e.g. by listing
/// containers or querying an orchestrator API. The monitor reconciles its
/// registry against this list on each discovery tick; it never removes a
/// target the discoverer didn't itself add.
#[async_trait]
pub trait Discoverer: Send + Sync {
    async fn discover(&self, ctx: CancellationToken) -> Result<Vec<Target>, MonitorError>;

    /// The target type this discoverer produces, for diagnostics and
    /// future filtering; discovery passes do not branch on it.
    fn target_type(&self) -> TargetType;
}

/// Produces a stream of externally observed lifecycle events (a target was
/// created, removed, or otherwise changed) without the monitor having to
/// poll. Implementations run until `ctx` is cancelled, then drop their
/// sender so the returned receiver closes.
#[async_trait]
pub trait Watcher: Send + Sync {
    async fn watch(&self, ctx: CancellationToken) -> Result<mpsc::Receiver<Event>, MonitorError>;

    fn target_type(&self) -> TargetType;
}
