//! Registry, scheduler, and external-collaborator traits for the sentinel
//! external-target monitoring core.
//!
//! A [`Monitor`] binds a [`Config`] and owns a [`Registry`]; `start` launches
//! one probe loop per probing target plus discovery/watcher loops, `stop`
//! tears them all down. Collaborators plug in through the [`Prober`],
//! [`ProberFactory`], [`Discoverer`], and [`Watcher`] traits.

pub mod config;
pub mod monitor;
pub mod registry;
pub mod traits;

pub use config::{Config, HealthChangeCallback, HealthyCallback, UnhealthyCallback};
pub use monitor::Monitor;
pub use registry::{HealthSummary, Registry};
pub use traits::{Discoverer, ProbeTarget, Prober, ProberFactory, Watcher};

pub use sentinel_types::*;
