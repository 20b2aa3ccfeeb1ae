//! Data model, error taxonomy, and effective-configuration math for the
//! sentinel external-target monitoring core.
//!
//! This crate has no opinion on scheduling or I/O — it defines the value
//! types (`Target`, `Status`, `Event`, `ProbeResult`) and pure functions
//! (`EffectiveConfig`) that `sentinel-monitor` builds the registry and
//! scheduler on top of.

pub mod defaults;
pub mod error;
pub mod event;
pub mod probe;
pub mod status;
pub mod target;

pub use defaults::{package_defaults, resolve_discovery_interval, EffectiveConfig, MonitorDefaults};
pub use error::{MonitorError, Result};
pub use event::Event;
pub use probe::ProbeResult;
pub use status::{HealthState, Status};
pub use target::{Target, TargetSnapshot, TargetSource, TargetType};
