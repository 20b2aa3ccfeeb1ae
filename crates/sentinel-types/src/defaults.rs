use crate::target::Target;
use std::time::Duration;

/// Package-wide fallback values, consulted only when neither a target
/// override nor a monitor default supplies a positive value.
pub mod package_defaults {
    use std::time::Duration;

    pub const INTERVAL: Duration = Duration::from_secs(30);
    pub const TIMEOUT: Duration = Duration::from_secs(5);
    pub const SUCCESS_THRESHOLD: u32 = 1;
    pub const FAILURE_THRESHOLD: u32 = 3;
    pub const DISCOVERY_INTERVAL: Duration = Duration::from_secs(60);
}

/// Per-monitor defaults, consulted when a target does not override a value.
/// A zero field means "no monitor-level default; fall through to the
/// package default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorDefaults {
    pub interval: Duration,
    pub timeout: Duration,
    pub success_threshold: u32,
    pub failure_threshold: u32,
    pub discovery_interval: Duration,
}

impl Default for MonitorDefaults {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            timeout: Duration::ZERO,
            success_threshold: 0,
            failure_threshold: 0,
            discovery_interval: Duration::ZERO,
        }
    }
}

/// Fully-resolved timing/threshold values for one target, after applying
/// override -> monitor default -> package default independently per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub success_threshold: u32,
    pub failure_threshold: u32,
}

impl EffectiveConfig {
    pub fn resolve(target: &Target, defaults: &MonitorDefaults) -> Self {
        Self {
            interval: pick_duration(target.interval(), defaults.interval, package_defaults::INTERVAL),
            timeout: pick_duration(target.timeout(), defaults.timeout, package_defaults::TIMEOUT),
            success_threshold: pick_u32(
                target.success_threshold(),
                defaults.success_threshold,
                package_defaults::SUCCESS_THRESHOLD,
            ),
            failure_threshold: pick_u32(
                target.failure_threshold(),
                defaults.failure_threshold,
                package_defaults::FAILURE_THRESHOLD,
            ),
        }
    }

    /// A target is health-checkable iff it declares a probe and resolves to
    /// a positive interval and timeout.
    pub fn is_health_checkable(target: &Target, defaults: &MonitorDefaults) -> bool {
        if !target.has_probe() {
            return false;
        }
        let effective = Self::resolve(target, defaults);
        !effective.interval.is_zero() && !effective.timeout.is_zero()
    }
}

/// Resolve the discovery loop's tick interval: monitor default if positive,
/// else the package default.
pub fn resolve_discovery_interval(defaults: &MonitorDefaults) -> Duration {
    if !defaults.discovery_interval.is_zero() {
        defaults.discovery_interval
    } else {
        package_defaults::DISCOVERY_INTERVAL
    }
}

fn pick_duration(ovr: Duration, default: Duration, package: Duration) -> Duration {
    if !ovr.is_zero() {
        ovr
    } else if !default.is_zero() {
        default
    } else {
        package
    }
}

fn pick_u32(ovr: u32, default: u32, package: u32) -> u32 {
    if ovr > 0 {
        ovr
    } else if default > 0 {
        default
    } else {
        package
    }
}
