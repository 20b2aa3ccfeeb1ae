use crate::probe::ProbeResult;
use crate::target::{Target, TargetType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health classification produced by the state machine.
///
/// The core's hysteresis only ever produces `unknown -> healthy -> unhealthy
/// <-> healthy` transitions; `degraded` is reserved for adapters that set it
/// directly via `Registry::update_status` and has no dedicated hysteresis
/// path here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Unknown,
    Healthy,
    Unhealthy,
    Degraded,
}

/// Per-target runtime state: the latest probe observation plus the
/// consecutive-outcome counters that drive hysteresis.
#[derive(Debug, Clone)]
pub struct Status {
    target_id: String,
    name: String,
    target_type: TargetType,
    state: HealthState,
    last_probe_result: Option<ProbeResult>,
    last_probe_time: Option<DateTime<Utc>>,
    last_state_change: Option<DateTime<Utc>>,
    consecutive_successes: u32,
    consecutive_failures: u32,
    message: String,
}

impl Status {
    /// A fresh status for a just-registered target: state `unknown`, no
    /// probes observed yet.
    pub fn new(target: &Target) -> Self {
        Self {
            target_id: target.id().to_string(),
            name: target.name().to_string(),
            target_type: target.target_type(),
            state: HealthState::Unknown,
            last_probe_result: None,
            last_probe_time: None,
            last_state_change: None,
            consecutive_successes: 0,
            consecutive_failures: 0,
            message: String::new(),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn last_probe_result(&self) -> Option<&ProbeResult> {
        self.last_probe_result.as_ref()
    }

    pub fn last_probe_time(&self) -> Option<DateTime<Utc>> {
        self.last_probe_time
    }

    pub fn last_state_change(&self) -> Option<DateTime<Utc>> {
        self.last_state_change
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Feed a single probe outcome through the hysteresis state machine.
    ///
    /// Returns `(previous_state, new_state)` so callers can detect a
    /// transition without re-reading `state()` before and after under a
    /// separate lock acquisition.
    pub fn record_probe(
        &mut self,
        result: ProbeResult,
        success_threshold: u32,
        failure_threshold: u32,
    ) -> (HealthState, HealthState) {
        let previous = self.state;
        let now = Utc::now();

        self.message = result.message().to_string();
        self.last_probe_time = Some(now);

        if result.success {
            self.consecutive_successes += 1;
            self.consecutive_failures = 0;
            if self.consecutive_successes >= success_threshold {
                self.state = HealthState::Healthy;
            }
        } else {
            self.consecutive_failures += 1;
            self.consecutive_successes = 0;
            if self.consecutive_failures >= failure_threshold {
                self.state = HealthState::Unhealthy;
            }
        }

        self.last_probe_result = Some(result);

        if self.state != previous {
            self.last_state_change = Some(now);
        }

        (previous, self.state)
    }

    /// Force the healthy terminal state, bypassing hysteresis. Resets the
    /// failure counter so a subsequent probe starts a fresh failure window.
    pub fn mark_healthy(&mut self, message: impl Into<String>) -> (HealthState, HealthState) {
        self.force_state(HealthState::Healthy, message)
    }

    /// Force the unhealthy terminal state, bypassing hysteresis. Resets the
    /// success counter so a subsequent probe starts a fresh success window.
    pub fn mark_unhealthy(&mut self, message: impl Into<String>) -> (HealthState, HealthState) {
        self.force_state(HealthState::Unhealthy, message)
    }

    fn force_state(&mut self, state: HealthState, message: impl Into<String>) -> (HealthState, HealthState) {
        let previous = self.state;
        self.message = message.into();
        self.state = state;
        match state {
            HealthState::Healthy => self.consecutive_failures = 0,
            HealthState::Unhealthy => self.consecutive_successes = 0,
            _ => {}
        }
        if self.state != previous {
            self.last_state_change = Some(Utc::now());
        }
        (previous, self.state)
    }

    /// Latency of the most recent probe, or zero if none has run yet.
    pub fn latency(&self) -> Duration {
        self.last_probe_result
            .as_ref()
            .map(|r| r.latency)
            .unwrap_or(Duration::ZERO)
    }

    /// Elapsed time since the last probe, or zero if none has run yet.
    pub fn since_last_probe(&self) -> Duration {
        since(self.last_probe_time)
    }

    /// Elapsed time since the last observed state change, or zero if the
    /// state has never changed.
    pub fn since_last_state_change(&self) -> Duration {
        since(self.last_state_change)
    }
}

fn since(t: Option<DateTime<Utc>>) -> Duration {
    match t {
        Some(t) => (Utc::now() - t).to_std().unwrap_or(Duration::ZERO),
        None => Duration::ZERO,
    }
}
