use crate::status::HealthState;
use crate::target::TargetSnapshot;
use serde::{Deserialize, Serialize};

/// A lifecycle or health-transition event emitted by the monitor.
///
/// Modelled as a tagged union (rather than a shared base type with
/// inheritance) so a host can serialize it over any wire format without the
/// core depending on one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A target was newly registered (via the host API or a discoverer).
    Added { target: TargetSnapshot },
    /// A target was removed. `target` carries only an id — the registry
    /// entry no longer exists by the time this event is constructed.
    Removed { target: TargetSnapshot },
    /// A known target's definition was refreshed in place (no identity
    /// change).
    Updated { target: TargetSnapshot },
    /// A target's health state changed.
    HealthChanged {
        target: TargetSnapshot,
        previous_state: HealthState,
        new_state: HealthState,
    },
}

impl Event {
    pub fn added(target: TargetSnapshot) -> Self {
        Self::Added { target }
    }

    pub fn removed(id: impl Into<String>) -> Self {
        Self::Removed {
            target: TargetSnapshot::id_only(id),
        }
    }

    pub fn updated(target: TargetSnapshot) -> Self {
        Self::Updated { target }
    }

    pub fn health_changed(
        target: TargetSnapshot,
        previous_state: HealthState,
        new_state: HealthState,
    ) -> Self {
        Self::HealthChanged {
            target,
            previous_state,
            new_state,
        }
    }

    /// The target snapshot carried by every event variant.
    pub fn target(&self) -> &TargetSnapshot {
        match self {
            Event::Added { target }
            | Event::Removed { target }
            | Event::Updated { target }
            | Event::HealthChanged { target, .. } => target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_event_carries_only_id() {
        let event = Event::removed("docker:abc123");
        assert_eq!(event.target().id, "docker:abc123");
        assert!(event.target().name.is_empty());
    }

    #[test]
    fn health_changed_round_trips_through_json() {
        let event = Event::health_changed(
            TargetSnapshot::id_only("remote:api"),
            HealthState::Unknown,
            HealthState::Healthy,
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"health_changed\""));
        let back: Event = serde_json::from_str(&json).unwrap();
        match back {
            Event::HealthChanged {
                previous_state,
                new_state,
                ..
            } => {
                assert_eq!(previous_state, HealthState::Unknown);
                assert_eq!(new_state, HealthState::Healthy);
            }
            _ => panic!("expected HealthChanged"),
        }
    }
}
