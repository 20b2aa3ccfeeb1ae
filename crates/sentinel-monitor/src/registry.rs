use parking_lot::RwLock;
use sentinel_types::{HealthState, MonitorError, Result, Status, Target, TargetType};
use std::collections::HashMap;
use std::sync::Arc;

struct RegistryInner {
    targets: HashMap<String, Arc<Target>>,
    statuses: HashMap<String, Arc<Status>>,
}

/// Thread-safe store mapping `target_id -> Target` and `target_id ->
/// Status` under a single readers-writer lock, so callers never observe
/// one map without the other.
///
/// Snapshot methods (`all`, `all_statuses`, `by_type`, `by_state`) copy
/// `Arc` handles into a fresh `Vec` under a shared lock; the registry
/// itself owns the authoritative maps. `Status` values are replaced
/// wholesale on every `update_status` call rather than mutated in place, so
/// a snapshot obtained before a transition is a frozen view of the old
/// state, never a half-updated one.
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                targets: HashMap::new(),
                statuses: HashMap::new(),
            }),
        }
    }

    /// Insert `target` if its id is not already registered. Creates a fresh
    /// `Status` in state `unknown`.
    pub fn add(&self, target: Target) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.targets.contains_key(target.id()) {
            return Err(MonitorError::target_exists(target.id()));
        }
        let status = Arc::new(Status::new(&target));
        let id = target.id().to_string();
        inner.targets.insert(id.clone(), Arc::new(target));
        inner.statuses.insert(id, status);
        Ok(())
    }

    /// Upsert `target`. An existing status is preserved; a new target gets
    /// a fresh `unknown` status.
    pub fn add_or_update(&self, target: Target) {
        let mut inner = self.inner.write();
        let id = target.id().to_string();
        if !inner.statuses.contains_key(&id) {
            inner.statuses.insert(id.clone(), Arc::new(Status::new(&target)));
        }
        inner.targets.insert(id, Arc::new(target));
    }

    /// Remove both the target and its status. Fails if the id is unknown.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.targets.remove(id).is_none() {
            return Err(MonitorError::target_not_found(id));
        }
        inner.statuses.remove(id);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<Target>> {
        self.inner.read().targets.get(id).cloned()
    }

    pub fn get_status(&self, id: &str) -> Option<Arc<Status>> {
        self.inner.read().statuses.get(id).cloned()
    }

    pub fn all(&self) -> Vec<Arc<Target>> {
        self.inner.read().targets.values().cloned().collect()
    }

    pub fn all_statuses(&self) -> Vec<Arc<Status>> {
        self.inner.read().statuses.values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.inner.read().targets.len()
    }

    pub fn by_type(&self, target_type: TargetType) -> Vec<Arc<Target>> {
        self.inner
            .read()
            .targets
            .values()
            .filter(|t| t.target_type() == target_type)
            .cloned()
            .collect()
    }

    pub fn by_state(&self, state: HealthState) -> Vec<Arc<Status>> {
        self.inner
            .read()
            .statuses
            .values()
            .filter(|s| s.state() == state)
            .cloned()
            .collect()
    }

    /// Atomically apply `f` to a clone of the current status for `id` and
    /// swap the result in. `f` returns `(previous_state, new_state)` — the
    /// same pair the mutation methods on `Status` already produce — so
    /// callers thread that straight through without a second lookup.
    ///
    /// `f` runs while the exclusive lock is held and must not call back
    /// into this registry; its signature only exposes `&mut Status`, not
    /// `&Registry`, to make that misuse a compile error rather than a
    /// runtime deadlock.
    pub fn update_status<F>(&self, id: &str, f: F) -> Result<(HealthState, HealthState)>
    where
        F: FnOnce(&mut Status) -> (HealthState, HealthState),
    {
        let mut inner = self.inner.write();
        let current = inner
            .statuses
            .get(id)
            .ok_or_else(|| MonitorError::target_not_found(id))?;
        let mut next = (**current).clone();
        let transition = f(&mut next);
        inner.statuses.insert(id.to_string(), Arc::new(next));
        Ok(transition)
    }

    pub fn health_summary(&self) -> HealthSummary {
        let inner = self.inner.read();
        let mut by_type = HashMap::new();
        for target in inner.targets.values() {
            *by_type.entry(target.target_type()).or_insert(0usize) += 1;
        }
        let mut by_state = HashMap::new();
        for status in inner.statuses.values() {
            *by_state.entry(status.state()).or_insert(0usize) += 1;
        }
        HealthSummary {
            total: inner.targets.len(),
            by_type,
            by_state,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate counts over the registry's current targets and statuses.
#[derive(Debug, Clone)]
pub struct HealthSummary {
    pub total: usize,
    pub by_type: HashMap<TargetType, usize>,
    pub by_state: HashMap<HealthState, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_types::{ProbeResult, TargetSource, TargetType};
    use std::time::Duration;

    fn target(id: &str) -> Target {
        Target::new(id, id, TargetType::Remote).with_probe("tcp", "127.0.0.1:1")
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        let err = registry.add(target("remote:a")).unwrap_err();
        assert!(matches!(err, MonitorError::TargetExists { .. }));
    }

    #[test]
    fn add_creates_unknown_status() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        let status = registry.get_status("remote:a").unwrap();
        assert_eq!(status.state(), HealthState::Unknown);
    }

    #[test]
    fn remove_unknown_id_fails() {
        let registry = Registry::new();
        let err = registry.remove("remote:missing").unwrap_err();
        assert!(matches!(err, MonitorError::TargetNotFound { .. }));
    }

    #[test]
    fn remove_deletes_both_target_and_status() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        registry.remove("remote:a").unwrap();
        assert!(registry.get("remote:a").is_none());
        assert!(registry.get_status("remote:a").is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn add_or_update_preserves_existing_status() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        registry
            .update_status("remote:a", |s| {
                s.record_probe(ProbeResult::success("ok", Duration::ZERO), 1, 3)
            })
            .unwrap();

        let updated = target("remote:a").with_source(TargetSource::Discovered);
        registry.add_or_update(updated);

        let status = registry.get_status("remote:a").unwrap();
        assert_eq!(status.state(), HealthState::Healthy);
        assert_eq!(registry.get("remote:a").unwrap().source(), TargetSource::Discovered);
    }

    #[test]
    fn add_or_update_creates_status_for_new_target() {
        let registry = Registry::new();
        registry.add_or_update(target("remote:new"));
        assert!(registry.get_status("remote:new").is_some());
    }

    #[test]
    fn update_status_unknown_id_fails_without_side_effects() {
        let registry = Registry::new();
        let err = registry
            .update_status("remote:missing", |s| {
                s.record_probe(ProbeResult::success("ok", Duration::ZERO), 1, 1)
            })
            .unwrap_err();
        assert!(matches!(err, MonitorError::TargetNotFound { .. }));
    }

    #[test]
    fn snapshots_are_independent_of_later_mutation() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        let snapshot_before = registry.get_status("remote:a").unwrap();

        registry
            .update_status("remote:a", |s| {
                s.record_probe(ProbeResult::success("ok", Duration::ZERO), 1, 1)
            })
            .unwrap();

        assert_eq!(snapshot_before.state(), HealthState::Unknown);
        let current = registry.get_status("remote:a").unwrap();
        assert_eq!(current.state(), HealthState::Healthy);
    }

    #[test]
    fn health_summary_is_consistent_with_count() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        registry.add(target("remote:b")).unwrap();
        registry
            .update_status("remote:a", |s| {
                s.record_probe(ProbeResult::success("ok", Duration::ZERO), 1, 1)
            })
            .unwrap();

        let summary = registry.health_summary();
        assert_eq!(summary.total, registry.count());
        assert_eq!(summary.by_type.values().sum::<usize>(), summary.total);
        assert_eq!(summary.by_state.values().sum::<usize>(), summary.total);
    }

    #[test]
    fn by_type_and_by_state_filter_correctly() {
        let registry = Registry::new();
        registry.add(target("remote:a")).unwrap();
        registry
            .add(Target::new("systemd:x", "x", TargetType::Systemd).with_probe("exec", "true"))
            .unwrap();
        registry
            .update_status("remote:a", |s| {
                s.record_probe(ProbeResult::success("ok", Duration::ZERO), 1, 1)
            })
            .unwrap();

        assert_eq!(registry.by_type(TargetType::Remote).len(), 1);
        assert_eq!(registry.by_type(TargetType::Systemd).len(), 1);
        assert_eq!(registry.by_state(HealthState::Healthy).len(), 1);
        assert_eq!(registry.by_state(HealthState::Unknown).len(), 1);
    }
}
