use crate::config::Config;
use crate::registry::{HealthSummary, Registry};
use crate::traits::{Prober, ProbeTarget};
use parking_lot::Mutex;
use sentinel_types::{
    EffectiveConfig, Event, HealthState, MonitorError, Result, Status, Target, TargetSnapshot,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Per-target prober plus the task running its probe loop. Held separately
/// from the registry because the registry only knows about `Target`/`Status`
/// data, never about scheduling state.
struct ProbeHandle {
    prober: Arc<dyn Prober>,
    task: Option<JoinHandle<()>>,
}

struct RunState {
    running: bool,
    stop_token: CancellationToken,
    /// The external context handed to `start`, remembered so a target added
    /// later via `add_target` can be scheduled under the same cancellation
    /// as every loop launched at `start` time.
    ctx: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Owns a `Registry`, a pool of background tokio tasks, and the wiring in
/// `Config`. Constructing a `Monitor` starts nothing; call `start` to launch
/// probe/discovery/watcher loops and `stop` to tear them down cleanly.
pub struct Monitor {
    config: Config,
    registry: Arc<Registry>,
    probers: Mutex<HashMap<String, ProbeHandle>>,
    run: Mutex<RunState>,
    is_running: AtomicBool,
    /// Lets instance methods taking only `&self` (`add_target`, called
    /// before the caller necessarily holds an `Arc`) spawn self-referencing
    /// tasks without requiring every caller to thread an `Arc<Monitor>`
    /// through. Upgraded only while scheduling a new loop.
    self_ref: Weak<Monitor>,
}

impl Monitor {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            config,
            registry: Arc::new(Registry::new()),
            probers: Mutex::new(HashMap::new()),
            run: Mutex::new(RunState {
                running: false,
                stop_token: CancellationToken::new(),
                ctx: CancellationToken::new(),
                tasks: Vec::new(),
            }),
            is_running: AtomicBool::new(false),
            self_ref: weak.clone(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn health(&self) -> HealthSummary {
        self.registry.health_summary()
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn target_count(&self) -> usize {
        self.registry.count()
    }

    pub fn get_status(&self, id: &str) -> Option<Arc<Status>> {
        self.registry.get_status(id)
    }

    pub fn all_statuses(&self) -> Vec<Arc<Status>> {
        self.registry.all_statuses()
    }

    /// Register `target`. Builds and stores a prober through the
    /// configured factory if the target declares one; rolls back the
    /// registry insertion if prober construction fails. If the monitor is
    /// currently running, launches the target's probe loop immediately.
    pub fn add_target(&self, target: Target) -> Result<()> {
        let id = target.id().to_string();
        self.registry.add(target)?;

        if let Err(err) = self.attach_prober(&id) {
            // best effort: roll back the registry insertion
            let _ = self.registry.remove(&id);
            return Err(err);
        }

        if self.is_running() {
            if let Some(this) = self.self_ref.upgrade() {
                let ctx = this.run.lock().ctx.clone();
                this.spawn_probe_loop(id, ctx);
            }
        }
        Ok(())
    }

    /// Sequential best-effort insertion. Aborts on the first failure,
    /// wrapping it with the offending target's id; targets added before the
    /// failure remain registered.
    pub fn add_targets(&self, targets: Vec<Target>) -> Result<()> {
        for target in targets {
            let id = target.id().to_string();
            if let Err(err) = self.add_target(target) {
                warn!(target = %id, error = %err, "add_targets: aborting on first failure");
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn remove_target(&self, id: &str) -> Result<()> {
        self.registry.remove(id)?;
        self.probers.lock().remove(id);
        info!(target = id, "target removed");
        Ok(())
    }

    /// Build and store a prober for `id` if its target declares a probe.
    /// Targets without a probe are left unscheduled — not an error.
    fn attach_prober(&self, id: &str) -> Result<()> {
        let target = self
            .registry
            .get(id)
            .ok_or_else(|| MonitorError::target_not_found(id))?;

        if !target.has_probe() {
            return Ok(());
        }
        if target.probe_type().is_empty() {
            return Err(MonitorError::empty_probe_type(id));
        }

        let factory = self
            .config
            .prober_factory
            .as_ref()
            .ok_or_else(|| MonitorError::prober_factory_missing(id))?;

        let effective = EffectiveConfig::resolve(&target, self.config.defaults());
        let prober = factory.create(target.probe_type(), effective.timeout)?;

        self.probers.lock().insert(
            id.to_string(),
            ProbeHandle {
                prober,
                task: None,
            },
        );
        Ok(())
    }

    /// Idempotent. Launches one probe loop per probing target, one
    /// discovery loop if configured, and one watcher loop per watcher.
    pub async fn start(self: &Arc<Self>, ctx: CancellationToken) {
        {
            let mut run = self.run.lock();
            if run.running {
                return;
            }
            run.running = true;
            run.stop_token = CancellationToken::new();
            run.ctx = ctx.clone();
        }
        self.is_running.store(true, Ordering::SeqCst);
        info!("monitor starting");

        let ids: Vec<String> = self.probers.lock().keys().cloned().collect();
        for id in ids {
            self.spawn_probe_loop(id, ctx.clone());
        }

        if self.config.has_discovery() {
            let stop_token = self.run.lock().stop_token.clone();
            let this = Arc::clone(self);
            let ctx = ctx.clone();
            let handle = tokio::spawn(async move { this.discovery_loop(stop_token, ctx).await });
            self.run.lock().tasks.push(handle);
        }

        for watcher in self.config.watchers.clone() {
            let stop_token = self.run.lock().stop_token.clone();
            let this = Arc::clone(self);
            let ctx = ctx.clone();
            let handle =
                tokio::spawn(async move { this.watcher_loop(watcher, stop_token, ctx).await });
            self.run.lock().tasks.push(handle);
        }
    }

    /// Idempotent. Signals every background loop to stop and waits for them
    /// all to return.
    pub async fn stop(&self) {
        let (stop_token, tasks, prober_tasks) = {
            let mut run = self.run.lock();
            if !run.running {
                return;
            }
            run.running = false;
            let stop_token = run.stop_token.clone();
            let tasks: Vec<JoinHandle<()>> = run.tasks.drain(..).collect();
            let prober_tasks: Vec<JoinHandle<()>> = self
                .probers
                .lock()
                .values_mut()
                .filter_map(|handle| handle.task.take())
                .collect();
            (stop_token, tasks, prober_tasks)
        };
        self.is_running.store(false, Ordering::SeqCst);
        stop_token.cancel();

        for task in tasks.into_iter().chain(prober_tasks) {
            let _ = task.await;
        }
        info!("monitor stopped");
    }

    fn spawn_probe_loop(self: &Arc<Self>, id: String, ctx: CancellationToken) {
        let stop_token = self.run.lock().stop_token.clone();
        let this = Arc::clone(self);
        let task_id = id.clone();
        let handle = tokio::spawn(async move { this.probe_loop(task_id, stop_token, ctx).await });
        if let Some(probe_handle) = self.probers.lock().get_mut(&id) {
            probe_handle.task = Some(handle);
        }
    }

    async fn probe_loop(self: Arc<Self>, id: String, stop: CancellationToken, ctx: CancellationToken) {
        let prober = match self.probers.lock().get(&id).map(|h| Arc::clone(&h.prober)) {
            Some(p) => p,
            None => return,
        };

        let target = match self.registry.get(&id) {
            Some(t) => t,
            None => return,
        };
        let effective = EffectiveConfig::resolve(&target, self.config.defaults());

        if stop.is_cancelled() || ctx.is_cancelled() {
            return;
        }
        self.run_probe(&id, &prober, effective.timeout, &ctx).await;

        let mut ticker = tokio::time::interval(effective.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                _ = ctx.cancelled() => return,
                _ = ticker.tick() => {
                    if self.registry.get(&id).is_none() {
                        debug!(target = %id, "probe loop exiting: target removed");
                        return;
                    }
                    self.run_probe(&id, &prober, effective.timeout, &ctx).await;
                }
            }
        }
    }

    async fn run_probe(
        &self,
        id: &str,
        prober: &Arc<dyn Prober>,
        timeout: std::time::Duration,
        parent_ctx: &CancellationToken,
    ) {
        let target = match self.registry.get(id) {
            Some(t) => t,
            None => return,
        };
        let probe_target = ProbeTarget::from_target(&target);
        let deadline_ctx = parent_ctx.child_token();

        let result = match tokio::time::timeout(timeout, prober.probe(deadline_ctx.clone(), &probe_target)).await {
            Ok(result) => result,
            Err(_) => {
                deadline_ctx.cancel();
                sentinel_types::ProbeResult::failure("probe timed out", timeout)
            }
        };

        let effective = EffectiveConfig::resolve(&target, self.config.defaults());
        let outcome = self.registry.update_status(id, |status| {
            status.record_probe(result.clone(), effective.success_threshold, effective.failure_threshold)
        });

        let (previous, new) = match outcome {
            Ok(pair) => pair,
            Err(_) => return, // removed concurrently; abandon without notification
        };

        if previous != new {
            self.notify_transition(id, &target, previous, new, &result);
        }
    }

    fn notify_transition(
        &self,
        id: &str,
        target: &Target,
        previous: HealthState,
        new: HealthState,
        result: &sentinel_types::ProbeResult,
    ) {
        if let Some(callback) = &self.config.on_health_change {
            callback(id, previous, new);
        }

        if new == HealthState::Unhealthy {
            if let Some(callback) = &self.config.on_unhealthy {
                callback(id, result.message());
            }
        }

        if previous == HealthState::Unhealthy && new == HealthState::Healthy {
            if let Some(callback) = &self.config.on_healthy {
                callback(id);
            }
        }

        self.emit(Event::health_changed(target.snapshot(), previous, new));
    }

    /// Best-effort send: drops silently on a full or absent channel.
    fn emit(&self, event: Event) {
        let Some(sender) = &self.config.event_sender else {
            return;
        };
        if sender.try_send(event).is_err() {
            debug!("event channel full or closed, dropping event");
        }
    }

    async fn discovery_loop(self: Arc<Self>, stop: CancellationToken, ctx: CancellationToken) {
        if stop.is_cancelled() || ctx.is_cancelled() {
            return;
        }
        self.discovery_pass(&ctx).await;

        let interval = sentinel_types::resolve_discovery_interval(self.config.defaults());
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                _ = ctx.cancelled() => return,
                _ = ticker.tick() => {
                    self.discovery_pass(&ctx).await;
                }
            }
        }
    }

    async fn discovery_pass(self: &Arc<Self>, ctx: &CancellationToken) {
        for discoverer in &self.config.discoverers {
            let discovered = match discoverer.discover(ctx.clone()).await {
                Ok(targets) => targets,
                Err(err) => {
                    warn!(error = %err, "discoverer pass failed, continuing");
                    continue;
                }
            };

            for target in discovered {
                let id = target.id().to_string();
                if self.registry.get(&id).is_none() {
                    let snapshot = target.snapshot();
                    if self.add_target(target).is_ok() {
                        self.emit(Event::added(snapshot));
                    }
                } else {
                    self.registry.add_or_update(target);
                }
            }
        }
    }

    async fn watcher_loop(
        self: Arc<Self>,
        watcher: Arc<dyn crate::traits::Watcher>,
        stop: CancellationToken,
        ctx: CancellationToken,
    ) {
        let mut events = match watcher.watch(ctx.clone()).await {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "watcher failed to open event stream");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                _ = ctx.cancelled() => return,
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_watcher_event(event),
                        None => {
                            debug!("watcher event stream closed");
                            return;
                        }
                    }
                }
            }
        }
    }

    fn handle_watcher_event(&self, event: Event) {
        match event {
            Event::Added { target } => {
                if let Some(reconstructed) = reconstruct(&target) {
                    if self.add_target(reconstructed).is_ok() {
                        self.emit(Event::Added { target });
                    }
                }
            }
            Event::Removed { target } => {
                if self.remove_target(&target.id).is_ok() {
                    self.emit(Event::Removed { target });
                }
            }
            Event::Updated { target } => {
                if let Some(reconstructed) = reconstruct(&target) {
                    self.registry.add_or_update(reconstructed);
                }
                self.emit(Event::Updated { target });
            }
            Event::HealthChanged { target, previous_state, new_state } => {
                self.emit(Event::HealthChanged { target, previous_state, new_state });
            }
        }
    }
}

/// Rebuild a bare `Target` from a watcher-supplied snapshot. Watchers are
/// expected to supply a fully populated snapshot for `added`/`updated`
/// events; a snapshot missing identity fields cannot be turned back into a
/// schedulable target and is silently ignored.
fn reconstruct(snapshot: &TargetSnapshot) -> Option<Target> {
    let target_type = snapshot.target_type?;
    let source = snapshot.source.unwrap_or(sentinel_types::TargetSource::Discovered);
    Some(
        Target::new(snapshot.id.clone(), snapshot.name.clone(), target_type)
            .with_source(source)
            .with_labels(snapshot.labels.clone()),
    )
}
