//! The simulation engine: lifecycle, convergence loop, observers.
//!
//! An [`Engine`] is a plain value owning the document and all runtime state;
//! several engines can coexist. Its life cycle is
//! Idle -> Initializing -> Running (Stable <-> Unstable) -> Stopping -> Idle.
//!
//! One loop iteration has two barrier-separated phases. The *evaluate*
//! phase resolves every dirty net as part of its equipotential group (links
//! and bridges included) from the pins' driven contributions; nets whose
//! state changed enqueue the components owning their tabs. The *execute*
//! phase runs those components' `evaluate`, whose recorded pin writes and
//! bridge mutations re-dirty nets. The run is stable when no net is dirty
//! and no timed wakeup is pending.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use relaysim_components::{behavior_for, Behavior};
use relaysim_core::{Document, Id, IdAllocator, PropertyMap};

use crate::actions::{Action, RecordingCtx};
use crate::bridge::{Bridge, BridgeManager};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::eval::{group_state, partition_groups};
use crate::netmap::NetMap;
use crate::scheduler::{ExecMode, Scheduler};
use crate::snapshot::{ComponentSnapshot, NetSnapshot, PinState, Snapshot};
use crate::stats::{Outcome, Statistics};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Execution mode selection.
    pub mode: ExecMode,
    /// Component count at which `Auto` switches to the parallel scheduler.
    pub parallel_threshold: usize,
    /// Worker threads in parallel mode (component workers + net workers).
    pub workers: usize,
    /// Iterations without dirty-set shrinkage before declaring oscillation.
    pub oscillation_cap: usize,
    /// Hard wall-clock limit for one convergence run.
    pub watchdog: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: ExecMode::Auto,
            parallel_threshold: 2000,
            workers: 6,
            oscillation_cap: 50,
            watchdog: Duration::from_secs(10),
        }
    }
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Initializing,
    Running,
    Stable,
    Stopping,
}

impl EngineState {
    fn as_str(self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Initializing => "initializing",
            EngineState::Running => "running",
            EngineState::Stable => "stable",
            EngineState::Stopping => "stopping",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Evaluate,
}

type PhaseBatch = (Id, Vec<Action>, Option<String>);

/// A relay-logic simulation engine over one document.
pub struct Engine {
    document: Document,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    state: EngineState,
    nets: NetMap,
    bridges: BridgeManager,
    behaviors: IndexMap<Id, Mutex<Box<dyn Behavior>>>,
    scheduler: Scheduler,
    run_ids: Mutex<IdAllocator>,
    wakeups: BinaryHeap<Reverse<(Duration, Id)>>,
    /// Periodic ticks (free-running clocks). Convergence ignores these;
    /// [`Engine::run_until`] services them.
    ticks: BinaryHeap<Reverse<(Duration, Id)>>,
    /// Wakeups armed per component within the current convergence run. A
    /// relay feeding back into its own coil re-arms forever; the cap turns
    /// that into an oscillation error instead of an endless buzz.
    wakeup_counts: HashMap<Id, u64>,
    dirty_counts: HashMap<Id, u64>,
    component_errors: HashMap<Id, String>,
    stats: Statistics,
    stable_listeners: Vec<Box<dyn Fn(&Snapshot) + Send>>,
    unstable_listeners: Vec<Box<dyn Fn() + Send>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("components", &self.behaviors.len())
            .field("nets", &self.nets.net_count())
            .field("bridges", &self.bridges.len())
            .finish()
    }
}

impl Engine {
    /// Build an engine over a document, validating its structure. The
    /// engine starts Idle; call [`Engine::start`] to run to stability.
    pub fn new(document: Document, config: EngineConfig) -> Result<Engine> {
        Engine::with_clock(document, config, Arc::new(SystemClock::new()))
    }

    /// Like [`Engine::new`] with an injected clock (tests use
    /// [`ManualClock`](crate::clock::ManualClock) for deterministic relay
    /// timing).
    pub fn with_clock(
        document: Document,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Engine> {
        document.validate()?;

        let behaviors = build_behaviors(&document)?;
        let resolved = config.mode.resolve(behaviors.len(), config.parallel_threshold);
        let scheduler = Scheduler::new(resolved, config.workers);

        Ok(Engine {
            document,
            config,
            clock,
            state: EngineState::Idle,
            nets: NetMap::default(),
            bridges: BridgeManager::new(),
            behaviors,
            scheduler,
            run_ids: Mutex::new(IdAllocator::new()),
            wakeups: BinaryHeap::new(),
            ticks: BinaryHeap::new(),
            wakeup_counts: HashMap::new(),
            dirty_counts: HashMap::new(),
            component_errors: HashMap::new(),
            stats: Statistics::default(),
            stable_listeners: Vec::new(),
            unstable_listeners: Vec::new(),
        })
    }

    /// Convenience: build with defaults and run to first stability.
    pub fn launch(document: Document) -> Result<Engine> {
        let mut engine = Engine::new(document, EngineConfig::default())?;
        engine.start()?;
        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document for topology edits between runs.
    /// Nets and links are recompiled on the next [`Engine::start`].
    pub fn document_mut(&mut self) -> Result<&mut Document> {
        if self.state != EngineState::Idle {
            return Err(Error::InvalidState {
                operation: "document_mut",
                state: self.state.as_str(),
            });
        }
        Ok(&mut self.document)
    }

    /// Take the document back out of an idle engine.
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn statistics(&self) -> Statistics {
        self.stats.clone()
    }

    /// Whether the parallel scheduler is active.
    pub fn is_parallel(&self) -> bool {
        self.scheduler.is_parallel()
    }

    /// Number of live bridges; zero whenever the engine is Idle.
    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    /// Register a listener called once per entry into the Stable state.
    pub fn on_stable(&mut self, listener: impl Fn(&Snapshot) + Send + 'static) {
        self.stable_listeners.push(Box::new(listener));
    }

    /// Register a listener called once per departure from the Stable state.
    pub fn on_unstable(&mut self, listener: impl Fn() + Send + 'static) {
        self.unstable_listeners.push(Box::new(listener));
    }

    /// Compile the document, start every component and run to stability.
    pub fn start(&mut self) -> Result<()> {
        if self.state != EngineState::Idle {
            return Err(Error::InvalidState {
                operation: "start",
                state: self.state.as_str(),
            });
        }
        self.state = EngineState::Initializing;

        // Discard any previous runtime and rebuild from the current
        // topology (the document may have been edited while Idle).
        self.nets = NetMap::default();
        self.bridges = BridgeManager::new();
        self.wakeups.clear();
        self.ticks.clear();
        self.dirty_counts.clear();
        self.component_errors.clear();
        self.run_ids = Mutex::new(IdAllocator::new());
        self.stats = Statistics::default();
        if let Err(error) = self.document.validate() {
            self.state = EngineState::Idle;
            return Err(error.into());
        }
        self.behaviors = match build_behaviors(&self.document) {
            Ok(behaviors) => behaviors,
            Err(error) => {
                self.state = EngineState::Idle;
                return Err(error);
            }
        };
        let resolved = self
            .config
            .mode
            .resolve(self.behaviors.len(), self.config.parallel_threshold);
        self.scheduler = Scheduler::new(resolved, self.config.workers);

        let (nets, issues, _resolution) = {
            let mut ids = self.run_ids.lock().unwrap();
            NetMap::build(&self.document, &mut *ids)
        };
        self.nets = nets;
        if let Some(first) = issues.first() {
            self.state = EngineState::Idle;
            return Err(Error::DanglingWires {
                count: issues.len(),
                first: first.clone(),
            });
        }

        // Start phase: no component observes another's output until the
        // recorded actions are applied below.
        let ids: Vec<Id> = self.behaviors.keys().copied().collect();
        let batches = self.run_phase(ids, Phase::Start);
        self.apply_batches(batches);

        self.nets.mark_all_dirty();
        self.state = EngineState::Running;
        self.converge()
    }

    /// Apply an external stimulus to a component and re-run to stability.
    pub fn interact(&mut self, component: Id, action: &str, params: &PropertyMap) -> Result<()> {
        match self.state {
            EngineState::Stable | EngineState::Running => {}
            _ => {
                return Err(Error::InvalidState {
                    operation: "interact",
                    state: self.state.as_str(),
                })
            }
        }

        let cell = self
            .behaviors
            .get(&component)
            .ok_or(relaysim_core::Error::UnknownComponent(component))?;
        let changed = cell.lock().unwrap().interact(action, params)?;
        if !changed {
            return Ok(());
        }

        if self.state == EngineState::Stable {
            for listener in &self.unstable_listeners {
                listener();
            }
        }
        self.state = EngineState::Running;

        // Run the component so its new internal state reaches its pins.
        let batches = self.run_phase(vec![component], Phase::Evaluate);
        self.apply_batches(batches);
        self.converge()
    }

    /// Next pending periodic tick, if any component scheduled one.
    pub fn next_tick(&self) -> Option<Duration> {
        self.ticks.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Service periodic ticks (free-running clocks) up to simulated time
    /// `until`, re-converging after each batch. Ticks past `until` stay
    /// pending for a later call.
    pub fn run_until(&mut self, until: Duration) -> Result<()> {
        match self.state {
            EngineState::Stable | EngineState::Running => {}
            _ => {
                return Err(Error::InvalidState {
                    operation: "run_until",
                    state: self.state.as_str(),
                })
            }
        }

        while let Some(Reverse((deadline, _))) = self.ticks.peek().copied() {
            if deadline > until {
                break;
            }
            self.clock.wait_until(deadline);

            let now = self.clock.now();
            let mut due = BTreeSet::new();
            while let Some(Reverse((tick, component))) = self.ticks.peek().copied() {
                if tick > now {
                    break;
                }
                self.ticks.pop();
                due.insert(component);
            }
            if due.is_empty() {
                continue;
            }

            if self.state == EngineState::Stable {
                for listener in &self.unstable_listeners {
                    listener();
                }
            }
            self.state = EngineState::Running;

            let ids: Vec<Id> = due.into_iter().collect();
            self.stats.components_evaluated += ids.len() as u64;
            let batches = self.run_phase(ids, Phase::Evaluate);
            self.apply_batches(batches);
            self.converge()?;
        }
        Ok(())
    }

    /// Stop the engine: `on_stop` every component, destroy bridges, discard
    /// nets. Idempotent; returns the statistics of the last run.
    pub fn stop(&mut self) -> Result<Statistics> {
        if self.state != EngineState::Idle {
            let outcome = if self.stats.outcome == Outcome::Stable {
                Outcome::Stable
            } else {
                Outcome::Stopped
            };
            self.shutdown_runtime(outcome);
        }
        Ok(self.stats.clone())
    }

    /// Immutable stable-state view. Only available while Stable.
    pub fn snapshot(&self) -> Result<Snapshot> {
        if self.state != EngineState::Stable {
            return Err(Error::InvalidState {
                operation: "snapshot",
                state: self.state.as_str(),
            });
        }
        Ok(self.build_snapshot())
    }

    // ------------------------------------------------------------------
    // Run loop
    // ------------------------------------------------------------------

    /// Drive the loop until no net is dirty and no wakeup is pending.
    fn converge(&mut self) -> Result<()> {
        match self.run_to_stability() {
            Ok(()) => {
                self.state = EngineState::Stable;
                self.stats.outcome = Outcome::Stable;
                let snapshot = self.build_snapshot();
                for listener in &self.stable_listeners {
                    listener(&snapshot);
                }
                Ok(())
            }
            Err(error) => {
                // Convergence failures stop the engine cleanly.
                let outcome = match &error {
                    Error::Oscillation { .. } => Outcome::Oscillating,
                    Error::Timeout { .. } => Outcome::TimedOut,
                    _ => Outcome::Stopped,
                };
                self.shutdown_runtime(outcome);
                Err(error)
            }
        }
    }

    fn run_to_stability(&mut self) -> Result<()> {
        let wall_start = Instant::now();
        let mut prev_dirty = usize::MAX;
        let mut no_shrink = 0usize;
        self.wakeup_counts.clear();

        loop {
            let dirty = self.nets.drain_dirty();

            if dirty.is_empty() {
                // Quiescent, but a timed wakeup (relay armature) may still
                // be due.
                let Some(Reverse((deadline, _))) = self.wakeups.peek().copied() else {
                    break;
                };
                self.clock.wait_until(deadline);
                let due = self.pop_due_wakeups();
                if !due.is_empty() {
                    let count = due.len() as u64;
                    let batches = self.run_phase(due, Phase::Evaluate);
                    self.stats.components_evaluated += count;
                    self.apply_batches(batches);
                    if self.wakeups_exceeded() {
                        self.stats.wall_time += wall_start.elapsed();
                        return Err(self.oscillation_error());
                    }
                }
                continue;
            }

            self.stats.iterations += 1;
            self.stats.dirty_peak = self.stats.dirty_peak.max(dirty.len());

            // Evaluate phase: resolve each dirty net's equipotential group.
            let groups = partition_groups(&self.nets, &self.bridges, &dirty);
            let nets = &self.nets;
            let resolved = self
                .scheduler
                .run(groups, |group| {
                    let state = group_state(nets, &group);
                    (group, state)
                });

            let mut to_run: BTreeSet<Id> = BTreeSet::new();
            for (group, state) in resolved {
                for net_id in group {
                    let changed = match self.nets.net_mut(net_id) {
                        Some(net) if net.state != state => {
                            net.state = state;
                            true
                        }
                        _ => false,
                    };
                    if changed {
                        to_run.extend(self.nets.components_of_net(net_id));
                    }
                }
            }

            // Execute phase: run affected components against the snapshot
            // just established.
            if !to_run.is_empty() {
                let ids: Vec<Id> = to_run.into_iter().collect();
                self.stats.components_evaluated += ids.len() as u64;
                let batches = self.run_phase(ids, Phase::Evaluate);
                self.apply_batches(batches);
                if self.wakeups_exceeded() {
                    self.stats.wall_time += wall_start.elapsed();
                    return Err(self.oscillation_error());
                }
            }

            // Oscillation: the dirty set must shrink every so often.
            let now_dirty = self.nets.count_dirty();
            if now_dirty == 0 {
                prev_dirty = usize::MAX;
                no_shrink = 0;
            } else {
                if now_dirty >= prev_dirty {
                    no_shrink += 1;
                } else {
                    no_shrink = 0;
                }
                prev_dirty = now_dirty;
                if no_shrink >= self.config.oscillation_cap {
                    self.stats.wall_time += wall_start.elapsed();
                    return Err(self.oscillation_error());
                }
            }

            let elapsed = wall_start.elapsed();
            if elapsed >= self.config.watchdog {
                self.stats.wall_time += elapsed;
                return Err(Error::Timeout { elapsed });
            }
        }

        self.stats.wall_time += wall_start.elapsed();
        Ok(())
    }

    /// Run one lifecycle phase for `ids` (in the given order) against the
    /// current net snapshot, collecting recorded actions. A behavior error
    /// makes that component a no-op for the pass.
    fn run_phase(&self, ids: Vec<Id>, phase: Phase) -> Vec<PhaseBatch> {
        let now = self.clock.now();
        let nets = &self.nets;
        let behaviors = &self.behaviors;
        let run_ids = &self.run_ids;

        self.scheduler.run(ids, move |id| {
            let Some(cell) = behaviors.get(&id) else {
                return (id, Vec::new(), None);
            };
            let mut behavior = cell.lock().unwrap();
            let mut ctx = RecordingCtx::new(id, nets, now, run_ids);
            let result = match phase {
                Phase::Start => behavior.on_start(&mut ctx),
                Phase::Evaluate => behavior.evaluate(&mut ctx),
            };
            match result {
                Ok(()) => (id, ctx.actions, None),
                Err(error) => {
                    log::warn!("component {id}: {error}; skipping this iteration");
                    (id, Vec::new(), Some(error.to_string()))
                }
            }
        })
    }

    /// Apply recorded actions at the phase barrier, in component order.
    fn apply_batches(&mut self, batches: Vec<PhaseBatch>) {
        for (component, actions, error) in batches {
            match error {
                Some(message) => {
                    self.component_errors.insert(component, message);
                }
                None => {
                    self.component_errors.remove(&component);
                }
            }
            for action in actions {
                self.apply_action(component, action);
            }
        }
    }

    fn apply_action(&mut self, component: Id, action: Action) {
        match action {
            Action::Drive { pin, state } => {
                if self.nets.set_driven(pin, state) {
                    if let Some(net) = self.nets.net_of_pin(pin) {
                        self.mark_dirty(net);
                    }
                }
            }
            Action::CreateBridge { id, a, b, owner } => {
                if self.nets.net(a).is_none() || self.nets.net(b).is_none() {
                    log::warn!("component {component}: bridge endpoints {a}/{b} not found");
                    return;
                }
                if self.bridges.insert(Bridge { id, a, b, owner }) {
                    for endpoint in [a, b] {
                        if let Some(net) = self.nets.net_mut(endpoint) {
                            net.bridges.insert(id);
                        }
                        self.mark_dirty(endpoint);
                    }
                }
            }
            Action::MoveBridge {
                id,
                from,
                to,
                owner,
            } => {
                match self.bridges.get(id) {
                    Some(bridge) if bridge.owner == owner => {}
                    _ => {
                        log::warn!("component {component}: cannot move bridge {id}");
                        return;
                    }
                }
                if self.bridges.move_endpoint(id, from, to).is_some() {
                    if let Some(net) = self.nets.net_mut(from) {
                        net.bridges.remove(&id);
                    }
                    if let Some(net) = self.nets.net_mut(to) {
                        net.bridges.insert(id);
                    }
                    self.mark_dirty(from);
                    self.mark_dirty(to);
                }
            }
            Action::DestroyBridge { id, owner } => {
                match self.bridges.get(id) {
                    Some(bridge) if bridge.owner == owner => {}
                    _ => {
                        log::warn!("component {component}: cannot destroy bridge {id}");
                        return;
                    }
                }
                if let Some(bridge) = self.bridges.remove(id) {
                    for endpoint in [bridge.a, bridge.b] {
                        if let Some(net) = self.nets.net_mut(endpoint) {
                            net.bridges.remove(&id);
                        }
                        self.mark_dirty(endpoint);
                    }
                }
            }
            Action::WakeAt {
                component,
                deadline,
            } => {
                *self.wakeup_counts.entry(component).or_default() += 1;
                self.wakeups.push(Reverse((deadline, component)));
            }
            Action::ScheduleTick {
                component,
                deadline,
            } => {
                self.ticks.push(Reverse((deadline, component)));
            }
        }
    }

    fn mark_dirty(&mut self, net: Id) {
        if self.nets.mark_dirty(net) {
            *self.dirty_counts.entry(net).or_default() += 1;
        }
    }

    fn pop_due_wakeups(&mut self) -> Vec<Id> {
        let now = self.clock.now();
        let mut due = BTreeSet::new();
        while let Some(Reverse((deadline, component))) = self.wakeups.peek().copied() {
            if deadline > now {
                break;
            }
            self.wakeups.pop();
            due.insert(component);
        }
        due.into_iter().collect()
    }

    /// Whether any component armed more wakeups this run than the
    /// oscillation cap allows.
    fn wakeups_exceeded(&self) -> bool {
        self.wakeup_counts
            .values()
            .any(|count| *count as usize > self.config.oscillation_cap)
    }

    fn oscillation_error(&self) -> Error {
        let mut offenders: Vec<(Id, u64)> = self
            .dirty_counts
            .iter()
            .map(|(id, count)| (*id, *count))
            .collect();
        offenders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Error::Oscillation {
            iterations: self.stats.iterations,
            nets: offenders.into_iter().take(8).map(|(id, _)| id).collect(),
        }
    }

    /// Tear the runtime down: `on_stop` every component, destroy bridges,
    /// discard nets, return to Idle.
    fn shutdown_runtime(&mut self, outcome: Outcome) {
        self.state = EngineState::Stopping;
        for (id, cell) in &self.behaviors {
            if let Err(error) = cell.lock().unwrap().on_stop() {
                log::warn!("component {id}: on_stop failed: {error}");
            }
        }
        // Each component's bridges die with it; then drop any stragglers.
        let owners: Vec<Id> = self.behaviors.keys().copied().collect();
        for owner in owners {
            self.bridges.clear_owner(owner);
        }
        self.bridges.clear();
        self.nets = NetMap::default();
        self.wakeups.clear();
        self.ticks.clear();
        self.stats.outcome = outcome;
        self.state = EngineState::Idle;
    }

    fn build_snapshot(&self) -> Snapshot {
        let mut components = Vec::new();
        for page in self.document.pages() {
            for component in page.components() {
                components.push(ComponentSnapshot {
                    id: component.id,
                    kind: component.kind,
                    position: component.position,
                    pin_states: component
                        .pins
                        .iter()
                        .map(|pin| PinState {
                            pin: pin.id,
                            state: self.nets.observed(pin.id),
                        })
                        .collect(),
                    last_error: self.component_errors.get(&component.id).cloned(),
                });
            }
        }

        let mut nets: Vec<NetSnapshot> = self
            .nets
            .nets()
            .map(|net| NetSnapshot {
                id: net.id,
                page: net.page,
                state: net.state,
                members: net.tabs.iter().copied().collect(),
            })
            .collect();
        nets.sort_by_key(|n| n.id);

        Snapshot { components, nets }
    }
}

/// Convenience mirror of the kernel verb `start(document) -> engine`.
pub fn start(document: Document) -> Result<Engine> {
    Engine::launch(document)
}

fn build_behaviors(document: &Document) -> Result<IndexMap<Id, Mutex<Box<dyn Behavior>>>> {
    let mut behaviors = IndexMap::new();
    for page in document.pages() {
        for component in page.components() {
            let behavior = behavior_for(document, component)?;
            behaviors.insert(component.id, Mutex::new(behavior));
        }
    }
    Ok(behaviors)
}
