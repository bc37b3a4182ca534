//! The reactive engine that records reads and schedules effect re-runs.

use std::collections::{BTreeMap, BTreeSet};

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use flume::{Receiver, Sender};
use portable_atomic_util::Arc;
use spin::Mutex;

use crate::config::{EngineConfig, Scheduling};
use crate::effect::EffectHandle;
use crate::scope::EffectScope;

/// Identifier of a tracked effect within one [`Reactivity`] engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(u64);

pub(crate) type EffectBody = Box<dyn FnMut() + Send>;

/// Subscriber set of one tracked source (a props key, a ref, an iteration).
#[derive(Clone)]
pub(crate) struct Dep(Arc<Mutex<BTreeSet<EffectId>>>);

impl Dep {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Mutex::new(BTreeSet::new())))
    }

    fn subscribe(&self, id: EffectId) -> bool {
        self.0.lock().insert(id)
    }

    fn unsubscribe(&self, id: EffectId) {
        self.0.lock().remove(&id);
    }

    fn subscribers(&self) -> Vec<EffectId> {
        self.0.lock().iter().copied().collect()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.lock().len()
    }
}

struct EffectSlot {
    body: Arc<Mutex<EffectBody>>,
    deps: Vec<Dep>,
    queued: bool,
}

struct EngineState {
    effects: BTreeMap<EffectId, EffectSlot>,
    observers: Vec<EffectId>,
    scopes: Vec<EffectScope>,
}

struct EngineInner {
    config: EngineConfig,
    state: Mutex<EngineState>,
    next_id: AtomicU64,
    flushing: AtomicBool,
    sender: Sender<EffectId>,
    receiver: Receiver<EffectId>,
}

/// Handle to a reactive engine.
///
/// The engine owns the dependency graph between tracked sources and effects.
/// Reading a [`ShallowReactive`](crate::ShallowReactive) key or a [`Ref`](crate::Ref)
/// while an effect runs subscribes that effect; writing the source re-runs it,
/// either immediately or when the host drains the queue (see [`Scheduling`]).
///
/// Cloning is cheap; all clones share the same graph.
///
/// # Example
///
/// ```rust
/// use oxide_element::{EngineConfig, Reactivity, Ref};
/// use portable_atomic_util::Arc;
/// use core::sync::atomic::{AtomicUsize, Ordering};
///
/// let engine = Reactivity::new(EngineConfig::default());
/// let count = Ref::new(&engine, 0);
/// let runs = Arc::new(AtomicUsize::new(0));
///
/// let observed = count.clone();
/// let counter = runs.clone();
/// let _effect = engine.effect(move || {
///     observed.get();
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// count.set(1);
/// assert_eq!(runs.load(Ordering::SeqCst), 2);
/// ```
#[derive(Clone)]
pub struct Reactivity {
    inner: Arc<EngineInner>,
}

impl Default for Reactivity {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Reactivity {
    /// Create a new engine.
    pub fn new(config: EngineConfig) -> Self {
        let (sender, receiver) = flume::unbounded();

        Reactivity {
            inner: Arc::new(EngineInner {
                config,
                state: Mutex::new(EngineState {
                    effects: BTreeMap::new(),
                    observers: Vec::new(),
                    scopes: Vec::new(),
                }),
                next_id: AtomicU64::new(0),
                flushing: AtomicBool::new(false),
                sender,
                receiver,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Open a new effect scope.
    ///
    /// A scope opened while another scope is running is stopped together with it.
    pub fn effect_scope(&self) -> EffectScope {
        let scope = EffectScope::new(self.clone());
        if let Some(parent) = self.current_scope() {
            let child = scope.clone();
            parent.on_dispose(move || child.stop());
        }
        scope
    }

    /// Open an effect scope that is never stopped by an enclosing scope.
    pub fn detached_scope(&self) -> EffectScope {
        EffectScope::new(self.clone())
    }

    /// Register a tracked effect and run it once.
    ///
    /// The effect belongs to the scope currently running, if any.
    pub fn effect<F>(&self, body: F) -> EffectHandle
    where
        F: FnMut() + Send + 'static,
    {
        let scope = self.current_scope();
        self.create_effect(Box::new(body), scope.as_ref())
    }

    /// Number of effect runs waiting in the queue.
    pub fn pending(&self) -> usize {
        self.inner.receiver.len()
    }

    /// Run every queued effect, including effects queued while flushing.
    ///
    /// Returns the number of effects that ran. A flush requested from inside a
    /// running flush returns `0` and leaves the work to the outer one.
    pub fn flush(&self) -> usize {
        if self.inner.flushing.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let _flushing = FlushGuard(self);

        let mut ran = 0;
        while let Ok(id) = self.inner.receiver.try_recv() {
            if self.run_queued(id) {
                ran += 1;
            }
        }
        ran
    }

    /// Wait for the next queued effect, then flush the queue.
    ///
    /// This is the boundary at which a host event loop applies batched writes.
    pub async fn tick(&self) -> usize {
        match self.inner.receiver.recv_async().await {
            Ok(id) => {
                let first = {
                    let _flushing = FlushGuard::enter(self);
                    self.run_queued(id)
                };
                usize::from(first) + self.flush()
            }
            Err(_) => 0,
        }
    }

    /// Drain effect re-runs for as long as the engine is alive.
    ///
    /// Spawn this on the host's executor when using [`Scheduling::Queued`].
    pub async fn run(&self) {
        loop {
            match self.inner.receiver.recv_async().await {
                Ok(id) => {
                    {
                        let _flushing = FlushGuard::enter(self);
                        self.run_queued(id);
                    }
                    self.flush();
                }
                Err(_) => break,
            }
        }
    }

    pub(crate) fn create_effect(
        &self,
        body: EffectBody,
        scope: Option<&EffectScope>,
    ) -> EffectHandle {
        let id = EffectId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = EffectHandle::new(id, self.clone());

        if let Some(scope) = scope {
            if !scope.is_active() {
                tracing::debug!(?id, "effect created in a stopped scope; not running it");
                return handle;
            }
            scope.adopt(id);
        }

        self.inner.state.lock().effects.insert(
            id,
            EffectSlot {
                body: Arc::new(Mutex::new(body)),
                deps: Vec::new(),
                queued: false,
            },
        );
        self.run_effect(id);
        handle
    }

    #[cfg(test)]
    pub(crate) fn effect_count(&self) -> usize {
        self.inner.state.lock().effects.len()
    }

    pub(crate) fn is_effect_active(&self, id: EffectId) -> bool {
        self.inner.state.lock().effects.contains_key(&id)
    }

    pub(crate) fn stop_effect(&self, id: EffectId) {
        let slot = self.inner.state.lock().effects.remove(&id);
        if let Some(slot) = slot {
            for dep in slot.deps {
                dep.unsubscribe(id);
            }
        }
    }

    /// Subscribe the running effect, if any, to `dep`.
    pub(crate) fn track(&self, dep: &Dep) {
        let mut state = self.inner.state.lock();
        let Some(&id) = state.observers.last() else {
            return;
        };
        if let Some(slot) = state.effects.get_mut(&id) {
            if dep.subscribe(id) {
                slot.deps.push(dep.clone());
            }
        }
    }

    /// Schedule every effect subscribed to `dep`.
    pub(crate) fn trigger(&self, dep: &Dep) {
        let mut scheduled = false;
        for id in dep.subscribers() {
            scheduled |= self.schedule(id);
        }

        if scheduled && self.inner.config.scheduling == Scheduling::Sync {
            self.flush();
        }
    }

    pub(crate) fn enter_scope(&self, scope: EffectScope) -> ScopeGuard<'_> {
        self.inner.state.lock().scopes.push(scope);
        ScopeGuard(self)
    }

    pub(crate) fn current_scope(&self) -> Option<EffectScope> {
        self.inner.state.lock().scopes.last().cloned()
    }

    fn schedule(&self, id: EffectId) -> bool {
        {
            let mut state = self.inner.state.lock();
            // An effect never re-triggers itself while it is running.
            if state.observers.contains(&id) {
                return false;
            }
            match state.effects.get_mut(&id) {
                Some(slot) if !slot.queued => slot.queued = true,
                _ => return false,
            }
        }
        self.inner.sender.send(id).is_ok()
    }

    fn run_queued(&self, id: EffectId) -> bool {
        {
            let mut state = self.inner.state.lock();
            match state.effects.get_mut(&id) {
                Some(slot) => slot.queued = false,
                None => return false,
            }
        }
        self.run_effect(id)
    }

    fn run_effect(&self, id: EffectId) -> bool {
        let (body, deps) = {
            let mut state = self.inner.state.lock();
            let Some(slot) = state.effects.get_mut(&id) else {
                return false;
            };
            (slot.body.clone(), core::mem::take(&mut slot.deps))
        };

        // Dependencies are collected afresh on every run.
        for dep in deps {
            dep.unsubscribe(id);
        }

        tracing::trace!(?id, "running effect");
        let _observer = ObserverGuard::push(self, id);
        let mut body = body.lock();
        (body)();
        true
    }
}

/// Pops the observer stack even when an effect body panics.
struct ObserverGuard<'a>(&'a Reactivity);

impl<'a> ObserverGuard<'a> {
    fn push(engine: &'a Reactivity, id: EffectId) -> Self {
        engine.inner.state.lock().observers.push(id);
        ObserverGuard(engine)
    }
}

impl Drop for ObserverGuard<'_> {
    fn drop(&mut self) {
        self.0.inner.state.lock().observers.pop();
    }
}

pub(crate) struct ScopeGuard<'a>(&'a Reactivity);

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.0.inner.state.lock().scopes.pop();
    }
}

struct FlushGuard<'a>(&'a Reactivity);

impl<'a> FlushGuard<'a> {
    fn enter(engine: &'a Reactivity) -> Self {
        engine.inner.flushing.store(true, Ordering::Release);
        FlushGuard(engine)
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.inner.flushing.store(false, Ordering::Release);
    }
}

#[cfg(any(test, feature = "testing"))]
/// Block on [`Reactivity::tick`], returning the number of effects that ran.
///
/// Only available with the `testing` feature. At least one effect must be
/// queued, otherwise this blocks forever.
pub fn block_on_tick(engine: &Reactivity) -> usize {
    futures::executor::block_on(engine.tick())
}
