//! Lifecycle hook registry and the context handed to `setup`.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use portable_atomic_util::{Arc, Weak};
use spin::Mutex;

use crate::runtime::Reactivity;

/// The lifecycle phases a component exposes to user hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookPhase {
    /// Once, right after `setup` returns and before the first render.
    BeforeMount,
    /// Each time the element is connected to a document.
    Mounted,
    /// Before every render pass after the first.
    BeforeUpdate,
    /// After every render pass after the first.
    Updated,
    /// When the element is disconnected, before its scope is stopped.
    Unmounted,
}

impl HookPhase {
    pub const ALL: [HookPhase; 5] = [
        HookPhase::BeforeMount,
        HookPhase::Mounted,
        HookPhase::BeforeUpdate,
        HookPhase::Updated,
        HookPhase::Unmounted,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

struct Hook(Box<dyn Fn() + Send + Sync>);

type Bucket = Mutex<Vec<(u64, Arc<Hook>)>>;

struct RegistryInner {
    buckets: [Bucket; 5],
    next_id: AtomicU64,
}

/// Per-instance hook buckets, one per [`HookPhase`].
#[derive(Clone)]
pub struct HookRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                buckets: Default::default(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn register(
        &self,
        phase: HookPhase,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Unregister {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.buckets[phase.index()]
            .lock()
            .push((id, Arc::new(Hook(Box::new(callback)))));

        Unregister {
            target: Some(Target {
                registry: Arc::downgrade(&self.inner),
                phase,
                id,
            }),
        }
    }

    /// Invoke every callback registered for `phase`, returning how many ran.
    ///
    /// Callbacks may register or unregister hooks while the phase runs; such
    /// changes apply from the next run on.
    pub fn run(&self, phase: HookPhase) -> usize {
        let hooks: Vec<Arc<Hook>> = self.inner.buckets[phase.index()]
            .lock()
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect();

        for hook in &hooks {
            (hook.0)();
        }
        hooks.len()
    }

    /// Number of callbacks registered for `phase`.
    pub fn len(&self, phase: HookPhase) -> usize {
        self.inner.buckets[phase.index()].lock().len()
    }

    pub fn is_empty(&self, phase: HookPhase) -> bool {
        self.len(phase) == 0
    }
}

struct Target {
    registry: Weak<RegistryInner>,
    phase: HookPhase,
    id: u64,
}

/// Removes a registered hook again.
///
/// Returned by every registration; registrations made outside of `setup`
/// return a handle that does nothing.
pub struct Unregister {
    target: Option<Target>,
}

impl Unregister {
    pub fn noop() -> Self {
        Self { target: None }
    }

    /// Remove the hook. Calling this more than once is harmless.
    pub fn unregister(&self) {
        let Some(target) = &self.target else {
            return;
        };
        if let Some(registry) = target.registry.upgrade() {
            registry.buckets[target.phase.index()]
                .lock()
                .retain(|(id, _)| *id != target.id);
        }
    }

    /// Whether this handle came from a registration that was ignored.
    pub fn is_noop(&self) -> bool {
        self.target.is_none()
    }
}

impl core::fmt::Debug for Unregister {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.target {
            Some(target) => f
                .debug_struct("Unregister")
                .field("phase", &target.phase)
                .field("id", &target.id)
                .finish(),
            None => f.write_str("Unregister(noop)"),
        }
    }
}

/// Context passed to a component's `setup` function.
///
/// Hook registrations land in the registry of the instance being constructed.
/// The context is live only while `setup` runs: a clone kept and used later
/// registers nothing and returns a no-op [`Unregister`].
///
/// # Example
///
/// ```rust
/// use oxide_element::SetupContext;
///
/// let ctx = SetupContext::detached();
/// let unregister = ctx.on_mounted(|| {});
///
/// assert!(unregister.is_noop());
/// unregister.unregister();
/// ```
#[derive(Clone)]
pub struct SetupContext {
    engine: Reactivity,
    hooks: HookRegistry,
    live: Arc<AtomicBool>,
    name: Option<String>,
}

impl SetupContext {
    pub(crate) fn open(engine: Reactivity, hooks: HookRegistry, name: Option<String>) -> Self {
        Self {
            engine,
            hooks,
            live: Arc::new(AtomicBool::new(true)),
            name,
        }
    }

    pub(crate) fn close(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Keep the context live until the returned guard drops, unwinding included.
    pub(crate) fn close_on_drop(&self) -> CloseGuard<'_> {
        CloseGuard(self)
    }

    /// A context bound to no instance; every registration is ignored.
    pub fn detached() -> Self {
        let ctx = Self::open(Reactivity::default(), HookRegistry::new(), None);
        ctx.close();
        ctx
    }

    /// Whether `setup` is still running for this context's instance.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// The engine the instance's reactive state lives in.
    ///
    /// Create [`Ref`](crate::Ref)s and effects for the component through it.
    pub fn engine(&self) -> &Reactivity {
        &self.engine
    }

    /// The component name given in its options.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn on_before_mount(&self, callback: impl Fn() + Send + Sync + 'static) -> Unregister {
        self.register(HookPhase::BeforeMount, callback)
    }

    pub fn on_mounted(&self, callback: impl Fn() + Send + Sync + 'static) -> Unregister {
        self.register(HookPhase::Mounted, callback)
    }

    pub fn on_before_update(&self, callback: impl Fn() + Send + Sync + 'static) -> Unregister {
        self.register(HookPhase::BeforeUpdate, callback)
    }

    pub fn on_updated(&self, callback: impl Fn() + Send + Sync + 'static) -> Unregister {
        self.register(HookPhase::Updated, callback)
    }

    pub fn on_unmounted(&self, callback: impl Fn() + Send + Sync + 'static) -> Unregister {
        self.register(HookPhase::Unmounted, callback)
    }

    fn register(
        &self,
        phase: HookPhase,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Unregister {
        if !self.is_live() {
            tracing::debug!(?phase, "hook registered outside of setup; ignoring it");
            return Unregister::noop();
        }
        self.hooks.register(phase, callback)
    }
}

pub(crate) struct CloseGuard<'a>(&'a SetupContext);

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}
