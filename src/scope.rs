//! Disposable groups of tracked effects.

use core::sync::atomic::{AtomicBool, Ordering};

use portable_atomic_util::Arc;
use spin::Mutex;

use crate::effect::EffectHandle;
use crate::runtime::{EffectId, Reactivity};

type Cleanup = Box<dyn FnOnce() + Send>;

struct ScopeInner {
    engine: Reactivity,
    active: AtomicBool,
    effects: Mutex<Vec<EffectId>>,
    cleanups: Mutex<Vec<Cleanup>>,
}

/// A disposable grouping of tracked effects that are stopped together.
///
/// Effects created while the scope [runs](Self::run) belong to it, as do
/// effects registered through [`EffectScope::effect`]. [`stop`](Self::stop)
/// unsubscribes all of them and then runs the scope's dispose callbacks.
#[derive(Clone)]
pub struct EffectScope {
    inner: Arc<ScopeInner>,
}

impl EffectScope {
    pub(crate) fn new(engine: Reactivity) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                engine,
                active: AtomicBool::new(true),
                effects: Mutex::new(Vec::new()),
                cleanups: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Run `f` with this scope as the current scope.
    ///
    /// Returns `None` without calling `f` once the scope has been stopped.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if !self.is_active() {
            return None;
        }
        let _current = self.inner.engine.enter_scope(self.clone());
        Some(f())
    }

    /// Register a tracked effect owned by this scope and run it once.
    ///
    /// On a stopped scope the effect is never run and the returned handle is inactive.
    pub fn effect<F>(&self, body: F) -> EffectHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.inner.engine.create_effect(Box::new(body), Some(self))
    }

    /// Register a callback to run when the scope is stopped.
    ///
    /// On an already stopped scope the callback runs immediately.
    pub fn on_dispose(&self, f: impl FnOnce() + Send + 'static) {
        if self.is_active() {
            self.inner.cleanups.lock().push(Box::new(f));
        } else {
            f();
        }
    }

    /// Stop every effect of the scope, then run its dispose callbacks.
    ///
    /// Only the first call has any effect.
    pub fn stop(&self) {
        if !self.inner.active.swap(false, Ordering::AcqRel) {
            return;
        }

        let effects = core::mem::take(&mut *self.inner.effects.lock());
        tracing::debug!(effects = effects.len(), "stopping effect scope");
        for id in effects {
            self.inner.engine.stop_effect(id);
        }

        let cleanups = core::mem::take(&mut *self.inner.cleanups.lock());
        for cleanup in cleanups {
            cleanup();
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    pub(crate) fn adopt(&self, id: EffectId) {
        self.inner.effects.lock().push(id);
    }
}
