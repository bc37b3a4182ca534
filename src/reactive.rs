//! Tracked state: the shallow-reactive property bag and single-value refs.

use std::collections::BTreeMap;

use portable_atomic_util::Arc;
use serde_json::Value;
use spin::Mutex;

use crate::runtime::{Dep, Reactivity};

struct BagState {
    values: BTreeMap<String, Value>,
    deps: BTreeMap<String, Dep>,
    iterate: Dep,
    released: bool,
}

impl BagState {
    fn dep(&mut self, key: &str) -> Dep {
        self.deps.entry(key.to_owned()).or_insert_with(Dep::new).clone()
    }
}

/// A keyed property bag whose top-level reads and writes are tracked.
///
/// Reading a key inside a running effect subscribes the effect to that key;
/// writing a different value re-runs it. Values are returned as clones, so
/// mutating a nested object never triggers anything: replace the whole value
/// instead.
///
/// Components receive their props as a `ShallowReactive`.
///
/// # Example
///
/// ```rust
/// use oxide_element::{Reactivity, ShallowReactive};
/// use serde_json::json;
///
/// let engine = Reactivity::default();
/// let props = ShallowReactive::new(&engine);
///
/// props.set("msg", "hello");
/// assert_eq!(props.get("msg"), Some(json!("hello")));
/// assert_eq!(props.get("missing"), None);
/// ```
#[derive(Clone)]
pub struct ShallowReactive {
    engine: Reactivity,
    state: Arc<Mutex<BagState>>,
}

impl ShallowReactive {
    pub fn new(engine: &Reactivity) -> Self {
        Self {
            engine: engine.clone(),
            state: Arc::new(Mutex::new(BagState {
                values: BTreeMap::new(),
                deps: BTreeMap::new(),
                iterate: Dep::new(),
                released: false,
            })),
        }
    }

    /// Read `key`, tracking it.
    pub fn get(&self, key: &str) -> Option<Value> {
        let (value, dep) = {
            let mut state = self.state.lock();
            let value = state.values.get(key).cloned();
            if state.released {
                return value;
            }
            (value, state.dep(key))
        };
        self.engine.track(&dep);
        value
    }

    /// Read `key` as a string slice copy, tracking it.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|value| value.as_str().map(str::to_owned))
    }

    /// Read `key` as a boolean, tracking it.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.as_bool())
    }

    /// Read `key` as a number, tracking it.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.as_f64())
    }

    /// Whether `key` is present, tracking it.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Write `key`, re-running subscribers when the value changed.
    ///
    /// Returns whether the stored value changed.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();

        let triggered = {
            let mut state = self.state.lock();
            let previous = state.values.insert(key.clone(), value.clone());
            let added = previous.is_none();
            let changed = previous.as_ref() != Some(&value);
            if state.released || !changed {
                return changed;
            }

            let mut triggered = vec![state.dep(&key)];
            if added {
                triggered.push(state.iterate.clone());
            }
            triggered
        };

        for dep in &triggered {
            self.engine.trigger(dep);
        }
        true
    }

    /// Remove `key`, re-running subscribers of the key and of iteration.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let (previous, triggered) = {
            let mut state = self.state.lock();
            let previous = state.values.remove(key);
            if state.released || previous.is_none() {
                return previous;
            }
            let triggered = [state.dep(key), state.iterate.clone()];
            (previous, triggered)
        };

        for dep in &triggered {
            self.engine.trigger(dep);
        }
        previous
    }

    /// The present keys, tracking additions and removals.
    pub fn keys(&self) -> Vec<String> {
        let (keys, dep) = {
            let state = self.state.lock();
            let keys = state.values.keys().cloned().collect();
            if state.released {
                return keys;
            }
            (keys, state.iterate.clone())
        };
        self.engine.track(&dep);
        keys
    }

    /// Copy of every entry, tracking each key and the key set.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }

    /// Drop every subscription; later writes store values without re-running anything.
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.released = true;
        for dep in state.deps.values() {
            dep.clear();
        }
        state.iterate.clear();
        state.deps.clear();
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }
}

impl core::fmt::Debug for ShallowReactive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ShallowReactive")
            .field("values", &state.values)
            .field("released", &state.released)
            .finish()
    }
}

/// A single tracked value.
///
/// Reads hand out a snapshot, so a closure passed to [`with`](Self::with) or
/// [`update`](Self::update) may read or write the same ref.
pub struct Ref<T> {
    engine: Reactivity,
    value: Arc<Mutex<Arc<T>>>,
    dep: Dep,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            value: self.value.clone(),
            dep: self.dep.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Ref<T> {
    pub fn new(engine: &Reactivity, value: T) -> Self {
        Self {
            engine: engine.clone(),
            value: Arc::new(Mutex::new(Arc::new(value))),
            dep: Dep::new(),
        }
    }

    /// Borrow the current value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.engine.track(&self.dep);
        let snapshot = self.value.lock().clone();
        f(&snapshot)
    }
}

impl<T: Clone + Send + Sync + 'static> Ref<T> {
    /// Copy of the value, tracking the read.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Mutate a copy of the value, store it and re-run subscribers unconditionally.
    ///
    /// A write to the same ref made inside `f` is overwritten.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let snapshot = self.value.lock().clone();
        let mut next = T::clone(&snapshot);
        f(&mut next);
        *self.value.lock() = Arc::new(next);
        self.engine.trigger(&self.dep);
    }
}

impl<T: PartialEq + Send + Sync + 'static> Ref<T> {
    /// Replace the value, re-running subscribers when it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.value.lock();
            if **current == value {
                return;
            }
            *current = Arc::new(value);
        }
        self.engine.trigger(&self.dep);
    }
}
