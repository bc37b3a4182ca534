//! Handles to tracked effects.

use crate::runtime::{EffectId, Reactivity};

/// Handle to a tracked effect registered with [`Reactivity::effect`] or
/// [`EffectScope::effect`](crate::EffectScope::effect).
///
/// Dropping the handle does not stop the effect; effects live until they are
/// stopped directly or through their scope.
#[derive(Clone)]
pub struct EffectHandle {
    id: EffectId,
    engine: Reactivity,
}

impl EffectHandle {
    pub(crate) fn new(id: EffectId, engine: Reactivity) -> Self {
        Self { id, engine }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Unsubscribe the effect from everything it tracked. Idempotent.
    pub fn stop(&self) {
        self.engine.stop_effect(self.id);
    }

    /// Whether the effect still re-runs when its dependencies change.
    pub fn is_active(&self) -> bool {
        self.engine.is_effect_active(self.id)
    }
}

impl core::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
