//! Configuration for the reactive engine and for component definitions.

use crate::props::PropsDeclaration;

/// When effects invalidated by a write are re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// Re-run dependent effects before the write returns.
    #[default]
    Sync,
    /// Queue dependent effects until the host drains them with
    /// [`Reactivity::flush`](crate::Reactivity::flush) or
    /// [`Reactivity::tick`](crate::Reactivity::tick).
    ///
    /// Several writes to state read by the same effect coalesce into a single re-run.
    Queued,
}

/// Engine-wide configuration passed to [`Reactivity::new`](crate::Reactivity::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub scheduling: Scheduling,
}

impl EngineConfig {
    /// Configuration that re-runs effects synchronously on every write.
    pub fn sync() -> Self {
        Self {
            scheduling: Scheduling::Sync,
        }
    }

    /// Configuration that batches effect re-runs until the host flushes.
    pub fn queued() -> Self {
        Self {
            scheduling: Scheduling::Queued,
        }
    }
}

/// Options accepted by [`define_component`](crate::define_component).
///
/// # Example
///
/// ```rust
/// use oxide_element::{ComponentOptions, PropsDeclaration};
///
/// let options = ComponentOptions::new()
///     .name("my-component")
///     .props(PropsDeclaration::names(["test"]));
///
/// assert_eq!(options.name.as_deref(), Some("my-component"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComponentOptions {
    /// Name used in diagnostics. Registration names are given to the registry.
    pub name: Option<String>,
    /// Props declaration. `None` declares no props.
    pub props: Option<PropsDeclaration>,
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn props(mut self, props: PropsDeclaration) -> Self {
        self.props = Some(props);
        self
    }
}
