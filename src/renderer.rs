//! Renderer abstraction and the shadow root it renders into.

use portable_atomic_util::Arc;
use spin::Mutex;

use crate::template::TemplateInstance;

/// Renderer abstraction for committing render output into a shadow root.
///
/// Implement this trait to integrate oxide-element with your rendering system
/// (a DOM binding, a terminal, a test harness, etc.). The component calls
/// [`render`](Self::render) on the first pass and again each time state read
/// by its render function changes.
///
/// # Example
///
/// ```rust
/// use oxide_element::{Renderer, ShadowRoot, Template};
///
/// struct ConsoleRenderer;
///
/// impl Renderer<Template> for ConsoleRenderer {
///     fn render(&mut self, output: Template, _root: &mut ShadowRoot) {
///         println!("{}", output.to_html());
///     }
/// }
/// ```
pub trait Renderer<T> {
    /// Render `output` into `root`, reusing what is already there where possible.
    fn render(&mut self, output: T, root: &mut ShadowRoot);
}

/// Encapsulation mode of a [`ShadowRoot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    /// Reachable from the host element.
    Open,
    /// Reachable only by the element's own renderer.
    Closed,
}

/// Outcome of the last render into a [`ShadowRoot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
    /// The content was replaced wholesale.
    Committed,
    /// The template was reused and this many dynamic parts were rewritten.
    Updated { parts: usize },
    /// Nothing differed from the committed content.
    Unchanged,
}

/// Container a component's output is rendered into.
#[derive(Debug)]
pub struct ShadowRoot {
    mode: ShadowRootMode,
    instance: Option<TemplateInstance>,
    renders: usize,
    last_patch: Option<Patch>,
}

impl ShadowRoot {
    pub fn attach(mode: ShadowRootMode) -> Self {
        Self {
            mode,
            instance: None,
            renders: 0,
            last_patch: None,
        }
    }

    pub fn mode(&self) -> ShadowRootMode {
        self.mode
    }

    /// The committed template instance, if anything was rendered yet.
    pub fn instance(&self) -> Option<&TemplateInstance> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut TemplateInstance> {
        self.instance.as_mut()
    }

    /// Replace the content.
    pub fn commit(&mut self, instance: TemplateInstance) {
        self.instance = Some(instance);
    }

    /// Record one finished render pass.
    pub fn record(&mut self, patch: Patch) {
        self.renders += 1;
        self.last_patch = Some(patch);
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn last_patch(&self) -> Option<Patch> {
        self.last_patch
    }

    /// Serialized markup of the committed content; empty before the first render.
    pub fn to_html(&self) -> String {
        self.instance
            .as_ref()
            .map(TemplateInstance::to_html)
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test renderer that captures every render output for assertions.
///
/// Only available with the `testing` feature.
///
/// Clones share the same capture storage, so a definition can hand a clone to
/// every instance while the test keeps one to inspect.
///
/// # Example
///
/// ```rust
/// use oxide_element::{define_component, ComponentOptions, Reactivity, Template, TestRenderer};
///
/// let renderer = TestRenderer::<Template>::new();
/// let capture = renderer.clone();
/// let definition = define_component(|_props, _ctx| || "hello", ComponentOptions::new())
///     .with_renderer(move || capture.clone());
///
/// let _element = definition.instantiate(&Reactivity::default());
///
/// renderer.with_renders(|renders| {
///     assert_eq!(renders[0].to_html(), "hello");
/// });
/// ```
pub struct TestRenderer<T> {
    renders: Arc<Mutex<Vec<T>>>,
}

#[cfg(any(test, feature = "testing"))]
impl<T> Clone for TestRenderer<T> {
    fn clone(&self) -> Self {
        Self {
            renders: self.renders.clone(),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl<T> Renderer<T> for TestRenderer<T> {
    fn render(&mut self, output: T, root: &mut ShadowRoot) {
        self.renders.lock().push(output);
        root.record(Patch::Committed);
    }
}

#[cfg(any(test, feature = "testing"))]
impl<T: Send + 'static> Default for TestRenderer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl<T: Send + 'static> TestRenderer<T> {
    pub fn new() -> Self {
        Self {
            renders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of renders that have occurred.
    pub fn count(&self) -> usize {
        self.renders.lock().len()
    }

    /// Access the captured outputs with a closure.
    pub fn with_renders<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<T>) -> R,
    {
        let renders = self.renders.lock();
        f(&renders)
    }
}
