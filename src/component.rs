//! Component definitions and the element instances they construct.

use portable_atomic_util::Arc;

use std::collections::BTreeMap;

use crate::config::ComponentOptions;
use crate::effect::EffectHandle;
use crate::error::ElementError;
use crate::hooks::{HookPhase, HookRegistry, SetupContext};
use crate::host::{CustomElement, CustomElementConstructor};
use crate::props::{camelize, hyphenate, normalize_props_options, NormalizedProps};
use crate::reactive::ShallowReactive;
use crate::renderer::{Renderer, ShadowRoot, ShadowRootMode};
use crate::runtime::Reactivity;
use crate::scope::EffectScope;
use crate::template::{Template, TemplateRenderer};

/// Render function returned by a component's `setup`.
pub type RenderFn = Box<dyn FnMut() -> Template + Send>;

type BoxedRenderer = Box<dyn Renderer<Template> + Send>;

struct Setup(Box<dyn Fn(ShallowReactive, &SetupContext) -> RenderFn + Send + Sync>);

struct RendererFactory(Box<dyn Fn() -> BoxedRenderer + Send + Sync>);

/// A component ready to be registered as a custom element.
///
/// Produced by [`define_component`]. Each call to [`instantiate`](Self::instantiate)
/// (or [`CustomElementConstructor::construct`]) builds an independent element.
#[derive(Clone)]
pub struct ComponentDefinition {
    name: Option<String>,
    props: Arc<NormalizedProps>,
    observed: Vec<String>,
    attributes: Arc<BTreeMap<String, String>>,
    setup: Arc<Setup>,
    renderer: Arc<RendererFactory>,
}

/// Define a component from a `setup` function.
///
/// `setup` runs once per element with the element's reactive props and a
/// [`SetupContext`] for registering lifecycle hooks. It returns the render
/// function; every reactive value the render function reads is tracked, and
/// writing any of them re-renders the element.
///
/// # Example
///
/// ```rust
/// use oxide_element::{
///     define_component, ComponentOptions, CustomElementConstructor, PropsDeclaration, Template,
/// };
///
/// let definition = define_component(
///     |props, ctx| {
///         ctx.on_mounted(|| {});
///         move || Template::new(&["<p>", "</p>"], vec![props.get("test").into()])
///     },
///     ComponentOptions::new()
///         .name("my-component")
///         .props(PropsDeclaration::names(["test"])),
/// );
///
/// assert_eq!(definition.observed_attributes(), vec!["test"]);
/// ```
pub fn define_component<S, F, O>(setup: S, options: ComponentOptions) -> ComponentDefinition
where
    S: Fn(ShallowReactive, &SetupContext) -> F + Send + Sync + 'static,
    F: FnMut() -> O + Send + 'static,
    O: Into<Template>,
{
    let props = normalize_props_options(options.props.as_ref());
    let mut observed = Vec::new();
    let mut attributes = BTreeMap::new();
    for (key, _) in props.iter().filter(|(_, prop)| prop.flags.attribute) {
        let attribute = hyphenate(key);
        observed.push(attribute.clone());
        attributes.insert(attribute, key.to_owned());
    }
    tracing::debug!(name = ?options.name, ?observed, "defined component");

    let setup = Setup(Box::new(
        move |props: ShallowReactive, ctx: &SetupContext| -> RenderFn {
            let mut render = setup(props, ctx);
            Box::new(move || -> Template { render().into() })
        },
    ));

    ComponentDefinition {
        name: options.name,
        props: Arc::new(props),
        observed,
        attributes: Arc::new(attributes),
        setup: Arc::new(setup),
        renderer: Arc::new(RendererFactory(Box::new(|| {
            Box::new(TemplateRenderer) as BoxedRenderer
        }))),
    }
}

impl ComponentDefinition {
    /// Replace the renderer every new instance renders with.
    ///
    /// `make` is called once per instance.
    pub fn with_renderer<M, R>(mut self, make: M) -> Self
    where
        M: Fn() -> R + Send + Sync + 'static,
        R: Renderer<Template> + Send + 'static,
    {
        self.renderer = Arc::new(RendererFactory(Box::new(move || {
            Box::new(make()) as BoxedRenderer
        })));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn props(&self) -> &NormalizedProps {
        &self.props
    }

    /// Build an element, run `setup` and render it once.
    pub fn instantiate(&self, engine: &Reactivity) -> ComponentElement {
        let hooks = HookRegistry::new();

        let props = ShallowReactive::new(engine);
        for (key, prop) in self.props.iter() {
            if let Some(value) = prop.resolve_default() {
                props.set(key, value);
            }
        }

        let scope = engine.effect_scope();
        let ctx = SetupContext::open(engine.clone(), hooks.clone(), self.name.clone());
        let mut render = {
            let _live = ctx.close_on_drop();
            let _current = engine.enter_scope(scope.clone());
            (self.setup.0)(props.clone(), &ctx)
        };

        hooks.run(HookPhase::BeforeMount);

        let mut root = ShadowRoot::attach(ShadowRootMode::Closed);
        let mut renderer = (self.renderer.0)();
        let render_hooks = hooks.clone();
        let mut is_mounted = false;
        let render_effect = scope.effect(move || {
            if is_mounted {
                render_hooks.run(HookPhase::BeforeUpdate);
            }
            renderer.render(render(), &mut root);
            if is_mounted {
                render_hooks.run(HookPhase::Updated);
            } else {
                is_mounted = true;
            }
        });

        let released = props.clone();
        scope.on_dispose(move || released.release());

        tracing::debug!(name = ?self.name, "constructed component element");
        ComponentElement {
            name: self.name.clone(),
            props,
            normalized: self.props.clone(),
            attributes: self.attributes.clone(),
            hooks,
            scope,
            render_effect,
        }
    }
}

impl CustomElementConstructor for ComponentDefinition {
    fn observed_attributes(&self) -> Vec<String> {
        self.observed.clone()
    }

    fn construct(&self, engine: &Reactivity) -> Result<Box<dyn CustomElement>, ElementError> {
        Ok(Box::new(self.instantiate(engine)))
    }
}

/// One live instance of a [`ComponentDefinition`].
///
/// Dropping the element stops its scope without running the `unmounted` hooks.
pub struct ComponentElement {
    name: Option<String>,
    props: ShallowReactive,
    normalized: Arc<NormalizedProps>,
    attributes: Arc<BTreeMap<String, String>>,
    hooks: HookRegistry,
    scope: EffectScope,
    render_effect: EffectHandle,
}

impl ComponentElement {
    /// The element's reactive props.
    pub fn props(&self) -> &ShallowReactive {
        &self.props
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Whether prop changes still re-render the element.
    pub fn is_rendering(&self) -> bool {
        self.scope.is_active() && self.render_effect.is_active()
    }
}

impl CustomElement for ComponentElement {
    fn connected_callback(&mut self) {
        tracing::debug!(name = ?self.name, "mounted");
        self.hooks.run(HookPhase::Mounted);
    }

    fn disconnected_callback(&mut self) {
        tracing::debug!(name = ?self.name, "unmounted");
        self.hooks.run(HookPhase::Unmounted);
        self.scope.stop();
    }

    fn attribute_changed_callback(&mut self, name: &str, _old: Option<&str>, new: Option<&str>) {
        let key = match self.attributes.get(name) {
            Some(key) => key.clone(),
            None => camelize(name),
        };
        let value = match self.normalized.get(&key) {
            Some(prop) => {
                let value = prop.cast_attribute(&key, new);
                if !prop.validate(&value) {
                    tracing::warn!(name = ?self.name, prop = %key, %value, "invalid prop value");
                }
                value
            }
            None => {
                tracing::debug!(name = ?self.name, prop = %key, "attribute for an undeclared prop");
                new.map_or(serde_json::Value::Null, Into::into)
            }
        };
        self.props.set(key, value);
    }
}

impl Drop for ComponentElement {
    fn drop(&mut self) {
        // The render effect holds the props, which hold the engine.
        self.scope.stop();
    }
}
