//! A minimal custom-element runtime binding tracked reactive state to a
//! template renderer.
//!
//! A component is a `setup` function that receives the element's reactive
//! props and a [`SetupContext`], and returns a render function. The runtime
//! runs the render function inside a tracked effect: whatever reactive state
//! it reads is recorded, and writing that state renders the element again.
//! Nothing else triggers a render.
//!
//! Elements follow the custom-element lifecycle. Observed attributes come from
//! the props declaration, attribute changes are written into the props, and
//! connect/disconnect run the `mounted`/`unmounted` hooks. Disconnecting also
//! stops the element's reactive scope, after which it never renders again.
//!
//! ## Example
//!
//! ```rust
//! use oxide_element::{
//!     define_component, ComponentOptions, ElementRegistry, PropsDeclaration, Reactivity, Template,
//!     TestRenderer,
//! };
//!
//! let renderer = TestRenderer::<Template>::new();
//! let capture = renderer.clone();
//!
//! let greeting = define_component(
//!     |props, ctx| {
//!         ctx.on_updated(|| println!("greeting updated"));
//!         move || {
//!             let name = props.get_str("name").unwrap_or_default();
//!             Template::new(&["<p>Hello, ", "!</p>"], vec![name.into()])
//!         }
//!     },
//!     ComponentOptions::new()
//!         .name("x-greeting")
//!         .props(PropsDeclaration::names(["name"])),
//! )
//! .with_renderer(move || capture.clone());
//!
//! let mut registry = ElementRegistry::new(Reactivity::default());
//! registry.define("x-greeting", greeting).unwrap();
//!
//! let mut element = registry.create("x-greeting").unwrap();
//! element.connect();
//! element.set_attribute("name", "world");
//!
//! renderer.with_renders(|renders| {
//!     assert_eq!(renders.len(), 2);
//!     assert_eq!(renders[1].to_html(), "<p>Hello, world!</p>");
//! });
//!
//! element.disconnect();
//! element.set_attribute("name", "nobody");
//! assert_eq!(renderer.count(), 2);
//! ```

// Module declarations
mod component;
mod config;
mod effect;
mod error;
mod hooks;
mod host;
mod props;
mod reactive;
mod renderer;
mod runtime;
mod scope;
mod template;

// Public re-exports
pub use component::{define_component, ComponentDefinition, ComponentElement, RenderFn};
pub use config::{ComponentOptions, EngineConfig, Scheduling};
pub use effect::EffectHandle;
pub use error::ElementError;
pub use hooks::{HookPhase, HookRegistry, SetupContext, Unregister};
pub use host::{
    is_valid_custom_element_name, CustomElement, CustomElementConstructor, ElementRegistry,
    HostElement,
};
pub use props::{
    camelize, hyphenate, normalize_props_options, observed_attributes, DefaultFactory, NormalizedProp,
    NormalizedProps, PropDefault, PropDefinition, PropFlags, PropOptions, PropType, PropTypes,
    PropsDeclaration, Validator,
};
pub use reactive::{Ref, ShallowReactive};
pub use renderer::{Patch, Renderer, ShadowRoot, ShadowRootMode};
pub use runtime::{EffectId, Reactivity};
pub use scope::EffectScope;
pub use template::{Part, Template, TemplateInstance, TemplateRenderer};

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use renderer::TestRenderer;
#[cfg(any(test, feature = "testing"))]
pub use runtime::block_on_tick;
