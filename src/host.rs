//! The custom-element host: element registry and the elements it creates.
//!
//! This plays the role a browser's custom-element registry plays for a DOM
//! binding. It owns the reactive engine elements are constructed in, decides
//! which attribute changes reach an element, and delivers the connect and
//! disconnect callbacks.

use std::collections::{BTreeMap, BTreeSet};

use portable_atomic_util::Arc;

use crate::error::ElementError;
use crate::runtime::Reactivity;

/// Lifecycle callbacks of a custom element.
///
/// All callbacks default to doing nothing.
pub trait CustomElement: Send {
    /// The element was inserted into a document.
    fn connected_callback(&mut self) {}

    /// The element was removed from its document.
    fn disconnected_callback(&mut self) {}

    /// An observed attribute was added, changed or removed (`new` is `None`).
    fn attribute_changed_callback(&mut self, name: &str, old: Option<&str>, new: Option<&str>) {
        let _ = (name, old, new);
    }
}

/// Constructor registered under a custom-element name.
pub trait CustomElementConstructor: Send + Sync {
    /// Attribute names whose changes are delivered to
    /// [`CustomElement::attribute_changed_callback`]. Read once, at definition time.
    fn observed_attributes(&self) -> Vec<String>;

    /// Construct a new element in `engine`.
    fn construct(&self, engine: &Reactivity) -> Result<Box<dyn CustomElement>, ElementError>;
}

struct Definition {
    constructor: Box<dyn CustomElementConstructor>,
    observed: Arc<BTreeSet<String>>,
}

const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Whether `name` can be registered as a custom element.
///
/// Names start with a lowercase ASCII letter, contain a hyphen, contain no
/// uppercase ASCII letters and are not one of the reserved SVG/MathML names.
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_lowercase = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let allowed = name.chars().all(|c| {
        c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || matches!(c, '-' | '.' | '_')
            || !c.is_ascii()
    });

    starts_lowercase && allowed && name.contains('-') && !RESERVED_NAMES.contains(&name)
}

/// Registry of custom-element definitions.
///
/// # Example
///
/// ```rust
/// use oxide_element::{define_component, ComponentOptions, ElementRegistry, Reactivity};
///
/// let mut registry = ElementRegistry::new(Reactivity::default());
/// registry
///     .define("my-child", define_component(|_props, _ctx| || "child", ComponentOptions::new()))
///     .unwrap();
///
/// let mut element = registry.create("my-child").unwrap();
/// element.connect();
/// assert!(element.is_connected());
/// ```
pub struct ElementRegistry {
    engine: Reactivity,
    definitions: BTreeMap<String, Arc<Definition>>,
}

impl ElementRegistry {
    pub fn new(engine: Reactivity) -> Self {
        Self {
            engine,
            definitions: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> &Reactivity {
        &self.engine
    }

    /// Register `constructor` under `name`.
    pub fn define<C>(&mut self, name: &str, constructor: C) -> Result<(), ElementError>
    where
        C: CustomElementConstructor + 'static,
    {
        if !is_valid_custom_element_name(name) {
            return Err(ElementError::InvalidName(name.to_owned()));
        }
        if self.definitions.contains_key(name) {
            return Err(ElementError::AlreadyDefined(name.to_owned()));
        }

        let observed: BTreeSet<String> = constructor.observed_attributes().into_iter().collect();
        tracing::debug!(name, ?observed, "defining custom element");
        self.definitions.insert(
            name.to_owned(),
            Arc::new(Definition {
                constructor: Box::new(constructor),
                observed: Arc::new(observed),
            }),
        );
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Observed attributes of the element defined under `name`.
    pub fn observed_attributes(&self, name: &str) -> Option<Vec<String>> {
        self.definitions
            .get(name)
            .map(|definition| definition.observed.iter().cloned().collect())
    }

    /// Construct a new, disconnected element.
    pub fn create(&self, name: &str) -> Result<HostElement, ElementError> {
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| ElementError::Undefined(name.to_owned()))?;
        let element = definition.constructor.construct(&self.engine)?;

        Ok(HostElement {
            local_name: name.to_owned(),
            element,
            observed: definition.observed.clone(),
            attributes: BTreeMap::new(),
            connected: false,
        })
    }
}

/// An element created by an [`ElementRegistry`], with its attributes and
/// connection state.
pub struct HostElement {
    local_name: String,
    element: Box<dyn CustomElement>,
    observed: Arc<BTreeSet<String>>,
    attributes: BTreeMap<String, String>,
    connected: bool,
}

impl HostElement {
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set an attribute. Attribute names are case-insensitive.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let old = self.attributes.insert(name.clone(), value.to_owned());
        if self.observed.contains(&name) {
            self.element
                .attribute_changed_callback(&name, old.as_deref(), Some(value));
        }
    }

    /// Remove an attribute; removing an absent attribute does nothing.
    pub fn remove_attribute(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        let Some(old) = self.attributes.remove(&name) else {
            return;
        };
        if self.observed.contains(&name) {
            self.element
                .attribute_changed_callback(&name, Some(&old), None);
        }
    }

    /// Insert the element into the document.
    pub fn connect(&mut self) {
        if !self.connected {
            self.connected = true;
            self.element.connected_callback();
        }
    }

    /// Remove the element from the document.
    pub fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.element.disconnected_callback();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
