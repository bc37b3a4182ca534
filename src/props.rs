//! Props declarations and their normalized form.
//!
//! A component declares its props either as a plain list of attribute names or
//! as keyed options with a type, a default and a validator. Normalization turns
//! both forms into one descriptor per prop, keyed by the camel-cased name, and
//! decides which props are reflected as observed attributes.

use core::fmt;

use portable_atomic_util::Arc;
use serde_json::{Number, Value};

/// Runtime type a prop may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Function,
    Date,
    Symbol,
}

impl PropType {
    /// Scalar types can round-trip through an attribute value.
    pub fn is_scalar(self) -> bool {
        matches!(self, PropType::String | PropType::Number | PropType::Boolean)
    }

    pub fn name(self) -> &'static str {
        match self {
            PropType::String => "String",
            PropType::Number => "Number",
            PropType::Boolean => "Boolean",
            PropType::Object => "Object",
            PropType::Array => "Array",
            PropType::Function => "Function",
            PropType::Date => "Date",
            PropType::Symbol => "Symbol",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            PropType::String => value.is_string(),
            PropType::Number => value.is_number(),
            PropType::Boolean => value.is_boolean(),
            PropType::Object => value.is_object(),
            PropType::Array => value.is_array(),
            PropType::Function | PropType::Date | PropType::Symbol => true,
        }
    }
}

/// A single type or a list of accepted types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropTypes {
    Single(PropType),
    Many(Vec<PropType>),
}

impl PropTypes {
    pub fn as_slice(&self) -> &[PropType] {
        match self {
            PropTypes::Single(ty) => core::slice::from_ref(ty),
            PropTypes::Many(types) => types,
        }
    }

    fn position(&self, ty: PropType) -> Option<usize> {
        self.as_slice().iter().position(|candidate| *candidate == ty)
    }
}

impl From<PropType> for PropTypes {
    fn from(ty: PropType) -> Self {
        PropTypes::Single(ty)
    }
}

impl From<Vec<PropType>> for PropTypes {
    fn from(types: Vec<PropType>) -> Self {
        PropTypes::Many(types)
    }
}

/// Default value of a prop: a literal or a factory called per instance.
#[derive(Clone)]
pub enum PropDefault {
    Value(Value),
    Factory(Arc<DefaultFactory>),
}

pub struct DefaultFactory(Box<dyn Fn() -> Value + Send + Sync>);

impl PropDefault {
    pub fn resolve(&self) -> Value {
        match self {
            PropDefault::Value(value) => value.clone(),
            PropDefault::Factory(factory) => (factory.0)(),
        }
    }
}

impl fmt::Debug for PropDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            PropDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Predicate a written prop value is checked against.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

struct ValidatorFn(Box<dyn Fn(&Value) -> bool + Send + Sync>);

impl Validator {
    pub fn new(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(ValidatorFn(Box::new(f))))
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.0 .0)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Keyed options of a single prop.
///
/// ```rust
/// use oxide_element::{PropOptions, PropType};
/// use serde_json::json;
///
/// let msg = PropOptions::new()
///     .of_type(PropType::String)
///     .default_value(json!("hello"))
///     .validator(|value| value.as_str().is_some_and(|s| !s.is_empty()));
///
/// assert!(!msg.required);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropOptions {
    /// `None` accepts any type.
    pub ty: Option<PropTypes>,
    pub required: bool,
    pub default: Option<PropDefault>,
    pub validator: Option<Validator>,
}

impl PropOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(mut self, ty: impl Into<PropTypes>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(PropDefault::Value(value.into()));
        self
    }

    pub fn default_with(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(PropDefault::Factory(Arc::new(DefaultFactory(Box::new(
            factory,
        )))));
        self
    }

    pub fn validator(mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Validator::new(f));
        self
    }
}

/// Right-hand side of one entry in a keyed props declaration.
#[derive(Debug, Clone)]
pub enum PropDefinition {
    /// Declared without options; accepts anything and is not reflected.
    Null,
    /// Shorthand for `PropOptions { ty, .. }`.
    Type(PropTypes),
    Options(PropOptions),
}

impl From<PropType> for PropDefinition {
    fn from(ty: PropType) -> Self {
        PropDefinition::Type(ty.into())
    }
}

impl From<Vec<PropType>> for PropDefinition {
    fn from(types: Vec<PropType>) -> Self {
        PropDefinition::Type(types.into())
    }
}

impl From<PropOptions> for PropDefinition {
    fn from(options: PropOptions) -> Self {
        PropDefinition::Options(options)
    }
}

/// Props declaration accepted by [`ComponentOptions::props`](crate::ComponentOptions::props).
///
/// ```rust
/// use oxide_element::{PropOptions, PropType, PropsDeclaration};
///
/// let names = PropsDeclaration::names(["test", "user-name"]);
///
/// let keyed = PropsDeclaration::keyed()
///     .prop("state", PropType::Object)
///     .prop("msg", PropOptions::new().of_type(PropType::String));
/// ```
#[derive(Debug, Clone)]
pub enum PropsDeclaration {
    Names(Vec<String>),
    Keyed(Vec<(String, PropDefinition)>),
}

impl PropsDeclaration {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropsDeclaration::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn keyed() -> Self {
        PropsDeclaration::Keyed(Vec::new())
    }

    /// Append a prop. On a list declaration only the name is kept.
    pub fn prop(mut self, name: impl Into<String>, definition: impl Into<PropDefinition>) -> Self {
        match &mut self {
            PropsDeclaration::Names(names) => names.push(name.into()),
            PropsDeclaration::Keyed(entries) => entries.push((name.into(), definition.into())),
        }
        self
    }
}

/// Flags derived for a prop during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropFlags {
    /// Exposed through the element's observed attributes.
    pub attribute: bool,
    /// `Boolean` is among the declared types.
    pub cast_boolean: bool,
    /// An empty attribute (or one equal to its own name) means `true`.
    pub cast_true: bool,
}

/// Descriptor of one declared prop.
#[derive(Debug, Clone, Default)]
pub struct NormalizedProp {
    pub options: PropOptions,
    pub flags: PropFlags,
}

impl NormalizedProp {
    fn untyped_attribute() -> Self {
        Self {
            options: PropOptions::default(),
            flags: PropFlags {
                attribute: true,
                ..PropFlags::default()
            },
        }
    }

    fn from_options(options: PropOptions) -> Self {
        let mut flags = PropFlags::default();
        if let Some(types) = &options.ty {
            flags.attribute = types.as_slice().iter().any(|ty| ty.is_scalar());

            let boolean = types.position(PropType::Boolean);
            let string = types.position(PropType::String);
            flags.cast_boolean = boolean.is_some();
            flags.cast_true = match (boolean, string) {
                (_, None) => true,
                (Some(boolean), Some(string)) => boolean < string,
                (None, Some(_)) => false,
            };
        }
        Self { options, flags }
    }

    fn has_type(&self, ty: PropType) -> bool {
        self.options
            .ty
            .as_ref()
            .is_some_and(|types| types.position(ty).is_some())
    }

    /// The prop's default for a fresh instance, if it declares one.
    pub fn resolve_default(&self) -> Option<Value> {
        self.options.default.as_ref().map(PropDefault::resolve)
    }

    /// Turn an attribute value (`None` when removed) into the prop value.
    ///
    /// `key` is the camel-cased prop name.
    pub fn cast_attribute(&self, key: &str, raw: Option<&str>) -> Value {
        let default = match raw {
            None => self.resolve_default(),
            Some(_) => None,
        };

        if self.flags.cast_boolean {
            if raw.is_none() && default.is_none() {
                return Value::Bool(false);
            }
            if self.flags.cast_true {
                if let Some(raw) = raw {
                    if raw.is_empty() || raw == hyphenate(key) {
                        return Value::Bool(true);
                    }
                }
            }
        }

        match raw {
            Some(raw) if self.has_type(PropType::Number) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_owned())),
            Some(raw) => Value::String(raw.to_owned()),
            None => default.unwrap_or(Value::Null),
        }
    }

    /// Check `value` against the declared types, `required` and the validator.
    pub fn validate(&self, value: &Value) -> bool {
        if value.is_null() {
            return !self.options.required;
        }
        let type_ok = self
            .options
            .ty
            .as_ref()
            .map_or(true, |types| types.as_slice().iter().any(|ty| ty.accepts(value)));
        let custom_ok = self
            .options
            .validator
            .as_ref()
            .map_or(true, |validator| validator.check(value));
        type_ok && custom_ok
    }
}

/// Normalized props in declaration order, keyed by camel-cased name.
#[derive(Debug, Clone, Default)]
pub struct NormalizedProps {
    entries: Vec<(String, NormalizedProp)>,
}

impl NormalizedProps {
    pub fn get(&self, key: &str) -> Option<&NormalizedProp> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, prop)| prop)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedProp)> {
        self.entries.iter().map(|(key, prop)| (key.as_str(), prop))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // A repeated key keeps its first position and takes the last descriptor.
    fn insert(&mut self, key: String, prop: NormalizedProp) {
        match self.entries.iter_mut().find(|(candidate, _)| *candidate == key) {
            Some((_, existing)) => *existing = prop,
            None => self.entries.push((key, prop)),
        }
    }
}

/// Normalize a props declaration. `None` yields no descriptors.
///
/// Malformed declarations are not rejected: every entry produces a descriptor.
pub fn normalize_props_options(declaration: Option<&PropsDeclaration>) -> NormalizedProps {
    let mut normalized = NormalizedProps::default();
    match declaration {
        None => {}
        Some(PropsDeclaration::Names(names)) => {
            for name in names {
                normalized.insert(camelize(name), NormalizedProp::untyped_attribute());
            }
        }
        Some(PropsDeclaration::Keyed(entries)) => {
            for (name, definition) in entries {
                let prop = match definition {
                    PropDefinition::Null => NormalizedProp::default(),
                    PropDefinition::Type(types) => NormalizedProp::from_options(PropOptions {
                        ty: Some(types.clone()),
                        ..PropOptions::default()
                    }),
                    PropDefinition::Options(options) => {
                        NormalizedProp::from_options(options.clone())
                    }
                };
                normalized.insert(camelize(name), prop);
            }
        }
    }
    normalized
}

/// Attribute names of the reflected props, hyphenated, in declaration order.
pub fn observed_attributes(props: &NormalizedProps) -> Vec<String> {
    props
        .iter()
        .filter(|(_, prop)| prop.flags.attribute)
        .map(|(key, _)| hyphenate(key))
        .collect()
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `user-name` → `userName`.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '-' && is_word(next) => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// `userName` → `user-name`.
pub fn hyphenate(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut previous: Option<char> = None;
    for c in key.chars() {
        if c.is_ascii_uppercase() && previous.is_some_and(is_word) {
            out.push('-');
        }
        out.push(c.to_ascii_lowercase());
        previous = Some(c);
    }
    out
}
