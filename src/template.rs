//! Declarative templates and the renderer that diffs them in place.
//!
//! A [`Template`] pairs a static list of markup strings with the dynamic
//! values that go between them, the same split a tagged template literal
//! produces. Two renders of the same static strings differ only in their
//! parts, so [`TemplateRenderer`] rewrites just the parts that changed.

use serde_json::Value;

use crate::renderer::{Patch, Renderer, ShadowRoot};

const TEXT: &[&str] = &["", ""];

/// A dynamic value placed between two static strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Renders nothing.
    Empty,
    /// Text content; escaped when serialized.
    Text(String),
    /// A nested template.
    Template(Box<Template>),
}

impl Part {
    fn write_html(&self, out: &mut String) {
        match self {
            Part::Empty => {}
            Part::Text(text) => escape_into(text, out),
            Part::Template(template) => template.write_html(out),
        }
    }
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Part::Text(text.to_owned())
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        Part::Text(text)
    }
}

impl From<bool> for Part {
    fn from(value: bool) -> Self {
        Part::Text(value.to_string())
    }
}

impl From<i64> for Part {
    fn from(value: i64) -> Self {
        Part::Text(value.to_string())
    }
}

impl From<i32> for Part {
    fn from(value: i32) -> Self {
        Part::Text(value.to_string())
    }
}

impl From<f64> for Part {
    fn from(value: f64) -> Self {
        Part::Text(value.to_string())
    }
}

impl From<Value> for Part {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Part::Empty,
            Value::String(text) => Part::Text(text),
            other => Part::Text(other.to_string()),
        }
    }
}

impl From<Option<Value>> for Part {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Part::Empty, Part::from)
    }
}

impl From<Template> for Part {
    fn from(template: Template) -> Self {
        Part::Template(Box::new(template))
    }
}

impl From<Option<Template>> for Part {
    fn from(template: Option<Template>) -> Self {
        template.map_or(Part::Empty, Part::from)
    }
}

/// Output of a render function.
///
/// # Example
///
/// ```rust
/// use oxide_element::Template;
///
/// let count: i32 = 3;
/// let template = Template::new(&["<p>", "</p>"], vec![count.into()]);
///
/// assert_eq!(template.to_html(), "<p>3</p>");
/// assert_eq!(Template::text("a < b").to_html(), "a &lt; b");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    strings: &'static [&'static str],
    parts: Vec<Part>,
}

impl Template {
    /// Build a template from its static strings and the parts between them.
    ///
    /// Missing parts render as [`Part::Empty`]; surplus parts are dropped.
    pub fn new(strings: &'static [&'static str], mut parts: Vec<Part>) -> Self {
        let slots = strings.len().saturating_sub(1);
        parts.resize(slots, Part::Empty);
        Self { strings, parts }
    }

    /// A template holding only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            strings: TEXT,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn strings(&self) -> &'static [&'static str] {
        self.strings
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        for (index, markup) in self.strings.iter().enumerate() {
            out.push_str(markup);
            if let Some(part) = self.parts.get(index) {
                part.write_html(out);
            }
        }
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Template::text(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Template::text(text)
    }
}

/// A template committed into a [`ShadowRoot`].
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateInstance {
    template: Template,
}

impl TemplateInstance {
    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn to_html(&self) -> String {
        self.template.to_html()
    }

    fn matches(&self, template: &Template) -> bool {
        let current = self.template.strings;
        core::ptr::eq(current, template.strings) || current == template.strings
    }

    // Rewrites the parts that differ and returns how many did.
    fn patch(&mut self, template: Template) -> usize {
        let mut patched = 0;
        for (slot, part) in self.template.parts.iter_mut().zip(template.parts) {
            if *slot != part {
                *slot = part;
                patched += 1;
            }
        }
        patched
    }
}

/// Renders [`Template`]s, updating only the parts that changed since the
/// previous render into the same root.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl Renderer<Template> for TemplateRenderer {
    fn render(&mut self, output: Template, root: &mut ShadowRoot) {
        let patch = match root.instance_mut() {
            Some(instance) if instance.matches(&output) => match instance.patch(output) {
                0 => Patch::Unchanged,
                parts => Patch::Updated { parts },
            },
            _ => {
                root.commit(TemplateInstance { template: output });
                Patch::Committed
            }
        };
        tracing::trace!(?patch, "rendered template");
        root.record(patch);
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
