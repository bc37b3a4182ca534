use std::sync::{Arc, Mutex};

use oxide_element::{
    define_component, ComponentDefinition, ComponentOptions, PropOptions, PropType,
    PropsDeclaration, Template, TestRenderer,
};

pub(crate) const COUNTER_TAG: &str = "x-counter";

#[cfg_attr(test, mockall::automock)]
pub(crate) trait LifecycleProbe {
    fn before_mount(&self);
    fn mounted(&self);
    fn before_update(&self);
    fn updated(&self);
    fn unmounted(&self, props_live: bool);
}

/// Probe that accepts any number of hook calls.
pub(crate) fn permissive_probe() -> MockLifecycleProbe {
    let mut probe = MockLifecycleProbe::new();
    probe.expect_before_mount().returning(|| ());
    probe.expect_mounted().returning(|| ());
    probe.expect_before_update().returning(|| ());
    probe.expect_updated().returning(|| ());
    probe.expect_unmounted().returning(|_| ());
    probe
}

/// Probe that writes every hook call into a shared journal, in order.
#[derive(Clone, Default)]
pub(crate) struct HookJournal(Arc<Mutex<Vec<String>>>);

impl HookJournal {
    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Number of live journal handles, this one included.
    pub(crate) fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    fn push(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_owned());
    }
}

impl LifecycleProbe for HookJournal {
    fn before_mount(&self) {
        self.push("before_mount");
    }

    fn mounted(&self) {
        self.push("mounted");
    }

    fn before_update(&self) {
        self.push("before_update");
    }

    fn updated(&self) {
        self.push("updated");
    }

    fn unmounted(&self, props_live: bool) {
        self.push(if props_live { "unmounted" } else { "unmounted (released)" });
    }
}

pub(crate) type SharedProbe = Arc<dyn LifecycleProbe + Send + Sync>;

/// A counter element: `label` and `count` render, `open` renders as a flag,
/// `note` is declared but never read by the render function.
pub(crate) fn counter_definition(
    probe: SharedProbe,
    renderer: TestRenderer<Template>,
) -> ComponentDefinition {
    define_component(
        move |props, ctx| {
            let hook = probe.clone();
            ctx.on_before_mount(move || hook.before_mount());
            let hook = probe.clone();
            ctx.on_mounted(move || hook.mounted());
            let hook = probe.clone();
            ctx.on_before_update(move || hook.before_update());
            let hook = probe.clone();
            ctx.on_updated(move || hook.updated());
            let hook = probe.clone();
            let observed = props.clone();
            ctx.on_unmounted(move || hook.unmounted(!observed.is_released()));

            move || {
                let label = props.get_str("label").unwrap_or_default();
                let count = props.get_f64("count").unwrap_or_default();
                let open = props.get_bool("open").unwrap_or_default();
                Template::new(
                    &["<p>", ": ", "</p><i>", "</i>"],
                    vec![label.into(), count.into(), open.into()],
                )
            }
        },
        ComponentOptions::new().name(COUNTER_TAG).props(
            PropsDeclaration::keyed()
                .prop("label", PropType::String)
                .prop(
                    "count",
                    PropOptions::new().of_type(PropType::Number).default_value(0),
                )
                .prop("open", PropType::Boolean)
                .prop("note", PropType::String)
                .prop("state", PropType::Object),
        ),
    )
    .with_renderer(move || renderer.clone())
}
