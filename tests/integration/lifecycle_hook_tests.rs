use std::sync::{Arc, Mutex};

use mockall::predicate::eq;
use mockall::Sequence;
use oxide_element::{
    define_component, ComponentOptions, ElementRegistry, Reactivity, SetupContext,
    ShallowReactive, Template, TestRenderer,
};

use super::{build_integration_test, HookJournal, IntegrationTest, MockLifecycleProbe};

#[test]
fn given_a_new_element_should_run_before_mount_once_and_render_once() {
    let journal = HookJournal::default();
    let test = build_integration_test().given_hook_journal(&journal).build();

    assert_eq!(journal.entries(), vec!["before_mount"]);
    assert_eq!(test.renders.count(), 1);
    assert_eq!(test.last_html(), "<p>: 0</p><i>false</i>");
}

#[test]
fn given_a_connected_element_when_attribute_changed_should_wrap_one_render_in_update_hooks() {
    let mut sequence = Sequence::new();
    let mut probe = MockLifecycleProbe::new();
    probe
        .expect_before_mount()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| ());
    probe
        .expect_mounted()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| ());
    probe
        .expect_before_update()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| ());
    probe
        .expect_updated()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| ());
    probe
        .expect_unmounted()
        .with(eq(true))
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| ());

    let mut test = build_integration_test()
        .given_lifecycle_probe(probe)
        .given_a_connected_element()
        .build();

    test.element.set_attribute("label", "clicks");
    test.element.disconnect();

    assert_eq!(test.renders.count(), 2);
    assert_eq!(test.last_html(), "<p>clicks: 0</p><i>false</i>");
}

#[test]
fn given_a_connected_element_when_disconnected_should_unmount_once_before_releasing_props() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    test.element.disconnect();
    test.element.disconnect();

    assert_eq!(journal.entries(), vec!["before_mount", "mounted", "unmounted"]);
}

#[test]
fn given_a_disconnected_element_when_attribute_changed_should_not_render() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    test.element.disconnect();
    test.element.set_attribute("label", "late");
    test.element.set_attribute("count", "9");

    assert_eq!(test.renders.count(), 1);
    assert_eq!(journal.entries(), vec!["before_mount", "mounted", "unmounted"]);
    assert_eq!(test.element.get_attribute("label"), Some("late"));
}

#[test]
fn given_a_reconnected_element_should_mount_again_without_rendering() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    test.element.disconnect();
    test.element.connect();
    test.element.set_attribute("label", "back");

    assert_eq!(
        journal.entries(),
        vec!["before_mount", "mounted", "unmounted", "mounted"]
    );
    assert_eq!(test.renders.count(), 1);
}

#[test]
fn given_a_connected_element_when_dropped_should_free_it_without_unmounting() {
    let journal = HookJournal::default();
    let IntegrationTest {
        registry,
        element,
        renders,
    } = build_integration_test()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    drop(element);
    drop(registry);

    assert_eq!(journal.entries(), vec!["before_mount", "mounted"]);
    assert_eq!(journal.holders(), 1);
    assert_eq!(renders.count(), 1);
}

#[test]
fn given_two_elements_of_one_definition_should_keep_hooks_per_instance() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();
    let mut second = test.registry.create(super::COUNTER_TAG).expect("counter is defined");

    second.connect();
    second.set_attribute("label", "second");
    test.element.disconnect();

    assert_eq!(
        journal.entries(),
        vec![
            "before_mount",
            "mounted",
            "before_mount",
            "mounted",
            "before_update",
            "updated",
            "unmounted",
        ]
    );
    assert_eq!(test.renders.count(), 3);
}

#[test]
fn given_a_context_kept_past_setup_should_ignore_late_registrations() {
    let renders = TestRenderer::<Template>::new();
    let capture = renders.clone();
    let kept: Arc<Mutex<Option<SetupContext>>> = Arc::new(Mutex::new(None));
    let slot = kept.clone();
    let mounted = Arc::new(Mutex::new(0));

    let mut registry = ElementRegistry::new(Reactivity::default());
    registry
        .define(
            "x-late",
            define_component(
                move |_props, ctx| {
                    *slot.lock().unwrap() = Some(ctx.clone());
                    || "late"
                },
                ComponentOptions::new().name("x-late"),
            )
            .with_renderer(move || capture.clone()),
        )
        .expect("valid name");
    let mut element = registry.create("x-late").expect("defined");

    let ctx = kept.lock().unwrap().take().expect("setup ran");
    let counter = mounted.clone();
    let unregister = ctx.on_mounted(move || *counter.lock().unwrap() += 1);
    element.connect();

    assert!(!ctx.is_live());
    assert!(unregister.is_noop());
    assert_eq!(*mounted.lock().unwrap(), 0);
    assert_eq!(renders.count(), 1);
}

#[test]
fn given_a_hook_unregistered_during_setup_should_never_run() {
    let mounted = Arc::new(Mutex::new(Vec::new()));
    let journal = mounted.clone();

    let mut registry = ElementRegistry::new(Reactivity::default());
    registry
        .define(
            "x-unregister",
            define_component(
                move |_props, ctx| {
                    let first = journal.clone();
                    let removed = ctx.on_mounted(move || first.lock().unwrap().push("removed"));
                    let second = journal.clone();
                    ctx.on_mounted(move || second.lock().unwrap().push("kept"));
                    removed.unregister();
                    || ""
                },
                ComponentOptions::new(),
            ),
        )
        .expect("valid name");
    let mut element = registry.create("x-unregister").expect("defined");

    element.connect();

    assert_eq!(*mounted.lock().unwrap(), vec!["kept"]);
}

fn failing_setup(_props: ShallowReactive, _ctx: &SetupContext) -> fn() -> &'static str {
    panic!("setup failed")
}

#[test]
#[should_panic(expected = "setup failed")]
fn given_a_panicking_setup_should_propagate_the_panic_out_of_create() {
    let mut registry = ElementRegistry::new(Reactivity::default());
    registry
        .define(
            "x-broken",
            define_component(failing_setup, ComponentOptions::new()),
        )
        .expect("valid name");

    let _ = registry.create("x-broken");
}
