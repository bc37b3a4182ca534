use oxide_element::block_on_tick;

use super::{build_integration_test, HookJournal};

#[test]
fn given_a_counter_definition_should_observe_only_scalar_props() {
    let test = build_integration_test().build();

    assert_eq!(
        test.registry.observed_attributes(super::COUNTER_TAG),
        Some(vec![
            "count".to_string(),
            "label".to_string(),
            "note".to_string(),
            "open".to_string(),
        ])
    );
}

#[test]
fn given_an_observed_attribute_when_set_should_render_the_new_value() {
    let mut test = build_integration_test().given_a_connected_element().build();

    test.element.set_attribute("LABEL", "clicks");

    assert_eq!(test.renders.count(), 2);
    assert_eq!(test.last_html(), "<p>clicks: 0</p><i>false</i>");
}

#[test]
fn given_a_boolean_prop_should_cast_presence_and_absence() {
    let mut test = build_integration_test().given_a_connected_element().build();

    test.element.set_attribute("open", "");
    assert_eq!(test.last_html(), "<p>: 0</p><i>true</i>");

    test.element.remove_attribute("open");
    assert_eq!(test.last_html(), "<p>: 0</p><i>false</i>");

    test.element.set_attribute("open", "open");
    assert_eq!(test.last_html(), "<p>: 0</p><i>true</i>");
    assert_eq!(test.renders.count(), 4);
}

#[test]
fn given_a_number_prop_should_cast_numeric_text_and_fall_back_to_the_default() {
    let mut test = build_integration_test().given_a_connected_element().build();

    test.element.set_attribute("count", " 12 ");
    assert_eq!(test.last_html(), "<p>: 12</p><i>false</i>");

    test.element.set_attribute("count", "twelve");
    assert_eq!(test.last_html(), "<p>: 0</p><i>false</i>");

    test.element.set_attribute("count", "3");
    test.element.remove_attribute("count");
    assert_eq!(test.last_html(), "<p>: 0</p><i>false</i>");
}

#[test]
fn given_the_same_attribute_value_twice_should_render_once() {
    let mut test = build_integration_test().given_a_connected_element().build();

    test.element.set_attribute("label", "same");
    test.element.set_attribute("label", "same");

    assert_eq!(test.renders.count(), 2);
}

#[test]
fn given_a_prop_the_render_never_reads_when_changed_should_not_render() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    test.element.set_attribute("note", "unused");
    test.element.set_attribute("state", "{}");
    test.element.set_attribute("title", "not a prop");

    assert_eq!(test.renders.count(), 1);
    assert_eq!(journal.entries(), vec!["before_mount", "mounted"]);
}

#[test]
fn given_queued_scheduling_should_batch_attribute_changes_until_the_tick() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_queued_scheduling()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    test.element.set_attribute("label", "batched");
    test.element.set_attribute("count", "3");
    test.element.set_attribute("open", "");

    assert_eq!(test.renders.count(), 1);
    assert_eq!(test.registry.engine().pending(), 1);

    assert_eq!(block_on_tick(test.registry.engine()), 1);

    assert_eq!(test.renders.count(), 2);
    assert_eq!(test.last_html(), "<p>batched: 3</p><i>true</i>");
    assert_eq!(
        journal.entries(),
        vec!["before_mount", "mounted", "before_update", "updated"]
    );
}

#[test]
fn given_queued_scheduling_when_disconnected_before_flush_should_drop_the_pending_render() {
    let journal = HookJournal::default();
    let mut test = build_integration_test()
        .given_queued_scheduling()
        .given_hook_journal(&journal)
        .given_a_connected_element()
        .build();

    test.element.set_attribute("label", "never shown");
    test.element.disconnect();

    assert_eq!(test.registry.engine().flush(), 0);
    assert_eq!(test.renders.count(), 1);
    assert_eq!(journal.entries(), vec!["before_mount", "mounted", "unmounted"]);
}
