mod simple_component;

use std::sync::Arc;

use oxide_element::{ElementRegistry, EngineConfig, HostElement, Reactivity, Template, TestRenderer};
pub(crate) use simple_component::*;

mod attribute_render_tests;
mod lifecycle_hook_tests;

pub(crate) struct IntegrationTest {
    pub(crate) registry: ElementRegistry,
    pub(crate) element: HostElement,
    pub(crate) renders: TestRenderer<Template>,
}

pub(crate) struct IntegrationTestBuilder {
    config: EngineConfig,
    probe: Option<SharedProbe>,
    connected: bool,
}

pub(crate) fn build_integration_test() -> IntegrationTestBuilder {
    IntegrationTestBuilder {
        config: EngineConfig::sync(),
        probe: None,
        connected: false,
    }
}

impl IntegrationTestBuilder {
    pub(crate) fn given_queued_scheduling(mut self) -> Self {
        self.config = EngineConfig::queued();
        self
    }

    pub(crate) fn given_lifecycle_probe(mut self, probe: MockLifecycleProbe) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    pub(crate) fn given_hook_journal(mut self, journal: &HookJournal) -> Self {
        self.probe = Some(Arc::new(journal.clone()));
        self
    }

    pub(crate) fn given_a_connected_element(mut self) -> Self {
        self.connected = true;
        self
    }

    pub(crate) fn build(self) -> IntegrationTest {
        let renders = TestRenderer::new();
        let probe = self.probe.unwrap_or_else(|| Arc::new(permissive_probe()));

        let mut registry = ElementRegistry::new(Reactivity::new(self.config));
        registry
            .define(COUNTER_TAG, counter_definition(probe, renders.clone()))
            .expect("counter tag is a valid custom element name");

        let mut element = registry.create(COUNTER_TAG).expect("counter is defined");
        if self.connected {
            element.connect();
        }

        IntegrationTest {
            registry,
            element,
            renders,
        }
    }
}

impl IntegrationTest {
    pub(crate) fn last_html(&self) -> String {
        self.renders
            .with_renders(|renders| renders.last().map(Template::to_html).unwrap_or_default())
    }
}
