use crate::error::EventError;
use crate::native::BrowserEvent;
use crate::registry::{EventTypeOptions, EventTypeRegistry, is_non_bubbling, suppressed_when_disabled};
use crate::store::{HandlerInfo, HandlerInfoStore};
use core_types::{BrowserRendererId, ComponentId, EventHandlerId};
use html::{Document, InputControlType, NodeId, input_control_type};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Value of the form field that raised an event, for two-way binding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFieldInfo {
    pub component_id: u32,
    pub field_value: Value,
}

impl EventFieldInfo {
    /// Checkboxes report `checked`; other inputs, selects and textareas
    /// report `value`. Any other target has no field info.
    pub fn from_target(
        component_id: ComponentId,
        doc: &Document,
        target: NodeId,
    ) -> Option<EventFieldInfo> {
        let field_value = match input_control_type(doc, target) {
            Some(InputControlType::Checkbox) => Value::Bool(doc.checked(target)),
            Some(_) => Value::String(doc.value(target)),
            None if doc.is_tag(target, "select") || doc.is_tag(target, "textarea") => {
                Value::String(doc.value(target))
            }
            None => return None,
        };
        Some(EventFieldInfo {
            component_id: component_id.0,
            field_value,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescriptor {
    pub browser_renderer_id: u32,
    pub event_handler_id: u64,
    pub event_name: String,
    pub event_field_info: Option<EventFieldInfo>,
}

/// One handler invocation to report to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchedEvent {
    pub descriptor: EventDescriptor,
    pub args: Value,
}

#[derive(Debug, Default)]
struct ElementHandlerInfos {
    handlers: HashMap<String, EventHandlerId>,
    prevent_default: HashMap<String, bool>,
    stop_propagation: HashMap<String, bool>,
}

impl ElementHandlerInfos {
    fn stops_propagation(&self, event_name: &str) -> bool {
        self.stop_propagation.get(event_name).copied().unwrap_or(false)
    }

    fn prevents_default(&self, event_name: &str) -> bool {
        self.prevent_default.get(event_name).copied().unwrap_or(false)
    }
}

/// Event delegation for one renderer.
///
/// Per-element tables are created lazily by the first registration or flag
/// on an element and survive handler removal; only [`purge_element`]
/// discards them.
///
/// [`purge_element`]: EventDelegator::purge_element
#[derive(Debug)]
pub struct EventDelegator {
    browser_renderer_id: BrowserRendererId,
    registry: EventTypeRegistry,
    store: HandlerInfoStore,
    elements: HashMap<NodeId, ElementHandlerInfos>,
}

impl EventDelegator {
    pub fn new(browser_renderer_id: BrowserRendererId) -> Self {
        Self::with_registry(browser_renderer_id, EventTypeRegistry::new())
    }

    pub fn with_registry(browser_renderer_id: BrowserRendererId, registry: EventTypeRegistry) -> Self {
        Self {
            browser_renderer_id,
            registry,
            store: HandlerInfoStore::new(),
            elements: HashMap::new(),
        }
    }

    pub fn browser_renderer_id(&self) -> BrowserRendererId {
        self.browser_renderer_id
    }

    pub fn registry(&self) -> &EventTypeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &HandlerInfoStore {
        &self.store
    }

    pub fn register_custom_event_type(
        &mut self,
        name: &str,
        options: EventTypeOptions,
    ) -> Result<(), EventError> {
        if let Some(browser) = self.registry.register(name, options)? {
            self.store.handle_alias_added(name, &browser);
        }
        Ok(())
    }

    /// Register `id` for `event_name` on `element`. An element already
    /// handling `event_name` keeps its registration under the new id.
    pub fn set_listener(
        &mut self,
        element: NodeId,
        event_name: &str,
        id: EventHandlerId,
        rendering_component_id: ComponentId,
    ) -> Result<(), EventError> {
        let infos = self.elements.entry(element).or_default();
        match infos.handlers.get(event_name).copied() {
            Some(existing) => {
                self.store.update(existing, id)?;
                infos.handlers.insert(event_name.to_string(), id);
            }
            None => {
                self.store.add(
                    HandlerInfo {
                        element,
                        event_name: event_name.to_string(),
                        event_handler_id: id,
                        rendering_component_id,
                    },
                    &self.registry,
                )?;
                infos.handlers.insert(event_name.to_string(), id);
            }
        }
        log::trace!(
            target: "events.delegator",
            "{element}: {event_name} -> handler {id} (component {rendering_component_id})"
        );
        Ok(())
    }

    pub fn remove_listener(&mut self, id: EventHandlerId) -> Option<HandlerInfo> {
        let info = self.store.remove(id, &self.registry)?;
        if let Some(infos) = self.elements.get_mut(&info.element) {
            infos.handlers.remove(&info.event_name);
        }
        Some(info)
    }

    pub fn handler(&self, element: NodeId, event_name: &str) -> Option<EventHandlerId> {
        self.elements.get(&element)?.handlers.get(event_name).copied()
    }

    pub fn set_stop_propagation(&mut self, element: NodeId, event_name: &str, value: bool) {
        self.elements
            .entry(element)
            .or_default()
            .stop_propagation
            .insert(event_name.to_string(), value);
    }

    pub fn set_prevent_default(&mut self, element: NodeId, event_name: &str, value: bool) {
        self.elements
            .entry(element)
            .or_default()
            .prevent_default
            .insert(event_name.to_string(), value);
    }

    pub fn stops_propagation(&self, element: NodeId, event_name: &str) -> bool {
        self.elements
            .get(&element)
            .is_some_and(|infos| infos.stops_propagation(event_name))
    }

    pub fn prevents_default(&self, element: NodeId, event_name: &str) -> bool {
        self.elements
            .get(&element)
            .is_some_and(|infos| infos.prevents_default(event_name))
    }

    pub fn tracks_element(&self, element: NodeId) -> bool {
        self.elements.contains_key(&element)
    }

    /// Forget everything about a removed element. Returns how many handler
    /// registrations were dropped.
    pub fn purge_element(&mut self, element: NodeId) -> usize {
        let Some(infos) = self.elements.remove(&element) else {
            return 0;
        };
        let mut dropped = 0;
        for id in infos.handlers.into_values() {
            if self.store.remove(id, &self.registry).is_some() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::trace!(target: "events.delegator", "{element}: purged {dropped} handlers");
        }
        dropped
    }

    /// Route a native event observed by a global listener.
    ///
    /// Events whose type has no attached listener, or whose target is not an
    /// element, produce nothing.
    pub fn on_global_event(&self, doc: &Document, event: &mut BrowserEvent) -> Vec<DispatchedEvent> {
        let mut dispatched = Vec::new();
        if !self.store.is_listening(&event.event_type) || !doc.is_element(event.target) {
            return dispatched;
        }
        let event_type = event.event_type.clone();
        self.dispatch_to_all_elements(&event_type, doc, event, &mut dispatched);
        for alias in self.registry.aliases_of(&event_type) {
            self.dispatch_to_all_elements(alias, doc, event, &mut dispatched);
        }
        dispatched
    }

    fn dispatch_to_all_elements(
        &self,
        event_name: &str,
        doc: &Document,
        event: &mut BrowserEvent,
        dispatched: &mut Vec<DispatchedEvent>,
    ) {
        let non_bubbling = is_non_bubbling(event_name);
        let mut args: Option<Value> = None;
        let mut stop_propagation = false;
        let mut candidate = Some(event.target);

        while let Some(element) = candidate {
            if let Some(infos) = self.elements.get(&element) {
                if let Some(&id) = infos.handlers.get(event_name) {
                    if !(is_disabled_control(doc, element)
                        && suppressed_when_disabled(&event.event_type))
                    {
                        match self.store.get(id) {
                            Some(info) => {
                                let args = args
                                    .get_or_insert_with(|| {
                                        self.registry.create_args(event_name, doc, event)
                                    })
                                    .clone();
                                if event.event_type == "submit" {
                                    event.prevent_default();
                                }
                                dispatched.push(DispatchedEvent {
                                    descriptor: EventDescriptor {
                                        browser_renderer_id: self.browser_renderer_id.0,
                                        event_handler_id: id.0,
                                        event_name: event_name.to_string(),
                                        event_field_info: EventFieldInfo::from_target(
                                            info.rendering_component_id,
                                            doc,
                                            event.target,
                                        ),
                                    },
                                    args,
                                });
                            }
                            None => log::warn!(
                                target: "events.delegator",
                                "{element}: dropping {event_name} for untracked handler {id}"
                            ),
                        }
                    }
                }
                if infos.stops_propagation(event_name) {
                    stop_propagation = true;
                }
                if infos.prevents_default(event_name) {
                    event.prevent_default();
                }
            }
            candidate = if non_bubbling || stop_propagation {
                None
            } else {
                doc.parent_element(element)
            };
        }
    }
}

/// Event name carried by an `on…` attribute, e.g. `onclick` -> `click`.
pub fn event_name_from_attribute(attribute: &str) -> Result<&str, EventError> {
    attribute
        .strip_prefix("on")
        .ok_or_else(|| EventError::NotAnEventAttribute(attribute.to_string()))
}

fn is_disabled_control(doc: &Document, element: NodeId) -> bool {
    let control = ["button", "input", "textarea", "select"]
        .iter()
        .any(|name| doc.is_tag(element, name));
    control && doc.has_attribute(element, "disabled")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixture {
        doc: Document,
        outer: NodeId,
        button: NodeId,
        delegator: EventDelegator,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::with_body();
        let body = doc.body().unwrap();
        let outer = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(body, outer).unwrap();
        doc.append_child(outer, button).unwrap();
        Fixture {
            doc,
            outer,
            button,
            delegator: EventDelegator::new(BrowserRendererId(1)),
        }
    }

    fn ids(dispatched: &[DispatchedEvent]) -> Vec<u64> {
        dispatched
            .iter()
            .map(|d| d.descriptor.event_handler_id)
            .collect()
    }

    #[test]
    fn event_attribute_names() {
        assert_eq!(event_name_from_attribute("onclick"), Ok("click"));
        assert_eq!(
            event_name_from_attribute("click"),
            Err(EventError::NotAnEventAttribute("click".to_string()))
        );
    }

    #[test]
    fn click_bubbles_to_ancestor_handlers() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.outer, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        f.delegator
            .set_listener(f.button, "click", EventHandlerId(2), ComponentId(5))
            .unwrap();
        let mut event = BrowserEvent::new("click", f.button);
        let dispatched = f.delegator.on_global_event(&f.doc, &mut event);
        assert_eq!(ids(&dispatched), vec![2, 1]);

        let descriptor = serde_json::to_value(&dispatched[0].descriptor).unwrap();
        assert_eq!(
            descriptor,
            json!({
                "browserRendererId": 1,
                "eventHandlerId": 2,
                "eventName": "click",
                "eventFieldInfo": null,
            })
        );
        assert_eq!(dispatched[0].args["button"], json!(0));
    }

    #[test]
    fn stop_propagation_flag_halts_the_walk() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.outer, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        f.delegator.set_stop_propagation(f.button, "click", true);
        let mut event = BrowserEvent::new("click", f.button);
        assert!(f.delegator.on_global_event(&f.doc, &mut event).is_empty());
    }

    #[test]
    fn prevent_default_flag_applies_without_handler() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.outer, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        f.delegator.set_prevent_default(f.button, "click", true);
        let mut event = BrowserEvent::new("click", f.button);
        let dispatched = f.delegator.on_global_event(&f.doc, &mut event);
        assert_eq!(ids(&dispatched), vec![1]);
        assert!(event.default_prevented());
    }

    #[test]
    fn non_bubbling_events_reach_only_the_target() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.outer, "focus", EventHandlerId(1), ComponentId(5))
            .unwrap();
        let mut event = BrowserEvent::new("focus", f.button);
        assert!(f.delegator.on_global_event(&f.doc, &mut event).is_empty());
        assert!(f.delegator.store().listener("focus").unwrap().capture);
    }

    #[test]
    fn disabled_controls_skip_mouse_events_only() {
        let mut f = fixture();
        f.doc.set_attribute(f.button, "disabled", "");
        f.delegator
            .set_listener(f.button, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        f.delegator
            .set_listener(f.button, "keydown", EventHandlerId(2), ComponentId(5))
            .unwrap();
        let mut click = BrowserEvent::new("click", f.button);
        assert!(f.delegator.on_global_event(&f.doc, &mut click).is_empty());
        let mut key = BrowserEvent::new("keydown", f.button);
        assert_eq!(ids(&f.delegator.on_global_event(&f.doc, &mut key)), vec![2]);
    }

    #[test]
    fn submit_default_is_always_prevented() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.outer, "submit", EventHandlerId(1), ComponentId(5))
            .unwrap();
        let mut event = BrowserEvent::new("submit", f.outer);
        assert_eq!(ids(&f.delegator.on_global_event(&f.doc, &mut event)), vec![1]);
        assert!(event.default_prevented());
    }

    #[test]
    fn reregistering_same_event_rekeys_handler() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.button, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        f.delegator
            .set_listener(f.button, "click", EventHandlerId(7), ComponentId(5))
            .unwrap();
        assert_eq!(f.delegator.handler(f.button, "click"), Some(EventHandlerId(7)));
        assert_eq!(f.delegator.store().len(), 1);
        assert_eq!(f.delegator.store().listener("click").unwrap().count, 1);
        assert!(f.delegator.remove_listener(EventHandlerId(1)).is_none());
        assert!(f.delegator.remove_listener(EventHandlerId(7)).is_some());
        assert!(!f.delegator.store().is_listening("click"));
        assert!(f.delegator.tracks_element(f.button));
    }

    #[test]
    fn purge_drops_registrations_and_flags() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.button, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        f.delegator
            .set_listener(f.button, "keyup", EventHandlerId(2), ComponentId(5))
            .unwrap();
        f.delegator.set_prevent_default(f.button, "click", true);
        assert_eq!(f.delegator.purge_element(f.button), 2);
        assert!(!f.delegator.tracks_element(f.button));
        assert!(f.delegator.store().is_empty());
        assert_eq!(f.delegator.store().listeners().count(), 0);
    }

    #[test]
    fn aliases_dispatch_after_the_native_name() {
        let mut f = fixture();
        f.delegator
            .register_custom_event_type(
                "longclick",
                EventTypeOptions::alias_of("click").with_args(|_, _| json!({ "held": true })),
            )
            .unwrap();
        f.delegator
            .set_listener(f.button, "longclick", EventHandlerId(3), ComponentId(5))
            .unwrap();
        f.delegator
            .set_listener(f.outer, "click", EventHandlerId(4), ComponentId(5))
            .unwrap();
        assert_eq!(f.delegator.store().listener("click").unwrap().count, 2);

        let mut event = BrowserEvent::new("click", f.button);
        let dispatched = f.delegator.on_global_event(&f.doc, &mut event);
        assert_eq!(ids(&dispatched), vec![4, 3]);
        assert_eq!(dispatched[1].descriptor.event_name, "longclick");
        assert_eq!(dispatched[1].args, json!({ "held": true }));
    }

    #[test]
    fn field_info_reports_input_value() {
        let mut f = fixture();
        let input = f.doc.create_element("input");
        f.doc.append_child(f.outer, input).unwrap();
        f.doc.set_value(input, "typed");
        f.delegator
            .set_listener(input, "change", EventHandlerId(9), ComponentId(2))
            .unwrap();
        let mut event = BrowserEvent::new("change", input);
        let dispatched = f.delegator.on_global_event(&f.doc, &mut event);
        assert_eq!(
            dispatched[0].descriptor.event_field_info,
            Some(EventFieldInfo {
                component_id: 2,
                field_value: json!("typed"),
            })
        );
        assert_eq!(dispatched[0].args, json!({ "value": "typed" }));
    }

    #[test]
    fn events_without_listener_or_element_target_are_ignored() {
        let mut f = fixture();
        f.delegator
            .set_listener(f.button, "click", EventHandlerId(1), ComponentId(5))
            .unwrap();
        let mut keyup = BrowserEvent::new("keyup", f.button);
        assert!(f.delegator.on_global_event(&f.doc, &mut keyup).is_empty());
        let text = f.doc.create_text("x");
        f.doc.append_child(f.button, text).unwrap();
        let mut click = BrowserEvent::new("click", text);
        assert!(f.delegator.on_global_event(&f.doc, &mut click).is_empty());
    }
}
