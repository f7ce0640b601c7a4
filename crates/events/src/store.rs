use crate::error::EventError;
use crate::registry::{EventTypeRegistry, is_non_bubbling};
use core_types::{ComponentId, EventHandlerId};
use html::NodeId;
use std::collections::{BTreeMap, HashMap};

/// One delegated handler registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerInfo {
    pub element: NodeId,
    pub event_name: String,
    pub event_handler_id: EventHandlerId,
    pub rendering_component_id: ComponentId,
}

/// A listener attached once at the document root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalListener {
    /// Registrations currently relying on this listener.
    pub count: usize,
    /// Non-bubbling events are observed in the capture phase.
    pub capture: bool,
}

/// Registrations by handler id, plus reference-counted global listeners
/// keyed by browser event name.
#[derive(Debug, Default)]
pub struct HandlerInfoStore {
    infos: HashMap<EventHandlerId, HandlerInfo>,
    listeners: BTreeMap<String, GlobalListener>,
}

impl HandlerInfoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, info: HandlerInfo, registry: &EventTypeRegistry) -> Result<(), EventError> {
        if self.infos.contains_key(&info.event_handler_id) {
            return Err(EventError::DuplicateRegistration(info.event_handler_id));
        }
        self.add_global_listener(registry.browser_event_name(&info.event_name));
        self.infos.insert(info.event_handler_id, info);
        Ok(())
    }

    pub fn get(&self, id: EventHandlerId) -> Option<&HandlerInfo> {
        self.infos.get(&id)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Re-key an existing registration. Listener counts are unchanged.
    pub fn update(
        &mut self,
        old_id: EventHandlerId,
        new_id: EventHandlerId,
    ) -> Result<(), EventError> {
        if self.infos.contains_key(&new_id) {
            return Err(EventError::DuplicateRegistration(new_id));
        }
        if let Some(mut info) = self.infos.remove(&old_id) {
            info.event_handler_id = new_id;
            self.infos.insert(new_id, info);
        }
        Ok(())
    }

    /// Drop a registration, detaching its global listener when it was the
    /// last user. Unknown ids are ignored.
    pub fn remove(
        &mut self,
        id: EventHandlerId,
        registry: &EventTypeRegistry,
    ) -> Option<HandlerInfo> {
        let info = self.infos.remove(&id)?;
        let browser = registry.browser_event_name(&info.event_name).to_string();
        if let Some(listener) = self.listeners.get_mut(&browser) {
            listener.count = listener.count.saturating_sub(1);
            if listener.count == 0 {
                self.listeners.remove(&browser);
                log::debug!(target: "events.delegator", "detached global listener for {browser}");
            }
        }
        Some(info)
    }

    pub(crate) fn add_global_listener(&mut self, browser_event_name: &str) {
        match self.listeners.get_mut(browser_event_name) {
            Some(listener) => listener.count += 1,
            None => {
                let capture = is_non_bubbling(browser_event_name);
                log::debug!(
                    target: "events.delegator",
                    "attached global listener for {browser_event_name} (capture: {capture})"
                );
                self.listeners
                    .insert(browser_event_name.to_string(), GlobalListener { count: 1, capture });
            }
        }
    }

    /// A custom event name became an alias of `browser_event_name`: any
    /// listener counted under the custom name moves to the browser event.
    pub(crate) fn handle_alias_added(&mut self, alias: &str, browser_event_name: &str) {
        let Some(previous) = self.listeners.remove(alias) else {
            return;
        };
        log::debug!(
            target: "events.delegator",
            "moving {} registrations from {alias} to {browser_event_name}",
            previous.count
        );
        self.add_global_listener(browser_event_name);
        if let Some(listener) = self.listeners.get_mut(browser_event_name) {
            listener.count += previous.count - 1;
        }
    }

    pub fn listener(&self, browser_event_name: &str) -> Option<GlobalListener> {
        self.listeners.get(browser_event_name).copied()
    }

    pub fn is_listening(&self, browser_event_name: &str) -> bool {
        self.listeners.contains_key(browser_event_name)
    }

    /// Attached listeners in name order.
    pub fn listeners(&self) -> impl Iterator<Item = (&str, GlobalListener)> {
        self.listeners
            .iter()
            .map(|(name, listener)| (name.as_str(), *listener))
    }
}
