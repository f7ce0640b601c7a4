//! Attribute writes that go through DOM properties instead of content
//! attributes: form-control values, `checked`, and the `__internal_` event
//! flags.

use crate::browser_renderer::{BrowserRenderer, read_required};
use crate::error::{Malformed, RenderError};
use batch::{RenderBatch, StringIndex};
use core_types::{ComponentId, EventHandlerId};
use events::event_name_from_attribute;
use html::{Document, InputControlType, NodeId, input_control_type};

const INTERNAL_ATTRIBUTE_PREFIX: &str = "__internal_";
const STOP_PROPAGATION_PREFIX: &str = "stopPropagation_";
const PREVENT_DEFAULT_PREFIX: &str = "preventDefault_";
const CAPTURE_ATTRIBUTE_PREFIX: &str = "_bl_";

/// A `value` written to a form control, kept so options inserted later can
/// still be matched against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DeferredValue {
    Single(Option<String>),
    Multiple(Vec<String>),
}

impl DeferredValue {
    /// Multiple selects take a JSON array of option values.
    fn for_element(doc: &Document, element: NodeId, value: Option<&str>) -> Result<Self, RenderError> {
        if !doc.is_multiple_select(element) {
            return Ok(DeferredValue::Single(value.map(str::to_string)));
        }
        match value.filter(|v| !v.is_empty()) {
            Some(json) => serde_json::from_str::<Vec<String>>(json)
                .map(DeferredValue::Multiple)
                .map_err(|_| Malformed::MultipleSelectValue(json.to_string()).into()),
            None => Ok(DeferredValue::Multiple(Vec::new())),
        }
    }
}

pub(crate) fn apply_deferred_value(doc: &mut Document, element: NodeId, value: &DeferredValue) {
    match value {
        DeferredValue::Multiple(values) => {
            for option in doc.select_options(element) {
                let selected = values.contains(&doc.value(option));
                doc.set_selected(option, selected);
            }
        }
        DeferredValue::Single(value) => doc.set_value(element, value.as_deref().unwrap_or_default()),
    }
}

pub(crate) fn capture_attribute_name(capture_id: &str) -> String {
    format!("{CAPTURE_ATTRIBUTE_PREFIX}{capture_id}")
}

/// At most the first `count` characters of `s`.
fn truncate_chars(s: &str, count: usize) -> &str {
    s.char_indices().nth(count).map_or(s, |(end, _)| &s[..end])
}

impl BrowserRenderer {
    /// Apply one attribute frame to `element`. Frames carrying a handler id
    /// register an event listener instead of writing anything to the DOM.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn apply_attribute(
        &mut self,
        doc: &mut Document,
        batch: &RenderBatch<'_>,
        component: ComponentId,
        element: NodeId,
        name: StringIndex,
        value: StringIndex,
        event_handler_id: EventHandlerId,
    ) -> Result<(), RenderError> {
        let name = read_required(batch, name, "attribute name")?;
        if !event_handler_id.is_none() {
            let event_name = event_name_from_attribute(&name)?;
            self.delegator
                .set_listener(element, event_name, event_handler_id, component)?;
            return Ok(());
        }
        let value = batch.read_string(value)?;
        if !self.try_apply_special_property(doc, element, &name, value.as_deref())? {
            doc.set_attribute(element, &name, value.as_deref().unwrap_or_default());
        }
        Ok(())
    }

    /// Handle attributes backed by a property. `value` is `None` when the
    /// attribute is being removed. Returns false when `name` is an ordinary
    /// attribute.
    pub(crate) fn try_apply_special_property(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<bool, RenderError> {
        match name {
            "value" => self.try_apply_value_property(doc, element, value),
            "checked" => Ok(try_apply_checked_property(doc, element, value)),
            _ => match name.strip_prefix(INTERNAL_ATTRIBUTE_PREFIX) {
                Some(internal) => {
                    self.apply_internal_attribute(element, internal, value.is_some())?;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    fn apply_internal_attribute(
        &mut self,
        element: NodeId,
        internal: &str,
        enabled: bool,
    ) -> Result<(), RenderError> {
        if let Some(attribute) = internal.strip_prefix(STOP_PROPAGATION_PREFIX) {
            let event_name = event_name_from_attribute(attribute)?;
            self.delegator.set_stop_propagation(element, event_name, enabled);
        } else if let Some(attribute) = internal.strip_prefix(PREVENT_DEFAULT_PREFIX) {
            let event_name = event_name_from_attribute(attribute)?;
            self.delegator.set_prevent_default(element, event_name, enabled);
        } else {
            return Err(Malformed::UnsupportedInternalAttribute(internal.to_string()).into());
        }
        Ok(())
    }

    fn try_apply_value_property(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        value: Option<&str>,
    ) -> Result<bool, RenderError> {
        // Time inputs without a step only accept hh:mm.
        if input_control_type(doc, element) == Some(InputControlType::Time)
            && !doc.has_attribute(element, "step")
            && let Some(value) = value.filter(|v| !v.is_empty())
        {
            doc.set_value(element, truncate_chars(value, 5));
            return Ok(true);
        }

        if ["input", "select", "textarea"]
            .iter()
            .any(|tag| doc.is_tag(element, tag))
        {
            let deferred = DeferredValue::for_element(doc, element, value)?;
            apply_deferred_value(doc, element, &deferred);
            self.deferred_values.insert(element, deferred);
            return Ok(true);
        }

        if doc.is_tag(element, "option") {
            match value {
                Some(value) => doc.set_attribute(element, "value", value),
                None => doc.remove_attribute(element, "value"),
            };
            self.try_set_select_value_from_option(doc, element);
            return Ok(true);
        }
        Ok(false)
    }

    /// Reconcile a newly valued or inserted `<option>` with its select's
    /// deferred value. Returns false when there is nothing to reconcile.
    pub(crate) fn try_set_select_value_from_option(&mut self, doc: &mut Document, option: NodeId) -> bool {
        let Some(select) = doc.closest(option, "select") else {
            return false;
        };
        let Some(deferred) = self.deferred_values.get(&select) else {
            return false;
        };
        let option_value = doc.value(option);
        match deferred {
            DeferredValue::Multiple(values) => {
                doc.set_selected(option, values.contains(&option_value));
            }
            DeferredValue::Single(value) => {
                if value.as_deref() == Some(option_value.as_str()) {
                    doc.set_value(select, &option_value);
                    self.deferred_values.remove(&select);
                }
            }
        }
        true
    }
}

fn try_apply_checked_property(doc: &mut Document, element: NodeId, value: Option<&str>) -> bool {
    if !doc.is_tag(element, "input") {
        return false;
    }
    doc.set_checked(element, value.is_some());
    true
}
