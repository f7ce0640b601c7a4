//! Form-control IDL state: `value`, `checked`, `selected`.
//!
//! Content attributes only seed these properties; once written, the live
//! state wins, matching how browsers separate the two.

use crate::document::Document;
use crate::types::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputControlType {
    Text,
    Checkbox,
    Radio,
    Date,
    DateTimeLocal,
    Month,
    Time,
    Week,
    Other,
}

impl InputControlType {
    /// Date and time inputs whose value strings are normalized on the way out.
    pub fn is_date_like(self) -> bool {
        matches!(
            self,
            InputControlType::Date
                | InputControlType::DateTimeLocal
                | InputControlType::Month
                | InputControlType::Time
                | InputControlType::Week
        )
    }
}

/// Classify an `<input>` by its `type` attribute. Non-inputs are `None`.
pub fn input_control_type(doc: &Document, id: NodeId) -> Option<InputControlType> {
    if !doc.is_tag(id, "input") {
        return None;
    }
    let ty = doc
        .attribute(id, "type")
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let kind = match ty {
        None => InputControlType::Text, // missing type defaults to text
        Some(t) if t.eq_ignore_ascii_case("text") => InputControlType::Text,
        Some(t) if t.eq_ignore_ascii_case("checkbox") => InputControlType::Checkbox,
        Some(t) if t.eq_ignore_ascii_case("radio") => InputControlType::Radio,
        Some(t) if t.eq_ignore_ascii_case("date") => InputControlType::Date,
        Some(t) if t.eq_ignore_ascii_case("datetime-local") => InputControlType::DateTimeLocal,
        Some(t) if t.eq_ignore_ascii_case("month") => InputControlType::Month,
        Some(t) if t.eq_ignore_ascii_case("time") => InputControlType::Time,
        Some(t) if t.eq_ignore_ascii_case("week") => InputControlType::Week,
        _ => InputControlType::Other,
    };
    Some(kind)
}

impl Document {
    pub fn is_form_control(&self, id: NodeId) -> bool {
        ["button", "input", "select", "textarea"]
            .iter()
            .any(|tag| self.is_tag(id, tag))
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.is_form_control(id) && self.has_attribute(id, "disabled")
    }

    pub fn is_multiple_select(&self, id: NodeId) -> bool {
        self.is_tag(id, "select") && self.has_attribute(id, "multiple")
    }

    /// All `<option>` descendants of a `<select>`, in tree order.
    pub fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.subtree(select)
            .into_iter()
            .skip(1)
            .filter(|&id| self.is_tag(id, "option"))
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.attribute(option, "value") {
            Some(v) => v.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    /// The `value` property of an input, textarea, select or option.
    pub fn value(&self, id: NodeId) -> String {
        let Some(element) = self.element(id) else {
            return String::new();
        };
        if element.is("select") {
            return self
                .displayed_option(id)
                .map(|o| self.option_value(o))
                .unwrap_or_default();
        }
        if element.is("option") {
            return self.option_value(id);
        }
        if let Some(value) = &element.form.value {
            return value.clone();
        }
        if element.is("textarea") {
            return self.text_content(id);
        }
        element.attribute("value").unwrap_or_default().to_string()
    }

    /// Write the `value` property.
    ///
    /// For a single `<select>` this selects the first option whose value
    /// matches and clears the rest; with no match nothing is selected.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if self.is_tag(id, "select") {
            let mut matched = false;
            for option in self.select_options(id) {
                let hit = !matched && self.option_value(option) == value;
                matched |= hit;
                self.set_selected(option, hit);
            }
            return;
        }
        if self.is_tag(id, "option") {
            self.set_attribute(id, "value", value);
            return;
        }
        if let Some(element) = self.element_mut(id) {
            element.form.value = Some(value.to_string());
        }
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| e.form.checked)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(element) = self.element_mut(id) {
            element.form.checked = checked;
        }
    }

    pub fn selected(&self, option: NodeId) -> bool {
        self.element(option).is_some_and(|e| e.form.selected)
    }

    pub fn set_selected(&mut self, option: NodeId, selected: bool) {
        if let Some(element) = self.element_mut(option) {
            element.form.selected = selected;
        }
    }

    /// Values of every selected option, in tree order.
    pub fn selected_values(&self, select: NodeId) -> Vec<String> {
        self.select_options(select)
            .into_iter()
            .filter(|&o| self.selected(o))
            .map(|o| self.option_value(o))
            .collect()
    }

    /// The option a single-select reports as its value: the first selected
    /// one, otherwise the first option (a drop-down always shows one).
    fn displayed_option(&self, select: NodeId) -> Option<NodeId> {
        let options = self.select_options(select);
        if let Some(&first_selected) = options.iter().find(|&&o| self.selected(o)) {
            return Some(first_selected);
        }
        if self.is_multiple_select(select) {
            return None;
        }
        options.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_with_options(doc: &mut Document, values: &[&str]) -> (NodeId, Vec<NodeId>) {
        let select = doc.create_element("select");
        let options = values
            .iter()
            .map(|v| {
                let option = doc.create_element("option");
                doc.set_attribute(option, "value", v);
                doc.append_child(select, option).unwrap();
                option
            })
            .collect();
        (select, options)
    }

    #[test]
    fn input_value_prefers_live_state_over_attribute() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        doc.set_attribute(input, "value", "seed");
        assert_eq!(doc.value(input), "seed");

        doc.set_value(input, "typed");
        assert_eq!(doc.value(input), "typed");
        assert_eq!(doc.attribute(input, "value"), Some("seed"));
    }

    #[test]
    fn single_select_defaults_to_first_option() {
        let mut doc = Document::new();
        let (select, options) = select_with_options(&mut doc, &["a", "b"]);
        assert_eq!(doc.value(select), "a");

        doc.set_value(select, "b");
        assert_eq!(doc.value(select), "b");
        assert!(doc.selected(options[1]));
        assert!(!doc.selected(options[0]));
    }

    #[test]
    fn multiple_select_reports_selected_values() {
        let mut doc = Document::new();
        let (select, options) = select_with_options(&mut doc, &["a", "b", "c"]);
        doc.set_attribute(select, "multiple", "");
        assert_eq!(doc.value(select), "");

        doc.set_selected(options[0], true);
        doc.set_selected(options[2], true);
        assert_eq!(doc.selected_values(select), vec!["a", "c"]);
    }

    #[test]
    fn option_value_falls_back_to_text() {
        let mut doc = Document::new();
        let option = doc.create_element("option");
        let text = doc.create_text("  Label ");
        doc.append_child(option, text).unwrap();
        assert_eq!(doc.value(option), "Label");
    }

    #[test]
    fn classifies_input_types() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        assert_eq!(input_control_type(&doc, input), Some(InputControlType::Text));
        doc.set_attribute(input, "type", "TIME");
        assert_eq!(input_control_type(&doc, input), Some(InputControlType::Time));
        assert!(InputControlType::Time.is_date_like());

        let div = doc.create_element("div");
        assert_eq!(input_control_type(&doc, div), None);
    }

    #[test]
    fn disabled_only_applies_to_form_controls() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        let div = doc.create_element("div");
        doc.set_attribute(button, "disabled", "");
        doc.set_attribute(div, "disabled", "");
        assert!(doc.is_disabled(button));
        assert!(!doc.is_disabled(div));
    }
}
