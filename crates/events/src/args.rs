//! Serializable argument payloads for built-in event types.
//!
//! Field names serialize in camelCase, which is what the host deserializes.

use crate::native::{BrowserEvent, EventPayload};
use html::{Document, InputControlType, input_control_type};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseEventArgs {
    pub detail: i64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub client_x: f64,
    pub client_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub button: i64,
    pub buttons: i64,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTransferItemArgs {
    pub kind: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTransferArgs {
    pub drop_effect: String,
    pub effect_allowed: String,
    /// File names only; contents never cross the boundary.
    pub files: Vec<String>,
    pub items: Vec<DataTransferItemArgs>,
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEventArgs {
    #[serde(flatten)]
    pub mouse: MouseEventArgs,
    pub data_transfer: Option<DataTransferArgs>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardEventArgs {
    pub key: String,
    pub code: String,
    pub location: i64,
    pub repeat: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEventArgs {
    pub message: String,
    pub filename: String,
    pub lineno: i64,
    pub colno: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEventArgs {
    pub length_computable: bool,
    pub loaded: f64,
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    pub identifier: i64,
    pub client_x: f64,
    pub client_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchEventArgs {
    pub detail: i64,
    pub touches: Vec<TouchPoint>,
    pub target_touches: Vec<TouchPoint>,
    pub changed_touches: Vec<TouchPoint>,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    /// Filled from the native event type when dispatched.
    #[serde(rename = "type")]
    pub event_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEventArgs {
    #[serde(flatten)]
    pub mouse: MouseEventArgs,
    pub pointer_id: i64,
    pub width: f64,
    pub height: f64,
    pub pressure: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub pointer_type: String,
    pub is_primary: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelEventArgs {
    #[serde(flatten)]
    pub mouse: MouseEventArgs,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub delta_mode: i64,
}

/// `value` is a string, a boolean (checkboxes) or a list (multi-selects).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEventArgs {
    pub value: Value,
}

fn to_value<T: Serialize>(args: &T) -> Value {
    serde_json::to_value(args).unwrap_or_else(|_| json!({}))
}

pub(crate) fn empty_args(_: &Document, _: &BrowserEvent) -> Value {
    json!({})
}

pub(crate) fn change_args(doc: &Document, event: &BrowserEvent) -> Value {
    let target = event.target;
    let value = match input_control_type(doc, target) {
        Some(kind) if kind.is_date_like() => Value::String(normalize_date_value(kind, doc.value(target))),
        _ if doc.is_multiple_select(target) => Value::Array(
            doc.selected_values(target)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        Some(InputControlType::Checkbox) => Value::Bool(doc.checked(target)),
        _ => Value::String(doc.value(target)),
    };
    to_value(&ChangeEventArgs { value })
}

/// Browsers omit seconds from `HH:MM` time values; the host expects them.
fn normalize_date_value(kind: InputControlType, value: String) -> String {
    if kind == InputControlType::Time && value.len() == 5 {
        format!("{value}:00")
    } else {
        value
    }
}

pub(crate) fn mouse_args(_: &Document, event: &BrowserEvent) -> Value {
    to_value(&event.mouse())
}

pub(crate) fn drag_args(_: &Document, event: &BrowserEvent) -> Value {
    let args = match &event.payload {
        EventPayload::Drag(drag) => drag.clone(),
        _ => DragEventArgs {
            mouse: event.mouse(),
            data_transfer: None,
        },
    };
    to_value(&args)
}

pub(crate) fn keyboard_args(_: &Document, event: &BrowserEvent) -> Value {
    match &event.payload {
        EventPayload::Keyboard(keyboard) => to_value(keyboard),
        _ => to_value(&KeyboardEventArgs::default()),
    }
}

pub(crate) fn error_args(_: &Document, event: &BrowserEvent) -> Value {
    match &event.payload {
        EventPayload::Error(error) => to_value(error),
        _ => to_value(&ErrorEventArgs::default()),
    }
}

pub(crate) fn progress_args(_: &Document, event: &BrowserEvent) -> Value {
    match &event.payload {
        EventPayload::Progress(progress) => to_value(progress),
        _ => to_value(&ProgressEventArgs::default()),
    }
}

pub(crate) fn touch_args(_: &Document, event: &BrowserEvent) -> Value {
    let mut args = match &event.payload {
        EventPayload::Touch(touch) => touch.clone(),
        _ => TouchEventArgs::default(),
    };
    args.event_type = event.event_type.clone();
    to_value(&args)
}

pub(crate) fn pointer_args(_: &Document, event: &BrowserEvent) -> Value {
    let args = match &event.payload {
        EventPayload::Pointer(pointer) => pointer.clone(),
        _ => PointerEventArgs {
            mouse: event.mouse(),
            ..PointerEventArgs::default()
        },
    };
    to_value(&args)
}

pub(crate) fn wheel_args(_: &Document, event: &BrowserEvent) -> Value {
    let args = match &event.payload {
        EventPayload::Wheel(wheel) => wheel.clone(),
        _ => WheelEventArgs {
            mouse: event.mouse(),
            ..WheelEventArgs::default()
        },
    };
    to_value(&args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(doc: &mut Document, ty: &str, value: &str) -> html::NodeId {
        let body = doc.body().unwrap();
        let input = doc.create_element("input");
        doc.set_attribute(input, "type", ty);
        doc.append_child(body, input).unwrap();
        doc.set_value(input, value);
        input
    }

    #[test]
    fn mouse_args_use_camel_case() {
        let doc = Document::new();
        let event = BrowserEvent::new("click", doc.root()).with_payload(EventPayload::Mouse(
            MouseEventArgs {
                client_x: 3.0,
                ctrl_key: true,
                ..MouseEventArgs::default()
            },
        ));
        let args = mouse_args(&doc, &event);
        assert_eq!(args["clientX"], json!(3.0));
        assert_eq!(args["ctrlKey"], json!(true));
        assert_eq!(args["detail"], json!(0));
    }

    #[test]
    fn time_values_gain_seconds() {
        let mut doc = Document::with_body();
        let time = input(&mut doc, "time", "10:30");
        let event = BrowserEvent::new("change", time);
        assert_eq!(change_args(&doc, &event), json!({ "value": "10:30:00" }));

        let date = input(&mut doc, "date", "2024-01-02");
        let event = BrowserEvent::new("input", date);
        assert_eq!(change_args(&doc, &event), json!({ "value": "2024-01-02" }));
    }

    #[test]
    fn checkbox_change_is_boolean() {
        let mut doc = Document::with_body();
        let checkbox = input(&mut doc, "checkbox", "on");
        doc.set_checked(checkbox, true);
        let event = BrowserEvent::new("change", checkbox);
        assert_eq!(change_args(&doc, &event), json!({ "value": true }));
    }

    #[test]
    fn multi_select_change_lists_selected_values() {
        let mut doc = Document::with_body();
        let body = doc.body().unwrap();
        let select = doc.create_element("select");
        doc.set_attribute(select, "multiple", "");
        doc.append_child(body, select).unwrap();
        for value in ["a", "b", "c"] {
            let option = doc.create_element("option");
            doc.set_attribute(option, "value", value);
            doc.append_child(select, option).unwrap();
            doc.set_selected(option, value != "b");
        }
        let event = BrowserEvent::new("change", select);
        assert_eq!(change_args(&doc, &event), json!({ "value": ["a", "c"] }));
    }

    #[test]
    fn drag_args_flatten_mouse_fields() {
        let doc = Document::new();
        let event = BrowserEvent::new("drop", doc.root()).with_payload(EventPayload::Drag(
            DragEventArgs {
                mouse: MouseEventArgs {
                    button: 1,
                    ..MouseEventArgs::default()
                },
                data_transfer: Some(DataTransferArgs {
                    files: vec!["a.txt".to_string()],
                    items: vec![DataTransferItemArgs {
                        kind: "file".to_string(),
                        item_type: "text/plain".to_string(),
                    }],
                    ..DataTransferArgs::default()
                }),
            },
        ));
        let args = drag_args(&doc, &event);
        assert_eq!(args["button"], json!(1));
        assert_eq!(args["dataTransfer"]["files"], json!(["a.txt"]));
        assert_eq!(args["dataTransfer"]["items"][0]["type"], json!("text/plain"));
    }

    #[test]
    fn touch_args_report_event_type() {
        let doc = Document::new();
        let event = BrowserEvent::new("touchstart", doc.root());
        let args = touch_args(&doc, &event);
        assert_eq!(args["type"], json!("touchstart"));
        assert_eq!(args["changedTouches"], json!([]));
    }
}
