use crate::args::{
    DragEventArgs, ErrorEventArgs, KeyboardEventArgs, MouseEventArgs, PointerEventArgs,
    ProgressEventArgs, TouchEventArgs, WheelEventArgs,
};
use html::NodeId;

/// Event-specific data carried by a native event.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventPayload {
    #[default]
    None,
    Mouse(MouseEventArgs),
    Drag(DragEventArgs),
    Keyboard(KeyboardEventArgs),
    Pointer(PointerEventArgs),
    Wheel(WheelEventArgs),
    Touch(TouchEventArgs),
    Progress(ProgressEventArgs),
    Error(ErrorEventArgs),
}

/// A native event raised by the document, before delegation.
#[derive(Clone, Debug, PartialEq)]
pub struct BrowserEvent {
    pub event_type: String,
    pub target: NodeId,
    pub payload: EventPayload,
    default_prevented: bool,
}

impl BrowserEvent {
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            payload: EventPayload::None,
            default_prevented: false,
        }
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Mouse fields of any mouse-derived payload; zeroed otherwise.
    pub fn mouse(&self) -> MouseEventArgs {
        match &self.payload {
            EventPayload::Mouse(mouse) => mouse.clone(),
            EventPayload::Drag(drag) => drag.mouse.clone(),
            EventPayload::Pointer(pointer) => pointer.mouse.clone(),
            EventPayload::Wheel(wheel) => wheel.mouse.clone(),
            _ => MouseEventArgs::default(),
        }
    }
}
