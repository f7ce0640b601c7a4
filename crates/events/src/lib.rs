//! # events
//!
//! Event delegation for documents managed by the renderer.
//!
//! Handlers are never attached to individual elements. Instead:
//! - [`HandlerInfoStore`] tracks every registered handler id and keeps one
//!   reference-counted global listener per distinct browser event name.
//! - [`EventDelegator`] keeps per-element handler tables and override flags,
//!   and turns a native [`BrowserEvent`] into zero or more
//!   [`DispatchedEvent`]s by walking from the target towards the root.
//! - [`EventTypeRegistry`] maps event names to their argument factories and
//!   to the browser event they alias.

mod args;
mod delegator;
mod error;
mod native;
mod registry;
mod store;

pub use args::{
    ChangeEventArgs, DataTransferArgs, DataTransferItemArgs, DragEventArgs, ErrorEventArgs,
    KeyboardEventArgs, MouseEventArgs, PointerEventArgs, ProgressEventArgs, TouchEventArgs,
    TouchPoint, WheelEventArgs,
};
pub use delegator::{
    DispatchedEvent, EventDelegator, EventDescriptor, EventFieldInfo, event_name_from_attribute,
};
pub use error::EventError;
pub use native::{BrowserEvent, EventPayload};
pub use registry::{
    EventArgsFactory, EventTypeOptions, EventTypeRegistry, is_non_bubbling,
    suppressed_when_disabled,
};
pub use store::{GlobalListener, HandlerInfo, HandlerInfoStore};
