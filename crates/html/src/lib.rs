//! Document model for the render-batch client.
//!
//! An arena-backed DOM with explicit parent/child links, form-control state,
//! a small markup fragment parser and a minimal selector engine. This crate
//! knows nothing about logical trees or render batches.

mod document;
mod entities;
mod form_controls;
mod fragment;
mod selector;
pub mod serialize;
pub mod snapshot;
mod tokenizer;
mod types;

pub use crate::document::{Document, DomError};
pub use crate::form_controls::{InputControlType, input_control_type};
pub use crate::fragment::parse_fragment;
pub use crate::selector::SelectorError;
pub use crate::tokenizer::{MarkupToken, tokenize_markup};
pub use crate::types::{
    ElementData, HTML_NAMESPACE, Namespace, NodeData, NodeId, SVG_NAMESPACE,
};
