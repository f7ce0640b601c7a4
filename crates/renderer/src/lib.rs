//! # renderer
//!
//! Interprets render batches against a [`html::Document`].
//!
//! - [`LogicalTree`] tracks the component-shaped tree layered over the DOM,
//!   where comment nodes stand in for containers that have no element.
//! - [`BrowserRenderer`] walks each component's edit stream and mutates the
//!   logical tree, the document and the event delegator.
//! - [`WebRenderer`] is the boundary used by the transport: attach roots,
//!   apply batches, dispose, and forward delegated events.

mod attributes;
mod browser_renderer;
mod config;
mod error;
mod logical;
mod web_renderer;

pub use browser_renderer::BrowserRenderer;
pub use config::{ConfigError, RendererConfig};
pub use error::{Malformed, Missing, RenderError, Unsupported};
pub use logical::{LogicalTree, PermutationEntry};
pub use web_renderer::WebRenderer;
