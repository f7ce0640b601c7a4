use batch::{BatchError, FrameType};
use core_types::ComponentId;
use events::EventError;
use html::{DomError, NodeId, SelectorError};
use std::fmt;

/// Failures while applying a batch or attaching a root.
///
/// Application stops at the first error; mutations already made stay in
/// place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    MalformedBatch(Malformed),
    MissingTarget(Missing),
    DuplicateRegistration(EventError),
    UnsupportedOperation(Unsupported),
}

/// The batch cannot be decoded, or an edit contradicts the node it targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Malformed {
    Decode(BatchError),
    AttributeFrameOutsideElement,
    ReferenceCaptureOutsideElement,
    NotAnElement { node: NodeId, operation: &'static str },
    NotText(NodeId),
    UnexpectedFrame { operation: &'static str, found: FrameType },
    NullString { field: &'static str },
    NotAnEventAttribute(String),
    UnsupportedInternalAttribute(String),
    MultipleSelectValue(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    Component(ComponentId),
    Selector(String),
    LogicalChild { parent: NodeId, index: usize },
    LogicalParent(NodeId),
    DomParent(NodeId),
    RangeEnd(NodeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unsupported {
    InsertNonEmptyContainer(NodeId),
    MoveTrackedNode(NodeId),
    ExistingContents(NodeId),
    AppendUnder(NodeId),
    InvalidSelector(SelectorError),
    Dom(DomError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MalformedBatch(m) => write!(f, "malformed batch: {m}"),
            RenderError::MissingTarget(m) => write!(f, "missing target: {m}"),
            RenderError::DuplicateRegistration(e) => write!(f, "duplicate registration: {e}"),
            RenderError::UnsupportedOperation(u) => write!(f, "unsupported operation: {u}"),
        }
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::Decode(e) => write!(f, "{e}"),
            Malformed::AttributeFrameOutsideElement => f.write_str(
                "attribute frames should only be present as leading children of element frames",
            ),
            Malformed::ReferenceCaptureOutsideElement => {
                f.write_str("reference capture frames can only be children of element frames")
            }
            Malformed::NotAnElement { node, operation } => {
                write!(f, "cannot {operation} on non-element child {node}")
            }
            Malformed::NotText(node) => write!(f, "cannot set text content on non-text child {node}"),
            Malformed::UnexpectedFrame { operation, found } => {
                write!(f, "{operation} cannot use a {found:?} frame")
            }
            Malformed::NullString { field } => write!(f, "{field} must not be null"),
            Malformed::NotAnEventAttribute(name) => write!(
                f,
                "attribute should be an event name, but doesn't start with 'on': '{name}'"
            ),
            Malformed::UnsupportedInternalAttribute(name) => {
                write!(f, "unsupported internal attribute '{name}'")
            }
            Malformed::MultipleSelectValue(value) => {
                write!(f, "multiple-select value is not a JSON string array: {value}")
            }
        }
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Component(id) => {
                write!(f, "no element is currently associated with component {id}")
            }
            Missing::Selector(selector) => {
                write!(f, "could not find any element matching selector '{selector}'")
            }
            Missing::LogicalChild { parent, index } => {
                write!(f, "{parent} has no logical child at index {index}")
            }
            Missing::LogicalParent(node) => write!(f, "{node} has no logical parent"),
            Missing::DomParent(node) => write!(f, "{node} is not attached to a parent"),
            Missing::RangeEnd(node) => write!(f, "range end {node} is not a sibling of its start"),
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::InsertNonEmptyContainer(node) => {
                write!(f, "inserting non-empty logical container {node}")
            }
            Unsupported::MoveTrackedNode(node) => {
                write!(f, "moving existing logical child {node}")
            }
            Unsupported::ExistingContents(node) => write!(
                f,
                "new logical element {node} must start empty unless existing contents are allowed"
            ),
            Unsupported::AppendUnder(node) => {
                write!(f, "cannot append under {node}: not a valid logical element")
            }
            Unsupported::InvalidSelector(e) => write!(f, "{e}"),
            Unsupported::Dom(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<BatchError> for RenderError {
    fn from(err: BatchError) -> Self {
        RenderError::MalformedBatch(Malformed::Decode(err))
    }
}

impl From<EventError> for RenderError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotAnEventAttribute(name) => {
                RenderError::MalformedBatch(Malformed::NotAnEventAttribute(name))
            }
            other => RenderError::DuplicateRegistration(other),
        }
    }
}

impl From<DomError> for RenderError {
    fn from(err: DomError) -> Self {
        RenderError::UnsupportedOperation(Unsupported::Dom(err))
    }
}

impl From<SelectorError> for RenderError {
    fn from(err: SelectorError) -> Self {
        RenderError::UnsupportedOperation(Unsupported::InvalidSelector(err))
    }
}

impl From<Malformed> for RenderError {
    fn from(err: Malformed) -> Self {
        RenderError::MalformedBatch(err)
    }
}

impl From<Missing> for RenderError {
    fn from(err: Missing) -> Self {
        RenderError::MissingTarget(err)
    }
}

impl From<Unsupported> for RenderError {
    fn from(err: Unsupported) -> Self {
        RenderError::UnsupportedOperation(err)
    }
}
