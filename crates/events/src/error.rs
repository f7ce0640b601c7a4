use core_types::EventHandlerId;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventError {
    /// The handler id is already tracked by the store.
    DuplicateRegistration(EventHandlerId),
    /// A custom event type with this name (or a built-in of the same name) exists.
    AlreadyRegistered(String),
    /// An event modifier attribute did not name an `on…` event.
    NotAnEventAttribute(String),
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::DuplicateRegistration(id) => write!(f, "event {id} is already tracked"),
            EventError::AlreadyRegistered(name) => {
                write!(f, "the event '{name}' is already registered")
            }
            EventError::NotAnEventAttribute(name) => write!(
                f,
                "attribute has nonzero event handler id but name does not start with 'on': {name}"
            ),
        }
    }
}

impl std::error::Error for EventError {}
