use std::fmt;

/// Host-assigned component identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

/// Host-assigned, monotonically increasing event handler identity.
///
/// Values always fit in 53 bits; the batch reader rejects anything larger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHandlerId(pub u64);

impl EventHandlerId {
    /// Attribute frames use zero to mean "no handler attached".
    pub const NONE: EventHandlerId = EventHandlerId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BrowserRendererId(pub u32);

/// Correlates a render batch with its completion acknowledgment.
pub type BatchId = u64;

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EventHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BrowserRendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
