//! Fixed-width edit and frame records.

use crate::error::BatchError;
use core_types::{ComponentId, EventHandlerId};
use tools::le;

pub const EDIT_SIZE: usize = 16;
pub const FRAME_SIZE: usize = 20;
pub const TRAILER_SIZE: usize = 20;

/// Largest high word of a 64-bit id that keeps the value within 2^53-1.
pub const MAX_SAFE_HIGH_WORD: u32 = (1 << 21) - 1;

/// Index into the batch string table; `-1` means absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StringIndex(pub i32);

impl StringIndex {
    pub const NULL: StringIndex = StringIndex(-1);

    pub fn is_null(self) -> bool {
        self.0 == -1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum EditType {
    PrependFrame = 1,
    RemoveFrame = 2,
    SetAttribute = 3,
    RemoveAttribute = 4,
    UpdateText = 5,
    StepIn = 6,
    StepOut = 7,
    UpdateMarkup = 8,
    PermutationListEntry = 9,
    PermutationListEnd = 10,
}

impl EditType {
    pub fn from_code(code: u32) -> Result<Self, BatchError> {
        Ok(match code {
            1 => EditType::PrependFrame,
            2 => EditType::RemoveFrame,
            3 => EditType::SetAttribute,
            4 => EditType::RemoveAttribute,
            5 => EditType::UpdateText,
            6 => EditType::StepIn,
            7 => EditType::StepOut,
            8 => EditType::UpdateMarkup,
            9 => EditType::PermutationListEntry,
            10 => EditType::PermutationListEnd,
            other => return Err(BatchError::UnknownEditType(other)),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum FrameType {
    Element = 1,
    Text = 2,
    Attribute = 3,
    Component = 4,
    Region = 5,
    ElementReferenceCapture = 6,
    Markup = 8,
}

impl FrameType {
    pub fn from_code(code: u32) -> Result<Self, BatchError> {
        Ok(match code {
            1 => FrameType::Element,
            2 => FrameType::Text,
            3 => FrameType::Attribute,
            4 => FrameType::Component,
            5 => FrameType::Region,
            6 => FrameType::ElementReferenceCapture,
            8 => FrameType::Markup,
            other => return Err(BatchError::UnknownFrameType(other)),
        })
    }
}

/// One instruction of a component diff.
///
/// `sibling_index` is relative to the current parent and the current child
/// offset maintained by the applier; frame indexes point into the batch's
/// reference frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    PrependFrame {
        sibling_index: u32,
        reference_frame_index: u32,
    },
    RemoveFrame {
        sibling_index: u32,
    },
    SetAttribute {
        sibling_index: u32,
        reference_frame_index: u32,
    },
    RemoveAttribute {
        sibling_index: u32,
        removed_attribute_name: StringIndex,
    },
    UpdateText {
        sibling_index: u32,
        reference_frame_index: u32,
    },
    StepIn {
        sibling_index: u32,
    },
    StepOut,
    UpdateMarkup {
        sibling_index: u32,
        reference_frame_index: u32,
    },
    PermutationListEntry {
        sibling_index: u32,
        move_to_sibling_index: u32,
    },
    PermutationListEnd,
}

impl Edit {
    pub fn edit_type(&self) -> EditType {
        match self {
            Edit::PrependFrame { .. } => EditType::PrependFrame,
            Edit::RemoveFrame { .. } => EditType::RemoveFrame,
            Edit::SetAttribute { .. } => EditType::SetAttribute,
            Edit::RemoveAttribute { .. } => EditType::RemoveAttribute,
            Edit::UpdateText { .. } => EditType::UpdateText,
            Edit::StepIn { .. } => EditType::StepIn,
            Edit::StepOut => EditType::StepOut,
            Edit::UpdateMarkup { .. } => EditType::UpdateMarkup,
            Edit::PermutationListEntry { .. } => EditType::PermutationListEntry,
            Edit::PermutationListEnd => EditType::PermutationListEnd,
        }
    }

    /// Decode the 16-byte record at `offset`.
    pub(crate) fn decode(data: &[u8], offset: usize) -> Result<Self, BatchError> {
        let word = |at: usize| read_word(data, offset + at);
        let sibling_index = word(4)?;
        Ok(match EditType::from_code(word(0)?)? {
            EditType::PrependFrame => Edit::PrependFrame {
                sibling_index,
                reference_frame_index: word(8)?,
            },
            EditType::RemoveFrame => Edit::RemoveFrame { sibling_index },
            EditType::SetAttribute => Edit::SetAttribute {
                sibling_index,
                reference_frame_index: word(8)?,
            },
            EditType::RemoveAttribute => Edit::RemoveAttribute {
                sibling_index,
                removed_attribute_name: StringIndex(word(12)? as i32),
            },
            EditType::UpdateText => Edit::UpdateText {
                sibling_index,
                reference_frame_index: word(8)?,
            },
            EditType::StepIn => Edit::StepIn { sibling_index },
            EditType::StepOut => Edit::StepOut,
            EditType::UpdateMarkup => Edit::UpdateMarkup {
                sibling_index,
                reference_frame_index: word(8)?,
            },
            EditType::PermutationListEntry => Edit::PermutationListEntry {
                sibling_index,
                move_to_sibling_index: word(8)?,
            },
            EditType::PermutationListEnd => Edit::PermutationListEnd,
        })
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        let (sibling, slot8, slot12) = match *self {
            Edit::PrependFrame {
                sibling_index,
                reference_frame_index,
            }
            | Edit::SetAttribute {
                sibling_index,
                reference_frame_index,
            }
            | Edit::UpdateText {
                sibling_index,
                reference_frame_index,
            }
            | Edit::UpdateMarkup {
                sibling_index,
                reference_frame_index,
            } => (sibling_index, reference_frame_index, -1),
            Edit::RemoveFrame { sibling_index } | Edit::StepIn { sibling_index } => {
                (sibling_index, 0, -1)
            }
            Edit::RemoveAttribute {
                sibling_index,
                removed_attribute_name,
            } => (sibling_index, 0, removed_attribute_name.0),
            Edit::PermutationListEntry {
                sibling_index,
                move_to_sibling_index,
            } => (sibling_index, move_to_sibling_index, -1),
            Edit::StepOut | Edit::PermutationListEnd => (0, 0, -1),
        };
        out.extend_from_slice(&(self.edit_type() as u32).to_le_bytes());
        out.extend_from_slice(&sibling.to_le_bytes());
        out.extend_from_slice(&slot8.to_le_bytes());
        out.extend_from_slice(&slot12.to_le_bytes());
    }
}

/// One reference frame: a node or attribute description used as the source
/// of inserted content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// `subtree_length` counts this frame plus all of its attribute and
    /// descendant frames.
    Element {
        subtree_length: u32,
        name: StringIndex,
    },
    Text {
        content: StringIndex,
    },
    Attribute {
        name: StringIndex,
        value: StringIndex,
        event_handler_id: EventHandlerId,
    },
    Component {
        subtree_length: u32,
        component_id: ComponentId,
    },
    Region {
        subtree_length: u32,
    },
    ElementReferenceCapture {
        reference_capture_id: StringIndex,
    },
    Markup {
        content: StringIndex,
    },
}

impl Frame {
    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::Element { .. } => FrameType::Element,
            Frame::Text { .. } => FrameType::Text,
            Frame::Attribute { .. } => FrameType::Attribute,
            Frame::Component { .. } => FrameType::Component,
            Frame::Region { .. } => FrameType::Region,
            Frame::ElementReferenceCapture { .. } => FrameType::ElementReferenceCapture,
            Frame::Markup { .. } => FrameType::Markup,
        }
    }

    /// Frames that own a subtree report its length, including themselves.
    pub fn subtree_length(&self) -> Option<u32> {
        match *self {
            Frame::Element { subtree_length, .. }
            | Frame::Component { subtree_length, .. }
            | Frame::Region { subtree_length } => Some(subtree_length),
            _ => None,
        }
    }

    pub(crate) fn decode(data: &[u8], offset: usize) -> Result<Self, BatchError> {
        let word = |at: usize| read_word(data, offset + at);
        let string = |at: usize| word(at).map(|raw| StringIndex(raw as i32));
        Ok(match FrameType::from_code(word(0)?)? {
            FrameType::Element => Frame::Element {
                subtree_length: word(4)?,
                name: string(8)?,
            },
            FrameType::Text => Frame::Text {
                content: string(4)?,
            },
            FrameType::Attribute => Frame::Attribute {
                name: string(4)?,
                value: string(8)?,
                event_handler_id: read_safe_u64(data, offset + 12)?,
            },
            FrameType::Component => Frame::Component {
                subtree_length: word(4)?,
                component_id: ComponentId(word(8)?),
            },
            FrameType::Region => Frame::Region {
                subtree_length: word(4)?,
            },
            FrameType::ElementReferenceCapture => Frame::ElementReferenceCapture {
                reference_capture_id: string(4)?,
            },
            FrameType::Markup => Frame::Markup {
                content: string(4)?,
            },
        })
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        let mut record = [0u8; FRAME_SIZE];
        let mut put = |at: usize, value: u32| {
            record[at..at + 4].copy_from_slice(&value.to_le_bytes());
        };
        put(0, self.frame_type() as u32);
        match *self {
            Frame::Element {
                subtree_length,
                name,
            } => {
                put(4, subtree_length);
                put(8, name.0 as u32);
            }
            Frame::Text { content }
            | Frame::Markup { content }
            | Frame::ElementReferenceCapture {
                reference_capture_id: content,
            } => put(4, content.0 as u32),
            Frame::Attribute {
                name,
                value,
                event_handler_id,
            } => {
                put(4, name.0 as u32);
                put(8, value.0 as u32);
                put(12, event_handler_id.0 as u32);
                put(16, (event_handler_id.0 >> 32) as u32);
            }
            Frame::Component {
                subtree_length,
                component_id,
            } => {
                put(4, subtree_length);
                put(8, component_id.0);
            }
            Frame::Region { subtree_length } => put(4, subtree_length),
        }
        out.extend_from_slice(&record);
    }
}

pub(crate) fn read_word(data: &[u8], offset: usize) -> Result<u32, BatchError> {
    le::read_u32(data, offset).ok_or(BatchError::Truncated {
        offset,
        needed: 4,
        len: data.len(),
    })
}

/// Two little-endian words forming an id that must stay within 53 bits.
pub(crate) fn read_safe_u64(data: &[u8], offset: usize) -> Result<EventHandlerId, BatchError> {
    let low = read_word(data, offset)?;
    let high = read_word(data, offset + 4)?;
    if high > MAX_SAFE_HIGH_WORD {
        return Err(BatchError::IdOutOfRange { high });
    }
    Ok(EventHandlerId((u64::from(high) << 32) | u64::from(low)))
}
