use crate::records::{Edit, Frame, StringIndex};
use core_types::{ComponentId, EventHandlerId};
use std::collections::HashMap;
use tools::leb128;

/// Encoder for render batches.
///
/// Strings are interned so repeated names share one table slot. Frames are
/// appended in call order and their index is returned for use in edits.
#[derive(Debug, Default, Clone)]
pub struct BatchBuilder {
    strings: Vec<String>,
    interned: HashMap<String, StringIndex>,
    frames: Vec<Frame>,
    diffs: Vec<(ComponentId, Vec<Edit>)>,
    disposed_components: Vec<ComponentId>,
    disposed_handlers: Vec<EventHandlerId>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&mut self, value: &str) -> StringIndex {
        if let Some(&index) = self.interned.get(value) {
            return index;
        }
        let index = StringIndex(self.strings.len() as i32);
        self.strings.push(value.to_string());
        self.interned.insert(value.to_string(), index);
        index
    }

    fn optional_string(&mut self, value: Option<&str>) -> StringIndex {
        value.map_or(StringIndex::NULL, |v| self.string(v))
    }

    /// Append a raw frame and return its reference index.
    pub fn frame(&mut self, frame: Frame) -> u32 {
        self.frames.push(frame);
        (self.frames.len() - 1) as u32
    }

    pub fn element(&mut self, name: &str, subtree_length: u32) -> u32 {
        let name = self.string(name);
        self.frame(Frame::Element {
            subtree_length,
            name,
        })
    }

    pub fn text(&mut self, content: &str) -> u32 {
        let content = self.string(content);
        self.frame(Frame::Text { content })
    }

    pub fn markup(&mut self, content: &str) -> u32 {
        let content = self.string(content);
        self.frame(Frame::Markup { content })
    }

    pub fn attribute(&mut self, name: &str, value: &str) -> u32 {
        self.attribute_with(name, Some(value), EventHandlerId::NONE)
    }

    /// Attribute frame with an optional value and an event handler id.
    pub fn attribute_with(
        &mut self,
        name: &str,
        value: Option<&str>,
        event_handler_id: EventHandlerId,
    ) -> u32 {
        let name = self.string(name);
        let value = self.optional_string(value);
        self.frame(Frame::Attribute {
            name,
            value,
            event_handler_id,
        })
    }

    pub fn component(&mut self, component_id: ComponentId, subtree_length: u32) -> u32 {
        self.frame(Frame::Component {
            subtree_length,
            component_id,
        })
    }

    pub fn region(&mut self, subtree_length: u32) -> u32 {
        self.frame(Frame::Region { subtree_length })
    }

    pub fn element_reference_capture(&mut self, id: &str) -> u32 {
        let reference_capture_id = self.string(id);
        self.frame(Frame::ElementReferenceCapture {
            reference_capture_id,
        })
    }

    pub fn component_diff(&mut self, component_id: ComponentId, edits: Vec<Edit>) {
        self.diffs.push((component_id, edits));
    }

    pub fn dispose_component(&mut self, component_id: ComponentId) {
        self.disposed_components.push(component_id);
    }

    pub fn dispose_event_handler(&mut self, id: EventHandlerId) {
        self.disposed_handlers.push(id);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        let mut diff_offsets = Vec::with_capacity(self.diffs.len());
        for (component_id, edits) in &self.diffs {
            diff_offsets.push(out.len() as u32);
            push_u32(&mut out, component_id.0);
            push_u32(&mut out, edits.len() as u32);
            for edit in edits {
                edit.encode(&mut out);
            }
        }

        let updated_components = out.len() as u32;
        push_u32(&mut out, diff_offsets.len() as u32);
        for offset in &diff_offsets {
            push_u32(&mut out, *offset);
        }

        let reference_frames = out.len() as u32;
        push_u32(&mut out, self.frames.len() as u32);
        for frame in &self.frames {
            frame.encode(&mut out);
        }

        let disposed_component_ids = out.len() as u32;
        push_u32(&mut out, self.disposed_components.len() as u32);
        for id in &self.disposed_components {
            push_u32(&mut out, id.0);
        }

        let disposed_event_handler_ids = out.len() as u32;
        push_u32(&mut out, self.disposed_handlers.len() as u32);
        for id in &self.disposed_handlers {
            out.extend_from_slice(&id.0.to_le_bytes());
        }

        let mut string_offsets = Vec::with_capacity(self.strings.len());
        for value in &self.strings {
            string_offsets.push(out.len() as u32);
            leb128::write_u32(&mut out, value.len() as u32);
            out.extend_from_slice(value.as_bytes());
        }
        let string_table_start = out.len() as u32;
        for offset in &string_offsets {
            push_u32(&mut out, *offset);
        }

        for word in [
            updated_components,
            reference_frames,
            disposed_component_ids,
            disposed_event_handler_ids,
            string_table_start,
        ] {
            push_u32(&mut out, word);
        }
        out
    }
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
