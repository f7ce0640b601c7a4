use crate::error::BatchError;
use crate::records::{
    EDIT_SIZE, Edit, FRAME_SIZE, Frame, StringIndex, TRAILER_SIZE, read_safe_u64, read_word,
};
use core_types::{ComponentId, EventHandlerId};
use std::borrow::Cow;
use tools::{leb128, utf8};

/// Element counts of the four array sections, as logged per batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionCounts {
    pub updated_components: usize,
    pub reference_frames: usize,
    pub disposed_component_ids: usize,
    pub disposed_event_handler_ids: usize,
}

/// Count-prefixed array range: values begin four bytes after `offset`.
#[derive(Clone, Copy, Debug)]
struct ArrayRange {
    values: usize,
    count: usize,
}

impl ArrayRange {
    fn at(data: &[u8], offset: usize) -> Result<Self, BatchError> {
        Ok(ArrayRange {
            values: offset + 4,
            count: read_word(data, offset)? as usize,
        })
    }
}

/// Borrowed view over one render batch.
///
/// Construction validates only the trailer; every other field is read and
/// bounds-checked when it is asked for.
#[derive(Clone, Copy, Debug)]
pub struct RenderBatch<'a> {
    data: &'a [u8],
    updated_components: ArrayRange,
    reference_frames: ArrayRange,
    disposed_component_ids: ArrayRange,
    disposed_event_handler_ids: ArrayRange,
    strings: StringTable<'a>,
}

impl<'a> RenderBatch<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, BatchError> {
        let len = data.len();
        if len < TRAILER_SIZE {
            return Err(BatchError::Truncated {
                offset: 0,
                needed: TRAILER_SIZE,
                len,
            });
        }
        let trailer = |back: usize| read_word(data, len - back).map(|word| word as usize);
        let batch = RenderBatch {
            data,
            updated_components: ArrayRange::at(data, trailer(20)?)?,
            reference_frames: ArrayRange::at(data, trailer(16)?)?,
            disposed_component_ids: ArrayRange::at(data, trailer(12)?)?,
            disposed_event_handler_ids: ArrayRange::at(data, trailer(8)?)?,
            strings: StringTable {
                data,
                start: trailer(4)?,
            },
        };
        log::trace!(
            target: "renderer.batch",
            "batch of {} bytes: {:?}",
            len,
            batch.section_counts()
        );
        Ok(batch)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn section_counts(&self) -> SectionCounts {
        SectionCounts {
            updated_components: self.updated_components.count,
            reference_frames: self.reference_frames.count,
            disposed_component_ids: self.disposed_component_ids.count,
            disposed_event_handler_ids: self.disposed_event_handler_ids.count,
        }
    }

    pub fn updated_components_len(&self) -> usize {
        self.updated_components.count
    }

    /// The `index`th updated component: its id and edit list.
    pub fn updated_component(&self, index: usize) -> Result<ComponentDiff<'a>, BatchError> {
        let entry = self.updated_components.values + 4 * index;
        let diff = read_word(self.data, entry)? as usize;
        let component_id = ComponentId(read_word(self.data, diff)?);
        let edits = ArrayRange::at(self.data, diff + 4)?;
        Ok(ComponentDiff {
            data: self.data,
            component_id,
            edits,
        })
    }

    pub fn updated_components(
        &self,
    ) -> impl Iterator<Item = Result<ComponentDiff<'a>, BatchError>> + '_ {
        (0..self.updated_components.count).map(move |i| self.updated_component(i))
    }

    pub fn reference_frames(&self) -> ReferenceFrames<'a> {
        ReferenceFrames {
            data: self.data,
            range: self.reference_frames,
        }
    }

    pub fn disposed_component_ids_len(&self) -> usize {
        self.disposed_component_ids.count
    }

    pub fn disposed_component_id(&self, index: usize) -> Result<ComponentId, BatchError> {
        read_word(self.data, self.disposed_component_ids.values + 4 * index).map(ComponentId)
    }

    pub fn disposed_event_handler_ids_len(&self) -> usize {
        self.disposed_event_handler_ids.count
    }

    pub fn disposed_event_handler_id(&self, index: usize) -> Result<EventHandlerId, BatchError> {
        read_safe_u64(self.data, self.disposed_event_handler_ids.values + 8 * index)
    }

    pub fn strings(&self) -> &StringTable<'a> {
        &self.strings
    }

    /// Shorthand for `self.strings().read(index)`.
    pub fn read_string(&self, index: StringIndex) -> Result<Option<Cow<'a, str>>, BatchError> {
        self.strings.read(index)
    }
}

/// Edits of one updated component.
#[derive(Clone, Copy, Debug)]
pub struct ComponentDiff<'a> {
    data: &'a [u8],
    component_id: ComponentId,
    edits: ArrayRange,
}

impl<'a> ComponentDiff<'a> {
    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    pub fn edit_count(&self) -> usize {
        self.edits.count
    }

    pub fn edit(&self, index: usize) -> Result<Edit, BatchError> {
        Edit::decode(self.data, self.edits.values + EDIT_SIZE * index)
    }

    pub fn edits(&self) -> impl Iterator<Item = Result<Edit, BatchError>> + 'a {
        let diff = *self;
        (0..diff.edits.count).map(move |i| diff.edit(i))
    }
}

/// Frame storage shared by every diff in a batch.
#[derive(Clone, Copy, Debug)]
pub struct ReferenceFrames<'a> {
    data: &'a [u8],
    range: ArrayRange,
}

impl ReferenceFrames<'_> {
    pub fn len(&self) -> usize {
        self.range.count
    }

    pub fn is_empty(&self) -> bool {
        self.range.count == 0
    }

    /// Frame locations are computed from the index alone; frames past the
    /// declared count are still readable while they lie inside the buffer.
    pub fn frame(&self, index: usize) -> Result<Frame, BatchError> {
        Frame::decode(self.data, self.range.values + FRAME_SIZE * index)
    }
}

/// Deduplicated strings referenced by index.
#[derive(Clone, Copy, Debug)]
pub struct StringTable<'a> {
    data: &'a [u8],
    start: usize,
}

impl<'a> StringTable<'a> {
    /// `StringIndex::NULL` reads as `None`. Invalid UTF-8 is replaced rather
    /// than rejected.
    pub fn read(&self, index: StringIndex) -> Result<Option<Cow<'a, str>>, BatchError> {
        if index.is_null() {
            return Ok(None);
        }
        let slot = usize::try_from(index.0)
            .map_err(|_| BatchError::MissingString { index: index.0 })?;
        let entry = read_word(self.data, self.start + 4 * slot)? as usize;
        let (len, prefix) = leb128::read_u32(self.data, entry).ok_or(BatchError::Truncated {
            offset: entry,
            needed: 1,
            len: self.data.len(),
        })?;
        let body = entry + prefix;
        let end = body + len as usize;
        let bytes = self.data.get(body..end).ok_or(BatchError::Truncated {
            offset: body,
            needed: len as usize,
            len: self.data.len(),
        })?;
        Ok(Some(utf8::decode_utf8_lossy(bytes)))
    }
}
