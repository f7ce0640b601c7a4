//! Binary render-batch protocol.
//!
//! A batch is an immutable byte buffer read in place: every accessor computes
//! its offset arithmetically from fixed field widths, so there is no cursor
//! and nothing is materialized until a caller asks for it.
//!
//! Layout (all integers little-endian):
//! - trailer, last 20 bytes: offsets of the updated-components,
//!   reference-frames, disposed-component-ids and disposed-event-handler-ids
//!   array ranges, then the string table start.
//! - array range: `u32 count` followed by `count` fixed-width values.
//! - updated component entry: `u32` offset of a diff; a diff is
//!   `u32 componentId` then `u32 editCount` then 16-byte edit records.
//! - reference frame: 20-byte record, addressed by index.
//! - string table: `u32` offsets, each pointing at a LEB128 byte length
//!   followed by UTF-8 bytes.

mod builder;
mod error;
mod reader;
mod records;

pub use crate::builder::BatchBuilder;
pub use crate::error::BatchError;
pub use crate::reader::{ComponentDiff, ReferenceFrames, RenderBatch, SectionCounts, StringTable};
pub use crate::records::{
    EDIT_SIZE, Edit, EditType, FRAME_SIZE, Frame, FrameType, MAX_SAFE_HIGH_WORD, StringIndex,
    TRAILER_SIZE,
};
