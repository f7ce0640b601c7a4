use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchError {
    /// A read of `needed` bytes at `offset` ran past the end of a `len`-byte buffer.
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },
    /// A 64-bit id whose high word would exceed 53 bits of precision.
    IdOutOfRange { high: u32 },
    UnknownEditType(u32),
    UnknownFrameType(u32),
    /// A string index that is neither the absent sentinel nor in the table.
    MissingString { index: i32 },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Truncated {
                offset,
                needed,
                len,
            } => write!(
                f,
                "batch truncated: need {needed} bytes at offset {offset}, buffer is {len} bytes"
            ),
            BatchError::IdOutOfRange { high } => write!(
                f,
                "cannot read uint64 with high order part {high}: the result would exceed 2^53-1"
            ),
            BatchError::UnknownEditType(code) => write!(f, "unknown edit type: {code}"),
            BatchError::UnknownFrameType(code) => write!(f, "unknown frame type: {code}"),
            BatchError::MissingString { index } => write!(f, "string index {index} is invalid"),
        }
    }
}

impl std::error::Error for BatchError {}
