pub mod leb128;
pub mod le;
pub mod utf8;
