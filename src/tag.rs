//! Tag alphabet for the blobnav wire format.
//!
//! Every encoded value starts with a single tag byte. Numeric element
//! kinds (`0x01..=0x0A`) serve both as scalar tags and as the element
//! tag inside an array header, so their byte values are shared with
//! [`DType`](crate::types::DType).

use crate::types::DType;

// Singletons
pub const NULL: u8 = 0x10;
pub const TRUE: u8 = 0x11;
pub const FALSE: u8 = 0x12;

// Variable-length blobs (tag, compact length, payload)
pub const STR: u8 = 0x13;
pub const BIN: u8 = 0x14;

// Container structure
pub const LIST_OPEN: u8 = 0x20;
pub const LIST_CLOSE: u8 = 0x21;
pub const DICT_OPEN: u8 = 0x22;
pub const DICT_CLOSE: u8 = 0x23;

// Array prefix (tag, rank, dims, element tag, payload; no close tag)
pub const ARRAY: u8 = 0x24;

// Compact length tiers: discriminator byte, then the length itself
// in the file byte order at the tier's width.
pub const LEN8: u8 = 0x31;
pub const LEN16: u8 = 0x32;
pub const LEN32: u8 = 0x33;
pub const LEN64: u8 = 0x34;

/// Decoded form of a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Numeric scalar; the same byte names an array element kind.
    Scalar(DType),
    Null,
    True,
    False,
    Str,
    Bin,
    ListOpen,
    ListClose,
    DictOpen,
    DictClose,
    Array,
}

impl Tag {
    /// Classify a tag byte. Length-tier bytes are not values and
    /// return `None` here; they are only legal inside length prefixes.
    pub fn from_u8(byte: u8) -> Option<Tag> {
        if let Some(dtype) = DType::from_u8(byte) {
            return Some(Tag::Scalar(dtype));
        }
        match byte {
            NULL => Some(Tag::Null),
            TRUE => Some(Tag::True),
            FALSE => Some(Tag::False),
            STR => Some(Tag::Str),
            BIN => Some(Tag::Bin),
            LIST_OPEN => Some(Tag::ListOpen),
            LIST_CLOSE => Some(Tag::ListClose),
            DICT_OPEN => Some(Tag::DictOpen),
            DICT_CLOSE => Some(Tag::DictClose),
            ARRAY => Some(Tag::Array),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Tag::Scalar(dtype) => dtype as u8,
            Tag::Null => NULL,
            Tag::True => TRUE,
            Tag::False => FALSE,
            Tag::Str => STR,
            Tag::Bin => BIN,
            Tag::ListOpen => LIST_OPEN,
            Tag::ListClose => LIST_CLOSE,
            Tag::DictOpen => DICT_OPEN,
            Tag::DictClose => DICT_CLOSE,
            Tag::Array => ARRAY,
        }
    }
}
