//! Wire types and field keys.

use super::errors::DecodingError;

/// Wire type tag carried in the low three bits of every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    LengthDelimited = 2,
}

impl WireType {
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8, offset: usize) -> Result<Self, DecodingError> {
        match tag {
            0 => Ok(WireType::Varint),
            2 => Ok(WireType::LengthDelimited),
            other => Err(DecodingError::InvalidWireType {
                wire_type: other,
                offset,
            }),
        }
    }
}

/// Key value for `field_number` and `wire_type`.
pub const fn make_key(field_number: u32, wire_type: WireType) -> u64 {
    ((field_number as u64) << 3) | wire_type.tag() as u64
}

/// Split a decoded key into field number and wire type tag.
pub const fn split_key(key: u64) -> (u64, u8) {
    (key >> 3, (key & 0x07) as u8)
}
