//! LEB128 varints and zigzag mapping.
//!
//! Readers are strict: a varint must use the fewest bytes possible and must
//! fit 64 bits. Offsets in errors are relative to the slice passed in; the
//! decoder rebases them.

use super::errors::DecodingError;

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as an unsigned varint.
pub fn write_uvarint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes `write_uvarint` emits for `value`.
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Read an unsigned varint at `offset`, returning the value and the number
/// of bytes consumed.
pub fn read_uvarint(buf: &[u8], offset: usize) -> Result<(u64, usize), DecodingError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    let mut idx = offset;

    loop {
        let byte = *buf
            .get(idx)
            .ok_or(DecodingError::UnexpectedEof { offset: idx })?;
        let consumed = idx - offset + 1;

        if consumed == MAX_VARINT_LEN && byte > 0x01 {
            return Err(DecodingError::InvalidVarint {
                offset,
                reason: "overflows 64 bits",
            });
        }

        result |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            if consumed > 1 && byte == 0 {
                return Err(DecodingError::InvalidVarint {
                    offset,
                    reason: "non-minimal encoding",
                });
            }
            return Ok((result, consumed));
        }

        shift += 7;
        idx += 1;
    }
}

/// Zigzag-map a 32-bit signed value.
pub const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Zigzag-map a 64-bit signed value.
pub const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_uvarint(&mut out, value);
        out
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7f]);
        assert_eq!(encoded(128), vec![0x80, 0x01]);
        assert_eq!(encoded(300), vec![0xac, 0x02]);
        assert_eq!(encoded(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn test_uvarint_len_matches_writer() {
        for value in [0, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            assert_eq!(uvarint_len(value), encoded(value).len(), "value {value}");
        }
    }

    #[test]
    fn test_read_back_with_offset() {
        let mut buf = vec![0xff];
        write_uvarint(&mut buf, 300);
        assert_eq!(read_uvarint(&buf, 1), Ok((300, 2)));

        let max = encoded(u64::MAX);
        assert_eq!(read_uvarint(&max, 0), Ok((u64::MAX, 10)));
    }

    #[test]
    fn test_non_minimal_rejected() {
        assert!(matches!(
            read_uvarint(&[0x80, 0x00], 0),
            Err(DecodingError::InvalidVarint { reason: "non-minimal encoding", .. })
        ));
        assert!(matches!(
            read_uvarint(&[0x81, 0x80, 0x00], 0),
            Err(DecodingError::InvalidVarint { .. })
        ));
    }

    #[test]
    fn test_overflow_rejected() {
        let mut too_big = vec![0xff; 9];
        too_big.push(0x02);
        assert!(matches!(
            read_uvarint(&too_big, 0),
            Err(DecodingError::InvalidVarint { reason: "overflows 64 bits", .. })
        ));

        let mut too_long = vec![0xff; 10];
        too_long.push(0x01);
        assert!(read_uvarint(&too_long, 0).is_err());
    }

    #[test]
    fn test_truncated() {
        assert_eq!(
            read_uvarint(&[0x80, 0x80], 0),
            Err(DecodingError::UnexpectedEof { offset: 2 })
        );
        assert_eq!(
            read_uvarint(&[], 0),
            Err(DecodingError::UnexpectedEof { offset: 0 })
        );
    }

    #[test]
    fn test_zigzag_edges() {
        assert_eq!(zigzag_encode_32(0), 0);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(1), 2);
        assert_eq!(zigzag_encode_32(i32::MAX), u32::MAX - 1);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_encode_64(i64::MIN), u64::MAX);

        for n in [0, 1, -1, 63, -64, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode_32(zigzag_encode_32(n)), n);
        }
        for n in [0, -1, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode_64(zigzag_encode_64(n)), n);
        }
    }
}
