//! Various utilities for the codec

/// Reads a big-endian `u16` from `input` at `offset`.
///
/// # Panics
///
/// Panics if `offset + 2` is out of bounds. Callers check the length first.
#[inline]
pub fn read_u16(input: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([input[offset], input[offset + 1]])
}

/// Reads a big-endian two's-complement `i16` from `input` at `offset`.
///
/// Relative-jump offsets are encoded this way.
///
/// # Panics
///
/// Panics if `offset + 2` is out of bounds. Callers check the length first.
#[inline]
pub fn read_i16(input: &[u8], offset: usize) -> i16 {
    read_u16(input, offset) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let data = [0x12, 0x34, 0xff, 0xfd];
        assert_eq!(read_u16(&data, 0), 0x1234);
        assert_eq!(read_u16(&data, 2), 0xfffd);
        assert_eq!(read_i16(&data, 2), -3);
        assert_eq!(read_i16(&data, 0), 0x1234);
    }
}
