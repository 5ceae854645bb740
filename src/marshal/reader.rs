//! Cursor over a raw protocol value body.
//!
//! Provides big-endian fixed-width reads, `[int32 length]`-prefixed byte
//! frames (with `-1` meaning wire NULL), and the vint/zigzag encoding used
//! by the `duration` type. Every read checks the remaining length and fails
//! with a decode error on truncation; nothing here panics on bad input.

use crate::error::{Error, Result};

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails unless the whole input has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::decode(format!(
                "{} unexpected trailing byte(s)",
                self.remaining()
            )))
        }
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::decode("unexpected end of data"));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_exact(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().expect("4 bytes")))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.read_exact(8)?;
        Ok(i64::from_be_bytes(bytes.try_into().expect("8 bytes")))
    }

    /// Reads a `[int32 length]`-prefixed byte frame. `-1` is wire NULL;
    /// any other negative length is malformed.
    pub fn read_frame(&mut self) -> Result<Option<&'a [u8]>> {
        let len = self.read_i32()?;
        if len == -1 {
            return Ok(None);
        }
        if len < 0 {
            return Err(Error::decode(format!("invalid value length {}", len)));
        }
        self.read_exact(len as usize).map(Some)
    }

    /// Reads an unsigned vint: the count of leading one bits in the first
    /// byte gives the number of extension bytes that follow.
    pub fn read_unsigned_vint(&mut self) -> Result<u64> {
        let first = self.read_u8()?;
        let extra = first.leading_ones() as usize;
        let mut value = (first as u64) & (0xffu64 >> extra);
        for _ in 0..extra {
            value = (value << 8) | self.read_u8()? as u64;
        }
        Ok(value)
    }

    /// Reads a zigzag-encoded signed vint.
    pub fn read_vint(&mut self) -> Result<i64> {
        let raw = self.read_unsigned_vint()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }
}

/// Appends an unsigned vint, the inverse of [`Reader::read_unsigned_vint`].
pub fn write_unsigned_vint(buf: &mut Vec<u8>, value: u64) {
    let mut extra = 0u32;
    while extra < 8 && value >= 1u64 << (7 * (extra + 1)) {
        extra += 1;
    }
    if extra == 8 {
        buf.push(0xff);
        buf.extend_from_slice(&value.to_be_bytes());
        return;
    }
    let marker = (0xffu16 << (8 - extra)) as u8;
    buf.push(marker | (value >> (8 * extra)) as u8);
    for i in (0..extra).rev() {
        buf.push((value >> (8 * i)) as u8);
    }
}

/// Appends a zigzag-encoded signed vint.
pub fn write_vint(buf: &mut Vec<u8>, value: i64) {
    write_unsigned_vint(buf, ((value << 1) ^ (value >> 63)) as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_reads_and_truncation() {
        let mut reader = Reader::new(&[0, 0, 0, 7]);
        assert_eq!(reader.read_i32().unwrap(), 7);
        assert!(reader.finish().is_ok());
        assert!(reader.read_i64().is_err());
    }

    #[test]
    fn test_frame_null_and_negative() {
        let mut reader = Reader::new(&[0xff, 0xff, 0xff, 0xff]);
        assert_eq!(reader.read_frame().unwrap(), None);

        let mut reader = Reader::new(&[0xff, 0xff, 0xff, 0xfe]);
        assert!(reader.read_frame().is_err());

        let mut reader = Reader::new(&[0, 0, 0, 2, 0xab, 0xcd]);
        assert_eq!(reader.read_frame().unwrap(), Some(&[0xab, 0xcd][..]));
    }

    #[test]
    fn test_vint_round_trip() {
        for value in [
            0i64,
            1,
            -1,
            63,
            64,
            -64,
            -65,
            127,
            128,
            300,
            -300,
            1 << 20,
            -(1 << 20),
            i64::MAX,
            i64::MIN,
        ] {
            let mut buf = Vec::new();
            write_vint(&mut buf, value);
            let mut reader = Reader::new(&buf);
            assert_eq!(reader.read_vint().unwrap(), value, "value {}", value);
            assert!(reader.finish().is_ok());
        }
    }

    #[test]
    fn test_single_byte_vints() {
        // Values in [-64, 63] fit one byte.
        let mut buf = Vec::new();
        write_vint(&mut buf, 3);
        assert_eq!(buf, vec![6]);
        let mut buf = Vec::new();
        write_vint(&mut buf, -3);
        assert_eq!(buf, vec![5]);
    }

    #[test]
    fn test_trailing_bytes_detected() {
        let mut reader = Reader::new(&[0, 0, 0, 1, 0xaa]);
        reader.read_i32().unwrap();
        assert!(reader.finish().is_err());
    }
}
