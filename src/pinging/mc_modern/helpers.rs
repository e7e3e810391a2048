use std::ops::Deref;

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{ProtocolError, Result};

/// A value with a fixed encoding in the modern (1.7+) protocol.
pub trait McModernValue: Sized {
    fn read_from(data: &mut impl ReadBytesExt) -> Result<Self>;

    fn write_to(&self, target: &mut impl WriteBytesExt) -> Result<()>;
}

/// A protocol VarInt: 7 data bits per byte, least significant group first,
/// `0x80` set on every byte except the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub i32);

impl VarInt {
    const SEGMENT_BITS: u32 = 0x7F;
    const CONTINUE_BIT: u8 = 0x80;
    /// A 32-bit value never needs more than five groups.
    pub const MAX_LEN: usize = 5;

    /// Number of bytes `write_to` emits for this value.
    pub fn encoded_len(&self) -> usize {
        let mut value = self.0 as u32;
        let mut len = 1;
        while value & !Self::SEGMENT_BITS != 0 {
            value >>= 7;
            len += 1;
        }
        len
    }

    /// Encodes into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::MAX_LEN);
        let mut value = self.0 as u32;
        loop {
            if value & !Self::SEGMENT_BITS == 0 {
                buf.push(value as u8);
                return buf;
            }
            buf.push((value & Self::SEGMENT_BITS) as u8 | Self::CONTINUE_BIT);
            value >>= 7;
        }
    }
}

impl From<u32> for VarInt {
    fn from(value: u32) -> Self {
        Self(value as i32)
    }
}

impl Deref for VarInt {
    type Target = i32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl McModernValue for VarInt {
    fn read_from(data: &mut impl ReadBytesExt) -> Result<Self> {
        let mut value: u32 = 0;
        for index in 0..Self::MAX_LEN {
            let current_byte = data.read_u8()?;
            value |= (u32::from(current_byte) & Self::SEGMENT_BITS) << (7 * index);
            if current_byte & Self::CONTINUE_BIT == 0 {
                return Ok(Self(value as i32));
            }
        }
        Err(ProtocolError::VarIntTooBig.into())
    }

    fn write_to(&self, target: &mut impl WriteBytesExt) -> Result<()> {
        target.write_all(&self.to_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use super::*;
    use crate::error::PingError;

    fn decode(bytes: &[u8]) -> Result<i32> {
        VarInt::read_from(&mut Cursor::new(bytes)).map(|v| v.0)
    }

    #[test]
    fn known_vectors() {
        assert_eq!(VarInt(0).to_bytes(), [0x00]);
        assert_eq!(VarInt(1).to_bytes(), [0x01]);
        assert_eq!(VarInt(127).to_bytes(), [0x7F]);
        assert_eq!(VarInt(128).to_bytes(), [0x80, 0x01]);
        assert_eq!(VarInt(300).to_bytes(), [0xAC, 0x02]);
        assert_eq!(VarInt(2_147_483_647).to_bytes(), [0xFF, 0xFF, 0xFF, 0xFF, 0x07]);
        assert_eq!(VarInt(-1).to_bytes(), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn roundtrip_unsigned() {
        let values = [0u32, 1, 127, 128, 255, 300, 16_383, 16_384, 2_097_151, 2_147_483_647, 2_147_483_648, u32::MAX];
        for value in values {
            let encoded = VarInt::from(value).to_bytes();
            assert!(encoded.len() <= VarInt::MAX_LEN);
            assert_eq!(encoded.len(), VarInt::from(value).encoded_len());
            assert_eq!(decode(&encoded).unwrap() as u32, value);
        }
    }

    #[test]
    fn decode_stops_at_terminator() {
        let mut cursor = Cursor::new(vec![0xAC, 0x02, 0x05]);
        assert_eq!(VarInt::read_from(&mut cursor).unwrap(), VarInt(300));
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn sixth_byte_is_too_big() {
        let err = decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]).unwrap_err();
        assert!(matches!(err, PingError::Protocol(ProtocolError::VarIntTooBig)));
        assert_eq!(err.to_string(), "VarInt too big");
    }

    #[test]
    fn truncated_varint_is_io() {
        match decode(&[0x80, 0x80]).unwrap_err() {
            PingError::Io(e) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(decode(&[]), Err(PingError::Io(_))));
    }
}
