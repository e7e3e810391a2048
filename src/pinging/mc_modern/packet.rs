//! Packet framing: `VarInt(length) ++ VarInt(id) ++ body`, where `length`
//! counts the id and the body but not itself.

use std::io::{self, Read, Write};

use log::trace;

use super::helpers::{McModernValue, VarInt};
use crate::error::{ProtocolError, Result};

/// Length prefix and id of an incoming packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Declared length of id plus body.
    pub length: i32,
    pub id: i32,
    /// Bytes the id VarInt occupied on the wire.
    pub id_len: usize,
}

impl PacketHeader {
    /// Body bytes still to be read after the header.
    pub fn body_len(&self) -> Result<usize> {
        usize::try_from(self.length)
            .ok()
            .and_then(|len| len.checked_sub(self.id_len))
            .ok_or_else(|| ProtocolError::InvalidLength(self.length).into())
    }
}

/// A fully read incoming packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,
    pub body: Vec<u8>,
}

/// Serializes a packet with `body` writing the fields after the id, then
/// writes the length prefix and the buffer to `out`.
pub fn write_packet<W, F>(out: &mut W, id: i32, body: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut packet = vec![];
    VarInt(id).write_to(&mut packet)?;
    body(&mut packet)?;

    trace!("writing packet {:#04x} ({} bytes)", id, packet.len());
    VarInt(packet.len() as i32).write_to(out)?;
    out.write_all(&packet)?;
    Ok(())
}

/// Reads the length and id VarInts, leaving the body on the stream.
pub fn read_header<R: Read>(input: &mut R) -> Result<PacketHeader> {
    let length = VarInt::read_from(input)?.0;
    let id = VarInt::read_from(input)?;
    Ok(PacketHeader {
        length,
        id: id.0,
        id_len: id.encoded_len(),
    })
}

/// Reads the body announced by `header`.
///
/// The buffer grows only as bytes arrive, so a bogus length cannot force a
/// large allocation.
pub fn read_body<R: Read>(input: &mut R, header: &PacketHeader) -> Result<Vec<u8>> {
    let len = header.body_len()?;
    let mut body = vec![];
    input.take(len as u64).read_to_end(&mut body)?;
    if body.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("packet body ended after {} of {} bytes", body.len(), len),
        )
        .into());
    }
    Ok(body)
}

/// Reads a whole packet, consuming exactly the declared length.
pub fn read_packet<R: Read>(input: &mut R) -> Result<Packet> {
    let header = read_header(input)?;
    let body = read_body(input, &header)?;

    trace!("read packet {:#04x} ({} body bytes)", header.id, body.len());
    Ok(Packet { header, body })
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use byteorder::{BigEndian, WriteBytesExt};

    use super::*;
    use crate::error::PingError;

    #[test]
    fn length_counts_id_and_body() {
        let mut out = vec![];
        write_packet(&mut out, 0x00, |body| {
            body.write_u16::<BigEndian>(25565)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(out, [0x03, 0x00, 0x63, 0xDD]);
    }

    #[test]
    fn empty_body() {
        let mut out = vec![];
        write_packet(&mut out, 0x00, |_| Ok(())).unwrap();
        assert_eq!(out, [0x01, 0x00]);
    }

    #[test]
    fn reads_exactly_declared_length() {
        let mut input = Cursor::new(vec![0x04, 0x01, 0xAA, 0xBB, 0xCC, 0xDD]);
        let packet = read_packet(&mut input).unwrap();
        assert_eq!(packet.header.length, 4);
        assert_eq!(packet.header.id, 0x01);
        assert_eq!(packet.body, [0xAA, 0xBB, 0xCC]);
        assert_eq!(input.position(), 5);
    }

    #[test]
    fn multi_byte_id() {
        let mut input = Cursor::new(vec![0x03, 0x80, 0x01, 0x07]);
        let packet = read_packet(&mut input).unwrap();
        assert_eq!(packet.header.id, 128);
        assert_eq!(packet.header.id_len, 2);
        assert_eq!(packet.body, [0x07]);
    }

    #[test]
    fn short_body_is_io_error() {
        let mut input = Cursor::new(vec![0x05, 0x00, 0x01]);
        match read_packet(&mut input).unwrap_err() {
            PingError::Io(e) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn huge_declared_length_fails_without_allocating() {
        let mut input = Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x00, 0x01, 0x02]);
        match read_packet(&mut input).unwrap_err() {
            PingError::Io(e) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn negative_length_is_rejected() {
        let mut input = Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x00]);
        assert!(matches!(
            read_packet(&mut input),
            Err(PingError::Protocol(ProtocolError::InvalidLength(-1)))
        ));
    }

    #[test]
    fn header_leaves_body_unread() {
        let mut input = Cursor::new(vec![0x09, 0x01, 0, 0, 0, 0, 0, 0, 0, 42]);
        let header = read_header(&mut input).unwrap();
        assert_eq!(header.id, 0x01);
        assert_eq!(header.body_len().unwrap(), 8);
        assert_eq!(input.position(), 2);
    }
}
