use std::{
    io::{Cursor, Read, Write},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, trace};

use self::{
    helpers::{McModernValue, VarInt},
    packet::PacketHeader,
    ping_json::PingReply,
};
use super::Pinger;
use crate::{
    charset::Charset,
    error::{PingError, ProtocolError, Result},
};

pub mod helpers;
pub mod packet;
pub mod ping_json;

pub const PACKET_HANDSHAKE: i32 = 0x00;
pub const PACKET_STATUS_REQUEST: i32 = 0x00;
pub const PACKET_STATUS_RESPONSE: i32 = 0x00;
pub const PACKET_PING: i32 = 0x01;
pub const PACKET_PONG: i32 = 0x01;
/// `next_state` value asking for the status sub-state.
pub const NEXT_STATE_STATUS: i32 = 1;

/// Status request: length 1, id 0, no fields.
const STATUS_REQUEST: [u8; 2] = [0x01, PACKET_STATUS_REQUEST as u8];
/// Ping header: length 9 (id plus an 8 byte payload), id 1.
const PING_HEADER: [u8; 2] = [0x09, PACKET_PING as u8];

/// Where a [`StatusSession`] is in the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    HandshakeSent,
    StatusRequested,
    StatusReceived,
    PingSent,
    PingAcked,
    Failed,
}

/// The status exchange over an already connected stream.
///
/// Steps must be called in order; a failed step leaves the session in
/// [`SessionState::Failed`]. Dropping the session closes the stream.
#[derive(Debug)]
pub struct StatusSession<S> {
    stream: S,
    state: SessionState,
}

impl<S: Read + Write> StatusSession<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            state: SessionState::Connected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sends the handshake announcing `hostname:port` and the status
    /// sub-state.
    pub fn handshake(&mut self, hostname: &str, port: u16, protocol_version: i32) -> Result<()> {
        self.expect(SessionState::Connected);
        let result = packet::write_packet(&mut self.stream, PACKET_HANDSHAKE, |body| {
            VarInt(protocol_version).write_to(body)?;
            VarInt(hostname.len() as i32).write_to(body)?;
            body.write_all(hostname.as_bytes())?;
            body.write_u16::<BigEndian>(port)?;
            VarInt(NEXT_STATE_STATUS).write_to(body)?;
            Ok(())
        });
        self.advance(SessionState::HandshakeSent, result)
    }

    pub fn request_status(&mut self) -> Result<()> {
        self.expect(SessionState::HandshakeSent);
        let result = self.stream.write_all(&STATUS_REQUEST).map_err(PingError::from);
        self.advance(SessionState::StatusRequested, result)
    }

    /// Reads the status response and decodes its JSON text with `charset`.
    pub fn read_status(&mut self, charset: Charset) -> Result<String> {
        self.expect(SessionState::StatusRequested);
        let result = self.read_status_inner(charset);
        self.advance(SessionState::StatusReceived, result)
    }

    fn read_status_inner(&mut self, charset: Charset) -> Result<String> {
        let header = self.read_header(PACKET_STATUS_RESPONSE)?;
        let body = packet::read_body(&mut self.stream, &header)?;
        let mut body = Cursor::new(body);

        let length = VarInt::read_from(&mut body).map_err(PingError::eof_as_premature)?.0;
        if length == 0 {
            return Err(ProtocolError::UnexpectedValue.into());
        }
        let start = body.position() as usize;
        let remaining = body.get_ref().len() - start;
        let json_len = usize::try_from(length)
            .ok()
            .filter(|len| *len <= remaining)
            .ok_or(ProtocolError::InvalidLength(length))?;

        trace!("status response carries {} bytes of JSON", json_len);
        Ok(charset.decode(&body.get_ref()[start..start + json_len]))
    }

    /// Sends a ping carrying the current time in milliseconds, which is
    /// returned.
    pub fn ping(&mut self) -> Result<i64> {
        self.expect(SessionState::StatusReceived);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_millis() as i64);

        let mut packet = PING_HEADER.to_vec();
        packet.extend_from_slice(&timestamp.to_be_bytes());
        let result = self
            .stream
            .write_all(&packet)
            .map(|_| timestamp)
            .map_err(PingError::from);
        self.advance(SessionState::PingSent, result)
    }

    /// Reads the pong header. The echoed payload is left unread.
    pub fn read_pong(&mut self) -> Result<()> {
        self.expect(SessionState::PingSent);
        let result = self.read_header(PACKET_PONG).map(|_| ());
        self.advance(SessionState::PingAcked, result)
    }

    /// Closes the stream.
    pub fn close(self) {
        debug!("closing status session in state {:?}", self.state);
    }

    fn read_header(&mut self, expected: i32) -> Result<PacketHeader> {
        let header = packet::read_header(&mut self.stream).map_err(PingError::eof_as_premature)?;
        if header.id != expected {
            return Err(ProtocolError::InvalidPacket {
                expected,
                found: header.id,
            }
            .into());
        }
        Ok(header)
    }

    fn expect(&self, state: SessionState) {
        debug_assert_eq!(self.state, state, "status session steps out of order");
    }

    fn advance<T>(&mut self, next: SessionState, result: Result<T>) -> Result<T> {
        self.state = if result.is_ok() { next } else { SessionState::Failed };
        trace!("status session -> {:?}", self.state);
        result
    }
}

/// Result of a full status exchange.
#[derive(Debug, Clone)]
pub struct ModernPingData {
    pub reply: PingReply,
    /// Round trip of the ping/pong step.
    pub latency: Duration,
}

/// Runs handshake, status and ping over one stream.
#[derive(Debug, Clone)]
pub struct ModernPinger {
    pub protocol_version: i32,
    /// Host name and port announced in the handshake.
    pub hostname: String,
    pub port: u16,
    pub charset: Charset,
}

impl Pinger for ModernPinger {
    type Data = ModernPingData;

    type Error = PingError;

    fn ping<S: Read + Write>(&self, stream: S) -> Result<Self::Data> {
        let mut session = StatusSession::new(stream);

        session.handshake(&self.hostname, self.port, self.protocol_version)?;
        session.request_status()?;
        let json = session.read_status(self.charset)?;
        let reply = PingReply::decode(&json)?;

        let start = Instant::now();
        session.ping()?;
        session.read_pong()?;
        let latency = start.elapsed();

        session.close();
        Ok(ModernPingData { reply, latency })
    }
}
