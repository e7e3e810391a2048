//! A blocking client for the Minecraft
//! [Server List Ping](https://wiki.vg/Server_List_Ping) protocol.
//!
//! One call opens a connection, performs the handshake, requests the status,
//! pings, and closes the connection again:
//!
//! ```no_run
//! let reply = mcstatus::ping(&mcstatus::PingOptions::new("mc.example.net"))?;
//! println!("{} ({}/{})", reply.description, reply.players.online, reply.players.max);
//! # Ok::<(), mcstatus::PingError>(())
//! ```
//!
//! [`StatusSession`] exposes the individual steps over any `Read + Write`
//! stream.

pub mod charset;
pub mod error;
pub mod options;
pub mod pinging;
pub mod resolution;
mod session;

pub use charset::{Charset, UnknownCharset};
pub use error::{PingError, ProtocolError, Result};
pub use options::PingOptions;
pub use pinging::{
    mc_modern::{
        ping_json::{FaviconError, PingPlayer, PingPlayerInfo, PingReply, PingVersion},
        ModernPingData, ModernPinger, SessionState, StatusSession,
    },
    Pinger,
};

/// Pings the server described by `options` and returns its decoded status.
///
/// # Errors
///
/// [`PingError::Validation`] for an empty host name, [`PingError::Connection`]
/// if no connection could be made within the timeout, [`PingError::Protocol`]
/// or [`PingError::Io`] if the exchange fails, and [`PingError::Decode`] if
/// the status JSON is malformed.
pub fn ping(options: &PingOptions) -> Result<PingReply> {
    ping_with_latency(options).map(|data| data.reply)
}

/// Like [`ping`], also reporting the ping round trip.
pub fn ping_with_latency(options: &PingOptions) -> Result<ModernPingData> {
    session::run(options)
}
