use std::time::Duration;

use crate::charset::Charset;

pub const DEFAULT_PORT: u16 = 25565;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);
/// Protocol version announced in the handshake.
pub const DEFAULT_PROTOCOL_VERSION: i32 = 4;

/// Configuration for pinging a server.
///
/// # Examples
///
/// ```
/// use mcstatus::{Charset, PingOptions};
/// use std::time::Duration;
///
/// let options = PingOptions::new("mc.example.net")
///     .with_port(25566)
///     .with_timeout(Duration::from_secs(5))
///     .with_charset(Charset::Utf8);
/// assert_eq!(options.port, 25566);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PingOptions {
    /// Host name or IP address. Also sent verbatim in the handshake.
    pub hostname: String,
    pub port: u16,
    /// Bound on establishing the connection. Zero waits indefinitely.
    pub timeout: Duration,
    /// Encoding of the status JSON.
    pub charset: Charset,
    pub protocol_version: i32,
    /// Applied to every read and write once connected.
    pub read_timeout: Option<Duration>,
    /// Look up `_minecraft._tcp.<hostname>` before plain address resolution.
    pub srv_lookup: bool,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            charset: Charset::default(),
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            read_timeout: None,
            srv_lookup: false,
        }
    }
}

impl PingOptions {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_protocol_version(mut self, protocol_version: i32) -> Self {
        self.protocol_version = protocol_version;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_srv_lookup(mut self, srv_lookup: bool) -> Self {
        self.srv_lookup = srv_lookup;
        self
    }

    /// `host:port`, for messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}
