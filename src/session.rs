use std::{io, net::{SocketAddr, TcpStream}, time::Duration};

use log::{debug, warn};

use crate::{
    error::{PingError, Result},
    options::PingOptions,
    pinging::{
        mc_modern::{ModernPingData, ModernPinger},
        Pinger,
    },
    resolution::resolve_minecraft_addrs,
};

/// Validates `options`, connects and runs the status exchange. The
/// connection is closed before this returns.
pub fn run(options: &PingOptions) -> Result<ModernPingData> {
    validate(options)?;

    let stream = connect(options)?;
    if let Some(timeout) = options.read_timeout {
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
    }

    let pinger = ModernPinger {
        protocol_version: options.protocol_version,
        hostname: options.hostname.clone(),
        port: options.port,
        charset: options.charset,
    };
    pinger.ping(stream)
}

fn validate(options: &PingOptions) -> Result<()> {
    if options.hostname.trim().is_empty() {
        return Err(PingError::Validation("Hostname cannot be empty."));
    }
    if options.read_timeout == Some(Duration::ZERO) {
        return Err(PingError::Validation("Read timeout cannot be zero."));
    }
    Ok(())
}

fn connect(options: &PingOptions) -> Result<TcpStream> {
    let connection_error = |source: io::Error| PingError::Connection {
        address: options.address(),
        source,
    };

    let addrs = resolve_minecraft_addrs(&options.hostname, options.port, options.srv_lookup)
        .map_err(connection_error)?;

    let mut last_error = None;
    for addr in addrs {
        match connect_one(addr, options.timeout) {
            Ok(stream) => {
                debug!("connected to {} ({})", options.address(), addr);
                return Ok(stream);
            }
            Err(e) => {
                warn!("could not connect to {}: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(connection_error(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no address to connect to")
    })))
}

fn connect_one(addr: SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    if timeout.is_zero() {
        TcpStream::connect(addr)
    } else {
        TcpStream::connect_timeout(&addr, timeout)
    }
}
