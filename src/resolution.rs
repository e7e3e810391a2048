use std::{
    io::{self, ErrorKind},
    net::{IpAddr, SocketAddr, ToSocketAddrs},
};

use log::debug;
use trust_dns_resolver::{error::ResolveError, Resolver};

/// Resolves the addresses to try for `hostname:port`, in order.
///
/// With `srv_lookup`, the `_minecraft._tcp` SRV records of a host name take
/// precedence; without any, plain address resolution is used.
pub fn resolve_minecraft_addrs(hostname: &str, port: u16, srv_lookup: bool) -> io::Result<Vec<SocketAddr>> {
    if srv_lookup && hostname.parse::<IpAddr>().is_err() {
        let resolved = resolve_srv(hostname)?;
        if !resolved.is_empty() {
            debug!("{} resolved through SRV to {:?}", hostname, resolved);
            return Ok(resolved);
        }
    }

    let resolved: Vec<SocketAddr> = (hostname, port).to_socket_addrs()?.collect();
    if resolved.is_empty() {
        return Err(io::Error::new(ErrorKind::NotFound, "host name resolved to no addresses"));
    }
    debug!("{}:{} resolved to {:?}", hostname, port, resolved);
    Ok(resolved)
}

fn resolve_srv(hostname: &str) -> io::Result<Vec<SocketAddr>> {
    let resolver = Resolver::from_system_conf()?;

    let srv = match resolver.srv_lookup(format!("_minecraft._tcp.{}", hostname)) {
        Ok(srv) => srv,
        Err(e) => {
            debug!("no SRV record for {}: {}", hostname, e);
            return Ok(vec![]);
        }
    };

    let mut records: Vec<_> = srv.iter().collect();
    records.sort_by_key(|record| record.priority());

    let mut resolved_addresses = vec![];
    for record in records {
        let target = resolver.lookup_ip(record.target().clone()).map_err(resolve_error)?;

        for address in target.iter() {
            resolved_addresses.push(SocketAddr::new(address, record.port()));
        }
    }

    Ok(resolved_addresses)
}

fn resolve_error(e: ResolveError) -> io::Error {
    io::Error::new(ErrorKind::Other, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_literals_skip_lookup() {
        let addrs = resolve_minecraft_addrs("127.0.0.1", 25565, true).unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:25565".parse::<SocketAddr>().unwrap()]);
    }

    #[test]
    fn plain_resolution_keeps_port() {
        let addrs = resolve_minecraft_addrs("localhost", 4321, false).unwrap();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|addr| addr.port() == 4321));
    }
}
