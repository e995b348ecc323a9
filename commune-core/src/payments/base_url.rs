//! Base-URL resolution for self-referencing links.
//!
//! Mock checkout and callback URLs must be reachable from the payer's
//! device. When the server is addressed through a loopback hostname, a
//! mobile payment app on the same network could never call back, so the
//! loopback host is replaced by a LAN-reachable IPv4 address unless an
//! explicit public base URL is configured.

use crate::config::PaymentsConfig;
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use url::Url;

/// Resolve the base URL for links generated on behalf of one request.
pub fn resolve_base_url(
    config: &PaymentsConfig,
    request_host: Option<&str>,
    fallback_port: u16,
) -> Result<Url, url::ParseError> {
    if let Some(base) = &config.public_base_url {
        return Ok(base.clone());
    }

    let host = request_host.unwrap_or("localhost");
    let (name, port) = split_host_port(host);

    if is_loopback_host(name) {
        let ip = config
            .lan_ip
            .or_else(detect_lan_ip)
            .unwrap_or(Ipv4Addr::LOCALHOST);
        let port = port.unwrap_or(fallback_port);
        Url::parse(&format!("http://{ip}:{port}"))
    } else {
        let name = bracket_ipv6(name);
        match port {
            Some(port) => Url::parse(&format!("http://{name}:{port}")),
            None => Url::parse(&format!("http://{name}")),
        }
    }
}

fn split_host_port(host: &str) -> (&str, Option<u16>) {
    if let Some(rest) = host.strip_prefix('[') {
        if let Some((name, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (name, port);
        }
    }
    // A host with more than one colon is a bare IPv6 address, not host:port.
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') => (name, port.parse().ok()),
        _ => (host, None),
    }
}

/// Re-bracket IPv6 host names so they parse back as a URL authority.
fn bracket_ipv6(name: &str) -> Cow<'_, str> {
    if name.contains(':') {
        Cow::Owned(format!("[{name}]"))
    } else {
        Cow::Borrowed(name)
    }
}

fn is_loopback_host(name: &str) -> bool {
    name.eq_ignore_ascii_case("localhost")
        || name.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
}

/// Pick the local IPv4 address that routes toward the internet.
///
/// Connecting a UDP socket sends no packets; it only makes the OS select
/// an outbound interface.
fn detect_lan_ip() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() => Some(ip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_lan_ip() -> PaymentsConfig {
        PaymentsConfig {
            lan_ip: "192.168.1.42".parse().ok(),
            ..PaymentsConfig::default()
        }
    }

    #[test]
    fn explicit_override_wins() {
        let config = PaymentsConfig {
            public_base_url: Url::parse("https://commune.example.org").ok(),
            ..config_with_lan_ip()
        };
        let url = resolve_base_url(&config, Some("localhost:8080"), 8080).expect("base url");
        assert_eq!(url.as_str(), "https://commune.example.org/");
    }

    #[test]
    fn loopback_host_is_replaced_by_lan_ip() {
        let config = config_with_lan_ip();
        for host in ["localhost:3000", "127.0.0.1:3000", "[::1]:3000"] {
            let url = resolve_base_url(&config, Some(host), 8080).expect("base url");
            assert_eq!(url.as_str(), "http://192.168.1.42:3000/", "host {host}");
        }
    }

    #[test]
    fn loopback_without_port_uses_fallback_port() {
        let config = config_with_lan_ip();
        let url = resolve_base_url(&config, Some("localhost"), 8080).expect("base url");
        assert_eq!(url.as_str(), "http://192.168.1.42:8080/");
    }

    #[test]
    fn public_host_passes_through() {
        let config = config_with_lan_ip();
        let url =
            resolve_base_url(&config, Some("commune.example.org:8080"), 8080).expect("base url");
        assert_eq!(url.as_str(), "http://commune.example.org:8080/");
    }

    #[test]
    fn ipv6_hosts_keep_their_brackets() {
        let config = config_with_lan_ip();

        let url = resolve_base_url(&config, Some("[2001:db8::1]:8080"), 8080).expect("base url");
        assert_eq!(url.as_str(), "http://[2001:db8::1]:8080/");

        // Bare IPv6 in the Host header, no brackets and no port.
        let url = resolve_base_url(&config, Some("2001:db8::1"), 8080).expect("base url");
        assert_eq!(url.as_str(), "http://[2001:db8::1]/");
    }

    #[test]
    fn missing_host_header_counts_as_loopback() {
        let config = config_with_lan_ip();
        let url = resolve_base_url(&config, None, 9000).expect("base url");
        assert_eq!(url.as_str(), "http://192.168.1.42:9000/");
    }
}
