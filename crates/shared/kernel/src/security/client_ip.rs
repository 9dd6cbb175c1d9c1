use std::net::{IpAddr, SocketAddr};

/// Whether `ip` is a routable public address (not private, loopback, link-local, shared or
/// unspecified). Only those are trusted when walking a proxy chain.
pub fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            // 100.64.0.0/10 carrier-grade NAT.
            let shared = a == 100 && (b & 0b1100_0000) == 64;
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || shared)
        },
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public(IpAddr::V4(v4));
            }
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unique_local()
                || v6.is_unicast_link_local())
        },
    }
}

/// Parses one hop of a forwarding header: bare addresses, `ip:port`, `[v6]:port` and
/// `v6%zone` forms are accepted.
fn parse_hop(hop: &str) -> Option<IpAddr> {
    let hop = hop.trim().trim_matches('"');
    if let Ok(addr) = hop.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    let hop = hop.trim_start_matches('[').trim_end_matches(']');
    let host = hop.split_once('%').map_or(hop, |(host, _zone)| host);
    host.parse().ok()
}

/// Resolves the client address for rate limiting.
///
/// The rightmost public address of `forwarded` (a comma separated proxy chain such as
/// `X-Forwarded-For`) wins. Without a forwarding header the socket peer is used. Returns `None`
/// when neither yields an address.
pub fn client_ip(forwarded: Option<&str>, peer: Option<SocketAddr>) -> Option<IpAddr> {
    match forwarded {
        Some(chain) if !chain.trim().is_empty() => {
            chain.rsplit(',').filter_map(parse_hop).find(|ip| is_public(*ip))
        },
        _ => peer.map(|addr| addr.ip()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rightmost_public_hop_wins() {
        let chain = "203.0.113.7, 198.51.100.2, 10.0.0.1";
        let ip = client_ip(Some(chain), None).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn private_only_chain_yields_nothing() {
        assert!(client_ip(Some("10.0.0.1, 192.168.1.1, 127.0.0.1"), None).is_none());
    }

    #[test]
    fn ports_and_zones_are_stripped() {
        assert_eq!(
            client_ip(Some("[2001:db8::1]:443"), None),
            Some("2001:db8::1".parse().unwrap())
        );
        assert_eq!(client_ip(Some("2001:db8::2%eth0"), None), Some("2001:db8::2".parse().unwrap()));
        assert_eq!(client_ip(Some("198.51.100.9:8080"), None), Some("198.51.100.9".parse().unwrap()));
    }

    #[test]
    fn peer_is_used_without_header() {
        let peer: SocketAddr = "127.0.0.1:5555".parse().unwrap();
        assert_eq!(client_ip(None, Some(peer)), Some(peer.ip()));
        assert_eq!(client_ip(Some("  "), Some(peer)), Some(peer.ip()));
        assert_eq!(client_ip(None, None), None);
    }

    #[test]
    fn shared_and_mapped_addresses_are_not_public() {
        assert!(!is_public("100.64.1.1".parse().unwrap()));
        assert!(!is_public("::ffff:10.0.0.1".parse().unwrap()));
        assert!(is_public("::ffff:198.51.100.1".parse().unwrap()));
        assert!(!is_public("fd00::1".parse().unwrap()));
        assert!(!is_public("fe80::1".parse().unwrap()));
    }
}
