//! Canonical address keys shared by SOCKADDR and NETFILTER_PKT records
//!
//! The two record types encode a destination differently:
//! - SOCKADDR carries the raw `struct sockaddr_in` bytes as one hex string
//!   (port at hex offset 4..8, IPv4 address at hex offset 40..48)
//! - NETFILTER_PKT carries a dotted-quad `daddr` and a decimal `dport`
//!
//! Both are normalized to `IIIIIIII:PPPP` (uppercase hex, fixed width) so that
//! records referring to the same endpoint compare equal.

use crate::error::{DelayError, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// Minimum `saddr` length holding both the port and the IPv4 address
pub const MIN_SADDR_LEN: usize = 48;

const PORT_RANGE: std::ops::Range<usize> = 4..8;
const IP_RANGE: std::ops::Range<usize> = 40..48;

/// Canonical `{IP_HEX}:{PORT_HEX}` key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressKey(String);

impl AddressKey {
    /// Build a key from an IPv4 address and port
    pub fn from_socket(ip: Ipv4Addr, port: u16) -> Self {
        let [a, b, c, d] = ip.octets();
        Self(format!("{a:02X}{b:02X}{c:02X}{d:02X}:{port:04X}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode the hex `saddr` field of a SOCKADDR record
///
/// Fails with [`DelayError::MalformedAddress`] when the field is shorter than
/// [`MIN_SADDR_LEN`] or the port/address digits are not hex.
pub fn encode_from_sockaddr(raw: &str) -> Result<AddressKey> {
    let malformed = || DelayError::MalformedAddress { len: raw.len() };

    if raw.len() < MIN_SADDR_LEN {
        return Err(malformed());
    }

    let port = raw.get(PORT_RANGE).ok_or_else(malformed)?;
    let ip = raw.get(IP_RANGE).ok_or_else(malformed)?;

    if !port.bytes().chain(ip.bytes()).all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    Ok(AddressKey(format!(
        "{}:{}",
        ip.to_ascii_uppercase(),
        port.to_ascii_uppercase()
    )))
}

/// Encode the `daddr`/`dport` fields of a NETFILTER_PKT record
pub fn encode_from_netfilter(daddr: &str, dport: &str) -> Result<AddressKey> {
    let malformed = || DelayError::MalformedNetfilter {
        daddr: daddr.to_string(),
        dport: dport.to_string(),
    };

    let ip: Ipv4Addr = daddr.parse().map_err(|_| malformed())?;
    let port: u16 = dport.parse().map_err(|_| malformed())?;

    Ok(AddressKey::from_socket(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// AF_INET sockaddr layout, exactly 48 hex digits
    fn saddr_for(ip_hex: &str, port_hex: &str) -> String {
        format!("0200{port_hex}{}{ip_hex}", "0".repeat(32))
    }

    #[test]
    fn test_sockaddr_extracts_ip_and_port() {
        let raw = saddr_for("0A000001", "1F90");
        assert_eq!(raw.len(), MIN_SADDR_LEN);
        let key = encode_from_sockaddr(&raw).unwrap();
        assert_eq!(key.as_str(), "0A000001:1F90");
    }

    #[test]
    fn test_sockaddr_uppercases_digits() {
        let raw = saddr_for("c0a80a0f", "01bb");
        let key = encode_from_sockaddr(&raw).unwrap();
        assert_eq!(key.as_str(), "C0A80A0F:01BB");
    }

    #[test]
    fn test_sockaddr_ignores_trailing_digits() {
        let raw = format!("{}{}", saddr_for("0A000001", "1F90"), "DEADBEEF");
        let key = encode_from_sockaddr(&raw).unwrap();
        assert_eq!(key.as_str(), "0A000001:1F90");
    }

    #[test]
    fn test_sockaddr_too_short_is_malformed() {
        // AF_UNIX socket path, far too short for an IPv4 layout
        let err = encode_from_sockaddr("01002F746D70").unwrap_err();
        assert!(matches!(err, DelayError::MalformedAddress { len: 12 }));
    }

    #[test]
    fn test_sockaddr_47_digits_is_malformed() {
        let raw = "0".repeat(47);
        assert!(encode_from_sockaddr(&raw).is_err());
    }

    #[test]
    fn test_sockaddr_non_hex_is_malformed() {
        let raw = saddr_for("0A00ZZ01", "1F90");
        assert!(matches!(
            encode_from_sockaddr(&raw),
            Err(DelayError::MalformedAddress { .. })
        ));
    }

    #[test]
    fn test_netfilter_encoding() {
        let key = encode_from_netfilter("10.0.0.1", "8080").unwrap();
        assert_eq!(key.as_str(), "0A000001:1F90");
    }

    #[test]
    fn test_netfilter_pads_small_values() {
        let key = encode_from_netfilter("1.2.3.4", "5").unwrap();
        assert_eq!(key.as_str(), "01020304:0005");
    }

    #[test]
    fn test_netfilter_out_of_range_octet() {
        assert!(matches!(
            encode_from_netfilter("10.0.0.256", "80"),
            Err(DelayError::MalformedNetfilter { .. })
        ));
    }

    #[test]
    fn test_netfilter_out_of_range_port() {
        assert!(encode_from_netfilter("10.0.0.1", "65536").is_err());
    }

    #[test]
    fn test_both_encoders_agree() {
        let from_sock = encode_from_sockaddr(&saddr_for("5BBD59C7", "E31B")).unwrap();
        let from_nf = encode_from_netfilter("91.189.89.199", "58139").unwrap();
        assert_eq!(from_sock, from_nf);
    }

    #[test]
    fn test_display_matches_as_str() {
        let key = AddressKey::from_socket(Ipv4Addr::new(127, 0, 0, 1), 443);
        assert_eq!(key.to_string(), "7F000001:01BB");
    }
}
