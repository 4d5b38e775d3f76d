//! IPv6 address and prefix types with safe parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// An IPv6 address wrapper with classification helpers used by the NDP
/// control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv6Address(Ipv6Addr);

impl Ipv6Address {
    pub const UNSPECIFIED: Self = Ipv6Address(Ipv6Addr::UNSPECIFIED);
    pub const LOCALHOST: Self = Ipv6Address(Ipv6Addr::LOCALHOST);

    #[allow(clippy::too_many_arguments)]
    pub const fn new(a: u16, b: u16, c: u16, d: u16, e: u16, f: u16, g: u16, h: u16) -> Self {
        Ipv6Address(Ipv6Addr::new(a, b, c, d, e, f, g, h))
    }

    pub const fn inner(&self) -> Ipv6Addr {
        self.0
    }

    pub const fn octets(&self) -> [u8; 16] {
        self.0.octets()
    }

    pub const fn segments(&self) -> [u16; 8] {
        self.0.segments()
    }

    /// Returns true if this is a unicast link-local address (fe80::/10).
    pub fn is_unicast_link_local(&self) -> bool {
        (self.segments()[0] & 0xffc0) == 0xfe80
    }

    /// Returns true if this is a multicast address (ff00::/8).
    pub fn is_multicast(&self) -> bool {
        (self.segments()[0] & 0xff00) == 0xff00
    }

    /// Returns true if this address counts as a global unicast address for
    /// the purposes of address-configuration tracking.
    ///
    /// Link-local, multicast, loopback, and unspecified addresses are not
    /// global.
    pub fn is_global(&self) -> bool {
        !self.is_unicast_link_local()
            && !self.is_multicast()
            && self.0 != Ipv6Addr::LOCALHOST
            && self.0 != Ipv6Addr::UNSPECIFIED
    }
}

impl fmt::Display for Ipv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv6Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv6Addr>()
            .map(Ipv6Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<Ipv6Addr> for Ipv6Address {
    fn from(addr: Ipv6Addr) -> Self {
        Ipv6Address(addr)
    }
}

impl From<Ipv6Address> for Ipv6Addr {
    fn from(addr: Ipv6Address) -> Self {
        addr.0
    }
}

/// An IPv6 prefix in CIDR notation (e.g., `2001:db8::/32`).
///
/// The address is normalized to the network address on construction, so two
/// prefixes covering the same subnet always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv6Prefix {
    address: Ipv6Address,
    prefix_len: u8,
}

impl Ipv6Prefix {
    /// The default route destination, `::/0`.
    pub const DEFAULT: Self = Ipv6Prefix {
        address: Ipv6Address::UNSPECIFIED,
        prefix_len: 0,
    };

    /// The on-link prefix covering unicast link-local addresses,
    /// `fe80::/64`.
    pub const LINK_LOCAL: Self = Ipv6Prefix {
        address: Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 0),
        prefix_len: 64,
    };

    /// Creates a new prefix, masking any host bits off the address.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length exceeds 128.
    pub fn new(address: Ipv6Address, prefix_len: u8) -> Result<Self, ParseError> {
        if prefix_len > 128 {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum 128",
                prefix_len
            )));
        }

        Ok(Ipv6Prefix {
            address: mask_address(address, prefix_len),
            prefix_len,
        })
    }

    /// Returns the network address of this prefix.
    pub const fn address(&self) -> &Ipv6Address {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if this is the default route destination (`::/0`).
    pub const fn is_default(&self) -> bool {
        self.prefix_len == 0
    }

    /// Returns true if the given address falls within this prefix.
    pub fn contains(&self, addr: &Ipv6Address) -> bool {
        mask_address(*addr, self.prefix_len) == self.address
    }
}

fn mask_address(address: Ipv6Address, prefix_len: u8) -> Ipv6Address {
    let mask = if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix_len))
    };
    Ipv6Address::from(Ipv6Addr::from(u128::from(address.inner()) & mask))
}

impl fmt::Display for Ipv6Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Ipv6Prefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;

        let address: Ipv6Address = addr_str.parse()?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        Ipv6Prefix::new(address, prefix_len)
    }
}

/// A full IPv6 address together with its on-link prefix length, as produced
/// by SLAAC address autoconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv6AddressWithPrefix {
    /// The assigned address.
    pub address: Ipv6Address,
    /// Length of the on-link prefix the address was derived from.
    pub prefix_len: u8,
}

impl Ipv6AddressWithPrefix {
    pub const fn new(address: Ipv6Address, prefix_len: u8) -> Self {
        Ipv6AddressWithPrefix {
            address,
            prefix_len,
        }
    }

    /// Returns the subnet this address belongs to.
    pub fn subnet(&self) -> Ipv6Prefix {
        // prefix_len came from a valid address-with-prefix, new cannot fail.
        Ipv6Prefix::new(self.address, self.prefix_len.min(128))
            .unwrap_or(Ipv6Prefix::DEFAULT)
    }
}

impl fmt::Display for Ipv6AddressWithPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ipv6_parse() {
        let addr: Ipv6Address = "2001:db8::1".parse().unwrap();
        assert_eq!(addr.segments()[0], 0x2001);
        assert_eq!(addr.segments()[1], 0x0db8);
    }

    #[test]
    fn test_ipv6_link_local() {
        let link_local: Ipv6Address = "fe80::1".parse().unwrap();
        assert!(link_local.is_unicast_link_local());
        assert!(!link_local.is_global());

        let global: Ipv6Address = "2001:db8::1".parse().unwrap();
        assert!(!global.is_unicast_link_local());
        assert!(global.is_global());
    }

    #[test]
    fn test_ipv6_special_not_global() {
        assert!(!Ipv6Address::UNSPECIFIED.is_global());
        assert!(!Ipv6Address::LOCALHOST.is_global());

        let multicast: Ipv6Address = "ff02::1".parse().unwrap();
        assert!(multicast.is_multicast());
        assert!(!multicast.is_global());
    }

    #[test]
    fn test_prefix_parse_and_display() {
        let prefix: Ipv6Prefix = "abcd:1234::/32".parse().unwrap();
        assert_eq!(prefix.prefix_len(), 32);
        assert_eq!(prefix.to_string(), "abcd:1234::/32");
    }

    #[test]
    fn test_prefix_normalizes_host_bits() {
        let prefix: Ipv6Prefix = "2001:db8::dead:beef/32".parse().unwrap();
        let network: Ipv6Prefix = "2001:db8::/32".parse().unwrap();
        assert_eq!(prefix, network);
    }

    #[test]
    fn test_prefix_invalid_length() {
        assert!("2001:db8::/129".parse::<Ipv6Prefix>().is_err());
        assert!(Ipv6Prefix::new(Ipv6Address::UNSPECIFIED, 129).is_err());
    }

    #[test]
    fn test_prefix_contains() {
        let prefix: Ipv6Prefix = "abcd:1234::/32".parse().unwrap();
        assert!(prefix.contains(&"abcd:1234::1".parse().unwrap()));
        assert!(!prefix.contains(&"abcd:1236::1".parse().unwrap()));

        assert!(Ipv6Prefix::DEFAULT.contains(&"2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_link_local_prefix() {
        assert_eq!(Ipv6Prefix::LINK_LOCAL.to_string(), "fe80::/64");
        assert!(Ipv6Prefix::LINK_LOCAL.contains(&"fe80::1".parse().unwrap()));
    }

    #[test]
    fn test_address_with_prefix_subnet() {
        let awp = Ipv6AddressWithPrefix::new("abcd:ee00::1".parse().unwrap(), 64);
        assert_eq!(awp.to_string(), "abcd:ee00::1/64");
        assert_eq!(awp.subnet(), "abcd:ee00::/64".parse().unwrap());
    }
}
