//! Common value types shared by the netstack control-plane daemons.
//!
//! This crate provides the small, copyable identifiers the NDP glue is
//! keyed on:
//!
//! - [`NicId`]: network interface identifier
//! - [`Ipv6Address`]: IPv6 address with link-local/global classification
//! - [`Ipv6Prefix`]: an IPv6 subnet in CIDR notation
//! - [`Ipv6AddressWithPrefix`]: a full address plus its on-link prefix
//!   length, as produced by address autoconfiguration

pub mod ip;
pub mod nic;

pub use ip::{Ipv6Address, Ipv6AddressWithPrefix, Ipv6Prefix};
pub use nic::NicId;

use thiserror::Error;

/// Errors produced when parsing netstack value types from strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The string is not a valid IPv6 address.
    #[error("invalid IPv6 address: {0}")]
    InvalidIpAddress(String),

    /// The string is not a valid IPv6 prefix, or the prefix length is out
    /// of range.
    #[error("invalid IPv6 prefix: {0}")]
    InvalidIpPrefix(String),
}
