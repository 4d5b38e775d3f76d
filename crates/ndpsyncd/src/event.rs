//! NDP event types.
//!
//! One variant per engine callback. Events are produced by the trusted
//! TCP/IP engine callback surface, so no validation layer exists here;
//! payloads are well-formed by construction.

use netstack_types::{Ipv6Address, Ipv6AddressWithPrefix, Ipv6Prefix, NicId};
use std::fmt;
use std::time::Duration;

/// Outcome of Duplicate Address Detection for a tentative address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DadOutcome {
    /// The address is unique on the link and was assigned.
    Succeeded,
    /// Another node already uses the address.
    DuplicateFound,
    /// DAD could not complete (e.g., the link failed mid-probe).
    Error,
}

impl fmt::Display for DadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DadOutcome::Succeeded => write!(f, "succeeded"),
            DadOutcome::DuplicateFound => write!(f, "duplicate found"),
            DadOutcome::Error => write!(f, "error"),
        }
    }
}

/// DHCPv6 configuration signaled by a Router Advertisement's M and O flags.
///
/// The latest value received for an interface wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dhcpv6Config {
    /// Neither addresses nor other configuration are available via DHCPv6.
    NoConfiguration,
    /// Addresses (and possibly other configuration) are available via
    /// DHCPv6.
    ManagedAddress,
    /// Only non-address configuration (e.g., DNS) is available via DHCPv6.
    OtherConfigurations,
}

impl fmt::Display for Dhcpv6Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dhcpv6Config::NoConfiguration => write!(f, "no configuration"),
            Dhcpv6Config::ManagedAddress => write!(f, "managed address"),
            Dhcpv6Config::OtherConfigurations => write!(f, "other configurations"),
        }
    }
}

/// An event queued by the dispatcher's callback surface and applied, one at
/// a time and in submission order, by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NdpEvent {
    /// Duplicate Address Detection completed for a tentative address.
    DadResult {
        nic: NicId,
        address: Ipv6Address,
        outcome: DadOutcome,
    },

    /// A default router was discovered via a Router Advertisement.
    DefaultRouterDiscovered { nic: NicId, router: Ipv6Address },

    /// A previously discovered default router's lifetime elapsed or was
    /// zeroed.
    DefaultRouterInvalidated { nic: NicId, router: Ipv6Address },

    /// An on-link prefix was discovered via a Prefix Information option.
    OnLinkPrefixDiscovered { nic: NicId, subnet: Ipv6Prefix },

    /// A previously discovered on-link prefix was invalidated.
    OnLinkPrefixInvalidated { nic: NicId, subnet: Ipv6Prefix },

    /// An address was generated via SLAAC.
    AutoGenAddress {
        nic: NicId,
        address: Ipv6AddressWithPrefix,
    },

    /// A SLAAC address's preferred lifetime elapsed.
    AutoGenAddressDeprecated {
        nic: NicId,
        address: Ipv6AddressWithPrefix,
    },

    /// A SLAAC address's valid lifetime elapsed; the address was removed.
    AutoGenAddressInvalidated {
        nic: NicId,
        address: Ipv6AddressWithPrefix,
    },

    /// A Recursive DNS Server option was received.
    ///
    /// A zero lifetime withdraws the listed addresses.
    RecursiveDnsServers {
        nic: NicId,
        addresses: Vec<Ipv6Address>,
        lifetime: Duration,
    },

    /// A DNS Search List option was received. Tracked but not consumed by
    /// route or DNS-cache logic.
    DnsSearchList {
        nic: NicId,
        domains: Vec<String>,
        lifetime: Duration,
    },

    /// A Router Advertisement signaled DHCPv6 availability.
    Dhcpv6Configuration { nic: NicId, config: Dhcpv6Config },

    /// An interface was administratively enabled and its link came up.
    InterfaceEnabled { nic: NicId },

    /// An interface went down; its learned DNS servers are withdrawn.
    InterfaceDisabled { nic: NicId },

    /// An interface was removed from the stack.
    InterfaceRemoved { nic: NicId },
}

impl NdpEvent {
    /// Returns the interface the event pertains to.
    pub fn nic(&self) -> NicId {
        match self {
            NdpEvent::DadResult { nic, .. }
            | NdpEvent::DefaultRouterDiscovered { nic, .. }
            | NdpEvent::DefaultRouterInvalidated { nic, .. }
            | NdpEvent::OnLinkPrefixDiscovered { nic, .. }
            | NdpEvent::OnLinkPrefixInvalidated { nic, .. }
            | NdpEvent::AutoGenAddress { nic, .. }
            | NdpEvent::AutoGenAddressDeprecated { nic, .. }
            | NdpEvent::AutoGenAddressInvalidated { nic, .. }
            | NdpEvent::RecursiveDnsServers { nic, .. }
            | NdpEvent::DnsSearchList { nic, .. }
            | NdpEvent::Dhcpv6Configuration { nic, .. }
            | NdpEvent::InterfaceEnabled { nic }
            | NdpEvent::InterfaceDisabled { nic }
            | NdpEvent::InterfaceRemoved { nic } => *nic,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            NdpEvent::DadResult { .. } => "dad_result",
            NdpEvent::DefaultRouterDiscovered { .. } => "default_router_discovered",
            NdpEvent::DefaultRouterInvalidated { .. } => "default_router_invalidated",
            NdpEvent::OnLinkPrefixDiscovered { .. } => "on_link_prefix_discovered",
            NdpEvent::OnLinkPrefixInvalidated { .. } => "on_link_prefix_invalidated",
            NdpEvent::AutoGenAddress { .. } => "auto_gen_address",
            NdpEvent::AutoGenAddressDeprecated { .. } => "auto_gen_address_deprecated",
            NdpEvent::AutoGenAddressInvalidated { .. } => "auto_gen_address_invalidated",
            NdpEvent::RecursiveDnsServers { .. } => "recursive_dns_servers",
            NdpEvent::DnsSearchList { .. } => "dns_search_list",
            NdpEvent::Dhcpv6Configuration { .. } => "dhcpv6_configuration",
            NdpEvent::InterfaceEnabled { .. } => "interface_enabled",
            NdpEvent::InterfaceDisabled { .. } => "interface_disabled",
            NdpEvent::InterfaceRemoved { .. } => "interface_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_nic() {
        let nic = NicId::new(3);
        let event = NdpEvent::DefaultRouterDiscovered {
            nic,
            router: "fe80::1".parse().unwrap(),
        };
        assert_eq!(event.nic(), nic);
        assert_eq!(event.kind(), "default_router_discovered");
    }

    #[test]
    fn test_dhcpv6_config_display() {
        assert_eq!(Dhcpv6Config::ManagedAddress.to_string(), "managed address");
        assert_eq!(DadOutcome::DuplicateFound.to_string(), "duplicate found");
    }
}
