//! Per-interface recursive DNS server tracking.
//!
//! Servers learned from NDP Router Advertisements are tracked per
//! (interface, address) with an expiry deadline. Expiry is evaluated lazily
//! on the read path; records linger internally past their deadline until
//! the next query. There is no background sweep.

use netstack_types::{Ipv6Address, NicId};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Port DNS servers are reached on.
pub const DNS_PORT: u16 = 53;

/// The NDP wire value meaning "never expires": 0xffff_ffff seconds.
///
/// Any advertised lifetime at or above the configured sentinel is treated
/// as infinite. The sentinel is configurable so tests can exercise the
/// infinite path with short clock advances.
pub const NDP_INFINITE_LIFETIME: Duration = Duration::from_secs(u32::MAX as u64);

/// A recursive DNS server visible to resolver clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DnsServer {
    /// Server address.
    pub address: Ipv6Address,
    /// Server port (always [`DNS_PORT`] for NDP-learned servers).
    pub port: u16,
    /// Interface the server was learned on.
    pub nic: NicId,
}

#[derive(Debug, Clone, Copy)]
struct ServerState {
    /// Deadline after which the record is dead, or `None` for an
    /// explicitly-withdrawn-only record.
    expiry: Option<Instant>,
    /// Discovery order within the cache, stable across refreshes.
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    servers: HashMap<(NicId, Ipv6Address), ServerState>,
    next_seq: u64,
}

/// The global recursive DNS server cache: the union of all live records
/// across interfaces.
///
/// Shared between the NDP worker (writes) and the resolver RPC surface
/// (reads), so it carries its own lock.
#[derive(Debug)]
pub struct DnsServerCache {
    inner: Mutex<Inner>,
    infinite_lifetime: Duration,
}

impl Default for DnsServerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsServerCache {
    pub fn new() -> Self {
        Self::with_infinite_lifetime(NDP_INFINITE_LIFETIME)
    }

    /// Creates a cache treating lifetimes at or above `infinite_lifetime`
    /// as never-expiring.
    pub fn with_infinite_lifetime(infinite_lifetime: Duration) -> Self {
        DnsServerCache {
            inner: Mutex::new(Inner::default()),
            infinite_lifetime,
        }
    }

    /// Applies a Recursive DNS Server option for `nic`.
    ///
    /// A zero lifetime withdraws exactly the listed addresses. Otherwise
    /// each address is inserted or refreshed with a new deadline (or no
    /// deadline, if the lifetime reaches the infinite sentinel). Tracked
    /// addresses absent from `addresses` are left untouched.
    pub fn update_servers(&self, nic: NicId, addresses: &[Ipv6Address], lifetime: Duration) {
        let mut inner = self.inner.lock();

        if lifetime.is_zero() {
            for addr in addresses {
                if inner.servers.remove(&(nic, *addr)).is_some() {
                    debug!(nic = %nic, address = %addr, "withdrew DNS server");
                }
            }
            return;
        }

        let expiry = if lifetime >= self.infinite_lifetime {
            None
        } else {
            Some(Instant::now() + lifetime)
        };

        for addr in addresses {
            let next_seq = inner.next_seq;
            let state = inner
                .servers
                .entry((nic, *addr))
                .and_modify(|state| state.expiry = expiry)
                .or_insert(ServerState {
                    expiry,
                    seq: next_seq,
                });
            if state.seq == next_seq {
                inner.next_seq += 1;
                debug!(nic = %nic, address = %addr, ?lifetime, "learned DNS server");
            }
        }
    }

    /// Drops every record learned on `nic`, regardless of remaining
    /// lifetime. Called on interface down and removal.
    pub fn remove_nic(&self, nic: NicId) {
        let mut inner = self.inner.lock();
        let before = inner.servers.len();
        inner.servers.retain(|(server_nic, _), _| *server_nic != nic);
        let removed = before - inner.servers.len();
        if removed > 0 {
            debug!(nic = %nic, removed, "purged DNS servers for interface");
        }
    }

    /// Point-in-time, expiry-filtered view of the cache, ordered by NIC
    /// then discovery order.
    pub fn servers(&self) -> Vec<DnsServer> {
        let now = Instant::now();
        let inner = self.inner.lock();

        let mut live: Vec<(&(NicId, Ipv6Address), &ServerState)> = inner
            .servers
            .iter()
            .filter(|(_, state)| state.expiry.map_or(true, |deadline| deadline > now))
            .collect();
        live.sort_by_key(|((nic, _), state)| (*nic, state.seq));

        live.into_iter()
            .map(|((nic, address), _)| DnsServer {
                address: *address,
                port: DNS_PORT,
                nic: *nic,
            })
            .collect()
    }
}
