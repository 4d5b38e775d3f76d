//! Shared IPv6 route table collaborator.
//!
//! The route table is owned by the stack assembly and shared between the
//! NDP worker and the RPC handlers that expose routes to clients, so it
//! carries its own lock; the dispatcher mutates it only through the
//! operations here.

use crate::error::{NdpsyncError, Result};
use netstack_types::{Ipv6Address, Ipv6Prefix, NicId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A route table entry, identified by the full (NIC, destination, gateway)
/// tuple.
///
/// Routes learned on different interfaces are independent even when their
/// destinations overlap; there is no cross-interface deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Interface the route goes through.
    pub nic: NicId,
    /// Destination subnet.
    pub destination: Ipv6Prefix,
    /// Next hop, or `None` for an on-link route.
    pub gateway: Option<Ipv6Address>,
}

impl RouteEntry {
    /// Default (::/0) route through `router` on `nic`.
    pub fn default_route(nic: NicId, router: Ipv6Address) -> Self {
        RouteEntry {
            nic,
            destination: Ipv6Prefix::DEFAULT,
            gateway: Some(router),
        }
    }

    /// On-link (no gateway) route to `subnet` via `nic`.
    pub fn on_link_route(nic: NicId, subnet: Ipv6Prefix) -> Self {
        RouteEntry {
            nic,
            destination: subnet,
            gateway: None,
        }
    }

    /// On-link route for the unicast link-local subnet, added on interface
    /// bring-up rather than NDP discovery.
    pub fn link_local_on_link_route(nic: NicId) -> Self {
        Self::on_link_route(nic, Ipv6Prefix::LINK_LOCAL)
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.gateway {
            Some(gateway) => write!(f, "{} via {} nic {}", self.destination, gateway, self.nic),
            None => write!(f, "{} on-link nic {}", self.destination, self.nic),
        }
    }
}

/// The shared IPv6 route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: RwLock<Vec<RouteEntry>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route. Inserting an entry identical to an installed one is a
    /// no-op. Returns true if the table changed.
    pub fn add_route(&self, entry: RouteEntry) -> bool {
        let mut routes = self.routes.write();
        if routes.contains(&entry) {
            return false;
        }
        routes.push(entry);
        true
    }

    /// Removes the route matching `entry` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`NdpsyncError::RouteNotFound`] if no installed route
    /// matches.
    pub fn del_route(&self, entry: RouteEntry) -> Result<()> {
        let mut routes = self.routes.write();
        match routes.iter().position(|r| *r == entry) {
            Some(i) => {
                routes.remove(i);
                Ok(())
            }
            None => Err(NdpsyncError::RouteNotFound(entry)),
        }
    }

    /// Removes every route through `nic`. Returns the number removed.
    pub fn del_nic_routes(&self, nic: NicId) -> usize {
        let mut routes = self.routes.write();
        let before = routes.len();
        routes.retain(|r| r.nic != nic);
        before - routes.len()
    }

    /// Returns a point-in-time copy of the route table.
    pub fn route_table(&self) -> Vec<RouteEntry> {
        self.routes.read().clone()
    }

    /// Returns true if `entry` is installed.
    pub fn contains(&self, entry: &RouteEntry) -> bool {
        self.routes.read().contains(entry)
    }
}
