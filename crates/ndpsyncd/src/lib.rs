//! IPv6 NDP event synchronization daemon.
//!
//! This crate serializes IPv6 Neighbor Discovery events reported by the
//! TCP/IP engine into ordered updates of the stack's shared state: the
//! route table (default routers, on-link prefixes), the recursive DNS
//! server cache (RDNSS options), and DHCPv6 / address-configuration
//! telemetry.
//!
//! # Architecture
//!
//! ```text
//! TCP/IP engine callbacks          ndpsyncd                  shared state
//!
//!  on_default_router_*  ──┐   ┌───────────────┐   ┌──────────────────┐
//!  on_on_link_prefix_*  ──┤   │ NdpDispatcher │──▶│    RouteTable    │
//!  on_recursive_dns_*   ──┼──▶│  event queue  │   ├──────────────────┤
//!  on_auto_gen_address* ──┤   │  + worker     │──▶│  DnsServerCache  │
//!  on_dhcpv6_*          ──┘   └───────┬───────┘   └──────────────────┘
//!                                     │
//!                         ┌───────────▼────────────┐
//!                         │  AddressConfigTracker  │──▶ Metrics
//!                         │  (periodic sampler)    │
//!                         └────────────────────────┘
//! ```
//!
//! Callbacks may fire concurrently from any task; the dispatcher's single
//! worker applies their effects strictly in submission order. Only the
//! DHCPv6 counters and the address-configuration tracker are updated
//! synchronously at callback time, because they feed telemetry sampled on
//! a clock independent of queue drainage.

pub mod address_config;
pub mod config;
pub mod dispatcher;
pub mod dns_cache;
pub mod error;
pub mod event;
pub mod metrics;
pub mod route_table;

pub use address_config::{AddressConfig, AddressConfigTracker, SamplerConfig};
pub use config::Args;
pub use dispatcher::{DispatcherTasks, NdpDispatcher};
pub use dns_cache::{DnsServer, DnsServerCache, DNS_PORT, NDP_INFINITE_LIFETIME};
pub use error::{NdpsyncError, Result};
pub use event::{DadOutcome, Dhcpv6Config, NdpEvent};
pub use metrics::Metrics;
pub use route_table::{RouteEntry, RouteTable};
