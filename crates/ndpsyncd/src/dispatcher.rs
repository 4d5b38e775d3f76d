//! The NDP event dispatcher.
//!
//! The TCP/IP engine invokes the callback surface here from arbitrary task
//! contexts whenever NDP-relevant packets are processed or interface state
//! changes. Each callback describes the event, enqueues it, and returns
//! immediately; a single worker drains the queue in submission order and
//! applies each event's effect against the route table, DNS cache, and
//! address-configuration tracker. The single-consumer discipline means no
//! locking is needed between different NDP effect types; the route table
//! and DNS cache carry their own locks because other subsystems share
//! them.
//!
//! The two discovery callbacks answer the engine synchronously: discovery
//! is always accepted for remembering so that a later invalidation has a
//! matching record to remove. Acceptance is unconditional and independent
//! of queue drainage.

use crate::address_config::{AddressConfigTracker, SamplerConfig};
use crate::dns_cache::DnsServerCache;
use crate::error::{NdpsyncError, Result};
use crate::event::{DadOutcome, Dhcpv6Config, NdpEvent};
use crate::metrics::Metrics;
use crate::route_table::{RouteEntry, RouteTable};
use netstack_types::{Ipv6Address, Ipv6AddressWithPrefix, Ipv6Prefix, NicId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handles to the dispatcher's background tasks.
#[derive(Debug)]
pub struct DispatcherTasks {
    /// The event worker.
    pub worker: JoinHandle<()>,
    /// The address-configuration sampler.
    pub sampler: JoinHandle<()>,
}

/// Serializes concurrent NDP callbacks into ordered, idempotent mutations
/// of the shared routing and naming state.
pub struct NdpDispatcher {
    events_tx: mpsc::UnboundedSender<NdpEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<NdpEvent>>>,
    /// Count of enqueued-but-not-yet-applied events. Zero means every
    /// submitted event's effect is observable.
    pending: Arc<watch::Sender<usize>>,
    route_table: Arc<RouteTable>,
    dns_cache: Arc<DnsServerCache>,
    address_config: AddressConfigTracker,
    metrics: Arc<Metrics>,
}

impl NdpDispatcher {
    /// Creates a dispatcher wired to the given collaborators.
    pub fn new(
        route_table: Arc<RouteTable>,
        dns_cache: Arc<DnsServerCache>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(0usize);

        NdpDispatcher {
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            pending: Arc::new(pending),
            route_table,
            dns_cache,
            address_config: AddressConfigTracker::new(Arc::clone(&metrics)),
            metrics,
        }
    }

    /// Starts the worker and the address-configuration sampler.
    ///
    /// # Errors
    ///
    /// Returns [`NdpsyncError::AlreadyStarted`] if called more than once.
    pub fn start(
        &self,
        sampler: SamplerConfig,
        shutdown: CancellationToken,
    ) -> Result<DispatcherTasks> {
        let events_rx = self
            .events_rx
            .lock()
            .take()
            .ok_or(NdpsyncError::AlreadyStarted)?;

        let worker = Worker {
            events_rx,
            pending: Arc::clone(&self.pending),
            route_table: Arc::clone(&self.route_table),
            dns_cache: Arc::clone(&self.dns_cache),
            metrics: Arc::clone(&self.metrics),
        };
        let worker = tokio::spawn(worker.run(shutdown.clone()));
        let sampler = self.address_config.spawn_sampler(sampler, shutdown);

        Ok(DispatcherTasks { worker, sampler })
    }

    /// Waits until every event submitted so far has been applied.
    ///
    /// Test synchronization hook: no effect is observable before its event
    /// is drained, so race-sensitive callers await quiescence before
    /// asserting on shared state. Only meaningful while the worker runs.
    pub async fn quiesce(&self) {
        let mut pending = self.pending.subscribe();
        let _ = pending.wait_for(|&n| n == 0).await;
    }

    fn enqueue(&self, event: NdpEvent) {
        self.pending.send_modify(|n| *n += 1);
        if let Err(mpsc::error::SendError(event)) = self.events_tx.send(event) {
            // The worker is gone (shutdown); dropping the event is a
            // documented no-op.
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
            debug!(event = event.kind(), "dispatcher stopped, dropping event");
        }
    }

    /// Duplicate Address Detection completed for `address` on `nic`.
    pub fn on_duplicate_address_detection_result(
        &self,
        nic: NicId,
        address: Ipv6Address,
        outcome: DadOutcome,
    ) {
        self.enqueue(NdpEvent::DadResult {
            nic,
            address,
            outcome,
        });
    }

    /// A default router was discovered on `nic`.
    ///
    /// Returns whether the engine should remember the router: always
    /// `true`, so that invalidation events later have a matching record to
    /// remove. There is no cap on remembered routers.
    pub fn on_default_router_discovered(&self, nic: NicId, router: Ipv6Address) -> bool {
        self.enqueue(NdpEvent::DefaultRouterDiscovered { nic, router });
        true
    }

    /// A previously discovered default router was invalidated on `nic`.
    pub fn on_default_router_invalidated(&self, nic: NicId, router: Ipv6Address) {
        self.enqueue(NdpEvent::DefaultRouterInvalidated { nic, router });
    }

    /// An on-link prefix was discovered on `nic`.
    ///
    /// Returns whether the engine should remember the prefix: always
    /// `true`, as for router discovery.
    pub fn on_on_link_prefix_discovered(&self, nic: NicId, subnet: Ipv6Prefix) -> bool {
        self.enqueue(NdpEvent::OnLinkPrefixDiscovered { nic, subnet });
        true
    }

    /// A previously discovered on-link prefix was invalidated on `nic`.
    pub fn on_on_link_prefix_invalidated(&self, nic: NicId, subnet: Ipv6Prefix) {
        self.enqueue(NdpEvent::OnLinkPrefixInvalidated { nic, subnet });
    }

    /// An address was autogenerated via SLAAC on `nic`.
    pub fn on_auto_gen_address(&self, nic: NicId, address: Ipv6AddressWithPrefix) {
        self.address_config.add_auto_gen_address(nic, address);
        self.enqueue(NdpEvent::AutoGenAddress { nic, address });
    }

    /// A SLAAC address on `nic` was deprecated.
    pub fn on_auto_gen_address_deprecated(&self, nic: NicId, address: Ipv6AddressWithPrefix) {
        self.enqueue(NdpEvent::AutoGenAddressDeprecated { nic, address });
    }

    /// A SLAAC address on `nic` was invalidated.
    pub fn on_auto_gen_address_invalidated(&self, nic: NicId, address: Ipv6AddressWithPrefix) {
        self.address_config.remove_auto_gen_address(nic, address);
        self.enqueue(NdpEvent::AutoGenAddressInvalidated { nic, address });
    }

    /// A Recursive DNS Server option was received on `nic`.
    pub fn on_recursive_dns_servers(
        &self,
        nic: NicId,
        addresses: Vec<Ipv6Address>,
        lifetime: Duration,
    ) {
        self.enqueue(NdpEvent::RecursiveDnsServers {
            nic,
            addresses,
            lifetime,
        });
    }

    /// A DNS Search List option was received on `nic`.
    pub fn on_dns_search_list(&self, nic: NicId, domains: Vec<String>, lifetime: Duration) {
        self.enqueue(NdpEvent::DnsSearchList {
            nic,
            domains,
            lifetime,
        });
    }

    /// A Router Advertisement on `nic` signaled DHCPv6 availability.
    ///
    /// The signaling counter and the address-configuration tracker are
    /// updated synchronously; the event is still queued so its position in
    /// the global order is preserved.
    pub fn on_dhcpv6_configuration(&self, nic: NicId, config: Dhcpv6Config) {
        match config {
            Dhcpv6Config::NoConfiguration => self.metrics.dhcpv6_no_configuration.inc(),
            Dhcpv6Config::ManagedAddress => self.metrics.dhcpv6_managed_address.inc(),
            Dhcpv6Config::OtherConfigurations => self.metrics.dhcpv6_other_configurations.inc(),
        }
        self.address_config.set_dhcpv6_config(nic, config);
        self.enqueue(NdpEvent::Dhcpv6Configuration { nic, config });
    }

    /// `nic` was enabled (administratively up with link up).
    pub fn on_interface_enabled(&self, nic: NicId) {
        self.enqueue(NdpEvent::InterfaceEnabled { nic });
    }

    /// `nic` went down. Its learned DNS servers are withdrawn; routes are
    /// left to the engine's own link-state handling.
    pub fn on_interface_disabled(&self, nic: NicId) {
        self.enqueue(NdpEvent::InterfaceDisabled { nic });
    }

    /// `nic` was removed from the stack.
    pub fn on_interface_removed(&self, nic: NicId) {
        self.address_config.remove_nic(nic);
        self.enqueue(NdpEvent::InterfaceRemoved { nic });
    }
}

/// The single consumer of the event queue.
struct Worker {
    events_rx: mpsc::UnboundedReceiver<NdpEvent>,
    pending: Arc<watch::Sender<usize>>,
    route_table: Arc<RouteTable>,
    dns_cache: Arc<DnsServerCache>,
    metrics: Arc<Metrics>,
}

impl Worker {
    async fn run(mut self, shutdown: CancellationToken) {
        info!("NDP event worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.events_rx.recv() => match event {
                    Some(event) => {
                        self.handle_event(event);
                        self.metrics.events_processed_total.inc();
                        self.pending.send_modify(|n| *n = n.saturating_sub(1));
                    }
                    // All senders dropped; nothing left to drain.
                    None => break,
                },
            }
        }

        // Refuse further sends before clearing the count, so a late
        // enqueue cannot slip in after the reset and strand the counter
        // above zero. Undrained events will never be applied.
        self.events_rx.close();
        self.pending.send_modify(|n| *n = 0);
        info!("NDP event worker stopped");
    }

    /// Applies one event's full effect in a single critical section.
    fn handle_event(&self, event: NdpEvent) {
        match event {
            NdpEvent::DadResult {
                nic,
                address,
                outcome,
            } => match outcome {
                DadOutcome::Succeeded => {
                    debug!(nic = %nic, address = %address, "DAD succeeded")
                }
                DadOutcome::DuplicateFound => {
                    warn!(nic = %nic, address = %address, "duplicate address detected")
                }
                DadOutcome::Error => {
                    warn!(nic = %nic, address = %address, "DAD failed")
                }
            },

            NdpEvent::DefaultRouterDiscovered { nic, router } => {
                let route = RouteEntry::default_route(nic, router);
                if self.route_table.add_route(route) {
                    info!(nic = %nic, router = %router, "added default route");
                } else {
                    debug!(nic = %nic, router = %router, "default route already present");
                }
            }

            NdpEvent::DefaultRouterInvalidated { nic, router } => {
                self.del_route(RouteEntry::default_route(nic, router));
            }

            NdpEvent::OnLinkPrefixDiscovered { nic, subnet } => {
                let route = RouteEntry::on_link_route(nic, subnet);
                if self.route_table.add_route(route) {
                    info!(nic = %nic, subnet = %subnet, "added on-link route");
                } else {
                    debug!(nic = %nic, subnet = %subnet, "on-link route already present");
                }
            }

            NdpEvent::OnLinkPrefixInvalidated { nic, subnet } => {
                self.del_route(RouteEntry::on_link_route(nic, subnet));
            }

            // Address assignment itself is the engine's job; the
            // address-configuration tracker was updated at enqueue time.
            NdpEvent::AutoGenAddress { nic, address } => {
                debug!(nic = %nic, address = %address, "autogenerated address");
            }
            NdpEvent::AutoGenAddressDeprecated { nic, address } => {
                debug!(nic = %nic, address = %address, "autogenerated address deprecated");
            }
            NdpEvent::AutoGenAddressInvalidated { nic, address } => {
                debug!(nic = %nic, address = %address, "autogenerated address invalidated");
            }

            NdpEvent::RecursiveDnsServers {
                nic,
                addresses,
                lifetime,
            } => {
                self.dns_cache.update_servers(nic, &addresses, lifetime);
            }

            // Tracked but not consumed by route or DNS-cache logic.
            NdpEvent::DnsSearchList {
                nic,
                domains,
                lifetime,
            } => {
                debug!(nic = %nic, ?domains, ?lifetime, "DNS search list received");
            }

            // Counters and tracker were updated at enqueue time.
            NdpEvent::Dhcpv6Configuration { nic, config } => {
                debug!(nic = %nic, config = %config, "DHCPv6 configuration signaled");
            }

            NdpEvent::InterfaceEnabled { nic } => {
                let route = RouteEntry::link_local_on_link_route(nic);
                if self.route_table.add_route(route) {
                    info!(nic = %nic, "added link-local on-link route");
                }
            }

            NdpEvent::InterfaceDisabled { nic } => {
                self.dns_cache.remove_nic(nic);
                info!(nic = %nic, "interface down, withdrew DNS servers");
            }

            NdpEvent::InterfaceRemoved { nic } => {
                self.dns_cache.remove_nic(nic);
                let removed = self.route_table.del_nic_routes(nic);
                info!(nic = %nic, routes_removed = removed, "interface removed");
            }
        }
    }

    fn del_route(&self, route: RouteEntry) {
        match self.route_table.del_route(route) {
            Ok(()) => info!(route = %route, "removed route"),
            // Invalidation of something never discovered (or already
            // removed) is expected and harmless.
            Err(NdpsyncError::RouteNotFound(_)) => {
                debug!(route = %route, "route already absent");
            }
            Err(e) => warn!(route = %route, error = %e, "failed to remove route"),
        }
    }
}
