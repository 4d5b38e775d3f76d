//! On-link prefix discovery and interface lifecycle route handling.

use netstack_ndpsyncd::{
    DnsServerCache, Metrics, NdpDispatcher, RouteEntry, RouteTable, SamplerConfig,
};
use netstack_types::{Ipv6Prefix, NicId};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct Harness {
    dispatcher: NdpDispatcher,
    route_table: Arc<RouteTable>,
    shutdown: CancellationToken,
}

impl Harness {
    fn start() -> Self {
        let route_table = Arc::new(RouteTable::new());
        let dispatcher = NdpDispatcher::new(
            Arc::clone(&route_table),
            Arc::new(DnsServerCache::new()),
            Arc::new(Metrics::new().unwrap()),
        );
        let shutdown = CancellationToken::new();
        dispatcher
            .start(SamplerConfig::default(), shutdown.clone())
            .unwrap();
        Harness {
            dispatcher,
            route_table,
            shutdown,
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn subnet(s: &str) -> Ipv6Prefix {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_prefix_discovery_installs_on_link_route() {
    let h = Harness::start();
    let nic = NicId::new(1);

    assert!(h
        .dispatcher
        .on_on_link_prefix_discovered(nic, subnet("abcd:1234::/32")));
    h.dispatcher.quiesce().await;

    assert_eq!(
        h.route_table.route_table(),
        vec![RouteEntry::on_link_route(nic, subnet("abcd:1234::/32"))]
    );
}

#[tokio::test]
async fn test_prefix_invalidation_removes_route() {
    let h = Harness::start();
    let nic = NicId::new(1);

    h.dispatcher
        .on_on_link_prefix_discovered(nic, subnet("abcd:1234::/32"));
    h.dispatcher
        .on_on_link_prefix_discovered(nic, subnet("abcd:5678::/32"));
    h.dispatcher
        .on_on_link_prefix_invalidated(nic, subnet("abcd:1234::/32"));
    h.dispatcher.quiesce().await;

    assert_eq!(
        h.route_table.route_table(),
        vec![RouteEntry::on_link_route(nic, subnet("abcd:5678::/32"))]
    );
}

#[tokio::test]
async fn test_same_prefix_on_two_nics_is_independent() {
    let h = Harness::start();
    let nic1 = NicId::new(1);
    let nic2 = NicId::new(2);

    h.dispatcher
        .on_on_link_prefix_discovered(nic1, subnet("abcd:1234::/32"));
    h.dispatcher
        .on_on_link_prefix_discovered(nic2, subnet("abcd:1234::/32"));
    h.dispatcher
        .on_on_link_prefix_invalidated(nic2, subnet("abcd:1234::/32"));
    h.dispatcher.quiesce().await;

    assert_eq!(
        h.route_table.route_table(),
        vec![RouteEntry::on_link_route(nic1, subnet("abcd:1234::/32"))]
    );
}

#[tokio::test]
async fn test_invalidating_unknown_prefix_is_harmless() {
    let h = Harness::start();
    let nic = NicId::new(1);

    h.dispatcher
        .on_on_link_prefix_invalidated(nic, subnet("abcd:1234::/32"));
    h.dispatcher.quiesce().await;

    assert!(h.route_table.route_table().is_empty());
}

#[tokio::test]
async fn test_interface_enabled_installs_link_local_route() {
    let h = Harness::start();
    let nic = NicId::new(1);

    h.dispatcher.on_interface_enabled(nic);
    h.dispatcher.quiesce().await;

    assert_eq!(
        h.route_table.route_table(),
        vec![RouteEntry::link_local_on_link_route(nic)]
    );

    // A flap re-adds without duplicating.
    h.dispatcher.on_interface_disabled(nic);
    h.dispatcher.on_interface_enabled(nic);
    h.dispatcher.quiesce().await;
    assert_eq!(h.route_table.route_table().len(), 1);
}

#[tokio::test]
async fn test_prefix_with_host_bits_matches_normalized_form() {
    let h = Harness::start();
    let nic = NicId::new(1);

    // Host bits are masked off at construction, so discovery and
    // invalidation agree on the route identity.
    h.dispatcher
        .on_on_link_prefix_discovered(nic, subnet("abcd:1234::ff/32"));
    h.dispatcher
        .on_on_link_prefix_invalidated(nic, subnet("abcd:1234::/32"));
    h.dispatcher.quiesce().await;

    assert!(h.route_table.route_table().is_empty());
}
