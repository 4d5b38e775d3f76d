//! Prometheus metrics for the NDP dispatcher.
//!
//! Two counter families:
//!
//! - DHCPv6 signaling counters, incremented once per received
//!   configuration event.
//! - IPv6 address-configuration counters, incremented by the periodic
//!   sampler in [`crate::address_config`] — one increment per interface
//!   sitting in that state per sampling tick, not per state change.

use prometheus::{IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector for ndpsyncd.
#[derive(Clone)]
pub struct Metrics {
    // DHCPv6 signaling (per event)
    pub dhcpv6_no_configuration: IntCounter,
    pub dhcpv6_managed_address: IntCounter,
    pub dhcpv6_other_configurations: IntCounter,

    // Address configuration sources (sampled)
    pub no_global_slaac_or_dhcpv6_managed_address: IntCounter,
    pub global_slaac_only: IntCounter,
    pub dhcpv6_managed_address_only: IntCounter,
    pub global_slaac_and_dhcpv6_managed_address: IntCounter,

    // Worker
    pub events_processed_total: IntCounter,

    // Registry for export
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Creates a metrics collector with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let dhcpv6_no_configuration = IntCounter::with_opts(Opts::new(
            "ndpsyncd_dhcpv6_no_configuration_total",
            "DHCPv6 configuration events signaling no configuration",
        ))?;
        registry.register(Box::new(dhcpv6_no_configuration.clone()))?;

        let dhcpv6_managed_address = IntCounter::with_opts(Opts::new(
            "ndpsyncd_dhcpv6_managed_address_total",
            "DHCPv6 configuration events signaling managed address",
        ))?;
        registry.register(Box::new(dhcpv6_managed_address.clone()))?;

        let dhcpv6_other_configurations = IntCounter::with_opts(Opts::new(
            "ndpsyncd_dhcpv6_other_configurations_total",
            "DHCPv6 configuration events signaling other configurations",
        ))?;
        registry.register(Box::new(dhcpv6_other_configurations.clone()))?;

        let no_global_slaac_or_dhcpv6_managed_address = IntCounter::with_opts(Opts::new(
            "ndpsyncd_no_global_slaac_or_dhcpv6_managed_address_total",
            "Samples of interfaces with neither global SLAAC addresses nor DHCPv6 managed addresses",
        ))?;
        registry.register(Box::new(no_global_slaac_or_dhcpv6_managed_address.clone()))?;

        let global_slaac_only = IntCounter::with_opts(Opts::new(
            "ndpsyncd_global_slaac_only_total",
            "Samples of interfaces with global SLAAC addresses only",
        ))?;
        registry.register(Box::new(global_slaac_only.clone()))?;

        let dhcpv6_managed_address_only = IntCounter::with_opts(Opts::new(
            "ndpsyncd_dhcpv6_managed_address_only_total",
            "Samples of interfaces with DHCPv6 managed addresses only",
        ))?;
        registry.register(Box::new(dhcpv6_managed_address_only.clone()))?;

        let global_slaac_and_dhcpv6_managed_address = IntCounter::with_opts(Opts::new(
            "ndpsyncd_global_slaac_and_dhcpv6_managed_address_total",
            "Samples of interfaces with both global SLAAC and DHCPv6 managed addresses",
        ))?;
        registry.register(Box::new(global_slaac_and_dhcpv6_managed_address.clone()))?;

        let events_processed_total = IntCounter::with_opts(Opts::new(
            "ndpsyncd_events_processed_total",
            "NDP events drained and applied by the worker",
        ))?;
        registry.register(Box::new(events_processed_total.clone()))?;

        Ok(Self {
            dhcpv6_no_configuration,
            dhcpv6_managed_address,
            dhcpv6_other_configurations,
            no_global_slaac_or_dhcpv6_managed_address,
            global_slaac_only,
            dhcpv6_managed_address_only,
            global_slaac_and_dhcpv6_managed_address,
            events_processed_total,
            registry: Arc::new(registry),
        })
    }
}
