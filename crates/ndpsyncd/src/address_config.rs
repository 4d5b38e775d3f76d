//! Dynamic address-configuration-source tracking.
//!
//! Classifies, per interface, whether global addresses are configured via
//! SLAAC, a DHCPv6 managed address, both, or neither, and periodically
//! samples the classification into monotonic counters: an interface
//! sitting in a state for three consecutive ticks increments that state's
//! counter three times. This is a gauge sampled into counters for
//! fleet-wide telemetry aggregation, not a state-change counter.
//!
//! Tracker state is updated synchronously from the dispatcher callbacks
//! under a short-held lock; only the sampling is periodic.

use crate::event::Dhcpv6Config;
use crate::metrics::Metrics;
use netstack_types::{Ipv6Address, Ipv6AddressWithPrefix, NicId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Delay before the first sample after the tracker starts.
pub const SAMPLER_INITIAL_DELAY: Duration = Duration::from_secs(60);

/// Interval between samples after the first.
pub const SAMPLER_INTERVAL: Duration = Duration::from_secs(3600);

/// Sampling schedule. Overridable for deployments that aggregate telemetry
/// on a different cadence.
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            initial_delay: SAMPLER_INITIAL_DELAY,
            interval: SAMPLER_INTERVAL,
        }
    }
}

/// Classification of an interface's global address configuration sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressConfig {
    /// Neither global SLAAC addresses nor a DHCPv6 managed address.
    NoGlobalSlaacOrDhcpv6ManagedAddress,
    /// Global SLAAC addresses only.
    GlobalSlaacOnly,
    /// DHCPv6 managed address only.
    Dhcpv6ManagedAddressOnly,
    /// Both global SLAAC addresses and a DHCPv6 managed address.
    GlobalSlaacAndDhcpv6ManagedAddress,
}

#[derive(Debug, Default)]
struct InterfaceState {
    /// Currently-valid global SLAAC addresses. Link-local autogenerated
    /// addresses never enter this set.
    global_slaac_addrs: HashSet<Ipv6Address>,
    /// Latest DHCPv6 signal; last writer wins.
    dhcpv6_managed: bool,
}

impl InterfaceState {
    fn classify(&self) -> AddressConfig {
        match (!self.global_slaac_addrs.is_empty(), self.dhcpv6_managed) {
            (false, false) => AddressConfig::NoGlobalSlaacOrDhcpv6ManagedAddress,
            (true, false) => AddressConfig::GlobalSlaacOnly,
            (false, true) => AddressConfig::Dhcpv6ManagedAddressOnly,
            (true, true) => AddressConfig::GlobalSlaacAndDhcpv6ManagedAddress,
        }
    }
}

/// Tracks per-interface address-configuration sources and samples them
/// into [`Metrics`] counters.
#[derive(Clone)]
pub struct AddressConfigTracker {
    interfaces: Arc<Mutex<HashMap<NicId, InterfaceState>>>,
    metrics: Arc<Metrics>,
}

impl AddressConfigTracker {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        AddressConfigTracker {
            interfaces: Arc::new(Mutex::new(HashMap::new())),
            metrics,
        }
    }

    /// Records a SLAAC-autogenerated address. Link-local addresses are
    /// ignored and never create tracker state.
    pub fn add_auto_gen_address(&self, nic: NicId, address: Ipv6AddressWithPrefix) {
        if !address.address.is_global() {
            return;
        }
        self.interfaces
            .lock()
            .entry(nic)
            .or_default()
            .global_slaac_addrs
            .insert(address.address);
    }

    /// Records invalidation of a SLAAC address. Unknown addresses and
    /// link-local addresses are absorbed as no-ops.
    pub fn remove_auto_gen_address(&self, nic: NicId, address: Ipv6AddressWithPrefix) {
        if !address.address.is_global() {
            return;
        }
        if let Some(state) = self.interfaces.lock().get_mut(&nic) {
            state.global_slaac_addrs.remove(&address.address);
        }
    }

    /// Records the latest DHCPv6 configuration signal for `nic`.
    pub fn set_dhcpv6_config(&self, nic: NicId, config: Dhcpv6Config) {
        let managed = matches!(config, Dhcpv6Config::ManagedAddress);
        self.interfaces.lock().entry(nic).or_default().dhcpv6_managed = managed;
    }

    /// Stops `nic` from contributing to subsequent samples. Its last-known
    /// state is discarded, not frozen.
    pub fn remove_nic(&self, nic: NicId) {
        self.interfaces.lock().remove(&nic);
    }

    /// Classifies every tracked interface and increments the matching
    /// counters by the per-state interface counts.
    fn sample(interfaces: &Mutex<HashMap<NicId, InterfaceState>>, metrics: &Metrics) {
        let mut none = 0;
        let mut slaac_only = 0;
        let mut dhcpv6_only = 0;
        let mut both = 0;

        for state in interfaces.lock().values() {
            match state.classify() {
                AddressConfig::NoGlobalSlaacOrDhcpv6ManagedAddress => none += 1,
                AddressConfig::GlobalSlaacOnly => slaac_only += 1,
                AddressConfig::Dhcpv6ManagedAddressOnly => dhcpv6_only += 1,
                AddressConfig::GlobalSlaacAndDhcpv6ManagedAddress => both += 1,
            }
        }

        metrics
            .no_global_slaac_or_dhcpv6_managed_address
            .inc_by(none);
        metrics.global_slaac_only.inc_by(slaac_only);
        metrics.dhcpv6_managed_address_only.inc_by(dhcpv6_only);
        metrics
            .global_slaac_and_dhcpv6_managed_address
            .inc_by(both);

        debug!(
            none,
            slaac_only, dhcpv6_only, both, "sampled address configuration sources"
        );
    }

    /// Spawns the periodic sampler: one sample after the initial delay,
    /// then one per interval, until `shutdown` is canceled.
    pub fn spawn_sampler(
        &self,
        config: SamplerConfig,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let interfaces = Arc::clone(&self.interfaces);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = sleep(config.initial_delay) => {}
            }

            loop {
                Self::sample(&interfaces, &metrics);

                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = sleep(config.interval) => {}
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (AddressConfigTracker, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        (AddressConfigTracker::new(Arc::clone(&metrics)), metrics)
    }

    fn global(s: &str) -> Ipv6AddressWithPrefix {
        Ipv6AddressWithPrefix::new(s.parse().unwrap(), 64)
    }

    fn sample(t: &AddressConfigTracker, metrics: &Metrics) {
        AddressConfigTracker::sample(&t.interfaces, metrics);
    }

    #[test]
    fn test_classification_transitions() {
        let (t, m) = tracker();
        let nic = NicId::new(1);

        t.set_dhcpv6_config(nic, Dhcpv6Config::NoConfiguration);
        sample(&t, &m);
        assert_eq!(m.no_global_slaac_or_dhcpv6_managed_address.get(), 1);

        t.add_auto_gen_address(nic, global("abcd:ee00::1"));
        sample(&t, &m);
        assert_eq!(m.global_slaac_only.get(), 1);

        t.set_dhcpv6_config(nic, Dhcpv6Config::ManagedAddress);
        sample(&t, &m);
        assert_eq!(m.global_slaac_and_dhcpv6_managed_address.get(), 1);

        t.remove_auto_gen_address(nic, global("abcd:ee00::1"));
        sample(&t, &m);
        assert_eq!(m.dhcpv6_managed_address_only.get(), 1);
    }

    #[test]
    fn test_link_local_addresses_ignored() {
        let (t, m) = tracker();
        let nic = NicId::new(1);

        // Neither creates tracker state nor counts as SLAAC.
        t.add_auto_gen_address(nic, Ipv6AddressWithPrefix::new("fe80::1".parse().unwrap(), 10));
        sample(&t, &m);
        assert_eq!(m.no_global_slaac_or_dhcpv6_managed_address.get(), 0);
        assert_eq!(m.global_slaac_only.get(), 0);

        // Invalidating a link-local address does not disturb global state.
        t.add_auto_gen_address(nic, global("abcd:ee00::1"));
        t.remove_auto_gen_address(
            nic,
            Ipv6AddressWithPrefix::new("fe80::1".parse().unwrap(), 10),
        );
        sample(&t, &m);
        assert_eq!(m.global_slaac_only.get(), 1);
    }

    #[test]
    fn test_dhcpv6_last_writer_wins() {
        let (t, m) = tracker();
        let nic = NicId::new(1);

        t.set_dhcpv6_config(nic, Dhcpv6Config::NoConfiguration);
        t.set_dhcpv6_config(nic, Dhcpv6Config::ManagedAddress);
        sample(&t, &m);
        assert_eq!(m.dhcpv6_managed_address_only.get(), 1);

        t.set_dhcpv6_config(nic, Dhcpv6Config::OtherConfigurations);
        sample(&t, &m);
        assert_eq!(m.no_global_slaac_or_dhcpv6_managed_address.get(), 1);
        assert_eq!(m.dhcpv6_managed_address_only.get(), 1);
    }

    #[test]
    fn test_removed_nic_stops_contributing() {
        let (t, m) = tracker();
        t.set_dhcpv6_config(NicId::new(1), Dhcpv6Config::ManagedAddress);
        t.add_auto_gen_address(NicId::new(2), global("abcd:ee00::1"));

        sample(&t, &m);
        assert_eq!(m.dhcpv6_managed_address_only.get(), 1);
        assert_eq!(m.global_slaac_only.get(), 1);

        t.remove_nic(NicId::new(1));
        sample(&t, &m);
        assert_eq!(m.dhcpv6_managed_address_only.get(), 1);
        assert_eq!(m.global_slaac_only.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_schedule() {
        let (t, m) = tracker();
        t.set_dhcpv6_config(NicId::new(1), Dhcpv6Config::NoConfiguration);

        let shutdown = CancellationToken::new();
        let config = SamplerConfig::default();
        let handle = t.spawn_sampler(config, shutdown.clone());
        // Let the sampler task register its initial-delay timer before the
        // clock is advanced.
        tokio::task::yield_now().await;

        // Nothing before the initial delay elapses.
        tokio::time::advance(config.initial_delay - Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(m.no_global_slaac_or_dhcpv6_managed_address.get(), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(m.no_global_slaac_or_dhcpv6_managed_address.get(), 1);

        tokio::time::advance(config.interval).await;
        tokio::task::yield_now().await;
        assert_eq!(m.no_global_slaac_or_dhcpv6_managed_address.get(), 2);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
