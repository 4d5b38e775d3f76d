//! Command-line configuration for the ndpsyncd daemon.

use crate::address_config::{SamplerConfig, SAMPLER_INITIAL_DELAY, SAMPLER_INTERVAL};
use clap::Parser;
use std::time::Duration;

/// IPv6 NDP event synchronization daemon
#[derive(Parser, Debug)]
#[command(name = "ndpsyncd")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log filter directive (e.g. "info", "ndpsyncd=debug")
    #[arg(short = 'l', long, default_value = "info")]
    pub log_filter: String,

    /// Seconds before the first address-configuration sample
    #[arg(long, default_value_t = SAMPLER_INITIAL_DELAY.as_secs())]
    pub sampler_initial_delay: u64,

    /// Seconds between address-configuration samples
    #[arg(long, default_value_t = SAMPLER_INTERVAL.as_secs())]
    pub sampler_interval: u64,

    /// DNS server lifetimes at or above this many seconds never expire
    #[arg(long, default_value_t = u32::MAX as u64)]
    pub dns_infinite_lifetime: u64,
}

impl Args {
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            initial_delay: Duration::from_secs(self.sampler_initial_delay),
            interval: Duration::from_secs(self.sampler_interval),
        }
    }

    pub fn dns_infinite_lifetime(&self) -> Duration {
        Duration::from_secs(self.dns_infinite_lifetime)
    }
}
