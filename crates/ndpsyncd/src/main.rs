//! NDP Synchronization Daemon
//!
//! Main entry point for the ndpsyncd daemon. Owns the shared route table,
//! DNS server cache, and metrics, starts the dispatcher worker and the
//! address-configuration sampler, and shuts everything down on SIGINT.

use anyhow::Context;
use clap::Parser;
use netstack_ndpsyncd::{Args, DnsServerCache, Metrics, NdpDispatcher, RouteTable};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_filter).context("invalid log filter directive")?,
        )
        .with_target(true)
        .compact()
        .init();

    info!("ndpsyncd: starting NDP synchronization daemon");

    let route_table = Arc::new(RouteTable::new());
    let dns_cache = Arc::new(DnsServerCache::with_infinite_lifetime(
        args.dns_infinite_lifetime(),
    ));
    let metrics = Arc::new(Metrics::new().context("failed to register metrics")?);

    let dispatcher = NdpDispatcher::new(
        Arc::clone(&route_table),
        Arc::clone(&dns_cache),
        Arc::clone(&metrics),
    );

    let shutdown = CancellationToken::new();
    let tasks = dispatcher
        .start(args.sampler_config(), shutdown.clone())
        .context("failed to start dispatcher")?;

    info!("ndpsyncd: dispatcher running, waiting for events");

    match signal::ctrl_c().await {
        Ok(()) => info!("ndpsyncd: received SIGINT, shutting down"),
        Err(e) => error!(error = %e, "ndpsyncd: failed to listen for SIGINT"),
    }

    shutdown.cancel();
    tasks.worker.await.context("worker task panicked")?;
    tasks.sampler.await.context("sampler task panicked")?;

    info!("ndpsyncd: graceful shutdown complete");
    Ok(())
}
