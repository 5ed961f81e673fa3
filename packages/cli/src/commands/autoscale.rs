use std::sync::Arc;

use anyhow::*;
use armada_config::ArmadaConfig;
use clap::Parser;
use cluster_autoscale::ScalerRegistry;

#[derive(Parser)]
pub struct Opts {
	/// Log intended actions without touching the fleet or any slave
	#[clap(long)]
	dry_run: bool,

	/// Only autoscale resources in this pool
	#[clap(long)]
	pool: Option<String>,
}

pub async fn execute(config: ArmadaConfig, opts: Opts) -> Result<()> {
	let fleet = armada_fleet_util::Client::new(
		config.endpoints.fleet_api.clone(),
		config.endpoints.fleet_api_token.as_deref(),
	)?;
	let mesos = armada_mesos_util::Client::new(config.endpoints.mesos_master.clone())?;
	let drain = armada_drain_util::Client::new(config.endpoints.drain_service.clone())?;

	let registry = ScalerRegistry::spot_fleet(Arc::new(fleet), Arc::new(mesos), Arc::new(drain));

	tracing::info!(
		resources = config.cluster_autoscaling_resources.len(),
		dry_run = opts.dry_run,
		"starting autoscale tick"
	);

	// Per-pool failures are logged inside the loop and never abort the tick
	cluster_autoscale::autoscale_cluster(&registry, &config, opts.pool.as_deref(), opts.dry_run)
		.await;

	Ok(())
}
