use std::time::Duration;

use armada_config::{PoolSettings, Resource};
use armada_drain_util::DrainApi;
use armada_fleet_util::FleetApi;
use tokio::time::Instant;

use crate::{capacity::set_fleet_capacity, error::ScaleError, types::FleetSlave};

/// Length of the drain window handed to the drain service, in wall clock
/// time. Independent of `drain_timeout`, which only bounds how long we wait.
const DRAIN_HORIZON: Duration = Duration::from_secs(600);
const SAFE_KILL_POLL_INTERVAL: Duration = Duration::from_secs(5);

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Drains a slave, shrinks the fleet underneath it, waits until the host is
/// safe to kill, and terminates the backing instance.
///
/// Every failure point compensates for the work already done: a failed drain
/// undrains, a failed capacity set undrains, and a failed terminate first
/// restores the previous target capacity and then undrains. On success the
/// slave is gone and nothing is undrained.
pub async fn gracefully_terminate_slave(
	fleet: &dyn FleetApi,
	drain: &dyn DrainApi,
	resource: &Resource,
	slave: &FleetSlave,
	pool_settings: &PoolSettings,
	current_capacity: f64,
	new_capacity: f64,
	dry_run: bool,
) -> Result<(), ScaleError> {
	let drain_host = format!("{}|{}", slave.hostname, slave.ip);
	let start = (chrono::Utc::now().timestamp() + pool_settings.drain_timeout as i64)
		* NANOS_PER_SEC;
	let duration = DRAIN_HORIZON.as_secs() as i64 * NANOS_PER_SEC;

	tracing::info!(host = %drain_host, "draining slave");
	if let Err(err) = drain.drain(&[drain_host.clone()], start, duration).await {
		// No capacity change has been made yet, just make sure the host is
		// not left marked
		undrain_host(drain, &drain_host).await;

		return Err(ScaleError::Drain {
			host: drain_host,
			source: err,
		});
	}

	if let Err(err) = set_fleet_capacity(fleet, resource, new_capacity, dry_run).await {
		tracing::error!(
			host = %drain_host,
			"failed to shrink fleet capacity, undraining"
		);
		undrain_host(drain, &drain_host).await;

		return Err(err);
	}

	match wait_and_terminate(fleet, drain, slave, pool_settings.drain_timeout, dry_run, resource)
		.await
	{
		// The slave is gone, nothing to undrain
		Ok(()) => Ok(()),
		Err(err) => {
			tracing::error!(
				host = %drain_host,
				%current_capacity,
				"failed to terminate instance, restoring fleet capacity"
			);

			if let Err(set_err) =
				set_fleet_capacity(fleet, resource, current_capacity, dry_run).await
			{
				tracing::error!(?set_err, "failed to restore fleet capacity");
			}
			undrain_host(drain, &drain_host).await;

			Err(err)
		}
	}
}

/// Polls `is_safe_to_kill` until the host has drained, then terminates its
/// instance. The wait is bounded by the pool's drain timeout.
pub(crate) async fn wait_and_terminate(
	fleet: &dyn FleetApi,
	drain: &dyn DrainApi,
	slave: &FleetSlave,
	drain_timeout: u64,
	dry_run: bool,
	resource: &Resource,
) -> Result<(), ScaleError> {
	let deadline = Instant::now() + Duration::from_secs(drain_timeout);

	loop {
		match drain.is_safe_to_kill(&slave.hostname).await {
			Ok(true) => break,
			Ok(false) => {}
			Err(err) => {
				tracing::warn!(hostname = %slave.hostname, ?err, "safe-to-kill check failed");
			}
		}

		if Instant::now() >= deadline {
			return Err(ScaleError::WaitSafeTimeout {
				hostname: slave.hostname.clone(),
			});
		}

		tokio::time::sleep(SAFE_KILL_POLL_INTERVAL).await;
	}

	tracing::info!(
		instance_id = %slave.instance_id,
		hostname = %slave.hostname,
		"slave is safe to kill, terminating instance"
	);

	fleet
		.terminate(&slave.instance_id, dry_run, &resource.region)
		.await
		.map_err(|err| ScaleError::Terminate {
			instance_id: slave.instance_id.clone(),
			source: err,
		})?;

	Ok(())
}

async fn undrain_host(drain: &dyn DrainApi, host: &str) {
	if let Err(err) = drain.undrain(&[host.to_string()]).await {
		tracing::error!(%host, ?err, "failed to undrain host");
	}
}
