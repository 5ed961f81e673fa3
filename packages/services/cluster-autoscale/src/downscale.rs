use std::collections::HashMap;

use armada_config::{PoolSettings, Resource};
use armada_drain_util::DrainApi;
use armada_fleet_util::FleetApi;
use armada_mesos_util::{tasks, MesosApi};

use crate::{
	error::ScaleError,
	metrics,
	selector::sort_slaves_to_kill,
	terminate::gracefully_terminate_slave,
	types::{FleetSlave, TaskCounts},
};

/// Terminates slaves one at a time until the fleet reaches the target
/// capacity, never undershooting it. Returns the capacity the fleet was left
/// at.
///
/// Loop invariant: `running_capacity` equals the fleet's last successfully
/// set target. A `FailSetSpotCapacity` aborts the whole pass since the fleet
/// target is no longer trustworthy; any other per-slave failure just skips
/// that slave.
pub async fn downscale_fleet(
	fleet: &dyn FleetApi,
	mesos: &dyn MesosApi,
	drain: &dyn DrainApi,
	resource: &Resource,
	filtered_slaves: Vec<FleetSlave>,
	pool_settings: &PoolSettings,
	current_capacity: f64,
	target_capacity: f64,
	dry_run: bool,
) -> Result<f64, ScaleError> {
	// One state snapshot per pass; task counts for the remaining candidates
	// are re-derived from it after every termination
	let state = mesos.state().await?;

	let mut running_capacity = current_capacity;
	let mut sorted = sort_slaves_to_kill(filtered_slaves);

	while !sorted.is_empty() {
		let slave = sorted.remove(0);

		if running_capacity - slave.instance_weight < target_capacity {
			tracing::info!(
				hostname = %slave.hostname,
				%running_capacity,
				%target_capacity,
				"killing the next slave would undershoot the target, stopping"
			);
			break;
		}

		let new_capacity = running_capacity - slave.instance_weight;
		match gracefully_terminate_slave(
			fleet,
			drain,
			resource,
			&slave,
			pool_settings,
			running_capacity,
			new_capacity,
			dry_run,
		)
		.await
		{
			Ok(()) => {
				running_capacity = new_capacity;
				metrics::SLAVES_TERMINATED
					.with_label_values(&[&resource.id, &resource.pool])
					.inc();
				tracing::info!(
					hostname = %slave.hostname,
					%running_capacity,
					"gracefully terminated slave"
				);
			}
			Err(err @ ScaleError::FailSetSpotCapacity(_)) => {
				tracing::error!(
					hostname = %slave.hostname,
					"failed to set fleet capacity, aborting downscale"
				);
				return Err(err);
			}
			Err(err) => {
				tracing::warn!(
					hostname = %slave.hostname,
					?err,
					"failed to terminate slave, skipping"
				);
			}
		}

		let remaining_ids = sorted
			.iter()
			.map(|slave| slave.id.clone())
			.collect::<Vec<_>>();
		let counts = tasks::task_counts_for_slaves(&state, &remaining_ids)
			.into_iter()
			.map(|task_count| {
				(
					task_count.slave.id.clone(),
					TaskCounts {
						count: task_count.count,
						chronos_count: task_count.chronos_count,
					},
				)
			})
			.collect::<HashMap<_, _>>();

		for slave in &mut sorted {
			if let Some(task_counts) = counts.get(&slave.id) {
				slave.task_counts = *task_counts;
			}
		}
		sorted = sort_slaves_to_kill(sorted);
	}

	Ok(running_capacity)
}
