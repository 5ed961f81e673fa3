use std::collections::HashSet;

use armada_config::{PoolSettings, Resource};
use armada_fleet_util::FleetApi;
use armada_mesos_util::{tasks, types::UtilizationSnapshot, MesosApi};

use crate::{error::ScaleError, view};

/// Largest fraction the fleet target may move in a single tick. Keeps one bad
/// utilization sample from halving the cluster.
const MAX_CLUSTER_DELTA: f64 = 0.2;

/// Signed distance of the pool's utilization from its target. Positive means
/// the pool is running hotter than the operator wants.
pub fn cluster_utilization_error(snapshot: &UtilizationSnapshot, target_utilization: f64) -> f64 {
	let dimensions = [
		(snapshot.free.cpus, snapshot.total.cpus),
		(snapshot.free.mem, snapshot.total.mem),
		(snapshot.free.disk, snapshot.total.disk),
	];

	// The most constrained dimension drives scaling
	let mut utilization = 0.0f64;
	for (free, total) in dimensions {
		if total > 0.0 {
			utilization = utilization.max(1.0 - free / total);
		}
	}

	utilization - target_utilization
}

/// Translates a utilization error into a new fleet target. Rounds up so the
/// pool is never under-provisioned, then applies the per-tick delta cap and
/// the resource's capacity bounds.
pub fn get_fleet_delta(resource: &Resource, current_capacity: f64, error: f64) -> f64 {
	let ideal = current_capacity * (1.0 + error);
	let floor_delta = (current_capacity * (1.0 - MAX_CLUSTER_DELTA)).floor();
	let ceil_delta = (current_capacity * (1.0 + MAX_CLUSTER_DELTA)).ceil();

	let target = ideal.ceil().max(floor_delta).min(ceil_delta);
	target.max(resource.min_capacity).min(resource.max_capacity)
}

/// Metrics provider for spot fleet resources: reports the fleet's fulfilled
/// capacity and the target the pool's utilization asks for. Returns `(0, 0)`
/// when the request is missing or cancelled, which callers treat as "do
/// nothing".
pub async fn spotfleet_metrics_provider(
	fleet: &dyn FleetApi,
	mesos: &dyn MesosApi,
	resource: &Resource,
	pool_settings: &PoolSettings,
) -> Result<(f64, f64), ScaleError> {
	let Some(request) = fleet.get_request(&resource.id, &resource.region).await? else {
		tracing::warn!(id = %resource.id, "spot fleet request not found, skipping");
		return Ok((0.0, 0.0));
	};

	let state = request.spot_fleet_request_state;
	if state.is_cancelled() {
		tracing::warn!(id = %resource.id, %state, "spot fleet request is cancelled, skipping");
		return Ok((0.0, 0.0));
	}

	let fleet_ips = view::fleet_instance_ips(fleet, resource)
		.await?
		.into_iter()
		.collect::<HashSet<_>>();

	let mesos_state = mesos.state().await?;
	let pool_slaves = mesos_state
		.slaves
		.iter()
		.filter(|slave| slave.attributes.pool.as_deref() == Some(resource.pool.as_str()))
		.filter(|slave| {
			tasks::slave_pid_to_ip(&slave.pid).is_some_and(|ip| fleet_ips.contains(&ip))
		})
		.collect::<Vec<_>>();

	let current_capacity = request.spot_fleet_request_config.fulfilled_capacity;

	let snapshot = tasks::resource_utilization(pool_slaves.iter().copied());
	if snapshot.total.cpus <= 0.0 {
		tracing::warn!(
			id = %resource.id,
			pool = %resource.pool,
			"no fleet capacity visible in pool, skipping"
		);
		return Ok((current_capacity, current_capacity));
	}

	let error = cluster_utilization_error(&snapshot, pool_settings.target_utilization);
	let target_capacity = get_fleet_delta(resource, current_capacity, error);

	Ok((current_capacity, target_capacity))
}
