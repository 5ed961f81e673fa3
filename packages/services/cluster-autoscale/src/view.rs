use std::collections::HashSet;

use armada_config::Resource;
use armada_fleet_util::{
	types::{Filter, FleetRequest},
	FleetApi,
};
use armada_mesos_util::{tasks::slave_pid_to_ip, types::SlaveTaskCount};

use crate::{
	error::ScaleError,
	types::{FleetSlave, TaskCounts},
};

/// Private IPs of the instances currently fulfilling the fleet.
pub async fn fleet_instance_ips(
	fleet: &dyn FleetApi,
	resource: &Resource,
) -> Result<Vec<String>, ScaleError> {
	let active = fleet
		.get_active_instances(&resource.id, &resource.region)
		.await?;
	let instance_ids = active
		.into_iter()
		.map(|instance| instance.instance_id)
		.collect::<Vec<_>>();

	let instances = fleet
		.describe_instances(&instance_ids, &resource.region, &[])
		.await?
		.unwrap_or_default();

	Ok(instances
		.into_iter()
		.map(|instance| instance.private_ip_address)
		.collect())
}

/// Joins Mesos task counts with the fleet's instances by private IP. Slaves
/// outside the fleet's IP set (static pools, other fleets) are dropped.
pub async fn filter_fleet_slaves(
	fleet: &dyn FleetApi,
	resource: &Resource,
	request: &FleetRequest,
	task_counts: Vec<SlaveTaskCount>,
) -> Result<Vec<FleetSlave>, ScaleError> {
	let fleet_ips = fleet_instance_ips(fleet, resource)
		.await?
		.into_iter()
		.collect::<HashSet<_>>();

	let ip_filter = Filter::new(
		"private-ip-address",
		fleet_ips.iter().cloned().collect::<Vec<_>>(),
	);
	let instances = fleet
		.describe_instances(&[], &resource.region, &[ip_filter])
		.await?
		.unwrap_or_default();

	let weights = request.instance_type_weights();

	let mut slaves = Vec::new();
	for task_count in task_counts {
		let Some(ip) = slave_pid_to_ip(&task_count.slave.pid) else {
			tracing::warn!(pid = %task_count.slave.pid, "could not parse slave pid, skipping");
			continue;
		};

		if !fleet_ips.contains(&ip) {
			continue;
		}

		let Some(instance) = instances
			.iter()
			.find(|instance| instance.private_ip_address == ip)
		else {
			tracing::warn!(%ip, "no fleet instance matches slave ip, skipping");
			continue;
		};

		let Some(weight) = weights.get(&instance.instance_type) else {
			tracing::warn!(
				instance_type = %instance.instance_type,
				"instance type missing from launch specifications, skipping"
			);
			continue;
		};

		slaves.push(FleetSlave {
			id: task_count.slave.id.clone(),
			hostname: task_count.slave.hostname.clone(),
			pid: task_count.slave.pid.clone(),
			ip,
			instance_id: instance.instance_id.clone(),
			instance_type: instance.instance_type.clone(),
			instance_weight: *weight,
			task_counts: TaskCounts {
				count: task_count.count,
				chronos_count: task_count.chronos_count,
			},
		});
	}

	Ok(slaves)
}
