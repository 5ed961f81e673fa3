use std::collections::{HashMap, HashSet};

use crate::types::{
	MesosSlave, MesosState, ResourceInfo, SlaveTaskCount, UtilizationSnapshot,
};

const TASK_RUNNING: &str = "TASK_RUNNING";
const CHRONOS_FRAMEWORK_PREFIX: &str = "chronos";

/// Extracts the agent IP from a pid of the form `slave(N)@<ip>:<port>`.
pub fn slave_pid_to_ip(pid: &str) -> Option<String> {
	let (_, addr) = pid.split_once('@')?;
	let (ip, _port) = addr.split_once(':')?;
	if ip.is_empty() {
		return None;
	}

	Some(ip.to_string())
}

fn running_task_totals(state: &MesosState) -> HashMap<&str, (u64, u64)> {
	let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();

	for framework in &state.frameworks {
		let is_chronos = framework.name.starts_with(CHRONOS_FRAMEWORK_PREFIX);

		for task in &framework.tasks {
			if task.state != TASK_RUNNING {
				continue;
			}

			let entry = totals.entry(task.slave_id.as_str()).or_default();
			entry.0 += 1;
			if is_chronos {
				entry.1 += 1;
			}
		}
	}

	totals
}

fn to_task_counts<'a>(
	state: &MesosState,
	slaves: impl Iterator<Item = &'a MesosSlave>,
) -> Vec<SlaveTaskCount> {
	let totals = running_task_totals(state);

	slaves
		.map(|slave| {
			let (count, chronos_count) =
				totals.get(slave.id.as_str()).copied().unwrap_or_default();

			SlaveTaskCount {
				slave: slave.clone(),
				count,
				chronos_count,
			}
		})
		.collect()
}

/// Task counts for every slave in the given pool. Order follows the state's
/// slave order.
pub fn task_counts_for_pool(state: &MesosState, pool: &str) -> Vec<SlaveTaskCount> {
	to_task_counts(
		state,
		state
			.slaves
			.iter()
			.filter(|slave| slave.attributes.pool.as_deref() == Some(pool)),
	)
}

/// Task counts for an explicit set of slaves, identified by slave id.
pub fn task_counts_for_slaves(state: &MesosState, slave_ids: &[String]) -> Vec<SlaveTaskCount> {
	let wanted = slave_ids.iter().map(String::as_str).collect::<HashSet<_>>();

	to_task_counts(
		state,
		state
			.slaves
			.iter()
			.filter(|slave| wanted.contains(slave.id.as_str())),
	)
}

/// Sums free and total resources over the given slaves.
pub fn resource_utilization<'a>(
	slaves: impl IntoIterator<Item = &'a MesosSlave>,
) -> UtilizationSnapshot {
	let mut free = ResourceInfo::default();
	let mut total = ResourceInfo::default();

	for slave in slaves {
		total.cpus += slave.resources.cpus;
		total.mem += slave.resources.mem;
		total.disk += slave.resources.disk;
		free.cpus += slave.resources.cpus - slave.used_resources.cpus;
		free.mem += slave.resources.mem - slave.used_resources.mem;
		free.disk += slave.resources.disk - slave.used_resources.disk;
	}

	UtilizationSnapshot { free, total }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{MesosFramework, MesosTask, SlaveAttributes};

	fn slave(id: &str, pool: &str) -> MesosSlave {
		MesosSlave {
			id: id.to_string(),
			hostname: format!("host-{id}"),
			pid: format!("slave(1)@10.1.1.{}:5051", id.len()),
			attributes: SlaveAttributes {
				pool: Some(pool.to_string()),
			},
			resources: ResourceInfo {
				cpus: 10.0,
				mem: 4096.0,
				disk: 40.0,
			},
			used_resources: ResourceInfo {
				cpus: 5.0,
				mem: 2048.0,
				disk: 20.0,
			},
		}
	}

	fn task(slave_id: &str, state: &str) -> MesosTask {
		MesosTask {
			slave_id: slave_id.to_string(),
			state: state.to_string(),
		}
	}

	#[test]
	fn parses_slave_pid() {
		assert_eq!(
			slave_pid_to_ip("slave(1)@10.1.1.1:5051").as_deref(),
			Some("10.1.1.1")
		);
		assert_eq!(slave_pid_to_ip("slave(1)@:5051"), None);
		assert_eq!(slave_pid_to_ip("garbage"), None);
	}

	#[test]
	fn counts_running_tasks_per_slave() {
		let state = MesosState {
			slaves: vec![slave("a", "default"), slave("b", "default")],
			frameworks: vec![
				MesosFramework {
					name: "marathon".to_string(),
					tasks: vec![
						task("a", "TASK_RUNNING"),
						task("a", "TASK_RUNNING"),
						task("a", "TASK_FINISHED"),
						task("b", "TASK_RUNNING"),
					],
				},
				MesosFramework {
					name: "chronos-prod".to_string(),
					tasks: vec![task("b", "TASK_RUNNING")],
				},
			],
		};

		let counts = task_counts_for_pool(&state, "default");
		assert_eq!(counts.len(), 2);
		assert_eq!(counts[0].count, 2);
		assert_eq!(counts[0].chronos_count, 0);
		assert_eq!(counts[1].count, 2);
		assert_eq!(counts[1].chronos_count, 1);
	}

	#[test]
	fn counts_for_explicit_slave_set() {
		let state = MesosState {
			slaves: vec![slave("a", "default"), slave("b", "default")],
			frameworks: vec![],
		};

		let counts = task_counts_for_slaves(&state, &["b".to_string()]);
		assert_eq!(counts.len(), 1);
		assert_eq!(counts[0].slave.id, "b");
	}

	#[test]
	fn sums_utilization_over_slaves() {
		let slaves = vec![slave("a", "default"), slave("b", "default")];
		let snapshot = resource_utilization(&slaves);

		assert_eq!(snapshot.total.cpus, 20.0);
		assert_eq!(snapshot.free.cpus, 10.0);
		assert_eq!(snapshot.total.mem, 8192.0);
		assert_eq!(snapshot.free.disk, 40.0);
	}
}
