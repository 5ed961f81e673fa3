use crate::types::FleetSlave;

/// Orders termination candidates: fewest chronos tasks first, ties broken by
/// fewer running tasks. The downscale loop kills from the head, so
/// batch-clean and lightly-loaded slaves die first. The sort is stable with
/// respect to input order.
pub fn sort_slaves_to_kill(mut slaves: Vec<FleetSlave>) -> Vec<FleetSlave> {
	slaves.sort_by_key(|slave| (slave.task_counts.chronos_count, slave.task_counts.count));
	slaves
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::TaskCounts;

	fn slave(id: &str, count: u64, chronos_count: u64) -> FleetSlave {
		FleetSlave {
			id: id.to_string(),
			hostname: format!("host{id}"),
			pid: "slave(1)@10.1.1.1:5051".to_string(),
			ip: "10.1.1.1".to_string(),
			instance_id: format!("i-{id}"),
			instance_type: "c4.blah".to_string(),
			instance_weight: 1.0,
			task_counts: TaskCounts {
				count,
				chronos_count,
			},
		}
	}

	#[test]
	fn empty_input_yields_empty_output() {
		assert!(sort_slaves_to_kill(Vec::new()).is_empty());
	}

	#[test]
	fn chronos_clean_slaves_sort_first() {
		let sorted = sort_slaves_to_kill(vec![
			slave("1", 3, 0),
			slave("2", 2, 1),
			slave("3", 5, 0),
		]);

		let ids = sorted.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
		assert_eq!(ids, ["1", "3", "2"]);
	}

	#[test]
	fn sort_is_stable() {
		let sorted = sort_slaves_to_kill(vec![
			slave("1", 2, 0),
			slave("2", 2, 0),
			slave("3", 2, 0),
		]);

		let ids = sorted.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
		assert_eq!(ids, ["1", "2", "3"]);
	}
}
