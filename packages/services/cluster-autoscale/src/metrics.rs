use lazy_static::lazy_static;
use prometheus::{register_gauge_vec, register_int_counter_vec, GaugeVec, IntCounterVec};

lazy_static! {
	pub static ref CLUSTER_CURRENT_CAPACITY: GaugeVec = register_gauge_vec!(
		"armada_cluster_current_capacity",
		"Fulfilled fleet capacity per autoscaled resource.",
		&["resource_id", "pool"]
	)
	.unwrap();
	pub static ref CLUSTER_TARGET_CAPACITY: GaugeVec = register_gauge_vec!(
		"armada_cluster_target_capacity",
		"Computed target fleet capacity per autoscaled resource.",
		&["resource_id", "pool"]
	)
	.unwrap();
	pub static ref SLAVES_TERMINATED: IntCounterVec = register_int_counter_vec!(
		"armada_cluster_slaves_terminated_total",
		"Slaves gracefully terminated by the downscale loop.",
		&["resource_id", "pool"]
	)
	.unwrap();
	pub static ref AUTOSCALE_ERRORS: IntCounterVec = register_int_counter_vec!(
		"armada_cluster_autoscale_errors_total",
		"Autoscale passes that failed for a resource.",
		&["resource_id", "pool"]
	)
	.unwrap();
}
