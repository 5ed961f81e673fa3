use armada_drain_util::DrainError;
use armada_fleet_util::FleetError;
use armada_mesos_util::MesosError;

#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
	/// The fleet modify did not settle, the request is in a terminal state,
	/// or the cloud rejected the modify. Aborts the current pool's downscale.
	#[error("failed to set spot fleet request capacity: {0}")]
	FailSetSpotCapacity(String),

	/// The drain RPC failed. No capacity change has been made at this point.
	#[error("failed to drain {host}: {source}")]
	Drain { host: String, source: DrainError },

	/// The slave never became safe to kill within the drain timeout. Takes
	/// the same compensation path as a terminate failure.
	#[error("timed out waiting for {hostname} to become safe to kill")]
	WaitSafeTimeout { hostname: String },

	/// The fleet was already shrunk but the instance is still alive. The
	/// caller must have restored the previous target capacity before
	/// propagating this.
	#[error("failed to terminate instance {instance_id}: {source}")]
	Terminate {
		instance_id: String,
		source: FleetError,
	},

	#[error("fleet api: {0}")]
	Fleet(#[from] FleetError),

	#[error("mesos: {0}")]
	Mesos(#[from] MesosError),
}
