use std::time::Duration;

use armada_config::Resource;
use armada_fleet_util::{types::FleetRequestState, FleetApi};
use tokio::time::Instant;

use crate::error::ScaleError;

/// How long a fleet modify may stay in `modifying` before we give up.
const AWS_SPOT_MODIFY_TIMEOUT: Duration = Duration::from_secs(30);
const MODIFY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Sets the fleet's target capacity and waits for the modify to settle. The
/// caller never issues a second modify before the previous one left the
/// `modifying` state. Any failure here surfaces as `FailSetSpotCapacity`.
pub(crate) async fn set_fleet_capacity(
	fleet: &dyn FleetApi,
	resource: &Resource,
	capacity: f64,
	dry_run: bool,
) -> Result<(), ScaleError> {
	tracing::info!(id = %resource.id, %capacity, dry_run, "setting spot fleet request capacity");

	fleet
		.modify_capacity(&resource.id, capacity, dry_run, &resource.region)
		.await
		.map_err(|err| ScaleError::FailSetSpotCapacity(err.to_string()))?;

	if dry_run {
		// The remote side has no state transition to wait for
		return Ok(());
	}

	let deadline = Instant::now() + AWS_SPOT_MODIFY_TIMEOUT;
	loop {
		let request = fleet
			.get_request(&resource.id, &resource.region)
			.await
			.map_err(|err| ScaleError::FailSetSpotCapacity(err.to_string()))?;

		let Some(request) = request else {
			return Err(ScaleError::FailSetSpotCapacity(format!(
				"spot fleet request {} disappeared while modifying",
				resource.id
			)));
		};

		let state = request.spot_fleet_request_state;
		if state.is_cancelled() {
			return Err(ScaleError::FailSetSpotCapacity(format!(
				"spot fleet request {} is in terminal state {state}",
				resource.id
			)));
		}

		if state != FleetRequestState::Modifying {
			return Ok(());
		}

		if Instant::now() >= deadline {
			return Err(ScaleError::FailSetSpotCapacity(format!(
				"spot fleet request {} still modifying after {}s",
				resource.id,
				AWS_SPOT_MODIFY_TIMEOUT.as_secs()
			)));
		}

		tokio::time::sleep(MODIFY_POLL_INTERVAL).await;
	}
}
