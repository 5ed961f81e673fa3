mod client;
pub mod types;

pub use client::Client;

use types::{ActiveInstance, Filter, FleetRequest, Instance};

/// Error code the fleet API returns for a describe/get against an unknown
/// spot fleet request id.
pub const SFR_NOT_FOUND: &str = "InvalidSpotFleetRequestId.NotFound";
/// Error code for a describe against unknown instance ids.
pub const INSTANCE_NOT_FOUND: &str = "InvalidInstanceID.NotFound";

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
	#[error("fleet api error ({code}): {message}")]
	Api {
		status: u16,
		code: String,
		message: String,
	},
	#[error("http: {0}")]
	Http(#[from] reqwest::Error),
	#[error("url: {0}")]
	Url(#[from] url::ParseError),
	#[error("invalid api token")]
	InvalidApiToken,
}

impl FleetError {
	pub fn code(&self) -> Option<&str> {
		match self {
			FleetError::Api { code, .. } => Some(code),
			_ => None,
		}
	}
}

/// The spot fleet operations the autoscaler consumes. Implemented by
/// [`Client`] against the real API and by in-memory fakes in tests.
#[async_trait::async_trait]
pub trait FleetApi: Send + Sync {
	/// Fetches a spot fleet request. `None` when the id is unknown.
	async fn get_request(&self, id: &str, region: &str)
		-> Result<Option<FleetRequest>, FleetError>;

	/// Lists the instances currently fulfilling the fleet.
	async fn get_active_instances(
		&self,
		id: &str,
		region: &str,
	) -> Result<Vec<ActiveInstance>, FleetError>;

	/// Describes instances by id and/or filter. `None` when any of the ids is
	/// unknown.
	async fn describe_instances(
		&self,
		instance_ids: &[String],
		region: &str,
		filters: &[Filter],
	) -> Result<Option<Vec<Instance>>, FleetError>;

	/// Sets the fleet's target capacity. Always requests the
	/// `noTermination` excess capacity policy so the fleet never culls
	/// instances on its own.
	async fn modify_capacity(
		&self,
		id: &str,
		target_capacity: f64,
		dry_run: bool,
		region: &str,
	) -> Result<(), FleetError>;

	/// Terminates a single instance.
	async fn terminate(
		&self,
		instance_id: &str,
		dry_run: bool,
		region: &str,
	) -> Result<(), FleetError>;
}
