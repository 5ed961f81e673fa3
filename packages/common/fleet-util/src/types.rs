use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FleetRequest {
	pub spot_fleet_request_id: String,
	pub spot_fleet_request_state: FleetRequestState,
	pub spot_fleet_request_config: FleetRequestConfig,
}

impl FleetRequest {
	/// Weighted capacity per instance type from the fleet's launch
	/// specifications.
	pub fn instance_type_weights(&self) -> HashMap<String, f64> {
		self.spot_fleet_request_config
			.launch_specifications
			.iter()
			.map(|spec| (spec.instance_type.clone(), spec.weighted_capacity))
			.collect()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetRequestState {
	Submitted,
	Active,
	Modifying,
	Cancelled,
	CancelledRunning,
	CancelledTerminating,
	Failed,
}

impl FleetRequestState {
	/// Whether the request has been cancelled in any form. A cancelled fleet
	/// must not be scaled.
	pub fn is_cancelled(&self) -> bool {
		matches!(
			self,
			FleetRequestState::Cancelled
				| FleetRequestState::CancelledRunning
				| FleetRequestState::CancelledTerminating
		)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			FleetRequestState::Submitted => "submitted",
			FleetRequestState::Active => "active",
			FleetRequestState::Modifying => "modifying",
			FleetRequestState::Cancelled => "cancelled",
			FleetRequestState::CancelledRunning => "cancelled_running",
			FleetRequestState::CancelledTerminating => "cancelled_terminating",
			FleetRequestState::Failed => "failed",
		}
	}
}

impl fmt::Display for FleetRequestState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FleetRequestConfig {
	pub target_capacity: f64,
	#[serde(default)]
	pub fulfilled_capacity: f64,
	#[serde(default)]
	pub launch_specifications: Vec<LaunchSpecification>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchSpecification {
	pub instance_type: String,
	pub weighted_capacity: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveInstance {
	pub instance_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
	pub instance_id: String,
	pub private_ip_address: String,
	pub instance_type: String,
}

/// A name/values pair passed to instance describes, e.g.
/// `private-ip-address`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
	pub name: String,
	pub values: Vec<String>,
}

impl Filter {
	pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
		Filter {
			name: name.into(),
			values,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_fleet_request() {
		let body = serde_json::json!({
			"SpotFleetRequestId": "sfr-blah",
			"SpotFleetRequestState": "cancelled_running",
			"SpotFleetRequestConfig": {
				"TargetCapacity": 4.0,
				"FulfilledCapacity": 4.5,
				"LaunchSpecifications": [
					{"InstanceType": "c4.blah", "WeightedCapacity": 123.0},
					{"InstanceType": "m4.whatever", "WeightedCapacity": 456.0},
				],
			},
		});

		let request = serde_json::from_value::<FleetRequest>(body).unwrap();
		assert_eq!(request.spot_fleet_request_id, "sfr-blah");
		assert!(request.spot_fleet_request_state.is_cancelled());
		assert_eq!(request.spot_fleet_request_config.fulfilled_capacity, 4.5);

		let weights = request.instance_type_weights();
		assert_eq!(weights["c4.blah"], 123.0);
		assert_eq!(weights["m4.whatever"], 456.0);
	}

	#[test]
	fn active_state_is_not_cancelled() {
		assert!(!FleetRequestState::Active.is_cancelled());
		assert!(!FleetRequestState::Modifying.is_cancelled());
		assert!(FleetRequestState::CancelledTerminating.is_cancelled());
	}
}
