use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file at {path}: {source}")]
	Read {
		path: String,
		source: std::io::Error,
	},
	#[error("failed to parse config file at {path}: {message}")]
	Parse { path: String, message: String },
	#[error("unrecognized config file extension at {0}")]
	UnknownExtension(String),
}

/// Top level configuration for the autoscaler. Read once per invocation; the
/// control loop never mutates it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmadaConfig {
	pub endpoints: Endpoints,

	/// Capacity pools to autoscale, keyed by resource id.
	#[serde(default)]
	pub cluster_autoscaling_resources: HashMap<String, Resource>,

	/// Per-pool tuning, keyed by pool name. Pools without an entry fall back
	/// to defaults.
	#[serde(default)]
	pub resource_pool_settings: HashMap<String, PoolSettings>,
}

impl ArmadaConfig {
	pub fn pool_settings(&self, pool: &str) -> PoolSettings {
		self.resource_pool_settings
			.get(pool)
			.cloned()
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoints {
	/// Base URL of the spot fleet API.
	pub fleet_api: Url,
	/// Bearer token for the fleet API, if it requires one.
	#[serde(default)]
	pub fleet_api_token: Option<String>,
	/// Base URL of the Mesos master.
	pub mesos_master: Url,
	/// Base URL of the drain service.
	pub drain_service: Url,
}

/// One spot-fleet-backed capacity pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
	pub id: String,
	/// Resource kind, selects the scaler implementation. Currently only
	/// `sfr`.
	#[serde(rename = "type")]
	pub kind: String,
	pub region: String,
	pub pool: String,
	#[serde(default = "defaults::min_capacity")]
	pub min_capacity: f64,
	pub max_capacity: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSettings {
	/// How long to wait for a draining slave to become safe to kill, in
	/// seconds.
	#[serde(default = "defaults::drain_timeout")]
	pub drain_timeout: u64,
	/// Fraction of the most constrained resource dimension the pool should
	/// sit at. Must be in (0, 1).
	#[serde(default = "defaults::target_utilization")]
	pub target_utilization: f64,
}

impl Default for PoolSettings {
	fn default() -> Self {
		PoolSettings {
			drain_timeout: defaults::drain_timeout(),
			target_utilization: defaults::target_utilization(),
		}
	}
}

mod defaults {
	pub fn min_capacity() -> f64 {
		1.0
	}

	pub fn drain_timeout() -> u64 {
		600
	}

	pub fn target_utilization() -> f64 {
		0.8
	}
}

/// Reads and parses a config file, choosing the format by extension.
pub async fn load(path: &Path) -> Result<ArmadaConfig, ConfigError> {
	let data = tokio::fs::read_to_string(path)
		.await
		.map_err(|source| ConfigError::Read {
			path: path.display().to_string(),
			source,
		})?;

	match path.extension().and_then(|s| s.to_str()) {
		Some("json") => {
			serde_json::from_str::<ArmadaConfig>(&data).map_err(|err| ConfigError::Parse {
				path: path.display().to_string(),
				message: err.to_string(),
			})
		}
		Some("yaml") | Some("yml") => {
			serde_yaml::from_str::<ArmadaConfig>(&data).map_err(|err| ConfigError::Parse {
				path: path.display().to_string(),
				message: err.to_string(),
			})
		}
		_ => Err(ConfigError::UnknownExtension(path.display().to_string())),
	}
}
