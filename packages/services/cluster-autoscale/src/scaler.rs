use std::{collections::HashMap, sync::Arc};

use armada_config::{PoolSettings, Resource};
use armada_drain_util::DrainApi;
use armada_fleet_util::FleetApi;
use armada_mesos_util::{tasks, MesosApi};

use crate::{
	capacity::set_fleet_capacity, delta::spotfleet_metrics_provider, downscale::downscale_fleet,
	error::ScaleError, view::filter_fleet_slaves, SPOT_FLEET_KIND,
};

/// One resource kind's pair of capabilities: measure, then act. Adding a new
/// cloud backend means registering another implementation.
#[async_trait::async_trait]
pub trait PoolScaler: Send + Sync {
	/// Returns `(current, target)` capacity for the resource.
	async fn metrics(
		&self,
		resource: &Resource,
		pool_settings: &PoolSettings,
	) -> Result<(f64, f64), ScaleError>;

	/// Moves the resource from `current` towards `target`.
	async fn scale(
		&self,
		resource: &Resource,
		current_capacity: f64,
		target_capacity: f64,
		pool_settings: &PoolSettings,
		dry_run: bool,
	) -> Result<(), ScaleError>;
}

/// Scaler for spot-fleet-backed pools. Scale-up is a single capacity modify;
/// scale-down drives the graceful terminate protocol over slaves picked by
/// the selector.
pub struct SpotFleetScaler {
	fleet: Arc<dyn FleetApi>,
	mesos: Arc<dyn MesosApi>,
	drain: Arc<dyn DrainApi>,
}

impl SpotFleetScaler {
	pub fn new(fleet: Arc<dyn FleetApi>, mesos: Arc<dyn MesosApi>, drain: Arc<dyn DrainApi>) -> Self {
		SpotFleetScaler {
			fleet,
			mesos,
			drain,
		}
	}
}

#[async_trait::async_trait]
impl PoolScaler for SpotFleetScaler {
	async fn metrics(
		&self,
		resource: &Resource,
		pool_settings: &PoolSettings,
	) -> Result<(f64, f64), ScaleError> {
		spotfleet_metrics_provider(&*self.fleet, &*self.mesos, resource, pool_settings).await
	}

	async fn scale(
		&self,
		resource: &Resource,
		current_capacity: f64,
		target_capacity: f64,
		pool_settings: &PoolSettings,
		dry_run: bool,
	) -> Result<(), ScaleError> {
		if target_capacity == current_capacity {
			tracing::debug!(id = %resource.id, "fleet already at target capacity");
			return Ok(());
		}

		if target_capacity > current_capacity {
			// Growing needs no draining, the fleet fills the gap on its own
			return set_fleet_capacity(&*self.fleet, resource, target_capacity, dry_run).await;
		}

		let state = self.mesos.state().await?;
		let task_counts = tasks::task_counts_for_pool(&state, &resource.pool);

		let Some(request) = self
			.fleet
			.get_request(&resource.id, &resource.region)
			.await?
		else {
			tracing::warn!(id = %resource.id, "spot fleet request disappeared, skipping downscale");
			return Ok(());
		};

		let filtered_slaves =
			filter_fleet_slaves(&*self.fleet, resource, &request, task_counts).await?;

		downscale_fleet(
			&*self.fleet,
			&*self.mesos,
			&*self.drain,
			resource,
			filtered_slaves,
			pool_settings,
			current_capacity,
			target_capacity,
			dry_run,
		)
		.await?;

		Ok(())
	}
}

/// Maps a resource kind string to its scaler. The autoscale loop looks
/// implementations up here per resource.
#[derive(Default)]
pub struct ScalerRegistry {
	scalers: HashMap<&'static str, Arc<dyn PoolScaler>>,
}

impl ScalerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the spot fleet scaler wired to the given clients.
	pub fn spot_fleet(
		fleet: Arc<dyn FleetApi>,
		mesos: Arc<dyn MesosApi>,
		drain: Arc<dyn DrainApi>,
	) -> Self {
		let mut registry = Self::new();
		registry.register(
			SPOT_FLEET_KIND,
			Arc::new(SpotFleetScaler::new(fleet, mesos, drain)),
		);
		registry
	}

	pub fn register(&mut self, kind: &'static str, scaler: Arc<dyn PoolScaler>) {
		self.scalers.insert(kind, scaler);
	}

	pub fn get(&self, kind: &str) -> Option<Arc<dyn PoolScaler>> {
		self.scalers.get(kind).cloned()
	}
}
