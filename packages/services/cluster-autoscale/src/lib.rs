mod capacity;
pub mod delta;
pub mod downscale;
mod error;
pub mod metrics;
pub mod scaler;
pub mod selector;
pub mod terminate;
pub mod types;
pub mod view;

pub use error::ScaleError;
pub use scaler::{PoolScaler, ScalerRegistry, SpotFleetScaler};

use armada_config::ArmadaConfig;

/// Resource kind handled by [`SpotFleetScaler`].
pub const SPOT_FLEET_KIND: &str = "sfr";

/// Runs one autoscale pass over every configured resource. Each resource is
/// measured and scaled independently; a failing pool is logged and counted
/// but never aborts the others.
pub async fn autoscale_cluster(
	registry: &ScalerRegistry,
	config: &ArmadaConfig,
	pool_filter: Option<&str>,
	dry_run: bool,
) {
	for (resource_id, resource) in &config.cluster_autoscaling_resources {
		if let Some(pool) = pool_filter {
			if resource.pool != pool {
				continue;
			}
		}

		let pool_settings = config.pool_settings(&resource.pool);

		let Some(scaler) = registry.get(&resource.kind) else {
			tracing::error!(
				%resource_id,
				kind = %resource.kind,
				"no scaler registered for resource kind"
			);
			metrics::AUTOSCALE_ERRORS
				.with_label_values(&[&resource.id, &resource.pool])
				.inc();
			continue;
		};

		let (current_capacity, target_capacity) =
			match scaler.metrics(resource, &pool_settings).await {
				Ok(capacities) => capacities,
				Err(err) => {
					tracing::error!(%resource_id, ?err, "failed to compute cluster metrics");
					metrics::AUTOSCALE_ERRORS
						.with_label_values(&[&resource.id, &resource.pool])
						.inc();
					continue;
				}
			};

		metrics::CLUSTER_CURRENT_CAPACITY
			.with_label_values(&[&resource.id, &resource.pool])
			.set(current_capacity);
		metrics::CLUSTER_TARGET_CAPACITY
			.with_label_values(&[&resource.id, &resource.pool])
			.set(target_capacity);

		tracing::info!(
			%resource_id,
			pool = %resource.pool,
			%current_capacity,
			%target_capacity,
			dry_run,
			"autoscaling resource"
		);

		if let Err(err) = scaler
			.scale(
				resource,
				current_capacity,
				target_capacity,
				&pool_settings,
				dry_run,
			)
			.await
		{
			tracing::error!(%resource_id, ?err, "failed to scale resource");
			metrics::AUTOSCALE_ERRORS
				.with_label_values(&[&resource.id, &resource.pool])
				.inc();
		}
	}
}
