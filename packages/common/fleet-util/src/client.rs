use std::time::Duration;

use reqwest::header;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::{
	types::{ActiveInstance, Filter, FleetRequest, Instance},
	FleetApi, FleetError, INSTANCE_NOT_FOUND, SFR_NOT_FOUND,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct ApiErrorResponse {
	#[serde(rename = "Error")]
	error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
	#[serde(rename = "Code")]
	code: String,
	#[serde(rename = "Message", default)]
	message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSpotFleetRequestsResponse {
	spot_fleet_request_configs: Vec<FleetRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSpotFleetInstancesResponse {
	active_instances: Vec<ActiveInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesResponse {
	reservations: Vec<Reservation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
	instances: Vec<Instance>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModifySpotFleetRequest {
	target_capacity: f64,
	excess_capacity_termination_policy: &'static str,
	dry_run: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesRequest<'a> {
	instance_ids: &'a [String],
	filters: &'a [Filter],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TerminateInstancesRequest {
	instance_ids: Vec<String>,
	dry_run: bool,
}

/// Typed wrapper over the spot fleet HTTP API.
#[derive(Clone)]
pub struct Client {
	http: reqwest::Client,
	endpoint: Url,
}

impl Client {
	pub fn new(endpoint: Url, api_token: Option<&str>) -> Result<Self, FleetError> {
		let mut headers = header::HeaderMap::new();
		if let Some(token) = api_token {
			let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
				.map_err(|_| FleetError::InvalidApiToken)?;
			headers.insert(header::AUTHORIZATION, value);
		}

		let http = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.default_headers(headers)
			.build()?;

		Ok(Client { http, endpoint })
	}

	fn url(&self, region: &str, path: &str) -> Result<Url, FleetError> {
		self.endpoint
			.join(&format!("v1/{region}/{path}"))
			.map_err(Into::into)
	}

	async fn get<T: DeserializeOwned>(&self, region: &str, path: &str) -> Result<T, FleetError> {
		let res = self.http.get(self.url(region, path)?).send().await?;
		Self::parse(res).await
	}

	async fn post<T: DeserializeOwned, B: Serialize>(
		&self,
		region: &str,
		path: &str,
		body: &B,
	) -> Result<T, FleetError> {
		let res = self
			.http
			.post(self.url(region, path)?)
			.json(body)
			.send()
			.await?;
		Self::parse(res).await
	}

	async fn parse<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, FleetError> {
		let status = res.status();
		if status.is_success() {
			return res.json::<T>().await.map_err(Into::into);
		}

		match res.json::<ApiErrorResponse>().await {
			Ok(body) => Err(FleetError::Api {
				status: status.as_u16(),
				code: body.error.code,
				message: body.error.message,
			}),
			Err(_) => Err(FleetError::Api {
				status: status.as_u16(),
				code: "Unknown".to_string(),
				message: format!("fleet api returned {status}"),
			}),
		}
	}
}

#[async_trait::async_trait]
impl FleetApi for Client {
	async fn get_request(
		&self,
		id: &str,
		region: &str,
	) -> Result<Option<FleetRequest>, FleetError> {
		let res = self
			.get::<DescribeSpotFleetRequestsResponse>(
				region,
				&format!("spot-fleet-requests/{id}"),
			)
			.await;

		match res {
			Ok(body) => Ok(body.spot_fleet_request_configs.into_iter().next()),
			Err(err) if err.code() == Some(SFR_NOT_FOUND) => Ok(None),
			Err(err) => Err(err),
		}
	}

	async fn get_active_instances(
		&self,
		id: &str,
		region: &str,
	) -> Result<Vec<ActiveInstance>, FleetError> {
		let body = self
			.get::<DescribeSpotFleetInstancesResponse>(
				region,
				&format!("spot-fleet-requests/{id}/instances"),
			)
			.await?;

		Ok(body.active_instances)
	}

	async fn describe_instances(
		&self,
		instance_ids: &[String],
		region: &str,
		filters: &[Filter],
	) -> Result<Option<Vec<Instance>>, FleetError> {
		let res = self
			.post::<DescribeInstancesResponse, _>(
				region,
				"instances/describe",
				&DescribeInstancesRequest {
					instance_ids,
					filters,
				},
			)
			.await;

		match res {
			Ok(body) => Ok(Some(
				body.reservations
					.into_iter()
					.flat_map(|r| r.instances)
					.collect(),
			)),
			Err(err) if err.code() == Some(INSTANCE_NOT_FOUND) => Ok(None),
			Err(err) => Err(err),
		}
	}

	async fn modify_capacity(
		&self,
		id: &str,
		target_capacity: f64,
		dry_run: bool,
		region: &str,
	) -> Result<(), FleetError> {
		tracing::info!(%id, %target_capacity, dry_run, "modifying spot fleet request");

		self.post::<serde_json::Value, _>(
			region,
			&format!("spot-fleet-requests/{id}/modify"),
			&ModifySpotFleetRequest {
				target_capacity,
				excess_capacity_termination_policy: "noTermination",
				dry_run,
			},
		)
		.await?;

		Ok(())
	}

	async fn terminate(
		&self,
		instance_id: &str,
		dry_run: bool,
		region: &str,
	) -> Result<(), FleetError> {
		tracing::info!(%instance_id, dry_run, "terminating instance");

		self.post::<serde_json::Value, _>(
			region,
			"instances/terminate",
			&TerminateInstancesRequest {
				instance_ids: vec![instance_id.to_string()],
				dry_run,
			},
		)
		.await?;

		Ok(())
	}
}
