use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum DrainError {
	#[error("drain service returned {status}")]
	Api { status: u16 },
	#[error("http: {0}")]
	Http(#[from] reqwest::Error),
	#[error("url: {0}")]
	Url(#[from] url::ParseError),
}

/// The drain/undrain mechanism on individual hosts. Hosts are addressed as
/// `"<hostname>|<ip>"`; start and duration are nanosecond timestamps.
#[async_trait::async_trait]
pub trait DrainApi: Send + Sync {
	async fn drain(&self, hosts: &[String], start: i64, duration: i64) -> Result<(), DrainError>;

	async fn undrain(&self, hosts: &[String]) -> Result<(), DrainError>;

	/// Whether all work has migrated off the host.
	async fn is_safe_to_kill(&self, hostname: &str) -> Result<bool, DrainError>;
}

#[derive(Serialize)]
struct DrainRequest<'a> {
	hosts: &'a [String],
	start: i64,
	duration: i64,
}

#[derive(Serialize)]
struct UndrainRequest<'a> {
	hosts: &'a [String],
}

#[derive(Deserialize)]
struct SafeToKillResponse {
	safe: bool,
}

/// HTTP client for the drain service.
#[derive(Clone)]
pub struct Client {
	http: reqwest::Client,
	endpoint: Url,
}

impl Client {
	pub fn new(endpoint: Url) -> Result<Self, DrainError> {
		let http = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()?;

		Ok(Client { http, endpoint })
	}

	async fn check(res: reqwest::Response) -> Result<reqwest::Response, DrainError> {
		let status = res.status();
		if !status.is_success() {
			return Err(DrainError::Api {
				status: status.as_u16(),
			});
		}

		Ok(res)
	}
}

#[async_trait::async_trait]
impl DrainApi for Client {
	async fn drain(&self, hosts: &[String], start: i64, duration: i64) -> Result<(), DrainError> {
		tracing::info!(?hosts, start, duration, "draining hosts");

		let res = self
			.http
			.post(self.endpoint.join("v1/drain")?)
			.json(&DrainRequest {
				hosts,
				start,
				duration,
			})
			.send()
			.await?;
		Self::check(res).await?;

		Ok(())
	}

	async fn undrain(&self, hosts: &[String]) -> Result<(), DrainError> {
		tracing::info!(?hosts, "undraining hosts");

		let res = self
			.http
			.post(self.endpoint.join("v1/undrain")?)
			.json(&UndrainRequest { hosts })
			.send()
			.await?;
		Self::check(res).await?;

		Ok(())
	}

	async fn is_safe_to_kill(&self, hostname: &str) -> Result<bool, DrainError> {
		let res = self
			.http
			.get(self.endpoint.join(&format!("v1/safe-to-kill/{hostname}"))?)
			.send()
			.await?;
		let res = Self::check(res).await?;

		Ok(res.json::<SafeToKillResponse>().await?.safe)
	}
}
