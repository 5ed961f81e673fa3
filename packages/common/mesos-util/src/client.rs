use std::time::Duration;

use url::Url;

use crate::{types::MesosState, MesosApi, MesosError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only client for the Mesos master HTTP API.
#[derive(Clone)]
pub struct Client {
	http: reqwest::Client,
	master: Url,
}

impl Client {
	pub fn new(master: Url) -> Result<Self, MesosError> {
		let http = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()?;

		Ok(Client { http, master })
	}
}

#[async_trait::async_trait]
impl MesosApi for Client {
	async fn state(&self) -> Result<MesosState, MesosError> {
		let url = self.master.join("master/state")?;
		let res = self.http.get(url).send().await?;

		let status = res.status();
		if !status.is_success() {
			return Err(MesosError::Api {
				status: status.as_u16(),
			});
		}

		res.json::<MesosState>().await.map_err(Into::into)
	}
}
