mod client;
pub mod tasks;
pub mod types;

pub use client::Client;

use types::MesosState;

#[derive(Debug, thiserror::Error)]
pub enum MesosError {
	#[error("mesos master returned {status}")]
	Api { status: u16 },
	#[error("http: {0}")]
	Http(#[from] reqwest::Error),
	#[error("url: {0}")]
	Url(#[from] url::ParseError),
}

/// Read access to the Mesos master. The control loop takes one state snapshot
/// per pass and derives everything else from it.
#[async_trait::async_trait]
pub trait MesosApi: Send + Sync {
	async fn state(&self) -> Result<MesosState, MesosError>;
}
