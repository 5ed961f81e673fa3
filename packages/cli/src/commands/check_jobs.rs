use std::path::PathBuf;

use anyhow::*;
use chronos_config::ChronosJobConfig;
use clap::Parser;

#[derive(Parser)]
pub struct Opts {
	/// Path to the job description (json or yaml)
	#[clap(long)]
	file: PathBuf,

	/// Job type to validate against: scheduled, dependent, or docker
	#[clap(long, default_value = "scheduled")]
	job_type: String,
}

pub async fn execute(opts: Opts) -> Result<()> {
	let data = tokio::fs::read_to_string(&opts.file)
		.await
		.with_context(|| format!("failed to read job config at {}", opts.file.display()))?;

	let value = match opts.file.extension().and_then(|s| s.to_str()) {
		Some("json") => serde_json::from_str::<serde_json::Value>(&data)?,
		Some("yaml") | Some("yml") => serde_yaml::from_str::<serde_json::Value>(&data)?,
		_ => bail!("unrecognized job config extension at {}", opts.file.display()),
	};

	let config = ChronosJobConfig::from_value(value).map_err(|err| anyhow!("{err}"))?;
	let formatted = chronos_config::format_job(&config, &opts.job_type)
		.map_err(|err| anyhow!("invalid job config:\n{err}"))?;

	println!("{}", serde_json::to_string_pretty(&formatted)?);

	Ok(())
}
