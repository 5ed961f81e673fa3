use anyhow::*;
use armada_config::ArmadaConfig;
use clap::Parser;

pub mod commands;

#[derive(Parser)]
pub enum SubCommand {
	/// Run one autoscaling tick across the configured resource pools
	Autoscale(commands::autoscale::Opts),
	/// Validate a scheduled-job config and print the formatted job
	CheckJobs(commands::check_jobs::Opts),
}

impl SubCommand {
	pub async fn execute(self, config: ArmadaConfig) -> Result<()> {
		match self {
			SubCommand::Autoscale(opts) => commands::autoscale::execute(config, opts).await,
			SubCommand::CheckJobs(opts) => commands::check_jobs::execute(opts).await,
		}
	}
}
