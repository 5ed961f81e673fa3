use std::path::PathBuf;

use anyhow::*;
use armada_cli::SubCommand;
use clap::Parser;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "Armada", version, about)]
struct Cli {
	#[command(subcommand)]
	command: SubCommand,

	/// Path to the armada config file
	#[clap(long, global = true, default_value = "/etc/armada/armada.yaml")]
	config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
	init_tracing();

	let cli = Cli::parse();

	// Load config
	let config = armada_config::load(&cli.config)
		.await
		.map_err(|err| anyhow!("{err}"))?;

	// Execute command
	cli.command.execute(config).await
}

fn init_tracing() {
	tracing_subscriber::registry()
		.with(
			tracing_logfmt::builder().layer().with_filter(
				tracing_subscriber::EnvFilter::try_from_default_env()
					.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
			),
		)
		.init();
}
