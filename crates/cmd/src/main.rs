mod client;
mod commands;
mod export;
mod types;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use prevbuild_core::{StepConfig, StepInputs, config::DEFAULT_API_URL};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    client::BitriseClient,
    commands::{inspect, run},
    export::{ExportTarget, exporter},
};

#[derive(Parser)]
#[command(name = "prevbuild")]
#[command(about = "Tells whether a build's outcome differs from the previous equivalent build")]
struct Cli {
    #[command(flatten)]
    inputs: InputArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare against the previous build and export the results (default)
    Run,
    /// Show how the current build is matched, without exporting anything
    Inspect,
}

#[derive(Args)]
struct InputArgs {
    /// Slug of the app
    #[arg(long, global = true, env = "BITRISE_APP_SLUG")]
    app_slug: Option<String>,
    /// Slug of the current build
    #[arg(long, global = true, env = "BITRISE_BUILD_SLUG")]
    build_slug: Option<String>,
    /// Status code of the current build, 0 while nothing has failed
    #[arg(long, global = true, env = "BITRISE_BUILD_STATUS")]
    build_status: Option<String>,
    /// Status text of the previous build; skips the lookup when set
    #[arg(long, global = true, env = "PREVIOUS_BUILD_STATUS")]
    previous_build_status: Option<String>,
    /// API access token
    #[arg(long, global = true, env = "access_token", hide_env_values = true)]
    access_token: Option<String>,
    /// Builds API URL
    #[arg(long, global = true, env = "BITRISE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Where to export the results
    #[arg(long, global = true, value_enum, env = "PREVBUILD_EXPORT", default_value_t = ExportTarget::Envman)]
    export: ExportTarget,
    /// Path to the envman binary
    #[arg(long, global = true, env = "ENVMAN_BIN", default_value = "envman")]
    envman_bin: PathBuf,
}

impl InputArgs {
    fn step_inputs(&self) -> StepInputs {
        StepInputs {
            app_slug: self.app_slug.clone().unwrap_or_default(),
            build_slug: self.build_slug.clone().unwrap_or_default(),
            build_status: self.build_status.clone().unwrap_or_default(),
            previous_build_status: self.previous_build_status.clone(),
            access_token: self.access_token.clone().unwrap_or_default(),
            api_url: self.api_url.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    execute(&cli).await
}

async fn execute(cli: &Cli) -> Result<()> {
    let config = StepConfig::from_inputs(cli.inputs.step_inputs())
        .map_err(prevbuild_core::Error::from)?;
    info!("Configs:\n{config}");

    let source = BitriseClient::new(&config.api_url, config.access_token.clone());

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Run => {
            let exporter = exporter(cli.inputs.export, cli.inputs.envman_bin.clone());
            run::execute(&config, &source, exporter.as_ref()).await?;
        }
        Commands::Inspect => {
            inspect::execute(&config, &source).await?;
        }
    }

    Ok(())
}
