use anyhow::{Context, Result};
use prevbuild_core::{BuildSource, StepConfig, pipeline};
use tracing::info;

use crate::export::Exporter;

/// Resolves the previous build status and exports the results.
pub async fn execute<S>(config: &StepConfig, source: &S, exporter: &dyn Exporter) -> Result<()>
where
    S: BuildSource + ?Sized,
{
    let report = pipeline::run(config, source)
        .await
        .context("Failed to find previous build")?;

    info!("Exporting environment variables:");
    for (key, value) in report.env_vars() {
        exporter
            .export(key, &value)
            .await
            .with_context(|| format!("failed to export env: {key}"))?;
        info!("- {key}={value}");
    }
    info!("- Done");

    Ok(())
}
