use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use tokio::process::Command;

/// Where the step results end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    /// Add them to the pipeline environment with envman
    Envman,
    /// Print them as KEY=VALUE lines
    Stdout,
}

#[async_trait]
pub trait Exporter {
    async fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// EnvmanExporter makes values visible to later steps of the pipeline.
pub struct EnvmanExporter {
    binary: PathBuf,
}

impl EnvmanExporter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl Exporter for EnvmanExporter {
    async fn export(&self, key: &str, value: &str) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("add")
            .arg("--key")
            .arg(key)
            .arg("--value")
            .arg(value)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "failed to export env: {key}: {}\nStderr: {}",
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}

pub struct StdoutExporter;

#[async_trait]
impl Exporter for StdoutExporter {
    async fn export(&self, key: &str, value: &str) -> Result<()> {
        println!("{key}={value}");
        Ok(())
    }
}

pub fn exporter(target: ExportTarget, envman_bin: PathBuf) -> Box<dyn Exporter + Send + Sync> {
    match target {
        ExportTarget::Envman => Box::new(EnvmanExporter::new(envman_bin)),
        ExportTarget::Stdout => Box::new(StdoutExporter),
    }
}
