//! Analyzer configuration

use std::path::PathBuf;

use analysis_lib::ThresholdMethod;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Analyzer configuration, read from `ANALYZER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Directory charts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Threshold method used when `--method` is not given
    #[serde(default)]
    pub threshold_method: ThresholdMethod,

    /// Emit logs as JSON lines instead of plain text
    #[serde(default)]
    pub log_json: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/plot")
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            threshold_method: ThresholdMethod::default(),
            log_json: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::Environment::with_prefix("ANALYZER").try_parsing(true)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid analyzer configuration")
    }
}
