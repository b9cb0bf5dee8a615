//! Pipeline configuration

use fieldrules_core::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::job::DEFAULT_CHUNK_SIZE;

/// Pipeline configuration, read from `fieldrules.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rule configuration (JSON, or YAML by extension)
    pub rules_path: PathBuf,

    /// Newline-delimited JSON client rows
    pub input_path: Option<PathBuf>,

    /// CSV output
    pub output_path: PathBuf,

    /// Records per chunk
    pub chunk_size: usize,

    pub log_format: LogFormat,
}

impl PipelineConfig {
    /// Load from a YAML file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("config/rules.json"),
            input_path: None,
            output_path: PathBuf::from("output/clients.csv"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            log_format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}
