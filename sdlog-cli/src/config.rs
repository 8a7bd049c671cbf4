//! Job file loading and parsing
//!
//! A TOML job file describes one decoding run: the capture to read, the
//! module table, where the output goes, and the decode knobs. Command-line
//! flags override the file's values.

use anyhow::{Context, Result};
use sdlog_decoder::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from a job.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub decode: DecodeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Raw capture file to decode
    pub capture: PathBuf,
    /// JSON module name table
    #[serde(default)]
    pub module_table: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// CSV output path; stdout when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecodeConfig {
    #[serde(default = "default_gate_tolerance")]
    pub gate_tolerance_ms: i64,
    #[serde(default)]
    pub max_frames: Option<usize>,
    /// Restrict channel updates to these identifiers
    #[serde(default)]
    pub identifiers: Option<Vec<u16>>,
}

fn default_gate_tolerance() -> i64 {
    sdlog_decoder::DeltaGate::DEFAULT_TOLERANCE_MS
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            gate_tolerance_ms: default_gate_tolerance(),
            max_frames: None,
            identifiers: None,
        }
    }
}

impl DecodeConfig {
    /// Translate into the decoder library's configuration
    pub fn to_decoder_config(&self) -> DecoderConfig {
        let mut config = DecoderConfig::new().with_gate_tolerance(self.gate_tolerance_ms);
        if let Some(identifiers) = &self.identifiers {
            config = config.with_identifier_filter(identifiers.clone());
        }
        if let Some(max) = self.max_frames {
            config = config.with_max_frames(max);
        }
        config
    }
}

/// Load and parse a TOML job file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read job file {:?}", path))?;
    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("failed to parse job file {:?}", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_job_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[input]\ncapture = \"LOG0001.BIN\"\n")
            .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.input.capture, PathBuf::from("LOG0001.BIN"));
        assert!(config.input.module_table.is_none());
        assert!(config.output.path.is_none());
        assert_eq!(config.decode.gate_tolerance_ms, 10);
    }

    #[test]
    fn test_full_job_file() {
        let toml = r#"
            [input]
            capture = "LOG0001.BIN"
            module_table = "modules.json"

            [output]
            path = "decoded.csv"

            [decode]
            gate_tolerance_ms = 25
            max_frames = 5000
            identifiers = [1000, 1415]
        "#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.decode.gate_tolerance_ms, 25);

        let decoder_config = config.decode.to_decoder_config();
        assert_eq!(decoder_config.gate_tolerance_ms, 25);
        assert_eq!(decoder_config.max_frames, Some(5000));
        assert!(decoder_config.should_process_identifier(1415));
        assert!(!decoder_config.should_process_identifier(1401));
    }

    #[test]
    fn test_missing_file_is_contextual_error() {
        let err = load_config(Path::new("no-such-job.toml")).unwrap_err();
        assert!(err.to_string().contains("no-such-job.toml"));
    }
}
