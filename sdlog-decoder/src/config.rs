//! Decoder configuration types
//!
//! The minimal knobs the decoding pipeline accepts. Anything application
//! shaped (output paths, file formats, progress reporting) lives in the
//! application layer, not here.

use crate::gate::DeltaGate;
use serde::{Deserialize, Serialize};

/// Configuration for one decoding run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Time-gate tolerance in milliseconds (see `gate::DeltaGate`)
    #[serde(default = "default_gate_tolerance")]
    pub gate_tolerance_ms: i64,

    /// Optional: only these identifiers may update channels. Header fields
    /// are still emitted for every frame.
    #[serde(default)]
    pub identifier_filter: Option<Vec<u16>>,

    /// Optional cap on the number of frames decoded, for quick inspection
    /// of large captures
    #[serde(default)]
    pub max_frames: Option<usize>,
}

fn default_gate_tolerance() -> i64 {
    DeltaGate::DEFAULT_TOLERANCE_MS
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            gate_tolerance_ms: default_gate_tolerance(),
            identifier_filter: None,
            max_frames: None,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the time-gate tolerance
    pub fn with_gate_tolerance(mut self, tolerance_ms: i64) -> Self {
        self.gate_tolerance_ms = tolerance_ms;
        self
    }

    /// Builder method: restrict channel updates to these identifiers
    pub fn with_identifier_filter(mut self, identifiers: Vec<u16>) -> Self {
        self.identifier_filter = Some(identifiers);
        self
    }

    /// Builder method: cap the number of decoded frames
    pub fn with_max_frames(mut self, max: usize) -> Self {
        self.max_frames = Some(max);
        self
    }

    /// Check whether an identifier may update channels
    pub fn should_process_identifier(&self, identifier: u16) -> bool {
        match &self.identifier_filter {
            Some(identifiers) => identifiers.contains(&identifier),
            None => true,
        }
    }
}
