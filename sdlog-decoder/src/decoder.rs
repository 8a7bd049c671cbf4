//! Main decoder API
//!
//! Wires the pipeline together: frame splitting, header and identifier
//! decoding, time gating, channel dispatch. One strictly sequential pass
//! over the capture - the splitter's cut positions and the gate's previous
//! timestamp both depend on every prior frame.

use crate::capture::RawCapture;
use crate::channels::ChannelDispatcher;
use crate::config::DecoderConfig;
use crate::gate::{DeltaGate, GatePolicy};
use crate::modules::ModuleLookup;
use crate::splitter::FrameSplitter;
use crate::types::{ChannelRecord, DecodeError, Result};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    lookup: ModuleLookup,
}

impl Decoder {
    /// Create a decoder with an empty module table
    pub fn new() -> Self {
        Self {
            lookup: ModuleLookup::new(),
        }
    }

    /// Create a decoder around an already-loaded module table
    pub fn with_lookup(lookup: ModuleLookup) -> Self {
        Self { lookup }
    }

    /// Load the module name table from a JSON file
    ///
    /// The table is read once here and kept for the decoder's lifetime.
    pub fn load_module_table(&mut self, path: &Path) -> Result<()> {
        self.lookup = ModuleLookup::from_path(path)?;
        Ok(())
    }

    /// The loaded module table
    pub fn module_lookup(&self) -> &ModuleLookup {
        &self.lookup
    }

    /// Decode a capture, returning a lazy iterator of output records
    ///
    /// Framing errors terminate the iterator with an `Err` item; payload
    /// decode errors degrade the affected record to header-only and the
    /// iteration continues.
    pub fn decode_capture<'a>(
        &'a self,
        capture: &'a RawCapture,
        config: &DecoderConfig,
    ) -> DecodingIterator<'a> {
        let gate = Box::new(DeltaGate::new(config.gate_tolerance_ms));
        self.decode_capture_with_gate(capture, config, gate)
    }

    /// Decode a capture with an injected gate policy
    pub fn decode_capture_with_gate<'a>(
        &'a self,
        capture: &'a RawCapture,
        config: &DecoderConfig,
        gate: Box<dyn GatePolicy>,
    ) -> DecodingIterator<'a> {
        log::info!("Decoding capture: {} bytes", capture.len());
        DecodingIterator {
            splitter: FrameSplitter::new(capture),
            dispatcher: ChannelDispatcher::new(&self.lookup),
            gate,
            config: config.clone(),
            stats: DecodeStats::default(),
        }
    }

    /// Convenience: load a capture file and decode it fully
    pub fn decode_file(&self, path: &Path, config: &DecoderConfig) -> Result<Vec<ChannelRecord>> {
        let capture = RawCapture::from_path(path)?;
        self.decode_capture(&capture, config).collect()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters accumulated over one decoding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Records emitted (one per recovered frame)
    pub frames: usize,
    /// Frames whose channel updates the gate suppressed
    pub gated_off: usize,
    /// Frames degraded to header-only by a payload decode error
    pub payload_errors: usize,
}

/// Iterator producing one `ChannelRecord` per recovered frame
pub struct DecodingIterator<'a> {
    splitter: FrameSplitter<'a>,
    dispatcher: ChannelDispatcher<'a>,
    gate: Box<dyn GatePolicy>,
    config: DecoderConfig,
    stats: DecodeStats,
}

impl<'a> DecodingIterator<'a> {
    /// Counters for the frames seen so far
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }
}

impl<'a> Iterator for DecodingIterator<'a> {
    type Item = Result<ChannelRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(max) = self.config.max_frames {
            if self.stats.frames >= max {
                return None;
            }
        }

        let frame = match self.splitter.next()? {
            Ok(frame) => frame,
            Err(e) => return Some(Err(e)),
        };

        let header = frame.header();
        let identifier = frame.identifier();
        let timestamp_ms = frame.timestamp_ms();
        let mut record = ChannelRecord::new(timestamp_ms, &header, identifier);

        // The gate sees every frame, in order, so its history stays correct
        // even for frames the identifier filter excludes
        let admitted = self.gate.admit(timestamp_ms, header.data_length);
        if !admitted {
            self.stats.gated_off += 1;
        } else if self.config.should_process_identifier(identifier) {
            match self.dispatcher.dispatch(&mut record, frame.payload()) {
                Ok(()) => {}
                Err(e @ DecodeError::PayloadTooShort { .. }) => {
                    log::warn!("{}; emitting header fields only", e);
                    self.stats.payload_errors += 1;
                }
                Err(e) => return Some(Err(e)),
            }
        }

        self.stats.frames += 1;
        Some(Ok(record))
    }
}
