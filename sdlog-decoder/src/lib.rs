//! SD Log Decoder Library
//!
//! A stateless, reusable library for recovering vehicle CAN-bus frames from
//! raw SD-card capture files and decoding them into named telemetry
//! channels.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Splits the undelimited byte stream into frames at the end-of-frame
//!   marker pair
//! - Decodes the bit-packed frame header and the 11-bit identifier
//! - Dispatches known identifiers to channel decoders, gated by a
//!   time-window policy
//! - Resolves error sources against an externally supplied module table
//!
//! The library does NOT:
//! - Parse command-line arguments
//! - Write CSV or spreadsheet output
//! - Print progress to the console
//!
//! All higher-level functionality is in the application layer (sdlog-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use sdlog_decoder::{Decoder, DecoderConfig};
//! use std::path::Path;
//!
//! // Create decoder and load the module name table
//! let mut decoder = Decoder::new();
//! decoder.load_module_table(Path::new("modules.json")).unwrap();
//!
//! // Decode a capture file
//! let config = DecoderConfig::new().with_gate_tolerance(10);
//! let records = decoder.decode_file(Path::new("LOG0001.BIN"), &config).unwrap();
//!
//! for record in records {
//!     println!("{} ms: identifier {}", record.timestamp_ms, record.identifier);
//! }
//! ```

// Public modules
pub mod capture;
pub mod config;
pub mod decoder;
pub mod frame;
pub mod gate;
pub mod modules;
pub mod splitter;
pub mod types;

// Re-export main types for convenience
pub use capture::RawCapture;
pub use config::DecoderConfig;
pub use decoder::{DecodeStats, Decoder, DecodingIterator};
pub use frame::{FrameHeader, FrameKind, IdWidth, RawFrame};
pub use gate::{AdmitAll, DeltaGate, GatePolicy};
pub use modules::{ModuleLookup, ModuleNames};
pub use splitter::{FrameSplitter, MARKER};
pub use types::{Channel, ChannelRecord, ChannelValue, DecodeError, Result};

// Internal modules (not exposed in public API)
mod channels;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
