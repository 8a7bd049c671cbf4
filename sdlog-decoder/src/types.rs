//! Core types for the SD log decoder library
//!
//! This module defines the output types the decoder emits when processing a
//! capture, the telemetry channel naming, and the library error type. The
//! decoder is stateless apart from the time gate and only outputs records -
//! it does not merge or track values across frames.

use crate::frame::{FrameHeader, FrameKind, IdWidth};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The byte stream produced a slice between markers that cannot be a
    /// frame. Framing errors abort the whole run - the stream is not
    /// trustworthy past this point.
    #[error("malformed frame at byte offset {offset}: {len} bytes between markers")]
    MalformedFrame { offset: usize, len: usize },

    /// A dispatch rule needed more payload bytes than the frame declared or
    /// carried. Affects a single frame only; the run continues.
    #[error("payload too short for identifier {identifier}: need {required} bytes, have {available}")]
    PayloadTooShort {
        identifier: u16,
        required: usize,
        available: usize,
    },

    #[error("failed to parse module table: {0}")]
    TableParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The named telemetry channels a frame may populate
///
/// The set is fixed: every output row carries all of them, populated or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Brake state (identifier 1000)
    Brake,
    /// Power-meter current (identifier 1401)
    PmCurrent,
    /// Power-meter voltage (identifier 1401)
    PmVoltage,
    /// Cell temperature sensor 1 (identifier 1410)
    CellTemp1,
    /// Cell temperature sensor 2 (identifier 1410)
    CellTemp2,
    /// Vehicle speed (identifier 1415)
    Speed,
    /// Throttle position (identifier 1420)
    Throttle,
    /// Steering-unit start flag (identifier 1601)
    SuStart,
    /// Logger start flag (identifier 1602)
    LoggerStart,
    /// Power-meter start flag (identifier 1603)
    PmStart,
    /// Subsystem error flag (identifiers 301-303)
    ErrorFlag,
    /// Elapsed minutes reported alongside an error flag
    ErrorMinutes,
    /// Human-readable source of an error flag, resolved via the module table
    ErrorSource,
}

impl Channel {
    /// All channels in output-column order
    pub const ALL: [Channel; 13] = [
        Channel::Brake,
        Channel::PmCurrent,
        Channel::PmVoltage,
        Channel::CellTemp1,
        Channel::CellTemp2,
        Channel::Speed,
        Channel::Throttle,
        Channel::SuStart,
        Channel::LoggerStart,
        Channel::PmStart,
        Channel::ErrorFlag,
        Channel::ErrorMinutes,
        Channel::ErrorSource,
    ];

    /// Column label for sinks
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Brake => "Brake",
            Channel::PmCurrent => "PM current",
            Channel::PmVoltage => "PM voltage",
            Channel::CellTemp1 => "Cell temp 1",
            Channel::CellTemp2 => "Cell temp 2",
            Channel::Speed => "Speed",
            Channel::Throttle => "Throttle",
            Channel::SuStart => "SU start",
            Channel::LoggerStart => "Logger start",
            Channel::PmStart => "PM start",
            Channel::ErrorFlag => "Error flag",
            Channel::ErrorMinutes => "Error minutes",
            Channel::ErrorSource => "Error source",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Channel value types produced by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValue {
    /// Plain integer value (flags, brake, throttle, elapsed minutes)
    Integer(u32),
    /// Two-byte fixed-point value rendered as `integer.fraction`, each part
    /// the decimal value of one payload byte. This mirrors the logger's own
    /// textual rendering and is not a binary fixed-point conversion.
    FixedPoint(u8, u8),
    /// Resolved name text (error source)
    Text(String),
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelValue::Integer(v) => write!(f, "{}", v),
            ChannelValue::FixedPoint(int, frac) => write!(f, "{}.{}", int, frac),
            ChannelValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl ChannelValue {
    /// Integer view of the value, where one exists
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            ChannelValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

/// One output row, keyed by the frame timestamp
///
/// Header fields are always populated; the channel slots hold `None` as the
/// explicit no-value marker. Records are created fresh per input frame and
/// never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    /// Milliseconds since logger start
    pub timestamp_ms: u32,
    /// Declared payload length from the frame header
    pub data_length: u8,
    /// Remote or data frame
    pub kind: FrameKind,
    /// Identifier width flag from the frame header
    pub id_width: IdWidth,
    /// 11-bit frame identifier
    pub identifier: u16,
    channels: [Option<ChannelValue>; 13],
}

impl ChannelRecord {
    /// Create a header-only record; all channels start empty
    pub fn new(timestamp_ms: u32, header: &FrameHeader, identifier: u16) -> Self {
        Self {
            timestamp_ms,
            data_length: header.data_length,
            kind: header.kind,
            id_width: header.id_width,
            identifier,
            channels: Default::default(),
        }
    }

    /// Populate one channel slot
    pub fn set(&mut self, channel: Channel, value: ChannelValue) {
        self.channels[channel.index()] = Some(value);
    }

    /// Read one channel slot
    pub fn get(&self, channel: Channel) -> Option<&ChannelValue> {
        self.channels[channel.index()].as_ref()
    }

    /// Iterate channels in output-column order
    pub fn channels(&self) -> impl Iterator<Item = (Channel, Option<&ChannelValue>)> + '_ {
        Channel::ALL
            .iter()
            .map(move |c| (*c, self.channels[c.index()].as_ref()))
    }

    /// True if any channel slot is populated
    pub fn has_channel_data(&self) -> bool {
        self.channels.iter().any(|c| c.is_some())
    }
}
