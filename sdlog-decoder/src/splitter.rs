//! Frame extraction from the raw byte stream
//!
//! The logger delimits frames with a two-byte end-of-frame marker; there is
//! no length prefix and no escaping. A payload byte sequence that happens to
//! contain the marker pair is indistinguishable from a real frame boundary
//! and will split incorrectly. That ambiguity is inherent to the wire format
//! and is deliberately not worked around here.

use crate::capture::RawCapture;
use crate::frame::RawFrame;
use crate::types::{DecodeError, Result};

/// End-of-frame marker byte pair
pub const MARKER: [u8; 2] = [0xCC, 0xDD];

/// Unused footer bytes following the marker, skipped along with it
const FOOTER_LEN: usize = 2;

/// Lazy iterator over the marker-delimited frames of a capture
///
/// The scan is strictly sequential: the cut position after each marker
/// depends on every prior marker occurrence. Construct a fresh splitter
/// from the same capture to restart. The first two bytes of the stream are
/// a stream header and are never part of a frame; no frame is emitted for
/// a trailing partial slice after the last marker.
///
/// A framing error (a slice too short to be a frame, or a marker landing
/// inside a skipped footer) poisons the iterator: the stream is not
/// trustworthy past that point.
#[derive(Debug, Clone)]
pub struct FrameSplitter<'a> {
    bytes: &'a [u8],
    pos: usize,
    last_cut: usize,
    poisoned: bool,
}

impl<'a> FrameSplitter<'a> {
    /// Start a scan over the whole capture
    pub fn new(capture: &'a RawCapture) -> Self {
        Self {
            bytes: capture.as_bytes(),
            pos: 0,
            last_cut: RawCapture::STREAM_HEADER_LEN,
            poisoned: false,
        }
    }
}

impl<'a> Iterator for FrameSplitter<'a> {
    type Item = Result<RawFrame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        while self.pos + 1 < self.bytes.len() {
            let i = self.pos;
            self.pos += 1;
            if self.bytes[i] != MARKER[0] || self.bytes[i + 1] != MARKER[1] {
                continue;
            }
            if i < self.last_cut {
                // Marker pair inside the previous frame's skipped footer
                self.poisoned = true;
                return Some(Err(DecodeError::MalformedFrame { offset: i, len: 0 }));
            }
            let offset = self.last_cut;
            let slice = &self.bytes[offset..i];
            self.last_cut = i + MARKER.len() + FOOTER_LEN;
            return match RawFrame::new(slice, offset) {
                Ok(frame) => Some(Ok(frame)),
                Err(e) => {
                    self.poisoned = true;
                    Some(Err(e))
                }
            };
        }
        None
    }
}
