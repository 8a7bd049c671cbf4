//! Raw capture loading
//!
//! A capture is the entire SD-card dump held in memory. The logger writes
//! small files (a bounded run per power cycle), so whole-buffer loading is
//! the intended mode - there is no streaming path.

use crate::types::Result;
use std::path::Path;

/// The raw capture: an immutable byte sequence owned by the pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCapture {
    bytes: Vec<u8>,
}

impl RawCapture {
    /// Number of reserved bytes at the start of the stream
    pub const STREAM_HEADER_LEN: usize = 2;

    /// Load a capture file into memory
    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading capture file: {:?}", path);
        let bytes = std::fs::read(path)?;
        log::info!("Capture loaded: {} bytes", bytes.len());
        Ok(Self { bytes })
    }

    /// Wrap an already-loaded byte buffer
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The whole capture as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Capture size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-byte capture
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_bytes() {
        let capture = RawCapture::from_bytes(vec![1, 2, 3]);
        assert_eq!(capture.len(), 3);
        assert_eq!(capture.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = RawCapture::from_path(Path::new("nonexistent.bin"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xAA, 0xBB, 0xCC]).unwrap();
        let capture = RawCapture::from_path(file.path()).unwrap();
        assert_eq!(capture.as_bytes(), &[0xAA, 0xBB, 0xCC]);
    }
}
