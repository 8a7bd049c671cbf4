//! Record sinks
//!
//! The decoder core emits `ChannelRecord` rows; a sink persists them. The
//! CSV sink is the only implementation today, but the trait keeps the core
//! independent of the rendering (a spreadsheet writer would slot in here).

use anyhow::{Context, Result};
use sdlog_decoder::{Channel, ChannelRecord};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Receives fully decoded rows and persists them
pub trait RecordSink {
    /// Append one output row
    fn write_record(&mut self, record: &ChannelRecord) -> Result<()>;

    /// Flush buffered rows; call once after the last record
    fn finish(&mut self) -> Result<()>;
}

/// Fixed leading columns before the channel columns
const FRAME_COLUMNS: [&str; 5] = [
    "Timestamp [ms]",
    "Data length",
    "Frame kind",
    "ID width",
    "Identifier",
];

/// CSV sink: one header row, then one row per frame. Empty cells are the
/// explicit no-value marker.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Create a CSV file sink
    pub fn to_path(path: &Path) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("failed to create output {:?}", path))?;
        Self::new(file)
    }
}

impl CsvSink<io::Stdout> {
    /// Write CSV to standard output
    pub fn to_stdout() -> Result<Self> {
        Self::new(io::stdout())
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer; emits the header row immediately
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        let header: Vec<&str> = FRAME_COLUMNS
            .iter()
            .copied()
            .chain(Channel::ALL.iter().map(|c| c.name()))
            .collect();
        writer
            .write_record(&header)
            .context("failed to write CSV header")?;
        Ok(Self { writer })
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &ChannelRecord) -> Result<()> {
        let mut row: Vec<String> = vec![
            record.timestamp_ms.to_string(),
            record.data_length.to_string(),
            record.kind.to_string(),
            record.id_width.to_string(),
            record.identifier.to_string(),
        ];
        row.extend(
            record
                .channels()
                .map(|(_, value)| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        self.writer
            .write_record(&row)
            .context("failed to write CSV row")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush CSV output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdlog_decoder::{ChannelValue, FrameHeader, FrameKind, IdWidth};

    fn sample_record() -> ChannelRecord {
        let header = FrameHeader {
            data_length: 1,
            kind: FrameKind::Data,
            id_width: IdWidth::Standard,
        };
        let mut record = ChannelRecord::new(1000, &header, 1000);
        record.set(Channel::Brake, ChannelValue::Integer(1));
        record
    }

    fn render(records: &[ChannelRecord]) -> String {
        let mut sink = CsvSink::new(Vec::new()).unwrap();
        for record in records {
            sink.write_record(record).unwrap();
        }
        sink.finish().unwrap();
        String::from_utf8(sink.writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_row() {
        let out = render(&[]);
        let header = out.lines().next().unwrap();
        assert!(header.starts_with("Timestamp [ms],Data length,Frame kind,ID width,Identifier"));
        assert!(header.ends_with("Error flag,Error minutes,Error source"));
        assert_eq!(header.split(',').count(), 5 + 13);
    }

    #[test]
    fn test_record_row() {
        let out = render(&[sample_record()]);
        let row = out.lines().nth(1).unwrap();
        assert!(row.starts_with("1000,1,DATA,STANDARD,1000,1"));
        // Twelve empty cells for the unpopulated channels
        assert_eq!(row.split(',').count(), 5 + 13);
        assert!(row.ends_with(",,"));
    }

    #[test]
    fn test_empty_cells_are_the_no_value_marker() {
        let header = FrameHeader {
            data_length: 0,
            kind: FrameKind::Remote,
            id_width: IdWidth::Extended,
        };
        let record = ChannelRecord::new(5, &header, 777);
        let out = render(&[record]);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row, format!("5,0,REMOTE,EXTENDED,777{}", ",".repeat(13)));
    }
}
