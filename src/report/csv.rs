//! CSV output sink
//!
//! Rows are written through the `csv` crate's buffered writer and only
//! reach the destination in full; [`CsvSink::finish`] must be called to
//! flush the tail.

use super::row::{to_row, HEADER};
use crate::config::OutputTarget;
use crate::error::{OutputError, OutputResult};
use crate::walker::EntryDescriptor;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// Writes entry rows as CSV
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    rows_written: u64,
}

impl CsvSink<Box<dyn Write + Send>> {
    /// Open `target` and write the header unless appending
    ///
    /// Files are created if missing, then truncated or appended to.
    pub fn open(target: &OutputTarget, append: bool) -> OutputResult<Self> {
        let out: Box<dyn Write + Send> = match target {
            OutputTarget::Stdout => Box::new(std::io::stdout()),
            OutputTarget::File(path) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .append(append)
                    .truncate(!append)
                    .open(path)
                    .map_err(|source| OutputError::Open {
                        path: path.clone(),
                        source,
                    })?;
                debug!(path = %path.display(), append, "Opened output file");
                Box::new(file)
            }
        };

        Self::from_writer(out, !append)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer
    pub fn from_writer(out: W, header: bool) -> OutputResult<Self> {
        let mut sink = Self {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(out),
            rows_written: 0,
        };
        if header {
            sink.writer.write_record(HEADER)?;
        }
        Ok(sink)
    }

    /// Write one entry
    pub fn write_entry(&mut self, entry: &EntryDescriptor) -> OutputResult<()> {
        self.writer.write_record(to_row(entry))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush buffered rows to the destination
    pub fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Flush(std::io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdfs::{ContentSummary, EntryType, FileStatus, Permissions};
    use chrono::{TimeZone, Utc};

    fn entry(path: &str, depth: usize) -> EntryDescriptor {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let status = FileStatus {
            name: String::new(),
            entry_type: EntryType::File,
            permissions: Permissions(0o644),
            owner: "hdfs".into(),
            group: "hadoop".into(),
            length: 2048,
            replication: 3,
            access_time: t,
            modification_time: t,
        };
        let summary = ContentSummary {
            length: 2048,
            space_consumed: 6144,
            directory_count: 0,
            file_count: 1,
        };
        EntryDescriptor::new(path.to_string(), depth, status, summary)
    }

    #[test]
    fn test_header_and_rows() {
        let mut sink = CsvSink::from_writer(Vec::new(), true).unwrap();
        sink.write_entry(&entry("/data/a, b.txt", 1)).unwrap();
        assert_eq!(sink.rows_written(), 1);

        let out = String::from_utf8(sink.finish().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Depth,Mode,Path,Owner,Group,Last Access"));
        assert_eq!(
            lines[1],
            "1,-rw-r--r--,\"/data/a, b.txt\",hdfs,hadoop,2024-05-01 12:00:00,\
             2024-05-01 12:00:00,2048,2.0 KiB,6144,6.0 KiB,1"
        );
    }

    #[test]
    fn test_no_header() {
        let sink = CsvSink::from_writer(Vec::new(), false).unwrap();
        assert!(sink.finish().unwrap().is_empty());
    }

    #[test]
    fn test_open_truncate_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.csv");
        std::fs::write(&path, "stale\n").unwrap();
        let target = OutputTarget::File(path.clone());

        let mut sink = CsvSink::open(&target, false).unwrap();
        sink.write_entry(&entry("/a", 0)).unwrap();
        sink.finish().unwrap();

        let mut sink = CsvSink::open(&target, true).unwrap();
        sink.write_entry(&entry("/b", 0)).unwrap();
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Depth,"));
        assert!(lines[1].starts_with("0,-rw-r--r--,/a,"));
        assert!(lines[2].starts_with("0,-rw-r--r--,/b,"));
    }

    #[test]
    fn test_open_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::File(dir.path().join("missing/usage.csv"));
        assert!(matches!(
            CsvSink::open(&target, false),
            Err(OutputError::Open { .. })
        ));
    }
}
