//! Multi-root export
//!
//! Walks each root in command-line order and streams its entries into a
//! [`CsvSink`]. A root that cannot be walked (relative, missing, unreadable)
//! is logged and skipped. The run as a whole only fails when the output
//! cannot be written or the walker thread dies.

use crate::error::Result;
use crate::progress::{ProgressReporter, RunSummary};
use crate::report::CsvSink;
use crate::walker::{LevelWalker, WalkOptions};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Drives one walk per root into a shared sink
pub struct Exporter {
    walker: LevelWalker,
    options: WalkOptions,
    progress: Option<ProgressReporter>,
}

impl Exporter {
    pub fn new(walker: LevelWalker, options: WalkOptions) -> Self {
        Self {
            walker,
            options,
            progress: None,
        }
    }

    /// Show a spinner while rows are written
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Flag that stops the run before the next listing or root
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.walker.shutdown_flag()
    }

    /// Walk every root into `sink`
    ///
    /// The sink is flushed after each root but not finished, so the caller
    /// still owns the destination afterwards.
    pub fn run<W: Write>(&self, roots: &[String], sink: &mut CsvSink<W>) -> Result<RunSummary> {
        let start = Instant::now();
        let shutdown = self.walker.shutdown_flag();
        let mut summary = RunSummary {
            roots: roots.len(),
            ..Default::default()
        };

        for root in roots {
            if shutdown.load(Ordering::SeqCst) {
                summary.interrupted = true;
                break;
            }

            if let Some(ref p) = self.progress {
                p.set_status(&format!("Walking {}...", root));
            }

            let mut stream = match self.walker.walk(root, &self.options) {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(path = %root, error = %e, "Unable to walk path");
                    summary.roots_failed += 1;
                    continue;
                }
            };

            let mut write_result = Ok(());
            for entry in stream.by_ref() {
                if entry.depth() == 0 {
                    summary.root_usage += entry.summary().space_consumed;
                }
                if let Err(e) = sink.write_entry(&entry) {
                    write_result = Err(e);
                    break;
                }
                if let Some(ref p) = self.progress {
                    p.update(sink.rows_written(), &entry);
                }
            }

            // Join the producer before reporting a write failure
            let stats = stream.finish()?;
            write_result?;
            sink.flush()?;

            info!(
                path = %root,
                entries = stats.entries_emitted,
                dirs = stats.dirs_listed,
                listing_errors = stats.listing_errors,
                summary_errors = stats.summary_errors,
                depth = stats.deepest_level,
                duration_ms = stats.duration.as_millis() as u64,
                completed = stats.completed,
                "Finished walking path"
            );
            summary.add_walk(&stats);
        }

        if let Some(ref p) = self.progress {
            p.finish_and_clear();
        }

        summary.rows = sink.rows_written();
        summary.duration = start.elapsed();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OutputError, WalkerError};
    use crate::hdfs::memory::MemoryNamespace;
    use chrono::{TimeZone, Utc};
    use std::io;

    /// Writer that accepts `limit` bytes, then fails
    struct ShortWriter {
        limit: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.limit == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.limit);
            self.limit -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn exporter() -> Exporter {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ns = MemoryNamespace::new()
            .dir("/a", t)
            .file("/a/x", t, 10)
            .file("/a/y", t, 20);
        Exporter::new(LevelWalker::new(Arc::new(ns)), WalkOptions::default())
    }

    #[test]
    fn test_run_counts_rows_and_root_usage() {
        let mut sink = CsvSink::from_writer(Vec::new(), false).unwrap();
        let summary = exporter().run(&["/a".to_string()], &mut sink).unwrap();

        assert_eq!(summary.roots, 1);
        assert_eq!(summary.roots_failed, 0);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.root_usage, 90);
        assert_eq!(summary.dirs_listed, 1);
        assert!(!summary.interrupted);
    }

    #[test]
    fn test_shutdown_before_first_root() {
        let exporter = exporter();
        exporter.shutdown_flag().store(true, Ordering::SeqCst);

        let mut sink = CsvSink::from_writer(Vec::new(), false).unwrap();
        let summary = exporter.run(&["/a".to_string()], &mut sink).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.rows, 0);
    }

    #[test]
    fn test_write_failure_fails_the_run() {
        let mut sink = CsvSink::from_writer(ShortWriter { limit: 0 }, false).unwrap();
        let err = exporter().run(&["/a".to_string()], &mut sink).unwrap_err();
        assert!(matches!(err, WalkerError::Output(OutputError::Flush(_))));
    }
}
