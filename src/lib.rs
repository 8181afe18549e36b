//! hdfs-usage - Per-entry disk usage export for HDFS namespaces
//!
//! Walks an HDFS namespace breadth-first and writes one CSV row per entry,
//! for auditing storage consumption across a tree. Walks are bounded by
//! depth and filtered by modification time and, optionally, to directories.
//!
//! # Features
//!
//! - **Level-ordered walk**: every entry at depth `d` is emitted before any
//!   entry at depth `d + 1`; directories outside the filter are still
//!   descended into.
//!
//! - **Streaming output**: the walker runs on its own thread and hands
//!   entries over a capacity-1 channel, so memory stays flat no matter how
//!   large the namespace is.
//!
//! - **Partial failure tolerance**: an unreadable directory or a failed
//!   content summary drops only the affected rows.
//!
//! - **WebHDFS with HA failover**: namenodes are discovered from
//!   `hdfs-site.xml` or given explicitly; a local mount works too.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Namenode(s) / local mount                        │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ GETFILESTATUS / LISTSTATUS /
//!                               │ GETCONTENTSUMMARY
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     NamespaceClient                              │
//! │            (WebHdfsClient, LocalClient, MemoryNamespace)         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 LevelWalker (producer thread)                    │
//! │   frontier per level ─▶ filter ─▶ content summary               │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ crossbeam bounded(1)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │               WalkStream ─▶ to_row ─▶ CsvSink                    │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               ▼
//!                      ┌──────────────────┐
//!                      │  stdout / file   │
//!                      └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Two levels below /user, into a file
//! hdfs-usage /user -d 2 -o usage.csv
//!
//! # Directories not modified since 2024, appended to an existing report
//! hdfs-usage /data --dir-only --older-than 2024-01-01 -o usage.csv --append
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod hdfs;
pub mod progress;
pub mod report;
pub mod walker;

pub use config::{parse_timestamp, CliArgs, ClientConfig, OutputTarget, WalkConfig};
pub use error::{Result, WalkerError};
pub use export::Exporter;
pub use hdfs::NamespaceClient;
pub use report::{format_size, to_row, CsvSink};
pub use walker::{EntryDescriptor, LevelWalker, TimeWindow, WalkOptions, WalkStats, WalkStream};
