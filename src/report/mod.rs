//! Report output
//!
//! Turns walked entries into CSV rows. [`row`] holds the pure formatting
//! (sizes, timestamps, the twelve columns) and [`csv`] writes rows to
//! stdout or a file.
//!
//! ```text
//! EntryDescriptor ──▶ to_row() ──▶ CsvSink ──▶ stdout / file
//! ```

pub mod csv;
pub mod row;

pub use self::csv::CsvSink;
pub use row::{format_size, format_timestamp, to_row, HEADER};
