//! Progress reporting for the namespace walker
//!
//! Provides a spinner on stderr while rows are written, and a final
//! summary. Stdout is left alone so it can carry the CSV.

use crate::walker::{EntryDescriptor, WalkStats};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays walk status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter drawing to stderr
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            bar.set_style(spinner.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the display after a row was written
    pub fn update(&self, rows: u64, entry: &EntryDescriptor) {
        let msg = format!(
            "Rows: {} | Depth: {} | {}",
            format_number(rows),
            entry.depth(),
            entry.path(),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Totals across every root of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub roots: usize,
    pub roots_failed: usize,
    pub rows: u64,
    /// Bytes after replication, summed over emitted root entries
    pub root_usage: u64,
    pub dirs_listed: u64,
    pub listing_errors: u64,
    pub summary_errors: u64,
    pub duration: Duration,
    pub interrupted: bool,
}

impl RunSummary {
    /// Fold one finished walk into the totals
    pub fn add_walk(&mut self, stats: &WalkStats) {
        self.dirs_listed += stats.dirs_listed;
        self.listing_errors += stats.listing_errors;
        self.summary_errors += stats.summary_errors;
        if !stats.completed {
            self.interrupted = true;
        }
    }
}

/// Print a summary of the run on stderr
pub fn print_summary(summary: &RunSummary, output: &str) {
    let duration_secs = summary.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        summary.rows as f64 / duration_secs
    } else {
        0.0
    };

    let title = if summary.interrupted {
        style("Walk Interrupted").yellow().bold()
    } else {
        style("Walk Complete").green().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!(
        "  {} {} ({} failed)",
        style("Paths:").bold(),
        summary.roots,
        summary.roots_failed
    );
    eprintln!("  {} {}", style("Rows:").bold(), format_number(summary.rows));
    eprintln!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(summary.dirs_listed)
    );
    eprintln!(
        "  {} {}",
        style("Usage:").bold(),
        format_size(summary.root_usage, BINARY)
    );
    eprintln!(
        "  {} {:.1}s ({:.0} rows/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    let errors = summary.listing_errors + summary.summary_errors;
    if errors > 0 {
        eprintln!(
            "  {} {} ({} listings, {} summaries)",
            style("Errors:").yellow().bold(),
            format_number(errors),
            format_number(summary.listing_errors),
            format_number(summary.summary_errors)
        );
    }
    eprintln!("  {} {}", style("Output:").bold(), output);
    eprintln!();
}

/// Print a header at the start of the run on stderr
pub fn print_header(source: &str, roots: &[String], output: &str) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("hdfs-usage").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Source:").bold(), source);
    eprintln!("  {} {}", style("Paths:").bold(), roots.join(", "));
    eprintln!("  {} {}", style("Output:").bold(), output);
    eprintln!();
}
