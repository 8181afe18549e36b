//! Level-synchronous breadth-first walker
//!
//! The walker validates the root on the caller's thread, then hands the
//! rest of the traversal to a dedicated producer thread. Entries reach the
//! caller through a capacity-1 channel, so the producer never runs more
//! than one entry ahead of the consumer.
//!
//! ```text
//! caller                       level-walker thread
//! ──────                       ───────────────────
//! walk(root) ── stat(root)
//!            ── content_summary(root)
//!            ── spawn ───────▶ send(root, depth 0)
//!                              frontier = [root]
//!  ◀── WalkStream              for d in 1..: (while depth allows)
//!                                  take frontier, start next
//!  for entry in stream ◀────────   list each path in order
//!      write row                   push child dirs to next
//!                                  send matching children at depth d
//!  stream.finish() ◀───────────  close
//! ```

use super::entry::{is_absolute, join_path, EntryDescriptor};
use super::filter::WalkOptions;
use crate::error::{Result, WalkerError};
use crate::hdfs::NamespaceClient;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Counters reported when a walk's producer finishes
#[derive(Debug, Clone, Default)]
pub struct WalkStats {
    /// Entries handed to the consumer, root included
    pub entries_emitted: u64,
    /// Directories successfully listed
    pub dirs_listed: u64,
    /// Directories whose listing failed
    pub listing_errors: u64,
    /// Matching entries dropped because their summary could not be fetched
    pub summary_errors: u64,
    /// Deepest level that was expanded
    pub deepest_level: usize,
    pub duration: Duration,
    /// False if the walk stopped on shutdown or because the consumer left
    pub completed: bool,
}

/// Breadth-first walker over a namespace client
pub struct LevelWalker {
    client: Arc<dyn NamespaceClient>,
    shutdown: Arc<AtomicBool>,
}

impl LevelWalker {
    pub fn new(client: Arc<dyn NamespaceClient>) -> Self {
        Self {
            client,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked before every directory listing; set it to stop walking
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Start walking `root`
    ///
    /// Fails without producing a stream if `root` is not absolute or if the
    /// root cannot be stat-ed or summarized. Every later failure is absorbed
    /// by the producer and only shows up in [`WalkStats`].
    pub fn walk(&self, root: &str, options: &WalkOptions) -> Result<WalkStream> {
        if !is_absolute(root) {
            return Err(WalkerError::InvalidArgument(format!(
                "'{}' is not an absolute path",
                root
            )));
        }

        let root_status = self.client.stat(root)?;
        let root_summary = self.client.content_summary(root)?;
        let root_entry = EntryDescriptor::new(root.to_string(), 0, root_status, root_summary);

        let (entry_tx, entry_rx) = bounded::<EntryDescriptor>(1);

        let producer = LevelProducer {
            client: Arc::clone(&self.client),
            shutdown: Arc::clone(&self.shutdown),
            options: options.clone(),
            root: root.to_string(),
        };

        let handle = thread::Builder::new()
            .name("level-walker".to_string())
            .spawn(move || producer.run(root_entry, entry_tx))
            .map_err(|e| WalkerError::Thread(e.to_string()))?;

        Ok(WalkStream {
            entries: entry_rx,
            handle,
        })
    }
}

/// Entries of one walk, in level order
///
/// Iterate it to drain entries, then call [`WalkStream::finish`] to collect
/// the producer's statistics. Dropping it early stops the producer at its
/// next hand-off.
pub struct WalkStream {
    entries: Receiver<EntryDescriptor>,
    handle: JoinHandle<WalkStats>,
}

impl WalkStream {
    /// Stop receiving and wait for the producer
    pub fn finish(self) -> Result<WalkStats> {
        let WalkStream { entries, handle } = self;
        drop(entries);
        handle
            .join()
            .map_err(|_| WalkerError::Thread("level walker panicked".to_string()))
    }
}

impl Iterator for WalkStream {
    type Item = EntryDescriptor;

    fn next(&mut self) -> Option<EntryDescriptor> {
        self.entries.recv().ok()
    }
}

/// State moved into the producer thread
struct LevelProducer {
    client: Arc<dyn NamespaceClient>,
    shutdown: Arc<AtomicBool>,
    options: WalkOptions,
    root: String,
}

impl LevelProducer {
    fn run(self, root_entry: EntryDescriptor, entry_tx: Sender<EntryDescriptor>) -> WalkStats {
        let start = Instant::now();
        let mut stats = WalkStats::default();

        // Root goes out first and unfiltered
        if entry_tx.send(root_entry).is_ok() {
            stats.entries_emitted += 1;
            stats.completed = self.walk_levels(&entry_tx, &mut stats);
        }

        stats.duration = start.elapsed();
        debug!(
            root = %self.root,
            entries = stats.entries_emitted,
            completed = stats.completed,
            "Level walker finished"
        );
        stats
    }

    /// Expand levels until the frontier empties or the depth bound stops it.
    /// Returns false if the walk was cut short.
    fn walk_levels(&self, entry_tx: &Sender<EntryDescriptor>, stats: &mut WalkStats) -> bool {
        let mut frontier = vec![self.root.clone()];
        let mut depth = 1;

        while self.options.depth_allows(depth) && !frontier.is_empty() {
            let current = std::mem::take(&mut frontier);
            stats.deepest_level = depth;

            for path in &current {
                if self.shutdown.load(Ordering::Relaxed) {
                    info!(path = %path, depth, "Shutdown requested, stopping walk");
                    return false;
                }

                info!(path = %path, depth, max = ?self.options.max_depth, "Walking path");

                let children = match self.client.list_children(path) {
                    Ok(children) => children,
                    Err(e) => {
                        stats.listing_errors += 1;
                        warn!(path = %path, error = %e, "Unable to read path");
                        continue;
                    }
                };
                stats.dirs_listed += 1;

                for child in children {
                    let child_path = join_path(path, &child.name);

                    // Every directory is expanded, matching or not
                    if child.is_dir() {
                        frontier.push(child_path.clone());
                    }

                    if !self.options.matches(&child) {
                        continue;
                    }

                    let summary = match self.client.content_summary(&child_path) {
                        Ok(summary) => summary,
                        Err(_) => {
                            stats.summary_errors += 1;
                            continue;
                        }
                    };

                    let entry = EntryDescriptor::new(child_path, depth, child, summary);
                    if entry_tx.send(entry).is_err() {
                        debug!(root = %self.root, "Consumer dropped the stream");
                        return false;
                    }
                    stats.entries_emitted += 1;
                }
            }

            depth += 1;
        }

        true
    }
}
