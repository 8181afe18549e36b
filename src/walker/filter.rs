//! Entry filters applied by the walker
//!
//! Filters decide only whether an entry is *emitted*. Directories are
//! expanded whether they pass or not, so a deep match below an old
//! directory is still reached.

use crate::hdfs::FileStatus;
use chrono::{DateTime, Utc};

/// Open interval of modification times, exclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    min: DateTime<Utc>,
    max: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window `(min, max)`
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        Self { min, max }
    }

    /// A window covering every representable timestamp
    pub fn unbounded() -> Self {
        Self {
            min: DateTime::<Utc>::MIN_UTC,
            max: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Lower bound (exclusive)
    pub fn min(&self) -> DateTime<Utc> {
        self.min
    }

    /// Upper bound (exclusive)
    pub fn max(&self) -> DateTime<Utc> {
        self.max
    }

    /// True when `t` lies strictly inside the window
    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        in_window(t, &self.min, &self.max)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// `min < t < max`; a timestamp equal to either bound does not match
pub fn in_window(t: &DateTime<Utc>, min: &DateTime<Utc>, max: &DateTime<Utc>) -> bool {
    min < t && t < max
}

/// Options controlling a single walk
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Modification-time window for emitted entries
    pub window: TimeWindow,

    /// Deepest level to expand (None = unbounded, 0 = root only)
    pub max_depth: Option<usize>,

    /// Emit only directories
    pub dirs_only: bool,
}

impl WalkOptions {
    /// Whether a listed child should be emitted
    pub fn matches(&self, status: &FileStatus) -> bool {
        self.window.contains(&status.modification_time) && (!self.dirs_only || status.is_dir())
    }

    /// Whether level `depth` may still be produced
    pub fn depth_allows(&self, depth: usize) -> bool {
        match self.max_depth {
            None => true,
            Some(max) => depth <= max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdfs::{from_millis, EntryType, Permissions};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn status(entry_type: EntryType, mtime: DateTime<Utc>) -> FileStatus {
        FileStatus {
            name: "n".into(),
            entry_type,
            permissions: Permissions(0o755),
            owner: "hdfs".into(),
            group: "hdfs".into(),
            length: 0,
            replication: 0,
            access_time: from_millis(0),
            modification_time: mtime,
        }
    }

    #[test]
    fn test_window_is_open_interval() {
        let window = TimeWindow::new(at(100), at(200));
        assert!(!window.contains(&at(100)));
        assert!(window.contains(&at(101)));
        assert!(window.contains(&at(199)));
        assert!(!window.contains(&at(200)));
        assert!(!window.contains(&at(50)));
    }

    #[test]
    fn test_unbounded_window() {
        let window = TimeWindow::default();
        assert!(window.contains(&at(0)));
        assert!(window.contains(&at(-10_000_000_000)));
        assert!(window.contains(&at(250_000_000_000)));
    }

    #[test]
    fn test_dirs_only_filter() {
        let options = WalkOptions {
            dirs_only: true,
            ..Default::default()
        };
        assert!(options.matches(&status(EntryType::Directory, at(10))));
        assert!(!options.matches(&status(EntryType::File, at(10))));
    }

    #[test]
    fn test_window_and_type_combined() {
        let options = WalkOptions {
            window: TimeWindow::new(at(0), at(100)),
            dirs_only: true,
            ..Default::default()
        };
        assert!(!options.matches(&status(EntryType::Directory, at(100))));
        assert!(options.matches(&status(EntryType::Directory, at(99))));
    }

    #[test]
    fn test_depth_bound() {
        let unbounded = WalkOptions::default();
        assert!(unbounded.depth_allows(1_000));

        let root_only = WalkOptions {
            max_depth: Some(0),
            ..Default::default()
        };
        assert!(!root_only.depth_allows(1));

        let two = WalkOptions {
            max_depth: Some(2),
            ..Default::default()
        };
        assert!(two.depth_allows(1));
        assert!(two.depth_allows(2));
        assert!(!two.depth_allows(3));
    }
}
