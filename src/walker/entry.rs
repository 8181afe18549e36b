//! The unit of walker output

use crate::hdfs::{ContentSummary, FileStatus};

/// One namespace entry discovered by a walk
///
/// Status fields are a snapshot taken when the parent was listed (or when
/// the root was stat-ed); the summary was fetched right before emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    path: String,
    depth: usize,
    status: FileStatus,
    summary: ContentSummary,
}

impl EntryDescriptor {
    pub fn new(path: String, depth: usize, status: FileStatus, summary: ContentSummary) -> Self {
        Self {
            path,
            depth,
            status,
            summary,
        }
    }

    /// Absolute path in the namespace
    pub fn path(&self) -> &str {
        &self.path
    }

    /// BFS level, root = 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn status(&self) -> &FileStatus {
        &self.status
    }

    pub fn summary(&self) -> &ContentSummary {
        &self.summary
    }

    pub fn is_dir(&self) -> bool {
        self.status.is_dir()
    }
}

/// Join a listed child's name onto its parent path
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Namespace paths must be rooted
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}
