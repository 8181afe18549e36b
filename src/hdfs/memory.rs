//! In-memory namespace
//!
//! A scripted [`NamespaceClient`] used by tests and benchmarks. Entries are
//! listed in insertion order, and individual operations can be made to fail
//! for chosen paths.

use super::types::{ContentSummary, EntryType, FileStatus, Permissions};
use super::NamespaceClient;
use crate::error::{HdfsError, HdfsResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
struct Node {
    status: FileStatus,
    children: Vec<String>,
}

/// Namespace held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryNamespace {
    nodes: HashMap<String, Node>,
    fail_stat: HashSet<String>,
    fail_listing: HashSet<String>,
    fail_summary: HashSet<String>,
    /// Paths passed to `list_children`, in call order
    listed: Mutex<Vec<String>>,
}

impl MemoryNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory; its parent must already exist unless it is a root
    pub fn dir(self, path: &str, mtime: DateTime<Utc>) -> Self {
        self.insert(path, EntryType::Directory, 0o755, mtime, 0)
    }

    /// Add a file of `length` bytes
    pub fn file(self, path: &str, mtime: DateTime<Utc>, length: u64) -> Self {
        self.insert(path, EntryType::File, 0o644, mtime, length)
    }

    /// Make `stat(path)` fail
    pub fn fail_stat(mut self, path: &str) -> Self {
        self.fail_stat.insert(path.to_string());
        self
    }

    /// Make `list_children(path)` fail
    pub fn fail_listing(mut self, path: &str) -> Self {
        self.fail_listing.insert(path.to_string());
        self
    }

    /// Make `content_summary(path)` fail
    pub fn fail_summary(mut self, path: &str) -> Self {
        self.fail_summary.insert(path.to_string());
        self
    }

    /// Directories listed so far, in order
    pub fn listed(&self) -> Vec<String> {
        self.listed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn insert(
        mut self,
        path: &str,
        entry_type: EntryType,
        perm: u32,
        mtime: DateTime<Utc>,
        length: u64,
    ) -> Self {
        let (parent, name) = split_parent(path);
        let status = FileStatus {
            name: name.to_string(),
            entry_type,
            permissions: Permissions(perm),
            owner: "hdfs".into(),
            group: "supergroup".into(),
            length,
            replication: if entry_type.is_dir() { 0 } else { 3 },
            access_time: mtime,
            modification_time: mtime,
        };

        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.push(path.to_string());
        }
        self.nodes.insert(
            path.to_string(),
            Node {
                status,
                children: Vec::new(),
            },
        );
        self
    }

    fn node(&self, path: &str) -> HdfsResult<&Node> {
        self.nodes.get(path).ok_or_else(|| HdfsError::NotFound {
            path: path.to_string(),
        })
    }

    fn summarize(&self, node: &Node, summary: &mut ContentSummary) {
        if node.status.is_dir() {
            summary.directory_count += 1;
        } else {
            summary.file_count += 1;
            summary.length += node.status.length;
            summary.space_consumed += node.status.length * u64::from(node.status.replication);
        }
        for child in &node.children {
            if let Some(child) = self.nodes.get(child) {
                self.summarize(child, summary);
            }
        }
    }
}

fn split_parent(path: &str) -> (Option<&str>, &str) {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => (Some("/"), &path[1..]),
        Some(idx) if idx > 0 => (Some(&path[..idx]), &path[idx + 1..]),
        _ => (None, path),
    }
}

impl NamespaceClient for MemoryNamespace {
    fn stat(&self, path: &str) -> HdfsResult<FileStatus> {
        if self.fail_stat.contains(path) {
            return Err(HdfsError::PermissionDenied {
                path: path.to_string(),
            });
        }
        let mut status = self.node(path)?.status.clone();
        status.name = String::new();
        Ok(status)
    }

    fn list_children(&self, path: &str) -> HdfsResult<Vec<FileStatus>> {
        self.listed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());

        if self.fail_listing.contains(path) {
            return Err(HdfsError::PermissionDenied {
                path: path.to_string(),
            });
        }
        let node = self.node(path)?;
        if !node.status.is_dir() {
            return Err(HdfsError::NotADirectory {
                path: path.to_string(),
            });
        }
        node.children
            .iter()
            .map(|child| self.node(child).map(|n| n.status.clone()))
            .collect()
    }

    fn content_summary(&self, path: &str) -> HdfsResult<ContentSummary> {
        if self.fail_summary.contains(path) {
            return Err(HdfsError::Remote {
                path: path.to_string(),
                exception: "IOException".into(),
                message: "summary unavailable".into(),
            });
        }
        let mut summary = ContentSummary::default();
        self.summarize(self.node(path)?, &mut summary);
        Ok(summary)
    }

    fn describe(&self) -> String {
        format!("in-memory namespace ({} entries)", self.nodes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("/a"), (Some("/"), "a"));
        assert_eq!(split_parent("/a/b"), (Some("/a"), "b"));
        assert_eq!(split_parent("/"), (None, "/"));
    }

    #[test]
    fn test_listing_order_and_summary() {
        let t = Utc.timestamp_opt(0, 0).unwrap();
        let ns = MemoryNamespace::new()
            .dir("/", t)
            .file("/z", t, 5)
            .dir("/a", t)
            .file("/a/f", t, 10);

        let names: Vec<String> = ns.list_children("/").unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["z", "a"]);

        let summary = ns.content_summary("/").unwrap();
        assert_eq!(summary.length, 15);
        assert_eq!(summary.space_consumed, 45);
        assert_eq!(summary.directory_count, 2);
        assert_eq!(summary.file_count, 2);
        assert_eq!(ns.listed(), vec!["/"]);
    }
}
