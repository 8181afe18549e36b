//! Client for a locally mounted namespace
//!
//! Serves the same three operations from a directory on the local
//! filesystem (an HDFS NFS gateway or FUSE mount, or any plain tree).
//! Namespace paths are resolved below the mount root. Owners and groups
//! are reported as numeric ids, and replication is taken as 1.

use super::types::{ContentSummary, EntryType, FileStatus, Permissions};
use super::NamespaceClient;
use crate::error::{HdfsError, HdfsResult};
use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Namespace client over a local directory
pub struct LocalClient {
    root: PathBuf,
}

impl LocalClient {
    /// Use `root` as the namespace root `/`
    pub fn new(root: impl AsRef<Path>) -> HdfsResult<Self> {
        let root = root.as_ref();
        let display = root.display().to_string();
        let meta = std::fs::metadata(root).map_err(|e| HdfsError::from_io(&display, &e))?;
        if !meta.is_dir() {
            return Err(HdfsError::NotADirectory { path: display });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut local = self.root.clone();
        local.extend(path.split('/').filter(|s| !s.is_empty() && *s != "." && *s != ".."));
        local
    }
}

fn to_status(name: String, meta: &Metadata) -> FileStatus {
    let entry_type = EntryType::from_mode(meta.mode());
    FileStatus {
        name,
        entry_type,
        permissions: Permissions::from_mode(meta.mode()),
        owner: meta.uid().to_string(),
        group: meta.gid().to_string(),
        length: if entry_type.is_dir() { 0 } else { meta.len() },
        replication: if entry_type.is_dir() { 0 } else { 1 },
        access_time: unix_time(meta.atime(), meta.atime_nsec()),
        modification_time: unix_time(meta.mtime(), meta.mtime_nsec()),
    }
}

fn unix_time(secs: i64, nsecs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, nsecs.clamp(0, 999_999_999) as u32).unwrap_or_default()
}

impl NamespaceClient for LocalClient {
    fn stat(&self, path: &str) -> HdfsResult<FileStatus> {
        let meta = std::fs::symlink_metadata(self.resolve(path))
            .map_err(|e| HdfsError::from_io(path, &e))?;
        Ok(to_status(String::new(), &meta))
    }

    fn list_children(&self, path: &str) -> HdfsResult<Vec<FileStatus>> {
        let local = self.resolve(path);
        let meta = std::fs::symlink_metadata(&local).map_err(|e| HdfsError::from_io(path, &e))?;
        if !meta.is_dir() {
            return Err(HdfsError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut children = Vec::new();
        for dirent in std::fs::read_dir(&local).map_err(|e| HdfsError::from_io(path, &e))? {
            let dirent = dirent.map_err(|e| HdfsError::from_io(path, &e))?;
            let meta = dirent.metadata().map_err(|e| HdfsError::from_io(path, &e))?;
            let name = dirent.file_name().to_string_lossy().into_owned();
            children.push(to_status(name, &meta));
        }

        // read_dir order is arbitrary; sort to match the namenode's listing
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn content_summary(&self, path: &str) -> HdfsResult<ContentSummary> {
        let mut summary = ContentSummary::default();

        for dirent in WalkDir::new(self.resolve(path)).follow_links(false) {
            let dirent = dirent.map_err(|e| HdfsError::Io {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            if dirent.file_type().is_dir() {
                summary.directory_count += 1;
            } else {
                let meta = dirent.metadata().map_err(|e| HdfsError::Io {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
                summary.file_count += 1;
                summary.length += meta.len();
            }
        }

        summary.space_consumed = summary.length;
        Ok(summary)
    }

    fn describe(&self) -> String {
        format!("local mount at {}", self.root.display())
    }
}
