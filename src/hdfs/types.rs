//! Namespace entry types and data structures
//!
//! These types represent entries returned from namespace client operations.
//! Every client (WebHDFS, local mount, in-memory) converts its native
//! representation into these so the walker never sees transport details.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;

/// Type of namespace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
}

impl EntryType {
    /// Convert from Unix mode bits
    pub fn from_mode(mode: u32) -> Self {
        match mode & 0o170000 {
            0o040000 => EntryType::Directory,
            0o120000 => EntryType::Symlink,
            _ => EntryType::File,
        }
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }
}

/// Permission bits (without type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(pub u32);

impl Permissions {
    /// Create from full mode (strips type bits)
    pub fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Parse an octal permission string such as `"755"` or `"1777"`
    pub fn from_octal(s: &str) -> Option<Self> {
        u32::from_str_radix(s.trim(), 8).ok().map(Self::from_mode)
    }

    /// Get the raw permission bits
    pub fn bits(&self) -> u32 {
        self.0
    }
}

/// Status of a single namespace entry as reported by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// Entry name relative to the listed directory (empty for a stat result)
    pub name: String,

    /// Entry type
    pub entry_type: EntryType,

    /// Permission bits
    pub permissions: Permissions,

    /// Owner user name
    pub owner: String,

    /// Owner group name
    pub group: String,

    /// Length in bytes (0 for directories)
    pub length: u64,

    /// Replication factor (0 for directories)
    pub replication: u16,

    /// Last access time
    pub access_time: DateTime<Utc>,

    /// Last modification time
    pub modification_time: DateTime<Utc>,
}

impl FileStatus {
    /// Check if this entry is a directory
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// Render the mode like `ls -l`: a type letter followed by rwx triplets
    ///
    /// Directories get `d`, symlinks `L`, files `-`. Only the low nine
    /// permission bits are rendered, so setuid, setgid and sticky never show.
    pub fn mode_string(&self) -> String {
        let mut out = String::with_capacity(10);
        out.push(match self.entry_type {
            EntryType::Directory => 'd',
            EntryType::Symlink => 'L',
            EntryType::File => '-',
        });

        const RWX: [char; 3] = ['r', 'w', 'x'];
        let bits = self.permissions.bits();
        for i in 0..9 {
            if bits & (1 << (8 - i)) != 0 {
                out.push(RWX[i % 3]);
            } else {
                out.push('-');
            }
        }
        out
    }
}

/// Aggregate usage of the subtree rooted at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentSummary {
    /// Total bytes of all files
    pub length: u64,

    /// Bytes consumed after replication
    pub space_consumed: u64,

    /// Number of directories, including the path itself when it is one
    pub directory_count: u64,

    /// Number of files
    pub file_count: u64,
}

impl ContentSummary {
    /// Directories plus files
    pub fn entry_count(&self) -> u64 {
        self.directory_count + self.file_count
    }
}

/// Convert a millisecond Unix timestamp (WebHDFS wire format) to UTC
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_default()
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::File => write!(f, "file"),
            EntryType::Directory => write!(f, "directory"),
            EntryType::Symlink => write!(f, "symlink"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(entry_type: EntryType, perm: u32) -> FileStatus {
        FileStatus {
            name: "x".into(),
            entry_type,
            permissions: Permissions::from_mode(perm),
            owner: "hdfs".into(),
            group: "supergroup".into(),
            length: 0,
            replication: 3,
            access_time: from_millis(0),
            modification_time: from_millis(0),
        }
    }

    #[test]
    fn test_entry_type_from_mode() {
        assert_eq!(EntryType::from_mode(0o100644), EntryType::File);
        assert_eq!(EntryType::from_mode(0o040755), EntryType::Directory);
        assert_eq!(EntryType::from_mode(0o120777), EntryType::Symlink);
    }

    #[test]
    fn test_permissions_octal() {
        assert_eq!(Permissions::from_octal("755"), Some(Permissions(0o755)));
        assert_eq!(Permissions::from_octal("1777"), Some(Permissions(0o1777)));
        assert_eq!(Permissions::from_octal("rwx"), None);
    }

    #[test]
    fn test_mode_string() {
        assert_eq!(status(EntryType::Directory, 0o755).mode_string(), "drwxr-xr-x");
        assert_eq!(status(EntryType::File, 0o644).mode_string(), "-rw-r--r--");
        assert_eq!(status(EntryType::Symlink, 0o777).mode_string(), "Lrwxrwxrwx");
    }

    #[test]
    fn test_mode_string_ignores_special_bits() {
        // /tmp on a stock cluster
        assert_eq!(status(EntryType::Directory, 0o1777).mode_string(), "drwxrwxrwx");
        assert_eq!(status(EntryType::File, 0o1600).mode_string(), "-rw-------");
        assert_eq!(status(EntryType::File, 0o4755).mode_string(), "-rwxr-xr-x");
    }

    #[test]
    fn test_entry_count() {
        let summary = ContentSummary {
            length: 10,
            space_consumed: 30,
            directory_count: 2,
            file_count: 5,
        };
        assert_eq!(summary.entry_count(), 7);
    }

    #[test]
    fn test_from_millis() {
        let t = from_millis(1_700_000_000_123);
        assert_eq!(t.timestamp(), 1_700_000_000);
        assert_eq!(t.timestamp_subsec_millis(), 123);
    }
}
