//! Error types for hdfs-usage
//!
//! This module defines the error hierarchy that covers:
//! - Namespace client errors (WebHDFS, local mount)
//! - Configuration and CLI errors
//! - CSV output errors
//!
//! Library code returns these structured errors; the binary wraps them
//! with `anyhow` context.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the hdfs-usage application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Namespace client errors
    #[error("HDFS error: {0}")]
    Hdfs(#[from] HdfsError),

    /// Output errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// A walk was requested with an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Walker thread could not be started or vanished
    #[error("Walker thread error: {0}")]
    Thread(String),
}

/// Namespace client errors
#[derive(Error, Debug, Clone)]
pub enum HdfsError {
    /// Namenode URL could not be parsed
    #[error("Invalid namenode URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Hadoop or Kerberos configuration could not be loaded
    #[error("Failed to load configuration '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// No SPNEGO token could be produced for a namenode
    #[error("Kerberos authentication to '{host}' failed: {reason}")]
    Auth { host: String, reason: String },

    /// HTTP transport failure (connect, timeout, TLS)
    #[error("Request to '{url}' failed: {reason}")]
    Request { url: String, reason: String },

    /// Namenode answered with a RemoteException
    #[error("{exception} on '{path}': {message}")]
    Remote {
        path: String,
        exception: String,
        message: String,
    },

    /// Path not found
    #[error("Path not found: '{path}'")]
    NotFound { path: String },

    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: String },

    /// Namenode is in standby state and cannot serve reads
    #[error("Namenode '{url}' is in standby state")]
    Standby { url: String },

    /// Listing was requested on a plain file
    #[error("'{path}' is not a directory")]
    NotADirectory { path: String },

    /// Response body could not be decoded
    #[error("Failed to decode response for '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// Local filesystem error
    #[error("I/O error on '{path}': {reason}")]
    Io { path: String, reason: String },

    /// Every configured namenode failed
    #[error("No namenode available after {attempts} attempts: {last}")]
    Unavailable { attempts: u32, last: String },
}

impl HdfsError {
    /// Check if this error should move the client to another namenode
    pub fn should_failover(&self) -> bool {
        matches!(
            self,
            HdfsError::Request { .. } | HdfsError::Standby { .. }
        )
    }

    /// Build an error from a local `std::io::Error`
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => HdfsError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => HdfsError::PermissionDenied {
                path: path.to_string(),
            },
            _ => HdfsError::Io {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Timestamp argument matched none of the accepted layouts
    #[error("Invalid timestamp '{value}': expected YYYY-MM-DD[ HH:MM[:SS]]")]
    InvalidTimestamp { value: String },

    /// Lower time bound is not before upper time bound
    #[error("Empty time window: --newer-than {min} is not before --older-than {max}")]
    EmptyWindow { min: String, max: String },

    /// Request timeout of zero
    #[error("Invalid timeout {secs}: must be at least 1 second")]
    InvalidTimeout { secs: u64 },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// CSV output errors
#[derive(Error, Debug)]
pub enum OutputError {
    /// CSV encoder error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to open output destination
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Flush at the end of output failed
    #[error("Failed to flush output: {0}")]
    Flush(#[from] std::io::Error),
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for HdfsError
pub type HdfsResult<T> = std::result::Result<T, HdfsError>;

/// Result type alias for OutputError
pub type OutputResult<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdfs_error_failover() {
        let perm_denied = HdfsError::PermissionDenied {
            path: "/test".into(),
        };
        assert!(!perm_denied.should_failover());

        let request = HdfsError::Request {
            url: "http://nn1:9870".into(),
            reason: "connection refused".into(),
        };
        assert!(request.should_failover());
    }

    #[test]
    fn test_error_conversion() {
        let hdfs_err = HdfsError::NotFound {
            path: "/missing".into(),
        };
        let walker_err: WalkerError = hdfs_err.into();
        assert!(matches!(walker_err, WalkerError::Hdfs(_)));

        let output_err = OutputError::Flush(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        let walker_err: WalkerError = output_err.into();
        assert!(matches!(walker_err, WalkerError::Output(_)));
    }

    #[test]
    fn test_from_io_kind() {
        let err = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(
            HdfsError::from_io("/x", &err),
            HdfsError::NotFound { .. }
        ));

        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            HdfsError::from_io("/x", &err),
            HdfsError::PermissionDenied { .. }
        ));
    }
}
