//! Configuration types for hdfs-usage
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Timestamp parsing for the time window bounds
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::hdfs::site::DEFAULT_CONF_DIR;
use crate::walker::{TimeWindow, WalkOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Layouts accepted for `--newer-than` / `--older-than`, tried in order
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Date-only layout, midnight UTC
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Export per-entry disk usage of an HDFS namespace as CSV
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hdfs-usage",
    version,
    about = "Export per-entry disk usage of an HDFS namespace as CSV",
    long_about = "Walks one or more HDFS paths breadth-first and writes one CSV row per entry:\n\
                  depth, mode, path, owner, group, access and modification times, size and\n\
                  usage after replication (raw and human-readable), and entry count.\n\n\
                  Entries are filtered by modification time and optionally to directories only.\n\
                  Directories outside the filter are still descended into.",
    after_help = "EXAMPLES:\n    \
        hdfs-usage /user -d 2 -o usage.csv\n    \
        hdfs-usage /data /tmp --dir-only --older-than '2024-01-01'\n    \
        hdfs-usage /warehouse --newer-than '2024-06-01 12:00' -o usage.csv --append\n    \
        hdfs-usage /projects --namenode https://nn1:9871,https://nn2:9871 --user hdfs\n    \
        hdfs-usage / --namenode file:///mnt/hdfs -d 1"
)]
pub struct CliArgs {
    /// Absolute namespace paths to walk
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Output file, or '-' for stdout
    #[arg(short, long, default_value = "-", value_name = "FILE")]
    pub output: String,

    /// Append to the output file instead of truncating it (no header is written)
    #[arg(long)]
    pub append: bool,

    /// Only emit directories
    #[arg(long)]
    pub dir_only: bool,

    /// Only emit entries modified after this time (YYYY-MM-DD[ HH:MM[:SS]], UTC)
    #[arg(long, default_value = "0000-01-01", value_name = "TIME")]
    pub newer_than: String,

    /// Only emit entries modified before this time (YYYY-MM-DD[ HH:MM[:SS]], UTC)
    #[arg(long, default_value = "9999-12-31", value_name = "TIME")]
    pub older_than: String,

    /// Maximum depth to walk (0 = the paths themselves, negative = unlimited)
    #[arg(
        short = 'd',
        long,
        default_value = "-1",
        value_name = "NUM",
        allow_negative_numbers = true
    )]
    pub max_depth: i64,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Show a progress spinner and a summary on stderr
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Namenode URL(s), comma separated; file:///dir walks a local mount
    #[arg(long, env = "WEBHDFS_URL", value_name = "URL")]
    pub namenode: Option<String>,

    /// User name for simple authentication
    #[arg(long, env = "HADOOP_USER_NAME", value_name = "NAME")]
    pub user: Option<String>,

    /// WebHDFS delegation token
    #[arg(long, env = "WEBHDFS_DELEGATION_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub delegation_token: Option<String>,

    /// Hadoop configuration directory used to discover namenodes
    #[arg(long = "hadoop-conf", env = "HADOOP_CONF_DIR", default_value = DEFAULT_CONF_DIR, value_name = "DIR")]
    pub hadoop_conf: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Number of retry attempts for transient errors
    #[arg(long, default_value = "3", value_name = "NUM")]
    pub retries: u32,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,
}

/// Parse a time window bound
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM` and `YYYY-MM-DD`,
/// interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let value = value.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConfigError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Where CSV rows go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means stdout, anything else is a file path
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "stdout"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for building a namespace client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Explicit namenode list, overriding discovery
    pub namenode: Option<String>,

    /// Hadoop configuration directory
    pub hadoop_conf_dir: PathBuf,

    pub delegation_token: Option<String>,

    pub user: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retry count for transient errors
    pub retries: u32,

    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namenode: None,
            hadoop_conf_dir: PathBuf::from(DEFAULT_CONF_DIR),
            delegation_token: None,
            user: None,
            timeout: Duration::from_secs(30),
            retries: 3,
            insecure: false,
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Roots to walk, in command-line order
    pub roots: Vec<String>,

    /// Output destination
    pub output: OutputTarget,

    /// Append instead of truncate, and skip the header
    pub append: bool,

    /// Filters and depth bound shared by every root
    pub options: WalkOptions,

    /// Namespace client settings
    pub client: ClientConfig,

    /// Show progress indicator
    pub show_progress: bool,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let min = parse_timestamp(&args.newer_than)?;
        let max = parse_timestamp(&args.older_than)?;
        if min >= max {
            return Err(ConfigError::EmptyWindow {
                min: args.newer_than,
                max: args.older_than,
            });
        }

        if args.timeout == 0 {
            return Err(ConfigError::InvalidTimeout { secs: args.timeout });
        }

        let output = OutputTarget::parse(&args.output);
        if let OutputTarget::File(path) = &output {
            if path.is_dir() {
                return Err(ConfigError::InvalidOutputPath {
                    path: path.clone(),
                    reason: "Path is a directory".to_string(),
                });
            }
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(ConfigError::InvalidOutputPath {
                        path: path.clone(),
                        reason: format!("Parent directory '{}' does not exist", parent.display()),
                    });
                }
            }
        }

        let max_depth = usize::try_from(args.max_depth).ok();

        Ok(Self {
            roots: args.paths,
            output,
            append: args.append,
            options: WalkOptions {
                window: TimeWindow::new(min, max),
                max_depth,
                dirs_only: args.dir_only,
            },
            client: ClientConfig {
                namenode: args.namenode.filter(|s| !s.trim().is_empty()),
                hadoop_conf_dir: args.hadoop_conf,
                delegation_token: args.delegation_token.filter(|s| !s.is_empty()),
                user: args.user.filter(|s| !s.is_empty()),
                timeout: Duration::from_secs(args.timeout),
                retries: args.retries,
                insecure: args.insecure,
            },
            show_progress: args.progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["hdfs-usage", "/data"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let t = parse_timestamp("2024-03-05 06:07:08").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 5));
        assert_eq!((t.hour(), t.minute(), t.second()), (6, 7, 8));

        let t = parse_timestamp("2024-03-05 06:07").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (6, 7, 0));

        let t = parse_timestamp("2024-03-05").unwrap();
        assert_eq!((t.hour(), t.minute()), (0, 0));
    }

    #[test]
    fn test_parse_timestamp_extremes() {
        assert_eq!(parse_timestamp("0000-01-01").unwrap().year(), 0);
        assert_eq!(parse_timestamp("9999-12-31").unwrap().year(), 9999);
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(ConfigError::InvalidTimestamp { .. })
        ));
        assert!(parse_timestamp("2024-13-01").is_err());
        assert!(parse_timestamp("2024/01/01").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = WalkConfig::from_args(args(&[])).unwrap();
        assert_eq!(config.roots, vec!["/data"]);
        assert_eq!(config.output, OutputTarget::Stdout);
        assert!(!config.append);
        assert_eq!(config.options.max_depth, None);
        assert!(!config.options.dirs_only);
        assert_eq!(config.options.window.min().year(), 0);
        assert_eq!(config.options.window.max().year(), 9999);
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.retries, 3);
        assert!(!config.client.insecure);
    }

    #[test]
    fn test_max_depth() {
        let config = WalkConfig::from_args(args(&["-d", "0"])).unwrap();
        assert_eq!(config.options.max_depth, Some(0));

        let config = WalkConfig::from_args(args(&["--max-depth", "3"])).unwrap();
        assert_eq!(config.options.max_depth, Some(3));

        let config = WalkConfig::from_args(args(&["-d", "-1"])).unwrap();
        assert_eq!(config.options.max_depth, None);
    }

    #[test]
    fn test_empty_window_rejected() {
        let result = WalkConfig::from_args(args(&[
            "--newer-than",
            "2024-01-01",
            "--older-than",
            "2024-01-01",
        ]));
        assert!(matches!(result, Err(ConfigError::EmptyWindow { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = WalkConfig::from_args(args(&["--timeout", "0"]));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout { secs: 0 })));
    }

    #[test]
    fn test_output_path_validation() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope/out.csv");
        let result = WalkConfig::from_args(args(&["-o", missing.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::InvalidOutputPath { .. })));

        let result = WalkConfig::from_args(args(&["-o", dir.path().to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::InvalidOutputPath { .. })));

        let ok = dir.path().join("out.csv");
        let config =
            WalkConfig::from_args(args(&["-o", ok.to_str().unwrap(), "--append"])).unwrap();
        assert_eq!(config.output, OutputTarget::File(ok));
        assert!(config.append);
    }

    #[test]
    fn test_paths_required() {
        assert!(CliArgs::try_parse_from(["hdfs-usage"]).is_err());
    }

    #[test]
    fn test_output_target_display() {
        assert_eq!(OutputTarget::parse("-").to_string(), "stdout");
        assert_eq!(OutputTarget::parse("out.csv").to_string(), "out.csv");
    }
}
