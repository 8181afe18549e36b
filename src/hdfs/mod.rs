//! Namespace access module
//!
//! The walker only needs three read-only operations from a filesystem:
//! stat a path, list a directory, and summarize a subtree. They are
//! captured by [`NamespaceClient`], with one implementation per backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  NamespaceClient                     │
//! │  stat / list_children / content_summary             │
//! └───────┬──────────────────┬──────────────────┬───────┘
//!         │                  │                  │
//!         ▼                  ▼                  ▼
//! ┌───────────────┐  ┌───────────────┐  ┌───────────────┐
//! │ WebHdfsClient │  │  LocalClient  │  │MemoryNamespace│
//! │ REST, HA      │  │ file:// mount │  │ tests/benches │
//! │ failover      │  │               │  │               │
//! └───────────────┘  └───────────────┘  └───────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hdfs_usage::hdfs::{Auth, NamespaceClient, WebHdfsClientBuilder};
//! use std::time::Duration;
//!
//! let client = WebHdfsClientBuilder::new(vec!["http://namenode:9870".into()])
//!     .timeout(Duration::from_secs(30))
//!     .auth(Auth::Simple(Some("hdfs".into())))
//!     .build()
//!     .unwrap();
//!
//! for child in client.list_children("/user").unwrap() {
//!     println!("{}: {}", child.name, child.entry_type);
//! }
//! ```

pub mod auth;
#[cfg(unix)]
pub mod local;
pub mod memory;
pub mod site;
pub mod types;
pub mod webhdfs;

use crate::config::ClientConfig;
use crate::error::{HdfsError, HdfsResult};
use std::sync::Arc;
use tracing::{debug, info};

pub use auth::Auth;
pub use site::{ClusterConfig, KerberosEnv};
pub use types::{from_millis, ContentSummary, EntryType, FileStatus, Permissions};
pub use webhdfs::{WebHdfsClient, WebHdfsClientBuilder};

/// Read-only access to a hierarchical namespace
///
/// Implementations are shared across the walker's threads, so they must be
/// `Send + Sync`; calls are made one at a time per walk.
pub trait NamespaceClient: Send + Sync {
    /// Status of exactly one path
    fn stat(&self, path: &str) -> HdfsResult<FileStatus>;

    /// Direct children of a directory, in the order the backend returns them
    fn list_children(&self, path: &str) -> HdfsResult<Vec<FileStatus>>;

    /// Aggregate usage of the subtree rooted at `path`
    fn content_summary(&self, path: &str) -> HdfsResult<ContentSummary>;

    /// Short description for log lines
    fn describe(&self) -> String;
}

/// Build a client from configuration
///
/// A `file://` namenode selects the local-mount client. Otherwise the
/// namenode list comes from `--namenode` or, failing that, from
/// `hdfs-site.xml` in the Hadoop configuration directory. A kerberized
/// cluster is reached with SPNEGO unless a delegation token is given.
pub fn connect(config: &ClientConfig) -> HdfsResult<Arc<dyn NamespaceClient>> {
    if let Some(root) = config
        .namenode
        .as_deref()
        .and_then(|nn| nn.strip_prefix("file://"))
    {
        return connect_local(root);
    }

    let cluster = match ClusterConfig::load(&config.hadoop_conf_dir) {
        Ok(cluster) => Some(cluster),
        Err(e) if config.namenode.is_some() => {
            debug!(error = %e, "Hadoop configuration not loaded, using --namenode only");
            None
        }
        Err(e) => return Err(e),
    };

    let namenodes = match &config.namenode {
        Some(list) => split_namenodes(list),
        None => cluster
            .as_ref()
            .map(ClusterConfig::namenode_urls)
            .unwrap_or_default(),
    };
    if namenodes.is_empty() {
        return Err(HdfsError::ConfigLoad {
            path: config.hadoop_conf_dir.display().to_string(),
            reason: "no namenode address found; pass --namenode".into(),
        });
    }

    let auth = Auth::select(
        cluster.as_ref().is_some_and(ClusterConfig::kerberos_enabled),
        config.delegation_token.as_deref(),
        config.user.as_deref(),
        KerberosEnv::from_env,
    )?;

    let client = WebHdfsClientBuilder::new(namenodes)
        .timeout(config.timeout)
        .retries(config.retries)
        .accept_invalid_certs(config.insecure)
        .auth(auth)
        .build()?;
    info!("Using {}", client.describe());
    Ok(Arc::new(client))
}

#[cfg(unix)]
fn connect_local(root: &str) -> HdfsResult<Arc<dyn NamespaceClient>> {
    let client = local::LocalClient::new(root)?;
    info!("Using {}", client.describe());
    Ok(Arc::new(client))
}

#[cfg(not(unix))]
fn connect_local(root: &str) -> HdfsResult<Arc<dyn NamespaceClient>> {
    Err(HdfsError::InvalidUrl {
        url: format!("file://{}", root),
        reason: "local mounts are only supported on Unix".into(),
    })
}

/// Split a `,` or `;` separated namenode list
fn split_namenodes(list: &str) -> Vec<String> {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
