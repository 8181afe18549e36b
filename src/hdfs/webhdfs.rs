//! WebHDFS REST client
//!
//! Implements [`NamespaceClient`] over the namenode's WebHDFS endpoint:
//!
//! | Operation          | WebHDFS op            |
//! |--------------------|-----------------------|
//! | `stat`             | `GETFILESTATUS`       |
//! | `list_children`    | `LISTSTATUS`          |
//! | `content_summary`  | `GETCONTENTSUMMARY`   |
//!
//! With several namenodes configured (HA), a transport failure or a
//! `StandbyException` moves the request to the next namenode; the one that
//! answers becomes the first choice for later requests.

use super::auth::Auth;
use super::types::{from_millis, ContentSummary, EntryType, FileStatus, Permissions};
use super::NamespaceClient;
use crate::error::{HdfsError, HdfsResult};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Wire format of a single file status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileStatusJson {
    access_time: i64,
    group: String,
    length: u64,
    modification_time: i64,
    owner: String,
    path_suffix: String,
    permission: String,
    replication: u16,
    #[serde(rename = "type")]
    entry_type: EntryType,
}

impl FileStatusJson {
    fn into_status(self) -> FileStatus {
        FileStatus {
            name: self.path_suffix,
            entry_type: self.entry_type,
            permissions: Permissions::from_octal(&self.permission).unwrap_or_default(),
            owner: self.owner,
            group: self.group,
            length: self.length,
            replication: self.replication,
            access_time: from_millis(self.access_time),
            modification_time: from_millis(self.modification_time),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileStatusResponse {
    #[serde(rename = "FileStatus")]
    file_status: FileStatusJson,
}

#[derive(Debug, Deserialize)]
struct FileStatusArray {
    #[serde(rename = "FileStatus")]
    file_status: Vec<FileStatusJson>,
}

#[derive(Debug, Deserialize)]
struct FileStatusesResponse {
    #[serde(rename = "FileStatuses")]
    file_statuses: FileStatusArray,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentSummaryJson {
    directory_count: u64,
    file_count: u64,
    length: u64,
    space_consumed: u64,
}

#[derive(Debug, Deserialize)]
struct ContentSummaryResponse {
    #[serde(rename = "ContentSummary")]
    content_summary: ContentSummaryJson,
}

#[derive(Debug, Deserialize)]
struct RemoteExceptionJson {
    exception: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RemoteExceptionResponse {
    #[serde(rename = "RemoteException")]
    remote_exception: RemoteExceptionJson,
}

/// Blocking WebHDFS client with namenode failover
pub struct WebHdfsClient {
    http: Client,
    namenodes: Vec<String>,
    /// Index of the namenode that answered last
    active: AtomicUsize,
    auth: Auth,
    retries: u32,
}

impl WebHdfsClient {
    /// Namenode currently tried first
    pub fn active_namenode(&self) -> &str {
        &self.namenodes[self.active.load(Ordering::Relaxed) % self.namenodes.len()]
    }

    /// Build the request URL for `op` on `path` at namenode `base`
    fn request_url(&self, base: &str, path: &str, op: &str) -> HdfsResult<Url> {
        let invalid = |reason: String| HdfsError::InvalidUrl {
            url: base.to_string(),
            reason,
        };

        let mut url = Url::parse(&format!("{}/webhdfs/v1", base.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid("URL cannot be a base".into()))?;
            let mut parts = path.split('/').filter(|s| !s.is_empty()).peekable();
            if parts.peek().is_none() {
                // The namespace root is addressed as `/webhdfs/v1/`
                segments.push("");
            }
            segments.extend(parts);
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("op", op);
            if let Some((key, value)) = self.auth.query_pair() {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Run `op` against the namenodes, failing over on transport errors
    fn get<T: DeserializeOwned>(&self, path: &str, op: &str) -> HdfsResult<T> {
        let count = self.namenodes.len();
        let start = self.active.load(Ordering::Relaxed);
        let mut last_error = None;

        for offset in 0..count {
            let idx = (start + offset) % count;
            let base = &self.namenodes[idx];

            match self.get_with_retries(base, path, op) {
                Ok(value) => {
                    if offset > 0 {
                        self.active.store(idx, Ordering::Relaxed);
                        info!(namenode = %base, "Switched to namenode");
                    }
                    return Ok(value);
                }
                Err(e) if e.should_failover() => {
                    debug!(namenode = %base, error = %e, "Namenode failed, trying next");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(HdfsError::Unavailable {
            attempts: count as u32,
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    fn get_with_retries<T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        op: &str,
    ) -> HdfsResult<T> {
        let url = self.request_url(base, path, op)?;
        let mut last_error = None;

        for attempt in 0..=self.retries {
            if attempt > 0 {
                // Exponential backoff: 100ms, 200ms, 400ms, ...
                let delay = Duration::from_millis(100 * (1 << (attempt - 1).min(6)));
                std::thread::sleep(delay);
            }

            match self.get_once(&url, path) {
                Err(e @ HdfsError::Request { .. }) => {
                    debug!(url = %redact(&url), attempt, error = %e, "WebHDFS request failed");
                    last_error = Some(e);
                }
                other => return other,
            }
        }

        Err(last_error.unwrap_or_else(|| HdfsError::Request {
            url: redact(&url),
            reason: "request failed after all retries".into(),
        }))
    }

    fn get_once<T: DeserializeOwned>(&self, url: &Url, path: &str) -> HdfsResult<T> {
        let mut request = self.http.get(url.clone());
        if let Some(header) = self.auth.authorization(url.host_str().unwrap_or_default())? {
            request = request.header(AUTHORIZATION, header);
        }

        let response = request
            .send()
            .map_err(|e| HdfsError::Request {
                url: redact(url),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.bytes().map_err(|e| HdfsError::Request {
            url: redact(url),
            reason: e.to_string(),
        })?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(|e| HdfsError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            });
        }

        Err(remote_error(url, path, status, &body))
    }
}

/// Map a non-success WebHDFS response to an error
fn remote_error(url: &Url, path: &str, status: StatusCode, body: &[u8]) -> HdfsError {
    match serde_json::from_slice::<RemoteExceptionResponse>(body) {
        Ok(resp) => {
            let exception = resp.remote_exception.exception;
            match exception.as_str() {
                "FileNotFoundException" => HdfsError::NotFound {
                    path: path.to_string(),
                },
                "AccessControlException" | "SecurityException" => HdfsError::PermissionDenied {
                    path: path.to_string(),
                },
                "StandbyException" => HdfsError::Standby { url: redact(url) },
                _ => HdfsError::Remote {
                    path: path.to_string(),
                    exception,
                    message: resp.remote_exception.message,
                },
            }
        }
        Err(_) => match status {
            StatusCode::NOT_FOUND => HdfsError::NotFound {
                path: path.to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HdfsError::PermissionDenied {
                path: path.to_string(),
            },
            _ if status.is_server_error() => HdfsError::Request {
                url: redact(url),
                reason: format!("HTTP {}", status),
            },
            _ => HdfsError::Remote {
                path: path.to_string(),
                exception: format!("HTTP {}", status),
                message: String::from_utf8_lossy(body).chars().take(200).collect(),
            },
        },
    }
}

/// URL without its query string, so tokens never reach the logs
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

impl NamespaceClient for WebHdfsClient {
    fn stat(&self, path: &str) -> HdfsResult<FileStatus> {
        let resp: FileStatusResponse = self.get(path, "GETFILESTATUS")?;
        Ok(resp.file_status.into_status())
    }

    fn list_children(&self, path: &str) -> HdfsResult<Vec<FileStatus>> {
        let resp: FileStatusesResponse = self.get(path, "LISTSTATUS")?;
        let statuses = resp.file_statuses.file_status;

        // LISTSTATUS on a file returns the file itself with an empty suffix
        if let [only] = statuses.as_slice() {
            if only.path_suffix.is_empty() {
                return Err(HdfsError::NotADirectory {
                    path: path.to_string(),
                });
            }
        }

        Ok(statuses.into_iter().map(FileStatusJson::into_status).collect())
    }

    fn content_summary(&self, path: &str) -> HdfsResult<ContentSummary> {
        let resp: ContentSummaryResponse = self.get(path, "GETCONTENTSUMMARY")?;
        let summary = resp.content_summary;
        Ok(ContentSummary {
            length: summary.length,
            space_consumed: summary.space_consumed,
            directory_count: summary.directory_count,
            file_count: summary.file_count,
        })
    }

    fn describe(&self) -> String {
        format!("WebHDFS at {} ({})", self.namenodes.join(", "), self.auth)
    }
}

/// Builder for WebHDFS clients
pub struct WebHdfsClientBuilder {
    namenodes: Vec<String>,
    timeout: Duration,
    retries: u32,
    auth: Auth,
    accept_invalid_certs: bool,
}

impl WebHdfsClientBuilder {
    /// Create a new builder for the given namenode base URLs
    pub fn new(namenodes: Vec<String>) -> Self {
        Self {
            namenodes,
            timeout: Duration::from_secs(30),
            retries: 3,
            auth: Auth::default(),
            accept_invalid_certs: false,
        }
    }

    /// Set per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count for transport errors
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the authentication scheme
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Skip TLS certificate verification
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Validate the namenode URLs and build the HTTP client
    pub fn build(self) -> HdfsResult<WebHdfsClient> {
        if self.namenodes.is_empty() {
            return Err(HdfsError::InvalidUrl {
                url: String::new(),
                reason: "no namenode URL given".into(),
            });
        }

        for nn in &self.namenodes {
            let url = Url::parse(nn).map_err(|e| HdfsError::InvalidUrl {
                url: nn.clone(),
                reason: e.to_string(),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(HdfsError::InvalidUrl {
                    url: nn.clone(),
                    reason: "expected an http:// or https:// URL".into(),
                });
            }
        }

        if self.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| HdfsError::Request {
                url: self.namenodes.join(","),
                reason: e.to_string(),
            })?;

        Ok(WebHdfsClient {
            http,
            namenodes: self.namenodes,
            active: AtomicUsize::new(0),
            auth: self.auth,
            retries: self.retries,
        })
    }
}
