//! Hadoop and Kerberos configuration discovery
//!
//! Reads `core-site.xml` and `hdfs-site.xml` from the Hadoop configuration
//! directory and resolves the namenode web addresses, including HA
//! nameservices. Kerberos credential locations come from the environment
//! with the usual defaults.

use crate::error::{HdfsError, HdfsResult};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Default Hadoop configuration directory
pub const DEFAULT_CONF_DIR: &str = "/etc/hadoop/conf";

static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid comment regex"));

static PROPERTY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<property>(.*?)</property>").expect("Invalid property regex"));

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<name>\s*(.*?)\s*</name>").expect("Invalid name regex"));

static VALUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<value>\s*(.*?)\s*</value>").expect("Invalid value regex"));

/// Merged properties from the Hadoop site files
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    properties: HashMap<String, String>,
}

impl ClusterConfig {
    /// Load `core-site.xml` then `hdfs-site.xml` from `conf_dir`
    ///
    /// Either file may be missing, but not both.
    pub fn load(conf_dir: &Path) -> HdfsResult<Self> {
        let mut config = Self::default();

        let mut found = 0;
        for name in ["core-site.xml", "hdfs-site.xml"] {
            let path = conf_dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(xml) => {
                    debug!(path = %path.display(), "Loaded Hadoop configuration");
                    config.merge_xml(&xml);
                    found += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(HdfsError::ConfigLoad {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }

        if found == 0 {
            return Err(HdfsError::ConfigLoad {
                path: conf_dir.display().to_string(),
                reason: "neither core-site.xml nor hdfs-site.xml found".into(),
            });
        }
        Ok(config)
    }

    /// Build from an in-memory site file
    pub fn from_xml(xml: &str) -> Self {
        let mut config = Self::default();
        config.merge_xml(xml);
        config
    }

    /// Later files override earlier ones, as in Hadoop
    fn merge_xml(&mut self, xml: &str) {
        // Retired settings are often left commented out in place
        let xml = COMMENT_REGEX.replace_all(xml, "");
        for caps in PROPERTY_REGEX.captures_iter(&xml) {
            let body = &caps[1];
            let name = NAME_REGEX.captures(body).map(|c| unescape(&c[1]));
            let value = VALUE_REGEX.captures(body).map(|c| unescape(&c[1]));
            if let (Some(name), Some(value)) = (name, value) {
                self.properties.insert(name, value);
            }
        }
    }

    /// Look up a property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// `hadoop.security.authentication` is `kerberos`
    pub fn kerberos_enabled(&self) -> bool {
        self.get("hadoop.security.authentication")
            .is_some_and(|v| v.eq_ignore_ascii_case("kerberos"))
    }

    fn https_only(&self) -> bool {
        self.get("dfs.http.policy")
            .is_some_and(|v| v.eq_ignore_ascii_case("HTTPS_ONLY"))
    }

    /// WebHDFS base URLs of every namenode, active candidates first
    ///
    /// For an HA nameservice this lists each namenode in
    /// `dfs.ha.namenodes.<ns>` order.
    pub fn namenode_urls(&self) -> Vec<String> {
        let nameservice = self
            .get("dfs.nameservices")
            .and_then(|ns| ns.split(',').map(str::trim).find(|s| !s.is_empty()));

        let Some(ns) = nameservice else {
            return self.web_address("").into_iter().collect();
        };

        match self.get(&format!("dfs.ha.namenodes.{}", ns)) {
            Some(ids) => ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .filter_map(|id| self.web_address(&format!(".{}.{}", ns, id)))
                .collect(),
            None => self
                .web_address(&format!(".{}", ns))
                .or_else(|| self.web_address(""))
                .into_iter()
                .collect(),
        }
    }

    /// Resolve `dfs.namenode.http(s)-address<suffix>` to a URL
    fn web_address(&self, suffix: &str) -> Option<String> {
        let https = self.get(&format!("dfs.namenode.https-address{}", suffix));
        let http = self.get(&format!("dfs.namenode.http-address{}", suffix));

        match (https, http) {
            (Some(addr), _) if self.https_only() => Some(format!("https://{}", addr)),
            (_, Some(addr)) => Some(format!("http://{}", addr)),
            (Some(addr), None) => Some(format!("https://{}", addr)),
            (None, None) => None,
        }
    }
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Kerberos credential locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KerberosEnv {
    /// `KRB5CCNAME`, default `/tmp/krb5cc_<uid>`
    pub credential_cache: PathBuf,
    /// `KRB5_CONFIG`, default `/etc/krb5.conf`
    pub krb5_config: PathBuf,
}

impl KerberosEnv {
    pub fn from_env() -> Self {
        let ccache = get_env("KRB5CCNAME", &format!("/tmp/krb5cc_{}", current_uid()));
        let ccache = ccache.strip_prefix("FILE:").unwrap_or(&ccache).to_string();
        Self {
            credential_cache: PathBuf::from(ccache),
            krb5_config: PathBuf::from(get_env("KRB5_CONFIG", "/etc/krb5.conf")),
        }
    }

    /// Ticket cache path, unless the cache lives in a keyring, KCM or
    /// another non-file store
    fn file_cache(&self) -> Option<&Path> {
        let cache = self.credential_cache.to_str()?;
        (!cache.contains(':')).then_some(self.credential_cache.as_path())
    }

    /// Fail early when the ticket cache or krb5.conf is missing
    pub fn check(&self) -> HdfsResult<()> {
        if let Some(cache) = self.file_cache() {
            if !cache.exists() {
                return Err(HdfsError::ConfigLoad {
                    path: cache.display().to_string(),
                    reason: "no Kerberos ticket cache; run kinit first".into(),
                });
            }
        }
        if !self.krb5_config.exists() {
            return Err(HdfsError::ConfigLoad {
                path: self.krb5_config.display().to_string(),
                reason: "Kerberos configuration not found; set KRB5_CONFIG".into(),
            });
        }
        Ok(())
    }

    /// Publish the resolved locations to GSSAPI
    ///
    /// Must run before any other thread is started. Variables the user
    /// already set are left alone.
    pub fn export(&self) {
        if std::env::var_os("KRB5CCNAME").is_none() {
            std::env::set_var("KRB5CCNAME", &self.credential_cache);
        }
        if std::env::var_os("KRB5_CONFIG").is_none() {
            std::env::set_var("KRB5_CONFIG", &self.krb5_config);
        }
        debug!(
            ccache = %self.credential_cache.display(),
            krb5_config = %self.krb5_config.display(),
            "Using Kerberos credentials"
        );
    }
}

/// Environment variable with a fallback
pub fn get_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(unix)]
fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    const HA_SITE: &str = r#"<?xml version="1.0"?>
<configuration>
  <property>
    <name>dfs.nameservices</name>
    <value>prod</value>
  </property>
  <property>
    <name>dfs.ha.namenodes.prod</name>
    <value>nn1,nn2</value>
  </property>
  <property>
    <name>dfs.namenode.https-address.prod.nn1</name>
    <value>master1.example.com:9871</value>
  </property>
  <property>
    <name>dfs.namenode.https-address.prod.nn2</name>
    <value>master2.example.com:9871</value>
  </property>
  <property>
    <name>dfs.namenode.http-address.prod.nn1</name>
    <value>master1.example.com:9870</value>
  </property>
  <property>
    <name>dfs.http.policy</name>
    <value>HTTPS_ONLY</value>
  </property>
</configuration>"#;

    #[test]
    fn test_ha_namenode_urls() {
        let config = ClusterConfig::from_xml(HA_SITE);
        assert_eq!(
            config.namenode_urls(),
            vec![
                "https://master1.example.com:9871",
                "https://master2.example.com:9871"
            ]
        );
    }

    #[test]
    fn test_single_namenode_http() {
        let config = ClusterConfig::from_xml(
            "<configuration><property><name>dfs.namenode.http-address</name>\
             <value>nn:9870</value></property></configuration>",
        );
        assert_eq!(config.namenode_urls(), vec!["http://nn:9870"]);
        assert!(!config.kerberos_enabled());
    }

    #[test]
    fn test_kerberos_detection_and_unescape() {
        let config = ClusterConfig::from_xml(
            "<property><name>hadoop.security.authentication</name><value>Kerberos</value></property>\
             <property><name>x.y</name><value>a &amp; b</value></property>",
        );
        assert!(config.kerberos_enabled());
        assert_eq!(config.get("x.y"), Some("a & b"));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hdfs-site.xml"), HA_SITE).unwrap();
        let config = ClusterConfig::load(dir.path()).unwrap();
        assert_eq!(config.namenode_urls().len(), 2);
    }

    #[test]
    fn test_commented_out_properties_ignored() {
        let config = ClusterConfig::from_xml(
            "<configuration>\
             <property><name>dfs.namenode.http-address</name><value>live:9870</value></property>\
             <!-- moved off the old master\
             <property><name>dfs.namenode.http-address</name><value>retired:50070</value></property>\
             -->\
             <!-- <property><name>hadoop.security.authentication</name><value>kerberos</value></property> -->\
             </configuration>",
        );
        assert_eq!(config.namenode_urls(), vec!["http://live:9870"]);
        assert!(!config.kerberos_enabled());
    }

    #[cfg(unix)]
    #[test]
    fn test_current_uid_owns_new_files() {
        use std::os::unix::fs::MetadataExt;
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(file.as_file().metadata().unwrap().uid(), current_uid());
    }

    #[test]
    fn test_kerberos_check() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("krb5cc_1000");
        let krb5_conf = dir.path().join("krb5.conf");
        std::fs::write(&krb5_conf, "[libdefaults]\n").unwrap();

        let env = KerberosEnv {
            credential_cache: cache.clone(),
            krb5_config: krb5_conf.clone(),
        };
        assert!(matches!(env.check(), Err(HdfsError::ConfigLoad { .. })));

        std::fs::write(&cache, b"ticket").unwrap();
        assert!(env.check().is_ok());

        let keyring = KerberosEnv {
            credential_cache: PathBuf::from("KEYRING:persistent:1000"),
            krb5_config: krb5_conf,
        };
        assert!(keyring.check().is_ok());

        let no_conf = KerberosEnv {
            credential_cache: cache,
            krb5_config: dir.path().join("missing.conf"),
        };
        assert!(no_conf.check().is_err());
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClusterConfig::load(&dir.path().join("nope")),
            Err(HdfsError::ConfigLoad { .. })
        ));
    }
}
