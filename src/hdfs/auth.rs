//! WebHDFS authentication
//!
//! One scheme is picked per run:
//!
//! | Scheme           | When                                 | On the wire                      |
//! |------------------|--------------------------------------|----------------------------------|
//! | Delegation token | `--delegation-token` given           | `delegation=` query parameter    |
//! | Kerberos         | cluster has `kerberos` security      | `Authorization: Negotiate` header |
//! | Pseudo-auth      | otherwise                            | `user.name=` query parameter     |
//!
//! SPNEGO tokens come from the system GSSAPI library through `libgssapi`,
//! which is only linked with the `kerberos` cargo feature.

use super::site::KerberosEnv;
use crate::error::{HdfsError, HdfsResult};
use std::fmt;

/// Authentication scheme used for every WebHDFS request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Pre-issued delegation token
    DelegationToken(String),
    /// SPNEGO from the user's Kerberos ticket cache
    Kerberos,
    /// `user.name` pseudo-authentication, or none at all
    Simple(Option<String>),
}

impl Auth {
    /// Pick the scheme for a cluster
    ///
    /// An explicit delegation token always wins. `krb` is only consulted
    /// for a kerberized cluster.
    pub fn select(
        kerberized: bool,
        delegation_token: Option<&str>,
        user: Option<&str>,
        krb: impl FnOnce() -> KerberosEnv,
    ) -> HdfsResult<Self> {
        if let Some(token) = delegation_token {
            return Ok(Auth::DelegationToken(token.to_string()));
        }
        if !kerberized {
            return Ok(Auth::Simple(user.map(str::to_string)));
        }

        let env = krb();
        if !SPNEGO_AVAILABLE {
            return Err(HdfsError::ConfigLoad {
                path: env.credential_cache.display().to_string(),
                reason: "cluster uses Kerberos but this build lacks the `kerberos` feature; \
                         rebuild with it or pass --delegation-token"
                    .into(),
            });
        }
        env.check()?;
        env.export();
        Ok(Auth::Kerberos)
    }

    /// `Authorization` header value for a request to `host`, if any
    pub fn authorization(&self, host: &str) -> HdfsResult<Option<String>> {
        match self {
            Auth::Kerberos => negotiate(host).map(Some),
            _ => Ok(None),
        }
    }

    /// Query parameter carrying the credentials, if any
    pub fn query_pair(&self) -> Option<(&'static str, &str)> {
        match self {
            Auth::DelegationToken(token) => Some(("delegation", token.as_str())),
            Auth::Simple(Some(user)) => Some(("user.name", user.as_str())),
            _ => None,
        }
    }
}

impl Default for Auth {
    fn default() -> Self {
        Auth::Simple(None)
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::DelegationToken(_) => write!(f, "delegation token"),
            Auth::Kerberos => write!(f, "kerberos"),
            Auth::Simple(Some(user)) => write!(f, "user {}", user),
            Auth::Simple(None) => write!(f, "anonymous"),
        }
    }
}

/// Whether this build can produce SPNEGO tokens
pub const SPNEGO_AVAILABLE: bool = cfg!(feature = "kerberos");

/// Initial SPNEGO token for `HTTP@host`, as a `Negotiate` header value
#[cfg(feature = "kerberos")]
fn negotiate(host: &str) -> HdfsResult<String> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use libgssapi::context::{ClientCtx, CtxFlags};
    use libgssapi::name::Name;
    use libgssapi::oid::{GSS_MECH_KRB5, GSS_NT_HOSTBASED_SERVICE};

    let failed = |reason: String| HdfsError::Auth {
        host: host.to_string(),
        reason,
    };

    let service = format!("HTTP@{}", host);
    let target = Name::new(service.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE))
        .map_err(|e| failed(e.to_string()))?;

    // Default credentials: the ticket cache named by KRB5CCNAME
    let mut ctx = ClientCtx::new(None, target, CtxFlags::GSS_C_MUTUAL_FLAG, Some(&GSS_MECH_KRB5));
    let token = ctx
        .step(None, None)
        .map_err(|e| failed(e.to_string()))?
        .ok_or_else(|| failed("GSSAPI produced no initial token".into()))?;

    Ok(format!("Negotiate {}", STANDARD.encode(&*token)))
}

#[cfg(not(feature = "kerberos"))]
fn negotiate(host: &str) -> HdfsResult<String> {
    Err(HdfsError::Auth {
        host: host.to_string(),
        reason: "built without the `kerberos` feature".into(),
    })
}
