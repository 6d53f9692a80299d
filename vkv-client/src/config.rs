//! Configuration for the client.
//!
//! Everything is passed in by the embedding application; this crate reads
//! no environment variables and no files of its own.

use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectionError, ConnectionResult};

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address, e.g. "127.0.0.1:6379" or "[::1]:6379".
    pub addr: String,
    /// Optional ACL user name.
    pub username: Option<String>,
    /// Password; empty means no AUTH.
    pub password: String,
    /// Logical database index. Ignored in cluster mode.
    pub db: i64,
    /// Connect to a single node only; skip the cluster probe.
    pub force_single: bool,
    /// `None` disables TLS; `Some(TlsConfig::default())` enables it with
    /// defaults.
    pub tls: Option<TlsConfig>,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:6379".to_string(),
            username: None,
            password: String::new(),
            db: 0,
            force_single: false,
            tls: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolves the address and credentials into connection parameters.
    pub(crate) fn connection_info(&self) -> ConnectionResult<ConnectionInfo> {
        let (host, port) = parse_addr(&self.addr)?;
        let addr = match &self.tls {
            Some(tls) => ConnectionAddr::TcpTls {
                host,
                port,
                insecure: tls.insecure,
                tls_params: None,
            },
            None => ConnectionAddr::Tcp(host, port),
        };
        Ok(ConnectionInfo {
            addr,
            redis: RedisConnectionInfo {
                db: self.db,
                username: self.username.clone(),
                password: if self.password.is_empty() {
                    None
                } else {
                    Some(self.password.clone())
                },
                ..Default::default()
            },
        })
    }
}

/// TLS settings. Certificates and keys are PEM encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Skip certificate and host name verification.
    pub insecure: bool,
    /// Root certificate used instead of the platform trust store.
    pub root_cert: Option<Vec<u8>>,
    /// Client certificate for mutual TLS; requires `client_key`.
    pub client_cert: Option<Vec<u8>>,
    /// Client private key for mutual TLS; requires `client_cert`.
    pub client_key: Option<Vec<u8>>,
}

impl TlsConfig {
    /// Custom certificates, or `None` when platform defaults apply.
    pub(crate) fn certificates(&self) -> ConnectionResult<Option<redis::TlsCertificates>> {
        let client_tls = match (&self.client_cert, &self.client_key) {
            (Some(cert), Some(key)) => Some(redis::ClientTlsConfig {
                client_cert: cert.clone(),
                client_key: key.clone(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConnectionError::InvalidTls(
                    "client certificate given without a key".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ConnectionError::InvalidTls(
                    "client key given without a certificate".to_string(),
                ))
            }
        };
        if client_tls.is_none() && self.root_cert.is_none() {
            return Ok(None);
        }
        Ok(Some(redis::TlsCertificates {
            client_tls,
            root_cert: self.root_cert.clone(),
        }))
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Sets the server address.
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Sets the ACL user name.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Sets the password; empty means no AUTH.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Sets the logical database index.
    pub fn db(mut self, db: i64) -> Self {
        self.config.db = db;
        self
    }

    /// Skip the cluster probe and talk to one node.
    pub fn force_single(mut self, force_single: bool) -> Self {
        self.config.force_single = force_single;
        self
    }

    /// Enables TLS with the given settings.
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = Some(tls);
        self
    }

    /// Sets the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Splits "host:port" (IPv6 hosts in brackets) into its parts.
fn parse_addr(addr: &str) -> ConnectionResult<(String, u16)> {
    let invalid = || ConnectionError::InvalidAddress(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() || (host.contains(':') && !addr.starts_with('[')) {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        assert_eq!(
            parse_addr("cache.local:6380").unwrap(),
            ("cache.local".to_string(), 6380)
        );
        assert_eq!(parse_addr("[::1]:6379").unwrap(), ("::1".to_string(), 6379));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for addr in ["localhost", ":6379", "host:port", "host:70000", "::1:6379"] {
            assert!(
                matches!(parse_addr(addr), Err(ConnectionError::InvalidAddress(_))),
                "{addr} should be rejected"
            );
        }
    }

    #[test]
    fn empty_password_skips_auth() {
        let info = ClientConfig::default().connection_info().unwrap();
        assert!(info.redis.password.is_none());
        assert!(matches!(info.addr, ConnectionAddr::Tcp(ref host, 6379) if host == "127.0.0.1"));
    }

    #[test]
    fn empty_tls_config_enables_tls() {
        let config = ClientConfig::builder()
            .addr("127.0.0.1:6380")
            .password("secret")
            .db(3)
            .tls(TlsConfig::default())
            .build();
        let info = config.connection_info().unwrap();
        assert!(matches!(
            info.addr,
            ConnectionAddr::TcpTls { port: 6380, insecure: false, .. }
        ));
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
        assert_eq!(info.redis.db, 3);
        assert!(TlsConfig::default().certificates().unwrap().is_none());
    }

    #[test]
    fn half_client_identity_is_rejected() {
        let tls = TlsConfig {
            client_cert: Some(b"cert".to_vec()),
            ..TlsConfig::default()
        };
        assert!(matches!(
            tls.certificates(),
            Err(ConnectionError::InvalidTls(_))
        ));
    }

    #[test]
    fn config_loads_from_json_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{ "addr": "10.0.0.5:6379", "db": 2, "force_single": true, "tls": {} }"#,
        )
        .unwrap();
        assert_eq!(config.addr, "10.0.0.5:6379");
        assert_eq!(config.db, 2);
        assert!(config.force_single);
        assert_eq!(config.tls, Some(TlsConfig::default()));
        assert!(config.password.is_empty());
        assert!(config.connect_timeout.is_none());
    }
}
