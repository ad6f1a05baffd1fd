// ── Runtime session configuration ──
//
// These types describe *how* to reach and authenticate with a VSD.
// They carry credential data and connection tuning, but never touch disk
// (except to read a certificate the caller pointed at).

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::transport::{ClientCertificate, TlsMode, TransportConfig};

/// Page size sent with every request unless a `FetchingInfo` overrides it.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// How to authenticate with the VSD. Exactly one mode per session.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// `XREST` header built from the username and the password, or from
    /// the root's API key once authenticated.
    Password {
        username: String,
        password: SecretString,
        organization: String,
    },
    /// Mutual TLS with a client certificate; no `Authorization` header.
    Certificate(ClientCertificate),
}

impl Credentials {
    pub fn password(
        username: impl Into<String>,
        password: impl Into<String>,
        organization: impl Into<String>,
    ) -> Self {
        Self::Password {
            username: username.into(),
            password: SecretString::from(password.into()),
            organization: organization.into(),
        }
    }

    pub fn is_certificate(&self) -> bool {
        matches!(self, Self::Certificate(_))
    }
}

/// Configuration for one session against one VSD.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API base, e.g. `https://vsd:8443/nuage/api/v6`.
    pub url: Url,
    pub credentials: Credentials,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub page_size: u32,
}

impl SessionConfig {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self {
            url,
            credentials,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Transport settings implied by this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            client_certificate: match &self.credentials {
                Credentials::Certificate(cert) => Some(cert.clone()),
                Credentials::Password { .. } => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn certificate_credentials_flow_into_transport() {
        let url: Url = "https://vsd.example.com:8443/nuage/api/v6".parse().unwrap();
        let config = SessionConfig::new(
            url,
            Credentials::Certificate(ClientCertificate::from_pem(b"pem".to_vec())),
        );

        assert!(config.credentials.is_certificate());
        assert!(config.transport().client_certificate.is_some());
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn password_credentials_have_no_client_certificate() {
        let url: Url = "https://vsd.example.com:8443/nuage/api/v6".parse().unwrap();
        let config = SessionConfig::new(url, Credentials::password("csproot", "csproot", "csp"));

        assert!(!config.credentials.is_certificate());
        assert!(config.transport().client_certificate.is_none());
        assert_eq!(config.transport().tls, TlsMode::System);
    }
}
