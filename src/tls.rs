use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

const HTTPS_PORT: u16 = 443;

#[async_trait]
pub trait TlsProbe: Send + Sync {
    /// Whether a verified handshake with `host:443` yields a peer certificate.
    async fn peer_certificate(&self, host: &str) -> Result<bool>;
}

pub struct RustlsProbe {
    connector: TlsConnector,
    timeout: Duration,
}

impl RustlsProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut roots = RootCertStore::empty();
        let native = rustls_native_certs::load_native_certs();
        for e in &native.errors {
            warn!("Skipping unreadable native certificate: {}", e);
        }
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        debug!(added, ignored, "Loaded native root certificates");

        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .context("No usable TLS protocol versions")?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }
}

#[async_trait]
impl TlsProbe for RustlsProbe {
    async fn peer_certificate(&self, host: &str) -> Result<bool> {
        let server_name = ServerName::try_from(host.to_string())
            .with_context(|| format!("Invalid TLS server name {:?}", host))?;

        let handshake = async {
            let tcp = TcpStream::connect((host, HTTPS_PORT)).await?;
            self.connector.connect(server_name, tcp).await
        };
        let stream = timeout(self.timeout, handshake)
            .await
            .map_err(|_| anyhow!("TLS handshake with {} timed out", host))?
            .with_context(|| format!("TLS handshake with {} failed", host))?;

        let (_, session) = stream.get_ref();
        Ok(session
            .peer_certificates()
            .is_some_and(|certs| !certs.is_empty()))
    }
}
