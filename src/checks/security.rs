use url::Url;

use super::Check;
use crate::tls::TlsProbe;

/// 1 when a TLS handshake with the site's host presents a certificate.
pub async fn security(probe: &dyn TlsProbe, url: &str) -> Check<u8> {
    let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) else {
        return Check::fallback(0, format!("no host in {:?}", url));
    };
    match probe.peer_certificate(&host).await {
        Ok(has_cert) => Check::Measured(has_cert as u8),
        Err(e) => Check::fallback(0, format!("{:#}", e)),
    }
}
