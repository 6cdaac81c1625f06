use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

const WHOIS_PORT: u16 = 43;
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "registered on",
    "registration time",
    "domain registration date",
];
const EXPIRATION_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires",
    "paid-till",
];

/// Second-level labels that act as public suffixes under country TLDs.
const COUNTRY_SECOND_LEVEL: &[&str] = &["co", "com", "net", "org", "gov", "edu", "ac"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y"];

#[derive(Debug, Error)]
pub enum WhoisError {
    #[error("not a registrable domain: {0:?}")]
    InvalidDomain(String),
    #[error("whois query to {server} timed out")]
    Timeout { server: String },
    #[error("whois query to {server} failed: {source}")]
    Io {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("empty whois response from {0}")]
    EmptyResponse(String),
}

/// Dates in the order the servers reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhoisRecord {
    pub creation_dates: Vec<DateTime<Utc>>,
    pub expiration_dates: Vec<DateTime<Utc>>,
}

#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisError>;
}

/// Port-43 client: asks the root server, then follows the registry and
/// registrar referrals.
pub struct WhoisClient {
    root: String,
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(root: impl Into<String>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    async fn query(&self, server: &str, query: &str) -> Result<String, WhoisError> {
        debug!(server, query, "whois query");
        let exchange = async {
            let mut stream = TcpStream::connect((server, WHOIS_PORT)).await?;
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;
            let mut buf = Vec::new();
            stream.take(MAX_RESPONSE_BYTES).read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        let text = timeout(self.timeout, exchange)
            .await
            .map_err(|_| WhoisError::Timeout {
                server: server.to_string(),
            })?
            .map_err(|source| WhoisError::Io {
                server: server.to_string(),
                source,
            })?;

        if text.trim().is_empty() {
            return Err(WhoisError::EmptyResponse(server.to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl WhoisLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisError> {
        if !domain.contains('.') {
            return Err(WhoisError::InvalidDomain(domain.to_string()));
        }

        let root = self.query(&self.root, domain).await?;
        let Some(registry) = referral(&root) else {
            return Ok(parse_record(&root));
        };

        let mut text = self.query(&registry, domain).await?;
        if let Some(registrar) =
            registrar_server(&text).filter(|r| !r.eq_ignore_ascii_case(&registry))
        {
            // Thin registries only point at the registrar; its answer is a bonus.
            match self.query(&registrar, domain).await {
                Ok(extra) => {
                    text.push('\n');
                    text.push_str(&extra);
                }
                Err(e) => debug!("registrar lookup skipped: {}", e),
            }
        }

        Ok(parse_record(&text))
    }
}

/// Reduce a host to the name a registry knows about.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_lowercase();
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return None;
    }
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }

    let n = labels.len();
    let keep = if n >= 3 && labels[n - 1].len() == 2 && COUNTRY_SECOND_LEVEL.contains(&labels[n - 2])
    {
        3
    } else {
        2
    };
    Some(labels[n - keep..].join("."))
}

pub fn parse_record(text: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();
    for (key, value) in fields(text) {
        let Some(date) = parse_date(value) else {
            continue;
        };
        if CREATION_KEYS.contains(&key.as_str()) {
            record.creation_dates.push(date);
        } else if EXPIRATION_KEYS.contains(&key.as_str()) {
            record.expiration_dates.push(date);
        }
    }
    record
}

/// Server named by an IANA `refer:` (or `whois:`) line.
fn referral(text: &str) -> Option<String> {
    fields(text)
        .find(|(k, v)| (k == "refer" || k == "whois") && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

fn registrar_server(text: &str) -> Option<String> {
    fields(text)
        .find(|(k, v)| k == "registrar whois server" && !v.is_empty())
        .map(|(_, v)| {
            v.trim_start_matches("http://")
                .trim_start_matches("https://")
                .trim_end_matches('/')
                .to_string()
        })
}

/// `key: value` lines with lowercased keys; comment lines are skipped.
fn fields(text: &str) -> impl Iterator<Item = (String, &str)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.starts_with('%') && !l.starts_with('#') && !l.starts_with(">>>"))
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim()))
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc());
        }
    }
    let token = value.split_whitespace().next()?;
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(token, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}
