use chrono::{DateTime, Utc};
use url::Url;

use super::Check;
use crate::whois::{registrable_domain, WhoisError, WhoisLookup, WhoisRecord};

/// A domain must stay registered longer than this to count as maintained.
const FRESHNESS_DAYS: i64 = 30;
const DAYS_PER_YEAR: f64 = 365.25;
/// Age at which `site_age` saturates.
const AGE_CAP_YEARS: f64 = 10.0;

/// Scheme check on the URL string only.
pub fn uses_https(url: &str) -> u8 {
    url.starts_with("https://") as u8
}

pub fn whois_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    registrable_domain(parsed.host_str()?)
}

pub async fn lookup(whois: &dyn WhoisLookup, url: &str) -> Result<WhoisRecord, WhoisError> {
    let domain = whois_domain(url).ok_or_else(|| WhoisError::InvalidDomain(url.to_string()))?;
    whois.lookup(&domain).await
}

pub fn content_freshness(
    lookup: &Result<WhoisRecord, WhoisError>,
    now: DateTime<Utc>,
) -> Check<u8> {
    let record = match lookup {
        Ok(r) => r,
        Err(e) => return Check::fallback(0, e),
    };
    match record.expiration_dates.first() {
        Some(expires) => Check::Measured(((*expires - now).num_days() > FRESHNESS_DAYS) as u8),
        None => Check::fallback(0, "no expiration date in whois record"),
    }
}

/// Registration age in tens of years, clamped to [0, 1].
pub fn site_age(lookup: &Result<WhoisRecord, WhoisError>, now: DateTime<Utc>) -> Check<f64> {
    let record = match lookup {
        Ok(r) => r,
        Err(e) => return Check::fallback(0.0, e),
    };
    match record.creation_dates.first() {
        Some(created) => {
            let years = (now - *created).num_days() as f64 / DAYS_PER_YEAR;
            Check::Measured((years / AGE_CAP_YEARS).clamp(0.0, 1.0))
        }
        None => Check::fallback(0.0, "no creation date in whois record"),
    }
}
