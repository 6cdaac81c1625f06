use chrono::{DateTime, Utc};
use scraper::Html;
use thiserror::Error;
use tracing::info;

use crate::checks::{access, content, domain, layout, security, seo};
use crate::config::Settings;
use crate::fetch::{Fetcher, Page};
use crate::record::{IncompleteRecord, RecordBuilder, Signals, SiteRecord};
use crate::tls::{RustlsProbe, TlsProbe};
use crate::whois::{WhoisClient, WhoisLookup};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Incomplete(#[from] IncompleteRecord),
}

pub struct Analyzer {
    fetcher: Fetcher,
    whois: Box<dyn WhoisLookup>,
    tls: Box<dyn TlsProbe>,
}

impl Analyzer {
    pub fn new(fetcher: Fetcher, whois: Box<dyn WhoisLookup>, tls: Box<dyn TlsProbe>) -> Self {
        Self {
            fetcher,
            whois,
            tls,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(settings.fetch_timeout(), &settings.user_agent)?;
        let whois = WhoisClient::new(settings.whois_server.clone(), settings.whois_timeout());
        let tls = RustlsProbe::new(settings.tls_timeout())?;
        Ok(Self::new(fetcher, Box::new(whois), Box::new(tls)))
    }

    /// Fetch, run every check, score. Only a failed fetch is fatal.
    pub async fn analyze(&self, url: &str) -> Result<SiteRecord, AnalyzeError> {
        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| AnalyzeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let signals = self.extract(&page, Utc::now()).await?;
        let record = SiteRecord::new(page, signals);
        info!(overall_score = record.overall_score, "Scored {}", url);
        Ok(record)
    }

    /// Checks run in a fixed order; visual outdatedness comes last because it
    /// reads the aesthetic and site-age results.
    pub async fn extract(
        &self,
        page: &Page,
        now: DateTime<Utc>,
    ) -> Result<Signals, IncompleteRecord> {
        let raw = page.html.as_str();
        let mut b = RecordBuilder::new();

        {
            let doc = Html::parse_document(raw);
            b.responsive = Some(layout::responsive(&doc));
            b.technologies = Some(content::technologies(raw));
            b.seo_score = Some(seo::seo_score(&doc));
        }
        b.uses_https = Some(domain::uses_https(&page.url));

        let expiry = domain::lookup(self.whois.as_ref(), &page.url).await;
        b.content_freshness =
            Some(domain::content_freshness(&expiry, now).settle("content_freshness"));
        b.security_score = Some(
            security::security(self.tls.as_ref(), &page.url)
                .await
                .settle("security_score"),
        );

        {
            let doc = Html::parse_document(raw);
            b.accessibility_score = Some(access::accessibility(&doc));

            let perf = content::performance(raw);
            b.page_size = Some(perf.page_size);
            b.http_requests = Some(perf.http_requests);

            let analysis = content::analyze(&doc, raw);
            b.content_to_html_ratio = Some(analysis.content_to_html_ratio);
            b.keyword_density = Some(analysis.keyword_density);

            b.social_media_tags = Some(seo::social_tags(&doc));

            let technical = seo::technical_seo(&doc, raw);
            b.has_sitemap = Some(technical.has_sitemap);
            b.has_robots_txt = Some(technical.has_robots_txt);
            b.has_structured_data = Some(technical.has_structured_data);

            b.mobile_friendly_score = Some(layout::mobile_friendly(&doc));
            b.aesthetic_score = Some(layout::aesthetic(&doc, raw));
        }

        let creation = domain::lookup(self.whois.as_ref(), &page.url).await;
        b.site_age = Some(domain::site_age(&creation, now).settle("site_age"));

        b.derive_visual_outdatedness()?;
        b.build()
    }
}
