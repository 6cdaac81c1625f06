use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::fetch::Page;
use crate::score;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("record is missing `{0}`")]
pub struct IncompleteRecord(pub &'static str);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SocialTags {
    #[serde(rename = "og:title")]
    pub og_title: bool,
    #[serde(rename = "og:description")]
    pub og_description: bool,
    #[serde(rename = "og:image")]
    pub og_image: bool,
    #[serde(rename = "twitter:card")]
    pub twitter_card: bool,
}

impl SocialTags {
    /// Share of the four tags that are present.
    pub fn coverage(&self) -> f64 {
        let present = [self.og_title, self.og_description, self.og_image, self.twitter_card]
            .iter()
            .filter(|&&b| b)
            .count();
        present as f64 / 4.0
    }
}

/// Every extractor output, fully populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signals {
    pub responsive: u8,
    pub technologies: BTreeSet<String>,
    pub seo_score: f64,
    pub uses_https: u8,
    pub content_freshness: u8,
    pub security_score: u8,
    pub accessibility_score: f64,
    pub page_size: usize,
    pub http_requests: usize,
    pub content_to_html_ratio: f64,
    pub keyword_density: BTreeMap<String, f64>,
    pub social_media_tags: SocialTags,
    pub has_sitemap: u8,
    pub has_robots_txt: u8,
    pub has_structured_data: u8,
    pub mobile_friendly_score: f64,
    pub aesthetic_score: f64,
    pub site_age: f64,
    pub visual_outdatedness: f64,
}

/// The finished, scored record handed to report emission.
#[derive(Debug, Clone, Serialize)]
pub struct SiteRecord {
    pub url: String,
    pub html_content: String,
    pub status_code: Option<u16>,
    #[serde(flatten)]
    pub signals: Signals,
    pub overall_score: f64,
}

impl SiteRecord {
    pub fn new(page: Page, signals: Signals) -> Self {
        let overall_score = score::overall(&signals);
        SiteRecord {
            url: page.url,
            html_content: page.html,
            status_code: page.status,
            signals,
            overall_score,
        }
    }
}

/// Accumulates extractor outputs in pipeline order.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    pub responsive: Option<u8>,
    pub technologies: Option<BTreeSet<String>>,
    pub seo_score: Option<f64>,
    pub uses_https: Option<u8>,
    pub content_freshness: Option<u8>,
    pub security_score: Option<u8>,
    pub accessibility_score: Option<f64>,
    pub page_size: Option<usize>,
    pub http_requests: Option<usize>,
    pub content_to_html_ratio: Option<f64>,
    pub keyword_density: Option<BTreeMap<String, f64>>,
    pub social_media_tags: Option<SocialTags>,
    pub has_sitemap: Option<u8>,
    pub has_robots_txt: Option<u8>,
    pub has_structured_data: Option<u8>,
    pub mobile_friendly_score: Option<f64>,
    pub aesthetic_score: Option<f64>,
    pub site_age: Option<f64>,
    pub visual_outdatedness: Option<f64>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine site age and aesthetics; both must already be recorded.
    pub fn derive_visual_outdatedness(&mut self) -> Result<f64, IncompleteRecord> {
        let age = self.site_age.ok_or(IncompleteRecord("site_age"))?;
        let aesthetic = self
            .aesthetic_score
            .ok_or(IncompleteRecord("aesthetic_score"))?;
        let value = visual_outdatedness(age, aesthetic);
        self.visual_outdatedness = Some(value);
        Ok(value)
    }

    pub fn build(self) -> Result<Signals, IncompleteRecord> {
        Ok(Signals {
            responsive: require(self.responsive, "responsive")?,
            technologies: require(self.technologies, "technologies")?,
            seo_score: require(self.seo_score, "seo_score")?,
            uses_https: require(self.uses_https, "uses_https")?,
            content_freshness: require(self.content_freshness, "content_freshness")?,
            security_score: require(self.security_score, "security_score")?,
            accessibility_score: require(self.accessibility_score, "accessibility_score")?,
            page_size: require(self.page_size, "page_size")?,
            http_requests: require(self.http_requests, "http_requests")?,
            content_to_html_ratio: require(self.content_to_html_ratio, "content_to_html_ratio")?,
            keyword_density: require(self.keyword_density, "keyword_density")?,
            social_media_tags: require(self.social_media_tags, "social_media_tags")?,
            has_sitemap: require(self.has_sitemap, "has_sitemap")?,
            has_robots_txt: require(self.has_robots_txt, "has_robots_txt")?,
            has_structured_data: require(self.has_structured_data, "has_structured_data")?,
            mobile_friendly_score: require(self.mobile_friendly_score, "mobile_friendly_score")?,
            aesthetic_score: require(self.aesthetic_score, "aesthetic_score")?,
            site_age: require(self.site_age, "site_age")?,
            visual_outdatedness: require(self.visual_outdatedness, "visual_outdatedness")?,
        })
    }
}

pub fn visual_outdatedness(site_age: f64, aesthetic_score: f64) -> f64 {
    (site_age + (1.0 - aesthetic_score)) / 2.0
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, IncompleteRecord> {
    value.ok_or(IncompleteRecord(field))
}
