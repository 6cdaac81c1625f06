use crate::record::Signals;

/// Page size (in characters) at which the performance term bottoms out.
pub const PAGE_SIZE_CEILING: f64 = 5_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Responsiveness,
    Seo,
    Security,
    Accessibility,
    VisualFreshness,
    Performance,
    SocialTags,
    TechnicalSeo,
}

/// Fixed aggregation weights, applied in this order. They sum to 1.0.
pub const WEIGHTS: [(Category, f64); 8] = [
    (Category::Responsiveness, 0.20),
    (Category::Seo, 0.10),
    (Category::Security, 0.20),
    (Category::Accessibility, 0.10),
    (Category::VisualFreshness, 0.20),
    (Category::Performance, 0.10),
    (Category::SocialTags, 0.05),
    (Category::TechnicalSeo, 0.05),
];

/// Unweighted per-category terms, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakdown {
    pub responsiveness: f64,
    pub seo: f64,
    pub security: f64,
    pub accessibility: f64,
    pub visual_freshness: f64,
    pub performance: f64,
    pub social_tags: f64,
    pub technical_seo: f64,
}

impl Breakdown {
    pub fn from_signals(s: &Signals) -> Self {
        Breakdown {
            responsiveness: (s.responsive as f64 + s.mobile_friendly_score) / 2.0,
            seo: s.seo_score,
            security: (s.uses_https as f64 + s.security_score as f64) / 2.0,
            accessibility: s.accessibility_score,
            visual_freshness: 1.0 - s.visual_outdatedness,
            performance: performance(s.page_size),
            social_tags: s.social_media_tags.coverage(),
            technical_seo: (s.has_sitemap as f64
                + s.has_robots_txt as f64
                + s.has_structured_data as f64)
                / 3.0,
        }
    }

    pub fn term(&self, category: Category) -> f64 {
        match category {
            Category::Responsiveness => self.responsiveness,
            Category::Seo => self.seo,
            Category::Security => self.security,
            Category::Accessibility => self.accessibility,
            Category::VisualFreshness => self.visual_freshness,
            Category::Performance => self.performance,
            Category::SocialTags => self.social_tags,
            Category::TechnicalSeo => self.technical_seo,
        }
    }
}

pub fn performance(page_size: usize) -> f64 {
    1.0 - (page_size as f64 / PAGE_SIZE_CEILING).min(1.0)
}

pub fn overall(signals: &Signals) -> f64 {
    let breakdown = Breakdown::from_signals(signals);
    WEIGHTS
        .iter()
        .fold(0.0, |acc, (category, weight)| {
            acc + breakdown.term(*category) * weight
        })
}
