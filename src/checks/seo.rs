use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{exists, tally};
use crate::record::SocialTags;

const SEO_STEP: f64 = 0.2;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static SUBHEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4, h5, h6").unwrap());
pub(crate) static IMG_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").unwrap());

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static TWITTER_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="twitter:card"]"#).unwrap());

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnicalSeo {
    pub has_sitemap: u8,
    pub has_robots_txt: u8,
    pub has_structured_data: u8,
}

/// Title, description, h1, any subheading, any alt text. No partial credit.
pub fn seo_score(doc: &Html) -> f64 {
    tally(
        &[
            exists(doc, &TITLE),
            exists(doc, &DESCRIPTION),
            exists(doc, &H1),
            exists(doc, &SUBHEADINGS),
            exists(doc, &IMG_ALT),
        ],
        SEO_STEP,
    )
}

pub fn social_tags(doc: &Html) -> SocialTags {
    SocialTags {
        og_title: exists(doc, &OG_TITLE),
        og_description: exists(doc, &OG_DESCRIPTION),
        og_image: exists(doc, &OG_IMAGE),
        twitter_card: exists(doc, &TWITTER_CARD),
    }
}

/// Sitemap and robots.txt are only mentions in the markup, not fetched files.
pub fn technical_seo(doc: &Html, raw: &str) -> TechnicalSeo {
    let lower = raw.to_lowercase();
    TechnicalSeo {
        has_sitemap: lower.contains("sitemap") as u8,
        has_robots_txt: lower.contains("robots.txt") as u8,
        has_structured_data: exists(doc, &LD_JSON) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures;

    #[test]
    fn landing_has_full_seo() {
        assert!((seo_score(&fixtures::landing()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seo_is_sum_of_fifths() {
        let d = Html::parse_document("<title>t</title><h3>sub</h3><img src=x>");
        assert!((seo_score(&d) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn landing_social_tags() {
        let tags = social_tags(&fixtures::landing());
        assert!(tags.og_title);
        assert!(!tags.og_description);
        assert!(!tags.og_image);
        assert!(!tags.twitter_card);
    }

    #[test]
    fn twitter_card_uses_name_not_property() {
        let d = Html::parse_document(r#"<meta property="twitter:card" content="summary">"#);
        assert!(!social_tags(&d).twitter_card);
        let d = Html::parse_document(r#"<meta name="twitter:card" content="summary">"#);
        assert!(social_tags(&d).twitter_card);
    }

    #[test]
    fn technical_seo_is_case_insensitive_text_search() {
        let raw = r#"<a href="/SiteMap.xml">map</a> see /Robots.TXT
            <script type="application/ld+json">{"@type":"Organization"}</script>"#;
        let t = technical_seo(&Html::parse_document(raw), raw);
        assert_eq!(
            t,
            TechnicalSeo {
                has_sitemap: 1,
                has_robots_txt: 1,
                has_structured_data: 1
            }
        );
    }

    #[test]
    fn malformed_markup_defaults() {
        for raw in fixtures::MALFORMED {
            let d = Html::parse_document(raw);
            let s = seo_score(&d);
            assert!((0.0..=1.0).contains(&s), "{:?}", raw);
            assert_eq!(social_tags(&d), SocialTags::default());
            assert_eq!(technical_seo(&d, raw).has_structured_data, 0);
        }
    }
}
