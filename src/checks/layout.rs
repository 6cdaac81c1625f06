use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::{exists, tally};

const MOBILE_STEP: f64 = 0.5;
const AESTHETIC_STEP: f64 = 0.2;
/// More distinct hex colors than this earns the palette point.
const PALETTE_MIN: usize = 3;

static VIEWPORT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="viewport"]"#).unwrap());
static LINK_HREF: LazyLock<Selector> = LazyLock::new(|| Selector::parse("link[href]").unwrap());
static STYLING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"style, link[rel~="stylesheet"]"#).unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SEMANTIC: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("header, nav, main, footer, article, section").unwrap());

static WEB_FONT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fonts\.googleapis\.com|fonts\.gstatic\.com").unwrap());
static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[0-9a-fA-F]{6}").unwrap());

/// 1 when the page declares a viewport.
pub fn responsive(doc: &Html) -> u8 {
    exists(doc, &VIEWPORT) as u8
}

pub fn mobile_friendly(doc: &Html) -> f64 {
    let content = doc
        .select(&VIEWPORT)
        .next()
        .and_then(|m| m.value().attr("content"))
        .unwrap_or("");
    tally(
        &[
            content.contains("width=device-width"),
            content.contains("initial-scale=1"),
        ],
        MOBILE_STEP,
    )
}

/// Crude modern-design signals: web fonts, styling, imagery, a palette, and
/// HTML5 sectioning.
pub fn aesthetic(doc: &Html, raw: &str) -> f64 {
    let web_fonts = doc
        .select(&LINK_HREF)
        .filter_map(|l| l.value().attr("href"))
        .any(|href| WEB_FONT_RE.is_match(href));

    let colors: HashSet<&str> = HEX_COLOR_RE.find_iter(raw).map(|m| m.as_str()).collect();

    tally(
        &[
            web_fonts,
            exists(doc, &STYLING),
            exists(doc, &IMG),
            colors.len() > PALETTE_MIN,
            exists(doc, &SEMANTIC),
        ],
        AESTHETIC_STEP,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn landing_is_responsive_and_mobile_friendly() {
        let d = fixtures::landing();
        assert_eq!(responsive(&d), 1);
        assert_eq!(mobile_friendly(&d), 1.0);
    }

    #[test]
    fn partial_viewport_gets_half_credit() {
        let d = doc(r#"<meta name="viewport" content="width=device-width">"#);
        assert_eq!(responsive(&d), 1);
        assert_eq!(mobile_friendly(&d), 0.5);

        let d = doc(r#"<meta name="viewport">"#);
        assert_eq!(mobile_friendly(&d), 0.0);
    }

    #[test]
    fn landing_aesthetic_counts_style_and_image() {
        let d = fixtures::landing();
        let score = aesthetic(&d, &fixtures::landing_raw());
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn full_aesthetic_page() {
        let raw = r##"<html><head>
            <link rel="stylesheet" href="https://fonts.googleapis.com/css?family=Inter">
            </head><body style="color:#111111">
            <header>#222222 #333333 #444444</header><img src="a.png">
            </body></html>"##;
        let score = aesthetic(&doc(raw), raw);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_colors_count_once() {
        let raw = "<p>#aaaaaa #aaaaaa #aaaaaa #aaaaaa #bbbbbb</p>";
        assert_eq!(aesthetic(&doc(raw), raw), 0.0);
    }

    #[test]
    fn malformed_markup_scores_zero() {
        for raw in fixtures::MALFORMED {
            let d = doc(raw);
            assert_eq!(mobile_friendly(&d), 0.0, "{:?}", raw);
            let a = aesthetic(&d, raw);
            assert!((0.0..=1.0).contains(&a));
        }
    }
}
