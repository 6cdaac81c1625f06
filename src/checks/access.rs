use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::seo::IMG_ALT;
use super::{exists, tally};

const ACCESS_STEP: f64 = 0.25;

static LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("label").unwrap());
static ANY_ROLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[role]").unwrap());
static MAIN_ROLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[role="main"]"#).unwrap());

pub fn accessibility(doc: &Html) -> f64 {
    tally(
        &[
            exists(doc, &IMG_ALT),
            exists(doc, &LABEL),
            exists(doc, &ANY_ROLE),
            exists(doc, &MAIN_ROLE),
        ],
        ACCESS_STEP,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures;

    #[test]
    fn landing_only_has_alt_text() {
        assert_eq!(accessibility(&fixtures::landing()), 0.25);
    }

    #[test]
    fn main_landmark_earns_both_role_signals() {
        let d = Html::parse_document(
            r#"<div role="main"><label for="q">Search</label><img src=a alt=""></div>"#,
        );
        assert_eq!(accessibility(&d), 1.0);
    }

    #[test]
    fn non_main_role_earns_one_signal() {
        let d = Html::parse_document(r#"<nav role="navigation"></nav>"#);
        assert_eq!(accessibility(&d), 0.25);
    }

    #[test]
    fn empty_page_scores_zero() {
        assert_eq!(accessibility(&Html::parse_document("")), 0.0);
    }
}
