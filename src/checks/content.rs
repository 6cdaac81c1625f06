use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

/// Literal markers searched for in the raw markup.
const TECH_MARKERS: [&str; 2] = ["WordPress", "jQuery"];
const MIN_KEYWORD_LEN: usize = 4;
/// Elements whose text never renders.
const HIDDEN_TEXT_TAGS: [&str; 4] = ["style", "script", "template", "noscript"];

static TAG_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(script|link|img)").unwrap());
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub page_size: usize,
    pub http_requests: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentAnalysis {
    pub content_to_html_ratio: f64,
    pub keyword_density: BTreeMap<String, f64>,
}

pub fn technologies(raw: &str) -> BTreeSet<String> {
    TECH_MARKERS
        .iter()
        .filter(|m| raw.contains(*m))
        .map(|m| m.to_string())
        .collect()
}

/// Size in characters and a tag-opening count standing in for requests.
pub fn performance(raw: &str) -> Performance {
    Performance {
        page_size: raw.chars().count(),
        http_requests: TAG_OPEN_RE.find_iter(raw).count(),
    }
}

pub fn analyze(doc: &Html, raw: &str) -> ContentAnalysis {
    let text = visible_text(doc);
    let html_len = raw.chars().count();
    let content_to_html_ratio = if html_len == 0 {
        0.0
    } else {
        text.chars().count() as f64 / html_len as f64
    };

    ContentAnalysis {
        content_to_html_ratio,
        keyword_density: keyword_density(&text),
    }
}

/// Text nodes outside style, script, template and noscript elements.
pub fn visible_text(doc: &Html) -> String {
    doc.root_element()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) if !node.ancestors().any(|a| is_hidden(a.value())) => {
                Some(&**text)
            }
            _ => None,
        })
        .collect()
}

fn is_hidden(node: &Node) -> bool {
    node.as_element().is_some_and(|e| HIDDEN_TEXT_TAGS.contains(&e.name()))
}

/// Frequency of each word longer than three characters. Shorter words are
/// dropped from the map but still count toward the total.
pub fn keyword_density(text: &str) -> BTreeMap<String, f64> {
    let lower = text.to_lowercase();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for m in WORD_RE.find_iter(&lower) {
        *counts.entry(m.as_str()).or_default() += 1;
        total += 1;
    }

    counts
        .into_iter()
        .filter(|(word, _)| word.chars().count() >= MIN_KEYWORD_LEN)
        .map(|(word, n)| (word.to_string(), n as f64 / total as f64))
        .collect()
}
