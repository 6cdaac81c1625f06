use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use html_escape::encode_text;
use tracing::info;
use url::Url;

use crate::record::SiteRecord;
use crate::score::Breakdown;

const TEMPLATE: &str = include_str!("../templates/report.html");

const GREEN: &str = "#4CAF50";
const AMBER: &str = "#FFC107";
const RED: &str = "#F44336";
const GOOD_AT: f64 = 0.7;
const FAIR_AT: f64 = 0.4;

/// Arc length of the gauge's semicircle (radius 80).
const ARC_LEN: f64 = std::f64::consts::PI * 80.0;
const TOP_KEYWORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub html: PathBuf,
    pub json: PathBuf,
}

/// Host plus explicit port, as used in the output file names.
pub fn netloc(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL {:?}", url))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("URL has no host: {}", url))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

pub fn paths(dir: &Path, url: &str) -> Result<ReportPaths> {
    let name = netloc(url)?;
    Ok(ReportPaths {
        html: dir.join(format!("{}_report.html", name)),
        json: dir.join(format!("{}_record.json", name)),
    })
}

/// Write the JSON record and the HTML report under `dir`.
pub fn write(record: &SiteRecord, dir: &Path) -> Result<ReportPaths> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let out = paths(dir, &record.url)?;

    let json = serde_json::to_string_pretty(record)?;
    fs::write(&out.json, json).with_context(|| format!("Failed to write {:?}", out.json))?;
    fs::write(&out.html, render_html(record))
        .with_context(|| format!("Failed to write {:?}", out.html))?;

    info!("Wrote {:?} and {:?}", out.json, out.html);
    Ok(out)
}

pub fn gauge_color(value: f64) -> &'static str {
    if value >= GOOD_AT {
        GREEN
    } else if value >= FAIR_AT {
        AMBER
    } else {
        RED
    }
}

pub fn render_html(record: &SiteRecord) -> String {
    let b = Breakdown::from_signals(&record.signals);
    let gauges = [
        ("Responsiveness", b.responsiveness),
        ("SEO Score", b.seo),
        ("Security", b.security),
        ("Accessibility", b.accessibility),
        ("Visual Freshness", b.visual_freshness),
        ("Performance", b.performance),
    ]
    .iter()
    .map(|(title, value)| gauge(title, *value))
    .collect::<Vec<_>>()
    .join("\n");

    // The URL goes in last so placeholder text inside it stays literal.
    TEMPLATE
        .replace("{{overall}}", &percent(record.overall_score))
        .replace("{{gauges}}", &gauges)
        .replace("{{details}}", &details(record))
        .replace("{{url}}", &encode_text(&record.url))
}

fn gauge(title: &str, value: f64) -> String {
    let value = value.clamp(0.0, 1.0);
    let filled = ARC_LEN * value;
    format!(
        r#"    <div class="gauge">
      <h2>{title}</h2>
      <svg viewBox="0 0 200 120" width="230" height="138" role="img" aria-label="{title}: {pct}">
        <path d="M 20 100 A 80 80 0 0 1 180 100" fill="none" stroke="lightgray" stroke-width="18"/>
        <path d="M 20 100 A 80 80 0 0 1 180 100" fill="none" stroke="{color}" stroke-width="18" stroke-dasharray="{filled:.2} {total:.2}"/>
        <text x="100" y="95" text-anchor="middle" font-size="28" fill="darkblue">{pct}</text>
      </svg>
    </div>"#,
        title = title,
        pct = percent(value),
        color = gauge_color(value),
        filled = filled,
        total = ARC_LEN,
    )
}

fn details(record: &SiteRecord) -> String {
    let s = &record.signals;
    let status = record
        .status_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".into());
    let technologies = if s.technologies.is_empty() {
        "none detected".to_string()
    } else {
        s.technologies.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let t = &s.social_media_tags;
    let social = [
        ("og:title", t.og_title),
        ("og:description", t.og_description),
        ("og:image", t.og_image),
        ("twitter:card", t.twitter_card),
    ]
    .iter()
    .map(|(k, present)| format!("{} {}", k, yes_no(*present)))
    .collect::<Vec<_>>()
    .join(", ");

    let mut keywords: Vec<(&String, &f64)> = s.keyword_density.iter().collect();
    keywords.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let keywords = keywords
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(w, f)| format!("{} ({:.1}%)", w, f * 100.0))
        .collect::<Vec<_>>()
        .join(", ");

    let rows = [
        ("Status code", status),
        ("Page size", format!("{} characters", s.page_size)),
        ("Tag-based requests", s.http_requests.to_string()),
        ("Content/HTML ratio", format!("{:.3}", s.content_to_html_ratio)),
        ("Technologies", technologies),
        ("Social tags", social),
        ("Sitemap mentioned", yes_no(s.has_sitemap == 1).to_string()),
        ("robots.txt mentioned", yes_no(s.has_robots_txt == 1).to_string()),
        ("Structured data", yes_no(s.has_structured_data == 1).to_string()),
        ("Domain renewed >30 days", yes_no(s.content_freshness == 1).to_string()),
        ("Top keywords", keywords),
    ];

    rows.iter()
        .map(|(k, v)| format!("    <tr><th>{}</th><td>{}</td></tr>", k, encode_text(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Page;
    use crate::record::{Signals, SocialTags};
    use std::collections::{BTreeMap, BTreeSet};

    fn record(url: &str) -> SiteRecord {
        let signals = Signals {
            responsive: 1,
            technologies: BTreeSet::from(["jQuery".to_string()]),
            seo_score: 0.4,
            uses_https: 1,
            content_freshness: 1,
            security_score: 1,
            accessibility_score: 0.25,
            page_size: 120,
            http_requests: 3,
            content_to_html_ratio: 0.2,
            keyword_density: BTreeMap::from([("<script>".to_string(), 0.5)]),
            social_media_tags: SocialTags::default(),
            has_sitemap: 0,
            has_robots_txt: 0,
            has_structured_data: 0,
            mobile_friendly_score: 1.0,
            aesthetic_score: 0.6,
            site_age: 0.2,
            visual_outdatedness: 0.3,
        };
        SiteRecord::new(
            Page {
                url: url.to_string(),
                html: "<html></html>".into(),
                status: Some(200),
            },
            signals,
        )
    }

    #[test]
    fn gauge_thresholds() {
        assert_eq!(gauge_color(0.7), GREEN);
        assert_eq!(gauge_color(0.69), AMBER);
        assert_eq!(gauge_color(0.4), AMBER);
        assert_eq!(gauge_color(0.39), RED);
        assert_eq!(gauge_color(0.0), RED);
    }

    #[test]
    fn file_names_follow_netloc() {
        let p = paths(Path::new("reports"), "https://example.com:8443/about").unwrap();
        assert_eq!(p.html, Path::new("reports/example.com:8443_report.html"));
        assert_eq!(p.json, Path::new("reports/example.com:8443_record.json"));
        assert!(netloc("not a url").is_err());
    }

    #[test]
    fn html_has_six_gauges_and_escapes_text() {
        let html = render_html(&record("https://example.com/?q=<b>"));
        assert_eq!(html.matches(r#"<div class="gauge">"#).count(), 6);
        assert!(html.contains("Visual Freshness"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn placeholders_in_url_are_not_expanded() {
        let html = render_html(&record("https://x.test/?{{gauges}}"));
        assert_eq!(html.matches(r#"<div class="gauge">"#).count(), 6);
        assert!(html.contains("<title>Website report: https://x.test/?{{gauges}}</title>"));
    }

    #[test]
    fn write_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("reports");
        let rec = record("https://example.com/");
        let out = write(&rec, &out_dir).unwrap();

        assert!(out.html.exists());
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out.json).unwrap()).unwrap();
        assert_eq!(json["url"], "https://example.com/");
        assert_eq!(json["social_media_tags"]["og:image"], false);
        assert_eq!(json["technologies"][0], "jQuery");
        assert!(json["overall_score"].as_f64().unwrap() > 0.0);
    }
}
