pub mod access;
pub mod content;
pub mod domain;
pub mod layout;
pub mod security;
pub mod seo;

use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Outcome of a check that can fail locally. A fallback carries the
/// documented default plus the reason it was used; it never aborts the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Check<T> {
    Measured(T),
    Fallback { value: T, reason: String },
}

impl<T: std::fmt::Debug> Check<T> {
    pub fn fallback(value: T, reason: impl ToString) -> Self {
        Check::Fallback {
            value,
            reason: reason.to_string(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Check::Measured(v) | Check::Fallback { value: v, .. } => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Check::Fallback { .. })
    }

    /// Log the outcome under `name` and yield the value either way.
    pub fn settle(self, name: &str) -> T {
        match self {
            Check::Measured(v) => {
                debug!(check = name, value = ?v, "measured");
                v
            }
            Check::Fallback { value, reason } => {
                warn!(check = name, value = ?value, "falling back to default: {}", reason);
                value
            }
        }
    }
}

pub(crate) fn exists(doc: &Html, selector: &Selector) -> bool {
    doc.select(selector).next().is_some()
}

/// Sum `step` once per passing signal.
pub(crate) fn tally(hits: &[bool], step: f64) -> f64 {
    hits.iter().filter(|&&hit| hit).fold(0.0, |acc, _| acc + step)
}
