//! Wheel classifier
//!
//! Decides from a product's title and description whether it is a wheel (or a
//! wheel cap/cover) rather than one of the many parts whose names merely
//! contain "wheel". Pure and offline.
//!
//! Matching runs on `title + " " + description`, lowercased, with `-` and `_`
//! turned into spaces. Deny terms are tried first and always win. Allow terms
//! made of a single word must match on word boundaries (so "rim" does not
//! match "trim"); multi-word allow terms match as substrings.

use regex::Regex;
use std::sync::LazyLock;

/// Single-word allow terms, matched on word boundaries
const ALLOW_WORDS: &[&str] = &["wheel", "wheels", "rim", "rims", "alloy", "hubcap"];

/// Multi-word allow terms, matched as substrings
const ALLOW_PHRASES: &[&str] = &[
    "disc wheel",
    "wheel cap",
    "center cap",
    "hub cap",
    "wheel cover",
    "wheel disc",
    "wheel disk",
    "rim cap",
    "spare wheel",
    "wheel assembly",
    "wheel rim",
];

/// Confusable parts, matched as substrings
const DENY_PHRASES: &[&str] = &[
    "steering wheel",
    "wheel bearing",
    "wheel hub",
    "hub bearing",
    "bearing hub",
    "bearing assembly",
    "wheel hub motor",
    "wheel cylinder",
    "wheel well",
    "wheel flange",
    "wheel spacer",
    "wheel nut",
    "wheel stud",
    "wheel bolt",
    "wheel valve",
    "wheel weight",
    "wheel arch",
    "wheel sensor",
    "wheel speed sensor",
    "wheel seal",
    "lug nut",
    "lug bolt",
    "tire pressure",
    "tpms",
    "wheel lock nut",
    "wheel lock key",
    "wheel alignment",
    "wheel opening",
    "wheel house",
    "wheel liner",
    "wheel adapter",
    "wheel mounting kit",
];

static ALLOW_WORD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ALLOW_WORDS
        .iter()
        .map(|word| {
            let pattern = format!(r"\b{}\b", regex::escape(word));
            (*word, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Outcome of classifying a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accept,
    Reject,
}

impl Classification {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// The term that decided a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Allow(&'static str),
    Deny(&'static str),
}

/// Classifies a product as a wheel or not
///
/// # Example
///
/// ```
/// use wheel_harvest::{classify, Classification};
///
/// assert_eq!(classify("Wheel Bearing Kit", ""), Classification::Reject);
/// assert_eq!(classify("18 Inch Alloy Wheel", ""), Classification::Accept);
/// ```
pub fn classify(title: &str, description: &str) -> Classification {
    match matched_rule(title, description) {
        Some(Rule::Allow(_)) => Classification::Accept,
        Some(Rule::Deny(_)) | None => Classification::Reject,
    }
}

/// Returns the term that decides the classification, if any matched
///
/// `Some(Rule::Deny(..))` and `None` both mean reject.
pub fn matched_rule(title: &str, description: &str) -> Option<Rule> {
    let text = prepare_text(title, description);

    if let Some(term) = DENY_PHRASES.iter().find(|term| text.contains(*term)) {
        return Some(Rule::Deny(*term));
    }

    if let Some((word, _)) = ALLOW_WORD_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&text))
    {
        return Some(Rule::Allow(*word));
    }

    ALLOW_PHRASES
        .iter()
        .find(|term| text.contains(*term))
        .map(|term| Rule::Allow(*term))
}

fn prepare_text(title: &str, description: &str) -> String {
    format!("{} {}", title, description)
        .to_lowercase()
        .replace(['-', '_'], " ")
}
