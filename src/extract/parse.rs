//! HTML parsing helpers shared by the extraction profiles
//!
//! Everything here is synchronous and returns owned data; `scraper::Html` is
//! not `Send` and must never live across an `.await`.

use crate::model::Fitment;
use crate::url::{canonical_product_url, resolve_link};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// How trims and engines of one structured fitment entry become `Fitment`s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitmentLayout {
    /// One fitment per entry; trims and engines are joined with `", "`
    Joined,

    /// One fitment per trim × engine combination
    Combinations,
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduces price text to digits and `.`; `"$787.31"` becomes `"787.31"`
pub fn clean_price(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Skipping invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matched by the first selector that yields non-empty text
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for css in selectors {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element_text(element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Attribute value of the first matching element that carries a non-empty `attr`
pub fn first_attr(document: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for css in selectors {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Absolute, canonical product URLs whose path contains one of `path_patterns`
///
/// Order of first appearance is kept; duplicates within the page are dropped.
pub fn product_links(document: &Html, base_url: &Url, path_patterns: &[&str]) -> Vec<String> {
    let Some(selector) = parse_selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = canonical_product_url(href, base_url) else {
            continue;
        };
        let path = Url::parse(&url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        if !path_patterns.iter().any(|p| path.contains(p)) {
            continue;
        }
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }
    links
}

/// A navigation link and the label shown for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledLink {
    pub label: String,
    pub url: Url,
}

/// Links matched by any of `selectors`, resolved against `base_url`
///
/// The label is the `data-make`/`data-model` attribute when present, the
/// anchor text otherwise.
pub fn labeled_links(document: &Html, base_url: &Url, selectors: &[&str]) -> Vec<LabeledLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for css in selectors {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            else {
                continue;
            };
            let label = element
                .value()
                .attr("data-make")
                .or_else(|| element.value().attr("data-model"))
                .map(collapse_whitespace)
                .unwrap_or_else(|| element_text(element));
            if seen.insert(url.to_string()) {
                links.push(LabeledLink { label, url });
            }
        }
    }
    links
}

fn json_scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn json_list(entry: &Value, plural: &str, singular: &str) -> Vec<String> {
    match entry.get(plural) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| json_scalar(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => {
            let s = json_scalar(Some(other));
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
        None => {
            let s = json_scalar(entry.get(singular));
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

/// Turns the `fitment` array of a product JSON blob into fitments
pub fn fitments_from_json(data: &Value, layout: FitmentLayout) -> Vec<Fitment> {
    let Some(entries) = data.get("fitment").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut fitments = Vec::new();
    for entry in entries {
        let year = json_scalar(entry.get("year"));
        let make = json_scalar(entry.get("make"));
        let model = json_scalar(entry.get("model"));
        let trims = json_list(entry, "trims", "trim");
        let engines = json_list(entry, "engines", "engine");

        match layout {
            FitmentLayout::Joined => fitments.push(Fitment::new(
                year,
                make,
                model,
                trims.join(", "),
                engines.join(", "),
            )),
            FitmentLayout::Combinations => {
                let trims = if trims.is_empty() {
                    vec![String::new()]
                } else {
                    trims
                };
                let engines = if engines.is_empty() {
                    vec![String::new()]
                } else {
                    engines
                };
                for trim in &trims {
                    for engine in &engines {
                        fitments.push(Fitment::new(
                            year.clone(),
                            make.clone(),
                            model.clone(),
                            trim.clone(),
                            engine.clone(),
                        ));
                    }
                }
            }
        }
    }
    fitments
}

/// Fitments from the first embedded JSON script that holds a `fitment` array
///
/// Scripts that are not valid JSON are skipped with a debug log.
pub fn structured_fitments(
    document: &Html,
    script_selectors: &[&str],
    layout: FitmentLayout,
) -> Vec<Fitment> {
    for css in script_selectors {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let raw = element.text().collect::<String>();
            if !raw.contains("fitment") {
                continue;
            }
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(data) => {
                    let fitments = fitments_from_json(&data, layout);
                    if !fitments.is_empty() {
                        return fitments;
                    }
                }
                Err(e) => tracing::debug!("Unparseable fitment JSON: {}", e),
            }
        }
    }
    Vec::new()
}

/// Fitments from a table whose class mentions `fitment`
///
/// Columns are year, make, model, trim, engine; rows with fewer than three
/// cells (headers included) are skipped.
pub fn table_fitments(document: &Html) -> Vec<Fitment> {
    let (Some(row_selector), Some(cell_selector)) = (
        parse_selector("table[class*=\"fitment\"] tr"),
        parse_selector("td"),
    ) else {
        return Vec::new();
    };

    let mut fitments = Vec::new();
    for row in document.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(element_text).collect();
        if cells.len() < 3 {
            continue;
        }
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        fitments.push(Fitment::new(cell(0), cell(1), cell(2), cell(3), cell(4)));
    }
    fitments
}
