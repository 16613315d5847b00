//! Structured filter extraction from free-text questions.
//!
//! Each sub-extraction is independent of the eventual intent so every handler
//! sees the same filters. All of them are order-sensitive:
//! - `days`: first "<n> day(s)" in the text
//! - `min_value` / `max_value`: first comparative phrase followed by an amount
//! - `stage`: first keyword in *vocabulary* order, recruiting vocabulary last
//! - `name`: *last* "with/about/for/on Capitalized" phrase in the text

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical pipeline stage, covering both the sales and the recruiting board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Lead,
    InContact,
    Proposal,
    Negotiating,
    ClosedWon,
    ClosedLost,
    Sourced,
    Applied,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    /// Sales stages in board order.
    pub const SALES: [Stage; 6] = [
        Stage::Lead,
        Stage::InContact,
        Stage::Proposal,
        Stage::Negotiating,
        Stage::ClosedWon,
        Stage::ClosedLost,
    ];

    /// Recruiting stages in board order.
    pub const RECRUITING: [Stage; 7] = [
        Stage::Sourced,
        Stage::Applied,
        Stage::Screening,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    /// The value stored in the `stage` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::InContact => "in-contact",
            Self::Proposal => "proposal",
            Self::Negotiating => "negotiating",
            Self::ClosedWon => "closed-won",
            Self::ClosedLost => "closed-lost",
            Self::Sourced => "sourced",
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Interview => "interview",
            Self::Offer => "offer",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a stored stage value. Unknown values return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::SALES
            .iter()
            .chain(Self::RECRUITING.iter())
            .copied()
            .find(|s| s.as_str() == value)
    }

    pub fn is_sales(&self) -> bool {
        Self::SALES.contains(self)
    }

    pub fn is_recruiting(&self) -> bool {
        Self::RECRUITING.contains(self)
    }

    /// Closed sales stages: the deal is no longer being worked.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales keywords, scanned in this order. The first keyword present wins,
/// regardless of where it sits in the question.
const SALES_STAGE_KEYWORDS: &[(&str, Stage)] = &[
    ("closed-won", Stage::ClosedWon),
    ("closed-lost", Stage::ClosedLost),
    ("lead", Stage::Lead),
    ("in-contact", Stage::InContact),
    ("contact", Stage::InContact),
    ("proposal", Stage::Proposal),
    ("negotiation", Stage::Negotiating),
    ("negotiating", Stage::Negotiating),
    ("won", Stage::ClosedWon),
    ("lost", Stage::ClosedLost),
];

/// Recruiting keywords. Scanned after the sales list and overwrite its match.
const RECRUITING_STAGE_KEYWORDS: &[(&str, Stage)] = &[
    ("sourced", Stage::Sourced),
    ("applied", Stage::Applied),
    ("screening", Stage::Screening),
    ("screen", Stage::Screening),
    ("interview", Stage::Interview),
    ("offer", Stage::Offer),
    ("hired", Stage::Hired),
    ("rejected", Stage::Rejected),
];

/// Filters pulled out of a single question. Unset means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d+)\s*days?\b").unwrap())
}

fn min_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:over|above|more than)\s*\$?\s*(\d[\d,]*(?:\.\d+)?)\s*([km])?\b")
            .unwrap()
    })
}

fn max_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:under|below|less than)\s*\$?\s*(\d[\d,]*(?:\.\d+)?)\s*([km])?\b")
            .unwrap()
    })
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:with|about|for|on)\s+([A-Z][A-Za-z0-9'&.-]*(?:\s+[A-Z][A-Za-z0-9'&.-]*)?)")
            .unwrap()
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).unwrap())
}

/// Extract every filter the question carries. Never fails.
pub fn extract_filters(query: &str) -> QueryFilters {
    let lower = query.to_lowercase();
    let mut filters = QueryFilters {
        days: extract_days(query),
        min_value: extract_amount(min_value_re(), query),
        max_value: extract_amount(max_value_re(), query),
        stage: None,
        name: extract_name(query),
        search_query: extract_quoted(query),
    };

    if let Some(stage) = first_keyword(&lower, SALES_STAGE_KEYWORDS) {
        filters.stage = Some(stage);
    }
    // Recruiting words win when both vocabularies match.
    if let Some(stage) = first_keyword(&lower, RECRUITING_STAGE_KEYWORDS) {
        filters.stage = Some(stage);
    }

    filters
}

fn extract_days(query: &str) -> Option<u32> {
    days_re()
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
}

/// First comparative amount in the text, skipping "more than 30 days" style
/// durations so a lookback window is never read as money.
fn extract_amount(re: &Regex, query: &str) -> Option<f64> {
    for caps in re.captures_iter(query) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let rest = query[whole.end()..].trim_start().to_lowercase();
        if caps.get(2).is_none() && rest.starts_with("day") {
            continue;
        }
        let digits: String = caps
            .get(1)
            .map(|m| m.as_str().chars().filter(|c| *c != ',').collect())
            .unwrap_or_default();
        let Ok(amount) = digits.parse::<f64>() else {
            continue;
        };
        let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(ref s) if s == "k" => 1_000.0,
            Some(ref s) if s == "m" => 1_000_000.0,
            _ => 1.0,
        };
        return Some(amount * multiplier);
    }
    None
}

/// The most recently mentioned subject wins.
fn extract_name(query: &str) -> Option<String> {
    name_re()
        .captures_iter(query)
        .filter_map(|caps| caps.get(1))
        .last()
        .map(|m| m.as_str().trim_end_matches(&['.', '-', '\''][..]).to_string())
        .filter(|name| !name.is_empty())
}

fn extract_quoted(query: &str) -> Option<String> {
    quoted_re()
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
}

/// First keyword of `vocabulary` that starts a word in `lower`.
fn first_keyword(lower: &str, vocabulary: &[(&str, Stage)]) -> Option<Stage> {
    vocabulary
        .iter()
        .find(|(keyword, _)| starts_word(lower, keyword))
        .map(|(_, stage)| *stage)
}

/// True if `keyword` occurs in `haystack` at the start of a word. Suffixes are
/// allowed ("leads", "contacted") but a keyword buried mid-word is not ("down").
fn starts_word(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_window() {
        let filters = extract_filters("Show deals silent for 21 days");
        assert_eq!(
            filters,
            QueryFilters {
                days: Some(21),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_days_first_occurrence_wins() {
        let filters = extract_filters("between 7 days and 30 days");
        assert_eq!(filters.days, Some(7));
    }

    #[test]
    fn test_singular_day() {
        assert_eq!(extract_filters("in the last 1 day").days, Some(1));
    }

    #[test]
    fn test_min_value_with_separator() {
        let filters = extract_filters("deals over $2,500");
        assert_eq!(
            filters,
            QueryFilters {
                min_value: Some(2500.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_min_value_phrases() {
        assert_eq!(extract_filters("above 1000").min_value, Some(1000.0));
        assert_eq!(extract_filters("More than $99.50 please").min_value, Some(99.5));
        assert_eq!(extract_filters("deals over $5k").min_value, Some(5000.0));
        assert_eq!(extract_filters("deals over 2.5m").min_value, Some(2_500_000.0));
    }

    #[test]
    fn test_duration_is_not_money() {
        let filters = extract_filters("customers not contacted for more than 30 days");
        assert_eq!(filters.min_value, None);
        assert_eq!(filters.days, Some(30));
    }

    #[test]
    fn test_max_value() {
        let filters = extract_filters("deals over $1,000 but under $10,000");
        assert_eq!(filters.min_value, Some(1000.0));
        assert_eq!(filters.max_value, Some(10_000.0));
    }

    #[test]
    fn test_recruiting_stage() {
        let filters = extract_filters("candidates in interview stage");
        assert_eq!(
            filters,
            QueryFilters {
                stage: Some(Stage::Interview),
                ..Default::default()
            }
        );
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json, serde_json::json!({ "stage": "interview" }));
    }

    #[test]
    fn test_sales_stage_normalized() {
        assert_eq!(
            extract_filters("deals in negotiation").stage,
            Some(Stage::Negotiating)
        );
        assert_eq!(
            extract_filters("who is in-contact right now").stage,
            Some(Stage::InContact)
        );
        assert_eq!(
            extract_filters("deals we contacted").stage,
            Some(Stage::InContact)
        );
    }

    #[test]
    fn test_stage_vocabulary_order_beats_text_order() {
        // "proposal" appears first in the text, "lead" first in the vocabulary.
        let filters = extract_filters("proposal deals that started as a lead");
        assert_eq!(filters.stage, Some(Stage::Lead));
    }

    #[test]
    fn test_recruiting_stage_overwrites_sales_stage() {
        let filters = extract_filters("negotiating offers with candidates");
        assert_eq!(filters.stage, Some(Stage::Offer));
    }

    #[test]
    fn test_stage_keyword_must_start_a_word() {
        assert_eq!(extract_filters("unwon deals by region").stage, None);
        assert_eq!(extract_filters("misleading numbers").stage, None);
        assert_eq!(extract_filters("leads this week").stage, Some(Stage::Lead));
    }

    #[test]
    fn test_oversized_day_count_saturates() {
        let filters = extract_filters("silent for 5000000000 days");
        assert_eq!(filters.days, Some(u32::MAX));
    }

    #[test]
    fn test_name_last_match_wins() {
        let filters = extract_filters("meeting with Alice about Bob");
        assert_eq!(filters.name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_name_two_tokens() {
        let filters = extract_filters("prep for my call with Jordan Lee tomorrow");
        assert_eq!(filters.name.as_deref(), Some("Jordan Lee"));
    }

    #[test]
    fn test_name_requires_capital() {
        assert_eq!(extract_filters("deals silent for a while").name, None);
    }

    #[test]
    fn test_quoted_search_query() {
        let filters = extract_filters(r#"find leads mentioning "data platform""#);
        assert_eq!(filters.search_query.as_deref(), Some("data platform"));
    }

    #[test]
    fn test_empty_query() {
        let filters = extract_filters("");
        assert!(filters.is_empty());
        assert_eq!(serde_json::to_string(&filters).unwrap(), "{}");
    }

    #[test]
    fn test_stage_parse_roundtrip() {
        for stage in Stage::SALES.iter().chain(Stage::RECRUITING.iter()) {
            assert_eq!(Stage::parse(stage.as_str()), Some(*stage));
        }
        assert_eq!(Stage::parse("unknown"), None);
    }
}
