//! The response envelope every handler returns.
//!
//! The shape is the same for every intent, including failures, so a caller can
//! render any answer as title + summary + optional rows.

use serde::Serialize;

use crate::db::{DbCompetitor, DbCustomer, DbRecruit};
use crate::query::{IntentType, Stage};

/// Title used on every failure envelope.
pub const ERROR_TITLE: &str = "Error";

/// One structured row in `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataRow {
    Customer(DbCustomer),
    Recruit(DbRecruit),
    Competitor(DbCompetitor),
    StageSummary(StageSummary),
}

/// Per-stage aggregate used by analytics answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: Stage,
    pub count: usize,
    pub value: f64,
}

/// Raw numbers for programmatic consumers. Never rounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub intent: IntentType,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ResponseEnvelope {
    pub fn new(intent: IntentType, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            intent,
            title: title.into(),
            summary: summary.into(),
            data: None,
            insights: None,
            suggested_actions: None,
            meta: None,
        }
    }

    /// Failure envelope: fixed title, human-readable cause, no rows.
    pub fn error(intent: IntentType, summary: impl Into<String>) -> Self {
        Self::new(intent, ERROR_TITLE, summary)
    }

    pub fn is_error(&self) -> bool {
        self.title == ERROR_TITLE && self.data.is_none()
    }

    /// Set `data`, even when empty; an empty list means "looked, found nothing".
    pub fn with_data(mut self, rows: Vec<DataRow>) -> Self {
        self.data = Some(rows);
        self
    }

    /// Set `insights`; an empty list leaves the field out.
    pub fn with_insights(mut self, insights: Vec<String>) -> Self {
        self.insights = if insights.is_empty() {
            None
        } else {
            Some(insights)
        };
        self
    }

    pub fn with_suggested_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        self.suggested_actions = if actions.is_empty() {
            None
        } else {
            Some(actions)
        };
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_envelope_omits_optionals() {
        let env = ResponseEnvelope::new(IntentType::General, "Hi", "Ask me anything.");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "general",
                "title": "Hi",
                "summary": "Ask me anything."
            })
        );
    }

    #[test]
    fn test_empty_data_is_serialized() {
        let env = ResponseEnvelope::new(IntentType::PipelineByValue, "Deals", "None.")
            .with_data(Vec::new())
            .with_meta(Meta {
                total_count: Some(0),
                ..Default::default()
            });
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["data"], serde_json::json!([]));
        assert_eq!(json["meta"], serde_json::json!({ "totalCount": 0 }));
    }

    #[test]
    fn test_rows_are_tagged() {
        let row = DataRow::StageSummary(StageSummary {
            stage: Stage::Proposal,
            count: 2,
            value: 3000.0,
        });
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "stage_summary",
                "stage": "proposal",
                "count": 2,
                "value": 3000.0
            })
        );
    }

    #[test]
    fn test_error_envelope() {
        let env = ResponseEnvelope::error(IntentType::PipelineByValue, "Database offline.");
        assert!(env.is_error());
        let json = serde_json::to_value(&env).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["title"], ERROR_TITLE);
    }

    #[test]
    fn test_empty_insights_are_dropped() {
        let env = ResponseEnvelope::new(IntentType::General, "t", "s")
            .with_insights(Vec::new())
            .with_suggested_actions(Vec::<String>::new());
        assert!(env.insights.is_none());
        assert!(env.suggested_actions.is_none());
    }
}
