//! Fallback for questions no other intent recognized. Never touches the store.

use async_trait::async_trait;

use super::{Handler, HandlerContext};
use crate::envelope::ResponseEnvelope;
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters};

/// One example question per kind of answer.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "Show pipeline overview",
    "Which deals have gone silent?",
    "Show deals in proposal stage",
    "Show me deals over $5,000",
    "Show pipeline analytics",
    "Prep for my meeting with Acme",
    "Show my hiring pipeline",
    "Show candidates in interview stage",
    "Show competitor intel",
    "Find new leads",
    "How healthy are our customers?",
];

pub struct GeneralHandler;

#[async_trait]
impl Handler for GeneralHandler {
    fn intent(&self) -> IntentType {
        IntentType::General
    }

    async fn handle(
        &self,
        _ctx: &HandlerContext<'_>,
        _filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        Ok(ResponseEnvelope::new(
            IntentType::General,
            "How can I help?",
            "I can answer questions about your sales pipeline, your hiring pipeline and the competitors you track. Try one of the suggestions below.",
        )
        .with_suggested_actions(EXAMPLE_QUESTIONS.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::classify_query;

    #[test]
    fn test_examples_cover_every_other_intent() {
        let mut covered: Vec<IntentType> = EXAMPLE_QUESTIONS
            .iter()
            .map(|q| classify_query(q).intent)
            .collect();
        covered.sort_by_key(|i| i.label());
        covered.dedup();

        assert!(!covered.contains(&IntentType::General));
        assert_eq!(covered.len(), IntentType::ALL.len() - 1);
    }
}
