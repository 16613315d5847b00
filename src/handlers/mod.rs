//! Intent handlers and the dispatch table.
//!
//! Every `IntentType` maps to exactly one handler through `handler_for`, an
//! exhaustive match: adding an intent without a handler does not compile.
//! Handlers read the store, compute their own aggregates, and return an
//! envelope. A failed read becomes an error envelope here and never reaches
//! the caller as an `Err`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::DbCustomer;
use crate::envelope::{DataRow, ResponseEnvelope};
use crate::error::StoreError;
use crate::query::{classify_query, IntentType, ParsedIntent, QueryFilters, Stage};
use crate::store::{Condition, FieldValue, RecordStore};
use crate::types::HandlerDefaults;

pub mod competitors;
pub mod customer_health;
pub mod general;
pub mod meeting_prep;
pub mod pipeline;
pub mod prospecting;
pub mod recruitment;

/// Everything a handler may use besides the filters.
pub struct HandlerContext<'a> {
    pub store: &'a dyn RecordStore,
    pub defaults: &'a HandlerDefaults,
    /// Reference time for lookback windows.
    pub now: DateTime<Utc>,
}

#[async_trait]
pub trait Handler: Send + Sync {
    /// The intent this handler answers.
    fn intent(&self) -> IntentType;

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError>;
}

/// The dispatch table.
pub fn handler_for(intent: IntentType) -> &'static dyn Handler {
    match intent {
        IntentType::PipelineOverview => &pipeline::OverviewHandler,
        IntentType::PipelineSilent => &pipeline::SilentDealsHandler,
        IntentType::PipelineByStage => &pipeline::StageHandler,
        IntentType::PipelineByValue => &pipeline::ValueHandler,
        IntentType::PipelineAnalytics => &pipeline::AnalyticsHandler,
        IntentType::MeetingPrep => &meeting_prep::MeetingPrepHandler,
        IntentType::Recruitment => &recruitment::RecruitmentHandler,
        IntentType::RecruitmentByStage => &recruitment::RecruitmentStageHandler,
        IntentType::CompetitorIntel => &competitors::CompetitorHandler,
        IntentType::Prospecting => &prospecting::ProspectingHandler,
        IntentType::CustomerHealth => &customer_health::CustomerHealthHandler,
        IntentType::General => &general::GeneralHandler,
    }
}

/// Classifies questions and routes them to their handler.
pub struct QueryRouter {
    store: Arc<dyn RecordStore>,
    defaults: HandlerDefaults,
}

impl QueryRouter {
    pub fn new(store: Arc<dyn RecordStore>, defaults: HandlerDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> &HandlerDefaults {
        &self.defaults
    }

    /// Classify and answer a question.
    pub async fn ask(&self, query: &str) -> ResponseEnvelope {
        self.ask_at(query, Utc::now()).await
    }

    /// Same as `ask`, with an explicit reference time.
    pub async fn ask_at(&self, query: &str, now: DateTime<Utc>) -> ResponseEnvelope {
        let parsed = classify_query(query);
        self.dispatch_at(&parsed, now).await
    }

    pub async fn dispatch(&self, parsed: &ParsedIntent) -> ResponseEnvelope {
        self.dispatch_at(parsed, Utc::now()).await
    }

    pub async fn dispatch_at(&self, parsed: &ParsedIntent, now: DateTime<Utc>) -> ResponseEnvelope {
        let handler = handler_for(parsed.intent);
        let ctx = HandlerContext {
            store: self.store.as_ref(),
            defaults: &self.defaults,
            now,
        };

        match handler.handle(&ctx, &parsed.filters).await {
            Ok(envelope) => {
                log::info!(
                    "Answered {} query ({} rows)",
                    parsed.intent,
                    envelope.data.as_ref().map_or(0, Vec::len)
                );
                envelope
            }
            Err(e) => {
                log::warn!("Store read failed for {} query: {}", parsed.intent, e);
                ResponseEnvelope::error(
                    parsed.intent,
                    format!("I couldn't look that up. {}", e.user_message()),
                )
            }
        }
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Excludes closed-won and closed-lost deals.
pub(crate) fn open_deals() -> Condition {
    Condition::NotIn(
        "stage",
        vec![
            FieldValue::from(Stage::ClosedWon.as_str()),
            FieldValue::from(Stage::ClosedLost.as_str()),
        ],
    )
}

pub(crate) fn is_open(customer: &DbCustomer) -> bool {
    !customer.stage().is_some_and(|s| s.is_closed())
}

pub(crate) fn total_value(customers: &[DbCustomer]) -> f64 {
    customers.iter().map(|c| c.value).sum()
}

/// Customer rows, capped at `limit`.
pub(crate) fn customer_rows(customers: &[DbCustomer], limit: usize) -> Vec<DataRow> {
    customers
        .iter()
        .take(limit)
        .cloned()
        .map(DataRow::Customer)
        .collect()
}

/// Count of records per stage, in `order`, skipping empty stages.
pub(crate) fn stage_counts<'a, I>(stages: I, order: &[Stage]) -> Vec<(Stage, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let parsed: Vec<Option<Stage>> = stages.into_iter().map(Stage::parse).collect();
    order
        .iter()
        .map(|stage| {
            let n = parsed.iter().filter(|s| **s == Some(*stage)).count();
            (*stage, n)
        })
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// "3 are in negotiating stage" style insight lines.
pub(crate) fn stage_insights(counts: &[(Stage, usize)]) -> Vec<String> {
    counts
        .iter()
        .map(|(stage, n)| {
            let verb = if *n == 1 { "is" } else { "are" };
            format!("{} {} in {} stage", n, verb, stage)
        })
        .collect()
}
