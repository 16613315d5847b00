//! Sales pipeline handlers: overview, silent deals, by stage, by value, analytics.

use async_trait::async_trait;

use super::{
    customer_rows, is_open, open_deals, stage_counts, stage_insights, total_value, Handler,
    HandlerContext,
};
use crate::db::DbCustomer;
use crate::envelope::{DataRow, Meta, ResponseEnvelope, StageSummary};
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters, Stage};
use crate::store::{Condition, Direction, ReadQuery};
use crate::util::{cutoff_timestamp, days_since, format_currency, format_percent, pluralize};

// =============================================================================
// Overview
// =============================================================================

pub struct OverviewHandler;

#[async_trait]
impl Handler for OverviewHandler {
    fn intent(&self) -> IntentType {
        IntentType::PipelineOverview
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        _filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let customers = ctx
            .store
            .customers(&ReadQuery::new().order_by("value", Direction::Desc))
            .await?;

        let open: Vec<DbCustomer> = customers.iter().filter(|c| is_open(c)).cloned().collect();
        let open_value = total_value(&open);

        let summary = if customers.is_empty() {
            "Your pipeline is empty. Add a deal to get started.".to_string()
        } else {
            format!(
                "You have {} in your pipeline. {} open, worth {}.",
                pluralize(customers.len(), "deal"),
                open.len(),
                format_currency(open_value)
            )
        };

        let counts = stage_counts(customers.iter().map(|c| c.stage.as_str()), &Stage::SALES);
        let mut insights = stage_insights(&counts);
        let won: f64 = customers
            .iter()
            .filter(|c| c.stage() == Some(Stage::ClosedWon))
            .map(|c| c.value)
            .sum();
        if won > 0.0 {
            insights.push(format!("{} closed-won to date", format_currency(won)));
        }

        Ok(ResponseEnvelope::new(IntentType::PipelineOverview, "Pipeline overview", summary)
            .with_data(customer_rows(&open, ctx.defaults.result_limit))
            .with_insights(insights)
            .with_suggested_actions([
                "Which deals have gone silent?",
                "Show me deals over $5,000",
                "Show pipeline analytics",
            ])
            .with_meta(Meta {
                total_count: Some(customers.len()),
                filtered_count: Some(open.len().min(ctx.defaults.result_limit)),
                total_value: Some(open_value),
            }))
    }
}

// =============================================================================
// Silent deals
// =============================================================================

pub struct SilentDealsHandler;

#[async_trait]
impl Handler for SilentDealsHandler {
    fn intent(&self) -> IntentType {
        IntentType::PipelineSilent
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let days = filters.days.unwrap_or(ctx.defaults.silent_days);
        let cutoff = cutoff_timestamp(ctx.now, days);

        // Never-contacted deals have no last_contact and are not "silent"
        let query = ReadQuery::new()
            .filter(open_deals())
            .filter(Condition::Lt("last_contact", cutoff.into()))
            .order_by("last_contact", Direction::Asc);
        let silent = ctx.store.customers(&query).await?;
        let value = total_value(&silent);

        let summary = if silent.is_empty() {
            format!("Every open deal has been contacted in the last {} days.", days)
        } else {
            format!(
                "Found {} with no contact in the last {} days, worth {} in total.",
                pluralize(silent.len(), "deal"),
                days,
                format_currency(value)
            )
        };

        let mut insights = Vec::new();
        if let Some(oldest) = silent.first() {
            if let Some(age) = oldest
                .last_contact
                .as_deref()
                .and_then(|ts| days_since(ts, ctx.now))
            {
                insights.push(format!(
                    "{} has been silent the longest ({} days)",
                    oldest.display_name(),
                    age
                ));
            }
        }
        if let Some(biggest) = silent
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
        {
            if silent.len() > 1 {
                insights.push(format!(
                    "{} is the largest at {}",
                    biggest.display_name(),
                    format_currency(biggest.value)
                ));
            }
        }
        let counts = stage_counts(silent.iter().map(|c| c.stage.as_str()), &Stage::SALES);
        insights.extend(stage_insights(&counts));

        let mut actions = Vec::new();
        if let Some(oldest) = silent.first() {
            actions.push(format!("Prep for my meeting with {}", oldest.display_name()));
        }
        let wider = if days < 30 { 30 } else { days.saturating_mul(2) };
        actions.push(format!("Show deals silent for {} days", wider));
        actions.push("Show pipeline overview".to_string());

        Ok(ResponseEnvelope::new(IntentType::PipelineSilent, "Silent deals", summary)
            .with_data(customer_rows(&silent, ctx.defaults.result_limit))
            .with_insights(insights)
            .with_suggested_actions(actions)
            .with_meta(Meta {
                total_count: Some(silent.len()),
                filtered_count: Some(silent.len().min(ctx.defaults.result_limit)),
                total_value: Some(value),
            }))
    }
}

// =============================================================================
// By stage
// =============================================================================

pub struct StageHandler;

#[async_trait]
impl Handler for StageHandler {
    fn intent(&self) -> IntentType {
        IntentType::PipelineByStage
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let stage = filters
            .stage
            .filter(Stage::is_sales)
            .unwrap_or(ctx.defaults.sales_stage);

        let query = ReadQuery::new()
            .filter(Condition::Eq("stage", stage.as_str().into()))
            .order_by("value", Direction::Desc);
        let deals = ctx.store.customers(&query).await?;
        let value = total_value(&deals);

        let summary = if deals.is_empty() {
            format!("No deals in {} stage right now.", stage)
        } else {
            format!(
                "{} in {} stage, worth {}.",
                pluralize(deals.len(), "deal"),
                stage,
                format_currency(value)
            )
        };

        let mut insights = Vec::new();
        if !deals.is_empty() {
            insights.push(format!(
                "Average deal size is {}",
                format_currency(value / deals.len() as f64)
            ));
        }
        let stale = deals
            .iter()
            .filter(|d| {
                d.last_contact
                    .as_deref()
                    .and_then(|ts| days_since(ts, ctx.now))
                    .is_some_and(|age| age > i64::from(ctx.defaults.silent_days))
            })
            .count();
        if stale > 0 && !stage.is_closed() {
            insights.push(format!(
                "{} without contact for over {} days",
                pluralize(stale, "deal"),
                ctx.defaults.silent_days
            ));
        }

        let actions: Vec<String> = Stage::SALES
            .iter()
            .filter(|s| **s != stage && !s.is_closed())
            .take(2)
            .map(|s| format!("Show deals in {} stage", s))
            .chain(std::iter::once("Show pipeline analytics".to_string()))
            .collect();

        Ok(ResponseEnvelope::new(
            IntentType::PipelineByStage,
            format!("Deals in {}", stage),
            summary,
        )
        .with_data(customer_rows(&deals, ctx.defaults.result_limit))
        .with_insights(insights)
        .with_suggested_actions(actions)
        .with_meta(Meta {
            total_count: Some(deals.len()),
            filtered_count: Some(deals.len().min(ctx.defaults.result_limit)),
            total_value: Some(value),
        }))
    }
}

// =============================================================================
// By value
// =============================================================================

pub struct ValueHandler;

#[async_trait]
impl Handler for ValueHandler {
    fn intent(&self) -> IntentType {
        IntentType::PipelineByValue
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        // "under $5k" alone sets only a ceiling
        let min = match (filters.min_value, filters.max_value) {
            (Some(min), _) => Some(min),
            (None, Some(_)) => None,
            (None, None) => Some(ctx.defaults.min_value),
        };
        let max = filters.max_value;

        let mut query = ReadQuery::new().order_by("value", Direction::Desc);
        if let Some(min) = min {
            query = query.filter(Condition::Gte("value", min.into()));
        }
        if let Some(max) = max {
            query = query.filter(Condition::Lte("value", max.into()));
        }
        let deals = ctx.store.customers(&query).await?;
        let value = total_value(&deals);

        let range = match (min, max) {
            (Some(min), Some(max)) => format!(
                "between {} and {}",
                format_currency(min),
                format_currency(max)
            ),
            (None, Some(max)) => format!("under {}", format_currency(max)),
            (Some(min), None) => format!("over {}", format_currency(min)),
            (None, None) => "of any size".to_string(),
        };

        let summary = if deals.is_empty() {
            format!("No deals {}.", range)
        } else {
            format!(
                "{} {}, totalling {}.",
                pluralize(deals.len(), "deal"),
                range,
                format_currency(value)
            )
        };

        let mut insights = Vec::new();
        if let Some(top) = deals.first() {
            insights.push(format!(
                "Largest is {} at {} ({})",
                top.display_name(),
                format_currency(top.value),
                top.stage
            ));
        }
        let open = deals.iter().filter(|d| is_open(d)).count();
        if open < deals.len() {
            insights.push(format!("{} still open", open));
        }

        Ok(ResponseEnvelope::new(
            IntentType::PipelineByValue,
            format!("Deals {}", range),
            summary,
        )
        .with_data(customer_rows(&deals, ctx.defaults.result_limit))
        .with_insights(insights)
        .with_suggested_actions([
            "Show me deals over $10,000",
            "Which deals have gone silent?",
            "Show pipeline analytics",
        ])
        .with_meta(Meta {
            total_count: Some(deals.len()),
            filtered_count: Some(deals.len().min(ctx.defaults.result_limit)),
            total_value: Some(value),
        }))
    }
}

// =============================================================================
// Analytics
// =============================================================================

pub struct AnalyticsHandler;

#[async_trait]
impl Handler for AnalyticsHandler {
    fn intent(&self) -> IntentType {
        IntentType::PipelineAnalytics
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        _filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let customers = ctx.store.customers(&ReadQuery::new()).await?;
        let value = total_value(&customers);

        let summaries: Vec<StageSummary> = Stage::SALES
            .iter()
            .map(|stage| {
                let in_stage = customers.iter().filter(|c| c.stage() == Some(*stage));
                let (count, value) = in_stage.fold((0, 0.0), |(n, v), c| (n + 1, v + c.value));
                StageSummary {
                    stage: *stage,
                    count,
                    value,
                }
            })
            .collect();

        let count_of = |stage: Stage| {
            summaries
                .iter()
                .find(|s| s.stage == stage)
                .map_or(0, |s| s.count)
        };
        let won = count_of(Stage::ClosedWon);
        let lost = count_of(Stage::ClosedLost);

        let mut insights = Vec::new();
        let mut summary = if customers.is_empty() {
            "No deals yet, so there is nothing to analyze.".to_string()
        } else {
            format!(
                "{} worth {} across the pipeline.",
                pluralize(customers.len(), "deal"),
                format_currency(value)
            )
        };

        if won + lost > 0 {
            let rate = format_percent(won as f64 / (won + lost) as f64);
            summary.push_str(&format!(" Win rate is {}.", rate));
            insights.push(format!("Win rate {} ({} won, {} lost)", rate, won, lost));
        }
        if !customers.is_empty() {
            insights.push(format!(
                "Average deal size is {}",
                format_currency(value / customers.len() as f64)
            ));
        }
        if let Some(top) = summaries
            .iter()
            .filter(|s| !s.stage.is_closed() && s.count > 0)
            .max_by(|a, b| a.value.total_cmp(&b.value))
        {
            insights.push(format!(
                "Most open value sits in {} ({})",
                top.stage,
                format_currency(top.value)
            ));
        }
        let unknown = customers.iter().filter(|c| c.stage().is_none()).count();
        if unknown > 0 {
            insights.push(format!(
                "{} with an unrecognized stage",
                pluralize(unknown, "deal")
            ));
        }

        let rows = summaries.into_iter().map(DataRow::StageSummary).collect();

        Ok(ResponseEnvelope::new(IntentType::PipelineAnalytics, "Pipeline analytics", summary)
            .with_data(rows)
            .with_insights(insights)
            .with_suggested_actions([
                "Show deals in negotiating stage",
                "Which deals have gone silent?",
                "How healthy are our customers?",
            ])
            .with_meta(Meta {
                total_count: Some(customers.len()),
                filtered_count: None,
                total_value: Some(value),
            }))
    }
}
