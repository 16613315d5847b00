//! Hiring pipeline handlers.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{stage_counts, stage_insights, Handler, HandlerContext};
use crate::db::DbRecruit;
use crate::envelope::{DataRow, Meta, ResponseEnvelope};
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters, Stage};
use crate::store::{Condition, Direction, ReadQuery};
use crate::util::{days_since, pluralize};

fn recruit_rows(recruits: &[DbRecruit], limit: usize) -> Vec<DataRow> {
    recruits
        .iter()
        .take(limit)
        .cloned()
        .map(DataRow::Recruit)
        .collect()
}

fn is_active(recruit: &DbRecruit) -> bool {
    !matches!(recruit.stage(), Some(Stage::Hired) | Some(Stage::Rejected))
}

pub struct RecruitmentHandler;

#[async_trait]
impl Handler for RecruitmentHandler {
    fn intent(&self) -> IntentType {
        IntentType::Recruitment
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        _filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let recruits = ctx
            .store
            .recruits(&ReadQuery::new().order_by("created_at", Direction::Desc))
            .await?;
        let active: Vec<DbRecruit> = recruits.iter().filter(|r| is_active(r)).cloned().collect();

        let summary = if recruits.is_empty() {
            "No candidates in your hiring pipeline yet.".to_string()
        } else {
            format!(
                "You have {} in your hiring pipeline, {} still active.",
                pluralize(recruits.len(), "candidate"),
                active.len()
            )
        };

        let counts = stage_counts(recruits.iter().map(|r| r.stage.as_str()), &Stage::RECRUITING);
        let mut insights = stage_insights(&counts);

        // Open roles by number of active candidates
        let mut roles: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &active {
            if let Some(role) = r.role.as_deref().filter(|s| !s.trim().is_empty()) {
                *roles.entry(role.trim()).or_default() += 1;
            }
        }
        if !roles.is_empty() {
            let listed: Vec<String> = roles
                .iter()
                .map(|(role, n)| format!("{} ({})", role, n))
                .collect();
            insights.push(format!("Active roles: {}", listed.join(", ")));
        }

        let mut actions = vec!["Show candidates in interview stage".to_string()];
        if counts.iter().any(|(s, _)| *s == Stage::Offer) {
            actions.push("Show candidates with an offer".to_string());
        }
        actions.push("Show pipeline overview".to_string());

        Ok(ResponseEnvelope::new(IntentType::Recruitment, "Hiring pipeline", summary)
            .with_data(recruit_rows(&active, ctx.defaults.result_limit))
            .with_insights(insights)
            .with_suggested_actions(actions)
            .with_meta(Meta {
                total_count: Some(recruits.len()),
                filtered_count: Some(active.len().min(ctx.defaults.result_limit)),
                total_value: None,
            }))
    }
}

pub struct RecruitmentStageHandler;

#[async_trait]
impl Handler for RecruitmentStageHandler {
    fn intent(&self) -> IntentType {
        IntentType::RecruitmentByStage
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let stage = filters
            .stage
            .filter(Stage::is_recruiting)
            .unwrap_or(ctx.defaults.recruiting_stage);

        let query = ReadQuery::new()
            .filter(Condition::Eq("stage", stage.as_str().into()))
            .order_by("last_contact", Direction::Asc);
        let recruits = ctx.store.recruits(&query).await?;

        let summary = if recruits.is_empty() {
            format!("No candidates in {} stage right now.", stage)
        } else {
            format!("{} in {} stage.", pluralize(recruits.len(), "candidate"), stage)
        };

        let mut insights = Vec::new();
        if !matches!(stage, Stage::Hired | Stage::Rejected) {
            let waiting: Vec<String> = recruits
                .iter()
                .filter_map(|r| {
                    let days = r
                        .last_contact
                        .as_deref()
                        .and_then(|ts| days_since(ts, ctx.now))?;
                    (days > i64::from(ctx.defaults.silent_days))
                        .then(|| format!("{} ({} days)", r.name, days))
                })
                .take(3)
                .collect();
            if !waiting.is_empty() {
                insights.push(format!("Waiting on a follow-up: {}", waiting.join(", ")));
            }
        }

        let next = Stage::RECRUITING
            .iter()
            .skip_while(|s| **s != stage)
            .nth(1)
            .filter(|s| !matches!(s, Stage::Hired | Stage::Rejected));
        let actions: Vec<String> = next
            .map(|s| format!("Show candidates in {} stage", s))
            .into_iter()
            .chain(std::iter::once("Show my hiring pipeline".to_string()))
            .collect();

        Ok(ResponseEnvelope::new(
            IntentType::RecruitmentByStage,
            format!("Candidates in {}", stage),
            summary,
        )
        .with_data(recruit_rows(&recruits, ctx.defaults.result_limit))
        .with_insights(insights)
        .with_suggested_actions(actions)
        .with_meta(Meta {
            total_count: Some(recruits.len()),
            filtered_count: Some(recruits.len().min(ctx.defaults.result_limit)),
            total_value: None,
        }))
    }
}
