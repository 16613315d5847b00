//! Competitive intel.

use async_trait::async_trait;

use super::{Handler, HandlerContext};
use crate::db::DbCompetitor;
use crate::envelope::{DataRow, Meta, ResponseEnvelope};
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters};
use crate::store::{Condition, Direction, ReadQuery};
use crate::util::pluralize;

/// Most competitors summarized in insights.
const MAX_PROFILES: usize = 5;

pub struct CompetitorHandler;

#[async_trait]
impl Handler for CompetitorHandler {
    fn intent(&self) -> IntentType {
        IntentType::CompetitorIntel
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let mut query = ReadQuery::new().order_by("name", Direction::Asc);
        if let Some(name) = filters.name.as_deref() {
            query = query.filter(Condition::Contains("name", name.to_string()));
        }
        let competitors = ctx.store.competitors(&query).await?;

        let summary = match (filters.name.as_deref(), competitors.len()) {
            (Some(name), 0) => format!("No tracked competitor matches \"{}\".", name),
            (None, 0) => "You aren't tracking any competitors yet.".to_string(),
            (Some(_), _) => format!(
                "Here's what we know about {}.",
                competitors
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            (None, n) => format!("You're tracking {}.", pluralize(n, "competitor")),
        };

        let insights: Vec<String> = competitors
            .iter()
            .filter_map(profile)
            .take(MAX_PROFILES)
            .collect();

        let mut actions: Vec<String> = competitors
            .iter()
            .take(2)
            .map(|c| format!("Tell me about {}", c.name))
            .collect();
        actions.push("Show pipeline analytics".to_string());

        let rows: Vec<DataRow> = competitors
            .iter()
            .take(ctx.defaults.result_limit)
            .cloned()
            .map(DataRow::Competitor)
            .collect();

        Ok(ResponseEnvelope::new(IntentType::CompetitorIntel, "Competitive intel", summary)
            .with_meta(Meta {
                total_count: Some(competitors.len()),
                filtered_count: Some(rows.len()),
                total_value: None,
            })
            .with_data(rows)
            .with_insights(insights)
            .with_suggested_actions(actions))
    }
}

/// One-line profile, or `None` when nothing beyond the name is known.
fn profile(competitor: &DbCompetitor) -> Option<String> {
    let fields = [
        ("strengths", &competitor.strengths),
        ("weaknesses", &competitor.weaknesses),
        ("pricing", &competitor.pricing),
    ];
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{} {}", label, v))
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("{}: {}", competitor.name, parts.join("; ")))
    }
}
