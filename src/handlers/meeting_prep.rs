//! Meeting prep: everything known about one named person or company.

use async_trait::async_trait;

use super::{Handler, HandlerContext};
use crate::db::{DbCompetitor, DbCustomer, DbRecruit};
use crate::envelope::{DataRow, Meta, ResponseEnvelope};
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters};
use crate::store::{Condition, ReadQuery};
use crate::util::{days_since, format_currency};

pub struct MeetingPrepHandler;

#[async_trait]
impl Handler for MeetingPrepHandler {
    fn intent(&self) -> IntentType {
        IntentType::MeetingPrep
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let Some(name) = filters.name.as_deref() else {
            return Ok(ask_for_name());
        };

        let customer_query = ReadQuery::new()
            .filter(Condition::AnyContains(vec!["name", "company"], name.to_string()))
            .limit(1);
        let recruit_query = ReadQuery::new()
            .filter(Condition::Contains("name", name.to_string()))
            .limit(1);
        let competitor_query = ReadQuery::new()
            .filter(Condition::Contains("name", name.to_string()))
            .limit(1);

        let (customers, recruits, competitors) = tokio::join!(
            ctx.store.customers(&customer_query),
            ctx.store.recruits(&recruit_query),
            ctx.store.competitors(&competitor_query),
        );
        let customer = customers?.into_iter().next();
        let recruit = recruits?.into_iter().next();
        let competitor = competitors?.into_iter().next();

        Ok(build_brief(ctx, name, customer, recruit, competitor))
    }
}

fn ask_for_name() -> ResponseEnvelope {
    ResponseEnvelope::new(
        IntentType::MeetingPrep,
        "Meeting prep",
        "Who are you meeting? Ask again with a name, like \"Prep for my meeting with Acme\".",
    )
    .with_suggested_actions(["Which deals have gone silent?", "Show pipeline overview"])
}

fn build_brief(
    ctx: &HandlerContext<'_>,
    name: &str,
    customer: Option<DbCustomer>,
    recruit: Option<DbRecruit>,
    competitor: Option<DbCompetitor>,
) -> ResponseEnvelope {
    let mut parts = Vec::new();
    let mut insights = Vec::new();
    let mut actions = Vec::new();
    let mut rows = Vec::new();
    let mut value = None;

    if let Some(c) = customer {
        let contact = match c.last_contact.as_deref().and_then(|ts| days_since(ts, ctx.now)) {
            Some(0) => "last contacted today".to_string(),
            Some(1) => "last contacted yesterday".to_string(),
            Some(days) => format!("last contacted {} days ago", days),
            None => "never contacted".to_string(),
        };
        parts.push(format!(
            "{} is a {} deal worth {}, {}.",
            c.display_name(),
            c.stage,
            format_currency(c.value),
            contact
        ));
        if let Some(days) = c.last_contact.as_deref().and_then(|ts| days_since(ts, ctx.now)) {
            if days > i64::from(ctx.defaults.silent_days) && c.stage().is_some_and(|s| !s.is_closed())
            {
                insights.push(format!(
                    "It has been {} days since the last touch; open with a check-in",
                    days
                ));
            }
        }
        if c.company.is_some() && c.name != c.display_name() {
            insights.push(format!("Primary contact is {}", c.name));
        }
        if let Some(notes) = c.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            insights.push(format!("Deal notes: {}", notes.trim()));
        }
        if let Some(stage) = c.stage().filter(|s| !s.is_closed()) {
            actions.push(format!("Show deals in {} stage", stage));
        }
        value = Some(c.value);
        rows.push(DataRow::Customer(c));
    }

    if let Some(r) = recruit {
        let role = r.role.as_deref().unwrap_or("an open role");
        parts.push(format!(
            "{} is a candidate for {} in {} stage.",
            r.name, role, r.stage
        ));
        if let Some(notes) = r.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            insights.push(format!("Candidate notes: {}", notes.trim()));
        }
        actions.push(format!("Show candidates in {} stage", r.stage));
        rows.push(DataRow::Recruit(r));
    }

    if let Some(k) = competitor {
        parts.push(format!("{} is a competitor you track.", k.name));
        if let Some(strengths) = k.strengths.as_deref().filter(|s| !s.trim().is_empty()) {
            insights.push(format!("{} strengths: {}", k.name, strengths.trim()));
        }
        if let Some(weaknesses) = k.weaknesses.as_deref().filter(|s| !s.trim().is_empty()) {
            insights.push(format!("{} weaknesses: {}", k.name, weaknesses.trim()));
        }
        actions.push("Show competitor intel".to_string());
        rows.push(DataRow::Competitor(k));
    }

    let summary = if parts.is_empty() {
        format!(
            "I couldn't find a customer, candidate or competitor matching \"{}\".",
            name
        )
    } else {
        parts.join(" ")
    };
    if actions.is_empty() {
        actions.push("Show pipeline overview".to_string());
    }

    let matched = rows.len();
    ResponseEnvelope::new(
        IntentType::MeetingPrep,
        format!("Meeting prep: {}", name),
        summary,
    )
    .with_data(rows)
    .with_insights(insights)
    .with_suggested_actions(actions)
    .with_meta(Meta {
        total_count: Some(matched),
        filtered_count: Some(matched),
        total_value: value,
    })
}
