//! Prospecting: leads worth working next.

use async_trait::async_trait;

use super::{customer_rows, total_value, Handler, HandlerContext};
use crate::envelope::{Meta, ResponseEnvelope};
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters, Stage};
use crate::store::{Condition, Direction, ReadQuery};
use crate::util::{format_currency, pluralize};

pub struct ProspectingHandler;

#[async_trait]
impl Handler for ProspectingHandler {
    fn intent(&self) -> IntentType {
        IntentType::Prospecting
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let mut query = ReadQuery::new()
            .filter(Condition::Eq("stage", Stage::Lead.as_str().into()))
            .order_by("value", Direction::Desc);
        if let Some(search) = filters.search_query.as_deref() {
            query = query.filter(Condition::AnyContains(
                vec!["name", "company", "notes"],
                search.to_string(),
            ));
        }
        if let Some(min) = filters.min_value {
            query = query.filter(Condition::Gte("value", min.into()));
        }
        if let Some(max) = filters.max_value {
            query = query.filter(Condition::Lte("value", max.into()));
        }
        let leads = ctx.store.customers(&query).await?;
        let value = total_value(&leads);

        let summary = match (leads.is_empty(), filters.search_query.as_deref()) {
            (true, Some(search)) => format!("No leads match \"{}\".", search),
            (true, None) => "No open leads. Time to fill the top of the funnel.".to_string(),
            (false, _) => format!(
                "{} to work, worth {} in potential value.",
                pluralize(leads.len(), "lead"),
                format_currency(value)
            ),
        };

        let mut insights = Vec::new();
        let untouched = leads.iter().filter(|l| l.last_contact.is_none()).count();
        if untouched > 0 {
            let verb = if untouched == 1 { "has" } else { "have" };
            insights.push(format!(
                "{} {} never been contacted",
                pluralize(untouched, "lead"),
                verb
            ));
        }
        if let Some(top) = leads.first() {
            insights.push(format!(
                "Highest potential is {} at {}",
                top.display_name(),
                format_currency(top.value)
            ));
        }

        let mut actions = Vec::new();
        if let Some(top) = leads.first() {
            actions.push(format!("Prep for my meeting with {}", top.display_name()));
        }
        actions.push("Show deals in in-contact stage".to_string());
        actions.push("Show pipeline overview".to_string());

        Ok(ResponseEnvelope::new(IntentType::Prospecting, "Prospects", summary)
            .with_data(customer_rows(&leads, ctx.defaults.result_limit))
            .with_insights(insights)
            .with_suggested_actions(actions)
            .with_meta(Meta {
                total_count: Some(leads.len()),
                filtered_count: Some(leads.len().min(ctx.defaults.result_limit)),
                total_value: Some(value),
            }))
    }
}
