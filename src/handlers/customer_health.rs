//! Customer health: closed-won accounts that have gone without contact.

use async_trait::async_trait;

use super::{customer_rows, total_value, Handler, HandlerContext};
use crate::db::DbCustomer;
use crate::envelope::{Meta, ResponseEnvelope};
use crate::error::StoreError;
use crate::query::{IntentType, QueryFilters, Stage};
use crate::store::{Condition, Direction, ReadQuery};
use crate::util::{days_before, format_currency, parse_timestamp, pluralize};

pub struct CustomerHealthHandler;

#[async_trait]
impl Handler for CustomerHealthHandler {
    fn intent(&self) -> IntentType {
        IntentType::CustomerHealth
    }

    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        filters: &QueryFilters,
    ) -> Result<ResponseEnvelope, StoreError> {
        let days = filters.days.unwrap_or(ctx.defaults.health_days);
        let cutoff = days_before(ctx.now, days);

        let query = ReadQuery::new()
            .filter(Condition::Eq("stage", Stage::ClosedWon.as_str().into()))
            .order_by("last_contact", Direction::Asc);
        let customers = ctx.store.customers(&query).await?;

        // Never contacted counts as at risk
        let (at_risk, healthy): (Vec<DbCustomer>, Vec<DbCustomer>) =
            customers.iter().cloned().partition(|c| {
                c.last_contact
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map_or(true, |ts| ts < cutoff)
            });

        let summary = if customers.is_empty() {
            "No closed-won customers yet.".to_string()
        } else {
            let verb = if at_risk.len() == 1 { "has" } else { "have" };
            format!(
                "{} of {} {} had no contact in the last {} days.",
                at_risk.len(),
                pluralize(customers.len(), "customer"),
                verb,
                days
            )
        };

        let mut insights = Vec::new();
        if !at_risk.is_empty() {
            insights.push(format!(
                "{} in revenue is at risk",
                format_currency(total_value(&at_risk))
            ));
        }
        if !healthy.is_empty() {
            insights.push(format!(
                "{} contacted recently",
                pluralize(healthy.len(), "customer")
            ));
        }

        let mut actions: Vec<String> = at_risk
            .iter()
            .take(2)
            .map(|c| format!("Prep for my meeting with {}", c.display_name()))
            .collect();
        actions.push("Show pipeline analytics".to_string());

        // At-risk first, then healthy
        let ordered: Vec<DbCustomer> = at_risk.iter().chain(healthy.iter()).cloned().collect();

        Ok(ResponseEnvelope::new(IntentType::CustomerHealth, "Customer health", summary)
            .with_data(customer_rows(&ordered, ctx.defaults.result_limit))
            .with_insights(insights)
            .with_suggested_actions(actions)
            .with_meta(Meta {
                total_count: Some(customers.len()),
                filtered_count: Some(at_risk.len()),
                total_value: Some(total_value(&customers)),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{customer, FakeStore};
    use super::*;
    use crate::envelope::DataRow;
    use crate::query::classify_query;
    use crate::types::HandlerDefaults;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    async fn run(store: &FakeStore, query: &str) -> ResponseEnvelope {
        let defaults = HandlerDefaults::default();
        let ctx = HandlerContext {
            store,
            defaults: &defaults,
            now: now(),
        };
        let parsed = classify_query(query);
        assert_eq!(parsed.intent, IntentType::CustomerHealth);
        CustomerHealthHandler
            .handle(&ctx, &parsed.filters)
            .await
            .unwrap()
    }

    fn book() -> Vec<DbCustomer> {
        let never = customer("1", "Acme", "closed-won", 4000.0);
        let mut stale = customer("2", "Globex", "closed-won", 6000.0);
        stale.last_contact = Some("2026-08-01T00:00:00Z".to_string());
        let mut fresh = customer("3", "Initech", "closed-won", 9000.0);
        fresh.last_contact = Some("2026-10-10T00:00:00Z".to_string());
        vec![fresh, never, stale]
    }

    #[tokio::test]
    async fn test_partitions_at_risk() {
        let store = FakeStore {
            customers: book(),
            ..Default::default()
        };
        let env = run(&store, "How healthy are our customers?").await;
        assert_eq!(
            env.summary,
            "2 of 3 customers have had no contact in the last 30 days."
        );
        let insights = env.insights.unwrap();
        assert_eq!(insights[0], "$10,000 in revenue is at risk");
        assert_eq!(insights[1], "1 customer contacted recently");

        let data = env.data.unwrap();
        let ids: Vec<&str> = data
            .iter()
            .map(|row| match row {
                DataRow::Customer(c) => c.id.as_str(),
                _ => panic!("unexpected row"),
            })
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let meta = env.meta.unwrap();
        assert_eq!(meta.filtered_count, Some(2));
        assert_eq!(meta.total_value, Some(19000.0));
    }

    #[tokio::test]
    async fn test_custom_window() {
        let store = FakeStore {
            customers: book(),
            ..Default::default()
        };
        let env = run(&store, "Which customers are at risk after 120 days?").await;
        assert_eq!(
            env.summary,
            "1 of 3 customers has had no contact in the last 120 days."
        );
    }
}
