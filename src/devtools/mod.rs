//! Sample data for trying the router without a real pipeline.
//!
//! Timestamps are relative to `now` so silent-deal and customer-health answers
//! look the same whenever the data is seeded.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::db::{DbCompetitor, DbCustomer, DbError, DbRecruit, PipelineDb};

/// What `seed_sample_data` inserted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub customers: usize,
    pub recruits: usize,
    pub competitors: usize,
    /// True when the database already had records and nothing was written.
    pub skipped: bool,
}

// (name, company, stage, value, days since last contact)
const SAMPLE_CUSTOMERS: &[(&str, &str, &str, f64, Option<i64>)] = &[
    ("Jordan Lee", "Acme", "negotiating", 18000.0, Some(21)),
    ("Priya Shah", "Globex", "proposal", 7500.0, Some(3)),
    ("Marcus Webb", "Initech", "in-contact", 2500.0, Some(40)),
    ("Dana Ortiz", "Umbrella", "lead", 4000.0, None),
    ("Lena Fischer", "Hooli", "lead", 12000.0, Some(9)),
    ("Tom Becker", "Soylent", "closed-won", 22000.0, Some(45)),
    ("Aiko Tanaka", "Vandelay", "closed-won", 9000.0, Some(6)),
    ("Sam Patel", "Stark Industries", "closed-lost", 15000.0, Some(60)),
];

// (name, role, stage, days since last contact)
const SAMPLE_RECRUITS: &[(&str, &str, &str, Option<i64>)] = &[
    ("Riley Chen", "Account Executive", "interview", Some(2)),
    ("Morgan Diaz", "Account Executive", "screening", Some(18)),
    ("Casey Brooks", "Solutions Engineer", "offer", Some(1)),
    ("Jamie Novak", "Solutions Engineer", "applied", None),
    ("Alex Romero", "Customer Success Manager", "hired", Some(30)),
];

// (name, website, pricing, strengths, weaknesses)
const SAMPLE_COMPETITORS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Pipedream CRM",
        "https://pipedream.example",
        "$49/seat/month",
        "Polished mobile app",
        "No hiring pipeline",
    ),
    (
        "FunnelForge",
        "https://funnelforge.example",
        "Free tier, $29/seat above 5 users",
        "Cheap to start",
        "Weak reporting",
    ),
];

fn ago(now: DateTime<Utc>, days: Option<i64>) -> Option<String> {
    days.map(|d| (now - Duration::days(d)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

/// Load the sample pipeline into an empty database.
///
/// A database that already holds any record is left untouched.
pub fn seed_sample_data(db: &PipelineDb, now: DateTime<Utc>) -> Result<SeedSummary, DbError> {
    let (customers, recruits, competitors) = db.counts()?;
    if customers + recruits + competitors > 0 {
        log::info!(
            "Database already has {} records; not seeding",
            customers + recruits + competitors
        );
        return Ok(SeedSummary {
            skipped: true,
            ..Default::default()
        });
    }

    let created_at = (now - Duration::days(90)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let tx = db.conn_ref().unchecked_transaction()?;

    for (name, company, stage, value, contact) in SAMPLE_CUSTOMERS {
        let email = format!(
            "{}@{}.example",
            name.split_whitespace().next().unwrap_or(*name).to_lowercase(),
            company.to_lowercase().replace(' ', "")
        );
        db.upsert_customer(&DbCustomer {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            company: Some(company.to_string()),
            email: Some(email),
            stage: stage.to_string(),
            value: *value,
            last_contact: ago(now, *contact),
            created_at: created_at.clone(),
            notes: None,
        })?;
    }

    for (name, role, stage, contact) in SAMPLE_RECRUITS {
        db.upsert_recruit(&DbRecruit {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            role: Some(role.to_string()),
            email: None,
            stage: stage.to_string(),
            last_contact: ago(now, *contact),
            created_at: created_at.clone(),
            notes: None,
        })?;
    }

    for (name, website, pricing, strengths, weaknesses) in SAMPLE_COMPETITORS {
        db.upsert_competitor(&DbCompetitor {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            website: Some(website.to_string()),
            pricing: Some(pricing.to_string()),
            strengths: Some(strengths.to_string()),
            weaknesses: Some(weaknesses.to_string()),
            notes: None,
            updated_at: created_at.clone(),
        })?;
    }

    tx.commit()?;

    let summary = SeedSummary {
        customers: SAMPLE_CUSTOMERS.len(),
        recruits: SAMPLE_RECRUITS.len(),
        competitors: SAMPLE_COMPETITORS.len(),
        skipped: false,
    };
    log::info!(
        "Seeded {} customers, {} recruits, {} competitors",
        summary.customers,
        summary.recruits,
        summary.competitors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::handlers::QueryRouter;
    use crate::query::IntentType;
    use crate::store::SqliteStore;
    use crate::types::HandlerDefaults;
    use std::sync::Arc;

    #[test]
    fn test_seed_then_skip() {
        let db = test_db();
        let summary = seed_sample_data(&db, Utc::now()).unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                customers: 8,
                recruits: 5,
                competitors: 2,
                skipped: false
            }
        );
        assert_eq!(db.counts().unwrap(), (8, 5, 2));

        let again = seed_sample_data(&db, Utc::now()).unwrap();
        assert!(again.skipped);
        assert_eq!(db.counts().unwrap(), (8, 5, 2));
    }

    #[tokio::test]
    async fn test_seeded_answers() {
        let now = Utc::now();
        let db = test_db();
        seed_sample_data(&db, now).unwrap();
        let router = QueryRouter::new(Arc::new(SqliteStore::new(db)), HandlerDefaults::default());

        // Acme (21 days) and Initech (40 days) are open and past 14 days
        let env = router.ask_at("Which deals have gone silent?", now).await;
        assert_eq!(env.intent, IntentType::PipelineSilent);
        let meta = env.meta.unwrap();
        assert_eq!(meta.total_count, Some(2));
        assert_eq!(meta.total_value, Some(20500.0));

        let env = router.ask_at("Prep for my meeting with Acme", now).await;
        assert!(env.summary.starts_with("Acme is a negotiating deal worth $18,000"));

        let env = router.ask_at("Show candidates in interview stage", now).await;
        assert_eq!(env.summary, "1 candidate in interview stage.");

        let env = router.ask_at("How healthy are our customers?", now).await;
        assert_eq!(
            env.summary,
            "1 of 2 customers has had no contact in the last 30 days."
        );
    }
}
