//! Pipeline database schema versions.
//!
//! `SCHEMA` lists the SQL files under `migrations/` in version order, embedded
//! with `include_str!`. The highest applied version lives in `schema_version`;
//! opening a database applies whatever is newer, each file in its own
//! transaction together with its version row.

use rusqlite::Connection;

struct SchemaStep {
    version: i32,
    label: &'static str,
    sql: &'static str,
}

const SCHEMA: &[SchemaStep] = &[SchemaStep {
    version: 1,
    label: "customers, recruits and competitors",
    sql: include_str!("migrations/001_baseline.sql"),
}];

fn schema_version(conn: &Connection) -> Result<i32, String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Cannot create schema_version: {}", e))?;

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Cannot read schema_version: {}", e))
}

/// Bring the pipeline schema up to date. Returns how many versions were applied.
///
/// A database written by a newer DealDesk is refused rather than downgraded.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    apply_steps(conn, SCHEMA)
}

fn apply_steps(conn: &Connection, steps: &[SchemaStep]) -> Result<usize, String> {
    let current = schema_version(conn)?;
    let latest = steps.last().map_or(0, |s| s.version);
    if current > latest {
        return Err(format!(
            "Pipeline database is at schema v{} but this build of DealDesk only knows up to v{}. \
             Upgrade DealDesk to open it.",
            current, latest
        ));
    }

    let mut applied = 0;
    for step in steps.iter().filter(|s| s.version > current) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| format!("Cannot start schema v{}: {}", step.version, e))?;
        tx.execute_batch(step.sql)
            .map_err(|e| format!("Schema v{} ({}) failed: {}", step.version, step.label, e))?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [step.version],
        )
        .map_err(|e| format!("Cannot record schema v{}: {}", step.version, e))?;
        tx.commit()
            .map_err(|e| format!("Cannot commit schema v{}: {}", step.version, e))?;

        log::info!("Pipeline schema v{} applied ({})", step.version, step.label);
        applied += 1;
    }

    Ok(applied)
}
