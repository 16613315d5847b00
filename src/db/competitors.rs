use rusqlite::params;

use super::query::{build_select, TableSpec};
use super::*;
use crate::store::ReadQuery;

pub(crate) const COMPETITORS: TableSpec = TableSpec {
    name: "competitors",
    columns: &[
        "id",
        "name",
        "website",
        "pricing",
        "strengths",
        "weaknesses",
        "notes",
        "updated_at",
    ],
};

impl PipelineDb {
    // =========================================================================
    // Competitors
    // =========================================================================

    /// Insert or update a tracked competitor.
    pub fn upsert_competitor(&self, competitor: &DbCompetitor) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO competitors (
                id, name, website, pricing, strengths, weaknesses, notes, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                website = excluded.website,
                pricing = excluded.pricing,
                strengths = excluded.strengths,
                weaknesses = excluded.weaknesses,
                notes = excluded.notes,
                updated_at = excluded.updated_at",
            params![
                competitor.id,
                competitor.name,
                competitor.website,
                competitor.pricing,
                competitor.strengths,
                competitor.weaknesses,
                competitor.notes,
                competitor.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Competitors matching a read query.
    pub fn get_competitors(&self, query: &ReadQuery) -> Result<Vec<DbCompetitor>, DbError> {
        let (sql, values) = build_select(&COMPETITORS, query)?;
        let mut stmt = self.conn.prepare(&sql)?;
        let rows =
            stmt.query_map(rusqlite::params_from_iter(values), Self::map_competitor_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn map_competitor_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbCompetitor> {
        Ok(DbCompetitor {
            id: row.get(0)?,
            name: row.get(1)?,
            website: row.get(2)?,
            pricing: row.get(3)?,
            strengths: row.get(4)?,
            weaknesses: row.get(5)?,
            notes: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;
    use crate::store::{Condition, Direction};

    #[test]
    fn test_competitors_sorted_by_name() {
        let db = test_db();
        for (id, name) in [("k1", "Initech"), ("k2", "Globex"), ("k3", "Hooli")] {
            db.upsert_competitor(&DbCompetitor {
                id: id.to_string(),
                name: name.to_string(),
                website: None,
                pricing: None,
                strengths: None,
                weaknesses: None,
                notes: None,
                updated_at: "2026-01-01T00:00:00Z".to_string(),
            })
            .expect("upsert");
        }

        let all = db
            .get_competitors(&ReadQuery::new().order_by("name", Direction::Asc))
            .expect("read");
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Hooli", "Initech"]);

        let hooli = db
            .get_competitors(
                &ReadQuery::new().filter(Condition::Contains("name", "hoo".to_string())),
            )
            .expect("read");
        assert_eq!(hooli.len(), 1);
        assert_eq!(hooli[0].id, "k3");
    }
}
