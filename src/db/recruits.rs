use rusqlite::params;

use super::query::{build_select, TableSpec};
use super::*;
use crate::store::ReadQuery;

pub(crate) const RECRUITS: TableSpec = TableSpec {
    name: "recruits",
    columns: &[
        "id",
        "name",
        "role",
        "email",
        "stage",
        "last_contact",
        "created_at",
        "notes",
    ],
};

impl PipelineDb {
    // =========================================================================
    // Recruits
    // =========================================================================

    /// Insert or update a candidate.
    pub fn upsert_recruit(&self, recruit: &DbRecruit) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO recruits (
                id, name, role, email, stage, last_contact, created_at, notes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                role = excluded.role,
                email = excluded.email,
                stage = excluded.stage,
                last_contact = excluded.last_contact,
                notes = excluded.notes",
            params![
                recruit.id,
                recruit.name,
                recruit.role,
                recruit.email,
                recruit.stage,
                recruit.last_contact,
                recruit.created_at,
                recruit.notes,
            ],
        )?;
        Ok(())
    }

    /// Candidates matching a read query.
    pub fn get_recruits(&self, query: &ReadQuery) -> Result<Vec<DbRecruit>, DbError> {
        let (sql, values) = build_select(&RECRUITS, query)?;
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values), Self::map_recruit_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn map_recruit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbRecruit> {
        Ok(DbRecruit {
            id: row.get(0)?,
            name: row.get(1)?,
            role: row.get(2)?,
            email: row.get(3)?,
            stage: row.get(4)?,
            last_contact: row.get(5)?,
            created_at: row.get(6)?,
            notes: row.get(7)?,
        })
    }
}
