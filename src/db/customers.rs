use rusqlite::params;

use super::query::{build_select, TableSpec};
use super::*;
use crate::store::ReadQuery;

pub(crate) const CUSTOMERS: TableSpec = TableSpec {
    name: "customers",
    columns: &[
        "id",
        "name",
        "company",
        "email",
        "stage",
        "value",
        "last_contact",
        "created_at",
        "notes",
    ],
};

impl PipelineDb {
    // =========================================================================
    // Customers
    // =========================================================================

    /// Insert or update a customer.
    pub fn upsert_customer(&self, customer: &DbCustomer) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO customers (
                id, name, company, email, stage, value, last_contact, created_at, notes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                company = excluded.company,
                email = excluded.email,
                stage = excluded.stage,
                value = excluded.value,
                last_contact = excluded.last_contact,
                notes = excluded.notes",
            params![
                customer.id,
                customer.name,
                customer.company,
                customer.email,
                customer.stage,
                customer.value,
                customer.last_contact,
                customer.created_at,
                customer.notes,
            ],
        )?;
        Ok(())
    }

    /// Customers matching a read query.
    pub fn get_customers(&self, query: &ReadQuery) -> Result<Vec<DbCustomer>, DbError> {
        let (sql, values) = build_select(&CUSTOMERS, query)?;
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values), Self::map_customer_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub(crate) fn map_customer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbCustomer> {
        Ok(DbCustomer {
            id: row.get(0)?,
            name: row.get(1)?,
            company: row.get(2)?,
            email: row.get(3)?,
            stage: row.get(4)?,
            value: row.get(5)?,
            last_contact: row.get(6)?,
            created_at: row.get(7)?,
            notes: row.get(8)?,
        })
    }
}
