//! Translate a `ReadQuery` into parameterized SQL.
//!
//! Field names never reach SQL unless they are on the table's column allowlist;
//! every value is a bound parameter.

use rusqlite::types::Value;

use super::DbError;
use crate::store::{Condition, Direction, FieldValue, ReadQuery};

/// A table the query builder may read from.
pub(crate) struct TableSpec {
    pub name: &'static str,
    /// Selected in this order; row mappers index into it.
    pub columns: &'static [&'static str],
}

impl TableSpec {
    fn check(&self, field: &str) -> Result<(), DbError> {
        if self.columns.contains(&field) {
            Ok(())
        } else {
            Err(DbError::UnknownField {
                table: self.name,
                field: field.to_string(),
            })
        }
    }
}

fn bind(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Number(n) => Value::Real(*n),
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Build `SELECT <columns> FROM <table> WHERE ... ORDER BY ... LIMIT ...`.
pub(crate) fn build_select(
    table: &TableSpec,
    query: &ReadQuery,
) -> Result<(String, Vec<Value>), DbError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    for condition in &query.conditions {
        for field in condition.fields() {
            table.check(field)?;
        }
        match condition {
            Condition::Eq(field, value) => {
                clauses.push(format!("{} = ?", field));
                params.push(bind(value));
            }
            Condition::NotIn(field, values) => {
                if values.is_empty() {
                    continue;
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                clauses.push(format!("{} NOT IN ({})", field, placeholders));
                params.extend(values.iter().map(bind));
            }
            Condition::Gte(field, value) => {
                clauses.push(format!("{} >= ?", field));
                params.push(bind(value));
            }
            Condition::Lte(field, value) => {
                clauses.push(format!("{} <= ?", field));
                params.push(bind(value));
            }
            Condition::Lt(field, value) => {
                clauses.push(format!("{} < ?", field));
                params.push(bind(value));
            }
            Condition::Contains(field, needle) => {
                clauses.push(format!("LOWER({}) LIKE ? ESCAPE '\\'", field));
                params.push(Value::Text(like_pattern(needle)));
            }
            Condition::AnyContains(fields, needle) => {
                if fields.is_empty() {
                    continue;
                }
                let ors = fields
                    .iter()
                    .map(|f| format!("LOWER({}) LIKE ? ESCAPE '\\'", f))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                clauses.push(format!("({})", ors));
                for _ in fields {
                    params.push(Value::Text(like_pattern(needle)));
                }
            }
        }
    }

    let mut sql = format!("SELECT {} FROM {}", table.columns.join(", "), table.name);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    match &query.order_by {
        Some(order) => {
            table.check(order.field)?;
            let dir = match order.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            // Stable tie-break so equal sort keys come back in a fixed order.
            sql.push_str(&format!(" ORDER BY {} {}, id ASC", order.field, dir));
        }
        None => sql.push_str(" ORDER BY id ASC"),
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(limit as i64));
    }

    Ok((sql, params))
}
