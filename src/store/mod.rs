//! Read-only query interface over the three record collections.
//!
//! The router never writes. Handlers describe what they want as a `ReadQuery`
//! (conditions are ANDed, then ordered, then limited) and the backing store
//! decides how to run it.

use async_trait::async_trait;

use crate::db::{DbCompetitor, DbCustomer, DbRecruit};
use crate::error::StoreError;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// A comparison operand.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// A single predicate on a named field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, FieldValue),
    NotIn(&'static str, Vec<FieldValue>),
    Gte(&'static str, FieldValue),
    Lte(&'static str, FieldValue),
    Lt(&'static str, FieldValue),
    /// Case-insensitive substring match.
    Contains(&'static str, String),
    /// Case-insensitive substring match on any of the fields.
    AnyContains(Vec<&'static str>, String),
}

impl Condition {
    /// Field names this condition reads.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::Eq(f, _)
            | Self::NotIn(f, _)
            | Self::Gte(f, _)
            | Self::Lte(f, _)
            | Self::Lt(f, _)
            | Self::Contains(f, _) => vec![*f],
            Self::AnyContains(fields, _) => fields.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: Direction,
}

/// Filter, sort, and limit for one read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadQuery {
    pub conditions: Vec<Condition>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl ReadQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: &'static str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy { field, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read access to the business records.
///
/// Implementations must be safe to call concurrently; meeting prep issues
/// reads against all three collections at once.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn customers(&self, query: &ReadQuery) -> Result<Vec<DbCustomer>, StoreError>;

    async fn recruits(&self, query: &ReadQuery) -> Result<Vec<DbRecruit>, StoreError>;

    async fn competitors(&self, query: &ReadQuery) -> Result<Vec<DbCompetitor>, StoreError>;
}
