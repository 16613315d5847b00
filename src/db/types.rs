//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::Stage;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Unknown field \"{field}\" on table {table}")]
    UnknownField { table: &'static str, field: String },
}

/// A row from the `customers` table (sales pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbCustomer {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub stage: String,
    pub value: f64,
    pub last_contact: Option<String>,
    pub created_at: String,
    pub notes: Option<String>,
}

impl DbCustomer {
    pub fn stage(&self) -> Option<Stage> {
        Stage::parse(&self.stage)
    }

    /// Company if known, otherwise the contact's name.
    pub fn display_name(&self) -> &str {
        self.company
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// A row from the `recruits` table (hiring pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbRecruit {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub stage: String,
    pub last_contact: Option<String>,
    pub created_at: String,
    pub notes: Option<String>,
}

impl DbRecruit {
    pub fn stage(&self) -> Option<Stage> {
        Stage::parse(&self.stage)
    }
}

/// A row from the `competitors` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbCompetitor {
    pub id: String,
    pub name: String,
    pub website: Option<String>,
    pub pricing: Option<String>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    pub notes: Option<String>,
    pub updated_at: String,
}
