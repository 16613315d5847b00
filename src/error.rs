//! Error types for the query boundary and the record store.
//!
//! Errors are classified by where they stop:
//! - RequestError: rejected at the boundary, never reaches the classifier
//! - StoreError: recovered by the dispatcher into an error envelope

use thiserror::Error;

use crate::db::DbError;

/// Why an incoming request was rejected before classification.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Request is missing the \"query\" field")]
    MissingQuery,

    #[error("The \"query\" field must be a string")]
    InvalidQuery,

    #[error("The \"query\" field must not be empty")]
    EmptyQuery,
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Malformed(err.to_string())
    }
}

/// A read against the record store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Store task failed: {0}")]
    Join(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Short human-readable cause for an error envelope summary.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Database(DbError::UnknownField { table, field }) => {
                format!("The {} data has no \"{}\" field.", table, field)
            }
            StoreError::Database(_) => {
                "The database could not answer that question right now.".to_string()
            }
            StoreError::Join(_) => "The lookup was interrupted before it finished.".to_string(),
            StoreError::Unavailable(reason) => format!("The data store is unavailable: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_from_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let req: RequestError = err.into();
        assert!(matches!(req, RequestError::Malformed(_)));
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::Unavailable("offline".to_string());
        assert_eq!(err.user_message(), "The data store is unavailable: offline");

        let err = StoreError::from(DbError::UnknownField {
            table: "customers",
            field: "ssn".to_string(),
        });
        assert!(err.user_message().contains("\"ssn\""));
    }
}
