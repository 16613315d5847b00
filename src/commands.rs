//! Request boundary.
//!
//! Turns a raw `{ "query": ... }` request into a status plus envelope. Nothing
//! raised during classification or dispatch escapes this module: store failures
//! are already envelopes by the time they get here, and a panicking task is
//! converted into the server-error envelope.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::envelope::ResponseEnvelope;
use crate::error::RequestError;
use crate::handlers::QueryRouter;
use crate::query::IntentType;

pub const INVALID_REQUEST_TITLE: &str = "Invalid request";
const INVALID_REQUEST_SUMMARY: &str =
    "Send a JSON object with a non-empty \"query\" string, like {\"query\": \"Show my pipeline\"}.";
const INTERNAL_ERROR_SUMMARY: &str =
    "Something went wrong while answering that question. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    BadRequest,
    InternalError,
}

impl ResponseStatus {
    pub fn http_code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub status: ResponseStatus,
    pub body: ResponseEnvelope,
}

impl QueryResponse {
    fn bad_request() -> Self {
        Self {
            status: ResponseStatus::BadRequest,
            body: ResponseEnvelope::new(
                IntentType::General,
                INVALID_REQUEST_TITLE,
                INVALID_REQUEST_SUMMARY,
            ),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: ResponseStatus::InternalError,
            body: ResponseEnvelope::error(IntentType::General, INTERNAL_ERROR_SUMMARY),
        }
    }
}

/// Pull the question out of a request body.
pub fn parse_request(payload: &Value) -> Result<String, RequestError> {
    let Some(fields) = payload.as_object() else {
        return Err(RequestError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    match fields.get("query") {
        None | Some(Value::Null) => Err(RequestError::MissingQuery),
        Some(Value::String(query)) if query.trim().is_empty() => Err(RequestError::EmptyQuery),
        Some(Value::String(query)) => Ok(query.clone()),
        Some(_) => Err(RequestError::InvalidQuery),
    }
}

/// Answer a parsed JSON request.
pub async fn handle_query_request(router: Arc<QueryRouter>, payload: &Value) -> QueryResponse {
    match parse_request(payload) {
        Ok(query) => answer(router, query).await,
        Err(e) => {
            log::info!("Rejected request: {}", e);
            QueryResponse::bad_request()
        }
    }
}

/// Answer a request given as raw JSON text.
pub async fn handle_raw_request(router: Arc<QueryRouter>, raw: &str) -> QueryResponse {
    match serde_json::from_str::<Value>(raw) {
        Ok(payload) => handle_query_request(router, &payload).await,
        Err(e) => {
            log::info!("Rejected request: {}", RequestError::from(e));
            QueryResponse::bad_request()
        }
    }
}

async fn answer(router: Arc<QueryRouter>, query: String) -> QueryResponse {
    let task = tokio::spawn(async move { router.ask(&query).await });
    match task.await {
        Ok(body) => QueryResponse {
            status: ResponseStatus::Ok,
            body,
        },
        Err(e) => {
            log::error!("Query task failed: {}", e);
            QueryResponse::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbCompetitor, DbCustomer, DbRecruit};
    use crate::envelope::ERROR_TITLE;
    use crate::error::StoreError;
    use crate::handlers::test_support::FakeStore;
    use crate::store::{ReadQuery, RecordStore};
    use crate::types::HandlerDefaults;
    use async_trait::async_trait;
    use serde_json::json;

    struct PanickingStore;

    #[async_trait]
    impl RecordStore for PanickingStore {
        async fn customers(&self, _query: &ReadQuery) -> Result<Vec<DbCustomer>, StoreError> {
            panic!("customers table vanished");
        }

        async fn recruits(&self, _query: &ReadQuery) -> Result<Vec<DbRecruit>, StoreError> {
            panic!("recruits table vanished");
        }

        async fn competitors(&self, _query: &ReadQuery) -> Result<Vec<DbCompetitor>, StoreError> {
            panic!("competitors table vanished");
        }
    }

    fn router() -> Arc<QueryRouter> {
        Arc::new(QueryRouter::new(
            Arc::new(FakeStore::default()),
            HandlerDefaults::default(),
        ))
    }

    #[test]
    fn test_parse_request() {
        assert_eq!(
            parse_request(&json!({ "query": "Show my pipeline" })).unwrap(),
            "Show my pipeline"
        );
        assert!(matches!(
            parse_request(&json!({})),
            Err(RequestError::MissingQuery)
        ));
        assert!(matches!(
            parse_request(&json!({ "query": null })),
            Err(RequestError::MissingQuery)
        ));
        assert!(matches!(
            parse_request(&json!({ "query": 42 })),
            Err(RequestError::InvalidQuery)
        ));
        assert!(matches!(
            parse_request(&json!({ "query": "   " })),
            Err(RequestError::EmptyQuery)
        ));
        assert!(matches!(
            parse_request(&json!(["query"])),
            Err(RequestError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_ok_response() {
        let response = handle_query_request(router(), &json!({ "query": "banana" })).await;
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.status.http_code(), 200);
        assert_eq!(response.body.intent, IntentType::General);
    }

    #[tokio::test]
    async fn test_bad_requests() {
        for raw in ["not json", "{}", r#"{"query": ""}"#, r#"{"query": 7}"#] {
            let response = handle_raw_request(router(), raw).await;
            assert_eq!(response.status, ResponseStatus::BadRequest, "{}", raw);
            assert_eq!(response.status.http_code(), 400);
            assert_eq!(response.body.intent, IntentType::General);
            assert_eq!(response.body.title, INVALID_REQUEST_TITLE);
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let router = Arc::new(QueryRouter::new(
            Arc::new(PanickingStore),
            HandlerDefaults::default(),
        ));
        let response =
            handle_query_request(router, &json!({ "query": "Show my pipeline" })).await;
        assert_eq!(response.status, ResponseStatus::InternalError);
        assert_eq!(response.status.http_code(), 500);
        assert_eq!(response.body.intent, IntentType::General);
        assert_eq!(response.body.title, ERROR_TITLE);
        assert!(response.body.data.is_none());
    }

    #[tokio::test]
    async fn test_response_serialization() {
        let response = handle_raw_request(router(), r#"{"query": "banana"}"#).await;
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["body"]["type"], "general");
    }
}
