//! DealDesk: answer free-text questions about a sales pipeline, a hiring
//! pipeline and tracked competitors.
//!
//! A question flows through [`query::classify_query`] (filters + intent), then
//! [`handlers::QueryRouter`] dispatches it to exactly one handler, which reads
//! through the [`store::RecordStore`] trait and returns a
//! [`envelope::ResponseEnvelope`]. [`commands`] is the request boundary used by
//! the binaries.

pub mod commands;
pub mod db;
pub mod devtools;
pub mod envelope;
pub mod error;
pub mod handlers;
mod migrations;
pub mod query;
pub mod state;
pub mod store;
pub mod types;
pub mod util;

pub use commands::{handle_query_request, handle_raw_request, QueryResponse, ResponseStatus};
pub use envelope::ResponseEnvelope;
pub use handlers::QueryRouter;
pub use query::{classify_query, IntentType, ParsedIntent};
