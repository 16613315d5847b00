//! Free-text question understanding: filter extraction and intent classification.
//!
//! Both are pure functions over the question text with no shared mutable
//! state; the compiled pattern tables are process-wide and read-only.

pub mod classifier;
pub mod filters;
pub mod intent;

pub use classifier::classify_query;
pub use filters::{extract_filters, QueryFilters, Stage};
pub use intent::{IntentType, ParsedIntent};
