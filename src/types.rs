use serde::{Deserialize, Serialize};

use crate::query::Stage;

/// Application configuration stored in `~/.dealdesk/config.json`.
///
/// Every field is optional on disk; an empty object is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// SQLite file to read. Defaults to `~/.dealdesk/dealdesk.db`.
    pub database_path: Option<String>,
    pub defaults: HandlerDefaults,
}

/// Values handlers fall back to when a question leaves a filter unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandlerDefaults {
    /// Silent-deals lookback.
    pub silent_days: u32,
    /// Customer-health lookback.
    pub health_days: u32,
    /// Pipeline-by-value threshold.
    pub min_value: f64,
    /// Pipeline-by-stage stage.
    pub sales_stage: Stage,
    /// Recruitment-by-stage stage.
    pub recruiting_stage: Stage,
    /// Maximum rows returned in `data`.
    pub result_limit: usize,
}

impl Default for HandlerDefaults {
    fn default() -> Self {
        Self {
            silent_days: 14,
            health_days: 30,
            min_value: 1000.0,
            sales_stage: Stage::Negotiating,
            recruiting_stage: Stage::Interview,
            result_limit: 50,
        }
    }
}
