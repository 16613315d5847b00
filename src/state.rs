use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::db::PipelineDb;
use crate::handlers::QueryRouter;
use crate::store::SqliteStore;
use crate::types::Config;

/// Process-wide state shared by the binaries.
pub struct AppState {
    pub config: Config,
    pub router: Arc<QueryRouter>,
    pub store: SqliteStore,
}

impl AppState {
    /// Load config and open the database read-write.
    pub fn new() -> Result<Self, String> {
        let config = load_config()?;
        let path = database_path(&config)?;
        let store = SqliteStore::open(&path)
            .map_err(|e| format!("Failed to open database at {}: {}", path.display(), e))?;
        Ok(Self::from_parts(config, store))
    }

    /// Load config and open an existing database read-only.
    pub fn new_readonly() -> Result<Self, String> {
        let config = load_config()?;
        let path = database_path(&config)?;
        if !path.exists() {
            return Err(format!(
                "Database not found at {}. Run `dealdesk --seed` or point databasePath at an existing file.",
                path.display()
            ));
        }
        let store = SqliteStore::open_readonly(&path)
            .map_err(|e| format!("Failed to open database at {}: {}", path.display(), e))?;
        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Config, store: SqliteStore) -> Self {
        let router = Arc::new(QueryRouter::new(
            Arc::new(store.clone()),
            config.defaults.clone(),
        ));
        Self {
            config,
            router,
            store,
        }
    }
}

/// `~/.dealdesk`
pub fn get_state_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".dealdesk"))
}

/// Load `~/.dealdesk/config.json`. A missing file yields the defaults.
pub fn load_config() -> Result<Config, String> {
    let config_path = get_state_dir()?.join("config.json");
    load_config_from(&config_path)
}

pub fn load_config_from(config_path: &Path) -> Result<Config, String> {
    if !config_path.exists() {
        log::info!(
            "No config at {}; using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Resolve the database file from config, falling back to the default location.
pub fn database_path(config: &Config) -> Result<PathBuf, String> {
    match config.database_path.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => Ok(expand_home(p)),
        _ => PipelineDb::default_path().map_err(|e| e.to_string()),
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().unwrap_or_default().join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_database_path_override() {
        let config = Config {
            database_path: Some("/var/data/pipeline.db".to_string()),
            ..Default::default()
        };
        assert_eq!(
            database_path(&config).unwrap(),
            PathBuf::from("/var/data/pipeline.db")
        );
    }

    #[test]
    fn test_from_parts_wires_router() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("state.db")).unwrap();
        let state = AppState::from_parts(Config::default(), store);
        assert_eq!(state.router.defaults().silent_days, 14);
    }
}
