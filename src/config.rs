use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::churn::ChurnThresholds;
use crate::error::ConfigError;

/// Tunables for the derived views. Every field has a default, so a config
/// file only needs the keys it overrides:
///
/// ```json
/// { "top_users": 20, "churn": { "min_days_inactive": 14 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub churn: ChurnThresholds,
    /// Rows in the top revenue users table.
    pub top_users: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            churn: ChurnThresholds::default(),
            top_users: 10,
        }
    }
}

impl DashboardConfig {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_dashboard() {
        let config = DashboardConfig::default();
        assert_eq!(config.top_users, 10);
        assert_eq!(config.churn.max_sessions, 10);
        assert_eq!(config.churn.min_days_inactive, 7);
        assert_eq!(config.churn.limit, 10);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "churn": { "min_days_inactive": 14 } }"#).unwrap();

        let config = DashboardConfig::load_from(&path).unwrap();
        assert_eq!(config.churn.min_days_inactive, 14);
        assert_eq!(config.churn.max_sessions, 10);
        assert_eq!(config.top_users, 10);
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "{ top_users: ").unwrap();
        assert!(matches!(
            DashboardConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = DashboardConfig::load_from(Path::new("/tmp/no-such-dashboard.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/tmp/no-such-dashboard.json"));
    }
}
