use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Error type for reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read `config.toml` from the store directory. A missing file means defaults.
pub fn read_config(store_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = store_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(ConfigError::Read { path, source: e }),
    };
    toml::from_str(&text).map_err(|e| ConfigError::Parse { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.view.group_by, "manual");
        assert!(config.view.show_completed);
        assert_eq!(config.inbox.default_column, "Inbox");
        assert!(config.store.check_versions);
        assert_eq!(config.store.lock_timeout_ms, 5000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[view]\ngroup_by = \"priority\"\n\n[store]\ncheck_versions = false\n",
        )
        .unwrap();
        let config = read_config(tmp.path()).unwrap();
        assert_eq!(config.view.group_by, "priority");
        assert!(config.view.show_completed);
        assert!(!config.store.check_versions);
        assert_eq!(config.store.lock_timeout_ms, 5000);
        assert_eq!(config.inbox.default_column, "Inbox");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[view\ngroup_by = ").unwrap();
        assert!(matches!(read_config(tmp.path()), Err(ConfigError::Parse { .. })));
    }
}
