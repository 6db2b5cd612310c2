use serde::{Deserialize, Serialize};

use super::board::DEFAULT_COLUMN;

/// Configuration from config.toml in the store directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub inbox: InboxConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Grouping mode for list views; unknown values mean "manual"
    #[serde(default = "default_group_by")]
    pub group_by: String,
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            group_by: default_group_by(),
            show_completed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxConfig {
    /// Id and name of the column a brand-new inbox starts with
    #[serde(default = "default_column")]
    pub default_column: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        InboxConfig {
            default_column: default_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Reject saves whose base version is stale
    #[serde(default = "default_true")]
    pub check_versions: bool,
    /// How long a write waits for another process holding the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            check_versions: true,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_group_by() -> String {
    "manual".to_string()
}

fn default_column() -> String {
    DEFAULT_COLUMN.to_string()
}
