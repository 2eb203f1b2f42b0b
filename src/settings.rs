use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::DEFAULT_PAGE_SIZE;
use crate::derive::{BalancePolicy, DeriveRules};
use crate::error::Result;
use crate::mutation::InsertPosition;
use crate::search::DEFAULT_DEBOUNCE;

pub const DB_FILE: &str = "campus.db";
pub const DEMO_DB_FILE: &str = "demo.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub balance_policy: BalancePolicy,
    #[serde(default)]
    pub insert_position: InsertPosition,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            balance_policy: BalancePolicy::default(),
            insert_position: InsertPosition::default(),
            page_size: default_page_size(),
            search_debounce_ms: default_debounce_ms(),
        }
    }
}

impl Settings {
    pub fn derive_rules(&self) -> DeriveRules {
        DeriveRules {
            balance: self.balance_policy,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// The database a command works on. Demo data lives in its own file
    /// and is only used when asked for explicitly.
    pub fn db_path(&self, demo: bool) -> PathBuf {
        let dir = PathBuf::from(&self.data_dir);
        if demo {
            dir.join(DEMO_DB_FILE)
        } else {
            dir.join(DB_FILE)
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("campus-ledger")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("campus-ledger")
}

fn parse_settings(content: &str) -> Result<Settings> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Settings::default();
    };
    match parse_settings(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.to_string_lossy());
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.balance_policy, BalancePolicy::Signed);
        assert_eq!(s.insert_position, InsertPosition::Append);
        assert_eq!(s.page_size, 20);
        assert_eq!(s.debounce(), Duration::from_millis(500));
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/campus", "balance_policy": "clamp_to_zero"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.balance_policy, BalancePolicy::ClampToZero);
        assert_eq!(s.insert_position, InsertPosition::Append);
        assert_eq!(s.search_debounce_ms, 500);
        assert_eq!(s.derive_rules().balance, BalancePolicy::ClampToZero);
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/srv/campus".to_string(),
            insert_position: InsertPosition::Prepend,
            page_size: 50,
            ..Settings::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_demo_db_is_separate() {
        let s = Settings {
            data_dir: "/srv/campus".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.db_path(false), PathBuf::from("/srv/campus/campus.db"));
        assert_eq!(s.db_path(true), PathBuf::from("/srv/campus/demo.db"));
    }

    #[test]
    fn test_shellexpand_tilde() {
        if let Some(home) = dirs::home_dir() {
            let expanded = shellexpand_path("~/books");
            assert_eq!(expanded, format!("{}/books", home.to_string_lossy()));
        }
    }

    #[test]
    fn test_corrupt_settings_are_a_json_error() {
        let err = parse_settings("{\"data_dir\": ").unwrap_err();
        assert!(matches!(err, crate::error::CmsError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
