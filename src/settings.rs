use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::models::AccountKind;

pub const DB_FILE: &str = "ledgerhint.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: String,
    pub prediction: PredictionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            prediction: PredictionSettings::default(),
        }
    }
}

/// Tuning for the suggestion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSettings {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,
    #[serde(default = "default_min_pattern_confidence")]
    pub min_pattern_confidence: f64,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<KeywordRule>,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            per_source_limit: default_per_source_limit(),
            min_pattern_confidence: default_min_pattern_confidence(),
            keywords: default_keywords(),
        }
    }
}

/// One row of the heuristic keyword table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub kind: AccountKind,
    pub confidence: f64,
}

fn default_max_suggestions() -> usize {
    5
}

fn default_per_source_limit() -> usize {
    3
}

fn default_min_pattern_confidence() -> f64 {
    0.5
}

// (keyword, kind, confidence)
const DEFAULT_KEYWORDS: &[(&str, AccountKind, f64)] = &[
    ("salary", AccountKind::Income, 0.9),
    ("wages", AccountKind::Income, 0.85),
    ("rent", AccountKind::Expense, 0.85),
    ("interest", AccountKind::Income, 0.8),
    ("dividend", AccountKind::Income, 0.8),
    ("utilities", AccountKind::Expense, 0.75),
    ("insurance", AccountKind::Expense, 0.75),
    ("fee", AccountKind::Expense, 0.7),
    ("payment", AccountKind::Expense, 0.7),
    ("loan", AccountKind::Liability, 0.7),
    ("transfer", AccountKind::Asset, 0.6),
    ("deposit", AccountKind::Asset, 0.6),
];

pub fn default_keywords() -> Vec<KeywordRule> {
    DEFAULT_KEYWORDS
        .iter()
        .map(|&(keyword, kind, confidence)| KeywordRule {
            keyword: keyword.to_string(),
            kind,
            confidence,
        })
        .collect()
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ledgerhint")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("ledgerhint")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
