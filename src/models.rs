use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Classification of a chart-of-accounts node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountKind {
    pub const ALL: [AccountKind; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.key() == wanted)
            .ok_or_else(|| LedgerError::InvalidInput(format!("unknown account kind '{s}'")))
    }
}

/// How a pattern's string is compared against a transaction description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Fuzzy,
    Keyword,
}

impl MatchMode {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Keyword => "keyword",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MatchMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "fuzzy" => Ok(Self::Fuzzy),
            "keyword" => Ok(Self::Keyword),
            other => Err(LedgerError::MalformedPattern(format!("unknown match mode '{other}'"))),
        }
    }
}

/// Which engine source produced a prediction (and, once accepted, a transaction's assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Pattern,
    Database,
    Ai,
}

impl PredictionSource {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Database => "database",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PredictionSource {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pattern" => Ok(Self::Pattern),
            "database" => Ok(Self::Database),
            "ai" => Ok(Self::Ai),
            other => Err(LedgerError::InvalidInput(format!("unknown prediction source '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub explanation: Option<String>,
    pub account_id: Option<i64>,
    pub confidence: Option<f64>,
    pub source: Option<PredictionSource>,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: i64,
    pub pattern: String,
    pub mode: MatchMode,
    pub account_id: i64,
    pub explanation: String,
    pub weight: f64,
    pub is_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct HistoricalMatch {
    pub id: i64,
    pub description: String,
    pub account_id: i64,
    pub frequency: i64,
    pub last_used: String,
    pub explanation: String,
}

/// A ranked account suggestion. Built fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub explanation: String,
    pub account_id: i64,
    pub account_name: String,
    pub confidence: f64,
    #[serde(rename = "type")]
    pub source: PredictionSource,
}
