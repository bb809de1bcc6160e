use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Account code already in use: {0}")]
    DuplicateAccountCode(String),

    #[error("Cannot move {code} under {parent}: the parent chain would loop")]
    CyclicParent { code: String, parent: String },

    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No prediction source is available: {0}")]
    PredictionUnavailable(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
