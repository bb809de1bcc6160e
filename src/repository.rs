//! Read-only lookups the prediction engine depends on.
//!
//! The engine only sees the three traits; `SqliteStore` is the one
//! implementation shipped with the CLI.

use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use crate::db::get_connection;
use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountKind, HistoricalMatch, MatchMode, Pattern};

#[async_trait]
pub trait PatternRepository: Send + Sync {
    /// Enabled patterns in creation order.
    async fn enabled_patterns(&self) -> Result<Vec<Pattern>>;
}

#[async_trait]
pub trait HistoricalMatchRepository: Send + Sync {
    /// Records whose description contains, or is contained in, `description`,
    /// most frequent first, then most recently used.
    async fn overlapping(&self, description: &str) -> Result<Vec<HistoricalMatch>>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_active(&self, id: i64) -> Result<Option<Account>>;

    /// The active account of `kind` with the lowest id.
    async fn first_active_of_kind(&self, kind: AccountKind) -> Result<Option<Account>>;
}

/// SQLite-backed store. Each call opens its own connection on the blocking
/// pool so concurrent lookups do not serialize on one handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_connection(&path)?;
            f(&conn)
        })
        .await?
    }
}

const ACCOUNT_COLUMNS: &str = "id, code, name, kind, parent_id, is_active";

type AccountRow = (i64, String, String, String, Option<i64>, bool);

fn read_account_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn account_from_row((id, code, name, kind, parent_id, is_active): AccountRow) -> Result<Account> {
    Ok(Account {
        id,
        code,
        name,
        kind: kind.parse()?,
        parent_id,
        is_active,
    })
}

pub fn query_active_account(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1 AND is_active = 1"),
            [id],
            read_account_row,
        )
        .optional()?;
    row.map(account_from_row).transpose()
}

pub fn query_account_by_code(conn: &Connection, code: &str) -> Result<Option<Account>> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE code = ?1"),
            [code],
            read_account_row,
        )
        .optional()?;
    row.map(account_from_row).transpose()
}

pub fn query_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY code"))?;
    let rows = stmt
        .query_map([], read_account_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(account_from_row).collect()
}

fn query_first_active_of_kind(conn: &Connection, kind: AccountKind) -> Result<Option<Account>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE kind = ?1 AND is_active = 1 \
                 ORDER BY id LIMIT 1"
            ),
            [kind.key()],
            read_account_row,
        )
        .optional()?;
    row.map(account_from_row).transpose()
}

pub fn query_patterns(conn: &Connection, enabled_only: bool) -> Result<Vec<Pattern>> {
    let sql = if enabled_only {
        "SELECT id, pattern, match_mode, account_id, explanation, weight, is_enabled \
         FROM patterns WHERE is_enabled = 1 ORDER BY id"
    } else {
        "SELECT id, pattern, match_mode, account_id, explanation, weight, is_enabled \
         FROM patterns ORDER BY id"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<(i64, String, String, i64, String, f64, bool)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, pattern, mode, account_id, explanation, weight, is_enabled)| {
            if !(0.0..=1.0).contains(&weight) {
                return Err(LedgerError::MalformedPattern(format!(
                    "pattern {id} has weight {weight} outside [0, 1]"
                )));
            }
            Ok(Pattern {
                id,
                pattern,
                mode: mode.parse()?,
                account_id,
                explanation,
                weight,
                is_enabled,
            })
        })
        .collect()
}

pub fn query_history(conn: &Connection) -> Result<Vec<HistoricalMatch>> {
    let mut stmt = conn.prepare(
        "SELECT id, description, account_id, frequency, last_used, explanation \
         FROM historical_matches \
         ORDER BY frequency DESC, last_used DESC, id ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(HistoricalMatch {
                id: row.get(0)?,
                description: row.get(1)?,
                account_id: row.get(2)?,
                frequency: row.get(3)?,
                last_used: row.get(4)?,
                explanation: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Overlap is tested in Rust because SQLite's `lower()` only folds ASCII.
pub fn query_overlapping_history(conn: &Connection, description: &str) -> Result<Vec<HistoricalMatch>> {
    if description.trim().is_empty() {
        return Ok(Vec::new());
    }
    let wanted = description.to_lowercase();
    Ok(query_history(conn)?
        .into_iter()
        .filter(|h| {
            let stored = h.description.to_lowercase();
            !stored.is_empty() && (wanted.contains(&stored) || stored.contains(&wanted))
        })
        .collect())
}

#[async_trait]
impl PatternRepository for SqliteStore {
    async fn enabled_patterns(&self) -> Result<Vec<Pattern>> {
        self.with_conn(|conn| query_patterns(conn, true)).await
    }
}

#[async_trait]
impl HistoricalMatchRepository for SqliteStore {
    async fn overlapping(&self, description: &str) -> Result<Vec<HistoricalMatch>> {
        let description = description.to_string();
        self.with_conn(move |conn| query_overlapping_history(conn, &description))
            .await
    }
}

#[async_trait]
impl AccountRepository for SqliteStore {
    async fn find_active(&self, id: i64) -> Result<Option<Account>> {
        self.with_conn(move |conn| query_active_account(conn, id)).await
    }

    async fn first_active_of_kind(&self, kind: AccountKind) -> Result<Option<Account>> {
        self.with_conn(move |conn| query_first_active_of_kind(conn, kind))
            .await
    }
}
