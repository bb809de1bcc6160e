use rusqlite::{Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountKind, MatchMode};
use crate::repository::query_account_by_code;

pub fn require_account(conn: &Connection, code: &str) -> Result<Account> {
    query_account_by_code(conn, code)?.ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))
}

pub fn add_account(
    conn: &Connection,
    code: &str,
    name: &str,
    kind: AccountKind,
    parent_code: Option<&str>,
) -> Result<i64> {
    let code = code.trim();
    if code.is_empty() || name.trim().is_empty() {
        return Err(LedgerError::InvalidInput("account code and name are required".into()));
    }
    if query_account_by_code(conn, code)?.is_some() {
        return Err(LedgerError::DuplicateAccountCode(code.to_string()));
    }
    let parent_id = parent_code
        .map(|p| require_account(conn, p).map(|a| a.id))
        .transpose()?;

    conn.execute(
        "INSERT INTO accounts (code, name, kind, parent_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![code, name.trim(), kind.key(), parent_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns false when the account was already inactive.
pub fn deactivate_account(conn: &Connection, code: &str) -> Result<bool> {
    let account = require_account(conn, code)?;
    if !account.is_active {
        return Ok(false);
    }
    conn.execute("UPDATE accounts SET is_active = 0 WHERE id = ?1", [account.id])?;
    Ok(true)
}

/// Moves `code` under `parent_code`, or to the top level when `None`.
pub fn reparent_account(conn: &Connection, code: &str, parent_code: Option<&str>) -> Result<()> {
    let account = require_account(conn, code)?;
    let parent_id = match parent_code {
        None => None,
        Some(p) => {
            let parent = require_account(conn, p)?;
            if creates_cycle(conn, account.id, parent.id)? {
                return Err(LedgerError::CyclicParent {
                    code: account.code,
                    parent: parent.code,
                });
            }
            Some(parent.id)
        }
    };
    conn.execute(
        "UPDATE accounts SET parent_id = ?1 WHERE id = ?2",
        rusqlite::params![parent_id, account.id],
    )?;
    Ok(())
}

/// True if `account_id` is `new_parent_id` or one of its ancestors.
fn creates_cycle(conn: &Connection, account_id: i64, new_parent_id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT parent_id FROM accounts WHERE id = ?1")?;
    let mut current = Some(new_parent_id);
    let mut steps = 0usize;
    while let Some(id) = current {
        if id == account_id {
            return Ok(true);
        }
        steps += 1;
        if steps > 10_000 {
            // Stored chain already loops.
            return Ok(true);
        }
        current = stmt
            .query_row([id], |row| row.get::<_, Option<i64>>(0))
            .optional()?
            .flatten();
    }
    Ok(false)
}

pub fn add_pattern(
    conn: &Connection,
    pattern: &str,
    account_code: &str,
    mode: MatchMode,
    weight: f64,
    explanation: Option<&str>,
) -> Result<i64> {
    if pattern.is_empty() {
        return Err(LedgerError::InvalidInput("pattern must not be empty".into()));
    }
    if !(0.0..=1.0).contains(&weight) {
        return Err(LedgerError::InvalidInput(format!("weight {weight} must be between 0 and 1")));
    }
    let account = require_account(conn, account_code)?;
    conn.execute(
        "INSERT INTO patterns (pattern, match_mode, account_id, explanation, weight) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![pattern, mode.key(), account.id, explanation.unwrap_or(""), weight],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns false when the pattern was already disabled.
pub fn disable_pattern(conn: &Connection, id: i64) -> Result<bool> {
    let enabled: Option<bool> = conn
        .query_row("SELECT is_enabled FROM patterns WHERE id = ?1", [id], |r| r.get(0))
        .optional()?;
    match enabled {
        None => Err(LedgerError::InvalidInput(format!("no pattern with ID {id}"))),
        Some(false) => Ok(false),
        Some(true) => {
            conn.execute("UPDATE patterns SET is_enabled = 0 WHERE id = ?1", [id])?;
            Ok(true)
        }
    }
}

pub fn add_transaction(conn: &Connection, date: &str, description: &str, amount: f64) -> Result<i64> {
    let date = chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| LedgerError::InvalidInput(format!("date '{date}' is not YYYY-MM-DD")))?;
    if !amount.is_finite() {
        return Err(LedgerError::InvalidInput("amount must be a finite number".into()));
    }
    conn.execute(
        "INSERT INTO transactions (date, description, amount) VALUES (?1, ?2, ?3)",
        rusqlite::params![date.format("%Y-%m-%d").to_string(), description, amount],
    )?;
    Ok(conn.last_insert_rowid())
}
