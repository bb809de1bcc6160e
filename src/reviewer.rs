use rusqlite::{Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::models::{PredictionSource, Transaction};

const TRANSACTION_COLUMNS: &str =
    "id, date, description, amount, explanation, account_id, confidence, source";

type TransactionRow = (
    i64,
    String,
    String,
    f64,
    Option<String>,
    Option<i64>,
    Option<f64>,
    Option<String>,
);

fn read_transaction_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn transaction_from_row(
    (id, date, description, amount, explanation, account_id, confidence, source): TransactionRow,
) -> Result<Transaction> {
    Ok(Transaction {
        id,
        date,
        description,
        amount,
        explanation,
        account_id,
        confidence,
        source: source.map(|s| s.parse()).transpose()?,
    })
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let row = conn
        .query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"),
            [id],
            read_transaction_row,
        )
        .optional()?
        .ok_or(LedgerError::TransactionNotFound(id))?;
    transaction_from_row(row)
}

pub fn get_transactions(conn: &Connection, unassigned_only: bool) -> Result<Vec<Transaction>> {
    let filter = if unassigned_only { "WHERE account_id IS NULL" } else { "" };
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions {filter} ORDER BY date, id"
    ))?;
    let rows = stmt
        .query_map([], read_transaction_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(transaction_from_row).collect()
}

/// What gets written back when a transaction is assigned to an account.
#[derive(Debug, Clone)]
pub struct Assignment<'a> {
    pub account_id: i64,
    pub explanation: Option<&'a str>,
    pub confidence: Option<f64>,
    pub source: Option<PredictionSource>,
}

/// Assigns the transaction and records the choice in `historical_matches`,
/// keyed by (description, account). Repeat assignments bump the frequency.
pub fn apply_assignment(conn: &Connection, transaction_id: i64, assignment: &Assignment<'_>) -> Result<()> {
    let txn = get_transaction(conn, transaction_id)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE transactions SET account_id = ?1, explanation = ?2, confidence = ?3, source = ?4 \
         WHERE id = ?5",
        rusqlite::params![
            assignment.account_id,
            assignment.explanation,
            assignment.confidence,
            assignment.source.map(|s| s.key()),
            transaction_id,
        ],
    )?;
    tx.execute(
        "INSERT INTO historical_matches (description, account_id, frequency, last_used, explanation) \
         VALUES (?1, ?2, 1, datetime('now'), COALESCE(?3, '')) \
         ON CONFLICT (description, account_id) DO UPDATE SET \
             frequency = frequency + 1, \
             last_used = datetime('now'), \
             explanation = COALESCE(?3, explanation)",
        rusqlite::params![txn.description, assignment.account_id, assignment.explanation],
    )?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_txn(conn: &Connection, description: &str) -> i64 {
        conn.execute(
            "INSERT INTO transactions (date, description, amount) VALUES ('2025-01-15', ?1, -50.0)",
            [description],
        ).unwrap();
        conn.last_insert_rowid()
    }

    fn account_id(conn: &Connection, code: &str) -> i64 {
        conn.query_row("SELECT id FROM accounts WHERE code = ?1", [code], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_get_transaction_missing_is_not_found() {
        let (_dir, conn) = test_db();
        let err = get_transaction(&conn, 42).unwrap_err();
        assert!(matches!(err, LedgerError::TransactionNotFound(42)));
    }

    #[test]
    fn test_apply_assignment_updates_transaction() {
        let (_dir, conn) = test_db();
        let txn_id = add_txn(&conn, "ADOBE CREATIVE");
        let acct = account_id(&conn, "5300");
        let assignment = Assignment {
            account_id: acct,
            explanation: Some("Design software"),
            confidence: Some(0.81),
            source: Some(PredictionSource::Pattern),
        };
        apply_assignment(&conn, txn_id, &assignment).unwrap();

        let txn = get_transaction(&conn, txn_id).unwrap();
        assert_eq!(txn.account_id, Some(acct));
        assert_eq!(txn.explanation.as_deref(), Some("Design software"));
        assert_eq!(txn.confidence, Some(0.81));
        assert_eq!(txn.source, Some(PredictionSource::Pattern));
    }

    #[test]
    fn test_repeat_assignment_increments_frequency() {
        let (_dir, conn) = test_db();
        let acct = account_id(&conn, "5300");
        for _ in 0..3 {
            let txn_id = add_txn(&conn, "ADOBE CREATIVE");
            let assignment = Assignment {
                account_id: acct,
                explanation: None,
                confidence: None,
                source: None,
            };
            apply_assignment(&conn, txn_id, &assignment).unwrap();
        }
        let (count, frequency): (i64, i64) = conn.query_row(
            "SELECT count(*), max(frequency) FROM historical_matches", [], |r| Ok((r.get(0)?, r.get(1)?)),
        ).unwrap();
        assert_eq!(count, 1);
        assert_eq!(frequency, 3);
    }

    #[test]
    fn test_explanation_kept_when_none_given() {
        let (_dir, conn) = test_db();
        let acct = account_id(&conn, "5300");
        let first = add_txn(&conn, "ADOBE CREATIVE");
        apply_assignment(&conn, first, &Assignment {
            account_id: acct,
            explanation: Some("Design software"),
            confidence: None,
            source: None,
        }).unwrap();
        let second = add_txn(&conn, "ADOBE CREATIVE");
        apply_assignment(&conn, second, &Assignment {
            account_id: acct,
            explanation: None,
            confidence: None,
            source: None,
        }).unwrap();
        let explanation: String = conn.query_row(
            "SELECT explanation FROM historical_matches", [], |r| r.get(0),
        ).unwrap();
        assert_eq!(explanation, "Design software");
    }

    #[test]
    fn test_different_account_gets_its_own_history_row() {
        let (_dir, conn) = test_db();
        for code in ["5300", "5900"] {
            let txn_id = add_txn(&conn, "ADOBE CREATIVE");
            apply_assignment(&conn, txn_id, &Assignment {
                account_id: account_id(&conn, code),
                explanation: None,
                confidence: None,
                source: None,
            }).unwrap();
        }
        let count: i64 = conn.query_row("SELECT count(*) FROM historical_matches", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_get_transactions_filters_unassigned() {
        let (_dir, conn) = test_db();
        let a = add_txn(&conn, "ONE");
        add_txn(&conn, "TWO");
        apply_assignment(&conn, a, &Assignment {
            account_id: account_id(&conn, "5900"),
            explanation: None,
            confidence: None,
            source: None,
        }).unwrap();
        assert_eq!(get_transactions(&conn, false).unwrap().len(), 2);
        let open = get_transactions(&conn, true).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].description, "TWO");
    }
}
