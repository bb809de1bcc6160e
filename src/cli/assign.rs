use crate::cli::open_db;
use crate::cli::predict::suggestions;
use crate::error::{LedgerError, Result};
use crate::fmt::confidence;
use crate::ledger::require_account;
use crate::reviewer::{apply_assignment, Assignment};

pub async fn accept(id: i64, rank: usize) -> Result<()> {
    let (_txn, predictions) = suggestions(id).await?;
    if predictions.is_empty() {
        return Err(LedgerError::InvalidInput(format!("no suggestions for transaction {id}")));
    }
    let chosen = rank
        .checked_sub(1)
        .and_then(|i| predictions.get(i))
        .ok_or_else(|| {
            LedgerError::InvalidInput(format!(
                "rank must be between 1 and {}",
                predictions.len()
            ))
        })?;

    let conn = open_db()?;
    apply_assignment(
        &conn,
        id,
        &Assignment {
            account_id: chosen.account_id,
            explanation: Some(chosen.explanation.as_str()),
            confidence: Some(chosen.confidence),
            source: Some(chosen.source),
        },
    )?;
    println!(
        "Assigned transaction {id} \u{2192} {} ({} from {})",
        chosen.account_name,
        confidence(chosen.confidence),
        chosen.source
    );
    Ok(())
}

pub fn assign(id: i64, account: &str, explanation: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let acct = require_account(&conn, account)?;
    if !acct.is_active {
        return Err(LedgerError::InvalidInput(format!("account {account} is inactive")));
    }
    apply_assignment(
        &conn,
        id,
        &Assignment {
            account_id: acct.id,
            explanation,
            confidence: None,
            source: None,
        },
    )?;
    println!("Assigned transaction {id} \u{2192} {} {}", acct.code, acct.name);
    Ok(())
}
