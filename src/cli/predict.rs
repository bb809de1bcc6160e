use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::{confidence, money};
use crate::models::{Prediction, Transaction};
use crate::predictor::Predictor;
use crate::repository::SqliteStore;
use crate::reviewer::get_transaction;
use crate::settings::{get_db_path, load_settings};

/// Loads the transaction and runs the engine against the configured database.
pub async fn suggestions(id: i64) -> Result<(Transaction, Vec<Prediction>)> {
    let settings = load_settings();
    let txn = {
        let conn = open_db()?;
        get_transaction(&conn, id)?
    };
    let predictor = Predictor::from_store(SqliteStore::new(get_db_path()), &settings.prediction);
    let predictions = predictor.predict(&txn).await?;
    Ok((txn, predictions))
}

pub async fn run(id: i64, json: bool) -> Result<()> {
    let (txn, predictions) = suggestions(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    println!(
        "{} {}  {}  {}",
        format!("#{}", txn.id).bold(),
        txn.date,
        txn.description,
        money(txn.amount)
    );
    if predictions.is_empty() {
        println!("{}", "No suggestions available.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Rank", "Account", "Confidence", "Source", "Explanation"]);
    for (i, p) in predictions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&p.account_name),
            Cell::new(confidence(p.confidence)),
            Cell::new(p.source),
            Cell::new(&p.explanation),
        ]);
    }
    println!("{table}");
    println!("Accept one with `ledgerhint accept {} --rank N`.", txn.id);
    Ok(())
}
