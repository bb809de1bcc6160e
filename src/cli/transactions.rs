use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::{confidence, money};
use crate::ledger::add_transaction;
use crate::repository::query_accounts;
use crate::reviewer::get_transactions;

pub fn add(description: &str, date: &str, amount: f64) -> Result<()> {
    let conn = open_db()?;
    let id = add_transaction(&conn, date, description, amount)?;
    println!("Added transaction {id}: {date} {description} {}", money(amount));
    Ok(())
}

pub fn list(unassigned: bool) -> Result<()> {
    let conn = open_db()?;
    let txns = get_transactions(&conn, unassigned)?;
    let accounts = query_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Account", "Confidence", "Source", "Explanation"]);
    for t in txns {
        let amount = if t.amount < 0.0 {
            money(t.amount).red().to_string()
        } else {
            money(t.amount).green().to_string()
        };
        let account = match t.account_id {
            Some(id) => accounts
                .iter()
                .find(|a| a.id == id)
                .map(|a| format!("{} {}", a.code, a.name))
                .unwrap_or_default(),
            None => "unassigned".yellow().to_string(),
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(t.date),
            Cell::new(t.description),
            Cell::new(amount),
            Cell::new(account),
            Cell::new(t.confidence.map(confidence).unwrap_or_default()),
            Cell::new(t.source.map(|s| s.key()).unwrap_or_default()),
            Cell::new(t.explanation.unwrap_or_default()),
        ]);
    }
    println!("Transactions\n{table}");
    Ok(())
}
