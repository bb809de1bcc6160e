use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::ledger::{add_pattern, disable_pattern};
use crate::models::MatchMode;
use crate::repository::{query_accounts, query_patterns};

pub fn add(
    pattern: &str,
    account: &str,
    mode: &str,
    weight: f64,
    explanation: Option<&str>,
) -> Result<()> {
    let mode: MatchMode = mode.parse()?;
    let conn = open_db()?;
    let id = add_pattern(&conn, pattern, account, mode, weight, explanation)?;
    println!("Added pattern {id}: '{pattern}' ({mode}, weight {weight}) \u{2192} {account}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let patterns = query_patterns(&conn, false)?;
    let accounts = query_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Mode", "Weight", "Account", "Explanation", "Enabled"]);
    for p in patterns {
        let account = accounts
            .iter()
            .find(|a| a.id == p.account_id)
            .map(|a| format!("{} {}", a.code, a.name))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(p.id),
            Cell::new(p.pattern),
            Cell::new(p.mode),
            Cell::new(format!("{:.2}", p.weight)),
            Cell::new(account),
            Cell::new(p.explanation),
            Cell::new(if p.is_enabled { "yes" } else { "no" }),
        ]);
    }
    println!("Patterns\n{table}");
    Ok(())
}

pub fn disable(id: i64) -> Result<()> {
    let conn = open_db()?;
    if disable_pattern(&conn, id)? {
        println!("Disabled pattern {id}");
    } else {
        println!("Pattern {id} is already disabled");
    }
    Ok(())
}
