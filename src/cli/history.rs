use std::collections::HashMap;

use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::repository::{query_accounts, query_history};

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let history = query_history(&conn)?;
    let accounts: HashMap<i64, String> = query_accounts(&conn)?
        .into_iter()
        .map(|a| (a.id, format!("{} {}", a.code, a.name)))
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["Description", "Account", "Uses", "Last Used", "Explanation"]);
    for h in history {
        table.add_row(vec![
            Cell::new(h.description),
            Cell::new(accounts.get(&h.account_id).cloned().unwrap_or_default()),
            Cell::new(h.frequency),
            Cell::new(h.last_used),
            Cell::new(h.explanation),
        ]);
    }
    println!("History\n{table}");
    Ok(())
}
