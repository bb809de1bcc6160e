use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::ledger::{add_account, deactivate_account, reparent_account};
use crate::models::AccountKind;
use crate::repository::query_accounts;

pub fn add(code: &str, name: &str, kind: &str, parent: Option<&str>) -> Result<()> {
    let kind: AccountKind = kind.parse()?;
    let conn = open_db()?;
    add_account(&conn, code, name, kind, parent)?;
    println!("Added account: {code} {name} ({kind})");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let accounts = query_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["Code", "Name", "Kind", "Parent", "Active"]);
    for acct in &accounts {
        let parent = acct
            .parent_id
            .and_then(|pid| accounts.iter().find(|a| a.id == pid))
            .map(|p| p.code.clone())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&acct.code),
            Cell::new(&acct.name),
            Cell::new(acct.kind),
            Cell::new(parent),
            Cell::new(if acct.is_active { "yes" } else { "no" }),
        ]);
    }
    println!("Chart of Accounts\n{table}");
    Ok(())
}

pub fn deactivate(code: &str) -> Result<()> {
    let conn = open_db()?;
    if deactivate_account(&conn, code)? {
        println!("Deactivated account {code}");
    } else {
        println!("Account {code} is already inactive");
    }
    Ok(())
}

pub fn reparent(code: &str, parent: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    reparent_account(&conn, code, parent)?;
    match parent {
        Some(p) => println!("Moved account {code} under {p}"),
        None => println!("Moved account {code} to the top level"),
    }
    Ok(())
}
