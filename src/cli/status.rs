use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{load_settings, DB_FILE};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;

        let accounts: i64 = conn.query_row(
            "SELECT count(*) FROM accounts WHERE is_active = 1",
            [],
            |r| r.get(0),
        )?;
        let transactions: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
        let unassigned: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE account_id IS NULL",
            [],
            |r| r.get(0),
        )?;
        let patterns: i64 = conn.query_row(
            "SELECT count(*) FROM patterns WHERE is_enabled = 1",
            [],
            |r| r.get(0),
        )?;
        let history: i64 = conn.query_row("SELECT count(*) FROM historical_matches", [], |r| r.get(0))?;

        println!();
        println!("Accounts:      {accounts}");
        println!("Transactions:  {transactions}");
        println!("Unassigned:    {unassigned}");
        println!("Patterns:      {patterns}");
        println!("History:       {history}");
        println!("Keywords:      {}", settings.prediction.keywords.len());
    } else {
        println!();
        println!("Database not found. Run `ledgerhint init` to set up.");
    }

    Ok(())
}
