use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    parent_id INTEGER,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (parent_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    explanation TEXT,
    account_id INTEGER,
    confidence REAL,
    source TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS patterns (
    id INTEGER PRIMARY KEY,
    pattern TEXT NOT NULL,
    match_mode TEXT DEFAULT 'keyword',
    account_id INTEGER NOT NULL,
    explanation TEXT NOT NULL DEFAULT '',
    weight REAL DEFAULT 1.0,
    is_enabled INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS historical_matches (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    account_id INTEGER NOT NULL,
    frequency INTEGER NOT NULL DEFAULT 1,
    last_used TEXT NOT NULL DEFAULT (datetime('now')),
    explanation TEXT NOT NULL DEFAULT '',
    UNIQUE (description, account_id),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);
";

// (code, name, kind, parent code)
const DEFAULT_ACCOUNTS: &[(&str, &str, &str, Option<&str>)] = &[
    // Assets
    ("1000", "Cash & Bank", "asset", None),
    ("1010", "Business Checking", "asset", Some("1000")),
    ("1020", "Savings", "asset", Some("1000")),
    ("1200", "Accounts Receivable", "asset", None),
    // Liabilities
    ("2000", "Credit Card", "liability", None),
    ("2100", "Loans Payable", "liability", None),
    // Equity
    ("3000", "Owner's Equity", "equity", None),
    ("3100", "Owner Draw", "equity", Some("3000")),
    // Income
    ("4000", "Salary Income", "income", None),
    ("4100", "Client Services", "income", None),
    ("4200", "Interest Income", "income", None),
    // Expenses
    ("5000", "Rent / Lease", "expense", None),
    ("5100", "Utilities", "expense", None),
    ("5200", "Insurance", "expense", None),
    ("5300", "Software & Subscriptions", "expense", None),
    ("5400", "Bank & Merchant Fees", "expense", None),
    ("5500", "Travel", "expense", None),
    ("5600", "Meals", "expense", None),
    ("5900", "Uncategorized", "expense", None),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))?;
    if count == 0 {
        for (code, name, kind, parent) in DEFAULT_ACCOUNTS {
            conn.execute(
                "INSERT INTO accounts (code, name, kind, parent_id) \
                 VALUES (?1, ?2, ?3, (SELECT id FROM accounts WHERE code = ?4))",
                rusqlite::params![code, name, kind, parent],
            )?;
        }
    }
    Ok(())
}
