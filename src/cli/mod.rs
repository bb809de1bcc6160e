pub mod accounts;
pub mod assign;
pub mod history;
pub mod init;
pub mod patterns;
pub mod predict;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_db_path;

pub(crate) fn open_db() -> Result<rusqlite::Connection> {
    get_connection(&get_db_path())
}

#[derive(Parser)]
#[command(
    name = "ledgerhint",
    about = "Bookkeeping CLI that suggests chart-of-accounts entries for bank transactions."
)]
pub struct Cli {
    /// Log engine decisions to stderr (overridden by LEDGERHINT_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up ledgerhint: choose a data directory and initialize the database.
    Init {
        /// Path for ledgerhint data (default: ~/Documents/ledgerhint)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage the chart of accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage categorization patterns.
    Patterns {
        #[command(subcommand)]
        command: PatternsCommands,
    },
    /// Record and list transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Show ranked account suggestions for a transaction.
    Predict {
        /// Transaction ID
        id: i64,
        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Accept one of the suggestions for a transaction.
    Accept {
        /// Transaction ID
        id: i64,
        /// Suggestion to accept, 1 = best
        #[arg(long, default_value = "1")]
        rank: usize,
    },
    /// Assign a transaction to an account by hand.
    Assign {
        /// Transaction ID
        id: i64,
        /// Account code
        #[arg(long)]
        account: String,
        /// Free-text explanation
        #[arg(long)]
        explanation: Option<String>,
    },
    /// List learned description → account history.
    History,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add an account to the chart.
    Add {
        /// Unique account code, e.g. '5300'
        code: String,
        /// Display name, e.g. 'Software & Subscriptions'
        name: String,
        /// Classification: asset, liability, equity, income, expense
        #[arg(long)]
        kind: String,
        /// Parent account code
        #[arg(long)]
        parent: Option<String>,
    },
    /// List the chart of accounts.
    List,
    /// Deactivate an account (accounts are never deleted).
    Deactivate {
        /// Account code
        code: String,
    },
    /// Move an account under a new parent, or to the top level.
    Reparent {
        /// Account code
        code: String,
        /// New parent code (omit for top level)
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PatternsCommands {
    /// Add a categorization pattern.
    Add {
        /// Text to match against transaction descriptions
        pattern: String,
        /// Target account code
        #[arg(long)]
        account: String,
        /// Match mode: exact, fuzzy, keyword
        #[arg(long, default_value = "keyword")]
        mode: String,
        /// Static confidence weight between 0 and 1
        #[arg(long, default_value = "1.0")]
        weight: f64,
        /// Explanation template; {description} is replaced with the transaction text
        #[arg(long)]
        explanation: Option<String>,
    },
    /// List all patterns.
    List,
    /// Disable a pattern by ID.
    Disable {
        /// Pattern ID (shown in `ledgerhint patterns list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// Record a transaction.
    Add {
        /// Free-text description as it appears on the statement
        description: String,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Signed amount (negative for money out)
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
    },
    /// List transactions.
    List {
        /// Only transactions without an account
        #[arg(long)]
        unassigned: bool,
    },
}
