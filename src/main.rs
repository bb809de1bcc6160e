mod cli;
mod db;
mod error;
mod fmt;
mod ledger;
mod logging;
mod models;
mod predictor;
mod repository;
mod reviewer;
mod settings;
mod similarity;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands, PatternsCommands, TransactionsCommands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                code,
                name,
                kind,
                parent,
            } => cli::accounts::add(&code, &name, &kind, parent.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Deactivate { code } => cli::accounts::deactivate(&code),
            AccountsCommands::Reparent { code, parent } => {
                cli::accounts::reparent(&code, parent.as_deref())
            }
        },
        Commands::Patterns { command } => match command {
            PatternsCommands::Add {
                pattern,
                account,
                mode,
                weight,
                explanation,
            } => cli::patterns::add(&pattern, &account, &mode, weight, explanation.as_deref()),
            PatternsCommands::List => cli::patterns::list(),
            PatternsCommands::Disable { id } => cli::patterns::disable(id),
        },
        Commands::Transactions { command } => match command {
            TransactionsCommands::Add {
                description,
                date,
                amount,
            } => cli::transactions::add(&description, &date, amount),
            TransactionsCommands::List { unassigned } => cli::transactions::list(unassigned),
        },
        Commands::Predict { id, json } => cli::predict::run(id, json).await,
        Commands::Accept { id, rank } => cli::assign::accept(id, rank).await,
        Commands::Assign {
            id,
            account,
            explanation,
        } => cli::assign::assign(id, &account, explanation.as_deref()),
        Commands::History => cli::history::list(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
