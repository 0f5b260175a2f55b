//! MobileCoin CLI - manage wallet accounts from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{balance, create, delete, export, history, import, list, logs, rename, send, server};
use mobwallet_core::{Error, LogEvent};

/// MobileCoin wallet client for a local full-service wallet server
#[derive(Parser)]
#[command(name = "mobilecoin", version, about, long_about = None)]
struct Cli {
    /// Print wallet server requests and retries
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the wallet server for the configured network
    Start {
        /// Do not connect to the network; use the local ledger only
        #[arg(long)]
        offline: bool,
        /// Run in the background, logging to the data directory
        #[arg(long)]
        bg: bool,
    },

    /// Stop the wallet server
    Stop,

    /// Create a new account
    Create {
        /// Account name
        #[arg(short, long)]
        name: Option<String>,
        /// Block to start syncing from
        #[arg(short, long)]
        block: Option<u64>,
    },

    /// Import an account from hex entropy, a 24-word seed phrase, or a seed file
    Import {
        /// Seed: 64 hex characters, quoted seed phrase, or path to an exported file
        seed: String,
        /// Account name
        #[arg(short, long)]
        name: Option<String>,
        /// Block to start syncing from (overrides the seed file)
        #[arg(short, long)]
        block: Option<u64>,
    },

    /// Export an account's secret seed to a file
    Export {
        /// Account id or unique prefix
        account: String,
        /// Output file (defaults to mobilecoin_seed_phrase_<id>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove an account from the wallet
    Delete {
        /// Account id or unique prefix
        account: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename an account
    Rename {
        /// Account id or unique prefix
        account: String,
        /// New name
        name: String,
    },

    /// List accounts and balances
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account's balance
    Balance {
        /// Account id or unique prefix
        account: String,
        /// Wait until the account has caught up with the ledger
        #[arg(long)]
        wait: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the transaction outputs of an account
    History {
        /// Account id or unique prefix
        account: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send MOB to another account or address
    Send {
        /// Sending account id or unique prefix
        from: String,
        /// Amount in MOB
        amount: String,
        /// Recipient account id prefix or public address
        to: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Return after submitting instead of waiting for the next block
        #[arg(long)]
        no_wait: bool,
    },

    /// View and manage the client event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Start { .. } => "start",
            Commands::Stop => "stop",
            Commands::Create { .. } => "create",
            Commands::Import { .. } => "import",
            Commands::Export { .. } => "export",
            Commands::Delete { .. } => "delete",
            Commands::Rename { .. } => "rename",
            Commands::List { .. } => "list",
            Commands::Balance { .. } => "balance",
            Commands::History { .. } => "history",
            Commands::Send { .. } => "send",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            if let Some(hint) = e.chain().find_map(|c| c.downcast_ref::<Error>()).and_then(Error::hint) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config()?;
    let logger = commands::get_logger(&config);
    let name = cli.command.name();
    if let Some(l) = &logger {
        let _ = l.log_command(name);
    }

    let result = dispatch(cli, config, &logger);

    let event = match &result {
        Ok(Some(account_id)) => LogEvent::new(format!("{}_completed", name)).with_account(account_id),
        Ok(None) => LogEvent::new(format!("{}_completed", name)),
        Err(e) => LogEvent::new(format!("{}_failed", name)).with_error(e.to_string()),
    };
    commands::log_event(&logger, event.with_command(name));

    result.map(|_| ())
}

/// Run a command; returns the account it acted on, if any
fn dispatch(
    cli: Cli,
    config: mobwallet_core::config::Config,
    logger: &Option<mobwallet_core::LoggingService>,
) -> Result<Option<String>> {
    if let Commands::Logs { command } = cli.command {
        let service = logger
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Could not open the event log in {}", config.data_dir().display()))?;
        logs::run(service, command)?;
        return Ok(None);
    }

    let ctx = commands::get_context(config, cli.verbose)?;

    match cli.command {
        Commands::Start { offline, bg } => server::start(&ctx, offline, bg).map(|_| None),
        Commands::Stop => server::stop(&ctx).map(|_| None),
        Commands::Create { name, block } => {
            create::run(&ctx, name.as_deref(), block).map(|a| Some(a.account_id))
        }
        Commands::Import { seed, name, block } => {
            import::run(&ctx, &seed, name.as_deref(), block).map(|a| Some(a.account_id))
        }
        Commands::Export { account, output, yes } => {
            export::run(&ctx, &account, output.as_deref(), yes)
        }
        Commands::Delete { account, yes } => delete::run(&ctx, &account, yes),
        Commands::Rename { account, name } => {
            rename::run(&ctx, &account, &name).map(|a| Some(a.account_id))
        }
        Commands::List { json } => list::run(&ctx, json).map(|_| None),
        Commands::Balance { account, wait, json } => {
            balance::run(&ctx, &account, wait, json).map(Some)
        }
        Commands::History { account, json } => history::run(&ctx, &account, json).map(Some),
        Commands::Send {
            from,
            amount,
            to,
            yes,
            no_wait,
        } => send::run(&ctx, &from, &amount, &to, yes, no_wait).map(Some),
        Commands::Logs { .. } => Ok(None),
    }
}
