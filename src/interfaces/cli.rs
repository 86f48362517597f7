//! Command-line front end: argument parsing, configuration and dispatch.

use crate::application::session::{HistoryOrder, SessionController};
use crate::domain::ports::SessionRepositoryBox;
use crate::error::{LedgerError, Result as LedgerResult};
use crate::infrastructure::in_memory::InMemoryRepository;
use crate::infrastructure::json_file::JsonFileRepository;
use crate::interfaces::console;
use crate::interfaces::csv::statement_writer::StatementWriter;
use clap::{Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Data directory used when neither `--data-dir` nor the platform default is
/// available.
pub const FALLBACK_DATA_DIR: &str = ".boardbank";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the saved session (players.json, history.json, sound.json)
    #[arg(long, env = "BOARDBANK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "BOARDBANK_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Never ring the terminal bell, whatever the sound setting
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Register a new player with a zero balance
    Add { name: String },
    /// Fill the table with sample players (Ana, Bruno, Caio, Diana)
    Sample,
    /// Pay money to a player
    Credit {
        name: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Take money from a player
    Debit {
        name: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List players and balances in registration order
    Players,
    /// Show players from richest to poorest
    Ranking,
    /// Show transactions, newest first
    History {
        /// List in the order the transactions happened instead
        #[arg(long)]
        oldest_first: bool,
    },
    /// End the game and announce the winner or the tie
    Finish,
    /// Erase every player and transaction
    Reset {
        /// Confirm the reset; nothing is erased without it
        #[arg(long)]
        yes: bool,
    },
    /// Turn sound feedback on or off
    Sound {
        #[arg(value_enum, default_value_t = SoundSetting::Toggle)]
        setting: SoundSetting,
    },
    /// Export balances and transactions as a CSV statement
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SoundSetting {
    On,
    Off,
    Toggle,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// The directory JSON records are kept in.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            ProjectDirs::from("dev", "boardbank", "boardbank")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
        })
    }
}

/// Sets up the stderr log subscriber.
pub fn init_tracing(level: tracing::Level) {
    use std::io::IsTerminal;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Picks the storage backend. If it cannot be opened the session still runs,
/// in memory only.
pub fn open_repository(cli: &Cli) -> SessionRepositoryBox {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = &cli.db_path {
        match crate::infrastructure::rocksdb::RocksDbRepository::open(db_path) {
            Ok(store) => return Box::new(store),
            Err(e) => {
                error!(error = %e, path = %db_path.display(), "cannot open database, keeping session in memory");
                return Box::new(InMemoryRepository::new());
            }
        }
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if cli.db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to JSON files."
        );
    }

    let dir = cli.resolved_data_dir();
    match JsonFileRepository::open(&dir) {
        Ok(store) => {
            info!(path = %store.dir().display(), "using JSON file storage");
            Box::new(store)
        }
        Err(e) => {
            error!(error = %e, path = %dir.display(), "cannot open data directory, keeping session in memory");
            Box::new(InMemoryRepository::new())
        }
    }
}

/// Loads the session, carries out one command and renders the result to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let mut session = SessionController::load(open_repository(&cli)).await;

    let outcome = match cli.command {
        Command::Players => {
            return console::render_players(out, session.players()).into_diagnostic();
        }
        Command::Ranking => {
            return console::render_ranking(out, &session.ranking()).into_diagnostic();
        }
        Command::History { oldest_first } => {
            let order = if oldest_first {
                HistoryOrder::Chronological
            } else {
                HistoryOrder::NewestFirst
            };
            return console::render_history(out, &session.history(order)).into_diagnostic();
        }
        Command::Export { output } => {
            return export(&session, output.as_deref(), out).into_diagnostic();
        }
        Command::Reset { yes: false } => {
            miette::bail!("refusing to reset without --yes")
        }
        Command::Reset { yes: true } => Ok(session.reset().await),
        Command::Add { name } => session.register_player(&name).await,
        Command::Sample => Ok(session.seed_sample_players().await),
        Command::Credit { name, amount } => session.credit(&name, amount.as_str()).await,
        Command::Debit { name, amount } => session.debit(&name, amount.as_str()).await,
        Command::Finish => session.finish_game(),
        Command::Sound { setting } => Ok(match setting {
            SoundSetting::On => session.set_sound(true).await,
            SoundSetting::Off => session.set_sound(false).await,
            SoundSetting::Toggle => session.toggle_sound().await,
        }),
    };

    if !cli.quiet
        && let Some(cue) = session.cue_for(&outcome)
    {
        console::play_cue(&mut io::stderr(), cue).into_diagnostic()?;
    }
    let event = outcome.into_diagnostic()?;
    console::render_event(out, &event).into_diagnostic()
}

fn export<W: Write>(session: &SessionController, output: Option<&Path>, out: &mut W) -> LedgerResult<()> {
    let history = session.ledger().history();
    match output {
        Some(path) => {
            if history.is_empty() {
                return Err(LedgerError::NothingToExport);
            }
            let file = File::create(path)?;
            StatementWriter::new(file).write_statement(session.players(), history)?;
            info!(path = %path.display(), "statement exported");
            Ok(())
        }
        None => StatementWriter::new(out).write_statement(session.players(), history),
    }
}
