//! Developer CLI for a `kvsqlite` store with text keys and values.
//!
//! ```bash
//! kvsqlite --db data.db put key1 value1
//! kvsqlite --db data.db get key1
//! printf 'put a 1\ndel key1\n' | kvsqlite --db data.db --sync batch
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use kvsqlite::{Db, Options, WriteOptions};
use tracing_subscriber::EnvFilter;

mod script;

/// Read and write a `SQLite`-backed key-value store.
#[derive(Parser, Debug)]
#[command(name = "kvsqlite", version, about, long_about = None)]
struct Cli {
    /// Path to the database file (`:memory:` or an empty string for a
    /// throwaway store)
    #[arg(long, env = "KVSQLITE_DB", default_value = "kvsqlite.db")]
    db: PathBuf,

    /// Fail instead of creating the database file when it is missing
    #[arg(long)]
    no_create: bool,

    /// Fail if the database file already exists
    #[arg(long)]
    error_if_exists: bool,

    /// Flush writes to disk before returning
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set KEY to VALUE
    Put {
        /// Key to write
        key: String,
        /// Value to store
        value: String,
    },
    /// Print the value stored under KEY; exits with status 1 if it is absent
    Get {
        /// Key to look up
        key: String,
    },
    /// Remove KEY
    Del {
        /// Key to remove
        key: String,
    },
    /// Apply `put KEY VALUE` / `del KEY` lines from stdin atomically
    Batch,
}

impl Cli {
    const fn options(&self) -> Options {
        Options {
            create_if_missing: !self.no_create,
            error_if_exists: self.error_if_exists,
        }
    }

    const fn write_options(&self) -> WriteOptions {
        WriteOptions { sync: self.sync }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Db::<String, String>::open(&cli.options(), &cli.db)
        .wrap_err_with(|| format!("opening {}", cli.db.display()))?;
    let write_options = cli.write_options();

    match &cli.command {
        Command::Put { key, value } => {
            db.put(&write_options, key.as_str(), value.as_str())
                .wrap_err("put failed")?;
        }
        Command::Get { key } => match db.get(key.as_str()) {
            Ok(value) => println!("{value}"),
            Err(status) if status.is_not_found() => {
                eprintln!("{key}: not found");
                return Ok(ExitCode::FAILURE);
            }
            Err(status) => return Err(status).wrap_err("get failed"),
        },
        Command::Del { key } => {
            db.del(&write_options, key.as_str()).wrap_err("del failed")?;
        }
        Command::Batch => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .wrap_err("reading batch from stdin")?;
            let batch = script::parse_batch(&input)?;
            db.write(&write_options, &batch).wrap_err("batch write failed")?;
            tracing::info!(ops = batch.len(), "applied batch");
        }
    }

    db.close();
    Ok(ExitCode::SUCCESS)
}
