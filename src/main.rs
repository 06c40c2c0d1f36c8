//! # SaferDB CLI
//!
//! ## Usage
//!
//! ```bash
//! # Insert one row
//! saferdb --database app.sqlite insert --table users --data '{"name": "foo", "age": 10}'
//!
//! # Run a statement with positional bindings
//! saferdb --database app.sqlite exec --sql 'delete from users where age > ?' --bind '[18]'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use saferdb::{Config, SaferDb, SqliteExecutor, TracingQueryLogger, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "saferdb", version, about = "Parameter-bound inserts with query logging")]
struct Cli {
    /// Configuration file (defaults to saferdb.toml + saferdb.local.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Database file, overrides the configured path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert one row from a JSON object
    Insert {
        #[arg(long)]
        table: String,

        /// JSON object mapping column names to scalar values
        #[arg(long)]
        data: String,
    },

    /// Execute a statement that returns no rows
    Exec {
        #[arg(long)]
        sql: String,

        /// JSON array of positional bindings
        #[arg(long, default_value = "[]")]
        bind: String,
    },
}

fn main() -> Result<()> {
    let output = run(Cli::parse())?;
    println!("{output}");
    Ok(())
}

/// Execute one subcommand and render its result as a JSON line
fn run(cli: Cli) -> Result<String> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config from {path}"))?,
        None => Config::load().context("loading configuration")?,
    };
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    saferdb::logging::init(&config.logging);

    let executor = SqliteExecutor::open(&config.database)
        .with_context(|| format!("opening {}", config.database.path.display()))?;
    let db = if config.logging.log_queries {
        let logger = TracingQueryLogger::new(config.logging.query_tracing_level());
        SaferDb::with_logger(executor, Arc::new(logger))
    } else {
        SaferDb::new(executor)
    };

    let output = match cli.command {
        Command::Insert { table, data } => {
            let data: serde_json::Value =
                serde_json::from_str(&data).context("--data is not valid JSON")?;
            let result = db.insert_json(&table, &data)?;
            serde_json::to_string(&result)?
        }
        Command::Exec { sql, bind } => {
            let bindings: Vec<Value> = serde_json::from_str(&bind)
                .context("--bind must be a JSON array of scalars")?;
            let outcome = db.prepared_query(&sql, &bindings)?;
            serde_json::to_string(&outcome)?
        }
    };
    Ok(output)
}
