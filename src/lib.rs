//! # SaferDB
//!
//! A thin layer over an existing SQL connection that adds parameter-binding
//! safety, typed errors and query logging to single-row inserts.
//!
//! ## Pipeline
//! ```text
//! table name + Payload
//!     ↓
//! [Validation]         → DbError::InvalidArgument (nothing sent)
//!     ↓
//! [Rendering]          → insert into `t` (`a`, `b`) values (?, ?)
//!     ↓
//! [Executor]           → ExecOutcome (driver errors pass through)
//!     ↓
//! [QueryLogger]        → QueryInfo { sql, bindings, start, end }
//!     ↓
//! InsertResult { affected_rows, insert_id }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use saferdb::{MemoryQueryLogger, Payload, SaferDb, SqliteExecutor};
//!
//! let logger = Arc::new(MemoryQueryLogger::new());
//! let db = SaferDb::with_logger(SqliteExecutor::open_in_memory()?, logger.clone());
//!
//! db.prepared_query("create table t (id integer primary key, name text)", &[])?;
//! let result = db.insert("t", &Payload::from_pairs([("name", "foo")])?)?;
//!
//! assert_eq!(result.insert_id, 1);
//! assert_eq!(logger.len(), 2);
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `db` | `SaferDb`: insert, JSON insert, prepared query |
//! | `payload` | Ordered, validated column → value mapping |
//! | `value` | Scalar-or-null bound values |
//! | `quote` | Identifier quoting |
//! | `executor` | `Executor` trait and the SQLite implementation |
//! | `query_log` | `QueryInfo` and loggers |
//! | `config` | Configuration loading |
//! | `logging` | `tracing` subscriber setup |

pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod logging;
pub mod payload;
pub mod query_log;
pub mod quote;
pub mod value;

pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use db::{render_insert, InsertResult, SaferDb};
pub use error::{DbError, DbResult};
pub use executor::{ExecOutcome, Executor, SqliteExecutor};
pub use payload::{ColumnName, Payload};
pub use query_log::{MemoryQueryLogger, QueryInfo, QueryLogger, QueryTimer, TracingQueryLogger};
pub use value::Value;
