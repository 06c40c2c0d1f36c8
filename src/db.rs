//! # SaferDb
//!
//! Wraps an `Executor` (the host's database handle) and adds:
//! - argument validation before anything reaches the database
//! - statements built only from quoted identifiers and `?` placeholders
//! - one `QueryInfo` per executed statement for an optional `QueryLogger`
//!
//! ```rust,ignore
//! use saferdb::{Payload, SaferDb, SqliteExecutor};
//!
//! let db = SaferDb::new(SqliteExecutor::open_in_memory()?);
//! let payload = Payload::from_pairs([("test_string", "foo")])?;
//! let result = db.insert("test_table", &payload)?;
//! assert_eq!(result.affected_rows, 1);
//! ```

use crate::error::{DbError, DbResult};
use crate::executor::{ExecOutcome, Executor};
use crate::payload::Payload;
use crate::query_log::{QueryLogger, QueryTimer};
use crate::quote::{placeholders, quote_identifier, quote_identifier_list};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a single-row insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResult {
    /// Rows written (1 on success)
    pub affected_rows: u64,

    /// Generated auto-increment key, or 0 if the table has none
    pub insert_id: i64,
}

/// Insert/execute facade over an explicitly passed executor
pub struct SaferDb<E: Executor> {
    executor: E,
    logger: Option<Arc<dyn QueryLogger>>,
}

impl<E: Executor> SaferDb<E> {
    pub fn new(executor: E) -> Self {
        SaferDb {
            executor,
            logger: None,
        }
    }

    /// Report every executed statement to `logger`
    pub fn with_logger(executor: E, logger: Arc<dyn QueryLogger>) -> Self {
        SaferDb {
            executor,
            logger: Some(logger),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn logger(&self) -> Option<&Arc<dyn QueryLogger>> {
        self.logger.as_ref()
    }

    /// Insert one row into `table`.
    ///
    /// Rejects an empty table name or empty payload with
    /// `DbError::InvalidArgument` before any statement is sent. Errors from
    /// the executor are returned unchanged and nothing is logged for them.
    pub fn insert(&self, table: &str, data: &Payload) -> DbResult<InsertResult> {
        if table.is_empty() {
            warn!(reason = "empty_table_name", "insert_rejected");
            return Err(DbError::invalid_argument("table name must not be empty"));
        }
        if let Err(e) = data.ensure_not_empty() {
            warn!(table, reason = "empty_payload", "insert_rejected");
            return Err(e);
        }

        let sql = render_insert(table, data);
        let bindings: Vec<Value> = data.values().cloned().collect();

        let timer = QueryTimer::start();
        let outcome = self.executor.execute_insert(table, &sql, &bindings)?;
        self.record(timer, sql, bindings);

        debug!(
            table,
            affected_rows = outcome.affected_rows,
            insert_id = outcome.last_insert_id,
            "row_inserted"
        );
        Ok(InsertResult {
            affected_rows: outcome.affected_rows,
            insert_id: outcome.last_insert_id,
        })
    }

    /// Insert one row from an untyped JSON object.
    ///
    /// Runs the full shape validation of `Payload::try_from_json` first.
    pub fn insert_json(&self, table: &str, data: &serde_json::Value) -> DbResult<InsertResult> {
        if table.is_empty() {
            warn!(reason = "empty_table_name", "insert_rejected");
            return Err(DbError::invalid_argument("table name must not be empty"));
        }
        let payload = Payload::try_from_json(data).inspect_err(|e| {
            warn!(table, error = %e, "insert_rejected");
        })?;
        self.insert(table, &payload)
    }

    /// Execute a statement that returns no rows (DDL, update, delete, ...)
    /// with positional `bindings`, through the same logging path as `insert`.
    pub fn prepared_query(&self, sql: &str, bindings: &[Value]) -> DbResult<ExecOutcome> {
        if sql.trim().is_empty() {
            return Err(DbError::invalid_argument("sql must not be empty"));
        }
        let timer = QueryTimer::start();
        let outcome = self.executor.execute(sql, bindings)?;
        self.record(timer, sql.to_string(), bindings.to_vec());
        Ok(outcome)
    }

    fn record(&self, timer: QueryTimer, sql: String, bindings: Vec<Value>) {
        if let Some(logger) = &self.logger {
            logger.log(timer.finish(sql, bindings));
        }
    }
}

impl<E: Executor + std::fmt::Debug> std::fmt::Debug for SaferDb<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaferDb")
            .field("executor", &self.executor)
            .field("logging", &self.logger.is_some())
            .finish()
    }
}

/// ``insert into `t` (`a`, `b`) values (?, ?)``
pub fn render_insert(table: &str, data: &Payload) -> String {
    format!(
        "insert into {} ({}) values ({})",
        quote_identifier(table),
        quote_identifier_list(data.columns()),
        placeholders(data.len())
    )
}
