//! # Statement Execution
//!
//! `Executor` is the seam between `SaferDb` and the actual database client. It
//! takes SQL with positional placeholders plus the ordered bindings and
//! reports affected rows and the last insert id. Driver errors are passed
//! through untouched.
//!
//! `SqliteExecutor` is the bundled implementation. It owns one connection;
//! callers share it by sharing the executor, never through global state.
//!
//! ## Insert ids
//!
//! Callers expect MySQL semantics: the insert id is the generated key of an
//! auto-incrementing column, and 0 when the table has none. In SQLite the
//! equivalent of an auto-increment key is a rowid alias (a single
//! `INTEGER PRIMARY KEY` column on a rowid table). `execute_insert` reports
//! the rowid only for such tables. Table names resolve the way SQLite
//! resolves them: case-insensitively, `temp` before `main`. The per-table
//! answer is cached against the `schema_version` of both schemas, so DDL from
//! any connection invalidates it. Unknown tables are never cached.

use crate::config::DatabaseConfig;
use crate::error::DbResult;
use crate::value::Value;
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection, DatabaseName, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// What the driver reported for one statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutcome {
    pub affected_rows: u64,
    /// SQLite rowids are signed; an explicit negative key is reported as is
    pub last_insert_id: i64,
}

/// Database execution capability
pub trait Executor: Send + Sync {
    /// Execute one statement that returns no rows
    fn execute(&self, sql: &str, bindings: &[Value]) -> DbResult<ExecOutcome>;

    /// Execute an insert into `table`.
    ///
    /// Implementations whose driver cannot tell auto-increment keys apart
    /// override this to report `last_insert_id == 0` for tables without one.
    fn execute_insert(&self, _table: &str, sql: &str, bindings: &[Value]) -> DbResult<ExecOutcome> {
        self.execute(sql, bindings)
    }
}

#[derive(Default)]
struct AutoIncrementCache {
    /// `(main, temp)` schema versions the entries were read under
    schema_version: (i64, i64),
    /// Keyed by lower-cased table name
    tables: HashMap<String, bool>,
}

/// `Executor` over a single SQLite connection
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
    auto_increment: Mutex<AutoIncrementCache>,
}

impl SqliteExecutor {
    /// Open the database described by `config`
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
        info!(path = %config.path.display(), foreign_keys = config.foreign_keys, "sqlite_opened");
        Ok(Self::from_connection(conn))
    }

    /// Private in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&DatabaseConfig::in_memory())
    }

    /// Wrap a connection the host already opened
    pub fn from_connection(conn: Connection) -> Self {
        SqliteExecutor {
            conn: Mutex::new(conn),
            auto_increment: Mutex::new(AutoIncrementCache::default()),
        }
    }

    /// Run `f` with the underlying connection, e.g. to read rows back.
    ///
    /// Holds the connection lock for the duration of `f`.
    pub fn with_connection<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Connection) -> R,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Whether `table` has a key that SQLite fills in on insert.
    ///
    /// `false` for a table that does not exist.
    pub fn has_auto_increment(&self, table: &str) -> DbResult<bool> {
        let conn = self.conn.lock();
        self.auto_increment_on(&conn, table)
    }

    fn auto_increment_on(&self, conn: &Connection, table: &str) -> DbResult<bool> {
        let version = schema_versions(conn)?;
        let key = table.to_ascii_lowercase();

        let mut cache = self.auto_increment.lock();
        if cache.schema_version != version {
            if !cache.tables.is_empty() {
                debug!(cached = cache.tables.len(), "auto_increment_cache_cleared");
            }
            cache.tables.clear();
            cache.schema_version = version;
        }
        if let Some(known) = cache.tables.get(&key) {
            return Ok(*known);
        }

        match detect_rowid_alias(conn, table)? {
            Some(answer) => {
                cache.tables.insert(key, answer);
                Ok(answer)
            }
            // Unknown table: let the insert itself report the error
            None => Ok(false),
        }
    }
}

fn run(conn: &Connection, sql: &str, bindings: &[Value]) -> DbResult<ExecOutcome> {
    let affected = conn.execute(sql, params_from_iter(bindings.iter()))?;
    let last_insert_id = if affected > 0 {
        conn.last_insert_rowid()
    } else {
        0
    };
    Ok(ExecOutcome {
        affected_rows: affected as u64,
        last_insert_id,
    })
}

impl Executor for SqliteExecutor {
    fn execute(&self, sql: &str, bindings: &[Value]) -> DbResult<ExecOutcome> {
        let conn = self.conn.lock();
        run(&conn, sql, bindings)
    }

    fn execute_insert(&self, table: &str, sql: &str, bindings: &[Value]) -> DbResult<ExecOutcome> {
        let conn = self.conn.lock();
        let auto_increment = self.auto_increment_on(&conn, table)?;
        let mut outcome = run(&conn, sql, bindings)?;
        if !auto_increment {
            outcome.last_insert_id = 0;
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("cached_tables", &self.auto_increment.lock().tables.len())
            .finish_non_exhaustive()
    }
}

fn schema_versions(conn: &Connection) -> DbResult<(i64, i64)> {
    let main = conn.pragma_query_value(Some(DatabaseName::Main), "schema_version", |r| r.get(0))?;
    let temp = conn.pragma_query_value(Some(DatabaseName::Temp), "schema_version", |r| r.get(0))?;
    Ok((main, temp))
}

/// A rowid table with exactly one primary-key column declared `INTEGER`.
///
/// `None` when no schema has a table by that name.
fn detect_rowid_alias(conn: &Connection, table: &str) -> DbResult<Option<bool>> {
    let found: Option<(String, bool)> = conn
        .query_row(
            "SELECT schema, wr FROM pragma_table_list \
             WHERE type = 'table' AND name = ?1 COLLATE NOCASE \
             ORDER BY schema = 'temp' DESC, schema = 'main' DESC \
             LIMIT 1",
            [table],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((schema, without_rowid)) = found else {
        return Ok(None);
    };
    if without_rowid {
        return Ok(Some(false));
    }

    let mut stmt = conn.prepare("SELECT type FROM pragma_table_info(?1, ?2) WHERE pk > 0")?;
    let pk_types = stmt
        .query_map([table, schema.as_str()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(
        pk_types.len() == 1 && pk_types[0].eq_ignore_ascii_case("INTEGER"),
    ))
}
