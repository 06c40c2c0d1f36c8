//! # Query Log
//!
//! Every statement dispatched by `SaferDb` can be reported to a `QueryLogger`
//! as a `QueryInfo`: the SQL with its placeholders (never interpolated), the
//! ordered bindings, and the timestamps bracketing execution.
//!
//! Two loggers are provided:
//! - `MemoryQueryLogger` keeps an ordered, inspectable list for the lifetime
//!   of the process
//! - `TracingQueryLogger` turns each entry into a `tracing` event

use crate::value::Value;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::Level;

/// One executed statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    /// SQL text exactly as sent to the driver, with `?` placeholders
    pub sql_with_placeholders: String,

    /// Bound values in placeholder order
    pub bindings: Vec<Value>,

    /// Taken immediately before dispatch
    pub start: DateTime<Utc>,

    /// Taken immediately after the driver returned; always later than `start`
    pub end: DateTime<Utc>,
}

impl QueryInfo {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Execution time in microseconds (0 if it does not fit)
    pub fn elapsed_micros(&self) -> i64 {
        self.duration().num_microseconds().unwrap_or(0)
    }
}

/// Brackets one execution.
///
/// `end` is `start` plus monotonic elapsed time, so wall-clock adjustments
/// during execution cannot make it precede `start`.
#[derive(Debug)]
pub struct QueryTimer {
    start: DateTime<Utc>,
    started: Instant,
}

impl QueryTimer {
    pub fn start() -> Self {
        QueryTimer {
            start: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn finish(self, sql_with_placeholders: impl Into<String>, bindings: Vec<Value>) -> QueryInfo {
        let elapsed = Duration::from_std(self.started.elapsed()).unwrap_or_else(|_| Duration::zero());
        let elapsed = elapsed.max(Duration::nanoseconds(1));
        QueryInfo {
            sql_with_placeholders: sql_with_placeholders.into(),
            bindings,
            start: self.start,
            end: self.start + elapsed,
        }
    }
}

/// Receives one `QueryInfo` per executed statement
pub trait QueryLogger: Send + Sync {
    fn log(&self, info: QueryInfo);
}

/// Append-only in-process query log
#[derive(Debug, Default)]
pub struct MemoryQueryLogger {
    queries: Mutex<Vec<QueryInfo>>,
}

impl MemoryQueryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first
    pub fn queries(&self) -> Vec<QueryInfo> {
        self.queries.lock().clone()
    }

    pub fn get(&self, index: usize) -> Option<QueryInfo> {
        self.queries.lock().get(index).cloned()
    }

    pub fn last(&self) -> Option<QueryInfo> {
        self.queries.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.queries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.queries.lock().clear();
    }
}

impl QueryLogger for MemoryQueryLogger {
    fn log(&self, info: QueryInfo) {
        self.queries.lock().push(info);
    }
}

/// Emits a `query_executed` event per statement
#[derive(Debug, Clone)]
pub struct TracingQueryLogger {
    level: Level,
}

impl TracingQueryLogger {
    pub fn new(level: Level) -> Self {
        TracingQueryLogger { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingQueryLogger {
    fn default() -> Self {
        TracingQueryLogger::new(Level::DEBUG)
    }
}

macro_rules! query_event {
    ($level:expr, $info:ident) => {
        tracing::event!(
            $level,
            sql = %$info.sql_with_placeholders,
            bindings = ?$info.bindings,
            elapsed_us = $info.elapsed_micros(),
            "query_executed"
        )
    };
}

impl QueryLogger for TracingQueryLogger {
    fn log(&self, info: QueryInfo) {
        // event! needs a constant level
        if self.level == Level::TRACE {
            query_event!(Level::TRACE, info);
        } else if self.level == Level::DEBUG {
            query_event!(Level::DEBUG, info);
        } else if self.level == Level::INFO {
            query_event!(Level::INFO, info);
        } else if self.level == Level::WARN {
            query_event!(Level::WARN, info);
        } else {
            query_event!(Level::ERROR, info);
        }
    }
}
