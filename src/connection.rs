//! Database and connection handles.

use std::sync::Arc;

use chrono_tz::Tz;
use engine::{InterruptHandle, NativeConnection, NativeDatabase};
use tracing::{debug, info};

use crate::dispatch::FetchContext;
use crate::error::Result;
use crate::result::QueryResult;
use crate::statement::PreparedStatement;
use crate::value::HostValue;

/// An opened database. Session settings set here apply to every connection.
pub struct Database {
    native: Box<dyn NativeDatabase>,
    context: FetchContext,
    max_task_steps: Option<u64>,
}

impl Database {
    pub fn from_native(native: Box<dyn NativeDatabase>) -> Self {
        Self {
            native,
            context: FetchContext::default(),
            max_task_steps: None,
        }
    }

    /// An empty in-memory DuckDB database.
    #[cfg(feature = "backend-duckdb")]
    pub fn open_in_memory() -> Result<Self> {
        let native = engine::open_database(&engine::DuckDbOptions::default())?;
        Ok(Self::from_native(native))
    }

    /// Zone TIMESTAMP WITH TIME ZONE cells are rendered in.
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.context = FetchContext::new(time_zone);
        self
    }

    /// Upper bound on task steps for `PendingResult::execute_pending`.
    pub fn with_max_task_steps(mut self, max_task_steps: Option<u64>) -> Self {
        self.max_task_steps = max_task_steps;
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.context.time_zone
    }

    pub fn backend_name(&self) -> &'static str {
        self.native.backend_name()
    }

    pub fn connect(&self) -> Result<Connection> {
        let native = self.native.connect()?;
        info!(backend = self.backend_name(), time_zone = %self.context.time_zone, "connected");
        Ok(Connection {
            native,
            context: self.context,
            max_task_steps: self.max_task_steps,
        })
    }
}

/// A connection. Only one query may run on it at a time: a statement borrows
/// the connection mutably and a pending result borrows its statement.
pub struct Connection {
    native: Box<dyn NativeConnection>,
    context: FetchContext,
    max_task_steps: Option<u64>,
}

impl Connection {
    pub fn prepare(&mut self, sql: &str) -> Result<PreparedStatement<'_>> {
        debug!(sql, "prepare");
        let native = self.native.prepare(sql)?;
        Ok(PreparedStatement::new(native, self.context, self.max_task_steps))
    }

    /// Prepare, bind `params` in order and execute.
    pub fn query(&mut self, sql: &str, params: &[HostValue]) -> Result<QueryResult> {
        let mut statement = self.prepare(sql)?;
        statement.bind_all(params)?;
        statement.execute()
    }

    /// Handle for interrupting this connection's running query from another
    /// thread. The next task step of that query fails.
    pub fn interrupt_handle(&self) -> Arc<dyn InterruptHandle> {
        self.native.interrupt_handle()
    }
}
