//! Backend abstraction layer for the native engine.
//!
//! The binding never talks to an engine directly; it goes through these
//! traits, which mirror the engine's C API surface: open a connection,
//! prepare a statement, bind parameters slot by slot, then either execute in
//! one call or step a pending execution task by task.

use std::sync::Arc;

use thiserror::Error;

use crate::types::LogicalType;
use crate::value::NativeValue;
use crate::vector::NativeResult;

/// Error raised by the engine. The message is the engine's own text and is
/// never reworded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// State reported by one task step of a pending execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativePendingState {
    Ready,
    NotReady,
    Error,
    NoTasksAvailable,
}

/// An opened database that hands out connections.
pub trait NativeDatabase: Send + Sync {
    fn connect(&self) -> Result<Box<dyn NativeConnection>, EngineError>;

    /// Get the backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Interrupts the query currently running on a connection.
pub trait InterruptHandle: Send + Sync {
    fn interrupt(&self);
}

/// A connection. Execution context is connection-scoped: only one query may
/// run on it at a time.
pub trait NativeConnection: Send {
    /// Prepare a statement. The statement borrows the connection.
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn NativeStatement + '_>, EngineError>;

    /// Handle that can interrupt this connection from another thread.
    fn interrupt_handle(&self) -> Arc<dyn InterruptHandle>;
}

/// A prepared statement with 1-based parameter slots.
pub trait NativeStatement {
    fn parameter_count(&self) -> usize;

    /// Declared type of a parameter; `Unknown` when the engine cannot infer one.
    fn parameter_type(&self, index: usize) -> LogicalType;

    fn bind(&mut self, index: usize, value: NativeValue) -> Result<(), EngineError>;

    fn clear_bindings(&mut self);

    /// Start a pending execution. The pending handle borrows the statement.
    fn pending(&mut self) -> Result<Box<dyn NativePending + '_>, EngineError>;

    /// Execute to completion in one call.
    ///
    /// # Default Implementation
    /// Drives a pending execution until it is ready or fails.
    fn execute(&mut self) -> Result<NativeResult, EngineError> {
        let mut pending = self.pending()?;
        loop {
            match pending.execute_task() {
                NativePendingState::Ready => return pending.execute(),
                NativePendingState::Error => {
                    let message = pending.error().unwrap_or("Unknown error").to_string();
                    return Err(EngineError::new(message));
                }
                NativePendingState::NotReady | NativePendingState::NoTasksAvailable => {}
            }
        }
    }
}

/// A steppable execution. Dropping the box releases the native handle.
pub trait NativePending {
    /// Perform one bounded unit of work.
    fn execute_task(&mut self) -> NativePendingState;

    /// Error text once a step reported `Error`.
    fn error(&self) -> Option<&str>;

    /// Whether the engine already finished the work while creating the
    /// handle, so no task step is needed before claiming the result.
    fn is_finished(&self) -> bool {
        false
    }

    /// Fraction of work done in `0.0..=1.0`, when the engine can tell.
    fn progress(&self) -> Option<f64> {
        None
    }

    /// Finish the execution and claim the materialized result.
    fn execute(self: Box<Self>) -> Result<NativeResult, EngineError>;
}

#[cfg(feature = "backend-duckdb")]
pub mod duckdb;

/// Opens a database with the default backend.
///
/// The backend is chosen by feature flag; `backend-duckdb` links the bundled
/// DuckDB engine.
#[cfg(feature = "backend-duckdb")]
pub fn open_database(options: &duckdb::DuckDbOptions) -> Result<Box<dyn NativeDatabase>, EngineError> {
    Ok(Box::new(duckdb::DuckDbDatabase::open(options)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_keeps_message_verbatim() {
        let err = EngineError::new("Catalog Error: Table with name t does not exist!");
        assert_eq!(err.to_string(), "Catalog Error: Table with name t does not exist!");
        assert_eq!(err.message(), "Catalog Error: Table with name t does not exist!");
    }

    #[test]
    fn test_traits_are_object_safe() {
        fn accepts_database(_db: &dyn NativeDatabase) {}
        fn accepts_statement(_stmt: &dyn NativeStatement) {}
        fn accepts_pending(_pending: &dyn NativePending) {}
        let _ = accepts_database;
        let _ = accepts_statement;
        let _ = accepts_pending;
    }
}
