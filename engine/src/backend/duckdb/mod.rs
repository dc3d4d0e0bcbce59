//! DuckDB backend over the bundled C API.
//!
//! Handles are thin owners of the raw C handles: the database closes on drop
//! of its last owner, connections disconnect on drop, statements and pending
//! executions are destroyed on drop. Results are copied into owned
//! [`NativeResult`]s before the native result is destroyed.

mod bind;
mod chunk;
mod logical;

use std::collections::BTreeMap;
use std::ffi::{c_char, CString};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::ptr;
use std::sync::{Arc, Mutex};

use duckdb::ffi;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use super::{
    EngineError, InterruptHandle, NativeConnection, NativeDatabase, NativePending, NativePendingState,
    NativeStatement,
};
use crate::types::LogicalType;
use crate::value::NativeValue;
use crate::vector::NativeResult;
use chunk::OwnedResult;
use logical::{borrowed_string, take_string, OwnedLogicalType};

const IN_MEMORY: &str = ":memory:";

/// How to open a DuckDB database.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DuckDbOptions {
    /// Database file; an in-memory database when unset
    pub path: Option<PathBuf>,
    /// Startup options passed to `duckdb_set_config`, e.g. `threads`
    pub settings: BTreeMap<String, String>,
}

fn succeeded(state: ffi::duckdb_state) -> bool {
    state as u32 == 0
}

fn c_string(text: &str, what: &str) -> Result<CString, EngineError> {
    CString::new(text).map_err(|_| EngineError::new(format!("Invalid Input Error: {} contains a NUL byte", what)))
}

/// Owned `duckdb_database`, closed on drop.
struct DatabaseHandle(ffi::duckdb_database);

// SAFETY: a DuckDB database instance is internally synchronized.
unsafe impl Send for DatabaseHandle {}
unsafe impl Sync for DatabaseHandle {}

impl Drop for DatabaseHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was opened by duckdb_open_ext and is closed once.
        unsafe { ffi::duckdb_close(&mut self.0) };
    }
}

struct ConfigHandle(ffi::duckdb_config);

impl Drop for ConfigHandle {
    fn drop(&mut self) {
        // SAFETY: created by duckdb_create_config, destroyed once.
        unsafe { ffi::duckdb_destroy_config(&mut self.0) };
    }
}

/// A DuckDB database. Connections keep it alive.
pub struct DuckDbDatabase {
    handle: Arc<DatabaseHandle>,
}

impl DuckDbDatabase {
    pub fn open(options: &DuckDbOptions) -> Result<Self, EngineError> {
        let path = match &options.path {
            Some(path) => c_string(&path.to_string_lossy(), "database path")?,
            None => c_string(IN_MEMORY, "database path")?,
        };

        let mut config = ConfigHandle(ptr::null_mut());
        // SAFETY: out-pointer to a config handle owned by `config`.
        if !succeeded(unsafe { ffi::duckdb_create_config(&mut config.0) }) {
            return Err(EngineError::new("Fatal Error: could not allocate database configuration"));
        }
        for (name, value) in &options.settings {
            let c_name = c_string(name, "setting name")?;
            let c_value = c_string(value, "setting value")?;
            // SAFETY: live config handle and NUL-terminated strings.
            let state = unsafe { ffi::duckdb_set_config(config.0, c_name.as_ptr(), c_value.as_ptr()) };
            if !succeeded(state) {
                return Err(EngineError::new(format!(
                    "Invalid Input Error: unrecognized configuration option \"{}\" = \"{}\"",
                    name, value
                )));
            }
        }

        let mut raw: ffi::duckdb_database = ptr::null_mut();
        let mut error: *mut c_char = ptr::null_mut();
        // SAFETY: valid path and config; both out-pointers are initialized.
        let state = unsafe { ffi::duckdb_open_ext(path.as_ptr(), &mut raw, config.0, &mut error) };
        if !succeeded(state) {
            // SAFETY: on failure the error string is ours to free.
            let message = unsafe { take_string(error) };
            if !raw.is_null() {
                drop(DatabaseHandle(raw));
            }
            return Err(EngineError::new(message));
        }
        debug!(path = ?options.path, settings = options.settings.len(), "opened duckdb database");
        Ok(Self {
            handle: Arc::new(DatabaseHandle(raw)),
        })
    }

    pub fn open_in_memory() -> Result<Self, EngineError> {
        Self::open(&DuckDbOptions::default())
    }
}

impl NativeDatabase for DuckDbDatabase {
    fn connect(&self) -> Result<Box<dyn NativeConnection>, EngineError> {
        let mut raw: ffi::duckdb_connection = ptr::null_mut();
        // SAFETY: the database handle is open for as long as `self` lives.
        if !succeeded(unsafe { ffi::duckdb_connect(self.handle.0, &mut raw) }) {
            return Err(EngineError::new("Connection Error: could not connect to database"));
        }
        Ok(Box::new(DuckDbConnection {
            raw,
            interrupt: Arc::new(DuckDbInterrupt {
                connection: Mutex::new(Some(RawConnection(raw))),
            }),
            _database: Arc::clone(&self.handle),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "duckdb"
    }
}

#[derive(Clone, Copy)]
struct RawConnection(ffi::duckdb_connection);

// SAFETY: duckdb_interrupt may be called from any thread.
unsafe impl Send for RawConnection {}

/// Interrupts the connection it was taken from. Detached when that connection
/// disconnects, after which interrupting does nothing.
struct DuckDbInterrupt {
    connection: Mutex<Option<RawConnection>>,
}

impl DuckDbInterrupt {
    fn detach(&self) {
        match self.connection.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

impl InterruptHandle for DuckDbInterrupt {
    fn interrupt(&self) {
        let Ok(guard) = self.connection.lock() else {
            warn!("interrupt lock poisoned");
            return;
        };
        if let Some(conn) = *guard {
            debug!("interrupt requested");
            // SAFETY: the connection stays open while it is attached.
            unsafe { ffi::duckdb_interrupt(conn.0) };
        }
    }
}

pub struct DuckDbConnection {
    raw: ffi::duckdb_connection,
    interrupt: Arc<DuckDbInterrupt>,
    _database: Arc<DatabaseHandle>,
}

// SAFETY: a connection is used by one thread at a time, which `&mut self`
// on every operation enforces.
unsafe impl Send for DuckDbConnection {}

impl Drop for DuckDbConnection {
    fn drop(&mut self) {
        self.interrupt.detach();
        // SAFETY: statements borrow the connection, so none outlive it.
        unsafe { ffi::duckdb_disconnect(&mut self.raw) };
    }
}

impl NativeConnection for DuckDbConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn NativeStatement + '_>, EngineError> {
        let query = c_string(sql, "query")?;
        let mut raw: ffi::duckdb_prepared_statement = ptr::null_mut();
        // SAFETY: live connection; the statement handle is destroyed by
        // DuckDbStatement or right here on failure.
        let state = unsafe { ffi::duckdb_prepare(self.raw, query.as_ptr(), &mut raw) };
        let statement = DuckDbStatement {
            raw,
            conn: self.raw,
            _conn: PhantomData,
        };
        if !succeeded(state) {
            // SAFETY: the error text is owned by the statement handle.
            let message = unsafe { borrowed_string(ffi::duckdb_prepare_error(statement.raw)) };
            return Err(EngineError::new(message));
        }
        trace!(sql, params = statement.parameter_count(), "prepared");
        Ok(Box::new(statement))
    }

    fn interrupt_handle(&self) -> Arc<dyn InterruptHandle> {
        self.interrupt.clone()
    }
}

pub struct DuckDbStatement<'conn> {
    raw: ffi::duckdb_prepared_statement,
    conn: ffi::duckdb_connection,
    _conn: PhantomData<&'conn mut DuckDbConnection>,
}

impl Drop for DuckDbStatement<'_> {
    fn drop(&mut self) {
        // SAFETY: destroying a null or live statement handle is allowed once.
        unsafe { ffi::duckdb_destroy_prepare(&mut self.raw) };
    }
}

impl NativeStatement for DuckDbStatement<'_> {
    fn parameter_count(&self) -> usize {
        // SAFETY: live statement handle.
        unsafe { ffi::duckdb_nparams(self.raw) as usize }
    }

    fn parameter_type(&self, index: usize) -> LogicalType {
        if index == 0 || index > self.parameter_count() {
            return LogicalType::Invalid;
        }
        // SAFETY: live statement handle and an in-range index.
        let declared = OwnedLogicalType::new(unsafe { ffi::duckdb_param_logical_type(self.raw, index as u64) })
            .map(|lt| lt.to_logical())
            .unwrap_or(LogicalType::Unknown);
        match declared {
            LogicalType::Invalid => LogicalType::Unknown,
            other => other,
        }
    }

    fn bind(&mut self, index: usize, value: NativeValue) -> Result<(), EngineError> {
        if index == 0 || index > self.parameter_count() {
            return Err(EngineError::new(format!(
                "Out of Range Error: Could not find parameter with index {}",
                index
            )));
        }
        // SAFETY: live statement handle; the value outlives the call.
        unsafe { bind::bind_native(self.raw, index, &value) }
    }

    fn clear_bindings(&mut self) {
        // SAFETY: live statement handle.
        unsafe { ffi::duckdb_clear_bindings(self.raw) };
    }

    fn pending(&mut self) -> Result<Box<dyn NativePending + '_>, EngineError> {
        let mut raw: ffi::duckdb_pending_result = ptr::null_mut();
        // SAFETY: live statement handle; the pending handle is destroyed by
        // DuckDbPending.
        let state = unsafe { ffi::duckdb_pending_prepared(self.raw, &mut raw) };
        let pending = DuckDbPending {
            raw,
            conn: self.conn,
            error: None,
            _stmt: PhantomData,
        };
        if !succeeded(state) {
            let message = if pending.raw.is_null() {
                "Invalid Input Error: could not start execution".to_string()
            } else {
                // SAFETY: the error text is owned by the pending handle.
                unsafe { borrowed_string(ffi::duckdb_pending_error(pending.raw)) }
            };
            return Err(EngineError::new(message));
        }
        Ok(Box::new(pending))
    }

    /// Blocks in the engine instead of polling task steps.
    fn execute(&mut self) -> Result<NativeResult, EngineError> {
        self.pending()?.execute()
    }
}

struct DuckDbPending<'stmt> {
    raw: ffi::duckdb_pending_result,
    conn: ffi::duckdb_connection,
    error: Option<String>,
    _stmt: PhantomData<&'stmt mut ()>,
}

impl Drop for DuckDbPending<'_> {
    fn drop(&mut self) {
        // SAFETY: destroying a null or live pending handle is allowed once.
        unsafe { ffi::duckdb_destroy_pending(&mut self.raw) };
    }
}

impl NativePending for DuckDbPending<'_> {
    fn execute_task(&mut self) -> NativePendingState {
        if self.error.is_some() {
            return NativePendingState::Error;
        }
        // SAFETY: live pending handle.
        let state = match unsafe { ffi::duckdb_pending_execute_task(self.raw) } as u32 {
            0 => NativePendingState::Ready,
            1 => NativePendingState::NotReady,
            3 => NativePendingState::NoTasksAvailable,
            _ => NativePendingState::Error,
        };
        if state == NativePendingState::Error {
            // SAFETY: the error text is owned by the pending handle.
            let message = unsafe { borrowed_string(ffi::duckdb_pending_error(self.raw)) };
            self.error = Some(message);
        }
        trace!(?state, "task executed");
        state
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn progress(&self) -> Option<f64> {
        // SAFETY: the connection outlives the statement this pending borrows.
        let progress = unsafe { ffi::duckdb_query_progress(self.conn) };
        (progress.percentage >= 0.0).then(|| (progress.percentage / 100.0).min(1.0))
    }

    fn execute(self: Box<Self>) -> Result<NativeResult, EngineError> {
        if let Some(message) = &self.error {
            return Err(EngineError::new(message.clone()));
        }
        let mut result = OwnedResult(unsafe { std::mem::zeroed() });
        // SAFETY: live pending handle; the result is destroyed by OwnedResult
        // on both paths.
        let state = unsafe { ffi::duckdb_execute_pending(self.raw, &mut result.0) };
        if !succeeded(state) {
            // SAFETY: the error text is owned by the result.
            let message = unsafe { borrowed_string(ffi::duckdb_result_error(&mut result.0)) };
            return Err(EngineError::new(message));
        }
        chunk::materialize(&mut result)
    }
}
