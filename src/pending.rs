//! Pending query state machine.
//!
//! A [`PendingResult`] drives a prepared statement one task step at a time.
//!
//! ```text
//!   NotReady ──execute_task──▶ NotReady | NoTasks | Ready | Error
//!   NoTasks  ──execute_task──▶ NotReady | NoTasks | Ready | Error
//!   Ready    ──finalize──────▶ QueryResult (handle consumed)
//!   Error    ──into_error────▶ DuckError::Engine (handle consumed)
//! ```
//!
//! `Ready` and `Error` are terminal: further `execute_task` calls report the
//! same state without touching the engine. The native handle is owned by a
//! `Box` and released exactly once whichever way the value goes away.
//!
//! Only one owner may drive a pending result; `execute_task` takes `&mut self`
//! so the borrow checker enforces this within safe code. The statement stays
//! mutably borrowed for the lifetime of the pending result.

use std::fmt;

use engine::{EngineError, NativePending, NativePendingState};
use tracing::{debug, trace};

use crate::dispatch::FetchContext;
use crate::error::{DuckError, Result};
use crate::result::QueryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    NotReady,
    Ready,
    Error,
    /// No task was available this step; poll again.
    NoTasks,
}

impl PendingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

impl From<NativePendingState> for PendingState {
    fn from(state: NativePendingState) -> Self {
        match state {
            NativePendingState::Ready => Self::Ready,
            NativePendingState::NotReady => Self::NotReady,
            NativePendingState::Error => Self::Error,
            NativePendingState::NoTasksAvailable => Self::NoTasks,
        }
    }
}

impl fmt::Display for PendingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotReady => "not_ready",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::NoTasks => "no_tasks",
        };
        f.write_str(name)
    }
}

pub struct PendingResult<'stmt> {
    native: Box<dyn NativePending + 'stmt>,
    state: PendingState,
    steps: u64,
    context: FetchContext,
    max_task_steps: Option<u64>,
}

impl<'stmt> PendingResult<'stmt> {
    pub(crate) fn new(
        native: Box<dyn NativePending + 'stmt>,
        context: FetchContext,
        max_task_steps: Option<u64>,
    ) -> Self {
        let state = if native.is_finished() {
            PendingState::Ready
        } else {
            PendingState::NotReady
        };
        Self {
            native,
            state,
            steps: 0,
            context,
            max_task_steps,
        }
    }

    /// Perform one unit of work and report the new state.
    pub fn execute_task(&mut self) -> PendingState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = self.native.execute_task().into();
        self.steps += 1;
        trace!(step = self.steps, state = %self.state, "pending task step");
        self.state
    }

    /// Last observed state, without stepping.
    pub fn state(&self) -> PendingState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PendingState::Ready
    }

    /// Number of task steps performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Engine-reported fraction of work done, when available.
    pub fn progress(&self) -> Option<f64> {
        self.native.progress()
    }

    /// The engine's error text once a step reported `Error`.
    pub fn error_message(&self) -> Option<&str> {
        match self.state {
            PendingState::Error => self.native.error(),
            _ => None,
        }
    }

    /// Consume the handle and return the engine's error verbatim.
    ///
    /// Outside the `Error` state this is a contract violation and yields an
    /// `InvalidState` error instead.
    pub fn into_error(self) -> DuckError {
        match self.state {
            PendingState::Error => {
                let message = self.native.error().unwrap_or("Unknown error");
                DuckError::Engine(EngineError::new(message))
            }
            state => DuckError::invalid_state(format!(
                "pending result has no error to read (state {})",
                state
            )),
        }
    }

    /// Claim the materialized result. Legal only once the state is `Ready`.
    pub fn finalize(self) -> Result<QueryResult> {
        if self.state != PendingState::Ready {
            return Err(DuckError::invalid_state(format!(
                "cannot finalize a pending result in state {}",
                self.state
            )));
        }
        let context = self.context;
        let native = self.native.execute()?;
        Ok(QueryResult::new(native, context))
    }

    /// Drive until `Ready` or `Error`, then finalize or surface the error.
    ///
    /// Gives up with `InvalidState` after the configured step budget.
    pub fn execute_pending(mut self) -> Result<QueryResult> {
        loop {
            match self.execute_task() {
                PendingState::Ready => {
                    debug!(steps = self.steps, "pending result ready");
                    return self.finalize();
                }
                PendingState::Error => return Err(self.into_error()),
                PendingState::NotReady | PendingState::NoTasks => match self.max_task_steps {
                    Some(max) if self.steps >= max => {
                        return Err(DuckError::invalid_state(format!(
                            "query did not finish within {} task steps",
                            max
                        )));
                    }
                    _ => {}
                },
            }
        }
    }
}

impl fmt::Debug for PendingResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResult")
            .field("state", &self.state)
            .field("steps", &self.steps)
            .finish()
    }
}
