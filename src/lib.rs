//! duckbind library - typed values and steppable queries over an embedded
//! analytical engine
//!
//! Converts between host values and the engine's native column layouts,
//! binds statement parameters, and drives query execution either in one call
//! or task by task through a pending result.

pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod pending;
pub mod result;
pub mod statement;
pub mod value;

#[macro_use]
pub mod test_macros;

pub use connection::{Connection, Database};
pub use dispatch::FetchContext;
pub use error::{DuckError, Result};
pub use pending::{PendingResult, PendingState};
pub use result::QueryResult;
pub use statement::PreparedStatement;
pub use value::{HostValue, IntervalValue, RowValue};
