//! Error taxonomy of the binding layer.

use engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuckError {
    /// An index or value magnitude is out of bounds.
    #[error("{message}")]
    Range { message: String },

    /// A host value or native type has no codec.
    #[error("unsupported type {type_name} for value {value}")]
    UnsupportedType { value: String, type_name: String },

    /// Malformed textual input such as an interval string.
    #[error("{message}")]
    Argument { message: String },

    /// A state machine contract was violated by the caller.
    #[error("{message}")]
    InvalidState { message: String },

    /// Engine failure, carrying the engine's own text.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DuckError {
    pub(crate) fn range(message: impl Into<String>) -> Self {
        Self::Range {
            message: message.into(),
        }
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The engine error, when this error came from the engine.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DuckError>;
