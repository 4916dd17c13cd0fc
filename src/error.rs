//! Error types for the enigma library.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnigmaError>;

/// Broad category of an [`EnigmaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed configuration, cycle notation, settings or rotor placement.
    Configuration,
    /// An index fell outside `[0, size)`.
    IndexOutOfRange,
    /// An operation the rotor kind or machine state forbids.
    InvalidState,
    /// Reading input or writing output failed.
    Io,
}

/// Errors produced by the enigma library.
#[derive(Debug, Error)]
pub enum EnigmaError {
    /// Configuration text, cycle notation, rotor catalog or settings are invalid.
    #[error("{0}")]
    Configuration(String),

    /// Index passed to a permutation, rotor or machine is out of range.
    #[error("index {index} out of range for alphabet of size {size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Size of the alphabet the index was checked against.
        size: usize,
    },

    /// The rotor kind or machine state forbids the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Stream I/O failed while processing messages.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnigmaError {
    /// Builds a [`EnigmaError::Configuration`] from a message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        EnigmaError::Configuration(msg.into())
    }

    /// Builds a [`EnigmaError::InvalidState`] from a message.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        EnigmaError::InvalidState(msg.into())
    }

    /// Builds a [`EnigmaError::IndexOutOfRange`].
    pub fn index_out_of_range(index: usize, size: usize) -> Self {
        EnigmaError::IndexOutOfRange { index, size }
    }

    /// Returns the category tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnigmaError::Configuration(_) => ErrorKind::Configuration,
            EnigmaError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            EnigmaError::InvalidState(_) => ErrorKind::InvalidState,
            EnigmaError::Io(_) => ErrorKind::Io,
        }
    }
}
