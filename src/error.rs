//! Error types for the solving pipeline (spec.md §7).
//!
//! `Unsatisfiable` is deliberately not a variant here: spec.md §7 requires
//! it to be represented by the empty-language automaton and surfaced as a
//! normal `sat`/`unsat` answer, never thrown as an error.

use thiserror::Error;

use dfa::KernelError;

/// A location in the input script, used to annotate parse and
/// construct-level errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An error produced anywhere in the solving pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The surface parser could not make sense of the input.
    #[error("parse error at {location}: {message}")]
    ParseError { message: String, location: Location },
    /// A syntactically valid atom falls outside the supported theory
    /// fragment (spec.md §6's operator list).
    #[error("unsupported construct '{what}' at {location}")]
    UnsupportedConstruct { what: String, location: Location },
    /// Two automata were combined with mismatched tracks; always a solver
    /// bug or a mis-aligned group, never user-triggerable in principle.
    #[error("incompatible tracks: {0}")]
    IncompatibleTracks(String),
    /// The cooperative abort flag was observed set.
    #[error("solving aborted")]
    Aborted,
    /// A kernel or solver invariant was violated.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<KernelError> for Error {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::IncompatibleTracks(m) => Error::IncompatibleTracks(m),
            KernelError::Internal(m) => Error::Internal { message: m },
        }
    }
}

/// Convenience alias for fallible solver operations.
pub type Result<T> = std::result::Result<T, Error>;
