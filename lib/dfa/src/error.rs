//! Errors raised by the automaton kernel.

use thiserror::Error;

/// An error produced by a kernel-level automaton operation.
///
/// Both variants are fatal from the caller's point of view: unlike the
/// solver layer, the kernel never represents "no solution" as an error
/// (that is the empty-language automaton); these variants only fire on
/// programmer mistakes (misaligned tracks) or violated internal
/// invariants.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Two automata were combined (product, concatenation, relational
    /// composition) but their track widths or variable orderings did not
    /// match.
    #[error("incompatible tracks: {0}")]
    IncompatibleTracks(String),
    /// An internal invariant of the kernel was violated.
    #[error("internal kernel error: {0}")]
    Internal(String),
}

/// Convenience alias for fallible kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
