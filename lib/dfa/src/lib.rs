//! Automaton kernel for the solver: BDD-backed string, integer, unary
//! and multi-track automata, plus arbitrary-precision transfer-matrix
//! counting. Everything in this crate is purely symbolic bookkeeping;
//! surface-syntax parsing, preprocessing and proof search live in the
//! root crate, which treats this crate the same way the reference
//! solver's main crate treats its `cudd` and `owl` library crates: a
//! boundary that never leaks its own wrapped library's types outward.

pub mod automaton;
pub mod bdd;
pub mod counter;
pub mod error;
pub mod int_automaton;
pub mod multitrack;
pub mod string_automaton;
pub mod unary;

pub use automaton::{Automaton, Edge, ProductMode};
pub use bdd::{Bdd, BddManager};
pub use counter::{count_at_most, count_exact, is_unbounded, SymbolicCount};
pub use error::{KernelError, Result};
pub use int_automaton::{IntAutomaton, Relation};
pub use string_automaton::StringAutomaton;
pub use unary::{LinearSet, SemilinearSet, UnaryAutomaton};
