//! The formula layer (spec.md §4.5): pure value objects describing a
//! single atomic constraint, carrying the variable ordering that fixes
//! BDD-track layout downstream. No automaton construction happens here;
//! these types are consumed by the arithmetic/string solvers.

pub mod arithmetic;
pub mod string;

pub use arithmetic::{ArithFormula, RelOp};
pub use string::{StringFormula, StringTag};
