//! Per-variable witness reporting (spec.md §6 "On sat: a witness example
//! per variable (lexicographically smallest)").
//!
//! A witness is read directly off the solved group an already-sat
//! [`SymbolTable`] holds for the variable: the lexicographically-smallest
//! accepted word, via [`dfa::Automaton::enumerate_witness`] (reached
//! through [`dfa::IntAutomaton::get_an_accepting_value`] for an
//! arithmetic group, or [`dfa::StringAutomaton::witness`] after
//! [`dfa::multitrack::extract_track`] strips the group down to this
//! variable's own track, for a string group).

use std::fmt::{self, Display};

use dfa::multitrack;

use crate::error::{Error, Location, Result};
use crate::options::SolverOptions;
use crate::symtab::{SymbolTable, Value};

/// A single variable's witness value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Witness {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Witness::Bool(b) => write!(f, "{b}"),
            Witness::Int(i) => write!(f, "{i}"),
            Witness::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Reads a witness for `variable` out of a solved, satisfiable symbol
/// table. Bounds the search for a string witness at `options.bit_width *
/// 8` steps, generous enough that any automaton whose language is
/// nonempty at all has a witness at or below it in practice (a group this
/// shallow's reachable accepting states are found well within a state
/// count bounded by the group's own BDD variable count).
pub fn witness(symtab: &SymbolTable, variable: &str, options: &SolverOptions) -> Result<Witness> {
    match symtab.get(variable) {
        Some(Value::Bool(b)) => Ok(Witness::Bool(*b)),
        Some(Value::Arith(group)) => {
            let index = index_of(&group.ordering, variable)?;
            group.automaton.get_an_accepting_value(index).map(Witness::Int).ok_or_else(|| no_witness(variable))
        }
        Some(Value::Str(group)) => {
            let index = index_of(&group.ordering, variable)?;
            let single = multitrack::extract_track(&group.automaton, index, group.ordering.len());
            let bytes = single.witness(options.bit_width * 8).ok_or_else(|| no_witness(variable))?;
            Ok(Witness::Str(String::from_utf8_lossy(&bytes).into_owned()))
        }
        Some(Value::Unknown) | None => Err(no_witness(variable)),
    }
}

fn index_of(ordering: &[String], variable: &str) -> Result<usize> {
    ordering.iter().position(|v| v == variable).ok_or_else(|| Error::Internal {
        message: format!("{variable} missing from its own group ordering"),
    })
}

fn no_witness(variable: &str) -> Error {
    Error::UnsupportedConstruct { what: format!("witness for variable '{variable}'"), location: Location::default() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::{ArithGroupValue, StrGroupValue};
    use dfa::{IntAutomaton, Relation, StringAutomaton};

    #[test]
    fn reports_the_forced_integer_value() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        let automaton = IntAutomaton::linear_constraint(&[1], Relation::Eq, 3, 6);
        symtab.bind("x", Value::Arith(ArithGroupValue { automaton, ordering: vec!["x".to_string()] }));

        let w = witness(&symtab, "x", &SolverOptions::default()).unwrap();
        assert_eq!(w, Witness::Int(3));
    }

    #[test]
    fn reports_a_string_in_the_accepted_language() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        let lifted = multitrack::lift_track(&StringAutomaton::literal(b"ab"), 0, 1);
        symtab.bind("s", Value::Str(StrGroupValue { automaton: lifted, ordering: vec!["s".to_string()] }));

        let w = witness(&symtab, "s", &SolverOptions::default()).unwrap();
        assert_eq!(w, Witness::Str("ab".to_string()));
    }

    #[test]
    fn unbound_variable_has_no_witness() {
        let symtab = SymbolTable::new();
        assert!(witness(&symtab, "missing", &SolverOptions::default()).is_err());
    }
}
