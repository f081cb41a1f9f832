//! Model counting front-end (spec.md §4.12, orchestration half).
//!
//! Resolves a variable name to the [`crate::symtab::SymbolTable`] group
//! it belongs to, strips the group's automaton down to that single
//! variable's own language/value-set, and counts via `lib/dfa`'s
//! transfer-matrix counter (or, for an arithmetic variable, by reading
//! its semilinear set directly — spec.md §4.12's "unary automata:
//! evaluate the semilinear set directly" edge case applies the same way
//! here, since an arithmetic variable's marginal has no per-step
//! "length" the way a string does).

use num_bigint::BigUint;

use dfa::multitrack;

use crate::error::{Error, Location, Result};
use crate::options::{CountMode, SolverOptions};
use crate::symtab::{ArithGroupValue, StrGroupValue, SymbolTable, Value};

/// Counts satisfying assignments of `variable` under `options.count_mode`
/// at `options.bound` (spec.md §4.12's per-variable marginal: "project A
/// to the chosen variable first, then count").
pub fn count(symtab: &SymbolTable, variable: &str, options: &SolverOptions) -> Result<BigUint> {
    match symtab.get(variable) {
        Some(Value::Str(group)) => count_string(group, variable, options),
        Some(Value::Arith(group)) => count_arith(group, variable, options),
        Some(Value::Bool(_)) | Some(Value::Unknown) | None => Err(unsupported(variable)),
    }
}

/// The same evaluation as [`count`], returned as a handle reusable at any
/// future bound without re-deriving the transfer matrix (spec.md §6's "a
/// symbolic-count expression evaluable at any bound"). Only meaningful
/// for string variables: an arithmetic variable's marginal is a direct
/// semilinear-set membership test, which has no matrix to amortize.
pub fn symbolic_count(symtab: &SymbolTable, variable: &str) -> Result<dfa::SymbolicCount> {
    match symtab.get(variable) {
        Some(Value::Str(group)) => {
            let single = extract_single_track(group, variable)?;
            Ok(dfa::SymbolicCount::new(single.automaton()))
        }
        _ => Err(unsupported(variable)),
    }
}

fn unsupported(variable: &str) -> Error {
    Error::UnsupportedConstruct { what: format!("count over variable '{variable}'"), location: Location::default() }
}

/// Projects a string group down to `variable`'s own track, undoing the
/// padding-lambda lift every string group is built under (spec.md §4.4's
/// "project(track)"), so the returned automaton's word length is the
/// variable's actual string length rather than the group's padded step
/// count.
fn extract_single_track(group: &StrGroupValue, variable: &str) -> Result<dfa::StringAutomaton> {
    let index = group.ordering.iter().position(|v| v == variable).ok_or_else(|| Error::Internal {
        message: format!("{variable} missing from its own string group ordering"),
    })?;
    Ok(multitrack::extract_track(&group.automaton, index, group.ordering.len()))
}

fn count_string(group: &StrGroupValue, variable: &str, options: &SolverOptions) -> Result<BigUint> {
    let single = extract_single_track(group, variable)?;
    let automaton = single.automaton();
    Ok(match options.count_mode {
        CountMode::Exact => dfa::count_exact(automaton, options.bound),
        CountMode::AtMost => dfa::count_at_most(automaton, options.bound),
    })
}

/// Counts `variable`'s satisfying values directly off its arithmetic
/// group's semilinear set (spec.md §8 scenario 1: `count(x, 10, ≤) = 1`
/// for `x = 3` counts values in `0..=bound`, not word lengths — an
/// integer automaton has no per-step "length" a bound could range over).
/// As with the rest of the semilinear bridge (spec.md §4.3), only the
/// non-negative half of the two's-complement range is addressable this
/// way; a negative witness value is still reported by the solver, but
/// `count` over a variable whose satisfying set is entirely negative
/// undercounts to zero. See DESIGN.md.
fn count_arith(group: &ArithGroupValue, variable: &str, options: &SolverOptions) -> Result<BigUint> {
    let index = group.ordering.iter().position(|v| v == variable).ok_or_else(|| Error::Internal {
        message: format!("{variable} missing from its own arithmetic group ordering"),
    })?;
    let matches = |v: i64| group.automaton.accepts_value_at(index, v);
    Ok(match options.count_mode {
        CountMode::Exact => {
            if matches(options.bound as i64) {
                BigUint::from(1u32)
            } else {
                BigUint::from(0u32)
            }
        }
        CountMode::AtMost => (0..=options.bound as i64).filter(|&v| matches(v)).fold(BigUint::from(0u32), |acc, _| acc + 1u32),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfa::{IntAutomaton, Relation, StringAutomaton};

    fn options(bound: u64, mode: CountMode) -> SolverOptions {
        SolverOptions { bound, count_mode: mode, bit_width: 6, ..SolverOptions::default() }
    }

    #[test]
    fn counts_single_satisfying_value() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        let automaton = IntAutomaton::linear_constraint(&[1], Relation::Eq, 3, 6);
        symtab.bind("x", Value::Arith(ArithGroupValue { automaton, ordering: vec!["x".to_string()] }));

        let total = count(&symtab, "x", &options(10, CountMode::AtMost)).unwrap();
        assert_eq!(total, BigUint::from(1u32));
    }

    #[test]
    fn counts_every_string_up_to_bound_forced_to_one_byte() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        let length_one = StringAutomaton::char_range(0, 255);
        let lifted = multitrack::lift_track(&length_one, 0, 1);
        symtab.bind("x", Value::Str(StrGroupValue { automaton: lifted, ordering: vec!["x".to_string()] }));

        let total = count(&symtab, "x", &options(5, CountMode::AtMost)).unwrap();
        assert_eq!(total, BigUint::from(256u32));
    }

    #[test]
    fn unbound_variable_is_unsupported() {
        let symtab = SymbolTable::new();
        assert!(count(&symtab, "missing", &options(10, CountMode::AtMost)).is_err());
    }
}
