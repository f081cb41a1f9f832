//! Mixed-constraint refinement (spec.md §4.11): ties a string group's
//! length to the arithmetic side it is compared against and shrinks both
//! groups to a fixpoint.
//!
//! The only mixed wrapper bridged here is `str.len` (spec.md §4.11's
//! worked example, `len(s) = n`, and §8 scenario 3); `str.indexof`,
//! `str.replace` and `str.to_int` are also tagged [`AtomClass::Mixed`] by
//! the slicer but have no worked refinement scenario to ground a
//! bridge on, so a link built on one of them is reported as an
//! [`crate::error::Error::UnsupportedConstruct`] rather than silently
//! dropped.

use std::collections::HashMap;

use indexmap::IndexMap;

use dfa::{multitrack, IntAutomaton, StringAutomaton};

use crate::ast::{Sort, Term, TermRef};
use crate::error::{Error, Location, Result};
use crate::formula::RelOp;
use crate::options::SolverOptions;
use crate::symtab::{ArithGroupValue, StrGroupValue, SymbolTable, Value};

use super::arithmetic::lower_expr;
use super::classify_dispatch;
use super::AtomClass;

/// One `len(string_var) ⋈ (Σ coefficients·x + constant)` link found in
/// the assertion. `coefficients` holds at most one variable: a link
/// whose arithmetic side mentions more than one variable is outside the
/// worked scenarios this bridge is grounded on and is skipped
/// conservatively (spec.md §9's "do not guess intent" posture) rather
/// than narrowing unsoundly.
pub struct MixedLink {
    string_var: String,
    relation: RelOp,
    coefficients: IndexMap<String, i64>,
    constant: i64,
}

/// Walks `term` the same way the arithmetic/string solvers do, collecting
/// every atom [`classify_dispatch`] routes to [`AtomClass::Mixed`] that
/// is a `str.len` comparison.
pub fn collect_links(term: &TermRef, sorts: &HashMap<String, Sort>) -> Result<Vec<MixedLink>> {
    let mut out = Vec::new();
    collect(term, sorts, &mut out)?;
    Ok(out)
}

fn collect(term: &TermRef, sorts: &HashMap<String, Sort>, out: &mut Vec<MixedLink>) -> Result<()> {
    match term.as_ref() {
        Term::And(cs) | Term::Or(cs) => {
            for c in cs {
                collect(c, sorts, out)?;
            }
            Ok(())
        }
        Term::Exists(_, body) | Term::ForAll(_, body) => collect(body, sorts, out),
        Term::Let(bindings, body) => {
            for (_, t) in bindings {
                collect(t, sorts, out)?;
            }
            collect(body, sorts, out)
        }
        Term::Exclamation(inner, _) => collect(inner, sorts, out),
        _ => {
            if classify_dispatch(term, sorts) == AtomClass::Mixed {
                if let Some(link) = try_len_link(term)? {
                    out.push(link);
                }
            }
            Ok(())
        }
    }
}

/// Recognizes a `len(s) ⋈ expr` comparison, in either operand order and
/// under any number of `Not`s. Returns `Ok(None)` for a mixed atom this
/// bridge does not cover (`str.indexof`/`str.replace`/`str.to_int` links,
/// or a `len` comparison whose other side is non-linear) only when the
/// atom is genuinely out of scope; a `len` atom that *is* in scope but
/// whose arithmetic side names more than one variable is also `Ok(None)`,
/// conservatively under-refined rather than rejected.
fn try_len_link(atom: &TermRef) -> Result<Option<MixedLink>> {
    match atom.as_ref() {
        Term::Eq(a, b) => from_comparison(a, b, RelOp::Eq),
        Term::NotEq(a, b) => from_comparison(a, b, RelOp::Ne),
        Term::Gt(a, b) => from_comparison(a, b, RelOp::Gt),
        Term::Ge(a, b) => from_comparison(a, b, RelOp::Ge),
        Term::Lt(a, b) => from_comparison(a, b, RelOp::Lt),
        Term::Le(a, b) => from_comparison(a, b, RelOp::Le),
        Term::Not(inner) => Ok(try_len_link(inner)?.map(|link| link.negated())),
        Term::BoolConstant(_) => Ok(None),
        _ => unsupported(atom),
    }
}

fn from_comparison(a: &TermRef, b: &TermRef, relation: RelOp) -> Result<Option<MixedLink>> {
    match (a.as_ref(), b.as_ref()) {
        (Term::Len(s), _) => build_link(s, b, relation),
        (_, Term::Len(s)) => build_link(s, a, mirror(relation)),
        _ => unsupported(a),
    }
}

fn build_link(s: &TermRef, expr: &TermRef, relation: RelOp) -> Result<Option<MixedLink>> {
    let name = match s.as_ref() {
        Term::Variable(name) => name.clone(),
        _ => return unsupported(s),
    };
    let (coefficients, constant) = lower_expr(expr)?;
    if coefficients.len() > 1 {
        log::debug!("skipping mixed refinement for len({name}): arithmetic side names more than one variable");
        return Ok(None);
    }
    Ok(Some(MixedLink { string_var: name, relation, coefficients, constant }))
}

fn mirror(relation: RelOp) -> RelOp {
    match relation {
        RelOp::Lt => RelOp::Gt,
        RelOp::Gt => RelOp::Lt,
        RelOp::Le => RelOp::Ge,
        RelOp::Ge => RelOp::Le,
        RelOp::Eq => RelOp::Eq,
        RelOp::Ne => RelOp::Ne,
    }
}

impl MixedLink {
    fn negated(self) -> Self {
        let relation = match self.relation {
            RelOp::Eq => RelOp::Ne,
            RelOp::Ne => RelOp::Eq,
            RelOp::Lt => RelOp::Ge,
            RelOp::Le => RelOp::Gt,
            RelOp::Gt => RelOp::Le,
            RelOp::Ge => RelOp::Lt,
        };
        Self { relation, ..self }
    }
}

fn unsupported<T>(term: &TermRef) -> Result<T> {
    Err(Error::UnsupportedConstruct { what: format!("{:?}", term.as_ref()), location: Location::default() })
}

fn check_abort(options: &SolverOptions) -> Result<()> {
    if options.abort.is_set() {
        return Err(Error::Aborted);
    }
    Ok(())
}

/// Runs the refinement loop (spec.md §4.11) to a fixpoint: each round
/// applies every link once; the loop stops when a round changes no
/// group, or after a bound high enough that non-termination would
/// indicate a kernel bug rather than a slow-converging instance.
pub fn refine(links: &[MixedLink], symtab: &mut SymbolTable, options: &SolverOptions) -> Result<()> {
    const MAX_ROUNDS: usize = 64;
    for round in 0..MAX_ROUNDS {
        check_abort(options)?;
        let mut changed = false;
        for link in links {
            changed |= refine_one(link, symtab, options)?;
        }
        if !changed {
            return Ok(());
        }
        log::debug!("mixed refinement round {round} changed at least one group");
    }
    log::warn!("mixed refinement did not reach a fixpoint after {MAX_ROUNDS} rounds");
    Ok(())
}

/// One pass of spec.md §4.11's four steps for a single link, returning
/// whether either side's group actually shrank.
fn refine_one(link: &MixedLink, symtab: &mut SymbolTable, options: &SolverOptions) -> Result<bool> {
    ensure_string_group(symtab, &link.string_var)?;
    ensure_arith_var(symtab, link.coefficients.keys().next(), options);

    let str_before = symtab.get(&link.string_var).unwrap().as_str_value().unwrap().clone();
    let track = str_before.ordering.iter().position(|v| v == &link.string_var).ok_or_else(|| Error::Internal {
        message: format!("{} missing from its own string group ordering", link.string_var),
    })?;

    // Step 1: project the string group down to `string_var`'s length set.
    let single = multitrack::extract_track(&str_before.automaton, track, str_before.ordering.len());
    let length_set = single.automaton().length_automaton().extract_semilinear_set();

    let arith_var = link.coefficients.keys().next().cloned();
    let bit_width = options.bit_width;

    let (new_length_set, arith_changed) = match &arith_var {
        None => {
            // `len(s) ⋈ constant`: no arithmetic group is involved, the
            // constraint only narrows the string side.
            let joint = IntAutomaton::linear_constraint(&[1], link.relation.into(), link.constant, bit_width);
            let narrowed = joint.intersect(&IntAutomaton::from_semilinear_set(&length_set, bit_width))?;
            (narrowed.to_unary().extract_semilinear_set(), false)
        }
        Some(var) => {
            let coefficient = link.coefficients[var];
            let group = symtab.get(var).unwrap().as_arith().unwrap().clone();
            let index = group.ordering.iter().position(|v| v == var).ok_or_else(|| Error::Internal {
                message: format!("{var} missing from its own arithmetic group ordering"),
            })?;
            let var_set = group.automaton.semilinear_set_at(index);

            // `len(s) ⋈ coefficient*var + constant`, i.e.
            // `1*L - coefficient*var ⋈ constant` over a fresh 2-variable
            // (L, var) universe local to this link.
            let joint = IntAutomaton::linear_constraint(&[1, -coefficient], link.relation.into(), link.constant, bit_width)
                .intersect(&IntAutomaton::from_semilinear_set_at(&length_set, 0, 2, bit_width))?
                .intersect(&IntAutomaton::from_semilinear_set_at(&var_set, 1, 2, bit_width))?;

            // Read each variable's new reachable-value set directly off
            // the still-full-width joint automaton (spec.md §4.11 steps
            // 1-3 collapsed into one pair of reads): `semilinear_set_at`
            // only needs `joint`'s own track order, never a projected,
            // narrower automaton.
            let new_length_set = joint.semilinear_set_at(0);
            let new_var_set = joint.semilinear_set_at(1);

            let restricted = IntAutomaton::from_semilinear_set_at(&new_var_set, index, group.ordering.len(), bit_width);
            let before = group.automaton.clone();
            symtab.intersect_into_group(
                &group.ordering,
                Value::Arith(ArithGroupValue { automaton: restricted, ordering: group.ordering.clone() }),
            )?;
            let after = symtab.get(var).unwrap().as_arith().unwrap().automaton.clone();
            let arith_changed = !before.automaton().is_equivalent(after.automaton())?;
            (new_length_set, arith_changed)
        }
    };

    // Steps 3-4: restrict the string group to the (possibly shrunk)
    // length set and report whether anything actually changed.
    let length_automaton = StringAutomaton::from_length_automaton(&new_length_set.to_unary());
    let lifted = multitrack::lift_track(&length_automaton, track, str_before.ordering.len());
    let restricted_str = str_before.automaton.product(&lifted, dfa::ProductMode::Intersect)?;
    let str_changed = !str_before.automaton.is_equivalent(&restricted_str)?;
    symtab.set_group(
        &str_before.ordering,
        Value::Str(StrGroupValue { automaton: restricted_str, ordering: str_before.ordering.clone() }),
    );

    Ok(str_changed || arith_changed)
}

/// Binds a fresh single-track "any string" group for a variable that
/// appears only inside a `str.len` link, never in a plain string atom
/// (so [`super::string::solve`] never seeded it). Uses the same
/// multitrack-space construction [`super::string::solve`] uses for every
/// group, never a bare [`StringAutomaton`] built directly in the
/// single-track byte manager, since [`multitrack::extract_track`]/
/// [`multitrack::lift_track`] assume every group automaton already lives
/// in the padded multitrack universe.
fn ensure_string_group(symtab: &mut SymbolTable, name: &str) -> Result<()> {
    if symtab.get(name).is_some() {
        return Ok(());
    }
    let automaton = super::string::any_group(1)?;
    symtab.bind(name, Value::Str(StrGroupValue { automaton, ordering: vec![name.to_string()] }));
    Ok(())
}

fn ensure_arith_var(symtab: &mut SymbolTable, name: Option<&String>, options: &SolverOptions) {
    let Some(name) = name else { return };
    if symtab.get(name).is_some() {
        return;
    }
    symtab.bind(
        name.clone(),
        Value::Arith(ArithGroupValue { automaton: IntAutomaton::any(1, options.bit_width), ordering: vec![name.clone()] }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Term as T;
    use crate::options::SolverOptions;
    use crate::symtab::SymbolTable;
    use std::rc::Rc;

    /// Seeds a single-track string group the same way
    /// [`super::string::solve`] would have, lifting a plain
    /// [`StringAutomaton`] into the one-track multitrack universe.
    fn seed(symtab: &mut SymbolTable, name: &str, single: &StringAutomaton) {
        let automaton = multitrack::lift_track(single, 0, 1);
        symtab.bind(name, Value::Str(StrGroupValue { automaton, ordering: vec![name.to_string()] }));
    }

    /// `semilinear_set_at`/`from_semilinear_set*` brute-force the full
    /// non-negative half of a `bit_width`-bit domain, so tests use a
    /// narrow width to keep that bounded.
    fn test_options() -> SolverOptions {
        SolverOptions { bit_width: 6, ..SolverOptions::default() }
    }

    #[test]
    fn length_equals_constant_restricts_string_group() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        seed(&mut symtab, "s", &StringAutomaton::any_string());

        let term = Rc::new(T::Eq(Rc::new(T::Len(T::var("s"))), T::int_const(2)));
        let links = collect_links(&term, &HashMap::new()).unwrap();
        assert_eq!(links.len(), 1);
        refine(&links, &mut symtab, &test_options()).unwrap();

        let value = symtab.get("s").unwrap().as_str_value().unwrap();
        let witness = value.automaton.enumerate_witness(5).unwrap();
        assert_eq!(witness.len(), 2);
    }

    #[test]
    fn length_mismatch_is_unsatisfiable() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        seed(&mut symtab, "s", &StringAutomaton::literal(b"ab"));

        let term = Rc::new(T::Eq(Rc::new(T::Len(T::var("s"))), T::int_const(5)));
        let links = collect_links(&term, &HashMap::new()).unwrap();
        refine(&links, &mut symtab, &test_options()).unwrap();

        let value = symtab.get("s").unwrap().as_str_value().unwrap();
        assert!(value.automaton.is_empty_language());
    }

    #[test]
    fn length_tied_to_variable_narrows_both_groups() {
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        seed(&mut symtab, "s", &StringAutomaton::any_string());
        symtab.bind(
            "n",
            Value::Arith(ArithGroupValue { automaton: IntAutomaton::linear_constraint(&[1], dfa::Relation::Eq, 3, 6), ordering: vec!["n".to_string()] }),
        );

        let term = Rc::new(T::Eq(Rc::new(T::Len(T::var("s"))), T::var("n")));
        let links = collect_links(&term, &HashMap::new()).unwrap();
        refine(&links, &mut symtab, &test_options()).unwrap();

        let value = symtab.get("s").unwrap().as_str_value().unwrap();
        let witness = value.automaton.enumerate_witness(5).unwrap();
        assert_eq!(witness.len(), 3);
    }
}
