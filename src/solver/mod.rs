//! Top-level constraint solver (spec.md §4.11): schedules the slicer, the
//! arithmetic and string solvers, and the mixed-constraint refinement
//! loop, and reports overall satisfiability.

pub mod arithmetic;
pub mod mixed;
pub mod string;

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{node_id, Sort, Term, TermRef};
use crate::error::Result;
use crate::options::SolverOptions;
use crate::slicer;
use crate::slicer::AtomClass;
use crate::symtab::{SymbolTable, Value};

/// The result of running the full pipeline over one top-level assertion.
pub struct Solution {
    pub sat: bool,
    pub symtab: SymbolTable,
}

/// Runs arithmetic solving, string solving and mixed refinement to
/// fixpoint over `term`, then checks every bound group for emptiness
/// (spec.md §4.11 steps 1-4, §7 "Unsatisfiable is the empty-language
/// automaton").
pub fn solve(term: &TermRef, declarations: &[(String, Sort)], options: &SolverOptions) -> Result<Solution> {
    let sorts: HashMap<String, Sort> = declarations.iter().cloned().collect();
    let normalized = push_negations(term);

    let mut symtab = SymbolTable::new();
    symtab.push_scope(node_id(&normalized));

    arithmetic::solve(&normalized, &mut symtab, &sorts, options)?;
    string::solve(&normalized, &mut symtab, &sorts, options)?;

    let mixed_links = mixed::collect_links(&normalized, &sorts)?;
    if !mixed_links.is_empty() {
        mixed::refine(&mixed_links, &mut symtab, options)?;
    }

    let names: Vec<String> = declarations.iter().map(|(name, _)| name.clone()).collect();
    let sat = !any_group_empty(&symtab, &names);
    Ok(Solution { sat, symtab })
}

/// Routes a comparison atom to [`AtomClass::Arithmetic`] or a string class
/// by declared sort when both sides are bare variables, a case
/// [`slicer::classify`] cannot resolve on shape alone (spec.md §4.8's
/// known gap: `(= x y)` between two string-sorted variables looks
/// identical to an integer equation without sort information).
pub(crate) fn classify_dispatch(term: &TermRef, sorts: &HashMap<String, Sort>) -> AtomClass {
    if let Term::Eq(a, b) | Term::NotEq(a, b) = term.as_ref() {
        if let (Term::Variable(x), Term::Variable(y)) = (a.as_ref(), b.as_ref()) {
            if sorts.get(x) == Some(&Sort::String) || sorts.get(y) == Some(&Sort::String) {
                return AtomClass::StringRelational;
            }
        }
    }
    slicer::classify(term)
}

/// Pushes `Not` inward over `And`/`Or` (De Morgan) so neither solver walk
/// ever has to special-case a negated Boolean-structure node, only negated
/// atoms (spec.md §4.9/§4.10 assume `Not` only ever wraps an atom).
pub(crate) fn push_negations(term: &TermRef) -> TermRef {
    crate::preprocess::transform_bottom_up(term, &mut |t| match t.as_ref() {
        Term::Not(inner) => match inner.as_ref() {
            Term::Not(grandchild) => grandchild.clone(),
            Term::And(cs) => Rc::new(Term::Or(cs.iter().map(|c| push_negations(&Term::not(c.clone()))).collect())),
            Term::Or(cs) => Rc::new(Term::And(cs.iter().map(|c| push_negations(&Term::not(c.clone()))).collect())),
            _ => t.clone(),
        },
        _ => t.clone(),
    })
}

fn any_group_empty(symtab: &SymbolTable, names: &[String]) -> bool {
    names.iter().any(|name| match symtab.get(name) {
        Some(Value::Arith(v)) => v.automaton.is_empty(),
        Some(Value::Str(v)) => v.automaton.is_empty_language(),
        _ => false,
    })
}

/// Top-level conjuncts of `term`, used by both solver passes to find the
/// And/Or Boolean structure to recurse over (spec.md §4.8's slicer reuses
/// the identical helper for the same purpose).
pub(crate) fn top_level_conjuncts(term: &TermRef) -> Vec<TermRef> {
    slicer::top_level_conjuncts(term)
}

/// `true` if `term` is pure Boolean structure this module recurses
/// through directly (And/Or/Not), as opposed to an atomic constraint a
/// solver builds an automaton for.
pub(crate) fn is_structural(term: &Term) -> bool {
    matches!(term, Term::And(_) | Term::Or(_))
}

pub(crate) fn and_node(children: Vec<TermRef>) -> TermRef {
    Rc::new(Term::And(children))
}
