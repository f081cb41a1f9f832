//! Syntactic preprocessing (spec.md §4.7): a fixed sequence of AST
//! rewrites applied until none fires.

pub mod equivalence;
pub mod formula_opt;
pub mod implication;
pub mod syntactic;

use std::rc::Rc;

use crate::ast::{Term, TermRef};

/// Rebuilds `term` bottom-up, applying `f` to every node after its
/// children have already been rewritten.
pub fn transform_bottom_up(term: &TermRef, f: &mut impl FnMut(&TermRef) -> TermRef) -> TermRef {
    let children = term.children();
    if children.is_empty() {
        return f(term);
    }
    let new_children: Vec<TermRef> = children.iter().map(|c| transform_bottom_up(c, f)).collect();
    let rebuilt = Rc::new(term.rebuild(new_children));
    f(&rebuilt)
}

/// Runs every preprocessing pass (spec.md §4.7, in the specified order)
/// to a fixpoint: syntactic normalization, constant folding/absorption,
/// duplicate-conjunct removal, implication-based substitution, and
/// variable-equivalence rewriting.
pub fn run(term: TermRef) -> TermRef {
    const MAX_ROUNDS: usize = 64;
    let mut current = term;
    for _ in 0..MAX_ROUNDS {
        let mut next = syntactic::normalize(&current);
        next = syntactic::optimize(&next);
        next = formula_opt::run(&next);
        next = implication::run(&next);
        next = equivalence::run(&next);
        if next == current {
            return next;
        }
        current = next;
    }
    log::warn!("preprocessing did not reach a fixpoint after {} rounds", MAX_ROUNDS);
    current
}

pub(crate) fn is_true(term: &Term) -> bool {
    matches!(term, Term::BoolConstant(true))
}
pub(crate) fn is_false(term: &Term) -> bool {
    matches!(term, Term::BoolConstant(false))
}
