//! The formula optimizer (spec.md §4.7 step 3): canonical-form atom
//! hashing for duplicate removal within an And/Or, and collapsing
//! `x = true`/`x = false` into the Boolean variable itself.

use std::collections::HashSet;
use std::rc::Rc;

use super::transform_bottom_up;
use crate::ast::{Term, TermRef};

/// A canonical string form of a term, with operand order normalized for
/// commutative atoms (`Eq`, `NotEq`, `And`, `Or`) so two syntactically
/// different but semantically identical atoms hash the same way. This
/// never changes the AST itself; it is only used as a dedup key.
pub fn canonical_key(term: &TermRef) -> String {
    match term.as_ref() {
        Term::Eq(a, b) | Term::NotEq(a, b) => {
            let tag = if matches!(term.as_ref(), Term::Eq(..)) { "Eq" } else { "NotEq" };
            let mut parts = [canonical_key(a), canonical_key(b)];
            parts.sort();
            format!("{}({},{})", tag, parts[0], parts[1])
        }
        Term::And(children) | Term::Or(children) => {
            let tag = if matches!(term.as_ref(), Term::And(_)) { "And" } else { "Or" };
            let mut parts: Vec<String> = children.iter().map(canonical_key).collect();
            parts.sort();
            format!("{}[{}]", tag, parts.join(","))
        }
        _ => format!("{:?}", term),
    }
}

/// Drops duplicate conjuncts/disjuncts (by canonical form) within the
/// same And/Or, and collapses `x = true → x`, `x = false → ¬x`.
pub fn run(term: &TermRef) -> TermRef {
    transform_bottom_up(term, &mut |t| match t.as_ref() {
        Term::Eq(a, b) => collapse_bool_eq(a, b, t),
        Term::And(children) => Rc::new(Term::And(dedup(children))),
        Term::Or(children) => Rc::new(Term::Or(dedup(children))),
        _ => t.clone(),
    })
}

fn collapse_bool_eq(a: &TermRef, b: &TermRef, fallback: &TermRef) -> TermRef {
    match (a.as_ref(), b.as_ref()) {
        (Term::Variable(_), Term::BoolConstant(true)) => a.clone(),
        (Term::BoolConstant(true), Term::Variable(_)) => b.clone(),
        (Term::Variable(_), Term::BoolConstant(false)) => Term::not(a.clone()),
        (Term::BoolConstant(false), Term::Variable(_)) => Term::not(b.clone()),
        _ => fallback.clone(),
    }
}

fn dedup(children: &[TermRef]) -> Vec<TermRef> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(children.len());
    for c in children {
        if seen.insert(canonical_key(c)) {
            out.push(c.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_operand_order_does_not_affect_canonical_key() {
        let a = Rc::new(Term::Eq(Term::var("x"), Term::var("y")));
        let b = Rc::new(Term::Eq(Term::var("y"), Term::var("x")));
        assert_eq!(canonical_key(&a), canonical_key(&b));
    }

    #[test]
    fn duplicate_conjuncts_with_swapped_eq_operands_are_dropped() {
        let a = Rc::new(Term::Eq(Term::var("x"), Term::var("y")));
        let b = Rc::new(Term::Eq(Term::var("y"), Term::var("x")));
        let and = Rc::new(Term::And(vec![a, b]));
        let result = run(&and);
        match result.as_ref() {
            Term::And(children) => assert_eq!(children.len(), 1),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn x_equals_true_collapses_to_x() {
        let t = Rc::new(Term::Eq(Term::var("b"), Term::bool_const(true)));
        let result = run(&t);
        assert!(matches!(result.as_ref(), Term::Variable(name) if name == "b"));
    }
}
