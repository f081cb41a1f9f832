//! The syntactic processor and optimizer (spec.md §4.7 steps 1-2):
//! normalize `x ≠ c` into the negated-equality form downstream prefers,
//! flatten nested And/Or, fold constants, and apply absorption /
//! idempotence identities.

use std::rc::Rc;

use super::{is_false, is_true, transform_bottom_up};
use crate::ast::{Term, TermRef};

/// Normalizes `NotEq` into `Not(Eq(...))` and flattens nested And/Or of
/// the same kind into one flat list.
pub fn normalize(term: &TermRef) -> TermRef {
    transform_bottom_up(term, &mut |t| match t.as_ref() {
        Term::NotEq(a, b) => Rc::new(Term::Not(Rc::new(Term::Eq(a.clone(), b.clone())))),
        Term::And(children) => Rc::new(Term::And(flatten(children, |c| matches!(c, Term::And(_)), |c| match c {
            Term::And(inner) => inner.clone(),
            _ => unreachable!(),
        }))),
        Term::Or(children) => Rc::new(Term::Or(flatten(children, |c| matches!(c, Term::Or(_)), |c| match c {
            Term::Or(inner) => inner.clone(),
            _ => unreachable!(),
        }))),
        _ => t.clone(),
    })
}

fn flatten(children: &[TermRef], is_same: impl Fn(&Term) -> bool, unwrap: impl Fn(&Term) -> Vec<TermRef>) -> Vec<TermRef> {
    let mut out = Vec::with_capacity(children.len());
    for c in children {
        if is_same(c) {
            out.extend(unwrap(c));
        } else {
            out.push(c.clone());
        }
    }
    out
}

/// Constant folding, absorption (`x ∧ ⊤ → x`, `x ∨ ⊥ → x`) and idempotence
/// (`x ∧ x → x`), applied bottom-up.
pub fn optimize(term: &TermRef) -> TermRef {
    transform_bottom_up(term, &mut |t| fold_one(t))
}

fn fold_one(t: &TermRef) -> TermRef {
    match t.as_ref() {
        Term::Not(inner) => match inner.as_ref() {
            Term::BoolConstant(b) => Term::bool_const(!b),
            Term::Not(x) => x.clone(),
            _ => t.clone(),
        },
        Term::And(children) => {
            if children.iter().any(|c| is_false(c)) {
                return Term::bool_const(false);
            }
            let mut deduped: Vec<TermRef> = Vec::new();
            for c in children {
                if is_true(c) {
                    continue;
                }
                if !deduped.contains(c) {
                    deduped.push(c.clone());
                }
            }
            match deduped.len() {
                0 => Term::bool_const(true),
                1 => deduped.into_iter().next().unwrap(),
                _ => Rc::new(Term::And(deduped)),
            }
        }
        Term::Or(children) => {
            if children.iter().any(|c| is_true(c)) {
                return Term::bool_const(true);
            }
            let mut deduped: Vec<TermRef> = Vec::new();
            for c in children {
                if is_false(c) {
                    continue;
                }
                if !deduped.contains(c) {
                    deduped.push(c.clone());
                }
            }
            match deduped.len() {
                0 => Term::bool_const(false),
                1 => deduped.into_iter().next().unwrap(),
                _ => Rc::new(Term::Or(deduped)),
            }
        }
        Term::Ite(cond, then_branch, else_branch) => match cond.as_ref() {
            Term::BoolConstant(true) => then_branch.clone(),
            Term::BoolConstant(false) => else_branch.clone(),
            _ if then_branch == else_branch => then_branch.clone(),
            _ => t.clone(),
        },
        Term::Eq(a, b) if a == b => Term::bool_const(true),
        _ => t.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_with_false_child_folds_to_false() {
        let t = Rc::new(Term::And(vec![Term::var("x"), Term::bool_const(false)]));
        assert_eq!(*optimize(&t), Term::BoolConstant(false));
    }

    #[test]
    fn nested_and_flattens() {
        let inner = Rc::new(Term::And(vec![Term::var("a"), Term::var("b")]));
        let outer = Rc::new(Term::And(vec![inner, Term::var("c")]));
        let flat = normalize(&outer);
        match flat.as_ref() {
            Term::And(children) => assert_eq!(children.len(), 3),
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn not_eq_becomes_negated_eq() {
        let t = Rc::new(Term::NotEq(Term::var("x"), Term::int_const(3)));
        let normalized = normalize(&t);
        assert!(matches!(normalized.as_ref(), Term::Not(_)));
    }
}
