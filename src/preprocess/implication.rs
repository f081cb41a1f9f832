//! The implication runner (spec.md §4.7 step 4): propagate simple
//! equalities found directly in an And's children into its siblings, and
//! rewrite `len(s) = 0` into `s = ""`.

use std::collections::HashMap;
use std::rc::Rc;

use super::transform_bottom_up;
use crate::ast::{Term, TermRef};

pub fn run(term: &TermRef) -> TermRef {
    let rewritten = transform_bottom_up(term, &mut |t| match t.as_ref() {
        Term::Eq(a, b) => rewrite_len_zero(a, b, t),
        _ => t.clone(),
    });
    transform_bottom_up(&rewritten, &mut |t| match t.as_ref() {
        Term::And(children) => Rc::new(Term::And(propagate_equalities(children))),
        _ => t.clone(),
    })
}

fn rewrite_len_zero(a: &TermRef, b: &TermRef, fallback: &TermRef) -> TermRef {
    match (a.as_ref(), b.as_ref()) {
        (Term::Len(s), Term::IntConstant(0)) | (Term::IntConstant(0), Term::Len(s)) => {
            Rc::new(Term::Eq(s.clone(), Term::string_const("")))
        }
        _ => fallback.clone(),
    }
}

/// For each `Eq(Variable(x), Variable(y))` found directly among
/// `children`, substitutes `y` with `x` everywhere else in `children`
/// (spec.md's `x = y ∧ φ(x) ⇒ substitute y for x in φ`).
fn propagate_equalities(children: &[TermRef]) -> Vec<TermRef> {
    let mut substitution: HashMap<String, String> = HashMap::new();
    for c in children {
        if let Term::Eq(a, b) = c.as_ref() {
            if let (Term::Variable(x), Term::Variable(y)) = (a.as_ref(), b.as_ref()) {
                substitution.entry(y.clone()).or_insert_with(|| x.clone());
            }
        }
    }
    if substitution.is_empty() {
        return children.to_vec();
    }
    children.iter().map(|c| substitute_vars(c, &substitution)).collect()
}

fn substitute_vars(term: &TermRef, substitution: &HashMap<String, String>) -> TermRef {
    transform_bottom_up(term, &mut |t| match t.as_ref() {
        Term::Variable(name) => match substitution.get(name) {
            Some(replacement) => Term::var(replacement.clone()),
            None => t.clone(),
        },
        _ => t.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_zero_rewrites_to_empty_string_equality() {
        let t = Rc::new(Term::Eq(Rc::new(Term::Len(Term::var("s"))), Term::int_const(0)));
        let result = run(&t);
        match result.as_ref() {
            Term::Eq(a, b) => {
                assert!(matches!(a.as_ref(), Term::Variable(name) if name == "s"));
                assert!(matches!(b.as_ref(), Term::StringConstant(s) if s.is_empty()));
            }
            _ => panic!("expected Eq"),
        }
    }

    #[test]
    fn equality_propagates_into_sibling_conjunct() {
        let eq = Rc::new(Term::Eq(Term::var("x"), Term::var("y")));
        let phi = Rc::new(Term::Gt(Term::var("y"), Term::int_const(0)));
        let and = Rc::new(Term::And(vec![eq, phi]));
        let result = run(&and);
        match result.as_ref() {
            Term::And(children) => {
                assert!(matches!(children[1].as_ref(), Term::Gt(a, _) if matches!(a.as_ref(), Term::Variable(n) if n == "x")));
            }
            _ => panic!("expected And"),
        }
    }
}
