//! The equivalence generator (spec.md §4.7 step 5): union-find over
//! variables forced equal by top-level `Eq` atoms, rewritten to a single
//! canonical representative per class.

use std::collections::HashMap;

use super::transform_bottom_up;
use crate::ast::{Term, TermRef};

/// A union-find whose representative for each class is whichever member
/// was inserted first (matches union-find's natural root choice when
/// always unioning into the earlier-seen root).
struct UnionFind {
    parent: HashMap<String, String>,
    order: Vec<String>,
}

impl UnionFind {
    fn new() -> Self {
        Self { parent: HashMap::new(), order: Vec::new() }
    }

    fn make(&mut self, name: &str) {
        if !self.parent.contains_key(name) {
            self.parent.insert(name.to_string(), name.to_string());
            self.order.push(name.to_string());
        }
    }

    fn find(&mut self, name: &str) -> String {
        let parent = self.parent.get(name).cloned().unwrap_or_else(|| name.to_string());
        if parent == name {
            return parent;
        }
        let root = self.find(&parent);
        self.parent.insert(name.to_string(), root.clone());
        root
    }

    /// Unions `a` and `b`, keeping whichever root was inserted earlier as
    /// the representative.
    fn union(&mut self, a: &str, b: &str) {
        self.make(a);
        self.make(b);
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let ra_index = self.order.iter().position(|n| n == &ra).unwrap();
        let rb_index = self.order.iter().position(|n| n == &rb).unwrap();
        if ra_index <= rb_index {
            self.parent.insert(rb, ra);
        } else {
            self.parent.insert(ra, rb);
        }
    }
}

/// Top-level conjuncts of `term`: its own children if it is an `And`,
/// otherwise the single-element list `[term]`.
fn top_level_conjuncts(term: &TermRef) -> Vec<TermRef> {
    match term.as_ref() {
        Term::And(children) => children.clone(),
        _ => vec![term.clone()],
    }
}

pub fn run(term: &TermRef) -> TermRef {
    let mut uf = UnionFind::new();
    for conjunct in top_level_conjuncts(term) {
        if let Term::Eq(a, b) = conjunct.as_ref() {
            if let (Term::Variable(x), Term::Variable(y)) = (a.as_ref(), b.as_ref()) {
                uf.union(x, y);
            }
        }
    }
    if uf.parent.is_empty() {
        return term.clone();
    }
    let mut representative = HashMap::new();
    for name in uf.order.clone() {
        let root = uf.find(&name);
        if root != name {
            representative.insert(name, root);
        }
    }
    if representative.is_empty() {
        return term.clone();
    }
    transform_bottom_up(term, &mut |t| match t.as_ref() {
        Term::Variable(name) => match representative.get(name) {
            Some(root) => Term::var(root.clone()),
            None => t.clone(),
        },
        _ => t.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn transitive_equalities_collapse_to_one_representative() {
        let xy = Rc::new(Term::Eq(Term::var("x"), Term::var("y")));
        let yz = Rc::new(Term::Eq(Term::var("y"), Term::var("z")));
        let use_z = Rc::new(Term::Gt(Term::var("z"), Term::int_const(0)));
        let and = Rc::new(Term::And(vec![xy, yz, use_z]));
        let result = run(&and);
        match result.as_ref() {
            Term::And(children) => match children[2].as_ref() {
                Term::Gt(a, _) => assert!(matches!(a.as_ref(), Term::Variable(n) if n == "x")),
                _ => panic!("expected Gt"),
            },
            _ => panic!("expected And"),
        }
    }
}
