//! The arithmetic constraint solver (spec.md §4.9): builds one binary
//! Presburger automaton per connected group of integer variables,
//! intersecting in one [`dfa::IntAutomaton`] per atom and unioning branch
//! results back together at each `Or`.
//!
//! Every group's track order is fixed once, before any automaton is
//! built, by a union-find pre-pass over every arithmetic atom reachable
//! from the assertion (including atoms nested under `Or`): extending an
//! already-built [`dfa::IntAutomaton`] with a new track isn't supported by
//! the kernel, so the ordering has to be settled up front rather than
//! grown incrementally while walking the term.

use std::collections::HashMap;

use indexmap::IndexMap;

use dfa::IntAutomaton;

use crate::ast::{Sort, Term, TermRef};
use crate::error::{Error, Location, Result};
use crate::formula::{ArithFormula, RelOp};
use crate::options::SolverOptions;
use crate::symtab::{ArithGroupValue, SymbolTable, Value};

use super::classify_dispatch;
use super::AtomClass;

/// Fixed variable orderings for every arithmetic group, computed once
/// before any automaton is built.
struct Groups {
    root_of: HashMap<String, String>,
    ordering_of: HashMap<String, Vec<String>>,
}

impl Groups {
    fn ordering_for(&self, var: &str) -> Option<&Vec<String>> {
        self.root_of.get(var).and_then(|r| self.ordering_of.get(r))
    }

    fn all_orderings(&self) -> impl Iterator<Item = &Vec<String>> {
        self.ordering_of.values()
    }
}

struct UnionFind {
    parent: HashMap<String, String>,
    order: Vec<String>,
}
impl UnionFind {
    fn new() -> Self {
        Self { parent: HashMap::new(), order: Vec::new() }
    }
    fn make(&mut self, v: &str) {
        if !self.parent.contains_key(v) {
            self.parent.insert(v.to_string(), v.to_string());
            self.order.push(v.to_string());
        }
    }
    fn find(&mut self, v: &str) -> String {
        let p = self.parent[v].clone();
        if p == v {
            return p;
        }
        let root = self.find(&p);
        self.parent.insert(v.to_string(), root.clone());
        root
    }
    fn union(&mut self, a: &str, b: &str) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

fn build_groups(term: &TermRef, sorts: &HashMap<String, Sort>) -> Groups {
    let mut uf = UnionFind::new();
    let mut atoms = Vec::new();
    collect_atoms(term, sorts, &mut atoms);
    for atom in &atoms {
        let vars = atom.free_variables();
        for v in &vars {
            uf.make(v);
        }
        for pair in vars.windows(2) {
            uf.union(&pair[0], &pair[1]);
        }
    }
    let mut ordering_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut root_of: HashMap<String, String> = HashMap::new();
    for v in uf.order.clone() {
        let root = uf.find(&v);
        root_of.insert(v.clone(), root.clone());
        ordering_of.entry(root).or_default().push(v);
    }
    Groups { root_of, ordering_of }
}

/// Walks every atom reachable from `term` (through And/Or/Not/quantifiers,
/// regardless of nesting under an `Or`) that [`classify_dispatch`] routes
/// to [`AtomClass::Arithmetic`].
fn collect_atoms(term: &TermRef, sorts: &HashMap<String, Sort>, out: &mut Vec<TermRef>) {
    match term.as_ref() {
        Term::And(cs) | Term::Or(cs) => {
            for c in cs {
                collect_atoms(c, sorts, out);
            }
        }
        Term::Exists(_, body) | Term::ForAll(_, body) => collect_atoms(body, sorts, out),
        Term::Let(bindings, body) => {
            for (_, t) in bindings {
                collect_atoms(t, sorts, out);
            }
            collect_atoms(body, sorts, out);
        }
        Term::Exclamation(inner, _) => collect_atoms(inner, sorts, out),
        _ => {
            if classify_dispatch(term, sorts) == AtomClass::Arithmetic {
                out.push(term.clone());
            }
        }
    }
}

/// Entry point: fixes every arithmetic group's ordering, seeds every group
/// to "any", then walks the Boolean structure intersecting/unioning
/// constraints in (spec.md §4.9).
pub fn solve(term: &TermRef, symtab: &mut SymbolTable, sorts: &HashMap<String, Sort>, options: &SolverOptions) -> Result<()> {
    let groups = build_groups(term, sorts);
    for ordering in groups.all_orderings() {
        let value = Value::Arith(ArithGroupValue {
            automaton: IntAutomaton::any(ordering.len(), options.bit_width),
            ordering: ordering.clone(),
        });
        symtab.bind_group(ordering, value);
    }
    walk(term, symtab, &groups, sorts, options)
}

fn check_abort(options: &SolverOptions) -> Result<()> {
    if options.abort.is_set() {
        return Err(Error::Aborted);
    }
    Ok(())
}

fn walk(term: &TermRef, symtab: &mut SymbolTable, groups: &Groups, sorts: &HashMap<String, Sort>, options: &SolverOptions) -> Result<()> {
    check_abort(options)?;
    match term.as_ref() {
        Term::And(cs) => {
            for c in cs {
                walk(c, symtab, groups, sorts, options)?;
            }
            Ok(())
        }
        Term::Or(cs) => walk_or(cs, symtab, groups, sorts, options),
        Term::Exists(_, body) | Term::ForAll(_, body) => walk_scoped(body, symtab, groups, sorts, options),
        Term::Let(_, body) => walk_scoped(body, symtab, groups, sorts, options),
        Term::Exclamation(inner, _) => walk(inner, symtab, groups, sorts, options),
        _ => {
            if classify_dispatch(term, sorts) == AtomClass::Arithmetic {
                process_atom(term, symtab, groups, options)?;
            }
            Ok(())
        }
    }
}

/// Pushes a scope for a quantifier/let body, then intersects the popped
/// bindings back into the enclosing scope (these aren't disjunctive, so
/// unlike an `Or` branch the result is folded in directly).
fn walk_scoped(body: &TermRef, symtab: &mut SymbolTable, groups: &Groups, sorts: &HashMap<String, Sort>, options: &SolverOptions) -> Result<()> {
    symtab.push_scope(crate::ast::node_id(body));
    walk(body, symtab, groups, sorts, options)?;
    let popped = symtab.pop_scope();
    for (name, value) in popped {
        symtab.intersect_into_group(&[name], value)?;
    }
    Ok(())
}

fn walk_or(disjuncts: &[TermRef], symtab: &mut SymbolTable, groups: &Groups, sorts: &HashMap<String, Sort>, options: &SolverOptions) -> Result<()> {
    let mut unioned: HashMap<String, Value> = HashMap::new();
    for disjunct in disjuncts {
        symtab.push_scope(crate::ast::node_id(disjunct));
        walk(disjunct, symtab, groups, sorts, options)?;
        let popped = symtab.pop_scope();
        for (name, value) in popped {
            match unioned.remove(&name) {
                Some(existing) => unioned.insert(name, existing.union(&value)?),
                None => unioned.insert(name, value),
            };
        }
    }
    for (name, value) in unioned {
        symtab.set_group(&[name], value);
    }
    Ok(())
}

fn process_atom(atom: &TermRef, symtab: &mut SymbolTable, groups: &Groups, options: &SolverOptions) -> Result<()> {
    let formulas = lower_atom(atom)?;
    for formula in formulas {
        let ordering = formula
            .variables()
            .next()
            .and_then(|v| groups.ordering_for(v))
            .cloned()
            .unwrap_or_default();
        let automaton = if formula.is_statically_unsat() {
            IntAutomaton::none(ordering.len().max(1), options.bit_width)
        } else if formula.is_statically_valid() {
            IntAutomaton::any(ordering.len().max(1), options.bit_width)
        } else {
            IntAutomaton::linear_constraint(
                &formula.coefficients_in_order(&ordering),
                formula.relation.into(),
                formula.constant,
                options.bit_width,
            )
        };
        symtab.intersect_into_group(&ordering, Value::Arith(ArithGroupValue { automaton, ordering: ordering.clone() }))?;
    }
    Ok(())
}

/// Lowers one arithmetic atom to one or more [`ArithFormula`]s (more than
/// one only for `distinct`, which expands to its pairwise inequations).
fn lower_atom(atom: &TermRef) -> Result<Vec<ArithFormula>> {
    match atom.as_ref() {
        Term::Eq(a, b) => Ok(vec![comparison(a, b, RelOp::Eq)?]),
        Term::NotEq(a, b) => Ok(vec![comparison(a, b, RelOp::Ne)?]),
        Term::Gt(a, b) => Ok(vec![comparison(a, b, RelOp::Gt)?]),
        Term::Ge(a, b) => Ok(vec![comparison(a, b, RelOp::Ge)?]),
        Term::Lt(a, b) => Ok(vec![comparison(a, b, RelOp::Lt)?]),
        Term::Le(a, b) => Ok(vec![comparison(a, b, RelOp::Le)?]),
        Term::Not(inner) => lower_negated(inner),
        Term::Distinct(ts) => {
            let mut out = Vec::new();
            for i in 0..ts.len() {
                for j in (i + 1)..ts.len() {
                    out.push(comparison(&ts[i], &ts[j], RelOp::Ne)?);
                }
            }
            Ok(out)
        }
        Term::BoolConstant(true) => Ok(vec![]),
        Term::BoolConstant(false) => Ok(vec![ArithFormula::new(IndexMap::new(), 1, RelOp::Eq)]),
        _ => unsupported(atom),
    }
}

fn lower_negated(inner: &TermRef) -> Result<Vec<ArithFormula>> {
    let negated = match inner.as_ref() {
        Term::Eq(a, b) => RelOp::Ne.apply(a, b),
        Term::NotEq(a, b) => RelOp::Eq.apply(a, b),
        Term::Gt(a, b) => RelOp::Le.apply(a, b),
        Term::Ge(a, b) => RelOp::Lt.apply(a, b),
        Term::Lt(a, b) => RelOp::Ge.apply(a, b),
        Term::Le(a, b) => RelOp::Gt.apply(a, b),
        _ => None,
    };
    match negated {
        Some(pair) => Ok(vec![comparison(pair.0, pair.1, pair.2)?]),
        None => unsupported(inner),
    }
}

trait ApplyRel {
    fn apply<'a>(self, a: &'a TermRef, b: &'a TermRef) -> Option<(&'a TermRef, &'a TermRef, RelOp)>;
}
impl ApplyRel for RelOp {
    fn apply<'a>(self, a: &'a TermRef, b: &'a TermRef) -> Option<(&'a TermRef, &'a TermRef, RelOp)> {
        Some((a, b, self))
    }
}

fn comparison(a: &TermRef, b: &TermRef, relation: RelOp) -> Result<ArithFormula> {
    let (coeffs_a, const_a) = lower_expr(a)?;
    let (coeffs_b, const_b) = lower_expr(b)?;
    let mut coefficients: IndexMap<String, i64> = IndexMap::new();
    for (name, c) in coeffs_a {
        *coefficients.entry(name).or_insert(0) += c;
    }
    for (name, c) in coeffs_b {
        *coefficients.entry(name).or_insert(0) -= c;
    }
    coefficients.retain(|_, c| *c != 0);
    Ok(ArithFormula::new(coefficients, const_b - const_a, relation))
}

/// Lowers a linear-arithmetic term to `(coefficients, constant)`. Shared
/// with [`super::mixed`], which lowers the arithmetic side of a
/// `len(s) ⋈ expr` link the same way this module lowers both sides of a
/// plain arithmetic atom.
pub(crate) fn lower_expr(t: &TermRef) -> Result<(IndexMap<String, i64>, i64)> {
    match t.as_ref() {
        Term::IntConstant(c) => Ok((IndexMap::new(), *c)),
        Term::Variable(name) => {
            let mut map = IndexMap::new();
            map.insert(name.clone(), 1);
            Ok((map, 0))
        }
        Term::UMinus(inner) => {
            let (coeffs, c) = lower_expr(inner)?;
            Ok((coeffs.into_iter().map(|(n, v)| (n, -v)).collect(), -c))
        }
        Term::Plus(parts) => {
            let mut coeffs: IndexMap<String, i64> = IndexMap::new();
            let mut constant = 0;
            for p in parts {
                let (pc, pk) = lower_expr(p)?;
                for (n, v) in pc {
                    *coeffs.entry(n).or_insert(0) += v;
                }
                constant += pk;
            }
            Ok((coeffs, constant))
        }
        Term::Minus(a, b) => {
            let (ca, ka) = lower_expr(a)?;
            let (cb, kb) = lower_expr(b)?;
            let mut coeffs = ca;
            for (n, v) in cb {
                *coeffs.entry(n).or_insert(0) -= v;
            }
            Ok((coeffs, ka - kb))
        }
        Term::Times(c, inner) => {
            let (coeffs, k) = lower_expr(inner)?;
            Ok((coeffs.into_iter().map(|(n, v)| (n, v * c)).collect(), k * c))
        }
        _ => unsupported_expr(t),
    }
}

fn unsupported<T>(term: &TermRef) -> Result<T> {
    Err(Error::UnsupportedConstruct { what: format!("{:?}", term.as_ref()), location: Location::default() })
}

fn unsupported_expr<T>(term: &TermRef) -> Result<T> {
    Err(Error::UnsupportedConstruct { what: format!("non-linear arithmetic expression {:?}", term.as_ref()), location: Location::default() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Term as T;
    use crate::options::SolverOptions;
    use crate::symtab::SymbolTable;
    use std::rc::Rc;

    fn run(term: TermRef) -> SymbolTable {
        let sorts = HashMap::new();
        let mut symtab = SymbolTable::new();
        symtab.push_scope(0);
        solve(&term, &mut symtab, &sorts, &SolverOptions::default()).unwrap();
        symtab
    }

    #[test]
    fn single_equation_constrains_group() {
        let term = Rc::new(T::Eq(T::var("x"), T::int_const(3)));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_arith().unwrap();
        assert!(!v.automaton.is_empty());
    }

    #[test]
    fn contradiction_is_empty() {
        let term = Rc::new(T::And(vec![
            Rc::new(T::Eq(T::var("x"), T::int_const(3))),
            Rc::new(T::Eq(T::var("x"), T::int_const(4))),
        ]));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_arith().unwrap();
        assert!(v.automaton.is_empty());
    }

    #[test]
    fn or_unions_branches() {
        let term = Rc::new(T::Or(vec![
            Rc::new(T::Eq(T::var("x"), T::int_const(1))),
            Rc::new(T::Eq(T::var("x"), T::int_const(2))),
        ]));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_arith().unwrap();
        assert!(!v.automaton.is_empty());
    }
}
