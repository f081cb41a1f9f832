//! The string constraint solver (spec.md §4.10): builds one multi-track
//! automaton per connected group of string variables, intersecting in one
//! relation per atom and unioning branch results back together at each
//! `Or`, mirroring [`super::arithmetic`]'s structure over
//! [`dfa::multitrack`] relations instead of [`dfa::IntAutomaton`]s.
//!
//! As in the arithmetic solver, every group's track order is fixed once,
//! before any automaton is built, by a union-find pre-pass over every
//! string atom reachable from the assertion: the kernel has no operation
//! to extend an already-built multi-track automaton with a new track, so
//! groups can't be grown incrementally while walking the term.

use std::collections::HashMap;

use dfa::multitrack;
use dfa::{Automaton, StringAutomaton};

use crate::ast::{Sort, Term, TermRef};
use crate::error::{Error, Location, Result};
use crate::options::SolverOptions;
use crate::symtab::{StrGroupValue, SymbolTable, Value};

use super::classify_dispatch;
use super::AtomClass;

/// Fixed variable orderings for every string group, computed once before
/// any automaton is built.
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

/// Walks every atom reachable from `term` that [`classify_dispatch`] routes
/// to a string class (single-variable or relational).
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
            if is_string_class(term, sorts) {
                out.push(term.clone());
            }
        }
    }
}

fn is_string_class(term: &TermRef, sorts: &HashMap<String, Sort>) -> bool {
    matches!(classify_dispatch(term, sorts), AtomClass::StringSingle | AtomClass::StringRelational)
}

/// Entry point: fixes every string group's ordering, seeds every group to
/// "any word, per-track padding well-formed", then walks the Boolean
/// structure intersecting/unioning relations in (spec.md §4.10).
pub fn solve(term: &TermRef, symtab: &mut SymbolTable, sorts: &HashMap<String, Sort>, options: &SolverOptions) -> Result<()> {
    let groups = build_groups(term, sorts);
    for ordering in groups.all_orderings() {
        let value = Value::Str(StrGroupValue { automaton: any_group(ordering.len())?, ordering: ordering.clone() });
        symtab.bind_group(ordering, value);
    }
    walk(term, symtab, &groups, sorts, options)
}

/// The universal relation over `num_tracks` tracks: every track holds an
/// arbitrary, independently-chosen word, each respecting the padding
/// invariant on its own (spec.md §4.4's "once a track pads it pads
/// forever"). Built by lifting `Sigma*` into every track in turn and
/// intersecting, rather than [`Automaton::universal`], which would allow a
/// track to flip between real bytes and padding across steps.
pub(crate) fn any_group(num_tracks: usize) -> Result<Automaton> {
    let num_tracks = num_tracks.max(1);
    let mut acc = multitrack::lift_track(&StringAutomaton::any_string(), 0, num_tracks);
    for track in 1..num_tracks {
        acc = multitrack::conjoin(&acc, &multitrack::lift_track(&StringAutomaton::any_string(), track, num_tracks))?;
    }
    Ok(acc)
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
            if is_string_class(term, sorts) {
                process_atom(term, symtab, groups, options)?;
            }
            Ok(())
        }
    }
}

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
    let vars = atom.free_variables();
    let first = match vars.first() {
        Some(v) => v.clone(),
        None => return Ok(()),
    };
    let ordering = groups.ordering_for(&first).cloned().unwrap_or_default();
    let num_tracks = ordering.len().max(1);
    let current = match symtab.get(&first).and_then(Value::as_str_value) {
        Some(v) => v.automaton.clone(),
        None => any_group(num_tracks)?,
    };
    for relation in lower_atom(atom, &current, &ordering, num_tracks)? {
        symtab.intersect_into_group(&ordering, Value::Str(StrGroupValue { automaton: relation, ordering: ordering.clone() }))?;
    }
    Ok(())
}

/// Either a variable reference or a string literal, the two operand shapes
/// every relational builder below accepts directly.
enum Operand<'a> {
    Var(&'a str),
    Literal(Vec<u8>),
}

fn operand(t: &TermRef) -> Option<Operand<'_>> {
    match t.as_ref() {
        Term::Variable(name) => Some(Operand::Var(name)),
        Term::StringConstant(s) => Some(Operand::Literal(s.clone().into_bytes())),
        _ => None,
    }
}

fn track_of(ordering: &[String], name: &str) -> usize {
    ordering.iter().position(|n| n == name).expect("atom variable missing from its own group ordering")
}

fn lower_atom(atom: &TermRef, current: &Automaton, ordering: &[String], num_tracks: usize) -> Result<Vec<Automaton>> {
    match atom.as_ref() {
        Term::Eq(a, b) => Ok(vec![lower_eq(a, b, false, current, ordering, num_tracks)?]),
        Term::NotEq(a, b) => Ok(vec![lower_eq(a, b, true, current, ordering, num_tracks)?]),
        Term::Contains(a, b) => Ok(vec![lower_contains(a, b, false, ordering, num_tracks)?]),
        Term::NotContains(a, b) => Ok(vec![lower_contains(a, b, true, ordering, num_tracks)?]),
        Term::Begins(a, b) => Ok(vec![lower_begins(a, b, false, ordering, num_tracks)?]),
        Term::NotBegins(a, b) => Ok(vec![lower_begins(a, b, true, ordering, num_tracks)?]),
        Term::Ends(a, b) => Ok(vec![lower_ends(a, b, false, ordering, num_tracks)?]),
        Term::NotEnds(a, b) => Ok(vec![lower_ends(a, b, true, ordering, num_tracks)?]),
        Term::In(s, re) => Ok(vec![lower_in(s, re, false, ordering, num_tracks)?]),
        Term::NotIn(s, re) => Ok(vec![lower_in(s, re, true, ordering, num_tracks)?]),
        Term::Distinct(ts) => {
            let mut out = Vec::new();
            for i in 0..ts.len() {
                for j in (i + 1)..ts.len() {
                    out.push(lower_eq(&ts[i], &ts[j], true, current, ordering, num_tracks)?);
                }
            }
            Ok(out)
        }
        Term::Not(inner) => lower_negated(inner, current, ordering, num_tracks),
        Term::BoolConstant(true) => Ok(vec![]),
        Term::BoolConstant(false) => Ok(vec![Automaton::empty(multitrack::multitrack_manager(num_tracks))]),
        _ => unsupported(atom),
    }
}

fn lower_negated(inner: &TermRef, current: &Automaton, ordering: &[String], num_tracks: usize) -> Result<Vec<Automaton>> {
    match inner.as_ref() {
        Term::Eq(a, b) => Ok(vec![lower_eq(a, b, true, current, ordering, num_tracks)?]),
        Term::NotEq(a, b) => Ok(vec![lower_eq(a, b, false, current, ordering, num_tracks)?]),
        Term::Contains(a, b) => Ok(vec![lower_contains(a, b, true, ordering, num_tracks)?]),
        Term::NotContains(a, b) => Ok(vec![lower_contains(a, b, false, ordering, num_tracks)?]),
        Term::Begins(a, b) => Ok(vec![lower_begins(a, b, true, ordering, num_tracks)?]),
        Term::NotBegins(a, b) => Ok(vec![lower_begins(a, b, false, ordering, num_tracks)?]),
        Term::Ends(a, b) => Ok(vec![lower_ends(a, b, true, ordering, num_tracks)?]),
        Term::NotEnds(a, b) => Ok(vec![lower_ends(a, b, false, ordering, num_tracks)?]),
        Term::In(s, re) => Ok(vec![lower_in(s, re, true, ordering, num_tracks)?]),
        Term::NotIn(s, re) => Ok(vec![lower_in(s, re, false, ordering, num_tracks)?]),
        _ => unsupported(inner),
    }
}

fn lower_eq(a: &TermRef, b: &TermRef, negate: bool, current: &Automaton, ordering: &[String], num_tracks: usize) -> Result<Automaton> {
    if let Some(relation) = try_lower_concat_eq(a, b, current, ordering, num_tracks)? {
        return Ok(if negate { relation.complement() } else { relation });
    }
    if let Some(relation) = try_lower_concat_eq(b, a, current, ordering, num_tracks)? {
        return Ok(if negate { relation.complement() } else { relation });
    }
    if let Some(relation) = try_lower_eq_charat(a, b, ordering, num_tracks)? {
        return Ok(if negate { relation.complement() } else { relation });
    }
    if let Some(relation) = try_lower_eq_charat(b, a, ordering, num_tracks)? {
        return Ok(if negate { relation.complement() } else { relation });
    }
    match (operand(a), operand(b)) {
        (Some(Operand::Var(x)), Some(Operand::Var(y))) => {
            let relation = multitrack::equality(track_of(ordering, x), track_of(ordering, y), num_tracks);
            Ok(if negate { relation.complement() } else { relation })
        }
        (Some(Operand::Var(x)), Some(Operand::Literal(lit))) | (Some(Operand::Literal(lit)), Some(Operand::Var(x))) => {
            let content = StringAutomaton::literal(&lit);
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, x), num_tracks))
        }
        _ => unsupported_pair(a, b),
    }
}

/// Recognizes `(str.++ x y) = target` (either operand order), where `x`/`y`
/// are each a variable or literal and `target` is a variable. Concat with
/// more than two parts, or with a non-variable target, falls outside what
/// the kernel's fixed-track relations can express without an anonymous
/// intermediate track, and is reported as unsupported.
///
/// The var-var case can't hand `x`'s and `y`'s own group tracks straight to
/// [`multitrack::concat_relation`]: that relation reads its right operand
/// under a left-padded convention (real content starts only once the left
/// operand ends), which is not how either track is otherwise constrained
/// elsewhere in the group. Instead each variable's *current* plain language
/// is snapshotted out of `current` (the group automaton as already
/// constrained by every atom processed so far) and joined with
/// [`multitrack::concat_languages`], which handles the padding convention
/// internally; the result is lifted back onto `target`'s own track.
fn try_lower_concat_eq(lhs: &TermRef, rhs: &TermRef, current: &Automaton, ordering: &[String], num_tracks: usize) -> Result<Option<Automaton>> {
    let parts = match lhs.as_ref() {
        Term::Concat(parts) if parts.len() == 2 => parts,
        _ => return Ok(None),
    };
    let target = match operand(rhs) {
        Some(Operand::Var(name)) => name,
        _ => return Ok(None),
    };
    let track_target = track_of(ordering, target);
    match (operand(&parts[0]), operand(&parts[1])) {
        (Some(Operand::Var(x)), Some(Operand::Var(y))) => {
            let x_lang = multitrack::extract_track(current, track_of(ordering, x), num_tracks);
            let y_lang = multitrack::extract_track(current, track_of(ordering, y), num_tracks);
            let joined = multitrack::concat_languages(&x_lang, &y_lang)?;
            Ok(Some(multitrack::lift_track(&joined, track_target, num_tracks)))
        }
        (Some(Operand::Var(x)), Some(Operand::Literal(lit))) => {
            Ok(Some(multitrack::concat_with_literal(track_of(ordering, x), &lit, track_target, num_tracks, false)))
        }
        (Some(Operand::Literal(lit)), Some(Operand::Var(x))) => {
            Ok(Some(multitrack::concat_with_literal(track_of(ordering, x), &lit, track_target, num_tracks, true)))
        }
        _ => unsupported(lhs).map(Some),
    }
}

/// Recognizes `(str.at s i) = c` for a literal index and single-character
/// literal `c` (spec.md §9's `EQ_CHARAT` shorthand, resolved as a direct
/// `(= (str.at s i) c)` reading). A non-constant index ties the atom to an
/// arithmetic variable and is out of this solver's scope.
fn try_lower_eq_charat(lhs: &TermRef, rhs: &TermRef, ordering: &[String], num_tracks: usize) -> Result<Option<Automaton>> {
    let (s, idx) = match lhs.as_ref() {
        Term::CharAt(s, idx) => (s, idx),
        _ => return Ok(None),
    };
    let name = match s.as_ref() {
        Term::Variable(n) => n,
        _ => return Ok(None),
    };
    let index = match idx.as_ref() {
        Term::IntConstant(i) if *i >= 0 => *i as usize,
        _ => return unsupported(idx).map(Some),
    };
    let ch = match rhs.as_ref() {
        Term::StringConstant(c) if c.len() == 1 => c.as_bytes()[0],
        _ => return unsupported(rhs).map(Some),
    };
    let any_char = StringAutomaton::char_range(0, 255);
    let mut content = StringAutomaton::literal(b"");
    for _ in 0..index {
        content = content.concat(&any_char)?;
    }
    content = content.concat(&StringAutomaton::char_range(ch, ch))?;
    content = content.concat(&StringAutomaton::any_string())?;
    Ok(Some(multitrack::lift_track(&content, track_of(ordering, name), num_tracks)))
}

fn lower_contains(whole: &TermRef, needle: &TermRef, negate: bool, ordering: &[String], num_tracks: usize) -> Result<Automaton> {
    match (operand(whole), operand(needle)) {
        (Some(Operand::Var(w)), Some(Operand::Var(n))) => {
            let relation = multitrack::contains(track_of(ordering, n), track_of(ordering, w), num_tracks);
            Ok(if negate { relation.complement() } else { relation })
        }
        (Some(Operand::Var(w)), Some(Operand::Literal(lit))) => {
            let content = StringAutomaton::any_string().concat(&StringAutomaton::literal(&lit))?.concat(&StringAutomaton::any_string())?;
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, w), num_tracks))
        }
        (Some(Operand::Literal(lit)), Some(Operand::Var(n))) => {
            let content = substrings_of(&lit)?;
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, n), num_tracks))
        }
        _ => unsupported_pair(whole, needle),
    }
}

fn lower_begins(prefix: &TermRef, whole: &TermRef, negate: bool, ordering: &[String], num_tracks: usize) -> Result<Automaton> {
    match (operand(prefix), operand(whole)) {
        (Some(Operand::Var(p)), Some(Operand::Var(w))) => {
            let relation = multitrack::prefix_of(track_of(ordering, p), track_of(ordering, w), num_tracks);
            Ok(if negate { relation.complement() } else { relation })
        }
        (Some(Operand::Var(p)), Some(Operand::Literal(lit))) => {
            let content = prefixes_of(&lit)?;
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, p), num_tracks))
        }
        (Some(Operand::Literal(lit)), Some(Operand::Var(w))) => {
            let content = StringAutomaton::literal(&lit).concat(&StringAutomaton::any_string())?;
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, w), num_tracks))
        }
        _ => unsupported_pair(prefix, whole),
    }
}

fn lower_ends(suffix: &TermRef, whole: &TermRef, negate: bool, ordering: &[String], num_tracks: usize) -> Result<Automaton> {
    match (operand(suffix), operand(whole)) {
        (Some(Operand::Var(s)), Some(Operand::Var(w))) => {
            let relation = multitrack::suffix_of(track_of(ordering, s), track_of(ordering, w), num_tracks);
            Ok(if negate { relation.complement() } else { relation })
        }
        (Some(Operand::Var(s)), Some(Operand::Literal(lit))) => {
            let content = suffixes_of(&lit)?;
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, s), num_tracks))
        }
        (Some(Operand::Literal(lit)), Some(Operand::Var(w))) => {
            let content = StringAutomaton::any_string().concat(&StringAutomaton::literal(&lit))?;
            let content = if negate { content.complement() } else { content };
            Ok(multitrack::lift_track(&content, track_of(ordering, w), num_tracks))
        }
        _ => unsupported_pair(suffix, whole),
    }
}

fn lower_in(s: &TermRef, re: &TermRef, negate: bool, ordering: &[String], num_tracks: usize) -> Result<Automaton> {
    let name = match s.as_ref() {
        Term::Variable(n) => n,
        _ => return unsupported(s),
    };
    let language = crate::regex::compile(re)?;
    let language = if negate { language.complement() } else { language };
    Ok(multitrack::lift_track(&language, track_of(ordering, name), num_tracks))
}

/// The finite union of every contiguous substring of `literal`, used when
/// a `str.contains` atom's needle side is a variable and its haystack side
/// is a fixed literal.
fn substrings_of(literal: &[u8]) -> Result<StringAutomaton> {
    let mut acc = StringAutomaton::literal(b"");
    for i in 0..=literal.len() {
        for j in i..=literal.len() {
            acc = acc.union(&StringAutomaton::literal(&literal[i..j]))?;
        }
    }
    Ok(acc)
}

fn prefixes_of(literal: &[u8]) -> Result<StringAutomaton> {
    let mut acc = StringAutomaton::literal(b"");
    for k in 0..=literal.len() {
        acc = acc.union(&StringAutomaton::literal(&literal[..k]))?;
    }
    Ok(acc)
}

fn suffixes_of(literal: &[u8]) -> Result<StringAutomaton> {
    let mut acc = StringAutomaton::literal(b"");
    for k in 0..=literal.len() {
        acc = acc.union(&StringAutomaton::literal(&literal[literal.len() - k..]))?;
    }
    Ok(acc)
}

fn unsupported<T>(term: &TermRef) -> Result<T> {
    Err(Error::UnsupportedConstruct { what: format!("{:?}", term.as_ref()), location: Location::default() })
}

fn unsupported_pair<T>(a: &TermRef, b: &TermRef) -> Result<T> {
    Err(Error::UnsupportedConstruct { what: format!("{:?} / {:?}", a.as_ref(), b.as_ref()), location: Location::default() })
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
    fn literal_equation_constrains_group() {
        let term = Rc::new(T::Eq(T::var("x"), T::string_const("ab")));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_str_value().unwrap();
        assert!(!v.automaton.is_empty_language());
    }

    #[test]
    fn contradiction_is_empty() {
        let term = Rc::new(T::And(vec![
            Rc::new(T::Eq(T::var("x"), T::string_const("ab"))),
            Rc::new(T::Eq(T::var("x"), T::string_const("cd"))),
        ]));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_str_value().unwrap();
        assert!(v.automaton.is_empty_language());
    }

    #[test]
    fn or_unions_branches() {
        let term = Rc::new(T::Or(vec![
            Rc::new(T::Eq(T::var("x"), T::string_const("ab"))),
            Rc::new(T::Eq(T::var("x"), T::string_const("cd"))),
        ]));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_str_value().unwrap();
        assert!(!v.automaton.is_empty_language());
    }

    #[test]
    fn concat_with_literal_constrains_both_variables() {
        let term = Rc::new(T::Eq(T::Concat(vec![T::var("x"), T::string_const("b")]).into(), T::var("y")));
        let symtab = run(term);
        let x = symtab.get("x").unwrap().as_str_value().unwrap();
        let y = symtab.get("y").unwrap().as_str_value().unwrap();
        assert_eq!(x.ordering, y.ordering);
        assert!(!x.automaton.is_empty_language());
    }

    #[test]
    fn not_contains_excludes_matching_literal() {
        let term = Rc::new(T::And(vec![
            Rc::new(T::Eq(T::var("x"), T::string_const("abc"))),
            Rc::new(T::NotContains(T::var("x"), T::string_const("b"))),
        ]));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_str_value().unwrap();
        assert!(v.automaton.is_empty_language());
    }

    #[test]
    fn distinct_strings_excludes_equal_assignment() {
        let term = Rc::new(T::And(vec![
            Rc::new(T::Eq(T::var("x"), T::string_const("a"))),
            Rc::new(T::Eq(T::var("y"), T::string_const("a"))),
            Rc::new(T::Distinct(vec![T::var("x"), T::var("y")])),
        ]));
        let symtab = run(term);
        let v = symtab.get("x").unwrap().as_str_value().unwrap();
        assert!(v.automaton.is_empty_language());
    }
}
