//! The surface-syntax term AST (spec.md §4.5, §9 "deep class hierarchies of
//! AST nodes collapse to a single tagged variant").
//!
//! Every node is reached through [`TermRef`] (`Rc<Term>`) rather than
//! `Box<Term>`. Two benefits follow directly: preprocessing rewrites that
//! reuse an unchanged sub-term (most of them) share the allocation instead
//! of deep-copying it, and the solver's scope/constraint-info side tables
//! (spec.md §3, §4.8) can key off `Rc::as_ptr` identity as the "stable term
//! id" the re-architecture notes call for, without a separate counter or
//! the dangling-pointer hazards of the hand-rolled pointer maps they
//! describe: as long as a scope holds a clone of the `Rc`, the pointer it
//! was keyed under stays valid.

use std::rc::Rc;

/// The declared sort of a variable (spec.md §3 "Variable").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Bool,
    Int,
    String,
}

/// A reference-counted, shareable term node.
pub type TermRef = Rc<Term>;

/// An identifier derived from a term's `Rc` pointer identity, used to key
/// scope and constraint-information side tables (spec.md §3, §4.8).
pub type NodeId = usize;

/// Returns the stable id of a term node (spec.md §9's "index-based tables
/// keyed by stable term ids").
pub fn node_id(term: &TermRef) -> NodeId {
    Rc::as_ptr(term) as NodeId
}

/// Exclusive upper/inclusive-lower bound pair for `re.loop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBound {
    pub low: u32,
    pub high: Option<u32>,
}

/// The single tagged term variant spanning Boolean structure, quantifiers,
/// linear arithmetic, string operations and regular-language operations
/// (spec.md §4.5). Matches over this type are exhaustive; there is no
/// dynamic casting anywhere in the pipeline (spec.md §9).
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    // --- Boolean structure ---
    And(Vec<TermRef>),
    Or(Vec<TermRef>),
    Not(TermRef),
    Ite(TermRef, TermRef, TermRef),

    // --- Quantifiers / binders (spec.md §4.6 scope lifecycle) ---
    Exists(Vec<(String, Sort)>, TermRef),
    ForAll(Vec<(String, Sort)>, TermRef),
    Let(Vec<(String, TermRef)>, TermRef),
    /// `(! term :named ...)`-style annotation; transparent to solving.
    Exclamation(TermRef, String),

    // --- Linear arithmetic ---
    UMinus(TermRef),
    Minus(TermRef, TermRef),
    Plus(Vec<TermRef>),
    /// Multiplication restricted to "constant * term" by construction
    /// (spec.md non-goal: non-linear arithmetic). The constant always
    /// appears as `coefficient`.
    Times(i64, TermRef),
    /// Division by a nonzero integer constant.
    Div(TermRef, i64),
    Eq(TermRef, TermRef),
    NotEq(TermRef, TermRef),
    Gt(TermRef, TermRef),
    Ge(TermRef, TermRef),
    Lt(TermRef, TermRef),
    Le(TermRef, TermRef),
    Distinct(Vec<TermRef>),

    // --- String operations ---
    Concat(Vec<TermRef>),
    Len(TermRef),
    Contains(TermRef, TermRef),
    NotContains(TermRef, TermRef),
    Begins(TermRef, TermRef),
    NotBegins(TermRef, TermRef),
    Ends(TermRef, TermRef),
    NotEnds(TermRef, TermRef),
    IndexOf(TermRef, TermRef),
    LastIndexOf(TermRef, TermRef),
    CharAt(TermRef, TermRef),
    SubString(TermRef, TermRef, Option<TermRef>),
    ToUpper(TermRef),
    ToLower(TermRef),
    Trim(TermRef),
    ToStringTerm(TermRef),
    ToInt(TermRef),
    Replace(TermRef, TermRef, TermRef),
    Count(TermRef, TermRef),

    // --- Regular-language operations (build a regex-sorted sub-term) ---
    ReConcat(Vec<TermRef>),
    ReUnion(Vec<TermRef>),
    ReInter(Vec<TermRef>),
    ReStar(TermRef),
    RePlus(TermRef),
    ReOpt(TermRef),
    ReLoop(TermRef, LoopBound),
    ReComp(TermRef),
    ReDiff(TermRef, TermRef),
    ToRegex(TermRef),
    In(TermRef, TermRef),
    NotIn(TermRef, TermRef),

    // --- Leaves ---
    Variable(String),
    BoolConstant(bool),
    IntConstant(i64),
    StringConstant(String),
    /// A term whose sort or value could not be determined; preserved so
    /// preprocessing can still visit it, but any solver that reaches one
    /// reports `Error::UnsupportedConstruct`.
    Unknown,
}

impl Term {
    pub fn and(parts: Vec<TermRef>) -> TermRef {
        Rc::new(Term::And(parts))
    }
    pub fn or(parts: Vec<TermRef>) -> TermRef {
        Rc::new(Term::Or(parts))
    }
    pub fn not(t: TermRef) -> TermRef {
        Rc::new(Term::Not(t))
    }
    pub fn var(name: impl Into<String>) -> TermRef {
        Rc::new(Term::Variable(name.into()))
    }
    pub fn bool_const(b: bool) -> TermRef {
        Rc::new(Term::BoolConstant(b))
    }
    pub fn int_const(i: i64) -> TermRef {
        Rc::new(Term::IntConstant(i))
    }
    pub fn string_const(s: impl Into<String>) -> TermRef {
        Rc::new(Term::StringConstant(s.into()))
    }

    /// The direct children of this node, for generic traversal
    /// (preprocessing rewrites, free-variable collection).
    pub fn children(&self) -> Vec<TermRef> {
        match self {
            Term::And(ts) | Term::Or(ts) | Term::Plus(ts) | Term::Concat(ts) | Term::Distinct(ts)
            | Term::ReConcat(ts) | Term::ReUnion(ts) | Term::ReInter(ts) => ts.clone(),
            Term::Not(t) | Term::UMinus(t) | Term::Len(t) | Term::ToUpper(t) | Term::ToLower(t)
            | Term::Trim(t) | Term::ToStringTerm(t) | Term::ToInt(t) | Term::ReStar(t)
            | Term::RePlus(t) | Term::ReOpt(t) | Term::ReComp(t) | Term::ToRegex(t)
            | Term::Exclamation(t, _) | Term::ReLoop(t, _) => vec![t.clone()],
            Term::Ite(a, b, c) | Term::Replace(a, b, c) => vec![a.clone(), b.clone(), c.clone()],
            Term::Minus(a, b) | Term::Eq(a, b) | Term::NotEq(a, b) | Term::Gt(a, b) | Term::Ge(a, b)
            | Term::Lt(a, b) | Term::Le(a, b) | Term::Contains(a, b) | Term::NotContains(a, b)
            | Term::Begins(a, b) | Term::NotBegins(a, b) | Term::Ends(a, b) | Term::NotEnds(a, b)
            | Term::IndexOf(a, b) | Term::LastIndexOf(a, b) | Term::CharAt(a, b) | Term::Count(a, b)
            | Term::ReDiff(a, b) | Term::In(a, b) | Term::NotIn(a, b) => vec![a.clone(), b.clone()],
            Term::Times(_, t) => vec![t.clone()],
            Term::Div(t, _) => vec![t.clone()],
            Term::SubString(a, b, c) => {
                let mut v = vec![a.clone(), b.clone()];
                if let Some(c) = c {
                    v.push(c.clone());
                }
                v
            }
            Term::Exists(_, body) | Term::ForAll(_, body) => vec![body.clone()],
            Term::Let(bindings, body) => {
                let mut v: Vec<TermRef> = bindings.iter().map(|(_, t)| t.clone()).collect();
                v.push(body.clone());
                v
            }
            Term::Variable(_)
            | Term::BoolConstant(_)
            | Term::IntConstant(_)
            | Term::StringConstant(_)
            | Term::Unknown => vec![],
        }
    }

    /// Reconstructs this node with `new_children` in place of
    /// [`Term::children`]'s output, preserving every non-child field
    /// (quantifier variable lists, coefficients, constants). Lets
    /// preprocessing passes rewrite bottom-up generically: collect
    /// children, transform each, rebuild the parent.
    pub fn rebuild(&self, new_children: Vec<TermRef>) -> Term {
        let mut it = new_children.into_iter();
        let mut next = || it.next().expect("rebuild: child count must match children()");
        match self {
            Term::And(ts) => Term::And((0..ts.len()).map(|_| next()).collect()),
            Term::Or(ts) => Term::Or((0..ts.len()).map(|_| next()).collect()),
            Term::Plus(ts) => Term::Plus((0..ts.len()).map(|_| next()).collect()),
            Term::Concat(ts) => Term::Concat((0..ts.len()).map(|_| next()).collect()),
            Term::Distinct(ts) => Term::Distinct((0..ts.len()).map(|_| next()).collect()),
            Term::ReConcat(ts) => Term::ReConcat((0..ts.len()).map(|_| next()).collect()),
            Term::ReUnion(ts) => Term::ReUnion((0..ts.len()).map(|_| next()).collect()),
            Term::ReInter(ts) => Term::ReInter((0..ts.len()).map(|_| next()).collect()),
            Term::Not(_) => Term::Not(next()),
            Term::UMinus(_) => Term::UMinus(next()),
            Term::Len(_) => Term::Len(next()),
            Term::ToUpper(_) => Term::ToUpper(next()),
            Term::ToLower(_) => Term::ToLower(next()),
            Term::Trim(_) => Term::Trim(next()),
            Term::ToStringTerm(_) => Term::ToStringTerm(next()),
            Term::ToInt(_) => Term::ToInt(next()),
            Term::ReStar(_) => Term::ReStar(next()),
            Term::RePlus(_) => Term::RePlus(next()),
            Term::ReOpt(_) => Term::ReOpt(next()),
            Term::ReComp(_) => Term::ReComp(next()),
            Term::ToRegex(_) => Term::ToRegex(next()),
            Term::Exclamation(_, label) => Term::Exclamation(next(), label.clone()),
            Term::ReLoop(_, bound) => Term::ReLoop(next(), *bound),
            Term::Ite(..) => Term::Ite(next(), next(), next()),
            Term::Replace(..) => Term::Replace(next(), next(), next()),
            Term::Minus(..) => Term::Minus(next(), next()),
            Term::Eq(..) => Term::Eq(next(), next()),
            Term::NotEq(..) => Term::NotEq(next(), next()),
            Term::Gt(..) => Term::Gt(next(), next()),
            Term::Ge(..) => Term::Ge(next(), next()),
            Term::Lt(..) => Term::Lt(next(), next()),
            Term::Le(..) => Term::Le(next(), next()),
            Term::Contains(..) => Term::Contains(next(), next()),
            Term::NotContains(..) => Term::NotContains(next(), next()),
            Term::Begins(..) => Term::Begins(next(), next()),
            Term::NotBegins(..) => Term::NotBegins(next(), next()),
            Term::Ends(..) => Term::Ends(next(), next()),
            Term::NotEnds(..) => Term::NotEnds(next(), next()),
            Term::IndexOf(..) => Term::IndexOf(next(), next()),
            Term::LastIndexOf(..) => Term::LastIndexOf(next(), next()),
            Term::CharAt(..) => Term::CharAt(next(), next()),
            Term::Count(..) => Term::Count(next(), next()),
            Term::ReDiff(..) => Term::ReDiff(next(), next()),
            Term::In(..) => Term::In(next(), next()),
            Term::NotIn(..) => Term::NotIn(next(), next()),
            Term::Times(c, _) => Term::Times(*c, next()),
            Term::Div(_, c) => Term::Div(next(), *c),
            Term::SubString(_, _, third) => {
                let a = next();
                let b = next();
                let c = third.as_ref().map(|_| next());
                Term::SubString(a, b, c)
            }
            Term::Exists(vars, _) => Term::Exists(vars.clone(), next()),
            Term::ForAll(vars, _) => Term::ForAll(vars.clone(), next()),
            Term::Let(bindings, _) => {
                let new_bindings = bindings.iter().map(|(name, _)| (name.clone(), next())).collect();
                let body = next();
                Term::Let(new_bindings, body)
            }
            Term::Variable(_)
            | Term::BoolConstant(_)
            | Term::IntConstant(_)
            | Term::StringConstant(_)
            | Term::Unknown => self.clone(),
        }
    }

    /// Collects the names of every free `Variable` leaf reachable from this
    /// term, used by the dependency slicer (spec.md §4.8).
    pub fn free_variables(self: &TermRef) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();
        collect_vars(self, &mut out, &mut seen);
        out
    }
}

fn collect_vars(term: &TermRef, out: &mut Vec<String>, seen: &mut std::collections::HashSet<String>) {
    if let Term::Variable(name) = term.as_ref() {
        if seen.insert(name.clone()) {
            out.push(name.clone());
        }
        return;
    }
    for child in term.children() {
        collect_vars(&child, out, seen);
    }
}

/// A parsed script: variable declarations plus the single top-level
/// assertion conjunction (spec.md §6 "assertions are treated as a single
/// top-level conjunction").
#[derive(Debug, Clone)]
pub struct Script {
    pub declarations: Vec<(String, Sort)>,
    pub assertion: TermRef,
}
