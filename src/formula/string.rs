//! String formulas (spec.md §3 "String formula", §4.5): a tagged
//! relation between string variables and/or constants, the coefficient
//! map used only to fix the multi-track automaton's track order, and the
//! auxiliary map from mixed-term variables (e.g. a `str.len` result) to
//! the arithmetic term they shadow.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::arithmetic::ArithFormula;

/// One of the atomic string-relation shapes (spec.md §3, mirroring the
/// grounding source's `StringFormula::Type`). Several tags
/// (`GtCharAt`/`GeCharAt`/... and the `EqNoLambda`/`EqOnlyLambda` pair used
/// internally by multi-track padding bookkeeping) are carried for AST
/// completeness; the solver builds automata for the ones spec.md §6 lists
/// as supported surface atoms and reports `UnsupportedConstruct` for the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringTag {
    Eq,
    NotEq,
    Begins,
    BeginsSubstring,
    NotBegins,
    NotBeginsSubstring,
    Contains,
    Ends,
    CharAt,
    EqCharAt,
    NotEqCharAt,
    Substring,
    ConcatVarConstant,
    Intersect,
    Union,
    Nonrelational,
}

/// A value object describing one atomic string/mixed constraint.
#[derive(Debug, Clone)]
pub struct StringFormula {
    pub tag: StringTag,
    /// Participating string-variable names, in track order. The map value
    /// is unused bookkeeping carried only for symmetry with
    /// [`ArithFormula`]'s ordered-map shape; track order is the insertion
    /// order of this map.
    variables: IndexMap<String, ()>,
    pub constant: Option<String>,
    pub constant2: Option<String>,
    /// Variables (not necessarily among `variables`) whose value is tied
    /// to an arithmetic term by this atom, e.g. `n` in `len(s) = n`.
    mixed_terms: HashMap<String, ArithFormula>,
}

impl StringFormula {
    pub fn new(tag: StringTag, variables: Vec<String>) -> Self {
        let mut map = IndexMap::new();
        for v in variables {
            map.insert(v, ());
        }
        Self { tag, variables: map, constant: None, constant2: None, mixed_terms: HashMap::new() }
    }

    pub fn with_constant(mut self, c: impl Into<String>) -> Self {
        self.constant = Some(c.into());
        self
    }

    pub fn with_constant2(mut self, c: impl Into<String>) -> Self {
        self.constant2 = Some(c.into());
        self
    }

    pub fn add_mixed_term(&mut self, var: impl Into<String>, term: ArithFormula) {
        self.mixed_terms.insert(var.into(), term);
    }

    pub fn mixed_term(&self, var: &str) -> Option<&ArithFormula> {
        self.mixed_terms.get(var)
    }

    pub fn mixed_terms(&self) -> impl Iterator<Item = (&String, &ArithFormula)> {
        self.mixed_terms.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(|s| s.as_str())
    }

    pub fn ordering(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    pub fn is_relational(&self) -> bool {
        self.variables.len() >= 2
    }
}
