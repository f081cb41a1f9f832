//! Symbol table and scopes (spec.md §3 "Symbol table", §4.6).
//!
//! A *group* (spec.md glossary) is not tracked as a separate id-keyed
//! table here: a group's shared value already carries its member
//! ordering (the `ordering` field of [`ArithGroupValue`]/[`StrGroupValue`]),
//! so "this group's current value" and "this variable's current binding"
//! are the same lookup — binding every member name of a group to a clone
//! of the same [`Value`] in the active scope *is* forming the group
//! (spec.md §3 "the symbol table owns all group Values").

use std::collections::HashMap;

use crate::ast::NodeId;
use crate::error::{Error, Result};

/// A string-group's shared automaton: a multi-track automaton (spec.md
/// §4.4) whose track order is `ordering`. Single-variable groups are
/// simply a one-track automaton.
#[derive(Debug, Clone)]
pub struct StrGroupValue {
    pub automaton: dfa::Automaton,
    pub ordering: Vec<String>,
}

/// An integer-group's shared automaton: a binary Presburger automaton
/// over `ordering.len()` variables in the given track order.
#[derive(Debug, Clone)]
pub struct ArithGroupValue {
    pub automaton: dfa::IntAutomaton,
    pub ordering: Vec<String>,
}

/// The value bound to a variable name (spec.md §3 "Value").
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Arith(ArithGroupValue),
    Str(StrGroupValue),
    Unknown,
}

impl Value {
    pub fn as_arith(&self) -> Option<&ArithGroupValue> {
        match self {
            Value::Arith(v) => Some(v),
            _ => None,
        }
    }
    pub fn as_str_value(&self) -> Option<&StrGroupValue> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Intersects two values of matching shape (same ordering). Used by
    /// an And that is a component (spec.md §4.9/§4.10).
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
            (Value::Arith(a), Value::Arith(b)) => {
                debug_assert_eq!(a.ordering, b.ordering, "arithmetic groups must share track order before combining");
                Ok(Value::Arith(ArithGroupValue { automaton: a.automaton.intersect(&b.automaton)?, ordering: a.ordering.clone() }))
            }
            (Value::Str(a), Value::Str(b)) => {
                debug_assert_eq!(a.ordering, b.ordering, "string groups must share track order before combining");
                Ok(Value::Str(StrGroupValue {
                    automaton: a.automaton.product(&b.automaton, dfa::ProductMode::Intersect)?,
                    ordering: a.ordering.clone(),
                }))
            }
            (Value::Unknown, other) | (other, Value::Unknown) => Ok(other.clone()),
            _ => Err(Error::Internal { message: "intersected values of mismatched shape".to_string() }),
        }
    }

    /// Unions two values of matching shape. Used at an Or that is a
    /// component, and when a disjunct's scope is popped back into the
    /// outer scope (spec.md §4.6 "union of scope values on leaving an
    /// Or").
    pub fn union(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
            (Value::Arith(a), Value::Arith(b)) => {
                debug_assert_eq!(a.ordering, b.ordering, "arithmetic groups must share track order before combining");
                Ok(Value::Arith(ArithGroupValue { automaton: a.automaton.union(&b.automaton)?, ordering: a.ordering.clone() }))
            }
            (Value::Str(a), Value::Str(b)) => {
                debug_assert_eq!(a.ordering, b.ordering, "string groups must share track order before combining");
                Ok(Value::Str(StrGroupValue {
                    automaton: a.automaton.product(&b.automaton, dfa::ProductMode::Union)?,
                    ordering: a.ordering.clone(),
                }))
            }
            (Value::Unknown, _) | (_, Value::Unknown) => Ok(Value::Unknown),
            _ => Err(Error::Internal { message: "unioned values of mismatched shape".to_string() }),
        }
    }
}

/// One level of the scope stack, keyed by the AST node that opened it
/// (Script, `exists`/`forall`/`let`, each disjunct of an `Or`).
#[derive(Debug, Default)]
struct Scope {
    node: NodeId,
    bindings: HashMap<String, Value>,
}

/// The scope stack (spec.md §4.6). Binding in an inner scope shadows an
/// outer binding only within that scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push_scope(&mut self, node: NodeId) {
        self.scopes.push(Scope { node, bindings: HashMap::new() });
    }

    /// Pops the innermost scope and returns its bindings, so the caller
    /// can fold them into the new top of stack (e.g. union on leaving an
    /// Or branch).
    pub fn pop_scope(&mut self) -> HashMap<String, Value> {
        self.scopes.pop().map(|s| s.bindings).unwrap_or_default()
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.scopes.last().map(|s| s.node)
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.into(), value);
        }
    }

    /// Binds the same group value to every member name, each as its own
    /// clone (spec.md §3 "cloning a Value deep-copies the automaton").
    pub fn bind_group(&mut self, names: &[String], value: Value) {
        for name in names {
            self.bind(name.clone(), value.clone());
        }
    }

    /// Looks up a binding, walking from the innermost scope outward.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|s| s.bindings.get(name))
    }

    /// Intersects `value` into whatever is currently bound to every name
    /// in `names` within the current scope, falling back to a direct bind
    /// if nothing was bound yet.
    pub fn intersect_into_group(&mut self, names: &[String], value: Value) -> Result<()> {
        let merged = match self.get(&names[0]) {
            Some(existing) => existing.intersect(&value)?,
            None => value,
        };
        self.bind_group(names, merged);
        Ok(())
    }

    /// Unions `value` into whatever is currently bound to every name in
    /// `names` within the current scope, falling back to a direct bind if
    /// nothing was bound yet (used when a disjunct's popped scope is
    /// folded back into the outer one, spec.md §4.6).
    pub fn union_into_group(&mut self, names: &[String], value: Value) -> Result<()> {
        let merged = match self.get(&names[0]) {
            Some(existing) => existing.union(&value)?,
            None => value,
        };
        self.bind_group(names, merged);
        Ok(())
    }

    /// Replaces the binding of every name in `names` with `value`,
    /// without intersecting (used at disjunctions, spec.md §4.6
    /// `set_group`).
    pub fn set_group(&mut self, names: &[String], value: Value) {
        self.bind_group(names, value);
    }
}
