//! Thin wrapper around [`biodivine_lib_bdd`], playing the same role in this
//! crate that the `cudd` crate plays for `strix`: one manager per family of
//! automata, BDD values combined with Boolean connectives, existential
//! quantification for projection, and witness enumeration for satisfying
//! assignments. Everything above this module talks to `BddManager`/`Bdd`,
//! never to `biodivine_lib_bdd` directly, so the underlying BDD engine can
//! be swapped without touching the automaton algebra.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use biodivine_lib_bdd::{Bdd as RawBdd, BddValuation, BddVariable, BddVariableSet, BddVariableSetBuilder};

thread_local! {
    /// Interns variable universes by width so that two managers built for
    /// the same number of tracks are `Rc::ptr_eq` and can be combined, the
    /// same way two `cudd::Cudd` handles opened on the same manager file
    /// would share node tables. Automata for unrelated-width families never
    /// collide here since each width gets its own entry.
    static UNIVERSE_CACHE: RefCell<HashMap<usize, Rc<BddVariableSet>>> = RefCell::new(HashMap::new());
}

/// A manager for BDDs over a fixed set of named Boolean variables.
///
/// Mirrors `cudd::Cudd`: cheap to clone (an `Rc` to the shared variable
/// universe), one manager is created per automaton family (a string
/// automaton's 8-bit alphabet, an integer automaton's per-variable bit
/// tracks, a multi-track string automaton's per-track byte encoding).
#[derive(Clone)]
pub struct BddManager {
    universe: Rc<BddVariableSet>,
    names: Rc<Vec<String>>,
}

impl fmt::Debug for BddManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BddManager")
            .field("num_vars", &self.names.len())
            .finish()
    }
}

impl BddManager {
    /// Creates a new manager with `num_vars` anonymous Boolean variables,
    /// named `v0`, `v1`, ... in BDD variable order.
    pub fn with_vars(num_vars: usize) -> Self {
        let names: Vec<String> = (0..num_vars).map(|i| format!("v{}", i)).collect();
        let universe = UNIVERSE_CACHE.with(|cache| {
            cache
                .borrow_mut()
                .entry(num_vars)
                .or_insert_with(|| {
                    let mut builder = BddVariableSetBuilder::new();
                    for name in &names {
                        builder.make_variable(name);
                    }
                    Rc::new(builder.build())
                })
                .clone()
        });
        Self {
            universe,
            names: Rc::new(names),
        }
    }

    /// The number of Boolean variables managed here.
    pub fn num_vars(&self) -> usize {
        self.names.len()
    }

    /// The constant-true BDD.
    pub fn one(&self) -> Bdd {
        Bdd::new(self.universe.mk_true(), self.clone())
    }

    /// The constant-false BDD.
    pub fn zero(&self) -> Bdd {
        Bdd::new(self.universe.mk_false(), self.clone())
    }

    /// The BDD for the positive literal of variable `index`.
    pub fn var(&self, index: usize) -> Bdd {
        let v = self.bdd_var(index);
        Bdd::new(self.universe.mk_var(v), self.clone())
    }

    /// The BDD for the negative literal of variable `index`.
    pub fn not_var(&self, index: usize) -> Bdd {
        let v = self.bdd_var(index);
        Bdd::new(self.universe.mk_not_var(v), self.clone())
    }

    fn bdd_var(&self, index: usize) -> BddVariable {
        self.universe
            .var_by_name(&self.names[index])
            .unwrap_or_else(|| panic!("variable index {} out of range", index))
    }

    /// Whether `self` and `other` were created from the same variable
    /// universe (same width). Checked before any binary operation to
    /// surface a track-alignment bug early rather than silently
    /// producing a meaningless BDD.
    pub fn same_universe(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.universe, &other.universe)
    }
}

/// A single BDD value from a [`BddManager`].
#[derive(Clone)]
pub struct Bdd {
    raw: RawBdd,
    manager: BddManager,
}

impl fmt::Debug for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bdd(nodes={})", self.raw.size())
    }
}

impl Bdd {
    fn new(raw: RawBdd, manager: BddManager) -> Self {
        Self { raw, manager }
    }

    /// The manager this BDD belongs to.
    pub fn manager(&self) -> &BddManager {
        &self.manager
    }

    fn check_same_manager(&self, other: &Self) {
        assert!(
            self.manager.same_universe(&other.manager),
            "BDD operation attempted across different managers"
        );
    }

    /// Conjunction.
    pub fn and(&self, other: &Self) -> Self {
        self.check_same_manager(other);
        Self::new(self.raw.and(&other.raw), self.manager.clone())
    }

    /// Disjunction.
    pub fn or(&self, other: &Self) -> Self {
        self.check_same_manager(other);
        Self::new(self.raw.or(&other.raw), self.manager.clone())
    }

    /// Negation.
    pub fn not(&self) -> Self {
        Self::new(self.raw.not(), self.manager.clone())
    }

    /// `self` and not `other`.
    pub fn and_not(&self, other: &Self) -> Self {
        self.check_same_manager(other);
        Self::new(self.raw.and_not(&other.raw), self.manager.clone())
    }

    /// Existential quantification over the given variable indices.
    pub fn exists(&self, indices: &[usize]) -> Self {
        let vars: Vec<BddVariable> = indices.iter().map(|&i| self.var_at(i)).collect();
        Self::new(self.raw.exists(&vars), self.manager.clone())
    }

    fn var_at(&self, index: usize) -> BddVariable {
        self.manager
            .universe
            .var_by_name(&self.manager.names[index])
            .unwrap_or_else(|| panic!("variable index {} out of range", index))
    }

    /// `true` if this BDD represents the constant-false function, i.e.
    /// an empty set of satisfying assignments.
    pub fn is_zero(&self) -> bool {
        self.raw.is_false()
    }

    /// `true` if this BDD represents the constant-true function.
    pub fn is_one(&self) -> bool {
        self.raw.is_true()
    }

    /// Returns a satisfying assignment, or `None` if this BDD is
    /// constant-false. Used for witness enumeration.
    pub fn sat_witness(&self) -> Option<Vec<bool>> {
        self.raw
            .sat_witness()
            .map(|valuation: BddValuation| (0..self.manager.num_vars()).map(|i| valuation.value(self.var_at(i))).collect())
    }

    /// Evaluates the BDD on a full assignment of all managed variables.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        debug_assert_eq!(assignment.len(), self.manager.num_vars());
        let mut restricted = self.raw.clone();
        for (i, &value) in assignment.iter().enumerate() {
            restricted = restricted.restrict(&[(self.var_at(i), value)]);
        }
        restricted.is_true()
    }

    /// Number of internal BDD nodes, used only for diagnostics/logging.
    pub fn node_count(&self) -> usize {
        self.raw.size()
    }

    /// A canonical byte encoding of this BDD's node table: equal guards
    /// (same satisfying set, same manager) always serialize to the same
    /// bytes, and the encoding is orderable, so it can key a `HashMap` or
    /// sort a signature the way a raw node pointer would if this crate
    /// exposed one. Used by [`crate::automaton::Automaton::minimize`] to
    /// tell apart which specific input atom reaches which target block,
    /// rather than conflating every edge with the same `Bdd` it doesn't
    /// already know is identical.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.raw.to_bytes()
    }

    /// Exact number of satisfying assignments, by brute-force enumeration
    /// over the manager's variables. Every automaton alphabet this crate
    /// builds (a byte, an `n`-variable integer step, a multi-track
    /// column) is small enough in practice (well under 2^20 symbols) for
    /// this to be the simplest correct option, and it sidesteps reaching
    /// into the BDD library's node representation just to get a count
    /// the counter module needs only at automaton-construction time, not
    /// in any performance-critical inner loop.
    pub fn model_count(&self) -> num_bigint::BigUint {
        use num_traits::Zero;
        let n = self.manager.num_vars();
        let mut count = num_bigint::BigUint::zero();
        for assignment in 0..(1u64 << n) {
            let bits: Vec<bool> = (0..n).map(|i| (assignment >> i) & 1 == 1).collect();
            if self.evaluate(&bits) {
                count += 1u32;
            }
        }
        count
    }
}

impl PartialEq for Bdd {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl Eq for Bdd {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_distinct_and_combine() {
        let mgr = BddManager::with_vars(2);
        let a = mgr.var(0);
        let not_a = mgr.not_var(0);
        assert_ne!(a, not_a);
        assert!(a.and(&not_a).is_zero());
        assert!(a.or(&not_a).is_one());
    }

    #[test]
    fn exists_removes_a_track() {
        let mgr = BddManager::with_vars(2);
        let both = mgr.var(0).and(&mgr.var(1));
        let projected = both.exists(&[1]);
        assert_eq!(projected, mgr.var(0));
    }

    #[test]
    fn sat_witness_roundtrips() {
        let mgr = BddManager::with_vars(3);
        let f = mgr.var(0).and(&mgr.not_var(1));
        let witness = f.sat_witness().expect("satisfiable");
        assert!(f.evaluate(&witness));
    }
}
