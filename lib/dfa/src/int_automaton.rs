//! Binary Presburger arithmetic automata (spec.md §4.1, "integer
//! automaton"). An automaton of `n` integer variables over a fixed two's
//! complement bit width `w` has alphabet `{0,1}^n` (one bit per variable
//! per step) and accepts exactly the `n`-tuples of LSB-first bit strings
//! whose two's-complement values satisfy a linear constraint.
//!
//! Construction follows the standard LSB-first carry recurrence for
//! linear equations/inequations (as implemented by `IntAutomaton` in the
//! reference solver this crate's surface syntax is modeled on): writing
//! `sum_i c_i * x_i - C = 0` and factoring out two at each bit position,
//! the partial sum after `t` bits satisfies
//! `S_(t+1) = (S_t - sum_i c_i * b_i^t) / 2`, valid only when the
//! dividend is even; at the final (sign) bit the weight is `-1` rather
//! than a positive power of two, so the last step checks
//! `S_(w-1) + sum_i c_i * b_i^(w-1)` against the relational operator
//! directly instead of dividing again.

use fixedbitset::FixedBitSet;

use crate::automaton::{Automaton, Edge};
use crate::bdd::BddManager;

/// The relational operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Ne,
    Le,
    Lt,
    Ge,
    Gt,
}

/// An integer automaton: an [`Automaton`] whose alphabet is one Boolean
/// bit per tracked variable, read LSB first for `bit_width` steps.
#[derive(Debug, Clone)]
pub struct IntAutomaton {
    inner: Automaton,
    num_vars: usize,
    bit_width: usize,
}

impl IntAutomaton {
    pub fn from_automaton(inner: Automaton, num_vars: usize, bit_width: usize) -> Self {
        Self { inner, num_vars, bit_width }
    }

    pub fn into_automaton(self) -> Automaton {
        self.inner
    }

    pub fn automaton(&self) -> &Automaton {
        &self.inner
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Builds the automaton for `sum_i coeffs[i] * x_i <relation> constant`
    /// over two's-complement integers of `bit_width` bits.
    pub fn linear_constraint(coeffs: &[i64], relation: Relation, constant: i64, bit_width: usize) -> Self {
        let num_vars = coeffs.len();
        let manager = BddManager::with_vars(num_vars);
        let bound: i64 = coeffs.iter().map(|c| c.abs()).sum::<i64>().max(constant.abs()) + 1;
        let offset = bound as i32;
        let width = (2 * offset + 1) as usize;

        // States are laid out as `width` rows per automaton step, plus one
        // final row of `width` states after the sign-bit step that encodes
        // the accept/reject verdict; row `t` maps partial sum value `v`
        // (`-bound..=bound`) to state `t * width + (v + offset)`.
        let state_index = |step: usize, value: i32| step * width + (value.clamp(-offset, offset) + offset) as usize;
        let num_states = (bit_width + 1) * width;

        let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); num_states];
        let mut accepting = FixedBitSet::with_capacity(num_states);

        for step in 0..bit_width {
            let is_sign_step = step == bit_width - 1;
            for value in -offset..=offset {
                let from = state_index(step, value);
                for bits in 0..(1usize << num_vars) {
                    let contribution: i64 = (0..num_vars)
                        .map(|i| if (bits >> i) & 1 == 1 { coeffs[i] } else { 0 })
                        .sum();
                    let guard = {
                        let mut g = manager.one();
                        for i in 0..num_vars {
                            let lit = if (bits >> i) & 1 == 1 { manager.var(i) } else { manager.not_var(i) };
                            g = g.and(&lit);
                        }
                        g
                    };
                    if is_sign_step {
                        let final_value = value as i64 + contribution;
                        let satisfied = match relation {
                            Relation::Eq => final_value == 0,
                            Relation::Ne => final_value != 0,
                            Relation::Le => final_value <= 0,
                            Relation::Lt => final_value < 0,
                            Relation::Ge => final_value >= 0,
                            Relation::Gt => final_value > 0,
                        };
                        let to = state_index(step + 1, if satisfied { 0 } else { 1 });
                        edges[from].push(Edge { guard, target: to });
                        if satisfied {
                            accepting.insert(to);
                        }
                    } else {
                        let dividend = value as i64 - contribution;
                        if dividend % 2 != 0 {
                            continue;
                        }
                        let next_value = (dividend / 2) as i32;
                        let to = state_index(step + 1, next_value);
                        edges[from].push(Edge { guard, target: to });
                    }
                }
            }
        }

        let initial = state_index(0, constant as i32);
        let automaton = Automaton::new(manager, num_states, initial, accepting, edges);
        Self {
            inner: automaton.minimize(),
            num_vars,
            bit_width,
        }
    }

    /// The universe automaton over `num_vars` variables: every value
    /// tuple is accepted (spec.md §4.2 `any_int(ordering)`).
    pub fn any(num_vars: usize, bit_width: usize) -> Self {
        let manager = BddManager::with_vars(num_vars.max(1));
        Self { inner: Automaton::universal(manager), num_vars, bit_width }
    }

    /// The empty-language automaton over `num_vars` variables (spec.md
    /// §4.2 `phi(ordering)`).
    pub fn none(num_vars: usize, bit_width: usize) -> Self {
        let manager = BddManager::with_vars(num_vars.max(1));
        Self { inner: Automaton::empty(manager), num_vars, bit_width }
    }

    pub fn union(&self, other: &Self) -> crate::error::Result<Self> {
        Ok(Self {
            inner: self.inner.product(&other.inner, crate::automaton::ProductMode::Union)?,
            num_vars: self.num_vars,
            bit_width: self.bit_width,
        })
    }

    pub fn intersect(&self, other: &Self) -> crate::error::Result<Self> {
        Ok(Self {
            inner: self.inner.product(&other.inner, crate::automaton::ProductMode::Intersect)?,
            num_vars: self.num_vars,
            bit_width: self.bit_width,
        })
    }

    pub fn complement(&self) -> Self {
        Self {
            inner: self.inner.complement(),
            num_vars: self.num_vars,
            bit_width: self.bit_width,
        }
    }

    /// Existentially projects out variable `index`, leaving an automaton
    /// over the remaining `num_vars - 1` variable positions. Callers are
    /// responsible for renumbering the remaining variables' indices in
    /// any subsequent constraint they build against the result.
    pub fn project_variable(&self, index: usize) -> Self {
        Self {
            inner: self.inner.project(&[index]),
            num_vars: self.num_vars - 1,
            bit_width: self.bit_width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty_language()
    }

    /// Encodes `value` as `bit_width` LSB-first two's-complement bits over
    /// this automaton's single tracked variable and walks it through
    /// [`Automaton::accepts`].
    fn accepts_value(&self, value: i64) -> bool {
        assert_eq!(self.num_vars, 1, "accepts_value requires a single-variable automaton");
        let word: Vec<Vec<bool>> = (0..self.bit_width).map(|bit| vec![(value >> bit) & 1 == 1]).collect();
        self.inner.accepts(&word)
    }

    /// Converts a single-variable automaton's accepted non-negative values
    /// into their unary-shaped length automaton (spec.md §4.3's bridge,
    /// used to relate a `str.len` result's arithmetic group to a string
    /// group's length set). Only values in `0..2^(bit_width-1)` (the
    /// non-negative half of the two's-complement range) are meaningful
    /// lengths; the result's final state absorbs anything past that.
    pub fn to_unary(&self) -> crate::unary::UnaryAutomaton {
        let domain = 1usize << (self.bit_width - 1);
        let n = domain + 1;
        let mut next: Vec<usize> = (1..=n).collect();
        *next.last_mut().unwrap() = n - 1;
        let mut accepting = FixedBitSet::with_capacity(n);
        for value in 0..domain {
            if self.accepts_value(value as i64) {
                accepting.set(value, true);
            }
        }
        crate::unary::UnaryAutomaton::new(next, 0, accepting)
    }

    /// Builds the single-variable automaton accepting exactly the
    /// non-negative values in `set` (spec.md §4.3's bridge, the direction
    /// used to restrict a `str.len` arithmetic group back to a shrunk
    /// semilinear length set).
    pub fn from_semilinear_set(set: &crate::unary::SemilinearSet, bit_width: usize) -> Self {
        let domain = 1usize << (bit_width - 1);
        let mut accepting_value = FixedBitSet::with_capacity(domain);
        for value in 0..domain {
            if set.contains(value as u64) {
                accepting_value.set(value, true);
            }
        }

        // State after `t` steps holds the partial value read so far
        // (LSB-first); the final row is accepting iff that value is in
        // `set`. Values that would exceed `domain` (the sign bit came up
        // set, so the two's-complement value is negative) collapse into a
        // shared non-accepting absorbing row.
        let manager = BddManager::with_vars(1);
        let num_states = (bit_width + 1) * (domain + 1);
        let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); num_states];
        let mut accepting = FixedBitSet::with_capacity(num_states);
        let row = |step: usize, value: usize| step * (domain + 1) + value.min(domain);
        for step in 0..bit_width {
            for value in 0..=domain {
                let from = row(step, value);
                for &bit in &[false, true] {
                    let guard = if bit { manager.var(0) } else { manager.not_var(0) };
                    let next_value = if bit { value + (1 << step) } else { value };
                    edges[from].push(Edge { guard, target: row(step + 1, next_value) });
                }
            }
        }
        for value in 0..domain {
            if accepting_value[value] {
                accepting.insert(row(bit_width, value));
            }
        }
        let automaton = Automaton::new(manager, num_states, row(0, 0), accepting, edges);
        Self { inner: automaton.minimize(), num_vars: 1, bit_width }
    }

    /// Builds an automaton over `num_vars` variables constraining only
    /// variable `index` to lie in `set`, every other variable left
    /// completely unconstrained (spec.md §4.11 step 2: "intersect the
    /// length set into the corresponding arithmetic group" without
    /// disturbing that group's other members).
    pub fn from_semilinear_set_at(set: &crate::unary::SemilinearSet, index: usize, num_vars: usize, bit_width: usize) -> Self {
        let domain = 1usize << (bit_width - 1);
        let mut accepting_value = FixedBitSet::with_capacity(domain);
        for value in 0..domain {
            if set.contains(value as u64) {
                accepting_value.set(value, true);
            }
        }
        let manager = BddManager::with_vars(num_vars.max(1));
        let num_states = (bit_width + 1) * (domain + 1);
        let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); num_states];
        let mut accepting = FixedBitSet::with_capacity(num_states);
        let row = |step: usize, value: usize| step * (domain + 1) + value.min(domain);
        for step in 0..bit_width {
            for value in 0..=domain {
                let from = row(step, value);
                for &bit in &[false, true] {
                    let literal = if bit { manager.var(index) } else { manager.not_var(index) };
                    let next_value = if bit { value + (1 << step) } else { value };
                    edges[from].push(Edge { guard: literal, target: row(step + 1, next_value) });
                }
            }
        }
        for value in 0..domain {
            if accepting_value[value] {
                accepting.insert(row(bit_width, value));
            }
        }
        let automaton = Automaton::new(manager, num_states, row(0, 0), accepting, edges);
        Self { inner: automaton.minimize(), num_vars, bit_width }
    }

    /// Evaluates `self` (any width) at the given value of variable `index`,
    /// every other variable's bit fixed to `false` — sound because a
    /// caller only uses this after [`Automaton::project`]-ing every other
    /// variable out, so the guards on the projected automaton no longer
    /// depend on them (spec.md §4.11 step 1's reverse direction, reading
    /// back an arithmetic group's currently-allowed values for one of its
    /// members without needing a narrower manager).
    pub fn accepts_value_at(&self, index: usize, value: i64) -> bool {
        let word: Vec<Vec<bool>> = (0..self.bit_width)
            .map(|bit| {
                let mut v = vec![false; self.num_vars.max(1)];
                v[index] = (value >> bit) & 1 == 1;
                v
            })
            .collect();
        self.inner.accepts(&word)
    }

    /// The lexicographically-smallest accepted word's value for variable
    /// `index`, or `None` if the language is empty (spec.md §4.2
    /// `get_an_accepting_value(var)`: "BFS witness interpreted as an
    /// integer"), used to report a satisfying witness per variable
    /// (spec.md §6 "a witness example per variable").
    pub fn get_an_accepting_value(&self, index: usize) -> Option<i64> {
        let witness = self.inner.enumerate_witness(self.bit_width)?;
        let mut value: i64 = 0;
        for (step, symbol) in witness.iter().enumerate() {
            let bit = symbol[index] as i64;
            if step + 1 == witness.len() {
                value -= bit << step;
            } else {
                value += bit << step;
            }
        }
        Some(value)
    }

    /// Reads off the current semilinear set of non-negative values variable
    /// `index` may take, by brute-force testing every value in the
    /// (non-negative half of the) domain via [`accepts_value_at`] and
    /// feeding the resulting bitmap through the same tail-plus-cycle
    /// extraction [`to_unary`](Self::to_unary) uses for single-variable
    /// automata.
    pub fn semilinear_set_at(&self, index: usize) -> crate::unary::SemilinearSet {
        let domain = 1usize << (self.bit_width - 1);
        let n = domain + 1;
        let mut next: Vec<usize> = (1..=n).collect();
        *next.last_mut().unwrap() = n - 1;
        let mut accepting = FixedBitSet::with_capacity(n);
        for value in 0..domain {
            if self.accepts_value_at(index, value as i64) {
                accepting.set(value, true);
            }
        }
        crate::unary::UnaryAutomaton::new(next, 0, accepting).extract_semilinear_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bits: &[Vec<bool>], var: usize) -> i64 {
        let mut value: i64 = 0;
        for (step, symbol) in bits.iter().enumerate() {
            let bit = symbol[var] as i64;
            if step + 1 == bits.len() {
                value -= bit << step;
            } else {
                value += bit << step;
            }
        }
        value
    }

    #[test]
    fn equation_accepts_exact_sum() {
        let a = IntAutomaton::linear_constraint(&[1, 1], Relation::Eq, 5, 6);
        assert!(!a.is_empty());
        let witness = a.automaton().enumerate_witness(6).unwrap();
        let x = decode(&witness, 0);
        let y = decode(&witness, 1);
        assert_eq!(x + y, 5);
    }

    #[test]
    fn inequation_excludes_violating_sums() {
        let le = IntAutomaton::linear_constraint(&[1], Relation::Le, 0, 5);
        let gt = IntAutomaton::linear_constraint(&[1], Relation::Gt, 0, 5);
        assert!(le.intersect(&gt).unwrap().is_empty());
    }

    #[test]
    fn complement_of_eq_is_ne() {
        let eq = IntAutomaton::linear_constraint(&[1], Relation::Eq, 3, 5);
        let ne = IntAutomaton::linear_constraint(&[1], Relation::Ne, 3, 5);
        assert!(eq.complement().inner.is_equivalent(&ne.inner).unwrap());
    }

    #[test]
    fn accepting_value_matches_manual_witness_decode() {
        let a = IntAutomaton::linear_constraint(&[1, 1], Relation::Eq, 5, 6);
        let witness = a.automaton().enumerate_witness(6).unwrap();
        assert_eq!(a.get_an_accepting_value(0), Some(decode(&witness, 0)));
        assert_eq!(a.get_an_accepting_value(1), Some(decode(&witness, 1)));
    }

    #[test]
    fn accepting_value_is_none_for_empty_language() {
        let empty = IntAutomaton::none(1, 6);
        assert_eq!(empty.get_an_accepting_value(0), None);
    }

    #[test]
    fn unary_bridge_round_trips_a_bounded_range() {
        let ge = IntAutomaton::linear_constraint(&[1], Relation::Ge, 2, 6);
        let le = IntAutomaton::linear_constraint(&[1], Relation::Le, 4, 6);
        let range = ge.intersect(&le).unwrap();
        let set = range.to_unary().extract_semilinear_set();
        for n in 0..8u64 {
            assert_eq!(set.contains(n), (2..=4).contains(&(n as i64)), "length {n}");
        }
        let rebuilt = IntAutomaton::from_semilinear_set(&set, 6);
        for n in 0..8i64 {
            assert_eq!(rebuilt.accepts_value(n), (2..=4).contains(&n), "value {n}");
        }
    }
}
