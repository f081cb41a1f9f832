//! Single-track string automata: each input symbol is one byte, encoded
//! as 8 Boolean variables (`v0`..`v7`, MSB first) in a dedicated
//! [`BddManager`]. Built directly on [`Automaton`]; this module only adds
//! the byte-alphabet-specific constructors (literals, character ranges,
//! concatenation, Kleene star) and the relational transducers used by the
//! solver to compute pre-images of `str.at`/`str.++` (spec.md §4.1, §4.10).

use crate::automaton::{Automaton, Edge, ProductMode};
use crate::bdd::BddManager;
use crate::error::Result;

const BYTE_WIDTH: usize = 8;

/// A string automaton: a one-track [`Automaton`] over an 8-bit alphabet.
#[derive(Debug, Clone)]
pub struct StringAutomaton {
    inner: Automaton,
}

fn byte_manager() -> BddManager {
    BddManager::with_vars(BYTE_WIDTH)
}

fn byte_guard(manager: &BddManager, byte: u8) -> crate::bdd::Bdd {
    let mut guard = manager.one();
    for bit in 0..BYTE_WIDTH {
        let mask = 1u8 << (BYTE_WIDTH - 1 - bit);
        let literal = if byte & mask != 0 {
            manager.var(bit)
        } else {
            manager.not_var(bit)
        };
        guard = guard.and(&literal);
    }
    guard
}

fn range_guard(manager: &BddManager, low: u8, high: u8) -> crate::bdd::Bdd {
    let mut acc = manager.zero();
    for b in low..=high {
        acc = acc.or(&byte_guard(manager, b));
    }
    acc
}

impl StringAutomaton {
    pub fn from_automaton(inner: Automaton) -> Self {
        Self { inner }
    }

    pub fn into_automaton(self) -> Automaton {
        self.inner
    }

    pub fn automaton(&self) -> &Automaton {
        &self.inner
    }

    /// The automaton accepting exactly the given literal string.
    pub fn literal(bytes: &[u8]) -> Self {
        let manager = byte_manager();
        let n = bytes.len();
        let mut edges = Vec::with_capacity(n + 2);
        for (i, &b) in bytes.iter().enumerate() {
            edges.push(vec![Edge {
                guard: byte_guard(&manager, b),
                target: i + 1,
            }]);
        }
        edges.push(Vec::new());
        let mut accepting = fixedbitset::FixedBitSet::with_capacity(n + 1);
        accepting.set(n, true);
        let automaton = Automaton::new(manager, n + 1, 0, accepting, edges);
        Self { inner: automaton.minimize() }
    }

    /// The automaton accepting exactly one character in `[low, high]`.
    pub fn char_range(low: u8, high: u8) -> Self {
        let manager = byte_manager();
        let mut accepting = fixedbitset::FixedBitSet::with_capacity(2);
        accepting.set(1, true);
        let edges = vec![
            vec![Edge { guard: range_guard(&manager, low, high), target: 1 }],
            Vec::new(),
        ];
        Self { inner: Automaton::new(manager, 2, 0, accepting, edges).minimize() }
    }

    /// The automaton accepting every finite byte string, `Sigma*`.
    pub fn any_string() -> Self {
        let manager = byte_manager();
        Self { inner: Automaton::universal(manager) }
    }

    /// Builds a length-only automaton from a [`crate::unary::UnaryAutomaton`]:
    /// content is unconstrained, only the word's length matters, each state
    /// advancing on any byte exactly as `u`'s single state transition does
    /// (spec.md §4.11 step 3, restricting a string group to the lengths a
    /// shrunk arithmetic group currently allows).
    pub fn from_length_automaton(u: &crate::unary::UnaryAutomaton) -> Self {
        let manager = byte_manager();
        let n = u.len();
        let mut edges: Vec<Vec<Edge>> = Vec::with_capacity(n);
        for s in 0..n {
            edges.push(vec![Edge { guard: manager.one(), target: u.next_state(s) }]);
        }
        let mut accepting = fixedbitset::FixedBitSet::with_capacity(n);
        for s in 0..n {
            accepting.set(s, u.is_accepting(s));
        }
        let automaton = Automaton::new(manager, n, u.initial_state(), accepting, edges);
        Self { inner: automaton.determinize().minimize() }
    }

    pub fn union(&self, other: &Self) -> Result<Self> {
        Ok(Self { inner: self.inner.product(&other.inner, ProductMode::Union)? })
    }

    pub fn intersect(&self, other: &Self) -> Result<Self> {
        Ok(Self { inner: self.inner.product(&other.inner, ProductMode::Intersect)? })
    }

    pub fn complement(&self) -> Self {
        Self { inner: self.inner.complement() }
    }

    /// Epsilon-free concatenation: every edge leaving an accepting state
    /// of `self` is overlaid with `other`'s initial state's outgoing
    /// edges (re-targeted into the appended copy of `other`), so a run
    /// can "hand off" to `other` at any point it would otherwise stop
    /// accepting in `self` alone.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        if !self.inner.manager().same_universe(other.inner.manager()) {
            return Err(crate::error::KernelError::IncompatibleTracks(
                "string automata use different byte managers".to_string(),
            ));
        }
        let offset = self.inner.num_states();
        let other_initial = other.inner.initial_state() + offset;

        let mut edges: Vec<Vec<Edge>> = Vec::with_capacity(offset + other.inner.num_states());
        for s in 0..self.inner.num_states() {
            let mut out: Vec<Edge> = self.inner.edges(s).to_vec();
            if self.inner.is_accepting(s) {
                for e in other.inner.edges(other.inner.initial_state()) {
                    out.push(Edge { guard: e.guard.clone(), target: e.target + offset });
                }
            }
            edges.push(out);
        }
        for s in 0..other.inner.num_states() {
            let out: Vec<Edge> = other
                .inner
                .edges(s)
                .iter()
                .map(|e| Edge { guard: e.guard.clone(), target: e.target + offset })
                .collect();
            edges.push(out);
        }

        let total = offset + other.inner.num_states();
        let mut accepting = fixedbitset::FixedBitSet::with_capacity(total);
        for s in 0..self.inner.num_states() {
            let accept_here = self.inner.is_accepting(s) && other.inner.is_accepting(other.inner.initial_state());
            accepting.set(s, accept_here);
        }
        for s in 0..other.inner.num_states() {
            accepting.set(offset + s, other.inner.is_accepting(s));
        }
        let _ = other_initial;

        let nfa = Automaton::new(self.inner.manager().clone(), total, self.inner.initial_state(), accepting, edges);
        Ok(Self { inner: nfa.determinize().minimize() })
    }

    /// Kleene star: like [`concat`](Self::concat) but the "hand-off" loops
    /// back to the automaton's own initial state, and the initial state
    /// becomes accepting (the empty word).
    pub fn star(&self) -> Self {
        let n = self.inner.num_states();
        let mut edges: Vec<Vec<Edge>> = Vec::with_capacity(n);
        for s in 0..n {
            let mut out: Vec<Edge> = self.inner.edges(s).to_vec();
            if self.inner.is_accepting(s) {
                for e in self.inner.edges(self.inner.initial_state()) {
                    out.push(Edge { guard: e.guard.clone(), target: e.target });
                }
            }
            edges.push(out);
        }
        let mut accepting = fixedbitset::FixedBitSet::with_capacity(n);
        for s in 0..n {
            accepting.set(s, self.inner.is_accepting(s));
        }
        accepting.set(self.inner.initial_state(), true);
        let nfa = Automaton::new(self.inner.manager().clone(), n, self.inner.initial_state(), accepting, edges);
        Self { inner: nfa.determinize().minimize() }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty_language()
    }

    /// A shortest accepted string, if the language is nonempty.
    pub fn witness(&self, max_len: usize) -> Option<Vec<u8>> {
        let bits = self.inner.enumerate_witness(max_len)?;
        Some(
            bits.into_iter()
                .map(|symbol| {
                    symbol.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit as u8))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_accepts_only_itself() {
        let a = StringAutomaton::literal(b"ab");
        assert_eq!(a.witness(10), Some(b"ab".to_vec()));
        let b = StringAutomaton::literal(b"ac");
        assert!(a.intersect(&b).unwrap().is_empty());
    }

    #[test]
    fn concat_joins_literals() {
        let a = StringAutomaton::literal(b"foo");
        let b = StringAutomaton::literal(b"bar");
        let joined = a.concat(&b).unwrap();
        let expected = StringAutomaton::literal(b"foobar");
        assert!(joined.inner.is_equivalent(&expected.inner).unwrap());
    }

    #[test]
    fn star_accepts_empty_word() {
        let a = StringAutomaton::literal(b"x").star();
        assert_eq!(a.witness(5), Some(Vec::new()));
    }

    #[test]
    fn star_accepts_repetitions() {
        let a = StringAutomaton::literal(b"ab").star();
        let four = StringAutomaton::literal(b"abab");
        assert!(!a.intersect(&four).unwrap().is_empty());
        let odd = StringAutomaton::literal(b"aba");
        assert!(a.intersect(&odd).unwrap().is_empty());
    }
}
