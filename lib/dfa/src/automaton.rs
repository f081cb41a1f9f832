//! The automaton core shared by every flavor in this crate (spec §4.1).
//!
//! States are a dense `0..num_states` index range. The transition relation
//! is kept as, for every state, a list of `(guard, target)` pairs where
//! `guard` is a [`Bdd`] over the input-symbol's Boolean variables. For a
//! deterministic automaton the guards leaving one state are pairwise
//! disjoint and their union is the constant-true BDD (an implicit sink
//! absorbs any input vector not covered by an explicit guard; see
//! [`Automaton::has_sink`]). This is the same information content as "one
//! BDD over `(state bits, input bits) -> next state`" that spec.md
//! describes, just keyed by source state through a plain array instead of
//! folding the state into the BDD as well — with at most a few thousand
//! states per automaton in this solver's workloads, a dense `Vec` indexed
//! by state is simpler and no slower than adding state-encoding variables
//! to the BDD, and it keeps every per-state edge list independently
//! inspectable for minimization and product construction.

use std::collections::{HashMap, VecDeque};

use fixedbitset::FixedBitSet;

use crate::bdd::{Bdd, BddManager};
use crate::error::{KernelError, Result};

/// The combination mode for [`Automaton::product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductMode {
    /// Language intersection.
    Intersect,
    /// Language union.
    Union,
    /// Language difference (`A` but not `B`).
    Difference,
}

/// An edge leaving a state: the set of input vectors that take it, and
/// the state reached.
#[derive(Debug, Clone)]
pub struct Edge {
    pub guard: Bdd,
    pub target: usize,
}

/// A deterministic automaton over fixed-width Boolean-vector symbols.
///
/// Invariants (spec.md §3): deterministic and minimized on exit from
/// every public operation below; at most one sink state; if attached, a
/// variable ordering's length equals the track count (tracked by the
/// flavor-specific wrappers in `string_automaton.rs`/`int_automaton.rs`/
/// `multitrack.rs`, not here).
#[derive(Debug, Clone)]
pub struct Automaton {
    manager: BddManager,
    initial: usize,
    accepting: FixedBitSet,
    edges: Vec<Vec<Edge>>,
    sink: Option<usize>,
}

impl Automaton {
    /// Builds an automaton from an explicit state/edge/accepting listing.
    /// `edges[s]` need not be total; any input vector not matched by a
    /// guard in `edges[s]` is implicitly rejecting (routed to an implicit
    /// sink introduced lazily by operations that need totality, such as
    /// [`Automaton::complement`]).
    pub fn new(
        manager: BddManager,
        num_states: usize,
        initial: usize,
        accepting: FixedBitSet,
        edges: Vec<Vec<Edge>>,
    ) -> Self {
        assert_eq!(edges.len(), num_states);
        assert!(initial < num_states);
        Self {
            manager,
            initial,
            accepting,
            edges,
            sink: None,
        }
    }

    /// The empty-language automaton over the given manager: a single
    /// non-accepting state that loops on every input.
    pub fn empty(manager: BddManager) -> Self {
        let guard = manager.one();
        let mut accepting = FixedBitSet::with_capacity(1);
        accepting.set(0, false);
        Self {
            edges: vec![vec![Edge { guard, target: 0 }]],
            manager,
            initial: 0,
            accepting,
            sink: Some(0),
        }
    }

    /// The universal-language automaton over the given manager: a single
    /// accepting state that loops on every input.
    pub fn universal(manager: BddManager) -> Self {
        let guard = manager.one();
        let mut accepting = FixedBitSet::with_capacity(1);
        accepting.set(0, true);
        Self {
            edges: vec![vec![Edge { guard, target: 0 }]],
            manager,
            initial: 0,
            accepting,
            sink: None,
        }
    }

    pub fn manager(&self) -> &BddManager {
        &self.manager
    }

    pub fn num_states(&self) -> usize {
        self.edges.len()
    }

    pub fn initial_state(&self) -> usize {
        self.initial
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting[state]
    }

    pub fn edges(&self, state: usize) -> &[Edge] {
        &self.edges[state]
    }

    /// Whether this automaton has an explicit, already-identified sink
    /// state (a non-accepting state with no reachable accepting
    /// successor). Kernel operations that need totality normalize both
    /// "library emits an explicit sink" and "no sink was ever
    /// materialized" to this same meaning.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    fn check_same_manager(&self, other: &Self) -> Result<()> {
        if !self.manager.same_universe(&other.manager) {
            return Err(KernelError::IncompatibleTracks(
                "automata use different BDD managers".to_string(),
            ));
        }
        Ok(())
    }

    /// Classical product construction over reachable state pairs.
    pub fn product(&self, other: &Self, mode: ProductMode) -> Result<Self> {
        self.check_same_manager(other)?;
        let mut pair_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut states: Vec<(usize, usize)> = Vec::new();
        let mut queue = VecDeque::new();

        let start = (self.initial, other.initial);
        pair_index.insert(start, 0);
        states.push(start);
        queue.push_back(start);

        let mut edges: Vec<Vec<Edge>> = Vec::new();
        while let Some((a, b)) = queue.pop_front() {
            let mut out = Vec::new();
            for ea in &self.edges[a] {
                for eb in &other.edges[b] {
                    let guard = ea.guard.and(&eb.guard);
                    if guard.is_zero() {
                        continue;
                    }
                    let key = (ea.target, eb.target);
                    let idx = *pair_index.entry(key).or_insert_with(|| {
                        states.push(key);
                        queue.push_back(key);
                        states.len() - 1
                    });
                    out.push(Edge { guard, target: idx });
                }
            }
            let pos = pair_index[&(a, b)];
            if edges.len() <= pos {
                edges.resize_with(pos + 1, Vec::new);
            }
            edges[pos] = out;
        }
        edges.resize_with(states.len(), Vec::new);

        let mut accepting = FixedBitSet::with_capacity(states.len());
        for (idx, &(a, b)) in states.iter().enumerate() {
            let acc = match mode {
                ProductMode::Intersect => self.accepting[a] && other.accepting[b],
                ProductMode::Union => self.accepting[a] || other.accepting[b],
                ProductMode::Difference => self.accepting[a] && !other.accepting[b],
            };
            accepting.set(idx, acc);
        }

        let result = Self {
            manager: self.manager.clone(),
            initial: 0,
            accepting,
            edges,
            sink: None,
        };
        Ok(result.minimize())
    }

    /// Complement: totalize (materialize an explicit sink for any
    /// previously-implicit rejection) then flip acceptance.
    pub fn complement(&self) -> Self {
        let mut totalized = self.totalize();
        for i in 0..totalized.accepting.len() {
            let v = totalized.accepting[i];
            totalized.accepting.set(i, !v);
        }
        totalized.minimize()
    }

    /// Adds an explicit sink state and routes every state's uncovered
    /// input space to it, so that every state has a total transition
    /// function (guards leaving it union to true).
    pub fn totalize(&self) -> Self {
        if self.sink.is_some() {
            return self.clone();
        }
        let sink_index = self.edges.len();
        let mut edges = self.edges.clone();
        edges.push(vec![Edge {
            guard: self.manager.one(),
            target: sink_index,
        }]);
        for state_edges in edges.iter_mut().take(sink_index) {
            let covered = state_edges
                .iter()
                .fold(self.manager.zero(), |acc, e| acc.or(&e.guard));
            let remainder = covered.not();
            if !remainder.is_zero() {
                state_edges.push(Edge {
                    guard: remainder,
                    target: sink_index,
                });
            }
        }
        let mut accepting = self.accepting.clone();
        accepting.grow(sink_index + 1);
        accepting.set(sink_index, false);
        Self {
            manager: self.manager.clone(),
            initial: self.initial,
            accepting,
            edges,
            sink: Some(sink_index),
        }
    }

    /// Existentially quantifies the given input-variable indices out of
    /// every guard, then determinizes (subset construction) and
    /// minimizes. Used to project out one track of a multi-track
    /// automaton, or one variable of an integer automaton.
    pub fn project(&self, var_indices: &[usize]) -> Self {
        let quantified: Vec<Vec<Edge>> = self
            .edges
            .iter()
            .map(|out| {
                out.iter()
                    .map(|e| Edge {
                        guard: e.guard.exists(var_indices),
                        target: e.target,
                    })
                    .collect()
            })
            .collect();
        let nfa = Self {
            manager: self.manager.clone(),
            initial: self.initial,
            accepting: self.accepting.clone(),
            edges: quantified,
            sink: None,
        };
        nfa.determinize().minimize()
    }

    /// Subset construction over a (possibly nondeterministic, i.e.
    /// overlapping-guard) edge relation. Guards at each reachable subset
    /// are disjointified by taking the common Boolean refinement of the
    /// contributing edges' guards.
    pub fn determinize(&self) -> Self {
        let mut subset_index: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut subsets: Vec<Vec<usize>> = Vec::new();
        let mut queue = VecDeque::new();

        let start = vec![self.initial];
        subset_index.insert(start.clone(), 0);
        subsets.push(start.clone());
        queue.push_back(start);

        let mut edges: Vec<Vec<Edge>> = Vec::new();
        while let Some(subset) = queue.pop_front() {
            let my_index = subset_index[&subset];
            let atoms = Self::common_refinement(
                subset
                    .iter()
                    .flat_map(|&s| self.edges[s].iter())
                    .map(|e| e.guard.clone())
                    .collect(),
            );
            let mut out = Vec::new();
            for atom in atoms {
                if atom.is_zero() {
                    continue;
                }
                let mut targets: Vec<usize> = subset
                    .iter()
                    .flat_map(|&s| self.edges[s].iter())
                    .filter(|e| !e.guard.and(&atom).is_zero())
                    .map(|e| e.target)
                    .collect();
                targets.sort_unstable();
                targets.dedup();
                let idx = *subset_index.entry(targets.clone()).or_insert_with(|| {
                    subsets.push(targets.clone());
                    queue.push_back(targets.clone());
                    subsets.len() - 1
                });
                out.push(Edge { guard: atom, target: idx });
            }
            if edges.len() <= my_index {
                edges.resize_with(my_index + 1, Vec::new);
            }
            edges[my_index] = out;
        }
        edges.resize_with(subsets.len(), Vec::new);

        let mut accepting = FixedBitSet::with_capacity(subsets.len());
        for (idx, subset) in subsets.iter().enumerate() {
            accepting.set(idx, subset.iter().any(|&s| self.accepting[s]));
        }

        Self {
            manager: self.manager.clone(),
            initial: 0,
            accepting,
            edges,
            sink: None,
        }
    }

    /// Refines a list of (possibly overlapping) guards into a list of
    /// pairwise-disjoint "atoms" whose union equals the union of the
    /// input guards, by intersecting each guard against the complement
    /// of everything already accounted for.
    fn common_refinement(guards: Vec<Bdd>) -> Vec<Bdd> {
        let mut atoms = Vec::new();
        let mut covered: Option<Bdd> = None;
        for g in guards {
            let remaining = match &covered {
                Some(c) => g.and_not(c),
                None => g.clone(),
            };
            if !remaining.is_zero() {
                atoms.push(remaining.clone());
                covered = Some(match covered {
                    Some(c) => c.or(&remaining),
                    None => remaining,
                });
            }
        }
        atoms
    }

    /// Minimizes via partition refinement: states start partitioned by
    /// acceptance, then blocks are split whenever two states in the same
    /// block reach different blocks under some common guard atom, until
    /// no further split occurs.
    pub fn minimize(&self) -> Self {
        let reachable = self.reachable_states();
        let n = self.edges.len();
        let mut block_of: Vec<usize> = (0..n)
            .map(|s| if self.accepting[s] { 1 } else { 0 })
            .collect();
        let mut num_blocks = 2;

        loop {
            let mut new_block_of = vec![0usize; n];
            let mut signature_index: HashMap<Vec<(Vec<u8>, usize)>, usize> = HashMap::new();
            let mut next_block = 0usize;
            for s in 0..n {
                if !reachable[s] {
                    continue;
                }
                let atoms = Self::common_refinement(self.edges[s].iter().map(|e| e.guard.clone()).collect());
                // Keyed by the distinguishing atom's own canonical bytes,
                // not just its target block: two states whose transitions
                // route different atoms to different blocks must not be
                // merged just because the *multiset* of target blocks
                // happens to match (e.g. p: atom1->A, atom2->B vs.
                // q: atom1->B, atom2->A, with A != B).
                let mut sig: Vec<(Vec<u8>, usize)> = atoms
                    .iter()
                    .map(|atom| {
                        let target_block = self.edges[s]
                            .iter()
                            .find(|e| !e.guard.and(atom).is_zero())
                            .map(|e| block_of[e.target])
                            .unwrap_or(usize::MAX);
                        (atom.canonical_bytes(), target_block)
                    })
                    .collect();
                sig.sort();
                sig.push((vec![block_of[s] as u8], 0));
                let idx = *signature_index.entry(sig).or_insert_with(|| {
                    next_block += 1;
                    next_block - 1
                });
                new_block_of[s] = idx;
            }
            if next_block == num_blocks {
                block_of = new_block_of;
                break;
            }
            num_blocks = next_block;
            block_of = new_block_of;
        }

        let mut block_repr: HashMap<usize, usize> = HashMap::new();
        let mut new_states: Vec<usize> = Vec::new();
        for s in 0..n {
            if !reachable[s] {
                continue;
            }
            block_repr.entry(block_of[s]).or_insert_with(|| {
                new_states.push(s);
                new_states.len() - 1
            });
        }
        let mut remap = vec![usize::MAX; n];
        for s in 0..n {
            if reachable[s] {
                remap[s] = block_repr[&block_of[s]];
            }
        }

        let mut accepting = FixedBitSet::with_capacity(new_states.len());
        let mut edges: Vec<Vec<Edge>> = Vec::with_capacity(new_states.len());
        for &rep in &new_states {
            accepting.push(self.accepting[rep]);
            let atoms = Self::common_refinement(self.edges[rep].iter().map(|e| e.guard.clone()).collect());
            let mut out = Vec::new();
            for atom in atoms {
                if let Some(e) = self.edges[rep].iter().find(|e| !e.guard.and(&atom).is_zero()) {
                    out.push(Edge {
                        guard: atom,
                        target: remap[e.target],
                    });
                }
            }
            edges.push(out);
        }

        Self {
            manager: self.manager.clone(),
            initial: remap[self.initial],
            accepting,
            edges,
            sink: self.sink.filter(|&s| reachable[s]).map(|s| remap[s]),
        }
    }

    /// The set of states reachable from the initial state.
    pub fn reachable_states(&self) -> FixedBitSet {
        let mut reached = FixedBitSet::with_capacity(self.edges.len());
        let mut queue = VecDeque::new();
        reached.insert(self.initial);
        queue.push_back(self.initial);
        while let Some(s) = queue.pop_front() {
            for e in &self.edges[s] {
                if !e.guard.is_zero() && !reached[e.target] {
                    reached.insert(e.target);
                    queue.push_back(e.target);
                }
            }
        }
        reached
    }

    /// `true` if the language of this automaton is empty, i.e. no
    /// accepting state is reachable from the initial state.
    pub fn is_empty_language(&self) -> bool {
        let reached = self.reachable_states();
        (0..self.edges.len()).all(|s| !reached[s] || !self.accepting[s])
    }

    /// `true` if `self` and `other` accept the same language, checked via
    /// `(self \ other) ∪ (other \ self)` being empty.
    pub fn is_equivalent(&self, other: &Self) -> Result<bool> {
        let diff1 = self.product(other, ProductMode::Difference)?;
        let diff2 = other.product(self, ProductMode::Difference)?;
        Ok(diff1.is_empty_language() && diff2.is_empty_language())
    }

    /// Breadth-first search for the lexicographically-smallest accepted
    /// word, returned as a sequence of per-step Boolean-vector symbols
    /// (one `Vec<bool>` of width `manager.num_vars()` per step).
    pub fn enumerate_witness(&self, max_len: usize) -> Option<Vec<Vec<bool>>> {
        let mut queue = VecDeque::new();
        queue.push_back((self.initial, Vec::new()));
        let mut visited_at_len: HashMap<(usize, usize), ()> = HashMap::new();
        while let Some((state, path)) = queue.pop_front() {
            if self.accepting[state] {
                return Some(path);
            }
            if path.len() >= max_len {
                continue;
            }
            let key = (state, path.len());
            if visited_at_len.contains_key(&key) {
                continue;
            }
            visited_at_len.insert(key, ());
            let mut sorted_edges: Vec<&Edge> = self.edges[state].iter().collect();
            sorted_edges.sort_by_key(|e| e.target);
            for e in sorted_edges {
                if e.guard.is_zero() {
                    continue;
                }
                if let Some(symbol) = e.guard.sat_witness() {
                    let mut next_path = path.clone();
                    next_path.push(symbol);
                    queue.push_back((e.target, next_path));
                }
            }
        }
        None
    }

    /// Number of states that have a reachable accepting successor;
    /// complement of the sink set, used by the counter to size the
    /// transfer matrix tightly.
    pub fn num_reachable_states(&self) -> usize {
        self.reachable_states().count_ones(..)
    }

    /// Collapses this automaton's alphabet to a single letter, yielding the
    /// unary automaton of accepted word *lengths* (spec.md §4.3's bridge
    /// from a string/length-bearing automaton to its semilinear length
    /// set). Built by subset construction over "some edge out of any state
    /// in this subset, for any guard" successors; since the collapsed
    /// alphabet has one letter, every subset has exactly one successor
    /// subset, so the result is already in the required single-outgoing-
    /// edge unary shape without further determinization.
    pub fn length_automaton(&self) -> crate::unary::UnaryAutomaton {
        let mut subset_index: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut subsets: Vec<Vec<usize>> = Vec::new();
        let mut next: Vec<usize> = Vec::new();
        let mut accepting_flags: Vec<bool> = Vec::new();

        let start = vec![self.initial];
        subset_index.insert(start.clone(), 0);
        subsets.push(start);
        let mut queue = VecDeque::from([0usize]);
        next.push(0);
        accepting_flags.push(false);

        while let Some(idx) = queue.pop_front() {
            let subset = subsets[idx].clone();
            accepting_flags[idx] = subset.iter().any(|&s| self.accepting[s]);

            let mut successors: Vec<usize> = Vec::new();
            for &s in &subset {
                for e in &self.edges[s] {
                    if !e.guard.is_zero() && !successors.contains(&e.target) {
                        successors.push(e.target);
                    }
                }
            }
            successors.sort_unstable();

            let next_idx = *subset_index.entry(successors.clone()).or_insert_with(|| {
                subsets.push(successors.clone());
                next.push(0);
                accepting_flags.push(false);
                queue.push_back(subsets.len() - 1);
                subsets.len() - 1
            });
            next[idx] = next_idx;
        }

        let mut accepting = FixedBitSet::with_capacity(accepting_flags.len());
        for (i, &a) in accepting_flags.iter().enumerate() {
            accepting.set(i, a);
        }
        crate::unary::UnaryAutomaton::new(next, 0, accepting)
    }

    /// Walks `word` one symbol at a time from the initial state, following
    /// whichever edge's guard the symbol satisfies (guards at a state are
    /// disjoint by construction). A symbol matched by no edge lands on an
    /// implicit, non-accepting sink.
    pub fn accepts(&self, word: &[Vec<bool>]) -> bool {
        let mut state = self.initial;
        for symbol in word {
            let next = self.edges[state].iter().find(|e| e.guard.evaluate(symbol)).map(|e| e.target);
            match next {
                Some(s) => state = s,
                None => return false,
            }
        }
        self.accepting[state]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::BddManager;

    fn single_bit_automaton(accept_on_one: bool) -> Automaton {
        let manager = BddManager::with_vars(1);
        let mut accepting = FixedBitSet::with_capacity(2);
        accepting.set(1, true);
        let edges = vec![
            vec![
                Edge { guard: manager.var(0), target: 1 },
                Edge { guard: manager.not_var(0), target: 0 },
            ],
            vec![Edge { guard: manager.one(), target: 1 }],
        ];
        let _ = accept_on_one;
        Automaton::new(manager, 2, 0, accepting, edges)
    }

    #[test]
    fn product_intersect_distributes_over_union() {
        let manager = BddManager::with_vars(1);
        let a = single_bit_automaton(true);
        let mut b_accepting = FixedBitSet::with_capacity(1);
        b_accepting.set(0, true);
        let b = Automaton::new(
            manager.clone(),
            1,
            0,
            b_accepting,
            vec![vec![Edge { guard: manager.one(), target: 0 }]],
        );
        let c = Automaton::empty(manager);

        let bc = b.product(&c, ProductMode::Union).unwrap();
        let lhs = a.product(&bc, ProductMode::Intersect).unwrap();

        let ab = a.product(&b, ProductMode::Intersect).unwrap();
        let ac = a.product(&c, ProductMode::Intersect).unwrap();
        let rhs = ab.product(&ac, ProductMode::Union).unwrap();

        assert!(lhs.is_equivalent(&rhs).unwrap());
    }

    #[test]
    fn complement_of_universal_is_empty() {
        let manager = BddManager::with_vars(1);
        let universal = Automaton::universal(manager);
        assert!(universal.complement().is_empty_language());
    }

    #[test]
    fn minimize_keeps_language() {
        let a = single_bit_automaton(true);
        let minimized = a.minimize();
        assert!(a.is_equivalent(&minimized).unwrap());
    }

    #[test]
    fn witness_is_found_for_nonempty_language() {
        let a = single_bit_automaton(true);
        let witness = a.enumerate_witness(4);
        assert!(witness.is_some());
    }

    #[test]
    fn length_automaton_of_literal_accepts_only_its_length() {
        let literal = crate::string_automaton::StringAutomaton::literal(b"abc");
        let lengths = literal.automaton().length_automaton();
        let set = lengths.extract_semilinear_set();
        assert!(set.contains(3));
        assert!(!set.contains(2));
        assert!(!set.contains(4));
    }

    #[test]
    fn length_automaton_of_star_is_eventually_periodic() {
        let star = crate::string_automaton::StringAutomaton::literal(b"a").star();
        let lengths = star.automaton().length_automaton();
        let set = lengths.extract_semilinear_set();
        assert!(!set.is_finite());
        for n in 0..10u64 {
            assert!(set.contains(n));
        }
    }
}
