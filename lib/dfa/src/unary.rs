//! Unary automata and the semilinear-set bridge (spec.md §4.1, §4.7).
//!
//! A unary automaton has a single-letter alphabet, so determinism forces
//! every state to have exactly one outgoing transition: the reachable
//! part of the state graph is a "rho shape" — a tail of `mu` states
//! followed by a cycle of `lambda` states. `extract_semilinear_set`
//! walks that shape once (the same traversal as `GetSemilinearSet` in the
//! reference solver's `UnaryAutomaton`) and reads off the accepted-length
//! set directly: each accepting state in the tail contributes an isolated
//! constant, and each accepting state in the cycle contributes an
//! eventually-periodic arithmetic progression.

use std::collections::HashMap;

use fixedbitset::FixedBitSet;

/// A deterministic automaton over a one-letter alphabet: state `s`'s only
/// transition goes to `next[s]`.
#[derive(Debug, Clone)]
pub struct UnaryAutomaton {
    next: Vec<usize>,
    initial: usize,
    accepting: FixedBitSet,
}

impl UnaryAutomaton {
    pub fn new(next: Vec<usize>, initial: usize, accepting: FixedBitSet) -> Self {
        assert_eq!(next.len(), accepting.len());
        assert!(initial < next.len());
        Self { next, initial, accepting }
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn initial_state(&self) -> usize {
        self.initial
    }

    pub fn next_state(&self, state: usize) -> usize {
        self.next[state]
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting[state]
    }

    /// One linear progression `{ base + k * period : k = 0, 1, 2, ... }`,
    /// or a lone constant when `period == 0`.
    pub fn accepted_lengths(&self, max_len: usize) -> Vec<usize> {
        let mut lengths = Vec::new();
        let mut state = self.initial;
        for len in 0..=max_len {
            if self.accepting[state] {
                lengths.push(len);
            }
            state = self.next[state];
        }
        lengths
    }

    /// Finds the tail length `mu` and cycle length `lambda` of the
    /// reachable state sequence starting at the initial state, by
    /// recording the step index at which each state is first visited.
    fn tail_and_cycle(&self) -> (usize, usize) {
        let mut first_visit: HashMap<usize, usize> = HashMap::new();
        let mut state = self.initial;
        let mut step = 0;
        loop {
            if let Some(&seen_at) = first_visit.get(&state) {
                return (seen_at, step - seen_at);
            }
            first_visit.insert(state, step);
            state = self.next[state];
            step += 1;
        }
    }

    /// Extracts the semilinear set of accepted word lengths.
    pub fn extract_semilinear_set(&self) -> SemilinearSet {
        let (mu, lambda) = self.tail_and_cycle();

        let mut state = self.initial;
        let mut tail_states = Vec::with_capacity(mu);
        for _ in 0..mu {
            tail_states.push(state);
            state = self.next[state];
        }
        let mut cycle_states = Vec::with_capacity(lambda);
        for _ in 0..lambda {
            cycle_states.push(state);
            state = self.next[state];
        }

        let constants: Vec<u64> = tail_states
            .iter()
            .enumerate()
            .filter(|(_, &s)| self.accepting[s])
            .map(|(i, _)| i as u64)
            .collect();

        let periodic: Vec<LinearSet> = cycle_states
            .iter()
            .enumerate()
            .filter(|(_, &s)| self.accepting[s])
            .map(|(offset, _)| LinearSet {
                base: (mu + offset) as u64,
                period: lambda as u64,
            })
            .collect();

        SemilinearSet { constants, periodic }
    }
}

/// One linear progression `{ base + k * period : k >= 0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearSet {
    pub base: u64,
    pub period: u64,
}

/// The accepted-length set of a unary automaton: a finite set of isolated
/// constants (lengths accepted only in the tail) unioned with a finite
/// set of eventually-periodic progressions (lengths accepted in the
/// cycle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemilinearSet {
    pub constants: Vec<u64>,
    pub periodic: Vec<LinearSet>,
}

impl SemilinearSet {
    pub fn contains(&self, n: u64) -> bool {
        if self.constants.contains(&n) {
            return true;
        }
        self.periodic.iter().any(|p| n >= p.base && (n - p.base) % p.period.max(1) == 0)
    }

    /// `true` if the set has no eventual period, i.e. only finitely many
    /// lengths are accepted at all.
    pub fn is_finite(&self) -> bool {
        self.periodic.is_empty()
    }

    /// Reverse construction (spec.md §4.3): builds the tail-plus-cycle
    /// unary DFA whose accepted-length set is exactly `self`. One state
    /// per length from `0` up to the end of the longest periodic base,
    /// then the periodic tail loops back `period` states.
    ///
    /// Assumes every [`LinearSet`] in `periodic` shares one common period
    /// (true of every set [`UnaryAutomaton::extract_semilinear_set`]
    /// produces, since its periodic entries all come from one automaton's
    /// single cycle); a union of sets with genuinely different periods
    /// would need an LCM combination this does not attempt.
    pub fn to_unary(&self) -> UnaryAutomaton {
        let cycle_len = self.periodic.iter().map(|p| p.period).max().unwrap_or(0);
        let tail_len = self
            .constants
            .iter()
            .copied()
            .chain(self.periodic.iter().map(|p| p.base))
            .max()
            .map(|m| m + 1)
            .unwrap_or(0);

        if cycle_len == 0 {
            // Purely finite set: a tail of `tail_len` states plus one
            // non-accepting absorbing state.
            let n = tail_len as usize + 1;
            let mut next: Vec<usize> = (1..=n).collect();
            *next.last_mut().unwrap() = n - 1;
            let mut accepting = FixedBitSet::with_capacity(n);
            for &c in &self.constants {
                accepting.set(c as usize, true);
            }
            return UnaryAutomaton::new(next, 0, accepting);
        }

        let mu = tail_len as usize;
        let lambda = cycle_len as usize;
        let n = mu + lambda;
        let mut next: Vec<usize> = (1..=n).collect();
        *next.last_mut().unwrap() = mu;
        let mut accepting = FixedBitSet::with_capacity(n);
        for &c in &self.constants {
            if (c as usize) < mu {
                accepting.set(c as usize, true);
            }
        }
        for p in &self.periodic {
            let mut state = p.base as usize;
            while state < n {
                accepting.set(state, true);
                state += lambda;
            }
        }
        UnaryAutomaton::new(next, 0, accepting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rho_shape(tail: usize, cycle: usize, accepting_offsets: &[usize]) -> UnaryAutomaton {
        let n = tail + cycle;
        let mut next = vec![0usize; n];
        for i in 0..n {
            next[i] = if i + 1 < n { i + 1 } else { tail };
        }
        let mut accepting = FixedBitSet::with_capacity(n);
        for &o in accepting_offsets {
            accepting.set(o, true);
        }
        UnaryAutomaton::new(next, 0, accepting)
    }

    #[test]
    fn pure_tail_gives_only_constants() {
        let a = rho_shape(3, 1, &[0, 2]);
        let set = a.extract_semilinear_set();
        assert!(set.is_finite());
        assert!(set.contains(0));
        assert!(set.contains(2));
        assert!(!set.contains(1));
    }

    #[test]
    fn cycle_gives_eventual_period() {
        let a = rho_shape(2, 3, &[2]);
        let set = a.extract_semilinear_set();
        assert!(!set.is_finite());
        assert!(set.contains(2));
        assert!(set.contains(5));
        assert!(set.contains(8));
        assert!(!set.contains(3));
    }

    #[test]
    fn semilinear_round_trip_preserves_accepted_lengths() {
        let a = rho_shape(2, 3, &[0, 2]);
        let set = a.extract_semilinear_set();
        let rebuilt = set.to_unary();
        for n in 0..30 {
            assert_eq!(a.accepted_lengths(n).contains(&n), set.contains(n as u64), "length {n}");
            assert_eq!(set.contains(n as u64), rebuilt.accepted_lengths(n).contains(&n), "rebuilt length {n}");
        }
    }

    #[test]
    fn extracted_set_matches_brute_force_lengths() {
        let a = rho_shape(2, 4, &[1, 4]);
        let brute: Vec<usize> = a.accepted_lengths(30).into_iter().collect();
        let set = a.extract_semilinear_set();
        for n in 0..=30u64 {
            assert_eq!(set.contains(n), brute.contains(&(n as usize)), "length {n}");
        }
    }
}
