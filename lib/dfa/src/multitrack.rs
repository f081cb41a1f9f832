//! Multi-track (relational) string automata (spec.md §4.1, §4.10).
//!
//! All tracks of a relation are read synchronously, one column per
//! automaton step, for as many steps as the longest participating word.
//! Words shorter than that are padded on the right with a reserved
//! `lambda` symbol, so every track's alphabet is really "one byte, or
//! lambda" — 8 data bits plus one padding flag bit per track, laid out
//! consecutively in a single [`BddManager`] (track 0's bits first, then
//! track 1's, and so on). Once a track emits lambda it must keep emitting
//! lambda (real content never follows padding); this is enforced at
//! every construction below rather than assumed.
//!
//! `str.++` needs a different alignment: [`concat_relation`]'s left
//! operand is read right-padded as usual, but its right operand is read
//! *left-padded* — its real content is only understood to begin once the
//! left operand has ended — because a single synchronous pass cannot
//! otherwise line up two independently-clocked tracks onto one output
//! track. A plain [`lift_track`]ed word, which starts real content at
//! step 0, satisfies this for the left operand but not the right one:
//! [`delay_track`] builds the right operand's track in the form
//! `concat_relation` actually expects (any number of leading padding
//! columns, then the word), and [`concat_languages`] wraps the whole
//! thing so callers never have to think about tracks at all.

use fixedbitset::FixedBitSet;
use itertools::Itertools;

use crate::automaton::{Automaton, Edge, ProductMode};
use crate::bdd::BddManager;
use crate::string_automaton::StringAutomaton;

const DATA_BITS: usize = 8;
const TRACK_WIDTH: usize = DATA_BITS + 1;

fn track_base(track: usize) -> usize {
    track * TRACK_WIDTH
}

fn padding_var(track: usize) -> usize {
    track_base(track) + DATA_BITS
}

/// A manager whose variables are laid out as `num_tracks` consecutive
/// blocks of [`TRACK_WIDTH`] bits each.
pub fn multitrack_manager(num_tracks: usize) -> BddManager {
    BddManager::with_vars(num_tracks * TRACK_WIDTH)
}

fn byte_on_track(manager: &BddManager, track: usize, byte: u8) -> crate::bdd::Bdd {
    let base = track_base(track);
    let mut guard = manager.not_var(padding_var(track));
    for bit in 0..DATA_BITS {
        let mask = 1u8 << (DATA_BITS - 1 - bit);
        let literal = if byte & mask != 0 { manager.var(base + bit) } else { manager.not_var(base + bit) };
        guard = guard.and(&literal);
    }
    guard
}

fn any_byte_on_track(manager: &BddManager, track: usize) -> crate::bdd::Bdd {
    manager.not_var(padding_var(track))
}

fn padding_on_track(manager: &BddManager, track: usize) -> crate::bdd::Bdd {
    manager.var(padding_var(track))
}

/// Lifts a single-track [`StringAutomaton`] into track `track` of a
/// `num_tracks`-wide relation space: real bytes advance it normally, and
/// from any of its accepting states it may also loop on padding forever
/// (representing "this word has already ended, every remaining column is
/// lambda").
pub fn lift_track(automaton: &StringAutomaton, track: usize, num_tracks: usize) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    let source = automaton.automaton();
    let n = source.num_states();
    let mut edges: Vec<Vec<Edge>> = Vec::with_capacity(n);
    for s in 0..n {
        let mut out = Vec::new();
        for e in source.edges(s) {
            // Re-guard each byte-valued transition in terms of this
            // relation's track bits instead of the source automaton's
            // own 8-bit manager.
            if let Some(byte) = sole_byte(e.guard.clone(), source) {
                out.push(Edge { guard: byte_on_track(&manager, track, byte), target: e.target });
            }
        }
        if source.is_accepting(s) {
            out.push(Edge { guard: padding_on_track(&manager, track), target: s });
        }
        edges.push(out);
    }
    let accepting = {
        let mut bits = FixedBitSet::with_capacity(n);
        for s in 0..n {
            bits.set(s, source.is_accepting(s));
        }
        bits
    };
    Automaton::new(manager, n, source.initial_state(), accepting, edges)
}

/// Recovers the single literal byte a guard from an 8-bit-alphabet
/// automaton represents, by testing it against every byte value. Used
/// only to re-express [`StringAutomaton`] edges (always single-byte
/// literals or ranges, decomposed upstream into per-byte edges by the
/// callers of [`lift_track`]) in the wider multi-track alphabet.
fn sole_byte(guard: crate::bdd::Bdd, source: &Automaton) -> Option<u8> {
    let manager = source.manager();
    for b in 0..=255u8 {
        let mut candidate = manager.one();
        for bit in 0..DATA_BITS {
            let mask = 1u8 << (DATA_BITS - 1 - bit);
            let literal = if b & mask != 0 { manager.var(bit) } else { manager.not_var(bit) };
            candidate = candidate.and(&literal);
        }
        if candidate == guard {
            return Some(b);
        }
    }
    None
}

/// The relation `{ (s, s) }`: track `a` and track `b` hold the same word.
pub fn equality(track_a: usize, track_b: usize, num_tracks: usize) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    let both_real_and_equal = {
        let mut acc = manager.zero();
        for byte in 0..=255u8 {
            acc = acc.or(&byte_on_track(&manager, track_a, byte).and(&byte_on_track(&manager, track_b, byte)));
        }
        acc
    };
    let both_padded = padding_on_track(&manager, track_a).and(&padding_on_track(&manager, track_b));
    let guard = both_real_and_equal.or(&both_padded);
    let mut accepting = FixedBitSet::with_capacity(1);
    accepting.set(0, true);
    Automaton::new(manager, 1, 0, accepting, vec![vec![Edge { guard, target: 0 }]])
}

/// The relation `{ (a, b, c) : c = a ++ b }`, under the left-padded
/// convention documented at the top of this module: `track_b` must be
/// fed already [`delay_track`]ed, not plainly [`lift_track`]ed — use
/// [`concat_languages`] instead of calling this directly unless both
/// tracks are already in the form it expects.
pub fn concat_relation(track_a: usize, track_b: usize, track_c: usize, num_tracks: usize) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    // State 0: still copying `a` onto `c`; `b` must stay padding.
    // State 1: `a` has ended; now copying `b` onto `c`.
    // State 2: both `a` and `b` have ended; `c` must be padding too.
    let a_padded = padding_on_track(&manager, track_a);
    let b_padded = padding_on_track(&manager, track_b);
    let c_padded = padding_on_track(&manager, track_c);

    let copy_guard = |from: usize, to: usize| {
        let mut acc = manager.zero();
        for byte in 0..=255u8 {
            acc = acc.or(&byte_on_track(&manager, from, byte).and(&byte_on_track(&manager, to, byte)));
        }
        acc
    };

    let state0_advance = copy_guard(track_a, track_c).and(&b_padded);
    let state0_to_1 = a_padded.and(&copy_guard(track_b, track_c));
    let state0_to_2 = a_padded.and(&b_padded).and(&c_padded);
    let state1_advance = copy_guard(track_b, track_c).and(&a_padded);
    let state1_to_2 = a_padded.and(&b_padded).and(&c_padded);
    let state2_loop = a_padded.and(&b_padded).and(&c_padded);

    let edges = vec![
        vec![
            Edge { guard: state0_advance, target: 0 },
            Edge { guard: state0_to_1, target: 1 },
            Edge { guard: state0_to_2, target: 2 },
        ],
        vec![
            Edge { guard: state1_advance, target: 1 },
            Edge { guard: state1_to_2, target: 2 },
        ],
        vec![Edge { guard: state2_loop, target: 2 }],
    ];
    let mut accepting = FixedBitSet::with_capacity(3);
    accepting.set(0, true); // empty a, empty b: c must already be fully padded too; state 0 re-checks this every step via state0_to_2 guard, so being "in" state 0 with all-padding columns is itself accepting.
    accepting.set(1, true);
    accepting.set(2, true);
    Automaton::new(manager, 3, 0, accepting, edges).minimize()
}

/// Lifts a single-track [`StringAutomaton`] into track `track`, the same
/// as [`lift_track`], except the result may also show padding on that
/// track for any number of steps *before* its real content starts — the
/// form [`concat_relation`] needs for its right operand, since that
/// operand's content is only understood to begin once the left operand
/// has ended and the amount of delay isn't known until both are bound.
/// Built by adding one extra initial state that copies every real-byte
/// edge of `automaton`'s own initial state and additionally self-loops on
/// padding, so it can "wait" as long as required before committing to the
/// word's first byte.
pub fn delay_track(automaton: &StringAutomaton, track: usize, num_tracks: usize) -> Automaton {
    let plain = lift_track(automaton, track, num_tracks);
    let manager = plain.manager().clone();
    let n = plain.num_states();
    let wait_state = n;

    let mut edges: Vec<Vec<Edge>> = (0..n).map(|s| plain.edges(s).to_vec()).collect();
    let mut wait_edges: Vec<Edge> = plain.edges(plain.initial_state()).to_vec();
    wait_edges.push(Edge { guard: padding_on_track(&manager, track), target: wait_state });
    edges.push(wait_edges);

    let mut accepting = FixedBitSet::with_capacity(n + 1);
    for s in 0..n {
        accepting.set(s, plain.is_accepting(s));
    }
    accepting.set(wait_state, plain.is_accepting(plain.initial_state()));

    Automaton::new(manager, n + 1, wait_state, accepting, edges).minimize()
}

/// The plain language `{ a ++ b : a in L(x), b in L(y) }`, computed in a
/// private 3-track space so callers never have to reason about
/// [`concat_relation`]'s left-padded right operand: `x` is lifted
/// normally, `y` is lifted [`delay_track`]-style, the two are conjoined
/// with the relation, and the target track is read back out as an
/// ordinary [`StringAutomaton`]. This is the one place `concat_relation`
/// should be fed a variable (rather than a literal, which
/// [`concat_with_literal`] already handles without any of this).
pub fn concat_languages(x: &StringAutomaton, y: &StringAutomaton) -> crate::error::Result<StringAutomaton> {
    let relation = concat_relation(0, 1, 2, 3);
    let a = lift_track(x, 0, 3);
    let b = delay_track(y, 1, 3);
    let bound = conjoin(&conjoin(&relation, &a)?, &b)?;
    Ok(extract_track(&bound, 2, 3))
}

/// The relation `{ (a, b) : a is a prefix of b }`.
pub fn prefix_of(track_prefix: usize, track_whole: usize, num_tracks: usize) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    let prefix_padded = padding_on_track(&manager, track_prefix);
    let copy_guard = {
        let mut acc = manager.zero();
        for byte in 0..=255u8 {
            acc = acc.or(&byte_on_track(&manager, track_prefix, byte).and(&byte_on_track(&manager, track_whole, byte)));
        }
        acc
    };
    let whole_any = any_byte_on_track(&manager, track_whole).or(&padding_on_track(&manager, track_whole));
    let done = prefix_padded.and(&whole_any);
    let edges = vec![vec![Edge { guard: copy_guard, target: 0 }, Edge { guard: done, target: 1 }], vec![Edge { guard: manager.one(), target: 1 }]];
    let mut accepting = FixedBitSet::with_capacity(2);
    accepting.set(0, true);
    accepting.set(1, true);
    Automaton::new(manager, 2, 0, accepting, edges).minimize()
}

/// The relation `{ (a, b) : a is a suffix of b }`, built as the mirror
/// image of [`prefix_of`]: reversing both tracks turns "is a suffix of"
/// into "is a prefix of", so the accepted language is defined pointwise
/// in terms of the reversed problem and then re-stated directly rather
/// than reversing an automaton (which this crate's automata, built to be
/// read left to right only, do not support in general).
pub fn suffix_of(track_suffix: usize, track_whole: usize, num_tracks: usize) -> Automaton {
    // A suffix relation cannot be checked by a single left-to-right pass
    // without knowing `whole`'s length in advance, so this is expressed
    // as existence of a split point: build it at the `multitrack` level
    // via `contains`, specialized to require the match end exactly at
    // the end of `whole`.
    contains_at_end(track_suffix, track_whole, num_tracks)
}

fn contains_at_end(track_needle: usize, track_whole: usize, num_tracks: usize) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    // Nondeterministically guess the start of the occurrence: before the
    // guess, `needle`'s track must stay padding; once guessed, copy
    // `needle` onto a shadow comparison against `whole` until `needle`
    // ends, and require `whole` to end in that same step.
    let needle_padded = padding_on_track(&manager, track_needle);
    let whole_byte = any_byte_on_track(&manager, track_whole);
    let whole_padded = padding_on_track(&manager, track_whole);
    let copy_guard = {
        let mut acc = manager.zero();
        for byte in 0..=255u8 {
            acc = acc.or(&byte_on_track(&manager, track_needle, byte).and(&byte_on_track(&manager, track_whole, byte)));
        }
        acc
    };
    // State 0: before the guessed occurrence (needle still padding,
    // whole advancing freely or already done).
    // State 1: inside the occurrence (needle and whole advance together).
    // State 2: accepting sink once needle has ended exactly as whole ends.
    let stay_before = needle_padded.and(&whole_byte);
    let also_before_if_whole_done = needle_padded.and(&whole_padded);
    let enter_occurrence = copy_guard.clone();
    let finish_together = needle_padded.and(&whole_padded);
    let edges = vec![
        vec![
            Edge { guard: stay_before, target: 0 },
            Edge { guard: enter_occurrence, target: 1 },
            Edge { guard: also_before_if_whole_done, target: 2 },
        ],
        vec![Edge { guard: copy_guard, target: 1 }, Edge { guard: finish_together, target: 2 }],
        vec![Edge { guard: whole_padded.and(&needle_padded), target: 2 }],
    ];
    let mut accepting = FixedBitSet::with_capacity(3);
    accepting.set(2, true);
    Automaton::new(manager, 3, 0, accepting, edges).minimize()
}

/// The relation `{ (a, b) : a occurs somewhere inside b }`.
pub fn contains(track_needle: usize, track_whole: usize, num_tracks: usize) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    let needle_padded = padding_on_track(&manager, track_needle);
    let whole_byte = any_byte_on_track(&manager, track_whole);
    let whole_padded = padding_on_track(&manager, track_whole);
    let copy_guard = {
        let mut acc = manager.zero();
        for byte in 0..=255u8 {
            acc = acc.or(&byte_on_track(&manager, track_needle, byte).and(&byte_on_track(&manager, track_whole, byte)));
        }
        acc
    };
    // State 0: before/between candidate occurrences.
    // State 1: inside a candidate occurrence.
    // State 2: the occurrence just completed; accept and keep accepting
    // through to the end of `whole` (we only need one occurrence).
    let stay_before = needle_padded.and(&whole_byte.or(&whole_padded));
    let enter_occurrence = copy_guard.clone();
    let occurrence_ends = needle_padded.clone();
    let edges = vec![
        vec![
            Edge { guard: stay_before, target: 0 },
            Edge { guard: enter_occurrence, target: 1 },
        ],
        vec![
            Edge { guard: copy_guard, target: 1 },
            Edge { guard: occurrence_ends.and(&whole_byte.or(&whole_padded)), target: 2 },
        ],
        vec![Edge { guard: manager.one(), target: 2 }],
    ];
    let mut accepting = FixedBitSet::with_capacity(3);
    accepting.set(2, true);
    Automaton::new(manager, 3, 0, accepting, edges).minimize()
}

/// The relation `{ (x, z) : z = x ++ literal }` (or `z = literal ++ x` when
/// `literal_first`), built directly as a small state machine counting
/// matched literal bytes rather than through [`concat_relation`], which
/// needs a real track for both operands.
pub fn concat_with_literal(track_x: usize, literal: &[u8], track_z: usize, num_tracks: usize, literal_first: bool) -> Automaton {
    let manager = multitrack_manager(num_tracks);
    let x_padded = padding_on_track(&manager, track_x);
    let z_padded = padding_on_track(&manager, track_z);
    let copy_guard = {
        let mut acc = manager.zero();
        for byte in 0..=255u8 {
            acc = acc.or(&byte_on_track(&manager, track_x, byte).and(&byte_on_track(&manager, track_z, byte)));
        }
        acc
    };
    let m = literal.len();
    let num_states = m + 2;
    let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); num_states];
    if literal_first {
        // States 0..m: `k` bytes of the literal matched against z so far,
        // x required padded throughout. State m: literal exhausted, now
        // copy x onto z. State m+1: both done.
        for k in 0..m {
            let guard = x_padded.clone().and(&byte_on_track(&manager, track_z, literal[k]));
            edges[k].push(Edge { guard, target: k + 1 });
        }
        edges[m].push(Edge { guard: copy_guard, target: m });
        edges[m].push(Edge { guard: x_padded.clone().and(&z_padded), target: m + 1 });
    } else {
        // State 0: copy x onto z. States 1..=m: `k` bytes of the literal
        // already matched onto z, x required padded throughout. State
        // m+1: both done.
        edges[0].push(Edge { guard: copy_guard, target: 0 });
        if m == 0 {
            edges[0].push(Edge { guard: x_padded.clone().and(&z_padded), target: 1 });
        } else {
            edges[0].push(Edge { guard: x_padded.clone().and(&byte_on_track(&manager, track_z, literal[0])), target: 1 });
            for k in 1..m {
                let guard = x_padded.clone().and(&byte_on_track(&manager, track_z, literal[k]));
                edges[k].push(Edge { guard, target: k + 1 });
            }
            edges[m].push(Edge { guard: x_padded.clone().and(&z_padded), target: m + 1 });
        }
    }
    edges[m + 1].push(Edge { guard: x_padded.and(&z_padded), target: m + 1 });

    let mut accepting = FixedBitSet::with_capacity(num_states);
    for s in 0..num_states {
        accepting.set(s, true);
    }
    Automaton::new(manager, num_states, 0, accepting, edges).minimize()
}

/// Existentially quantifies a track's bits out of a relation. The result
/// still lives in the same `num_tracks`-wide manager (the track's bits
/// are quantified away, not removed from the variable layout), so it can
/// only be compared against or combined with other automata built over
/// that same manager; the solver layer is responsible for eventually
/// re-lifting a single surviving track into its own narrow manager once
/// every other track has been projected out.
pub fn project_track(relation: &Automaton, track: usize) -> Automaton {
    let indices: Vec<usize> = (track_base(track)..track_base(track) + TRACK_WIDTH).collect();
    relation.project(&indices)
}

pub fn conjoin(a: &Automaton, b: &Automaton) -> crate::error::Result<Automaton> {
    a.product(b, ProductMode::Intersect)
}

fn byte_guard_for(manager: &BddManager, byte: u8) -> crate::bdd::Bdd {
    let mut guard = manager.one();
    for bit in 0..DATA_BITS {
        let mask = 1u8 << (DATA_BITS - 1 - bit);
        let literal = if byte & mask != 0 { manager.var(bit) } else { manager.not_var(bit) };
        guard = guard.and(&literal);
    }
    guard
}

/// Projects every track but `track` out of a relation and re-expresses
/// what remains as a plain single-track [`StringAutomaton`] — the mirror
/// image of [`lift_track`]. The solver calls this once a relation has
/// served its purpose (every other variable's track has been projected
/// away) and needs to feed the surviving track's language back into that
/// variable's own group.
pub fn extract_track(relation: &Automaton, track: usize, num_tracks: usize) -> StringAutomaton {
    let other_indices: Vec<usize> = (0..num_tracks)
        .filter(|&t| t != track)
        .flat_map(|t| track_base(t)..track_base(t) + TRACK_WIDTH)
        .collect();
    let narrowed = relation.project(&other_indices);
    let wide_manager = narrowed.manager().clone();
    let byte_mgr = BddManager::with_vars(DATA_BITS);
    let base = track_base(track);
    let pad = padding_var(track);

    let n = narrowed.num_states();
    let mut edges: Vec<Vec<Edge>> = Vec::with_capacity(n);
    for s in 0..n {
        let mut out = Vec::new();
        for e in narrowed.edges(s) {
            for byte in 0..=255u8 {
                let mut assignment = vec![false; wide_manager.num_vars()];
                for bit in 0..DATA_BITS {
                    let mask = 1u8 << (DATA_BITS - 1 - bit);
                    assignment[base + bit] = byte & mask != 0;
                }
                assignment[pad] = false;
                if e.guard.evaluate(&assignment) {
                    out.push(Edge { guard: byte_guard_for(&byte_mgr, byte), target: e.target });
                }
            }
        }
        edges.push(out);
    }
    let mut accepting = FixedBitSet::with_capacity(n);
    for s in 0..n {
        accepting.set(s, narrowed.is_accepting(s));
    }
    let nfa = Automaton::new(byte_mgr, n, narrowed.initial_state(), accepting, edges);
    StringAutomaton::from_automaton(nfa.determinize().minimize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_relation_accepts_identical_words() {
        let rel = equality(0, 1, 2);
        let a = lift_track(&StringAutomaton::literal(b"cat"), 0, 2);
        let same = lift_track(&StringAutomaton::literal(b"cat"), 1, 2);
        let other = lift_track(&StringAutomaton::literal(b"dog"), 1, 2);

        let matching = conjoin(&conjoin(&rel, &a).unwrap(), &same).unwrap();
        assert!(!matching.is_empty_language());

        let mismatching = conjoin(&conjoin(&rel, &a).unwrap(), &other).unwrap();
        assert!(mismatching.is_empty_language());
    }

    #[test]
    fn concat_relation_builds_expected_join() {
        let rel = concat_relation(0, 1, 2, 3);
        let a = lift_track(&StringAutomaton::literal(b"foo"), 0, 3);
        let b = delay_track(&StringAutomaton::literal(b"bar"), 1, 3);
        let bound = conjoin(&conjoin(&rel, &a).unwrap(), &b).unwrap();
        let c_only = project_track(&project_track(&bound, 1), 0);
        let expected = lift_track(&StringAutomaton::literal(b"foobar"), 2, 3);
        assert!(c_only.is_equivalent(&expected).unwrap());
    }

    #[test]
    fn extract_track_recovers_the_concatenation() {
        let rel = concat_relation(0, 1, 2, 3);
        let a = lift_track(&StringAutomaton::literal(b"foo"), 0, 3);
        let b = delay_track(&StringAutomaton::literal(b"bar"), 1, 3);
        let bound = conjoin(&conjoin(&rel, &a).unwrap(), &b).unwrap();
        let extracted = extract_track(&bound, 2, 3);
        let expected = StringAutomaton::literal(b"foobar");
        assert!(extracted.intersect(&expected).unwrap().witness(10).is_some());
        let wrong = StringAutomaton::literal(b"barfoo");
        assert!(extracted.intersect(&wrong).unwrap().is_empty());
    }

    #[test]
    fn concat_languages_joins_two_variable_languages_without_tracks() {
        let x = StringAutomaton::literal(b"foo");
        let y = StringAutomaton::literal(b"bar");
        let joined = concat_languages(&x, &y).unwrap();
        assert!(joined.intersect(&StringAutomaton::literal(b"foobar")).unwrap().witness(10).is_some());
        assert!(joined.intersect(&StringAutomaton::literal(b"barfoo")).unwrap().is_empty());
    }

    #[test]
    fn concat_languages_joins_nontrivial_sets_on_both_sides() {
        // x in {"a", "aa"}, y in {"b", "bb"}: every a^i b^j with i,j in {1,2}.
        let x = StringAutomaton::literal(b"a").union(&StringAutomaton::literal(b"aa")).unwrap();
        let y = StringAutomaton::literal(b"b").union(&StringAutomaton::literal(b"bb")).unwrap();
        let joined = concat_languages(&x, &y).unwrap();
        for word in [&b"ab"[..], b"abb", b"aab", b"aabb"] {
            assert!(joined.intersect(&StringAutomaton::literal(word)).unwrap().witness(10).is_some(), "expected {:?} to be accepted", word);
        }
        assert!(joined.intersect(&StringAutomaton::literal(b"ba")).unwrap().is_empty());
    }

    #[test]
    fn concat_with_literal_appends_suffix() {
        let rel = concat_with_literal(0, b"b", 1, 2, false);
        let x = lift_track(&StringAutomaton::literal(b"a"), 0, 2);
        let bound = conjoin(&rel, &x).unwrap();
        let z_only = project_track(&bound, 0);
        let expected = lift_track(&StringAutomaton::literal(b"ab"), 1, 2);
        assert!(z_only.is_equivalent(&expected).unwrap());
    }

    #[test]
    fn concat_with_literal_prepends_prefix() {
        let rel = concat_with_literal(0, b"b", 1, 2, true);
        let x = lift_track(&StringAutomaton::literal(b"a"), 0, 2);
        let bound = conjoin(&rel, &x).unwrap();
        let z_only = project_track(&bound, 0);
        let expected = lift_track(&StringAutomaton::literal(b"ba"), 1, 2);
        assert!(z_only.is_equivalent(&expected).unwrap());
    }

    #[test]
    fn prefix_relation_rejects_non_prefix() {
        let rel = prefix_of(0, 1, 2);
        let prefix = lift_track(&StringAutomaton::literal(b"fo"), 0, 2);
        let bad_whole = lift_track(&StringAutomaton::literal(b"bar"), 1, 2);
        let combined = conjoin(&conjoin(&rel, &prefix).unwrap(), &bad_whole).unwrap();
        assert!(combined.is_empty_language());
    }
}
