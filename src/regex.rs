//! Compiles the regular-language sub-AST (spec.md §6's `re.*` operator
//! family) into a [`dfa::StringAutomaton`]. This is pure Term-to-automaton
//! translation; the string solver (`solver::string`) is the only caller,
//! invoked whenever it meets a `Term::In`/`Term::NotIn` atom.

use dfa::StringAutomaton;

use crate::ast::{Term, TermRef};
use crate::error::{Error, Location, Result};

/// Compiles a regex-sorted term to the automaton of the language it
/// denotes.
pub fn compile(term: &TermRef) -> Result<StringAutomaton> {
    match term.as_ref() {
        Term::ToRegex(inner) => match inner.as_ref() {
            Term::StringConstant(s) => Ok(StringAutomaton::literal(s.as_bytes())),
            _ => unsupported(term),
        },
        Term::ReConcat(parts) => fold_fallible(parts, StringAutomaton::concat),
        Term::ReUnion(parts) => fold_fallible(parts, |a, b| a.union(b)),
        Term::ReInter(parts) => fold_fallible(parts, |a, b| a.intersect(b)),
        Term::ReStar(inner) => Ok(compile(inner)?.star()),
        Term::RePlus(inner) => {
            let a = compile(inner)?;
            let star = a.star();
            a.concat(&star)
        }
        Term::ReOpt(inner) => {
            let a = compile(inner)?;
            let epsilon = StringAutomaton::literal(b"");
            a.union(&epsilon)
        }
        Term::ReLoop(inner, bound) => compile_loop(inner, bound.low, bound.high),
        Term::ReComp(inner) => Ok(compile(inner)?.complement()),
        Term::ReDiff(a, b) => {
            let la = compile(a)?;
            let lb = compile(b)?;
            la.intersect(&lb.complement())
        }
        _ => unsupported(term),
    }
}

fn compile_loop(inner: &TermRef, low: u32, high: Option<u32>) -> Result<StringAutomaton> {
    let base = compile(inner)?;
    let mut lower = StringAutomaton::literal(b"");
    for _ in 0..low {
        lower = lower.concat(&base)?;
    }
    match high {
        None => {
            let star = base.star();
            lower.concat(&star)
        }
        Some(high) => {
            debug_assert!(high >= low, "re.loop upper bound below lower bound");
            let mut acc = lower.clone();
            let mut running = lower;
            for _ in low..high {
                running = running.concat(&base)?;
                acc = acc.union(&running)?;
            }
            Ok(acc)
        }
    }
}

fn fold(parts: &[TermRef], op: impl Fn(&StringAutomaton, &StringAutomaton) -> Result<StringAutomaton>) -> Result<Option<StringAutomaton>> {
    let mut iter = parts.iter();
    let first = match iter.next() {
        Some(t) => compile(t)?,
        None => return Ok(None),
    };
    let mut acc = first;
    for t in iter {
        acc = op(&acc, &compile(t)?)?;
    }
    Ok(Some(acc))
}

fn fold_fallible(parts: &[TermRef], op: impl Fn(&StringAutomaton, &StringAutomaton) -> Result<StringAutomaton>) -> Result<StringAutomaton> {
    match fold(parts, op)? {
        Some(a) => Ok(a),
        None => Ok(StringAutomaton::literal(b"")),
    }
}

fn unsupported<T>(term: &TermRef) -> Result<T> {
    Err(Error::UnsupportedConstruct { what: format!("{:?}", term.as_ref()), location: Location::default() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn re_lit(s: &str) -> TermRef {
        Rc::new(Term::ToRegex(Term::string_const(s)))
    }

    #[test]
    fn plus_accepts_one_or_more_repetitions() {
        let re = Rc::new(Term::RePlus(re_lit("a")));
        let automaton = compile(&re).unwrap();
        assert!(!automaton.intersect(&StringAutomaton::literal(b"a")).unwrap().is_empty());
        assert!(!automaton.intersect(&StringAutomaton::literal(b"aaa")).unwrap().is_empty());
        assert!(automaton.intersect(&StringAutomaton::literal(b"")).unwrap().is_empty());
    }

    #[test]
    fn loop_bounds_repetition_count() {
        let re = Rc::new(Term::ReLoop(re_lit("ab"), crate::ast::LoopBound { low: 1, high: Some(2) }));
        let automaton = compile(&re).unwrap();
        assert!(!automaton.intersect(&StringAutomaton::literal(b"ab")).unwrap().is_empty());
        assert!(!automaton.intersect(&StringAutomaton::literal(b"abab")).unwrap().is_empty());
        assert!(automaton.intersect(&StringAutomaton::literal(b"ababab")).unwrap().is_empty());
        assert!(automaton.intersect(&StringAutomaton::literal(b"")).unwrap().is_empty());
    }

    #[test]
    fn union_accepts_either_branch() {
        let re = Rc::new(Term::ReUnion(vec![re_lit("a"), re_lit("b")]));
        let automaton = compile(&re).unwrap();
        assert!(!automaton.intersect(&StringAutomaton::literal(b"a")).unwrap().is_empty());
        assert!(!automaton.intersect(&StringAutomaton::literal(b"b")).unwrap().is_empty());
        assert!(automaton.intersect(&StringAutomaton::literal(b"c")).unwrap().is_empty());
    }
}
