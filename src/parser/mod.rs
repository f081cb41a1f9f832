//! Surface-syntax parser (spec.md §6): a minimal SMT-LIB-subset reader for
//! exactly the grammar the spec lists, behind a [`Parser`] trait so the
//! rest of the crate depends on "something that turns text into a
//! [`Script`]" and never on this module's internals — the same boundary
//! `owl::formula::Ltl::parse` plays for the reference solver's LTL input.
//!
//! Two passes: [`lexer::tokenize`] to a flat token stream, then
//! [`read_sexpr`] groups parens into a generic S-expression tree, and
//! [`Interpreter`] walks that tree into [`Script`]/[`TermRef`] nodes. No
//! operator-precedence climbing is needed since the surface syntax is
//! fully parenthesized.

mod lexer;

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{LoopBound, Script, Sort, Term, TermRef};
use crate::error::{Error, Location, Result};
use lexer::{tokenize, Spanned, Token};

/// Something that turns surface-syntax source text into a [`Script`].
/// The core solver only ever calls through this trait.
pub trait Parser {
    fn parse(&self, input: &str) -> Result<Script>;
}

/// The grammar in spec.md §6: `declare-fun`/`assert`/`check-sat`
/// commands over the listed arithmetic/string/regex operator vocabulary.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtLibParser;

impl Parser for SmtLibParser {
    fn parse(&self, input: &str) -> Result<Script> {
        let tokens = tokenize(input)?;
        let mut pos = 0;
        let mut commands = Vec::new();
        while pos < tokens.len() {
            commands.push(read_sexpr(&tokens, &mut pos)?);
        }
        Interpreter::default().run(commands)
    }
}

/// Parses `input` with the default (and only) surface-syntax grammar.
pub fn parse(input: &str) -> Result<Script> {
    SmtLibParser.parse(input)
}

#[derive(Debug, Clone)]
enum Sexpr {
    Atom(Token, Location),
    List(Vec<Sexpr>, Location),
}

impl Sexpr {
    fn location(&self) -> Location {
        match self {
            Sexpr::Atom(_, loc) | Sexpr::List(_, loc) => *loc,
        }
    }

    fn symbol(&self) -> Option<&str> {
        match self {
            Sexpr::Atom(Token::Symbol(s), _) => Some(s),
            _ => None,
        }
    }

    fn as_list(&self) -> Result<&[Sexpr]> {
        match self {
            Sexpr::List(items, _) => Ok(items),
            Sexpr::Atom(_, loc) => Err(parse_error("expected a parenthesized list", *loc)),
        }
    }
}

fn parse_error(message: impl Into<String>, location: Location) -> Error {
    Error::ParseError { message: message.into(), location }
}

fn read_sexpr(tokens: &[Spanned<Token>], pos: &mut usize) -> Result<Sexpr> {
    let tok = tokens.get(*pos).ok_or_else(|| parse_error("unexpected end of input", Location::default()))?;
    match &tok.value {
        Token::LParen => {
            let location = tok.location;
            *pos += 1;
            let mut items = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(Spanned { value: Token::RParen, .. }) => {
                        *pos += 1;
                        return Ok(Sexpr::List(items, location));
                    }
                    Some(_) => items.push(read_sexpr(tokens, pos)?),
                    None => return Err(parse_error("unterminated list", location)),
                }
            }
        }
        Token::RParen => Err(parse_error("unexpected ')'", tok.location)),
        _ => {
            let result = Sexpr::Atom(tok.value.clone(), tok.location);
            *pos += 1;
            Ok(result)
        }
    }
}

#[derive(Default)]
struct Interpreter {
    declarations: Vec<(String, Sort)>,
    sorts: HashMap<String, Sort>,
    assertions: Vec<TermRef>,
}

impl Interpreter {
    fn run(mut self, commands: Vec<Sexpr>) -> Result<Script> {
        for command in commands {
            self.command(&command)?;
        }
        let assertion = match self.assertions.len() {
            0 => Term::bool_const(true),
            1 => self.assertions.into_iter().next().unwrap(),
            _ => Term::and(self.assertions),
        };
        Ok(Script { declarations: self.declarations, assertion })
    }

    fn command(&mut self, sexpr: &Sexpr) -> Result<()> {
        let items = sexpr.as_list()?;
        let head = items.first().and_then(Sexpr::symbol).ok_or_else(|| parse_error("expected a command", sexpr.location()))?;
        match head {
            "declare-fun" => self.declare_fun(items, sexpr.location()),
            "declare-const" => self.declare_const(items, sexpr.location()),
            "assert" => {
                let term_sexpr = items.get(1).ok_or_else(|| parse_error("assert needs one argument", sexpr.location()))?;
                let term = self.term(term_sexpr)?;
                self.assertions.push(term);
                Ok(())
            }
            "check-sat" | "exit" => Ok(()),
            "set-logic" | "set-info" | "set-option" => {
                log::debug!("ignoring '{head}' command");
                Ok(())
            }
            other => Err(parse_error(format!("unsupported command '{other}'"), sexpr.location())),
        }
    }

    fn declare_fun(&mut self, items: &[Sexpr], location: Location) -> Result<()> {
        if items.len() != 4 {
            return Err(parse_error("declare-fun expects (declare-fun name () Sort)", location));
        }
        let name = items[1].symbol().ok_or_else(|| parse_error("expected a variable name", items[1].location()))?;
        if !items[2].as_list()?.is_empty() {
            return Err(parse_error("declare-fun with a non-empty argument list is not a supported theory", location));
        }
        let sort = self.sort(&items[3])?;
        self.bind_declaration(name.to_string(), sort)
    }

    fn declare_const(&mut self, items: &[Sexpr], location: Location) -> Result<()> {
        if items.len() != 3 {
            return Err(parse_error("declare-const expects (declare-const name Sort)", location));
        }
        let name = items[1].symbol().ok_or_else(|| parse_error("expected a variable name", items[1].location()))?;
        let sort = self.sort(&items[2])?;
        self.bind_declaration(name.to_string(), sort)
    }

    fn bind_declaration(&mut self, name: String, sort: Sort) -> Result<()> {
        self.sorts.insert(name.clone(), sort);
        self.declarations.push((name, sort));
        Ok(())
    }

    fn sort(&self, sexpr: &Sexpr) -> Result<Sort> {
        match sexpr.symbol() {
            Some("Bool") => Ok(Sort::Bool),
            Some("Int") => Ok(Sort::Int),
            Some("String") => Ok(Sort::String),
            _ => Err(parse_error("expected Bool, Int or String", sexpr.location())),
        }
    }

    /// Parses a term, with `bound` carrying the sorts of variables
    /// introduced by an enclosing `exists`/`forall`/`let` (spec.md §4.6's
    /// scope lifecycle begins here, at the point a binder is parsed).
    fn term(&self, sexpr: &Sexpr) -> Result<TermRef> {
        self.term_in(sexpr, &HashMap::new())
    }

    fn term_in(&self, sexpr: &Sexpr, bound: &HashMap<String, Sort>) -> Result<TermRef> {
        match sexpr {
            Sexpr::Atom(Token::Int(n), _) => Ok(Term::int_const(*n)),
            Sexpr::Atom(Token::Str(s), _) => Ok(Term::string_const(s.clone())),
            Sexpr::Atom(Token::Symbol(s), loc) => self.leaf(s, bound, *loc),
            Sexpr::Atom(Token::LParen | Token::RParen, loc) => Err(parse_error("unexpected token", *loc)),
            Sexpr::List(items, loc) => self.application(items, bound, *loc),
        }
    }

    fn leaf(&self, name: &str, bound: &HashMap<String, Sort>, loc: Location) -> Result<TermRef> {
        match name {
            "true" => Ok(Term::bool_const(true)),
            "false" => Ok(Term::bool_const(false)),
            _ if bound.contains_key(name) || self.sorts.contains_key(name) => Ok(Term::var(name)),
            _ => Err(parse_error(format!("undeclared variable '{name}'"), loc)),
        }
    }

    fn application(&self, items: &[Sexpr], bound: &HashMap<String, Sort>, loc: Location) -> Result<TermRef> {
        let head = items.first().ok_or_else(|| parse_error("empty application", loc))?;
        let args = &items[1..];

        // `(! term :named label)`, the only attribute this grammar supports.
        if head.symbol() == Some("!") {
            return self.exclamation(args, bound, loc);
        }
        if let Some(op) = head.symbol() {
            if let Some(binder) = Self::binder_kind(op) {
                return self.binder(binder, args, bound, loc);
            }
        }

        let mut lowered = Vec::with_capacity(args.len());
        for a in args {
            lowered.push(self.term_in(a, bound)?);
        }
        let op = head.symbol().ok_or_else(|| parse_error("expected an operator symbol", head.location()))?;
        self.build(op, lowered, loc)
    }

    fn exclamation(&self, args: &[Sexpr], bound: &HashMap<String, Sort>, loc: Location) -> Result<TermRef> {
        let inner = args.first().ok_or_else(|| parse_error("'!' needs a term", loc))?;
        let term = self.term_in(inner, bound)?;
        let mut label = None;
        let mut i = 1;
        while i < args.len() {
            if args[i].symbol() == Some(":named") {
                label = args.get(i + 1).and_then(Sexpr::symbol).map(str::to_string);
            }
            i += 1;
        }
        Ok(Rc::new(Term::Exclamation(term, label.unwrap_or_default())))
    }

    fn binder_kind<'a>(op: &'a str) -> Option<&'a str> {
        matches!(op, "exists" | "forall" | "let").then_some(op)
    }

    fn binder(&self, kind: &str, args: &[Sexpr], bound: &HashMap<String, Sort>, loc: Location) -> Result<TermRef> {
        let bindings = args.first().ok_or_else(|| parse_error(format!("'{kind}' needs a binding list"), loc))?.as_list()?;
        let body_sexpr = args.get(1).ok_or_else(|| parse_error(format!("'{kind}' needs a body"), loc))?;

        let mut inner_bound = bound.clone();
        if kind == "let" {
            let mut names = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let pair = binding.as_list()?;
                let name = pair.first().and_then(Sexpr::symbol).ok_or_else(|| parse_error("expected a let binding name", binding.location()))?;
                let value_sexpr = pair.get(1).ok_or_else(|| parse_error("expected a let binding value", binding.location()))?;
                let value = self.term_in(value_sexpr, bound)?;
                names.push((name.to_string(), value));
                inner_bound.insert(name.to_string(), Sort::Int); // placeholder sort; let-bound names are solved by substitution, not by sort lookup.
            }
            let body = self.term_in(body_sexpr, &inner_bound)?;
            return Ok(Rc::new(Term::Let(names, body)));
        }

        let mut vars = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let pair = binding.as_list()?;
            let name = pair.first().and_then(Sexpr::symbol).ok_or_else(|| parse_error("expected a quantified variable name", binding.location()))?;
            let sort_sexpr = pair.get(1).ok_or_else(|| parse_error("expected a quantified variable sort", binding.location()))?;
            let sort = self.sort(sort_sexpr)?;
            inner_bound.insert(name.to_string(), sort);
            vars.push((name.to_string(), sort));
        }
        let body = self.term_in(body_sexpr, &inner_bound)?;
        Ok(match kind {
            "exists" => Rc::new(Term::Exists(vars, body)),
            _ => Rc::new(Term::ForAll(vars, body)),
        })
    }

    /// Builds the term for an already-lowered argument list (spec.md §6's
    /// operator vocabulary). `loc` anchors any arity/shape error.
    fn build(&self, op: &str, mut args: Vec<TermRef>, loc: Location) -> Result<TermRef> {
        macro_rules! arity {
            ($n:expr) => {
                if args.len() != $n {
                    return Err(parse_error(format!("'{op}' expects {} argument(s), got {}", $n, args.len()), loc));
                }
            };
        }
        macro_rules! take2 {
            () => {{
                arity!(2);
                let b = args.pop().unwrap();
                let a = args.pop().unwrap();
                (a, b)
            }};
        }
        Ok(match op {
            "and" => Term::and(args),
            "or" => Term::or(args),
            "not" => {
                arity!(1);
                Term::not(args.pop().unwrap())
            }
            "ite" => {
                arity!(3);
                let c = args.pop().unwrap();
                let b = args.pop().unwrap();
                let a = args.pop().unwrap();
                Rc::new(Term::Ite(a, b, c))
            }
            "=" => {
                let (a, b) = take2!();
                Rc::new(Term::Eq(a, b))
            }
            "distinct" => Rc::new(Term::Distinct(args)),
            "<" => {
                let (a, b) = take2!();
                Rc::new(Term::Lt(a, b))
            }
            "<=" => {
                let (a, b) = take2!();
                Rc::new(Term::Le(a, b))
            }
            ">" => {
                let (a, b) = take2!();
                Rc::new(Term::Gt(a, b))
            }
            ">=" => {
                let (a, b) = take2!();
                Rc::new(Term::Ge(a, b))
            }
            "+" => Term::Plus(args).into(),
            "-" => match args.len() {
                1 => Rc::new(Term::UMinus(args.pop().unwrap())),
                2 => {
                    let (a, b) = take2!();
                    Rc::new(Term::Minus(a, b))
                }
                n => return Err(parse_error(format!("'-' expects 1 or 2 arguments, got {n}"), loc)),
            },
            "*" => {
                let (a, b) = take2!();
                times(a, b, loc)?
            }
            "div" => {
                let (a, b) = take2!();
                let constant = int_constant(&b, loc)?;
                Rc::new(Term::Div(a, constant))
            }
            "str.++" => Term::Concat(args).into(),
            "str.len" => {
                arity!(1);
                Rc::new(Term::Len(args.pop().unwrap()))
            }
            "str.at" => {
                let (a, b) = take2!();
                Rc::new(Term::CharAt(a, b))
            }
            "str.substr" => match args.len() {
                2 => {
                    let (a, b) = take2!();
                    Rc::new(Term::SubString(a, b, None))
                }
                3 => {
                    let c = args.pop().unwrap();
                    let b = args.pop().unwrap();
                    let a = args.pop().unwrap();
                    Rc::new(Term::SubString(a, b, Some(c)))
                }
                n => return Err(parse_error(format!("'str.substr' expects 2 or 3 arguments, got {n}"), loc)),
            },
            "str.indexof" => {
                let (a, b) = take2!();
                Rc::new(Term::IndexOf(a, b))
            }
            "str.replace" => {
                arity!(3);
                let c = args.pop().unwrap();
                let b = args.pop().unwrap();
                let a = args.pop().unwrap();
                Rc::new(Term::Replace(a, b, c))
            }
            "str.contains" => {
                let (a, b) = take2!();
                Rc::new(Term::Contains(a, b))
            }
            "str.prefixof" => {
                let (a, b) = take2!();
                Rc::new(Term::Begins(a, b))
            }
            "str.suffixof" => {
                let (a, b) = take2!();
                Rc::new(Term::Ends(a, b))
            }
            "str.to_re" => {
                arity!(1);
                Rc::new(Term::ToRegex(args.pop().unwrap()))
            }
            "str.in_re" => {
                let (a, b) = take2!();
                Rc::new(Term::In(a, b))
            }
            "re.++" => Term::ReConcat(args).into(),
            "re.union" => Term::ReUnion(args).into(),
            "re.inter" => Term::ReInter(args).into(),
            "re.*" => {
                arity!(1);
                Rc::new(Term::ReStar(args.pop().unwrap()))
            }
            "re.+" => {
                arity!(1);
                Rc::new(Term::RePlus(args.pop().unwrap()))
            }
            "re.opt" => {
                arity!(1);
                Rc::new(Term::ReOpt(args.pop().unwrap()))
            }
            "re.loop" => match args.len() {
                2 => {
                    let low_t = args.pop().unwrap();
                    let inner = args.pop().unwrap();
                    let low = int_constant(&low_t, loc)? as u32;
                    Rc::new(Term::ReLoop(inner, LoopBound { low, high: None }))
                }
                3 => {
                    let high_t = args.pop().unwrap();
                    let low_t = args.pop().unwrap();
                    let inner = args.pop().unwrap();
                    let low = int_constant(&low_t, loc)? as u32;
                    let high = int_constant(&high_t, loc)? as u32;
                    if high < low {
                        return Err(parse_error("'re.loop' upper bound below lower bound", loc));
                    }
                    Rc::new(Term::ReLoop(inner, LoopBound { low, high: Some(high) }))
                }
                n => return Err(parse_error(format!("'re.loop' expects 2 or 3 arguments, got {n}"), loc)),
            },
            other => return Err(parse_error(format!("unsupported construct '{other}'"), loc)),
        })
    }
}

fn times(a: TermRef, b: TermRef, loc: Location) -> Result<TermRef> {
    match (a.as_ref(), b.as_ref()) {
        (Term::IntConstant(c), _) => Ok(Rc::new(Term::Times(*c, b))),
        (_, Term::IntConstant(c)) => Ok(Rc::new(Term::Times(*c, a))),
        _ => Err(parse_error("'*' is linear only: one side must be an integer literal", loc)),
    }
}

fn int_constant(t: &TermRef, loc: Location) -> Result<i64> {
    match t.as_ref() {
        Term::IntConstant(c) => Ok(*c),
        _ => Err(parse_error("expected an integer literal", loc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations_and_a_single_assertion() {
        let script = parse("(declare-fun x () Int) (assert (= x 3)) (check-sat)").unwrap();
        assert_eq!(script.declarations, vec![("x".to_string(), Sort::Int)]);
        assert!(matches!(script.assertion.as_ref(), Term::Eq(_, _)));
    }

    #[test]
    fn multiple_assertions_become_one_conjunction() {
        let script = parse("(declare-fun x () Int) (assert (>= x 0)) (assert (<= x 7))").unwrap();
        assert!(matches!(script.assertion.as_ref(), Term::And(cs) if cs.len() == 2));
    }

    #[test]
    fn string_and_regex_vocabulary_round_trips() {
        let script = parse(
            r#"(declare-fun s () String)
               (assert (str.in_re s (re.+ (str.to_re "a"))))"#,
        )
        .unwrap();
        assert!(matches!(script.assertion.as_ref(), Term::In(_, _)));
    }

    #[test]
    fn rejects_nonlinear_multiplication() {
        let err = parse("(declare-fun x () Int) (declare-fun y () Int) (assert (= (* x y) 1))");
        assert!(err.is_err());
    }

    #[test]
    fn undeclared_variable_is_a_parse_error() {
        let err = parse("(assert (= x 3))");
        assert!(err.is_err());
    }
}
