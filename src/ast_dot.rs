//! AST-to-dot serialization for the CLI's `--dot` flag (spec.md §6). Out
//! of scope for the solving pipeline itself; a thin, separate formatter
//! over [`Term::children`], the same way [`crate::Controller::write`]'s
//! match arms are thin per-format adapters around an already-computed
//! result rather than part of synthesis proper.

use std::io::{self, Write};

use crate::ast::{Script, Term, TermRef};

/// Writes `script`'s assertion as a Graphviz `digraph`, one node per
/// [`Term`], edges to [`Term::children`] in order.
pub fn write_dot<W: Write>(script: &Script, mut writer: W) -> io::Result<()> {
    writeln!(writer, "digraph assertion {{")?;
    writeln!(writer, "  node [shape=box, fontname=monospace];")?;
    let mut next_id = 0usize;
    write_node(&script.assertion, &mut writer, &mut next_id)?;
    writeln!(writer, "}}")
}

fn write_node<W: Write>(term: &TermRef, writer: &mut W, next_id: &mut usize) -> io::Result<usize> {
    let id = *next_id;
    *next_id += 1;
    writeln!(writer, "  n{id} [label={}];", quote(&label(term)))?;
    for child in term.children() {
        let child_id = write_node(&child, writer, next_id)?;
        writeln!(writer, "  n{id} -> n{child_id};")?;
    }
    Ok(id)
}

/// A short, human-readable label for one node: the operator name, plus
/// any leaf payload (variable name, constant value) that has no
/// separate child node to show it.
fn label(term: &Term) -> String {
    match term {
        Term::And(_) => "and".to_string(),
        Term::Or(_) => "or".to_string(),
        Term::Not(_) => "not".to_string(),
        Term::Ite(..) => "ite".to_string(),
        Term::Exists(vars, _) => format!("exists {}", var_list(vars)),
        Term::ForAll(vars, _) => format!("forall {}", var_list(vars)),
        Term::Let(bindings, _) => format!("let ({})", bindings.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>().join(" ")),
        Term::Exclamation(_, label) => format!("! :named {label}"),
        Term::UMinus(_) => "-".to_string(),
        Term::Minus(..) => "-".to_string(),
        Term::Plus(_) => "+".to_string(),
        Term::Times(c, _) => format!("* {c}"),
        Term::Div(_, c) => format!("div {c}"),
        Term::Eq(..) => "=".to_string(),
        Term::NotEq(..) => "distinct".to_string(),
        Term::Gt(..) => ">".to_string(),
        Term::Ge(..) => ">=".to_string(),
        Term::Lt(..) => "<".to_string(),
        Term::Le(..) => "<=".to_string(),
        Term::Distinct(_) => "distinct".to_string(),
        Term::Concat(_) => "str.++".to_string(),
        Term::Len(_) => "str.len".to_string(),
        Term::Contains(..) => "str.contains".to_string(),
        Term::NotContains(..) => "not str.contains".to_string(),
        Term::Begins(..) => "str.prefixof".to_string(),
        Term::NotBegins(..) => "not str.prefixof".to_string(),
        Term::Ends(..) => "str.suffixof".to_string(),
        Term::NotEnds(..) => "not str.suffixof".to_string(),
        Term::IndexOf(..) => "str.indexof".to_string(),
        Term::LastIndexOf(..) => "str.last_indexof".to_string(),
        Term::CharAt(..) => "str.at".to_string(),
        Term::SubString(..) => "str.substr".to_string(),
        Term::ToUpper(_) => "str.to_upper".to_string(),
        Term::ToLower(_) => "str.to_lower".to_string(),
        Term::Trim(_) => "str.trim".to_string(),
        Term::ToStringTerm(_) => "str.from_int".to_string(),
        Term::ToInt(_) => "str.to_int".to_string(),
        Term::Replace(..) => "str.replace".to_string(),
        Term::Count(..) => "str.count".to_string(),
        Term::ReConcat(_) => "re.++".to_string(),
        Term::ReUnion(_) => "re.union".to_string(),
        Term::ReInter(_) => "re.inter".to_string(),
        Term::ReStar(_) => "re.*".to_string(),
        Term::RePlus(_) => "re.+".to_string(),
        Term::ReOpt(_) => "re.opt".to_string(),
        Term::ReLoop(_, bound) => match bound.high {
            Some(high) => format!("re.loop {} {high}", bound.low),
            None => format!("re.loop {}", bound.low),
        },
        Term::ReComp(_) => "re.comp".to_string(),
        Term::ReDiff(..) => "re.diff".to_string(),
        Term::ToRegex(_) => "str.to_re".to_string(),
        Term::In(..) => "str.in_re".to_string(),
        Term::NotIn(..) => "not str.in_re".to_string(),
        Term::Variable(name) => name.clone(),
        Term::BoolConstant(b) => b.to_string(),
        Term::IntConstant(i) => i.to_string(),
        Term::StringConstant(s) => format!("{s:?}"),
        Term::Unknown => "?".to_string(),
    }
}

fn var_list(vars: &[(String, crate::ast::Sort)]) -> String {
    vars.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>().join(" ")
}

/// Graphviz label quoting: wrap in double quotes, escaping any already
/// present (the label text itself may contain a string constant's own
/// quotes via [`Term::StringConstant`]'s `Debug` formatting).
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Sort;

    #[test]
    fn writes_one_node_per_term_with_edges_to_children() {
        let script = Script { declarations: vec![("x".to_string(), Sort::Int)], assertion: Term::and(vec![Term::var("x"), Term::bool_const(true)]) };
        let mut out = Vec::new();
        write_dot(&script, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("digraph assertion {"));
        assert!(text.contains("label=\"and\""));
        assert!(text.contains("label=\"x\""));
        assert!(text.contains("n0 -> n1"));
    }
}
