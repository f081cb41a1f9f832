//! Model-counting constraint solver for mixed string and linear-integer
//! arithmetic formulas (spec.md §1): parses an SMT-LIB-subset script,
//! normalizes and slices the assertion, builds automata per variable
//! group, and reports `sat`/`unsat` plus optional model counts.

pub mod ast;
pub mod ast_dot;
pub mod counter;
pub mod error;
pub mod formula;
pub mod options;
pub mod parser;
pub mod preprocess;
pub mod regex;
pub mod slicer;
pub mod solver;
pub mod symtab;
pub mod witness;

use std::fmt::{self, Display};

use log::{debug, info};
use num_bigint::BigUint;

use ast::Script;
use error::{Error, Location, Result};
use options::SolverOptions;
use parser::Parser;
use solver::Solution;

/// The satisfiability verdict for an assertion.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Status {
    /// A satisfying assignment exists.
    Sat,
    /// The empty-language automaton was reached for some variable group
    /// (spec.md §7: unsatisfiability is never a thrown error).
    Unsat,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            Self::Sat => "sat",
            Self::Unsat => "unsat",
        })
    }
}

/// The outcome of running the full pipeline over one input script:
/// the verdict, plus (when sat) the solved symbol table a caller can
/// still query with [`count`].
pub struct RunResult {
    status: Status,
    declarations: Vec<(String, ast::Sort)>,
    solution: Solution,
}

impl RunResult {
    /// The satisfiability verdict.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The declarations this run was parsed with, in declaration order.
    pub fn declarations(&self) -> &[(String, ast::Sort)] {
        &self.declarations
    }
}

/// Parses `input` with the default [`parser::SmtLibParser`] and solves it.
/// This is the entry point a library caller reaches for unless it needs a
/// different front end (see [`run_with`]).
pub fn run(input: &str, options: &SolverOptions) -> Result<RunResult> {
    run_with(&parser::SmtLibParser, input, options)
}

/// Parses `input` with the given [`Parser`], normalizes the assertion,
/// and solves it (spec.md §4.7-§4.11 in order: preprocess, then slice,
/// solve and refine). The parser is taken as a trait object boundary so
/// the rest of the pipeline never depends on its internals, the same way
/// the reference solver's synthesis pipeline only ever reaches its LTL
/// front end through `owl::formula::Ltl::parse`.
pub fn run_with(parser: &impl Parser, input: &str, options: &SolverOptions) -> Result<RunResult> {
    let script = parser.parse(input)?;
    debug!("parsed {} declaration(s)", script.declarations.len());

    let normalized = preprocess::run(script.assertion);
    let solution = solver::solve(&normalized, &script.declarations, options)?;
    let status = if solution.sat { Status::Sat } else { Status::Unsat };
    info!("solved: {}", status);

    Ok(RunResult { status, declarations: script.declarations, solution })
}

/// Reports a witness for `variable` in an already-solved, satisfiable
/// [`RunResult`] (spec.md §6: "a witness example per variable").
pub fn witness_for(result: &RunResult, variable: &str, options: &SolverOptions) -> Result<witness::Witness> {
    if result.status != Status::Sat {
        return Err(Error::UnsupportedConstruct {
            what: format!("witness for variable '{variable}' in an unsatisfiable run"),
            location: Location::default(),
        });
    }
    witness::witness(&result.solution.symtab, variable, options)
}

/// Reports a model count for `variable` in an already-solved, satisfiable
/// [`RunResult`] (spec.md §4.12). Counting an unsatisfiable run, or a
/// variable this run never declared, is an [`Error::UnsupportedConstruct`]
/// rather than silently reporting zero, so a caller can't mistake "never
/// asked" for "counted to zero".
pub fn count(result: &RunResult, variable: &str, options: &SolverOptions) -> Result<BigUint> {
    if result.status != Status::Sat {
        return Err(Error::UnsupportedConstruct {
            what: format!("count over variable '{variable}' in an unsatisfiable run"),
            location: Location::default(),
        });
    }
    counter::count(&result.solution.symtab, variable, options)
}

/// Renders `script`'s assertion as a Graphviz dot graph (spec.md §6's
/// `--dot` flag), independent of solving.
pub fn parse_to_dot(parser: &impl Parser, input: &str) -> Result<String> {
    let script: Script = parser.parse(input)?;
    let mut out = Vec::new();
    ast_dot::write_dot(&script, &mut out).map_err(|e| Error::Internal { message: e.to_string() })?;
    Ok(String::from_utf8(out).expect("dot output is always valid UTF-8"))
}
