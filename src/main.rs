//! `strcount` binary crate.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Clap;
use fs_err as fs;

use strcount::error::Error;
use strcount::options::{CliOptions, SolverOptions, TraceLevel};
use strcount::parser::SmtLibParser;
use strcount::Status;

fn main() -> ExitCode {
    match strcount_main() {
        Ok(code) => code,
        Err(error) => {
            let _ = writeln!(io::stderr(), "Error: {error}");
            ExitCode::from(2)
        }
    }
}

/// Initializes the logging framework with the given trace level.
///
/// # Errors
///
/// Returns an error if the logging framework has already been initialized.
fn initialize_logging(level: TraceLevel) -> io::Result<()> {
    env_logger::builder()
        .filter(None, level.into())
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

/// Reads the script text from `options.input_file`, or from standard input
/// if no file was given.
fn read_input(options: &CliOptions) -> io::Result<String> {
    match &options.input_file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parses CLI flags, reads the input script, solves it and writes
/// `sat`/`unsat` plus any requested model count, or dumps the parsed AST
/// as a dot graph and exits (spec.md §6, §11). Maps errors to the exit
/// codes spec.md §6 specifies: `0` = sat-or-unsat answered, `2` = I/O
/// error, `3` = parse error, `4` = internal error.
fn strcount_main() -> io::Result<ExitCode> {
    let options = CliOptions::parse();
    initialize_logging(options.trace_level)?;

    let input = read_input(&options)?;

    if options.dot {
        let dot = match strcount::parse_to_dot(&SmtLibParser, &input) {
            Ok(dot) => dot,
            Err(error) => return Ok(report(&error)),
        };
        write!(io::stdout(), "{dot}")?;
        return Ok(ExitCode::from(0));
    }

    let solver_options = SolverOptions::from(&options);
    let result = match strcount::run(&input, &solver_options) {
        Ok(result) => result,
        Err(error) => return Ok(report(&error)),
    };

    writeln!(io::stdout(), "{}", result.status())?;

    if result.status() == Status::Sat {
        for (name, _) in result.declarations() {
            match strcount::witness_for(&result, name, &solver_options) {
                Ok(witness) => writeln!(io::stdout(), "{name} = {witness}")?,
                Err(error) => return Ok(report(&error)),
            }
        }
        if let Some(variable) = &options.count_var {
            match strcount::count(&result, variable, &solver_options) {
                Ok(count) => writeln!(io::stdout(), "count({variable}) = {count}")?,
                Err(error) => return Ok(report(&error)),
            }
        }
    }

    Ok(ExitCode::from(0))
}

/// Logs and reports an `Error`, returning the exit code spec.md §6 assigns
/// to its kind.
fn report(error: &Error) -> ExitCode {
    match error {
        Error::ParseError { .. } => {
            log::error!("{error}");
            let _ = writeln!(io::stderr(), "Error: {error}");
            ExitCode::from(3)
        }
        Error::UnsupportedConstruct { .. } => {
            log::error!("{error}");
            let _ = writeln!(io::stderr(), "Error: {error}");
            ExitCode::from(3)
        }
        Error::IncompatibleTracks(_) | Error::Internal { .. } | Error::Aborted => {
            log::error!("{error}");
            let _ = writeln!(io::stderr(), "Error: {error}");
            ExitCode::from(4)
        }
    }
}
