//! Options for the solving procedure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Clap;

/// Implement [`Display`](std::fmt::Display) with the information in [`clap::ArgEnum`].
///
/// This ensures consistent names for parsing of the default argument.
macro_rules! clap_display {
    ($t:ty) => {
        impl std::fmt::Display for $t
        where
            $t: clap::ArgEnum,
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use clap::ArgEnum as _;
                let self_str = Self::VARIANTS
                    .iter()
                    .find(|s| &Self::from_str(s, false).unwrap() == self)
                    .unwrap();
                write!(f, "{}", self_str)
            }
        }
    };
}

/// Whether integer variables are interpreted as unsigned naturals or as
/// two's-complement signed integers when building a [`dfa::IntAutomaton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Clap)]
pub enum IntegerMode {
    /// Integers are non-negative naturals.
    #[clap(name = "unsigned")]
    Unsigned,
    /// Integers use a two's-complement sign bit.
    #[clap(name = "signed")]
    Signed,
}
impl Default for IntegerMode {
    fn default() -> Self {
        Self::Signed
    }
}
clap_display!(IntegerMode);

/// The counting mode used by [`crate::counter::count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Clap)]
pub enum CountMode {
    /// Count accepted words of exactly the given length.
    #[clap(name = "exact")]
    Exact,
    /// Count accepted words of length at most the given bound.
    #[clap(name = "at-most")]
    AtMost,
}
impl Default for CountMode {
    fn default() -> Self {
        Self::AtMost
    }
}
clap_display!(CountMode);

/// The trace level / verbosity for the logging framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Clap)]
pub enum TraceLevel {
    /// Turn logging off.
    #[clap(name = "off")]
    Off,
    /// Only print errors.
    #[clap(name = "error")]
    Error,
    /// Print errors and warnings.
    #[clap(name = "warn")]
    Warn,
    /// Print errors, warnings and useful information.
    #[clap(name = "info")]
    Info,
    /// Print errors, warnings, useful and debug information.
    #[clap(name = "debug")]
    Debug,
    /// Print all information, including very verbose output.
    #[clap(name = "trace")]
    Trace,
}
impl Default for TraceLevel {
    fn default() -> Self {
        Self::Error
    }
}
clap_display!(TraceLevel);

impl From<TraceLevel> for log::LevelFilter {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Off => Self::Off,
            TraceLevel::Error => Self::Error,
            TraceLevel::Warn => Self::Warn,
            TraceLevel::Info => Self::Info,
            TraceLevel::Debug => Self::Debug,
            TraceLevel::Trace => Self::Trace,
        }
    }
}

/// A cooperative abort flag, checked between kernel operations and AST
/// nodes during solving. Cloning shares the same underlying flag; the
/// watcher thread spawned by [`SolverOptions::with_timeout`] sets it once
/// the wall-clock deadline elapses.
#[derive(Debug, Clone)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Default for AbortFlag {
    fn default() -> Self {
        Self::new()
    }
}

// Workaround for https://github.com/TeXitoi/structopt/issues/333
#[cfg_attr(not(doc), allow(missing_docs))]
#[cfg_attr(
    doc,
    doc = r#"
Options to control the solving procedure.

These options can be used directly when calling into this crate as a
library; [`CliOptions`] only adds the additional input/output fields
needed by the command-line binary.
"#
)]
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// The maximum word length/bound used for model counting.
    pub bound: u64,
    /// The counting mode to apply at `bound`.
    pub count_mode: CountMode,
    /// The name of the variable to produce a model count for, if any.
    pub count_var: Option<String>,
    /// Whether integer variables are signed or unsigned.
    pub integer_mode: IntegerMode,
    /// Bit width used to encode an integer variable's binary automaton.
    pub bit_width: usize,
    /// Cooperative abort flag, checked during solving.
    pub abort: AbortFlag,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            bound: 16,
            count_mode: CountMode::default(),
            count_var: None,
            integer_mode: IntegerMode::default(),
            bit_width: 32,
            abort: AbortFlag::default(),
        }
    }
}

impl SolverOptions {
    /// `true` when the solver should build unsigned (non-negative) integer
    /// automata rather than two's-complement ones.
    pub fn unsigned(&self) -> bool {
        self.integer_mode == IntegerMode::Unsigned
    }

    /// Spawns a watcher thread that sets the returned abort flag once
    /// `timeout` elapses.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        let flag = self.abort.clone();
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            flag.set();
        });
        self
    }
}

// Workaround for https://github.com/TeXitoi/structopt/issues/333
#[cfg_attr(not(doc), allow(missing_docs))]
#[cfg_attr(
    doc,
    doc = r#"
A group of options used for parsing the arguments of the
command-line interface.

This struct should mainly be used with [`clap`] and not instantiated
manually. For using this crate as a library, construct a
[`SolverOptions`] directly instead.
"#
)]
#[derive(Debug, Clone, Clap)]
#[clap(version, about)]
pub struct CliOptions {
    /// The input file to read the script from. Reads from standard input
    /// if omitted.
    #[clap(name = "input", about = "Input file (reads stdin if omitted)")]
    pub input_file: Option<String>,
    /// Print the parsed assertion as a dot graph and exit.
    #[clap(long = "dot", about = "Print the parsed assertion as a dot graph and exit")]
    pub dot: bool,
    /// The maximum word length/bound used for model counting.
    #[clap(
        long = "bound",
        name = "n",
        default_value = "16",
        about = "Maximum word length for model counting",
        display_order = 0
    )]
    pub bound: u64,
    /// The counting mode to apply at `bound`.
    #[clap(
        arg_enum,
        long = "count-mode",
        name = "mode",
        default_value,
        about = "Counting mode (exact length or at-most)",
        display_order = 1
    )]
    pub count_mode: CountMode,
    /// The name of the variable to count models for.
    #[clap(
        long = "count-var",
        name = "var",
        about = "Report a model count for the given variable",
        display_order = 2
    )]
    pub count_var: Option<String>,
    /// Whether to interpret integers as signed or unsigned.
    #[clap(
        arg_enum,
        long = "integers",
        name = "int-mode",
        default_value,
        about = "Integer encoding (signed two's-complement or unsigned)",
        display_order = 3
    )]
    pub integer_mode: IntegerMode,
    /// Bit width used for integer automata.
    #[clap(
        long = "bit-width",
        name = "w",
        default_value = "32",
        about = "Bit width of integer automata",
        display_order = 4
    )]
    pub bit_width: usize,
    /// Abort solving after the given number of seconds.
    #[clap(
        long = "timeout",
        name = "secs",
        about = "Abort solving after the given number of seconds",
        display_order = 5
    )]
    pub timeout: Option<u64>,
    /// The trace level to use for instantiating the logging framework.
    #[clap(
        arg_enum,
        short = 't',
        long = "trace",
        name = "trace-level",
        default_value,
        about = "Trace level",
        display_order = 17
    )]
    pub trace_level: TraceLevel,
}

impl From<&CliOptions> for SolverOptions {
    fn from(options: &CliOptions) -> Self {
        let base = SolverOptions {
            bound: options.bound,
            count_mode: options.count_mode,
            count_var: options.count_var.clone(),
            integer_mode: options.integer_mode,
            bit_width: options.bit_width,
            abort: AbortFlag::default(),
        };
        match options.timeout {
            Some(secs) => base.with_timeout(std::time::Duration::from_secs(secs)),
            None => base,
        }
    }
}
