use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use tracing::info;

use crate::backend::SymbolicBackend;
use crate::cas::Engine;
use crate::config::{
    ProbeOptions, DEFAULT_EPS, DEFAULT_LOWER, DEFAULT_MAX_ITER, DEFAULT_SAMPLES, DEFAULT_UPPER,
};
use crate::error::CliError;
use crate::report::{analyze, sample_curve, Interval, Report};

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "function-analyzer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single function of one variable
    Analyze(AnalyzeArgs),

    /// Analyze a gallery of sample functions and print timings
    Demo,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Function to analyze, e.g. "x^3 - 3x" or "(x^2 - 1)/(x - 1)"
    #[arg(allow_hyphen_values = true)]
    pub expression: String,

    /// Variable name (inferred when the expression has a single symbol)
    #[arg(short = 'x', long = "var")]
    pub var: Option<String>,

    /// Lower bound of the plotted interval
    #[arg(long, default_value_t = DEFAULT_LOWER, allow_hyphen_values = true)]
    pub lower: f64,

    /// Upper bound of the plotted interval
    #[arg(long, default_value_t = DEFAULT_UPPER, allow_hyphen_values = true)]
    pub upper: f64,

    /// Number of curve samples
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    /// Probe offset unit around critical points
    #[arg(long, default_value_t = DEFAULT_EPS, allow_hyphen_values = true)]
    pub eps: f64,

    /// Probe steps tried per critical point
    #[arg(long, default_value_t = DEFAULT_MAX_ITER)]
    pub max_iter: usize,

    /// Output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::Format(other.to_string())),
        }
    }
}

/// Parses, analyzes and prints one function. Returns the process exit code.
pub fn run_analyze(args: &AnalyzeArgs) -> Result<i32, CliError> {
    let format: OutputFormat = args.format.parse()?;
    let interval = Interval::new(args.lower, args.upper)?;
    let opts = ProbeOptions::checked(args.eps, args.max_iter)?;
    let engine = match &args.var {
        Some(name) => Engine::with_variable(name),
        None => Engine::new(),
    };
    let f = engine.parse(&args.expression)?;
    let x = engine.variable_for(&f)?;

    info!(function = %f, variable = %x, "analyzing");
    let (analysis, curve) = rayon::join(
        || analyze(&engine, &f, &x, opts),
        || sample_curve(&engine, &f, &x, interval, args.samples),
    );
    let report = Report::build(&engine, &f, &x, &analysis, interval, curve);

    match format {
        OutputFormat::Pretty => report.print_pretty(),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(if analysis.has_failures() {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    })
}

const GALLERY: &[&str] = &[
    "x^2 - 4",
    "x^3 - 3x",
    "x^4 - 2x^2",
    "1/x",
    "1/(x^2 + 1)",
    "(x^2 - 1)/(x - 1)",
    "(2x^2 + 1)/(x^2 - 4)",
    "exp(x)",
    "x*exp(-x)",
    "ln(x)",
    "atan(x)",
    "sin(x)",
    "tan(x)",
];

/// Runs every gallery function and prints a timing summary.
pub fn run_demo() -> i32 {
    println!("{}", "=== FUNCTION ANALYZER GALLERY ===\n".magenta().bold());

    let engine = Engine::new();
    let opts = ProbeOptions::default();
    let interval = Interval {
        lower: DEFAULT_LOWER,
        upper: DEFAULT_UPPER,
    };

    let start = Instant::now();
    let mut failed = 0;
    for text in GALLERY {
        println!("{}{}", "Input: ".cyan().bold(), text);
        let parsed = engine
            .parse(text)
            .map_err(CliError::from)
            .and_then(|f| Ok((engine.variable_for(&f)?, f)));
        let (x, f) = match parsed {
            Ok(v) => v,
            Err(e) => {
                println!("  {}", e.to_string().red());
                failed += 1;
                continue;
            }
        };
        let analysis = analyze(&engine, &f, &x, opts);
        let curve = sample_curve(&engine, &f, &x, interval, DEFAULT_SAMPLES);
        let report = Report::build(&engine, &f, &x, &analysis, interval, curve);
        report.print_pretty();
        if report.has_errors() {
            failed += 1;
        }
    }
    let elapsed = start.elapsed();

    println!("\n{}", "=== PERFORMANCE SUMMARY ===".magenta().bold());
    println!("Functions analyzed: {}", GALLERY.len());
    println!("With failures:      {}", failed);
    println!("Total time:         {:?}", elapsed);
    println!("Average:            {:?}", elapsed / GALLERY.len() as u32);

    if failed > 0 {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}
