//! Symbolic analysis of real functions of one variable.
//!
//! Given an expression such as `(x^2 - 1)/(x - 2)`, the crate finds its
//! x- and y-intercepts, horizontal and vertical asymptotes, relative extrema
//! and inflection points. Results are exact symbolic values where possible.
//!
//! ```no_run
//! use function_analyzer::{analyze, Engine, ProbeOptions, SymbolicBackend};
//!
//! let engine = Engine::new();
//! let f = engine.parse("x^3 - 3x").unwrap();
//! let x = engine.variable_for(&f).unwrap();
//! let analysis = analyze(&engine, &f, &x, ProbeOptions::default());
//! assert_eq!(analysis.extrema.unwrap().len(), 2);
//! ```

pub mod analysis;
pub mod backend;
pub mod cas;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;

pub use analysis::{
    find_horizontal_asymptotes, find_inflection_points, find_relative_extrema,
    find_vertical_asymptotes, find_x_intercepts, find_y_intercepts, Extremum, ExtremumKind,
    InflectionPoint,
};
pub use backend::{Direction, LimitTarget, SymbolicBackend};
pub use cas::{Engine, Expr, Symbol};
pub use config::ProbeOptions;
pub use error::{CasError, CliError, IntervalError, InvalidEps, ParseError};
pub use report::{analyze, sample_curve, Analysis, Interval, Report};
