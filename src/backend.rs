//! The symbolic-math capability the analysis engine is written against.
//!
//! The six analysis operations in [`crate::analysis`] only ever talk to a
//! `SymbolicBackend`; [`crate::cas::Engine`] is the implementation shipped
//! with this crate. Another computer-algebra engine can be plugged in by
//! implementing this trait.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{CasError, ParseError};

/// Where a limit is taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LimitTarget<E> {
    PosInfinity,
    NegInfinity,
    Point(E),
}

/// Side from which a finite limit point is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// From above (`x -> a+`).
    #[default]
    Plus,
    /// From below (`x -> a-`).
    Minus,
    /// Both sides; the limit exists only if the one-sided limits agree.
    Both,
}

pub trait SymbolicBackend: Sync {
    type Expr: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync;
    type Var: Clone + fmt::Debug + fmt::Display + Send + Sync;

    /// Text to expression. Used by the input layer, never by the analysis core.
    fn parse(&self, text: &str) -> Result<Self::Expr, ParseError>;

    /// Exact roots of `expr = 0`. With `var = None` the expression's only free
    /// symbol is used. Roots may be non-real.
    fn solve(&self, expr: &Self::Expr, var: Option<&Self::Var>)
        -> Result<Vec<Self::Expr>, CasError>;

    /// True only for values known to be finite real numbers.
    fn is_real(&self, expr: &Self::Expr) -> bool;

    /// True for fully evaluated values (including infinities), false for
    /// anything symbolic or unresolved.
    fn is_number(&self, expr: &Self::Expr) -> bool;

    fn differentiate(
        &self,
        expr: &Self::Expr,
        var: &Self::Var,
        order: u32,
    ) -> Result<Self::Expr, CasError>;

    fn substitute(
        &self,
        expr: &Self::Expr,
        var: &Self::Var,
        value: &Self::Expr,
    ) -> Result<Self::Expr, CasError>;

    /// Limit of `expr` as `var` approaches `target`. The result is a value,
    /// `+oo`, `-oo`, or something that is not a number (undefined or
    /// unresolved).
    fn limit(
        &self,
        expr: &Self::Expr,
        var: &Self::Var,
        target: LimitTarget<Self::Expr>,
        direction: Direction,
    ) -> Result<Self::Expr, CasError>;

    fn denominator(&self, expr: &Self::Expr) -> Result<Self::Expr, CasError>;

    /// Display-oriented simplification.
    fn simplify(&self, expr: &Self::Expr) -> Self::Expr;

    fn is_pos_infinity(&self, expr: &Self::Expr) -> bool;

    fn is_neg_infinity(&self, expr: &Self::Expr) -> bool;

    /// Comparison of a numeric value with zero; `None` when it cannot be
    /// ordered (symbolic, undefined or non-real).
    fn sign(&self, expr: &Self::Expr) -> Option<Ordering>;

    fn number(&self, value: f64) -> Self::Expr;

    /// `point + delta`.
    fn shift(&self, point: &Self::Expr, delta: f64) -> Self::Expr;

    /// Floating-point approximation for plotting.
    fn to_f64(&self, expr: &Self::Expr) -> Option<f64>;

    /// Reads the sign of `expr` at `var := at` for many points in a row.
    ///
    /// The default substitutes at every call. A backend may prepare `expr`
    /// once and evaluate the prepared form instead.
    fn sign_sampler<'a>(
        &'a self,
        expr: &'a Self::Expr,
        var: &'a Self::Var,
    ) -> Box<dyn Fn(&Self::Expr) -> Result<Option<Ordering>, CasError> + 'a> {
        Box::new(move |at: &Self::Expr| -> Result<Option<Ordering>, CasError> {
            Ok(self.sign(&self.substitute(expr, var, at)?))
        })
    }
}
