use std::cmp::Ordering;

use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use tracing::debug;

use super::diff::nth_derivative;
use super::expr::{Constant, Expr, Symbol};
use super::limit::limit;
use super::parse::{parse_expr, rational_from_f64};
use super::poly::RationalFunction;
use super::solve::solve;
use super::surd::Surd;
use crate::backend::{Direction, LimitTarget, SymbolicBackend};
use crate::error::{CasError, ParseError};

/// The built-in exact symbolic engine.
///
/// Stateless apart from the name of the analysis variable, which only affects
/// parsing (`e` is Euler's number unless the variable is called `e`).
#[derive(Debug, Clone, Default)]
pub struct Engine {
    variable: Option<Symbol>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(name: &str) -> Self {
        Self {
            variable: Some(Symbol::new(name)),
        }
    }

    /// The variable to analyze `expr` in: the configured one, or the
    /// expression's only free symbol (`x` for constants).
    pub fn variable_for(&self, expr: &Expr) -> Result<Symbol, CasError> {
        let free = expr.free_symbols();
        let names = || {
            free.iter()
                .map(Symbol::name)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match &self.variable {
            Some(v) => {
                if free.iter().all(|s| s == v) {
                    Ok(v.clone())
                } else if free.contains(v) {
                    Err(CasError::MultipleSymbols(names()))
                } else {
                    Err(CasError::UnknownVariable(v.name().to_string()))
                }
            }
            None => match free.len() {
                0 => Ok(Symbol::new("x")),
                1 => Ok(free.iter().next().cloned().unwrap_or_else(|| Symbol::new("x"))),
                _ => Err(CasError::MultipleSymbols(names())),
            },
        }
    }
}

/// Sign of a constant value, exact for rationals and quadratic surds.
pub(crate) fn value_sign(expr: &Expr) -> Option<Ordering> {
    match expr {
        Expr::Constant(Constant::Infinity) => Some(Ordering::Greater),
        Expr::Constant(Constant::NegInfinity) => Some(Ordering::Less),
        Expr::Constant(Constant::Undefined) => None,
        _ if !expr.is_constant() => None,
        _ => {
            if let Some(s) = Surd::from_expr(expr) {
                return s.sign();
            }
            if let Some(s) = power_product_sign(expr) {
                return Some(s);
            }
            let v = expr.to_f64();
            if v.is_nan() {
                None
            } else {
                v.partial_cmp(&0.0)
            }
        }
    }
}

/// Sign of a product of rationals and rational powers, read off the bases
/// and the exponent parity. Such values can lie far below the f64 range.
fn power_product_sign(expr: &Expr) -> Option<Ordering> {
    match expr {
        Expr::Number(n) => Some(n.cmp(&BigRational::zero())),
        Expr::Pow(base, exp) => {
            let e = exp.as_number()?;
            match power_product_sign(base)? {
                Ordering::Less if e.is_integer() => Some(if e.to_integer().is_even() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }),
                Ordering::Less => None,
                Ordering::Equal if e.is_positive() => Some(Ordering::Equal),
                Ordering::Equal => None,
                Ordering::Greater => Some(Ordering::Greater),
            }
        }
        Expr::Mul(factors) => {
            let mut acc = Ordering::Greater;
            for f in factors {
                match power_product_sign(f)? {
                    Ordering::Equal => return Some(Ordering::Equal),
                    Ordering::Less => acc = acc.reverse(),
                    Ordering::Greater => {}
                }
            }
            Some(acc)
        }
        _ => None,
    }
}

/// `expr` with `var := value`.
///
/// Rational sub-expressions evaluated at a quadratic surd are computed in
/// Q(sqrt(d)), so a root of a polynomial substitutes back to exactly zero.
pub(crate) fn substitute(expr: &Expr, var: &Symbol, value: &Expr) -> Expr {
    match Surd::from_expr(value) {
        Some(point) => substitute_surd(expr, var, &point, value),
        None => expr.subs(var, value),
    }
}

fn substitute_surd(expr: &Expr, var: &Symbol, point: &Surd, value: &Expr) -> Expr {
    if !expr.contains_symbol(var) {
        return expr.clone();
    }
    if RationalFunction::from_expr(expr, var).is_some() {
        // unreduced numerator and denominator, so removable points stay undefined
        let (num, den) = expr.as_numer_denom();
        let exact = RationalFunction::from_expr(&num, var)
            .zip(RationalFunction::from_expr(&den, var))
            .and_then(|(n, d)| {
                let n = n.eval_surd(point)?;
                let d = d.eval_surd(point)?;
                if d.is_zero() {
                    return Some(Expr::undefined());
                }
                Some(n.checked_mul(&d.inverse()?)?.to_expr())
            });
        if let Some(v) = exact {
            return v;
        }
        return expr.subs(var, value);
    }
    match expr {
        Expr::Add(terms) => Expr::add(
            terms
                .iter()
                .map(|t| substitute_surd(t, var, point, value))
                .collect(),
        ),
        Expr::Mul(factors) => Expr::mul(
            factors
                .iter()
                .map(|f| substitute_surd(f, var, point, value))
                .collect(),
        ),
        Expr::Pow(b, e) => Expr::pow(
            substitute_surd(b, var, point, value),
            substitute_surd(e, var, point, value),
        ),
        Expr::Func(f, a) => Expr::func(*f, substitute_surd(a, var, point, value)),
        _ => expr.subs(var, value),
    }
}

impl SymbolicBackend for Engine {
    type Expr = Expr;
    type Var = Symbol;

    fn parse(&self, text: &str) -> Result<Expr, ParseError> {
        parse_expr(text, self.variable.as_ref())
    }

    fn solve(&self, expr: &Expr, var: Option<&Symbol>) -> Result<Vec<Expr>, CasError> {
        let var = match var {
            Some(v) => v.clone(),
            None => {
                let free = expr.free_symbols();
                if free.is_empty() {
                    return Ok(Vec::new());
                }
                if free.len() > 1 {
                    let names: Vec<&str> = free.iter().map(Symbol::name).collect();
                    return Err(CasError::MultipleSymbols(names.join(", ")));
                }
                self.variable_for(expr)?
            }
        };
        solve(expr, &var)
    }

    fn is_real(&self, expr: &Expr) -> bool {
        if !expr.is_constant() || expr.is_infinite() || expr.is_undefined() {
            return false;
        }
        if let Some(s) = Surd::from_expr(expr) {
            return s.is_real();
        }
        expr.to_f64().is_finite()
    }

    fn is_number(&self, expr: &Expr) -> bool {
        expr.is_constant()
    }

    fn differentiate(&self, expr: &Expr, var: &Symbol, order: u32) -> Result<Expr, CasError> {
        let d = nth_derivative(expr, var, order)?;
        debug!(expr = %expr, order, derivative = %d, "differentiated");
        Ok(d)
    }

    fn substitute(&self, expr: &Expr, var: &Symbol, value: &Expr) -> Result<Expr, CasError> {
        Ok(substitute(expr, var, value))
    }

    fn limit(
        &self,
        expr: &Expr,
        var: &Symbol,
        target: LimitTarget<Expr>,
        direction: Direction,
    ) -> Result<Expr, CasError> {
        limit(expr, var, &target, direction)
    }

    fn denominator(&self, expr: &Expr) -> Result<Expr, CasError> {
        Ok(expr.as_numer_denom().1)
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        let free = expr.free_symbols();
        if free.len() != 1 {
            return expr.clone();
        }
        let Some(var) = free.iter().next() else {
            return expr.clone();
        };
        match RationalFunction::from_expr(expr, var) {
            Some(rf) => rf.to_expr(var),
            None => expr.clone(),
        }
    }

    fn is_pos_infinity(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Constant(Constant::Infinity))
    }

    fn is_neg_infinity(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Constant(Constant::NegInfinity))
    }

    fn sign(&self, expr: &Expr) -> Option<Ordering> {
        value_sign(expr)
    }

    fn number(&self, value: f64) -> Expr {
        if value == f64::INFINITY {
            return Expr::infinity();
        }
        if value == f64::NEG_INFINITY {
            return Expr::neg_infinity();
        }
        rational_from_f64(value).map_or_else(Expr::undefined, Expr::Number)
    }

    fn shift(&self, point: &Expr, delta: f64) -> Expr {
        point.clone() + self.number(delta)
    }

    fn to_f64(&self, expr: &Expr) -> Option<f64> {
        let v = match Surd::from_expr(expr) {
            Some(s) => s.to_f64()?,
            None => expr.to_f64(),
        };
        v.is_finite().then_some(v)
    }

    /// A rational function is converted once and then evaluated exactly by
    /// Horner's rule at every surd point.
    fn sign_sampler<'a>(
        &'a self,
        expr: &'a Expr,
        var: &'a Symbol,
    ) -> Box<dyn Fn(&Expr) -> Result<Option<Ordering>, CasError> + 'a> {
        let Some(rf) = RationalFunction::from_expr(expr, var) else {
            return Box::new(move |at: &Expr| -> Result<Option<Ordering>, CasError> {
                Ok(value_sign(&substitute(expr, var, at)))
            });
        };
        Box::new(move |at: &Expr| -> Result<Option<Ordering>, CasError> {
            let exact = Surd::from_expr(at)
                .and_then(|p| Some((rf.num.eval_surd(&p)?, rf.den.eval_surd(&p)?)));
            match exact {
                Some((_, d)) if d.is_zero() => Ok(None),
                Some((n, d)) => Ok(match (n.sign(), d.sign()) {
                    (Some(a), Some(Ordering::Less)) => Some(a.reverse()),
                    (Some(a), Some(_)) => Some(a),
                    _ => None,
                }),
                None => Ok(value_sign(&substitute(expr, var, at))),
            }
        })
    }
}
