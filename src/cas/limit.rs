//! Limits.
//!
//! At infinity a rational function is settled by comparing degrees; any other
//! expression is taken apart and the limits of its parts are combined, with
//! growth classes (exponential beats algebraic beats logarithmic) breaking
//! `0 * oo` and `oo - oo` ties. At a finite point the expression is split
//! into numerator and denominator: a non-zero denominator means the value is
//! just substituted, `0/0` goes through L'Hôpital's rule, and `c/0` is a pole
//! whose side signs come from the first non-vanishing derivative of the
//! denominator.
//!
//! Anything the rules above cannot settle is returned as an unevaluated
//! `Expr::Limit`, which is not a number.

use std::cmp::Ordering;

use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use tracing::trace;

use super::diff::derivative;
use super::engine::{substitute, value_sign};
use super::expr::{Constant, Expr, Func, Symbol};
use super::poly::RationalFunction;
use crate::backend::{Direction, LimitTarget};
use crate::config::{MAX_LHOPITAL_STEPS, MAX_POLE_ORDER};
use crate::error::CasError;

/// Offset used to read the sign of a denominator that vanishes like a
/// fractional power, where no derivative order settles it.
const SIDE_PROBE: f64 = 1e-9;

pub fn limit(
    expr: &Expr,
    var: &Symbol,
    target: &LimitTarget<Expr>,
    direction: Direction,
) -> Result<Expr, CasError> {
    let value = match target {
        LimitTarget::PosInfinity | LimitTarget::Point(Expr::Constant(Constant::Infinity)) => {
            limit_at_infinity(expr, var, true)
        }
        LimitTarget::NegInfinity | LimitTarget::Point(Expr::Constant(Constant::NegInfinity)) => {
            limit_at_infinity(expr, var, false)
        }
        LimitTarget::Point(p) => limit_at_point(expr, var, p, direction)?,
    };
    let value = if value.has_residual() {
        residual(expr, var, target)
    } else {
        value
    };
    trace!(expr = %expr, target = ?target, result = %value, "limit");
    Ok(value)
}

fn residual(expr: &Expr, var: &Symbol, target: &LimitTarget<Expr>) -> Expr {
    Expr::Limit(Box::new(expr.clone()), var.clone(), Box::new(target.clone()))
}

// =============================================================================
// AT INFINITY
// =============================================================================

/// How fast a part tends to zero or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Growth {
    Bounded,
    Logarithmic,
    Algebraic,
    Exponential,
}

#[derive(Debug, Clone)]
enum Ext {
    Finite(Expr),
    PosInf,
    NegInf,
}

impl Ext {
    fn from_expr(e: Expr) -> Option<Ext> {
        match e {
            Expr::Constant(Constant::Infinity) => Some(Ext::PosInf),
            Expr::Constant(Constant::NegInfinity) => Some(Ext::NegInf),
            Expr::Constant(Constant::Undefined) => None,
            other if other.has_residual() => None,
            other => Some(Ext::Finite(other)),
        }
    }

    fn infinite(sign: Ordering) -> Option<Ext> {
        match sign {
            Ordering::Greater => Some(Ext::PosInf),
            Ordering::Less => Some(Ext::NegInf),
            Ordering::Equal => None,
        }
    }

    fn is_zero(&self) -> bool {
        matches!(self, Ext::Finite(v) if v.is_zero())
    }

    fn is_infinite(&self) -> bool {
        !matches!(self, Ext::Finite(_))
    }

    fn into_expr(self) -> Expr {
        match self {
            Ext::Finite(v) => v,
            Ext::PosInf => Expr::infinity(),
            Ext::NegInf => Expr::neg_infinity(),
        }
    }
}

/// Limit of a part together with how it gets there.
#[derive(Debug, Clone)]
struct Approach {
    value: Ext,
    /// `None` when the rate is unknown.
    growth: Option<Growth>,
    /// Sign of the part for all sufficiently large `|x|`.
    sign: Option<Ordering>,
}

impl Approach {
    fn finite(value: Expr) -> Option<Approach> {
        let sign = value_sign(&value);
        let value = Ext::from_expr(value)?;
        Some(Approach {
            value,
            growth: Some(Growth::Bounded),
            sign,
        })
    }
}

fn limit_at_infinity(expr: &Expr, var: &Symbol, positive: bool) -> Expr {
    if !expr.contains_symbol(var) {
        return expr.clone();
    }
    let target = if positive {
        LimitTarget::PosInfinity
    } else {
        LimitTarget::NegInfinity
    };
    match at_infinity(expr, var, positive, MAX_LHOPITAL_STEPS) {
        Some(a) => a.value.into_expr(),
        None => residual(expr, var, &target),
    }
}

fn flip(sign: Ordering, negate: bool) -> Ordering {
    if negate {
        sign.reverse()
    } else {
        sign
    }
}

fn product_sign(signs: impl IntoIterator<Item = Option<Ordering>>) -> Option<Ordering> {
    let mut acc = Ordering::Greater;
    for s in signs {
        match s? {
            Ordering::Equal => return Some(Ordering::Equal),
            Ordering::Less => acc = acc.reverse(),
            Ordering::Greater => {}
        }
    }
    Some(acc)
}

fn rational_at_infinity(rf: &RationalFunction, positive: bool) -> Approach {
    if rf.num.is_zero() {
        return Approach {
            value: Ext::Finite(Expr::zero()),
            growth: Some(Growth::Bounded),
            sign: Some(Ordering::Equal),
        };
    }
    let n = rf.num.degree();
    let m = rf.den.degree();
    let ratio: BigRational = rf.num.leading_coeff() / rf.den.leading_coeff();
    let odd_gap = (n + m) % 2 == 1;
    let sign = flip(ratio.cmp(&BigRational::zero()), !positive && odd_gap);

    match n.cmp(&m) {
        Ordering::Less => Approach {
            value: Ext::Finite(Expr::zero()),
            growth: Some(Growth::Algebraic),
            sign: Some(sign),
        },
        Ordering::Equal => Approach {
            value: Ext::Finite(Expr::Number(ratio)),
            growth: Some(Growth::Bounded),
            sign: Some(sign),
        },
        Ordering::Greater => Approach {
            value: if sign == Ordering::Greater { Ext::PosInf } else { Ext::NegInf },
            growth: Some(Growth::Algebraic),
            sign: Some(sign),
        },
    }
}

/// `budget` bounds the L'Hôpital rounds spent on quotients below this node.
fn at_infinity(expr: &Expr, var: &Symbol, positive: bool, budget: usize) -> Option<Approach> {
    if !expr.contains_symbol(var) {
        return Approach::finite(expr.clone());
    }
    if let Some(rf) = RationalFunction::from_expr(expr, var) {
        return Some(rational_at_infinity(&rf, positive));
    }
    let direct = match expr {
        Expr::Add(terms) => terms
            .iter()
            .map(|t| at_infinity(t, var, positive, budget))
            .collect::<Option<Vec<_>>>()
            .and_then(combine_sum),
        Expr::Mul(factors) => factors
            .iter()
            .map(|f| at_infinity(f, var, positive, budget))
            .collect::<Option<Vec<_>>>()
            .and_then(combine_product),
        Expr::Pow(base, exp) => match exp.as_number() {
            Some(c) => at_infinity(base, var, positive, budget).and_then(|b| power_approach(b, c)),
            None => {
                // b^e = exp(e * ln(b))
                let rewritten =
                    Expr::func(Func::Exp, (**exp).clone() * Expr::func(Func::Ln, (**base).clone()));
                if matches!(rewritten, Expr::Pow(..)) {
                    return None;
                }
                at_infinity(&rewritten, var, positive, budget)
            }
        },
        Expr::Func(f, arg) => {
            at_infinity(arg, var, positive, budget).and_then(|inner| func_approach(*f, inner))
        }
        _ => None,
    };
    direct.or_else(|| quotient_at_infinity(expr, var, positive, budget))
}

/// L'Hôpital on `num/den` when both parts tend to zero or both to infinity
/// at the same rate, e.g. `exp(x)/(exp(x) + 1)`.
fn quotient_at_infinity(expr: &Expr, var: &Symbol, positive: bool, budget: usize) -> Option<Approach> {
    if budget == 0 {
        return None;
    }
    let (num, den) = expr.as_numer_denom();
    if !den.contains_symbol(var) {
        return None;
    }
    let n = at_infinity(&num, var, positive, budget - 1)?;
    let d = at_infinity(&den, var, positive, budget - 1)?;
    let both_zero = n.value.is_zero() && d.value.is_zero();
    if !both_zero && !(n.value.is_infinite() && d.value.is_infinite()) {
        return None;
    }
    let next = derivative(&num, var).ok()? / derivative(&den, var).ok()?;
    trace!(expr = %expr, next = %next, "l'hopital at infinity");
    let ratio = at_infinity(&next, var, positive, budget - 1)?;
    let sign = product_sign([n.sign, d.sign]);
    match ratio.value {
        Ext::Finite(v) if !v.is_zero() => Approach::finite(v),
        Ext::Finite(v) => Some(Approach {
            value: Ext::Finite(v),
            growth: None,
            sign,
        }),
        _ => Some(Approach {
            value: Ext::infinite(sign?)?,
            growth: None,
            sign,
        }),
    }
}

fn combine_sum(parts: Vec<Approach>) -> Option<Approach> {
    let infinite: Vec<&Approach> = parts.iter().filter(|p| p.value.is_infinite()).collect();
    if infinite.is_empty() {
        let total = Expr::add(
            parts
                .into_iter()
                .map(|p| p.value.into_expr())
                .collect(),
        );
        let sign = value_sign(&total);
        let growth = if total.is_zero() { None } else { Some(Growth::Bounded) };
        return Some(Approach {
            value: Ext::from_expr(total)?,
            growth,
            sign: sign.filter(|s| *s != Ordering::Equal),
        });
    }
    let top = infinite.iter().map(|p| p.growth).max()??;
    if infinite.iter().any(|p| p.growth.is_none()) {
        return None;
    }
    let mut sign = None;
    for p in infinite.iter().filter(|p| p.growth == Some(top)) {
        let s = match p.value {
            Ext::PosInf => Ordering::Greater,
            _ => Ordering::Less,
        };
        match sign {
            None => sign = Some(s),
            Some(prev) if prev != s => return None,
            _ => {}
        }
    }
    let sign = sign?;
    Some(Approach {
        value: Ext::infinite(sign)?,
        growth: Some(top),
        sign: Some(sign),
    })
}

fn combine_product(parts: Vec<Approach>) -> Option<Approach> {
    let sign = product_sign(parts.iter().map(|p| p.sign));
    let zeros: Vec<&Approach> = parts.iter().filter(|p| p.value.is_zero()).collect();
    let infs: Vec<&Approach> = parts.iter().filter(|p| p.value.is_infinite()).collect();

    let max_growth = |group: &[&Approach]| -> Option<Growth> {
        group
            .iter()
            .map(|p| p.growth)
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .max()
    };

    let goes_to_zero = match (zeros.is_empty(), infs.is_empty()) {
        (true, true) => {
            let total = Expr::mul(parts.into_iter().map(|p| p.value.into_expr()).collect());
            return Approach::finite(total);
        }
        (false, true) => true,
        (true, false) => false,
        (false, false) => {
            let z = max_growth(&zeros)?;
            let i = max_growth(&infs)?;
            match z.cmp(&i) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => return None,
            }
        }
    };

    let growth = if goes_to_zero {
        max_growth(&zeros)
    } else {
        max_growth(&infs)
    };
    if goes_to_zero {
        return Some(Approach {
            value: Ext::Finite(Expr::zero()),
            growth,
            sign,
        });
    }
    Some(Approach {
        value: Ext::infinite(sign?)?,
        growth,
        sign,
    })
}

fn power_approach(base: Approach, c: &BigRational) -> Option<Approach> {
    let positive_exp = c.is_positive();
    let integer = c.is_integer();
    let even = integer && c.to_integer().is_even();

    // sign of b^c given the eventual sign of b
    let sign = match base.sign {
        Some(Ordering::Greater) => Some(Ordering::Greater),
        Some(Ordering::Equal) => Some(Ordering::Equal),
        Some(Ordering::Less) if even => Some(Ordering::Greater),
        Some(Ordering::Less) if integer => Some(Ordering::Less),
        _ => None,
    };

    match base.value {
        Ext::Finite(ref l) if !l.is_zero() => {
            Approach::finite(Expr::pow(l.clone(), Expr::Number(c.clone())))
        }
        Ext::Finite(_) => {
            if positive_exp {
                Some(Approach {
                    value: Ext::Finite(Expr::zero()),
                    growth: base.growth,
                    sign,
                })
            } else {
                Some(Approach {
                    value: Ext::infinite(sign?)?,
                    growth: base.growth,
                    sign,
                })
            }
        }
        Ext::PosInf | Ext::NegInf => {
            if sign.is_none() {
                return None;
            }
            if positive_exp {
                Some(Approach {
                    value: Ext::infinite(sign?)?,
                    growth: base.growth,
                    sign,
                })
            } else {
                Some(Approach {
                    value: Ext::Finite(Expr::zero()),
                    growth: base.growth,
                    sign,
                })
            }
        }
    }
}

fn func_approach(f: Func, inner: Approach) -> Option<Approach> {
    let fast_enough = matches!(inner.growth, Some(g) if g >= Growth::Algebraic);
    match inner.value {
        Ext::Finite(l) => {
            if f == Func::Ln && l.is_zero() {
                return (inner.sign == Some(Ordering::Greater)).then_some(Approach {
                    value: Ext::NegInf,
                    growth: Some(Growth::Logarithmic),
                    sign: Some(Ordering::Less),
                });
            }
            let v = Expr::func(f, l.clone());
            if !v.is_zero() {
                return Approach::finite(v);
            }
            // odd functions through the origin keep the sign of their argument
            let (growth, sign) = if l.is_zero() {
                let sign = match f {
                    Func::Sin | Func::Tan | Func::Asin | Func::Atan => inner.sign,
                    Func::Abs => Some(Ordering::Greater),
                    _ => None,
                };
                (inner.growth, sign)
            } else {
                (None, None)
            };
            Some(Approach {
                value: Ext::Finite(v),
                growth,
                sign,
            })
        }
        Ext::PosInf => match f {
            Func::Exp => Some(Approach {
                value: Ext::PosInf,
                growth: if fast_enough { Some(Growth::Exponential) } else { None },
                sign: Some(Ordering::Greater),
            }),
            Func::Ln => Some(Approach {
                value: Ext::PosInf,
                growth: Some(Growth::Logarithmic),
                sign: Some(Ordering::Greater),
            }),
            Func::Atan => Approach::finite(Expr::func(Func::Atan, Expr::infinity())),
            Func::Abs => Some(Approach {
                value: Ext::PosInf,
                growth: inner.growth,
                sign: Some(Ordering::Greater),
            }),
            _ => None,
        },
        Ext::NegInf => match f {
            Func::Exp => Some(Approach {
                value: Ext::Finite(Expr::zero()),
                growth: if fast_enough { Some(Growth::Exponential) } else { None },
                sign: Some(Ordering::Greater),
            }),
            Func::Atan => Approach::finite(Expr::func(Func::Atan, Expr::neg_infinity())),
            Func::Abs => Some(Approach {
                value: Ext::PosInf,
                growth: inner.growth,
                sign: Some(Ordering::Greater),
            }),
            _ => None,
        },
    }
}

// =============================================================================
// AT A FINITE POINT
// =============================================================================

fn limit_at_point(
    expr: &Expr,
    var: &Symbol,
    point: &Expr,
    direction: Direction,
) -> Result<Expr, CasError> {
    if !expr.contains_symbol(var) {
        return Ok(expr.clone());
    }
    let target = LimitTarget::Point(point.clone());
    let (mut num, mut den) = tan_as_quotient(expr).as_numer_denom();

    for step in 0..=MAX_LHOPITAL_STEPS {
        let n_at = substitute(&num, var, point);
        let d_at = substitute(&den, var, point);
        trace!(step, num = %n_at, den = %d_at, "limit at point");
        if n_at.is_undefined() || d_at.is_undefined() || n_at.has_residual() || d_at.has_residual() {
            break;
        }
        if d_at.is_zero() {
            if n_at.is_zero() {
                num = derivative(&num, var)?;
                den = derivative(&den, var)?;
                continue;
            }
            return pole_limit(&n_at, &den, var, point, direction);
        }
        if n_at.is_infinite() || d_at.is_infinite() {
            break;
        }
        return Ok(n_at / d_at);
    }
    Ok(residual(expr, var, &target))
}

/// Rewrites `tan(u)` as `sin(u)/cos(u)` so its poles show up in the denominator.
fn tan_as_quotient(expr: &Expr) -> Expr {
    match expr {
        Expr::Add(terms) => Expr::add(terms.iter().map(tan_as_quotient).collect()),
        Expr::Mul(factors) => Expr::mul(factors.iter().map(tan_as_quotient).collect()),
        Expr::Pow(b, e) => Expr::pow(tan_as_quotient(b), tan_as_quotient(e)),
        Expr::Func(Func::Tan, arg) => {
            let u = tan_as_quotient(arg);
            Expr::func(Func::Sin, u.clone()) / Expr::func(Func::Cos, u)
        }
        Expr::Func(f, arg) => Expr::func(*f, tan_as_quotient(arg)),
        other => other.clone(),
    }
}

/// One-sided infinite limit of `n/den` where `den(point) = 0` and `n != 0`.
fn pole_limit(
    n_at: &Expr,
    den: &Expr,
    var: &Symbol,
    point: &Expr,
    direction: Direction,
) -> Result<Expr, CasError> {
    let Some(n_sign) = value_sign(n_at).filter(|s| *s != Ordering::Equal) else {
        return Ok(Expr::undefined());
    };

    let mut d = den.clone();
    for order in 1..=MAX_POLE_ORDER {
        d = derivative(&d, var)?;
        let at = substitute(&d, var, point);
        if at.is_zero() {
            continue;
        }
        if at.is_undefined() || at.is_infinite() {
            return Ok(side_probe_limit(n_sign, den, var, point, direction));
        }
        let Some(d_sign) = value_sign(&at).filter(|s| *s != Ordering::Equal) else {
            return Ok(Expr::undefined());
        };
        // den ~ c (x - p)^k / k!, so the left side picks up (-1)^k
        let right = flip(d_sign, n_sign == Ordering::Less);
        let left = flip(right, order % 2 == 1);
        return Ok(signed_infinity(right, left, direction));
    }
    Ok(Expr::undefined())
}

/// Reads the denominator's side signs numerically just off the pole.
fn side_probe_limit(
    n_sign: Ordering,
    den: &Expr,
    var: &Symbol,
    point: &Expr,
    direction: Direction,
) -> Expr {
    let p = point.to_f64();
    let side = |offset: f64| {
        let v = den.eval_f64(Some((var, p + offset)));
        if v.is_nan() || v == 0.0 {
            None
        } else {
            Some(flip(v.partial_cmp(&0.0).unwrap_or(Ordering::Equal), n_sign == Ordering::Less))
        }
    };
    match (side(SIDE_PROBE), side(-SIDE_PROBE), direction) {
        (Some(right), _, Direction::Plus) => signed_infinity(right, right, direction),
        (_, Some(left), Direction::Minus) => signed_infinity(left, left, direction),
        (Some(right), Some(left), Direction::Both) => signed_infinity(right, left, direction),
        _ => Expr::undefined(),
    }
}

fn signed_infinity(right: Ordering, left: Ordering, direction: Direction) -> Expr {
    let sign = match direction {
        Direction::Plus => right,
        Direction::Minus => left,
        Direction::Both if left == right => right,
        Direction::Both => return Expr::undefined(),
    };
    match sign {
        Ordering::Greater => Expr::infinity(),
        Ordering::Less => Expr::neg_infinity(),
        Ordering::Equal => Expr::undefined(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    fn var() -> Symbol {
        Symbol::new("x")
    }

    fn at(expr: &Expr, target: LimitTarget<Expr>) -> Expr {
        limit(expr, &var(), &target, Direction::Plus).unwrap()
    }

    #[test]
    fn test_rational_limit_at_infinity_by_degree() {
        let f = (Expr::int(2) * Expr::pow(x(), Expr::int(2)) + Expr::one())
            / (Expr::pow(x(), Expr::int(2)) - Expr::int(4));
        assert_eq!(at(&f, LimitTarget::PosInfinity), Expr::int(2));
        assert_eq!(at(&(Expr::one() / x()), LimitTarget::NegInfinity), Expr::zero());
        assert_eq!(at(&Expr::pow(x(), Expr::int(3)), LimitTarget::NegInfinity), Expr::neg_infinity());
    }

    #[test]
    fn test_exponential_limits() {
        let f = Expr::func(Func::Exp, x());
        assert_eq!(at(&f, LimitTarget::PosInfinity), Expr::infinity());
        assert_eq!(at(&f, LimitTarget::NegInfinity), Expr::zero());
    }

    #[test]
    fn test_exponential_beats_polynomial() {
        // x^2 * exp(-x) -> 0
        let f = Expr::pow(x(), Expr::int(2)) * Expr::func(Func::Exp, -x());
        assert_eq!(at(&f, LimitTarget::PosInfinity), Expr::zero());
    }

    #[test]
    fn test_polynomial_beats_logarithm() {
        let f = x() - Expr::func(Func::Ln, x());
        assert_eq!(at(&f, LimitTarget::PosInfinity), Expr::infinity());
    }

    #[test]
    fn test_same_growth_quotients_at_infinity() {
        // logistic curve: oo/oo on the right, 0/1 on the left
        let e = Expr::func(Func::Exp, x());
        let logistic = e.clone() / (e + Expr::one());
        assert_eq!(at(&logistic, LimitTarget::PosInfinity), Expr::one());
        assert_eq!(at(&logistic, LimitTarget::NegInfinity), Expr::zero());

        let root2 = Expr::sqrt(Expr::int(2));
        let f = x() / (x() + root2.clone());
        assert_eq!(at(&f, LimitTarget::PosInfinity), Expr::one());
        let g = root2.clone() * x() / (x() + Expr::one());
        assert_eq!(at(&g, LimitTarget::NegInfinity), root2);
    }

    #[test]
    fn test_atan_has_two_horizontal_limits() {
        let f = Expr::func(Func::Atan, x());
        assert_eq!(at(&f, LimitTarget::PosInfinity).to_string(), "pi/2");
        assert_eq!(at(&f, LimitTarget::NegInfinity).to_string(), "-pi/2");
    }

    #[test]
    fn test_oscillation_is_left_unresolved() {
        let f = Expr::func(Func::Sin, x());
        let l = at(&f, LimitTarget::PosInfinity);
        assert!(matches!(l, Expr::Limit(..)));
    }

    #[test]
    fn test_removable_singularity_via_lhopital() {
        let f = (Expr::pow(x(), Expr::int(2)) - Expr::one()) / (x() - Expr::one());
        assert_eq!(at(&f, LimitTarget::Point(Expr::one())), Expr::int(2));
        let g = Expr::func(Func::Sin, x()) / x();
        assert_eq!(at(&g, LimitTarget::Point(Expr::zero())), Expr::one());
    }

    #[test]
    fn test_simple_pole_sides() {
        let f = Expr::one() / x();
        let p = LimitTarget::Point(Expr::zero());
        assert_eq!(limit(&f, &var(), &p, Direction::Plus).unwrap(), Expr::infinity());
        assert_eq!(limit(&f, &var(), &p, Direction::Minus).unwrap(), Expr::neg_infinity());
        assert!(limit(&f, &var(), &p, Direction::Both).unwrap().is_undefined());
    }

    #[test]
    fn test_double_pole_same_sign_both_sides() {
        let f = Expr::one() / Expr::pow(x() - Expr::int(2), Expr::int(2));
        let p = LimitTarget::Point(Expr::int(2));
        assert_eq!(limit(&f, &var(), &p, Direction::Both).unwrap(), Expr::infinity());
    }

    #[test]
    fn test_tan_pole() {
        let f = Expr::func(Func::Tan, x());
        let p = LimitTarget::Point(Expr::frac(1, 2) * Expr::pi());
        assert_eq!(limit(&f, &var(), &p, Direction::Minus).unwrap(), Expr::infinity());
        assert_eq!(limit(&f, &var(), &p, Direction::Plus).unwrap(), Expr::neg_infinity());
    }

    #[test]
    fn test_continuous_point_substitutes() {
        let f = Expr::pow(x(), Expr::int(2)) + Expr::one();
        assert_eq!(at(&f, LimitTarget::Point(Expr::int(3))), Expr::int(10));
    }
}
