//! Exact equation solving.
//!
//! Rational functions go through polynomial root extraction; everything else
//! is handled by isolating the single occurrence of the variable through the
//! inverse of each function wrapped around it.

use std::cmp::Ordering;

use num_integer::Integer;
use num_rational::BigRational;
use num_traits::Zero;
use tracing::debug;

use super::engine::{substitute, value_sign};
use super::expr::{Constant, Expr, Func, Symbol};
use super::poly::{Poly, RationalFunction};
use super::surd::Surd;
use crate::error::CasError;

/// Distinct roots of `expr = 0` in `var`; real roots first, ascending.
pub fn solve(expr: &Expr, var: &Symbol) -> Result<Vec<Expr>, CasError> {
    let mut roots = solve_unsorted(expr, var)?;
    roots.sort_by(|a, b| order_roots(a, b));
    roots.dedup();
    debug!(expr = %expr, count = roots.len(), "solved");
    Ok(roots)
}

fn order_roots(a: &Expr, b: &Expr) -> Ordering {
    let (fa, fb) = (a.to_f64(), b.to_f64());
    match (fa.is_nan(), fb.is_nan()) {
        (false, false) => fa.partial_cmp(&fb).unwrap_or(Ordering::Equal),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => a.cmp(b),
    }
}

fn solve_unsorted(expr: &Expr, var: &Symbol) -> Result<Vec<Expr>, CasError> {
    if !expr.contains_symbol(var) {
        return Ok(Vec::new());
    }
    if let Some(rf) = RationalFunction::from_expr(expr, var) {
        return poly_roots(&rf.num);
    }
    match expr {
        Expr::Mul(_) => solve_product(expr, var),
        Expr::Add(terms) => match split_common_factor(terms, var) {
            Some((common, rest)) => {
                let mut out = Vec::new();
                for root in solve_unsorted(&common, var)?
                    .into_iter()
                    .chain(solve_unsorted(&rest, var)?)
                {
                    let product = Expr::mul(vec![
                        substitute(&common, var, &root),
                        substitute(&rest, var, &root),
                    ]);
                    if product.is_zero() {
                        out.push(root);
                    }
                }
                Ok(out)
            }
            None => isolate(expr, Expr::zero(), var),
        },
        _ => isolate(expr, Expr::zero(), var),
    }
}

/// Pulls out the factors in `var` shared by every term, so that
/// `exp(-x) - x*exp(-x)` becomes `exp(-x) * (1 - x)`.
fn split_common_factor(terms: &[Expr], var: &Symbol) -> Option<(Expr, Expr)> {
    let factor_lists: Vec<Vec<Expr>> = terms
        .iter()
        .map(|t| match t {
            Expr::Mul(fs) => fs.clone(),
            other => vec![other.clone()],
        })
        .collect();
    let (first, others) = factor_lists.split_first()?;
    let common: Vec<Expr> = first
        .iter()
        .filter(|f| f.contains_symbol(var) && others.iter().all(|l| l.contains(f)))
        .cloned()
        .collect();
    if common.is_empty() {
        return None;
    }
    let common = Expr::mul(common);
    let rest = Expr::add(terms.iter().map(|t| t.clone() / common.clone()).collect());
    Some((common, rest))
}

/// Roots of each factor, keeping only those where the whole product is defined.
fn solve_product(expr: &Expr, var: &Symbol) -> Result<Vec<Expr>, CasError> {
    let Expr::Mul(factors) = expr else {
        return isolate(expr, Expr::zero(), var);
    };
    let mut out = Vec::new();
    for f in factors.iter().filter(|f| f.contains_symbol(var)) {
        for root in solve_unsorted(f, var)? {
            let at_root = substitute(expr, var, &root);
            if at_root.is_zero() {
                out.push(root);
            }
        }
    }
    Ok(out)
}

/// Exact roots of a polynomial: quadratic surds, plus the real `n`-th roots
/// of a pure binomial `a*x^n + c`.
pub fn poly_roots(p: &Poly) -> Result<Vec<Expr>, CasError> {
    if p.is_zero() || p.is_constant() {
        return Ok(Vec::new());
    }
    let sf = p.square_free();
    let (rational, rest) = sf.rational_roots();
    let mut roots: Vec<Surd> = rational.into_iter().map(Surd::rational).collect();

    match rest.degree() {
        0 => {}
        2 => {
            let [lo, hi] = Surd::quadratic_roots(&rest.coeff(2), &rest.coeff(1), &rest.coeff(0));
            roots.push(lo);
            roots.push(hi);
        }
        d if d > 2 && is_binomial(&rest) => {
            // a*x^d + c = 0 has the real roots of x^d = -c/a
            let x = Symbol::new("x");
            let rhs = Expr::Number(-rest.coeff(0) / rest.leading_coeff());
            let mut out: Vec<Expr> = roots.iter().map(Surd::to_expr).collect();
            out.extend(isolate_power(&Expr::Symbol(x.clone()), &Expr::int(d as i64), rhs, &x)?);
            return Ok(out);
        }
        4 if rest.coeff(1).is_zero() && rest.coeff(3).is_zero() => {
            // biquadratic: solve for y = x^2 first
            let ys = Surd::quadratic_roots(&rest.coeff(4), &rest.coeff(2), &rest.coeff(0));
            for y in ys {
                let y = y.as_rational().cloned().ok_or_else(|| {
                    CasError::unsupported(format!("nested radical roots of {}", describe(&rest)))
                })?;
                let r = Surd::sqrt_of(&y);
                roots.push(r.neg());
                roots.push(r);
            }
        }
        d => {
            return Err(CasError::unsupported(format!(
                "no closed form for degree-{} factor {}",
                d,
                describe(&rest)
            )));
        }
    }
    Ok(roots.iter().map(Surd::to_expr).collect())
}

fn is_binomial(p: &Poly) -> bool {
    p.coeffs()[1..p.degree()].iter().all(Zero::is_zero)
}

fn describe(p: &Poly) -> String {
    p.to_expr(&Symbol::new("x")).to_string()
}

/// Solutions of `lhs = rhs` where `rhs` is free of `var`.
fn isolate(lhs: &Expr, rhs: Expr, var: &Symbol) -> Result<Vec<Expr>, CasError> {
    if let Expr::Symbol(s) = lhs {
        if s == var {
            return Ok(vec![rhs]);
        }
    }
    if rhs.is_undefined() || rhs.is_infinite() {
        return Ok(Vec::new());
    }

    let unsupported = || CasError::unsupported(format!("cannot solve {} = {}", lhs, rhs));

    match lhs {
        Expr::Add(terms) => {
            let (with_var, rest): (Vec<&Expr>, Vec<&Expr>) =
                terms.iter().partition(|t| t.contains_symbol(var));
            if with_var.len() != 1 {
                let diff = lhs.clone() - rhs.clone();
                if let Some(rf) = RationalFunction::from_expr(&diff, var) {
                    return poly_roots(&rf.num);
                }
                return Err(unsupported());
            }
            let moved = Expr::add(rest.into_iter().cloned().collect());
            isolate(with_var[0], rhs - moved, var)
        }
        Expr::Mul(factors) => {
            if rhs.is_zero() {
                return solve_product(lhs, var);
            }
            let (with_var, rest): (Vec<&Expr>, Vec<&Expr>) =
                factors.iter().partition(|f| f.contains_symbol(var));
            if with_var.len() != 1 {
                return Err(unsupported());
            }
            let scale = Expr::mul(rest.into_iter().cloned().collect());
            isolate(with_var[0], rhs / scale, var)
        }
        Expr::Pow(base, exp) => {
            if !exp.contains_symbol(var) {
                return isolate_power(base, exp, rhs, var);
            }
            if !base.contains_symbol(var) {
                // b^e = v  =>  e = ln(v) / ln(b), for b > 0
                if value_sign(base) != Some(Ordering::Greater) {
                    return Err(unsupported());
                }
                return match value_sign(&rhs) {
                    Some(Ordering::Greater) => {
                        let target = Expr::func(Func::Ln, rhs) / Expr::func(Func::Ln, (**base).clone());
                        isolate(exp, target, var)
                    }
                    _ => Ok(Vec::new()),
                };
            }
            Err(unsupported())
        }
        Expr::Func(f, arg) => isolate_func(*f, arg, rhs, var),
        _ => Err(unsupported()),
    }
}

fn isolate_power(base: &Expr, exp: &Expr, rhs: Expr, var: &Symbol) -> Result<Vec<Expr>, CasError> {
    let Some(e) = exp.as_number().cloned() else {
        return Err(CasError::unsupported(format!("symbolic exponent {}", exp)));
    };
    let sign = value_sign(&rhs);
    if sign == Some(Ordering::Equal) {
        return if e > BigRational::zero() {
            isolate(base, Expr::zero(), var)
        } else {
            Ok(Vec::new())
        };
    }
    let Some(sign) = sign else {
        return Ok(Vec::new());
    };
    let inverse = Expr::Number(e.recip());

    if e.is_integer() {
        if e.to_integer().is_even() {
            if sign == Ordering::Less {
                return Ok(Vec::new());
            }
            let r = Expr::pow(rhs, inverse);
            let mut out = isolate(base, r.clone(), var)?;
            out.extend(isolate(base, -r, var)?);
            return Ok(out);
        }
        // odd powers keep the sign: the real root of v is -(-v)^(1/n) for v < 0
        let r = if sign == Ordering::Less {
            -Expr::pow(-rhs, inverse)
        } else {
            Expr::pow(rhs, inverse)
        };
        return isolate(base, r, var);
    }

    if sign == Ordering::Less {
        return Ok(Vec::new());
    }
    isolate(base, Expr::pow(rhs, inverse), var)
}

fn isolate_func(f: Func, arg: &Expr, rhs: Expr, var: &Symbol) -> Result<Vec<Expr>, CasError> {
    let v = rhs.to_f64();
    let sign = value_sign(&rhs);
    let targets: Vec<Expr> = match f {
        Func::Exp => match sign {
            Some(Ordering::Greater) => vec![Expr::func(Func::Ln, rhs)],
            _ => Vec::new(),
        },
        Func::Ln => vec![Expr::func(Func::Exp, rhs)],
        Func::Abs => match sign {
            Some(Ordering::Greater) => vec![rhs.clone(), -rhs],
            Some(Ordering::Equal) => vec![rhs],
            _ => Vec::new(),
        },
        Func::Sin => {
            if !(v.abs() <= 1.0) {
                return Ok(Vec::new());
            }
            let a = Expr::func(Func::Asin, rhs);
            vec![a.clone(), Expr::pi() - a]
        }
        Func::Cos => {
            if !(v.abs() <= 1.0) {
                return Ok(Vec::new());
            }
            let a = Expr::func(Func::Acos, rhs);
            vec![a.clone(), Expr::int(2) * Expr::pi() - a]
        }
        Func::Tan => vec![Expr::func(Func::Atan, rhs)],
        Func::Asin => {
            if !(v.abs() <= std::f64::consts::FRAC_PI_2) {
                return Ok(Vec::new());
            }
            vec![Expr::func(Func::Sin, rhs)]
        }
        Func::Acos => {
            if !(0.0..=std::f64::consts::PI).contains(&v) {
                return Ok(Vec::new());
            }
            vec![Expr::func(Func::Cos, rhs)]
        }
        Func::Atan => {
            if !(v.abs() < std::f64::consts::FRAC_PI_2) {
                return Ok(Vec::new());
            }
            vec![Expr::func(Func::Tan, rhs)]
        }
    };

    let mut out = Vec::new();
    for t in targets {
        if matches!(t, Expr::Constant(Constant::Undefined)) {
            continue;
        }
        out.extend(isolate(arg, t, var)?);
    }
    Ok(out)
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

    fn strings(v: Vec<Expr>) -> Vec<String> {
        v.into_iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_solve_quadratic_with_rational_roots() {
        let f = Expr::pow(x(), Expr::int(2)) - Expr::int(4);
        assert_eq!(strings(solve(&f, &var()).unwrap()), vec!["-2", "2"]);
    }

    #[test]
    fn test_solve_irrational_quadratic() {
        let f = Expr::pow(x(), Expr::int(2)) - Expr::int(2);
        assert_eq!(strings(solve(&f, &var()).unwrap()), vec!["-sqrt(2)", "sqrt(2)"]);
    }

    #[test]
    fn test_complex_roots_come_last() {
        // (x - 1)(x^2 + 1)
        let f = (x() - Expr::one()) * (Expr::pow(x(), Expr::int(2)) + Expr::one());
        let roots = solve(&f, &var()).unwrap();
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0], Expr::one());
        assert!(roots[1].to_f64().is_nan());
    }

    #[test]
    fn test_repeated_roots_are_reported_once() {
        let f = Expr::pow(x() - Expr::int(3), Expr::int(2));
        assert_eq!(solve(&f, &var()).unwrap(), vec![Expr::int(3)]);
    }

    #[test]
    fn test_removable_root_is_dropped() {
        // (x^2 - 1)/(x - 1) = x + 1
        let f = (Expr::pow(x(), Expr::int(2)) - Expr::one()) / (x() - Expr::one());
        assert_eq!(solve(&f, &var()).unwrap(), vec![Expr::int(-1)]);
    }

    #[test]
    fn test_solve_biquadratic() {
        // x^4 - 5x^2 + 6 = (x^2 - 2)(x^2 - 3)
        let f = Expr::pow(x(), Expr::int(4)) - Expr::int(5) * Expr::pow(x(), Expr::int(2))
            + Expr::int(6);
        assert_eq!(solve(&f, &var()).unwrap().len(), 4);
    }

    #[test]
    fn test_pure_binomials_have_real_radical_roots() {
        let cube = Expr::pow(x(), Expr::int(3)) - Expr::int(2);
        let roots = solve(&cube, &var()).unwrap();
        assert_eq!(roots.len(), 1);
        assert!((roots[0].to_f64() - 2f64.cbrt()).abs() < 1e-12);

        let quartic = Expr::pow(x(), Expr::int(4)) - Expr::int(4);
        assert_eq!(strings(solve(&quartic, &var()).unwrap()), vec!["-sqrt(2)", "sqrt(2)"]);

        let no_real = Expr::pow(x(), Expr::int(4)) + Expr::int(1);
        assert!(solve(&no_real, &var()).unwrap().is_empty());
    }

    #[test]
    fn test_irreducible_cubic_is_unsupported() {
        let f = Expr::pow(x(), Expr::int(3)) - Expr::int(3) * x() + Expr::one();
        assert!(matches!(solve(&f, &var()), Err(CasError::Unsupported(_))));
    }

    #[test]
    fn test_exp_never_vanishes() {
        let f = Expr::func(Func::Exp, x());
        assert!(solve(&f, &var()).unwrap().is_empty());
    }

    #[test]
    fn test_product_rejects_undefined_roots() {
        // x * ln(x): x = 0 makes ln undefined
        let f = x() * Expr::func(Func::Ln, x());
        assert_eq!(solve(&f, &var()).unwrap(), vec![Expr::one()]);
    }

    #[test]
    fn test_sin_roots_match_principal_pair() {
        let f = Expr::func(Func::Sin, x());
        assert_eq!(strings(solve(&f, &var()).unwrap()), vec!["0", "pi"]);
    }

    #[test]
    fn test_common_factor_is_split_off() {
        // exp(-x) - x*exp(-x) = exp(-x) * (1 - x)
        let e = Expr::func(Func::Exp, -x());
        let f = e.clone() - x() * e;
        assert_eq!(solve(&f, &var()).unwrap(), vec![Expr::one()]);
    }

    #[test]
    fn test_exp_isolation() {
        let f = Expr::func(Func::Exp, x()) - Expr::int(2);
        assert_eq!(strings(solve(&f, &var()).unwrap()), vec!["ln(2)"]);
    }
}
