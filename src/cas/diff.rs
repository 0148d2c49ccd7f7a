//! Symbolic differentiation.

use super::expr::{Expr, Func, Symbol};
use crate::error::CasError;

/// d/d`var` of `expr`, using the power, product and chain rules.
pub fn derivative(expr: &Expr, var: &Symbol) -> Result<Expr, CasError> {
    if !expr.contains_symbol(var) {
        return Ok(Expr::zero());
    }
    let d = match expr {
        Expr::Symbol(s) => {
            if s == var {
                Expr::one()
            } else {
                Expr::zero()
            }
        }
        Expr::Number(_) | Expr::Constant(_) => Expr::zero(),
        Expr::Add(terms) => {
            let parts = terms
                .iter()
                .map(|t| derivative(t, var))
                .collect::<Result<Vec<_>, _>>()?;
            Expr::add(parts)
        }
        Expr::Mul(factors) => {
            let mut parts = Vec::with_capacity(factors.len());
            for (i, f) in factors.iter().enumerate() {
                if !f.contains_symbol(var) {
                    continue;
                }
                let mut term: Vec<Expr> = factors
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, g)| g.clone())
                    .collect();
                term.push(derivative(f, var)?);
                parts.push(Expr::mul(term));
            }
            Expr::add(parts)
        }
        Expr::Pow(base, exp) => {
            let b = (**base).clone();
            let e = (**exp).clone();
            if !e.contains_symbol(var) {
                // d(b^e) = e * b^(e-1) * b'
                let db = derivative(&b, var)?;
                e.clone() * Expr::pow(b, e - Expr::one()) * db
            } else if !b.contains_symbol(var) {
                // d(b^e) = b^e * ln(b) * e'
                let de = derivative(&e, var)?;
                expr.clone() * Expr::func(Func::Ln, b) * de
            } else {
                // d(b^e) = b^e * (e' ln b + e b'/b)
                let db = derivative(&b, var)?;
                let de = derivative(&e, var)?;
                expr.clone() * (de * Expr::func(Func::Ln, b.clone()) + e * db / b)
            }
        }
        Expr::Func(f, arg) => {
            let u = (**arg).clone();
            let du = derivative(&u, var)?;
            let outer = match f {
                Func::Sin => Expr::func(Func::Cos, u),
                Func::Cos => -Expr::func(Func::Sin, u),
                Func::Tan => Expr::one() + Expr::pow(Expr::func(Func::Tan, u), Expr::int(2)),
                Func::Asin => Expr::pow(Expr::one() - Expr::pow(u, Expr::int(2)), Expr::frac(-1, 2)),
                Func::Acos => -Expr::pow(Expr::one() - Expr::pow(u, Expr::int(2)), Expr::frac(-1, 2)),
                Func::Atan => (Expr::one() + Expr::pow(u, Expr::int(2))).recip(),
                Func::Exp => expr.clone(),
                Func::Ln => u.recip(),
                Func::Abs => u.clone() / Expr::func(Func::Abs, u),
            };
            outer * du
        }
        Expr::Limit(..) => {
            return Err(CasError::NotDifferentiable(expr.to_string()));
        }
    };
    Ok(d)
}

/// Repeated differentiation; order 0 returns the expression unchanged.
pub fn nth_derivative(expr: &Expr, var: &Symbol, order: u32) -> Result<Expr, CasError> {
    let mut current = expr.clone();
    for _ in 0..order {
        current = derivative(&current, var)?;
    }
    Ok(current)
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

    #[test]
    fn test_power_rule() {
        let f = Expr::pow(x(), Expr::int(3));
        assert_eq!(derivative(&f, &var()).unwrap(), Expr::int(3) * Expr::pow(x(), Expr::int(2)));
    }

    #[test]
    fn test_second_derivative_of_cubic() {
        let f = Expr::pow(x(), Expr::int(3));
        assert_eq!(nth_derivative(&f, &var(), 2).unwrap(), Expr::int(6) * x());
    }

    #[test]
    fn test_quotient_via_negative_power() {
        let f = Expr::one() / x();
        let d = derivative(&f, &var()).unwrap();
        assert_eq!(d, -Expr::pow(x(), Expr::int(-2)));
    }

    #[test]
    fn test_chain_rule_through_exp() {
        let f = Expr::func(Func::Exp, Expr::int(2) * x());
        let d = derivative(&f, &var()).unwrap();
        assert_eq!(d, Expr::int(2) * Expr::func(Func::Exp, Expr::int(2) * x()));
    }

    #[test]
    fn test_product_rule() {
        let f = x() * Expr::func(Func::Sin, x());
        let d = derivative(&f, &var()).unwrap();
        assert_eq!(d, Expr::func(Func::Sin, x()) + x() * Expr::func(Func::Cos, x()));
    }

    #[test]
    fn test_other_symbols_are_constants() {
        let f = Expr::symbol("a") * x();
        assert_eq!(derivative(&f, &var()).unwrap(), Expr::symbol("a"));
    }
}
