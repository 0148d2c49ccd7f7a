//! Dense univariate polynomials over the rationals and the rational functions
//! built from them.

use std::collections::BTreeSet;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use tracing::trace;

use super::expr::{Expr, Symbol};
use super::surd::Surd;
use crate::config::{MAX_DIVISOR_SEARCH, MAX_EXACT_POWER};

/// Coefficients are stored in ascending degree order, without trailing zeros.
/// The zero polynomial is `[0]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Poly {
    coeffs: Vec<BigRational>,
}

impl Poly {
    pub fn new(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.len() > 1 && coeffs.last().map_or(false, |c| c.is_zero()) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(BigRational::zero());
        }
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self::new(vec![BigRational::zero()])
    }

    pub fn one() -> Self {
        Self::new(vec![BigRational::one()])
    }

    pub fn constant(c: BigRational) -> Self {
        Self::new(vec![c])
    }

    pub fn x() -> Self {
        Self::new(vec![BigRational::zero(), BigRational::one()])
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_zero()
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.len() == 1
    }

    pub fn leading_coeff(&self) -> &BigRational {
        // `new` guarantees at least one coefficient
        &self.coeffs[self.coeffs.len() - 1]
    }

    pub fn coeff(&self, i: usize) -> BigRational {
        self.coeffs.get(i).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    /// Horner evaluation at a rational point.
    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut result = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            result = result * x + c;
        }
        result
    }

    /// Horner evaluation at a quadratic surd; exact.
    pub fn eval_surd(&self, x: &Surd) -> Option<Surd> {
        let mut result = Surd::rational(BigRational::zero());
        for c in self.coeffs.iter().rev() {
            result = result.checked_mul(x)?.add_rational(c);
        }
        Some(result)
    }

    pub fn add(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        Self::new((0..n).map(|i| self.coeff(i) + other.coeff(i)).collect())
    }

    pub fn sub(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        Self::new((0..n).map(|i| self.coeff(i) - other.coeff(i)).collect())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut out = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self::new(out)
    }

    pub fn scale(&self, c: &BigRational) -> Self {
        Self::new(self.coeffs.iter().map(|a| a * c).collect())
    }

    /// Square-and-multiply.
    pub fn pow(&self, n: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    pub fn derivative(&self) -> Self {
        if self.is_constant() {
            return Self::zero();
        }
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
                .collect(),
        )
    }

    /// Euclidean division. Panics never: a zero divisor yields `(0, self)`.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        if divisor.is_zero() || self.degree() < divisor.degree() {
            return (Self::zero(), self.clone());
        }
        let mut rem = self.coeffs.clone();
        let dd = divisor.degree();
        let lead = divisor.leading_coeff().clone();
        let mut quot = vec![BigRational::zero(); self.degree() - dd + 1];
        for k in (0..quot.len()).rev() {
            let c = &rem[k + dd] / &lead;
            if c.is_zero() {
                continue;
            }
            for (j, dc) in divisor.coeffs.iter().enumerate() {
                rem[k + j] -= &c * dc;
            }
            quot[k] = c;
        }
        rem.truncate(dd.max(1));
        (Self::new(quot), Self::new(rem))
    }

    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let inv = self.leading_coeff().recip();
        self.scale(&inv)
    }

    /// Monic greatest common divisor.
    pub fn gcd(a: &Self, b: &Self) -> Self {
        let mut a = a.clone();
        let mut b = b.clone();
        while !b.is_zero() {
            let (_, r) = a.div_rem(&b);
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Product of the distinct irreducible factors.
    pub fn square_free(&self) -> Self {
        if self.degree() < 2 {
            return self.monic();
        }
        let g = Self::gcd(self, &self.derivative());
        self.div_rem(&g).0.monic()
    }

    /// The same polynomial scaled to integer coefficients with unit content.
    fn primitive_integer_coeffs(&self) -> Vec<BigInt> {
        let lcm = self
            .coeffs
            .iter()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let ints: Vec<BigInt> = self
            .coeffs
            .iter()
            .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
            .collect();
        let content = ints.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
        if content.is_zero() || content.is_one() {
            return ints;
        }
        ints.into_iter().map(|c| c / &content).collect()
    }

    /// Distinct rational roots and the cofactor left after dividing them out.
    pub fn rational_roots(&self) -> (Vec<BigRational>, Poly) {
        let mut roots = Vec::new();
        let mut rest = self.clone();
        if rest.is_zero() || rest.is_constant() {
            return (roots, rest);
        }

        if rest.coeff(0).is_zero() {
            roots.push(BigRational::zero());
            while rest.degree() > 0 && rest.coeff(0).is_zero() {
                rest = Poly::new(rest.coeffs[1..].to_vec());
            }
        }

        if rest.degree() == 0 {
            return (roots, rest);
        }

        let ints = rest.primitive_integer_coeffs();
        let (Some(a0), Some(an)) = (ints.first(), ints.last()) else {
            return (roots, rest);
        };
        let (Some(ps), Some(qs)) = (divisors(a0), divisors(an)) else {
            trace!(degree = rest.degree(), "coefficients too large for rational-root search");
            return (roots, rest);
        };

        let mut candidates = BTreeSet::new();
        for p in &ps {
            for q in &qs {
                let c = BigRational::new(p.clone(), q.clone());
                candidates.insert(-c.clone());
                candidates.insert(c);
            }
        }

        for c in candidates {
            if rest.degree() == 0 {
                break;
            }
            if rest.eval(&c).is_zero() {
                let factor = Poly::new(vec![-c.clone(), BigRational::one()]);
                while rest.degree() > 0 && rest.eval(&c).is_zero() {
                    rest = rest.div_rem(&factor).0;
                }
                roots.push(c);
            }
        }
        (roots, rest)
    }

    /// Builds the polynomial from an expression in `var`; `None` when the
    /// expression is not a polynomial with rational coefficients.
    pub fn from_expr(expr: &Expr, var: &Symbol) -> Option<Poly> {
        let rf = RationalFunction::from_expr(expr, var)?;
        if !rf.den.is_constant() {
            return None;
        }
        Some(rf.num.scale(&rf.den.leading_coeff().recip()))
    }

    pub fn to_expr(&self, var: &Symbol) -> Expr {
        let x = Expr::Symbol(var.clone());
        let terms = self
            .coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| {
                Expr::Number(c.clone()) * Expr::pow(x.clone(), Expr::int(i as i64))
            })
            .collect();
        Expr::add(terms)
    }
}

/// Positive divisors of `|n|`, or `None` when `n` is too large to enumerate.
fn divisors(n: &BigInt) -> Option<Vec<BigInt>> {
    let m = n.abs().to_u64()?;
    if m == 0 || m > MAX_DIVISOR_SEARCH {
        return None;
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1u64;
    while d * d <= m {
        if m % d == 0 {
            small.push(BigInt::from(d));
            if d * d != m {
                large.push(BigInt::from(m / d));
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    Some(small)
}

// =============================================================================
// RATIONAL FUNCTIONS
// =============================================================================

/// `num / den` in lowest terms with a monic denominator.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RationalFunction {
    pub num: Poly,
    pub den: Poly,
}

impl RationalFunction {
    pub fn new(num: Poly, den: Poly) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        let g = Poly::gcd(&num, &den);
        let (num, den) = if g.is_constant() {
            (num, den)
        } else {
            (num.div_rem(&g).0, den.div_rem(&g).0)
        };
        let lead = den.leading_coeff().recip();
        Some(Self {
            num: num.scale(&lead),
            den: den.scale(&lead),
        })
    }

    pub fn from_poly(p: Poly) -> Self {
        Self {
            num: p,
            den: Poly::one(),
        }
    }

    pub fn is_polynomial(&self) -> bool {
        self.den.is_constant()
    }

    pub fn from_expr(expr: &Expr, var: &Symbol) -> Option<Self> {
        match expr {
            Expr::Number(n) => Some(Self::from_poly(Poly::constant(n.clone()))),
            Expr::Symbol(s) if s == var => Some(Self::from_poly(Poly::x())),
            Expr::Add(terms) => {
                let mut acc = Self::from_poly(Poly::zero());
                for t in terms {
                    acc = acc.add(&Self::from_expr(t, var)?)?;
                }
                Some(acc)
            }
            Expr::Mul(factors) => {
                let mut acc = Self::from_poly(Poly::one());
                for f in factors {
                    acc = acc.mul(&Self::from_expr(f, var)?)?;
                }
                Some(acc)
            }
            Expr::Pow(base, exp) => {
                let n = exp.as_number()?;
                if !n.is_integer() {
                    return None;
                }
                let k = n.to_integer().to_i64()?;
                if k.unsigned_abs() > u64::from(MAX_EXACT_POWER) {
                    return None;
                }
                let b = Self::from_expr(base, var)?;
                let k_abs = k.unsigned_abs() as u32;
                let (num, den) = (b.num.pow(k_abs), b.den.pow(k_abs));
                if k < 0 {
                    Self::new(den, num)
                } else {
                    Self::new(num, den)
                }
            }
            _ => None,
        }
    }

    pub fn add(&self, other: &Self) -> Option<Self> {
        let num = self.num.mul(&other.den).add(&other.num.mul(&self.den));
        Self::new(num, self.den.mul(&other.den))
    }

    pub fn mul(&self, other: &Self) -> Option<Self> {
        Self::new(self.num.mul(&other.num), self.den.mul(&other.den))
    }

    /// Exact value at a surd; `None` at a pole or for mixed radicands.
    pub fn eval_surd(&self, x: &Surd) -> Option<Surd> {
        let n = self.num.eval_surd(x)?;
        let d = self.den.eval_surd(x)?;
        n.checked_mul(&d.inverse()?)
    }

    pub fn to_expr(&self, var: &Symbol) -> Expr {
        let n = self.num.to_expr(var);
        if self.den.is_constant() && self.den.coeff(0).is_one() {
            return n;
        }
        n / self.den.to_expr(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::expr::rat;

    fn p(coeffs: &[i64]) -> Poly {
        Poly::new(coeffs.iter().map(|c| rat(*c)).collect())
    }

    #[test]
    fn test_div_rem_exact() {
        // (x^2 - 1) / (x - 1) = x + 1
        let (q, r) = p(&[-1, 0, 1]).div_rem(&p(&[-1, 1]));
        assert_eq!(q, p(&[1, 1]));
        assert!(r.is_zero());
    }

    #[test]
    fn test_gcd_is_monic() {
        let a = p(&[-2, 2]).mul(&p(&[3, 1]));
        let b = p(&[-1, 1]).mul(&p(&[5, 1]));
        assert_eq!(Poly::gcd(&a, &b), p(&[-1, 1]));
    }

    #[test]
    fn test_square_free_removes_repeated_factors() {
        let sq = p(&[-1, 1]).pow(3).mul(&p(&[2, 1]));
        assert_eq!(sq.square_free(), p(&[-1, 1]).mul(&p(&[2, 1])));
    }

    #[test]
    fn test_rational_roots_of_cubic() {
        // 2x^3 - 3x^2 - 3x + 2 = (x - 2)(2x - 1)(x + 1)
        let (roots, rest) = p(&[2, -3, -3, 2]).rational_roots();
        let mut roots = roots;
        roots.sort();
        assert_eq!(roots, vec![rat(-1), BigRational::new(1.into(), 2.into()), rat(2)]);
        assert_eq!(rest.degree(), 0);
    }

    #[test]
    fn test_rational_roots_leaves_irreducible_cofactor() {
        // x^3 - 2x = x (x^2 - 2)
        let (roots, rest) = p(&[0, -2, 0, 1]).rational_roots();
        assert_eq!(roots, vec![rat(0)]);
        assert_eq!(rest, p(&[-2, 0, 1]));
    }

    #[test]
    fn test_rational_function_cancels_common_factor() {
        let x = Symbol::new("x");
        let e = (Expr::pow(Expr::Symbol(x.clone()), Expr::int(2)) - Expr::one())
            / (Expr::Symbol(x.clone()) - Expr::one());
        let rf = RationalFunction::from_expr(&e, &x).unwrap();
        assert!(rf.is_polynomial());
        assert_eq!(rf.num, p(&[1, 1]));
    }

    #[test]
    fn test_non_polynomial_is_rejected() {
        let x = Symbol::new("x");
        let e = Expr::sqrt(Expr::Symbol(x.clone()));
        assert!(RationalFunction::from_expr(&e, &x).is_none());
        assert!(Poly::from_expr(&(Expr::one() / Expr::Symbol(x.clone())), &x).is_none());
    }
}
