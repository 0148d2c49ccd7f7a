//! Exact quadratic surds `a + b*sqrt(d)`.
//!
//! Every root the solver produces has this shape, so rational functions can be
//! evaluated at those roots exactly in Q(sqrt(d)) instead of in floating point.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::expr::{extract_square, integer_root, rat_frac, Expr};
use crate::config::MAX_RADICAND_FACTOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surd {
    a: BigRational,
    b: BigRational,
    /// Radicand; zero exactly when `b` is zero.
    d: BigInt,
}

impl Surd {
    pub fn rational(a: BigRational) -> Self {
        Surd {
            a,
            b: BigRational::zero(),
            d: BigInt::zero(),
        }
    }

    /// `a + b*sqrt(d)`, pulling perfect-square factors of `d` into `b`.
    pub fn new(a: BigRational, b: BigRational, d: BigInt) -> Self {
        if b.is_zero() || d.is_zero() {
            return Surd::rational(a);
        }
        let negative = d.is_negative();
        let magnitude = d.abs();
        if let Some(root) = integer_root(&magnitude, 2) {
            if !negative {
                return Surd::rational(a + b * BigRational::from_integer(root));
            }
            return Surd {
                a,
                b: b * BigRational::from_integer(root),
                d: BigInt::from(-1),
            };
        }
        let (outside, inside) = match magnitude.to_u64() {
            Some(m) if m <= MAX_RADICAND_FACTOR => {
                let (o, i) = extract_square(m);
                (BigInt::from(o), BigInt::from(i))
            }
            _ => (BigInt::one(), magnitude),
        };
        Surd {
            a,
            b: b * BigRational::from_integer(outside),
            d: if negative { -inside } else { inside },
        }
    }

    /// `sqrt(q)` for a rational `q`.
    pub fn sqrt_of(q: &BigRational) -> Self {
        // sqrt(n/m) = sqrt(n*m)/m
        let radicand = q.numer() * q.denom();
        let scale = BigRational::new(BigInt::one(), q.denom().clone());
        Surd::new(BigRational::zero(), scale, radicand)
    }

    /// Both roots of `a*x^2 + b*x + c`.
    pub fn quadratic_roots(a: &BigRational, b: &BigRational, c: &BigRational) -> [Surd; 2] {
        let disc = b * b - BigRational::from_integer(BigInt::from(4)) * a * c;
        let two_a = a * BigRational::from_integer(BigInt::from(2));
        let root = Surd::sqrt_of(&disc);
        let center = -b / &two_a;
        let spread = root.b.clone() / &two_a;
        let lo = Surd::new(center.clone() + root.a.clone() * -BigRational::one() / &two_a,
            -spread.clone(), root.d.clone());
        let hi = Surd::new(center + root.a / &two_a, spread, root.d);
        [lo, hi]
    }

    pub fn is_rational(&self) -> bool {
        self.b.is_zero()
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        if self.is_rational() {
            Some(&self.a)
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        self.a.is_zero() && self.b.is_zero()
    }

    pub fn is_real(&self) -> bool {
        self.is_rational() || self.d.is_positive()
    }

    fn radicand_with(&self, other: &Surd) -> Option<BigInt> {
        match (self.is_rational(), other.is_rational()) {
            (true, true) => Some(BigInt::zero()),
            (false, true) => Some(self.d.clone()),
            (true, false) => Some(other.d.clone()),
            (false, false) if self.d == other.d => Some(self.d.clone()),
            _ => None,
        }
    }

    pub fn checked_add(&self, other: &Surd) -> Option<Surd> {
        let d = self.radicand_with(other)?;
        Some(Surd::new(&self.a + &other.a, &self.b + &other.b, d))
    }

    pub fn checked_mul(&self, other: &Surd) -> Option<Surd> {
        let d = self.radicand_with(other)?;
        let dr = BigRational::from_integer(d.clone());
        let a = &self.a * &other.a + &self.b * &other.b * dr;
        let b = &self.a * &other.b + &self.b * &other.a;
        Some(Surd::new(a, b, d))
    }

    pub fn neg(&self) -> Surd {
        Surd {
            a: -self.a.clone(),
            b: -self.b.clone(),
            d: self.d.clone(),
        }
    }

    pub fn add_rational(&self, q: &BigRational) -> Surd {
        Surd {
            a: &self.a + q,
            b: self.b.clone(),
            d: self.d.clone(),
        }
    }

    /// `1 / self` via the conjugate; `None` for zero.
    pub fn inverse(&self) -> Option<Surd> {
        if self.is_zero() {
            return None;
        }
        let dr = BigRational::from_integer(self.d.clone());
        let norm = &self.a * &self.a - &self.b * &self.b * dr;
        if norm.is_zero() {
            return None;
        }
        Some(Surd::new(&self.a / &norm, -&self.b / &norm, self.d.clone()))
    }

    /// Exact comparison with zero; `None` for non-real values.
    pub fn sign(&self) -> Option<Ordering> {
        if self.is_rational() {
            return Some(self.a.cmp(&BigRational::zero()));
        }
        if !self.d.is_positive() {
            return None;
        }
        let a_sign = self.a.cmp(&BigRational::zero());
        let b_sign = self.b.cmp(&BigRational::zero());
        if a_sign == Ordering::Equal || a_sign == b_sign {
            return Some(b_sign);
        }
        // Opposite signs: whichever of a^2 and b^2*d is larger wins.
        let a2 = &self.a * &self.a;
        let b2d = &self.b * &self.b * BigRational::from_integer(self.d.clone());
        Some(match a2.cmp(&b2d) {
            Ordering::Greater => a_sign,
            Ordering::Less => b_sign,
            Ordering::Equal => Ordering::Equal,
        })
    }

    pub fn to_f64(&self) -> Option<f64> {
        if !self.is_real() {
            return None;
        }
        let a = self.a.to_f64()?;
        if self.is_rational() {
            return Some(a);
        }
        Some(a + self.b.to_f64()? * self.d.to_f64()?.sqrt())
    }

    pub fn to_expr(&self) -> Expr {
        if self.is_rational() {
            return Expr::Number(self.a.clone());
        }
        let root = Expr::sqrt(Expr::Number(BigRational::from_integer(self.d.clone())));
        Expr::Number(self.a.clone()) + Expr::Number(self.b.clone()) * root
    }

    /// Recognizes the canonical forms produced by [`Surd::to_expr`].
    pub fn from_expr(expr: &Expr) -> Option<Surd> {
        match expr {
            Expr::Number(n) => Some(Surd::rational(n.clone())),
            Expr::Pow(..) => surd_term(expr).map(|(b, d)| Surd::new(BigRational::zero(), b, d)),
            Expr::Mul(_) => surd_term(expr).map(|(b, d)| Surd::new(BigRational::zero(), b, d)),
            Expr::Add(terms) => {
                let mut acc = Surd::rational(BigRational::zero());
                for t in terms {
                    acc = acc.checked_add(&Surd::from_expr(t)?)?;
                }
                Some(acc)
            }
            _ => None,
        }
    }
}

fn surd_term(expr: &Expr) -> Option<(BigRational, BigInt)> {
    match expr {
        Expr::Pow(base, exp) => {
            let d = base.as_number()?;
            if *exp.as_number()? != rat_frac(1, 2) || !d.is_integer() {
                return None;
            }
            Some((BigRational::one(), d.to_integer()))
        }
        Expr::Mul(factors) if factors.len() == 2 => {
            let b = factors[0].as_number()?.clone();
            let (one, d) = surd_term(&factors[1])?;
            Some((b * one, d))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::expr::rat;

    #[test]
    fn test_sqrt_of_perfect_square_is_rational() {
        let s = Surd::sqrt_of(&rat_frac(9, 4));
        assert_eq!(s.as_rational(), Some(&rat_frac(3, 2)));
    }

    #[test]
    fn test_quadratic_roots_of_x2_minus_2() {
        let [lo, hi] = Surd::quadratic_roots(&rat(1), &rat(0), &rat(-2));
        assert_eq!(lo.to_expr().to_string(), "-sqrt(2)");
        assert_eq!(hi.to_expr().to_string(), "sqrt(2)");
        assert_eq!(lo.sign(), Some(Ordering::Less));
    }

    #[test]
    fn test_negative_discriminant_is_not_real() {
        let [lo, hi] = Surd::quadratic_roots(&rat(1), &rat(0), &rat(1));
        assert!(!lo.is_real());
        assert!(!hi.is_real());
        assert_eq!(hi.sign(), None);
    }

    #[test]
    fn test_product_with_conjugate_is_rational() {
        let p = Surd::new(rat(1), rat(1), BigInt::from(2));
        let q = Surd::new(rat(1), rat(-1), BigInt::from(2));
        let prod = p.checked_mul(&q).unwrap();
        assert_eq!(prod.as_rational(), Some(&rat(-1)));
    }

    #[test]
    fn test_sign_of_mixed_terms() {
        // 1 - sqrt(2) < 0, 2 - sqrt(2) > 0
        let s = Surd::new(rat(1), rat(-1), BigInt::from(2));
        assert_eq!(s.sign(), Some(Ordering::Less));
        let s = Surd::new(rat(2), rat(-1), BigInt::from(2));
        assert_eq!(s.sign(), Some(Ordering::Greater));
    }

    #[test]
    fn test_expr_round_trip_for_golden_ratio() {
        let s = Surd::new(rat_frac(1, 2), rat_frac(1, 2), BigInt::from(5));
        let back = Surd::from_expr(&s.to_expr()).unwrap();
        assert_eq!(back, s);
        let inv = s.inverse().unwrap();
        assert_eq!(s.checked_mul(&inv).unwrap().as_rational(), Some(&rat(1)));
    }
}
