//! Expression tree for the built-in symbolic engine.
//!
//! Every constructor canonicalizes its result: sums and products are
//! flattened and sorted, exact rationals are folded, like terms and like
//! powers are collected. Two expressions that denote the same canonical value
//! therefore compare equal with `==`, which is what the analysis layer relies
//! on for its set semantics.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::backend::LimitTarget;
use crate::config::{MAX_EXACT_POWER, MAX_RADICAND_FACTOR};

// =============================================================================
// ATOMS
// =============================================================================

/// A named symbol such as `x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    Infinity,
    NegInfinity,
    /// Complex infinity or an indeterminate value (`1/0`, `0/0`, `oo - oo`).
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Ln,
    Abs,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Abs => "abs",
        }
    }

    pub fn from_name(name: &str) -> Option<Func> {
        let f = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" | "arcsin" => Func::Asin,
            "acos" | "arccos" => Func::Acos,
            "atan" | "arctan" => Func::Atan,
            "exp" => Func::Exp,
            "ln" | "log" => Func::Ln,
            "abs" => Func::Abs,
            _ => return None,
        };
        Some(f)
    }

    fn apply_f64(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Exp => v.exp(),
            Func::Ln => {
                if v == 0.0 {
                    f64::NAN
                } else {
                    v.ln()
                }
            }
            Func::Abs => v.abs(),
        }
    }
}

// =============================================================================
// EXPRESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    Number(BigRational),
    Symbol(Symbol),
    Constant(Constant),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Func(Func, Box<Expr>),
    /// A limit the engine could not resolve.
    Limit(Box<Expr>, Symbol, Box<LimitTarget<Expr>>),
}

pub(crate) fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

pub(crate) fn rat_frac(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

impl Expr {
    pub fn int(n: i64) -> Expr {
        Expr::Number(rat(n))
    }

    pub fn frac(n: i64, d: i64) -> Expr {
        Expr::Number(rat_frac(n, d))
    }

    pub fn zero() -> Expr {
        Expr::int(0)
    }

    pub fn one() -> Expr {
        Expr::int(1)
    }

    pub fn symbol(name: &str) -> Expr {
        Expr::Symbol(Symbol::new(name))
    }

    pub fn pi() -> Expr {
        Expr::Constant(Constant::Pi)
    }

    pub fn infinity() -> Expr {
        Expr::Constant(Constant::Infinity)
    }

    pub fn neg_infinity() -> Expr {
        Expr::Constant(Constant::NegInfinity)
    }

    pub fn undefined() -> Expr {
        Expr::Constant(Constant::Undefined)
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_one())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Expr::Constant(Constant::Undefined))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(
            self,
            Expr::Constant(Constant::Infinity) | Expr::Constant(Constant::NegInfinity)
        )
    }

    pub fn contains_symbol(&self, sym: &Symbol) -> bool {
        match self {
            Expr::Symbol(s) => s == sym,
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| e.contains_symbol(sym)),
            Expr::Pow(b, e) => b.contains_symbol(sym) || e.contains_symbol(sym),
            Expr::Func(_, a) => a.contains_symbol(sym),
            Expr::Limit(..) => self.free_symbols().contains(sym),
        }
    }

    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Symbol(s) => {
                out.insert(s.clone());
            }
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Add(items) | Expr::Mul(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Pow(b, e) => {
                b.collect_symbols(out);
                e.collect_symbols(out);
            }
            Expr::Func(_, a) => a.collect_symbols(out),
            Expr::Limit(inner, var, target) => {
                let mut inner_syms = BTreeSet::new();
                inner.collect_symbols(&mut inner_syms);
                inner_syms.remove(var);
                out.extend(inner_syms);
                if let LimitTarget::Point(p) = target.as_ref() {
                    p.collect_symbols(out);
                }
            }
        }
    }

    /// True for expressions with no free symbols and no unresolved limit.
    pub fn is_constant(&self) -> bool {
        !self.has_residual() && self.free_symbols().is_empty()
    }

    pub fn has_residual(&self) -> bool {
        match self {
            Expr::Limit(..) => true,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(Expr::has_residual),
            Expr::Pow(b, e) => b.has_residual() || e.has_residual(),
            Expr::Func(_, a) => a.has_residual(),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Canonicalizing constructors
    // -------------------------------------------------------------------------

    pub fn add(terms: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(terms.len());
        for t in terms {
            match t {
                Expr::Add(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        let mut constant = BigRational::zero();
        let mut pos_inf = false;
        let mut neg_inf = false;
        let mut collected: BTreeMap<Expr, BigRational> = BTreeMap::new();

        for t in flat {
            match t {
                Expr::Number(n) => constant += n,
                Expr::Constant(Constant::Undefined) => return Expr::undefined(),
                Expr::Constant(Constant::Infinity) => pos_inf = true,
                Expr::Constant(Constant::NegInfinity) => neg_inf = true,
                other => {
                    let (coeff, rest) = split_coeff(&other);
                    *collected.entry(rest).or_insert_with(BigRational::zero) += coeff;
                }
            }
        }

        if pos_inf && neg_inf {
            return Expr::undefined();
        }

        let mut out: Vec<Expr> = collected
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(rest, c)| Expr::mul(vec![Expr::Number(c), rest]))
            .collect();

        if pos_inf || neg_inf {
            if out.iter().all(Expr::is_constant) {
                return if pos_inf { Expr::infinity() } else { Expr::neg_infinity() };
            }
            out.push(if pos_inf { Expr::infinity() } else { Expr::neg_infinity() });
        } else if !constant.is_zero() {
            out.push(Expr::Number(constant));
        }

        match out.len() {
            0 => Expr::zero(),
            1 => out.pop().unwrap_or_else(Expr::zero),
            _ => {
                out.sort();
                Expr::Add(out)
            }
        }
    }

    pub fn mul(factors: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(factors.len());
        for f in factors {
            match f {
                Expr::Mul(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        let mut coeff = BigRational::one();
        let mut infinities: Vec<bool> = Vec::new();
        let mut powers: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();

        for f in flat {
            match f {
                Expr::Number(n) => coeff *= n,
                Expr::Constant(Constant::Undefined) => return Expr::undefined(),
                Expr::Constant(Constant::Infinity) => infinities.push(true),
                Expr::Constant(Constant::NegInfinity) => infinities.push(false),
                other => {
                    let (base, exp) = base_exp(other);
                    powers.entry(base).or_default().push(exp);
                }
            }
        }

        if coeff.is_zero() {
            return if infinities.is_empty() { Expr::zero() } else { Expr::undefined() };
        }

        let mut rest = Vec::with_capacity(powers.len());
        let mut needs_pass = false;
        for (base, exps) in powers {
            let exp = if exps.len() == 1 {
                exps.into_iter().next().unwrap_or_else(Expr::one)
            } else {
                Expr::add(exps)
            };
            let combined = Expr::pow(base, exp);
            match combined {
                Expr::Number(n) => coeff *= n,
                Expr::Mul(_) => {
                    needs_pass = true;
                    rest.push(combined);
                }
                Expr::Constant(Constant::Undefined) => return Expr::undefined(),
                Expr::Constant(Constant::Infinity) => infinities.push(true),
                Expr::Constant(Constant::NegInfinity) => infinities.push(false),
                other => rest.push(other),
            }
        }

        if coeff.is_zero() {
            return if infinities.is_empty() { Expr::zero() } else { Expr::undefined() };
        }

        if needs_pass {
            rest.push(Expr::Number(coeff));
            for pos in infinities {
                rest.push(if pos { Expr::infinity() } else { Expr::neg_infinity() });
            }
            return Expr::mul(rest);
        }

        if !infinities.is_empty() {
            let negatives = infinities.iter().filter(|p| !**p).count();
            let mut positive = coeff.is_positive() == (negatives % 2 == 0);
            if rest.iter().all(Expr::is_constant) {
                let tail = Expr::Mul(rest.clone()).to_f64();
                if rest.is_empty() || tail > 0.0 {
                    return if positive { Expr::infinity() } else { Expr::neg_infinity() };
                }
                if tail < 0.0 {
                    positive = !positive;
                    return if positive { Expr::infinity() } else { Expr::neg_infinity() };
                }
                return Expr::undefined();
            }
            rest.push(if positive { Expr::infinity() } else { Expr::neg_infinity() });
            coeff = BigRational::one();
        }

        if !coeff.is_one() && rest.len() == 1 {
            if let Expr::Add(terms) = &rest[0] {
                let terms = terms
                    .iter()
                    .map(|t| Expr::mul(vec![Expr::Number(coeff.clone()), t.clone()]))
                    .collect();
                return Expr::add(terms);
            }
        }

        rest.sort();
        if !coeff.is_one() {
            rest.insert(0, Expr::Number(coeff));
        }
        match rest.len() {
            0 => Expr::one(),
            1 => rest.pop().unwrap_or_else(Expr::one),
            _ => Expr::Mul(rest),
        }
    }

    pub fn pow(base: Expr, exp: Expr) -> Expr {
        if base.is_undefined() || exp.is_undefined() {
            return Expr::undefined();
        }
        if exp.is_zero() {
            return Expr::one();
        }
        if exp.is_one() {
            return base;
        }
        if base.is_one() && !exp.is_infinite() {
            return Expr::one();
        }
        if base == Expr::Constant(Constant::E) {
            return Expr::func(Func::Exp, exp);
        }

        match (&base, &exp) {
            (Expr::Number(b), Expr::Number(e)) => {
                if e.is_integer() {
                    if let Some(n) = e.to_integer().to_i64() {
                        if let Some(v) = rational_powi(b, n) {
                            return v;
                        }
                    }
                    return Expr::Pow(Box::new(base), Box::new(exp));
                }
                return number_root(b, e);
            }
            (Expr::Constant(Constant::Infinity), Expr::Number(e)) => {
                return if e.is_positive() { Expr::infinity() } else { Expr::zero() };
            }
            (Expr::Constant(Constant::NegInfinity), Expr::Number(e)) => {
                if e.is_negative() {
                    return Expr::zero();
                }
                if e.is_integer() {
                    let odd = e.to_integer().is_odd();
                    return if odd { Expr::neg_infinity() } else { Expr::infinity() };
                }
                return Expr::undefined();
            }
            (Expr::Pow(inner_b, inner_e), Expr::Number(e)) if e.is_integer() => {
                let combined = Expr::mul(vec![(**inner_e).clone(), exp.clone()]);
                return Expr::pow((**inner_b).clone(), combined);
            }
            (Expr::Func(Func::Exp, arg), Expr::Number(e)) if e.is_integer() => {
                return Expr::func(Func::Exp, Expr::mul(vec![(**arg).clone(), exp.clone()]));
            }
            (Expr::Mul(factors), Expr::Number(e)) if e.is_integer() => {
                let parts = factors
                    .iter()
                    .map(|f| Expr::pow(f.clone(), exp.clone()))
                    .collect();
                return Expr::mul(parts);
            }
            _ => {}
        }

        Expr::Pow(Box::new(base), Box::new(exp))
    }

    pub fn func(f: Func, arg: Expr) -> Expr {
        if arg.is_undefined() {
            return Expr::undefined();
        }
        match f {
            Func::Exp => {
                if arg.is_zero() {
                    return Expr::one();
                }
                if arg.is_one() {
                    return Expr::Constant(Constant::E);
                }
                match &arg {
                    Expr::Func(Func::Ln, inner) => return (**inner).clone(),
                    Expr::Constant(Constant::Infinity) => return Expr::infinity(),
                    Expr::Constant(Constant::NegInfinity) => return Expr::zero(),
                    _ => {}
                }
            }
            Func::Ln => {
                if arg.is_one() {
                    return Expr::zero();
                }
                if arg.is_zero() {
                    return Expr::undefined();
                }
                match &arg {
                    Expr::Constant(Constant::E) => return Expr::one(),
                    Expr::Constant(Constant::Infinity) => return Expr::infinity(),
                    Expr::Func(Func::Exp, inner) => return (**inner).clone(),
                    _ => {}
                }
            }
            Func::Sin | Func::Cos | Func::Tan => {
                if let Some(v) = trig_at_pi_multiple(f, &arg) {
                    return v;
                }
            }
            Func::Asin => {
                if let Some(n) = arg.as_number() {
                    if n.is_zero() {
                        return Expr::zero();
                    }
                    if n.abs().is_one() {
                        return Expr::mul(vec![Expr::Number(n / rat(2)), Expr::pi()]);
                    }
                }
            }
            Func::Acos => {
                if let Some(n) = arg.as_number() {
                    if n.is_one() {
                        return Expr::zero();
                    }
                    if n.is_zero() {
                        return Expr::mul(vec![Expr::frac(1, 2), Expr::pi()]);
                    }
                    if *n == rat(-1) {
                        return Expr::pi();
                    }
                }
            }
            Func::Atan => {
                if arg.is_zero() {
                    return Expr::zero();
                }
                if arg.is_one() {
                    return Expr::mul(vec![Expr::frac(1, 4), Expr::pi()]);
                }
                match &arg {
                    Expr::Constant(Constant::Infinity) => {
                        return Expr::mul(vec![Expr::frac(1, 2), Expr::pi()])
                    }
                    Expr::Constant(Constant::NegInfinity) => {
                        return Expr::mul(vec![Expr::frac(-1, 2), Expr::pi()])
                    }
                    _ => {}
                }
            }
            Func::Abs => match &arg {
                Expr::Number(n) => return Expr::Number(n.abs()),
                Expr::Constant(Constant::Infinity) | Expr::Constant(Constant::NegInfinity) => {
                    return Expr::infinity()
                }
                Expr::Func(Func::Abs, _) => return arg,
                _ if arg.is_constant() => {
                    let v = arg.to_f64();
                    if v > 1e-9 {
                        return arg;
                    }
                    if v < -1e-9 {
                        return -arg;
                    }
                }
                _ => {}
            },
        }
        Expr::Func(f, Box::new(arg))
    }

    pub fn sqrt(arg: Expr) -> Expr {
        Expr::pow(arg, Expr::frac(1, 2))
    }

    pub fn recip(self) -> Expr {
        Expr::pow(self, Expr::int(-1))
    }

    /// Splits into `(numerator, denominator)` over a common denominator.
    pub fn as_numer_denom(&self) -> (Expr, Expr) {
        match self {
            Expr::Number(n) => (
                Expr::Number(BigRational::from_integer(n.numer().clone())),
                Expr::Number(BigRational::from_integer(n.denom().clone())),
            ),
            Expr::Pow(b, e) => match e.as_number() {
                Some(n) if n.is_negative() => {
                    (Expr::one(), Expr::pow((**b).clone(), Expr::Number(-n.clone())))
                }
                _ => (self.clone(), Expr::one()),
            },
            Expr::Mul(factors) => {
                let mut nums = Vec::with_capacity(factors.len());
                let mut dens = Vec::new();
                for f in factors {
                    let (n, d) = f.as_numer_denom();
                    nums.push(n);
                    dens.push(d);
                }
                (Expr::mul(nums), Expr::mul(dens))
            }
            Expr::Add(terms) => {
                let mut acc_n = Expr::zero();
                let mut acc_d = Expr::one();
                for t in terms {
                    let (n, d) = t.as_numer_denom();
                    if d == acc_d {
                        acc_n = Expr::add(vec![acc_n, n]);
                    } else if d.is_one() {
                        acc_n = Expr::add(vec![acc_n, Expr::mul(vec![n, acc_d.clone()])]);
                    } else {
                        acc_n = Expr::add(vec![
                            Expr::mul(vec![acc_n, d.clone()]),
                            Expr::mul(vec![n, acc_d.clone()]),
                        ]);
                        acc_d = Expr::mul(vec![acc_d, d]);
                    }
                }
                (acc_n, acc_d)
            }
            _ => (self.clone(), Expr::one()),
        }
    }

    /// Replaces every occurrence of `var` with `value`, re-canonicalizing.
    pub fn subs(&self, var: &Symbol, value: &Expr) -> Expr {
        match self {
            Expr::Symbol(s) if s == var => value.clone(),
            Expr::Number(_) | Expr::Symbol(_) | Expr::Constant(_) => self.clone(),
            Expr::Add(terms) => Expr::add(terms.iter().map(|t| t.subs(var, value)).collect()),
            Expr::Mul(factors) => Expr::mul(factors.iter().map(|f| f.subs(var, value)).collect()),
            Expr::Pow(b, e) => Expr::pow(b.subs(var, value), e.subs(var, value)),
            Expr::Func(f, a) => Expr::func(*f, a.subs(var, value)),
            Expr::Limit(inner, bound, target) => {
                if bound == var {
                    return self.clone();
                }
                let target = match target.as_ref() {
                    LimitTarget::Point(p) => LimitTarget::Point(p.subs(var, value)),
                    other => other.clone(),
                };
                Expr::Limit(Box::new(inner.subs(var, value)), bound.clone(), Box::new(target))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Numeric evaluation
    // -------------------------------------------------------------------------

    /// Floating-point value; NaN when undefined, non-real or symbolic.
    pub fn to_f64(&self) -> f64 {
        self.eval_f64(None)
    }

    pub fn eval_f64(&self, binding: Option<(&Symbol, f64)>) -> f64 {
        match self {
            Expr::Number(n) => n.to_f64().unwrap_or(f64::NAN),
            Expr::Symbol(s) => match binding {
                Some((var, v)) if var == s => v,
                _ => f64::NAN,
            },
            Expr::Constant(c) => match c {
                Constant::Pi => std::f64::consts::PI,
                Constant::E => std::f64::consts::E,
                Constant::Infinity => f64::INFINITY,
                Constant::NegInfinity => f64::NEG_INFINITY,
                Constant::Undefined => f64::NAN,
            },
            Expr::Add(terms) => terms.iter().map(|t| t.eval_f64(binding)).sum(),
            Expr::Mul(factors) => factors.iter().map(|f| f.eval_f64(binding)).product(),
            Expr::Pow(b, e) => {
                let base = b.eval_f64(binding);
                match e.as_number() {
                    Some(n) if *n == rat_frac(1, 2) => base.sqrt(),
                    Some(n) if n.is_integer() => match n.to_integer().to_i32() {
                        Some(k) => base.powi(k),
                        None => base.powf(n.to_f64().unwrap_or(f64::NAN)),
                    },
                    _ => base.powf(e.eval_f64(binding)),
                }
            }
            Expr::Func(f, a) => f.apply_f64(a.eval_f64(binding)),
            Expr::Limit(..) => f64::NAN,
        }
    }
}

// =============================================================================
// CANONICALIZATION HELPERS
// =============================================================================

fn split_coeff(term: &Expr) -> (BigRational, Expr) {
    if let Expr::Mul(factors) = term {
        if let Some(Expr::Number(n)) = factors.first() {
            let rest = if factors.len() == 2 {
                factors[1].clone()
            } else {
                Expr::Mul(factors[1..].to_vec())
            };
            return (n.clone(), rest);
        }
    }
    (BigRational::one(), term.clone())
}

fn base_exp(factor: Expr) -> (Expr, Expr) {
    match factor {
        Expr::Pow(b, e) => (*b, *e),
        Expr::Func(Func::Exp, arg) => (Expr::Constant(Constant::E), *arg),
        other => (other, Expr::one()),
    }
}

fn rational_powi(base: &BigRational, n: i64) -> Option<Expr> {
    if base.is_zero() {
        return Some(if n < 0 { Expr::undefined() } else { Expr::zero() });
    }
    if base.is_one() {
        return Some(Expr::one());
    }
    if (-base.clone()).is_one() {
        return Some(if n.is_even() { Expr::one() } else { Expr::int(-1) });
    }
    if n.unsigned_abs() > u64::from(MAX_EXACT_POWER) {
        return None;
    }
    let magnitude = num_traits::pow(base.clone(), n.unsigned_abs() as usize);
    Some(Expr::Number(if n < 0 { magnitude.recip() } else { magnitude }))
}

/// `b^(p/q)` for a rational `b` and a non-integer exponent.
fn number_root(b: &BigRational, e: &BigRational) -> Expr {
    let raw = || Expr::Pow(Box::new(Expr::Number(b.clone())), Box::new(Expr::Number(e.clone())));
    if b.is_zero() {
        return if e.is_positive() { Expr::zero() } else { Expr::undefined() };
    }
    if b.is_negative() {
        return raw();
    }
    let q = match e.denom().to_u32() {
        Some(q) => q,
        None => return raw(),
    };
    let p = match e.numer().to_i64() {
        Some(p) => p,
        None => return raw(),
    };

    if let (Some(rn), Some(rd)) = (integer_root(b.numer(), q), integer_root(b.denom(), q)) {
        let root = BigRational::new(rn, rd);
        return rational_powi(&root, p).unwrap_or_else(raw);
    }

    if q % 2 == 0 {
        // 4^(1/4) = 2^(1/2)
        if let (Some(rn), Some(rd)) = (integer_root(b.numer(), 2), integer_root(b.denom(), 2)) {
            let halved = e * BigRational::from_integer(BigInt::from(2));
            return Expr::pow(Expr::Number(BigRational::new(rn, rd)), Expr::Number(halved));
        }
    }
    if q != 2 {
        return raw();
    }

    // b^(p/2) = b^k * sqrt(b) with p = 2k + 1, and sqrt(n/d) = sqrt(n*d)/d.
    let k = Integer::div_floor(&(p - 1), &2);
    let radicand = b.numer() * b.denom();
    let (outside, inside) = match radicand.to_u64() {
        Some(m) if m <= MAX_RADICAND_FACTOR => extract_square(m),
        _ => return raw(),
    };
    let scale = BigRational::new(BigInt::from(outside), b.denom().clone());
    let head = match rational_powi(b, k) {
        Some(Expr::Number(h)) => h,
        _ => return raw(),
    };
    let coeff = head * scale;
    if inside == 1 {
        return Expr::Number(coeff);
    }
    let surd = Expr::Pow(
        Box::new(Expr::Number(BigRational::from_integer(BigInt::from(inside)))),
        Box::new(Expr::frac(1, 2)),
    );
    // Built raw: `mul` would route the surd back through `pow`.
    if coeff.is_one() {
        surd
    } else {
        Expr::Mul(vec![Expr::Number(coeff), surd])
    }
}

/// Exact integer `q`-th root of a non-negative integer, if it exists.
pub(crate) fn integer_root(n: &BigInt, q: u32) -> Option<BigInt> {
    if n.is_negative() {
        return None;
    }
    if n.is_zero() || n.is_one() {
        return Some(n.clone());
    }
    let approx = n.to_f64()?.powf(1.0 / f64::from(q)).round();
    if !approx.is_finite() {
        return None;
    }
    let guess = BigInt::from(approx as u64);
    for candidate in [guess.clone() - 1, guess.clone(), guess + 1] {
        if candidate.is_positive() && candidate.pow(q) == *n {
            return Some(candidate);
        }
    }
    None
}

/// Writes `m = outside^2 * inside` with `inside` square-free.
pub(crate) fn extract_square(mut m: u64) -> (u64, u64) {
    let mut outside = 1u64;
    let mut inside = 1u64;
    let mut p = 2u64;
    while p * p <= m {
        let mut count = 0;
        while m % p == 0 {
            m /= p;
            count += 1;
        }
        outside *= p.pow(count / 2);
        if count % 2 == 1 {
            inside *= p;
        }
        p += 1;
    }
    inside *= m;
    (outside, inside)
}

/// Rational multiple of pi, if `arg` is one.
pub(crate) fn pi_multiple(arg: &Expr) -> Option<BigRational> {
    match arg {
        Expr::Number(n) if n.is_zero() => Some(BigRational::zero()),
        Expr::Constant(Constant::Pi) => Some(BigRational::one()),
        Expr::Mul(factors) if factors.len() == 2 => match (&factors[0], &factors[1]) {
            (Expr::Number(k), Expr::Constant(Constant::Pi)) => Some(k.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn trig_at_pi_multiple(f: Func, arg: &Expr) -> Option<Expr> {
    let k = pi_multiple(arg)?;
    let twice = &k * rat(2);
    if k.is_integer() {
        let odd = k.to_integer().is_odd();
        return Some(match f {
            Func::Sin | Func::Tan => Expr::zero(),
            _ => Expr::int(if odd { -1 } else { 1 }),
        });
    }
    if twice.is_integer() {
        // k = m + 1/2: sin = (-1)^m, cos = 0, tan undefined
        let m = (k - rat_frac(1, 2)).to_integer();
        return Some(match f {
            Func::Sin => Expr::int(if m.is_odd() { -1 } else { 1 }),
            Func::Cos => Expr::zero(),
            _ => Expr::undefined(),
        });
    }
    None
}

// =============================================================================
// OPERATORS
// =============================================================================

impl ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::add(vec![self, rhs])
    }
}

impl ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::add(vec![self, -rhs])
    }
}

impl ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul(vec![self, rhs])
    }
}

impl ops::Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::mul(vec![self, rhs.recip()])
    }
}

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::mul(vec![Expr::int(-1), self])
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::int(n)
    }
}

impl From<BigRational> for Expr {
    fn from(n: BigRational) -> Self {
        Expr::Number(n)
    }
}

// =============================================================================
// DISPLAY
// =============================================================================

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

fn precedence(e: &Expr) -> u8 {
    match e {
        Expr::Add(_) => PREC_ADD,
        Expr::Mul(_) => PREC_MUL,
        Expr::Number(n) if !n.is_integer() || n.is_negative() => PREC_MUL,
        Expr::Pow(_, exp) if is_sqrt_exponent(exp) => PREC_ATOM,
        Expr::Pow(_, _) => PREC_POW,
        Expr::Constant(Constant::NegInfinity) => PREC_MUL,
        _ => PREC_ATOM,
    }
}

fn is_sqrt_exponent(exp: &Expr) -> bool {
    matches!(exp.as_number(), Some(n) if *n == rat_frac(1, 2))
}

/// Rough degree used only to order terms for printing (`x^2 + x + 1`).
fn display_degree(e: &Expr) -> BigRational {
    match e {
        Expr::Number(_) | Expr::Constant(_) => BigRational::zero(),
        Expr::Symbol(_) => BigRational::one(),
        Expr::Pow(b, exp) => match exp.as_number() {
            Some(n) => display_degree(b) * n,
            None => BigRational::one(),
        },
        Expr::Mul(fs) => fs.iter().map(display_degree).fold(BigRational::zero(), |a, b| a + b),
        Expr::Add(ts) => ts.iter().map(display_degree).max().unwrap_or_else(BigRational::zero),
        Expr::Func(..) | Expr::Limit(..) => BigRational::one(),
    }
}

fn wrap(f: &mut fmt::Formatter, e: &Expr, min_prec: u8) -> fmt::Result {
    if precedence(e) < min_prec {
        write!(f, "({})", e)
    } else {
        write!(f, "{}", e)
    }
}

fn is_negative_term(e: &Expr) -> bool {
    match e {
        Expr::Number(n) => n.is_negative(),
        Expr::Mul(fs) => matches!(fs.first(), Some(Expr::Number(n)) if n.is_negative()),
        Expr::Constant(Constant::NegInfinity) => true,
        _ => false,
    }
}

fn fmt_product(f: &mut fmt::Formatter, factors: &[Expr]) -> fmt::Result {
    let mut coeff = BigRational::one();
    let mut num: Vec<Expr> = Vec::new();
    let mut den: Vec<Expr> = Vec::new();
    for factor in factors {
        match factor {
            Expr::Number(n) => coeff *= n,
            Expr::Pow(b, e) if matches!(e.as_number(), Some(n) if n.is_negative()) => {
                let flipped = Expr::pow((**b).clone(), Expr::int(-1) * (**e).clone());
                den.push(flipped);
            }
            other => num.push(other.clone()),
        }
    }
    if coeff.is_negative() {
        f.write_str("-")?;
        coeff = -coeff;
    }
    let c_num = coeff.numer().clone();
    let c_den = coeff.denom().clone();
    if !c_den.is_one() {
        den.insert(0, Expr::Number(BigRational::from_integer(c_den)));
    }

    let mut first = true;
    if !c_num.is_one() || num.is_empty() {
        write!(f, "{}", c_num)?;
        first = false;
    }
    for factor in &num {
        if !first {
            f.write_str("*")?;
        }
        wrap(f, factor, PREC_POW)?;
        first = false;
    }
    if !den.is_empty() {
        f.write_str("/")?;
        if den.len() == 1 {
            wrap(f, &den[0], PREC_ATOM.min(PREC_POW))?;
        } else {
            f.write_str("(")?;
            for (i, factor) in den.iter().enumerate() {
                if i > 0 {
                    f.write_str("*")?;
                }
                wrap(f, factor, PREC_POW)?;
            }
            f.write_str(")")?;
        }
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number(n) => {
                if n.is_integer() {
                    write!(f, "{}", n.numer())
                } else {
                    write!(f, "{}/{}", n.numer(), n.denom())
                }
            }
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Constant(c) => f.write_str(match c {
                Constant::Pi => "pi",
                Constant::E => "E",
                Constant::Infinity => "oo",
                Constant::NegInfinity => "-oo",
                Constant::Undefined => "undefined",
            }),
            Expr::Add(terms) => {
                let mut ordered: Vec<&Expr> = terms.iter().collect();
                ordered.sort_by(|a, b| display_degree(b).cmp(&display_degree(a)));
                for (i, term) in ordered.into_iter().enumerate() {
                    if i == 0 {
                        wrap(f, term, PREC_ADD)?;
                    } else if is_negative_term(term) {
                        f.write_str(" - ")?;
                        let positive = Expr::int(-1) * term.clone();
                        wrap(f, &positive, PREC_MUL)?;
                    } else {
                        f.write_str(" + ")?;
                        wrap(f, term, PREC_MUL)?;
                    }
                }
                Ok(())
            }
            Expr::Mul(factors) => fmt_product(f, factors),
            Expr::Pow(b, e) => {
                if is_sqrt_exponent(e) {
                    return write!(f, "sqrt({})", b);
                }
                if matches!(e.as_number(), Some(n) if n.is_negative()) {
                    return fmt_product(f, std::slice::from_ref(self));
                }
                wrap(f, b, PREC_ATOM)?;
                f.write_str("^")?;
                wrap(f, e, PREC_ATOM)
            }
            Expr::Func(func, a) => write!(f, "{}({})", func.name(), a),
            Expr::Limit(inner, var, target) => {
                let target = match target.as_ref() {
                    LimitTarget::PosInfinity => "oo".to_string(),
                    LimitTarget::NegInfinity => "-oo".to_string(),
                    LimitTarget::Point(p) => p.to_string(),
                };
                write!(f, "Limit({}, {}, {})", inner, var, target)
            }
        }
    }
}
