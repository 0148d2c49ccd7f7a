//! Text to [`Expr`].
//!
//! Input is normalized with a few regex rewrites, tokenized and reordered
//! into reverse Polish notation by meval, and the RPN stream is folded into
//! a canonical expression tree.

use meval::shunting_yard::to_rpn;
use meval::tokenizer::{tokenize, Operation, Token};
use num_bigint::BigInt;
use num_rational::BigRational;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::expr::{Constant, Expr, Func, Symbol};
use crate::error::ParseError;

static POWER_OP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*").unwrap());
static LOG_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\blog\s*\(").unwrap());
static NUMBER_THEN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d\.?)\s*([A-Za-z_(])").unwrap());
static CLOSE_THEN_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)\s*\(").unwrap());
static CLOSE_THEN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\)\s*([A-Za-z0-9_.])").unwrap());

/// Rewrites `**` to `^`, `log(` to `ln(`, and makes implicit products explicit.
pub fn preprocess(text: &str) -> String {
    let s = POWER_OP.replace_all(text.trim(), "^");
    let s = LOG_CALL.replace_all(&s, "ln(");
    let s = insert_number_products(&s);
    let s = CLOSE_THEN_OPEN.replace_all(&s, ")*(");
    let s = CLOSE_THEN_NAME.replace_all(&s, ")*$1");
    s.into_owned()
}

/// `2x` -> `2*x`, `3(` -> `3*(`, leaving identifiers (`x2y`) and scientific
/// notation (`1e-3`) alone.
fn insert_number_products(s: &str) -> String {
    NUMBER_THEN_NAME
        .replace_all(s, |caps: &Captures| {
            let whole = &caps[0];
            let (Some(digit), Some(next)) = (caps.get(1), caps.get(2)) else {
                return whole.to_string();
            };
            if in_identifier(s, digit.start()) {
                return whole.to_string();
            }
            let rest = &s[next.start()..];
            if is_exponent_marker(rest) {
                return whole.to_string();
            }
            format!("{}*{}", digit.as_str(), next.as_str())
        })
        .into_owned()
}

/// Whether the digit run containing `pos` is the tail of a name like `x2`.
fn in_identifier(s: &str, pos: usize) -> bool {
    s[..pos]
        .chars()
        .rev()
        .find(|c| !c.is_ascii_digit() && *c != '.')
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
}

fn is_exponent_marker(rest: &str) -> bool {
    let mut chars = rest.chars();
    if !matches!(chars.next(), Some('e') | Some('E')) {
        return false;
    }
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => chars.next().map_or(false, |c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Exact rational with the same decimal expansion `v` prints with.
pub fn rational_from_f64(v: f64) -> Option<BigRational> {
    if !v.is_finite() {
        return None;
    }
    // f64's Display never uses exponent notation
    let text = format!("{}", v);
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = format!("{}{}", int_part, frac_part);
    let numer = BigInt::parse_bytes(all_digits.as_bytes(), 10)?;
    let denom = BigInt::from(10u32).pow(frac_part.len() as u32);
    let q = BigRational::new(numer, denom);
    Some(if negative { -q } else { q })
}

fn identifier(name: &str, variable: Option<&Symbol>) -> Expr {
    if variable.map_or(false, |v| v.name() == name) {
        return Expr::Symbol(Symbol::new(name));
    }
    match name {
        "pi" => Expr::pi(),
        "e" | "E" => Expr::Constant(Constant::E),
        _ => Expr::Symbol(Symbol::new(name)),
    }
}

fn pop(stack: &mut Vec<Expr>) -> Result<Expr, ParseError> {
    stack
        .pop()
        .ok_or_else(|| ParseError::Syntax("missing operand".to_string()))
}

/// Parses `text`; `variable` names the analysis variable so it is never
/// mistaken for the constants `e` or `pi`.
pub fn parse_expr(text: &str, variable: Option<&Symbol>) -> Result<Expr, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let normalized = preprocess(text);
    let tokens = tokenize(&normalized).map_err(|e| ParseError::Syntax(format!("{:?}", e)))?;
    let rpn = to_rpn(&tokens).map_err(|e| ParseError::Syntax(format!("{:?}", e)))?;

    let mut stack: Vec<Expr> = Vec::new();
    for token in rpn {
        match token {
            Token::Number(v) => {
                let q = rational_from_f64(v)
                    .ok_or_else(|| ParseError::InvalidNumber(v.to_string()))?;
                stack.push(Expr::Number(q));
            }
            Token::Var(name) => stack.push(identifier(&name, variable)),
            Token::Unary(Operation::Minus) => {
                let a = pop(&mut stack)?;
                stack.push(-a);
            }
            Token::Unary(Operation::Plus) => {}
            Token::Binary(op) => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                let value = match op {
                    Operation::Plus => a + b,
                    Operation::Minus => a - b,
                    Operation::Times => a * b,
                    Operation::Div => a / b,
                    Operation::Pow => Expr::pow(a, b),
                    other => return Err(ParseError::UnsupportedOperator(format!("{:?}", other))),
                };
                stack.push(value);
            }
            Token::Unary(other) => {
                return Err(ParseError::UnsupportedOperator(format!("{:?}", other)));
            }
            Token::Func(name, arity) => {
                if arity != Some(1) {
                    return Err(ParseError::Arity(name));
                }
                let arg = pop(&mut stack)?;
                let value = if name == "sqrt" {
                    Expr::sqrt(arg)
                } else {
                    let f = Func::from_name(&name).ok_or(ParseError::UnknownFunction(name))?;
                    Expr::func(f, arg)
                };
                stack.push(value);
            }
            other => return Err(ParseError::Syntax(format!("unexpected token {:?}", other))),
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(e), true) => Ok(e),
        (None, _) => Err(ParseError::Empty),
        (Some(_), false) => Err(ParseError::Syntax("dangling operands".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expr {
        parse_expr(text, None).unwrap()
    }

    #[test]
    fn test_preprocess_normalizes_operators() {
        assert_eq!(preprocess("x**2"), "x^2");
        assert_eq!(preprocess("log(x)"), "ln(x)");
        assert_eq!(preprocess("2x + 3(x+1)"), "2*x + 3*(x+1)");
        assert_eq!(preprocess("(x+1)(x-1)"), "(x+1)*(x-1)");
        assert_eq!(preprocess("(x+1)x"), "(x+1)*x");
    }

    #[test]
    fn test_preprocess_keeps_identifiers_and_exponents() {
        assert_eq!(preprocess("x2 + 1"), "x2 + 1");
        assert_eq!(preprocess("1e-3*x"), "1e-3*x");
    }

    #[test]
    fn test_parse_polynomial() {
        let x = Expr::symbol("x");
        assert_eq!(parse("x^2 - 4"), Expr::pow(x, Expr::int(2)) - Expr::int(4));
    }

    #[test]
    fn test_decimals_become_exact() {
        assert_eq!(parse("0.5"), Expr::frac(1, 2));
        assert_eq!(rational_from_f64(-1.25), Some(BigRational::new((-5).into(), 4.into())));
    }

    #[test]
    fn test_functions_and_constants() {
        let x = Expr::symbol("x");
        assert_eq!(parse("sqrt(x)"), Expr::sqrt(x.clone()));
        assert_eq!(parse("exp(x)"), Expr::func(Func::Exp, x.clone()));
        assert_eq!(parse("log(x)"), Expr::func(Func::Ln, x));
        assert_eq!(parse("sin(pi)"), Expr::zero());
    }

    #[test]
    fn test_variable_named_e_is_a_symbol() {
        let e = Symbol::new("e");
        let parsed = parse_expr("e^2", Some(&e)).unwrap();
        assert_eq!(parsed, Expr::pow(Expr::symbol("e"), Expr::int(2)));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse_expr("   ", None), Err(ParseError::Empty));
        assert!(matches!(parse_expr("foo(x)", None), Err(ParseError::UnknownFunction(_))));
        assert!(matches!(parse_expr("x % 2", None), Err(ParseError::UnsupportedOperator(_))));
        assert!(parse_expr("x +", None).is_err());
    }
}
