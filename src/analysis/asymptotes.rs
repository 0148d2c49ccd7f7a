use tracing::debug;

use crate::backend::{Direction, LimitTarget, SymbolicBackend};
use crate::error::CasError;

/// Finite real limits of `f` at `+oo` and `-oo`, without duplicates.
pub fn find_horizontal_asymptotes<B: SymbolicBackend>(
    cas: &B,
    f: &B::Expr,
    x: &B::Var,
) -> Result<Vec<B::Expr>, CasError> {
    let mut found = Vec::new();
    for target in [LimitTarget::PosInfinity, LimitTarget::NegInfinity] {
        let value = cas.limit(f, x, target, Direction::default())?;
        if cas.is_number(&value) && cas.is_real(&value) && !found.contains(&value) {
            found.push(value);
        }
    }
    debug!(f = %f, count = found.len(), "horizontal asymptotes");
    Ok(found)
}

/// Zeros of the denominator where `f` actually blows up.
///
/// A zero whose limit is finite is a removable singularity and is skipped,
/// as is one where the limit is undefined or cannot be resolved.
pub fn find_vertical_asymptotes<B: SymbolicBackend>(
    cas: &B,
    f: &B::Expr,
    x: &B::Var,
) -> Result<Vec<B::Expr>, CasError> {
    let denominator = cas.denominator(f)?;
    let candidates = cas.solve(&denominator, Some(x))?;

    let mut found: Vec<B::Expr> = Vec::new();
    for c in candidates {
        if cas.is_pos_infinity(&c) || cas.is_neg_infinity(&c) {
            continue;
        }
        let value = cas.limit(f, x, LimitTarget::Point(c.clone()), Direction::default())?;
        let infinite = cas.is_pos_infinity(&value) || cas.is_neg_infinity(&value);
        debug!(candidate = %c, limit = %value, infinite, "vertical asymptote candidate");
        if infinite && !found.contains(&c) {
            found.push(c);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::Engine;

    fn horizontal(text: &str) -> Vec<String> {
        let engine = Engine::new();
        let f = engine.parse(text).unwrap();
        let x = engine.variable_for(&f).unwrap();
        find_horizontal_asymptotes(&engine, &f, &x)
            .unwrap()
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    }

    fn vertical(text: &str) -> Vec<String> {
        let engine = Engine::new();
        let f = engine.parse(text).unwrap();
        let x = engine.variable_for(&f).unwrap();
        find_vertical_asymptotes(&engine, &f, &x)
            .unwrap()
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_horizontal_asymptotes() {
        assert_eq!(horizontal("1/x"), vec!["0"]);
        assert!(horizontal("x").is_empty());
        assert_eq!(horizontal("(2x^2 + 1)/(x^2 - 4)"), vec!["2"]);
        assert_eq!(horizontal("exp(x)"), vec!["0"]);
        assert_eq!(horizontal("atan(x)"), vec!["pi/2", "-pi/2"]);
    }

    #[test]
    fn test_quotients_growing_at_the_same_rate() {
        assert_eq!(horizontal("exp(x)/(exp(x) + 1)"), vec!["1", "0"]);
        assert_eq!(horizontal("x/(x + sqrt(2))"), vec!["1"]);
        assert_eq!(horizontal("sqrt(2)*x/(x + 1)"), vec!["sqrt(2)"]);
    }

    #[test]
    fn test_unresolved_limits_are_not_asymptotes() {
        assert!(horizontal("sin(x)").is_empty());
    }

    #[test]
    fn test_vertical_asymptotes() {
        assert_eq!(vertical("1/(x - 2)"), vec!["2"]);
        assert_eq!(vertical("1/(x^2 - 4)"), vec!["-2", "2"]);
        assert_eq!(vertical("1/x^2"), vec!["0"]);
    }

    #[test]
    fn test_removable_singularities_are_skipped() {
        assert!(vertical("(x - 1)/(x - 1)").is_empty());
        assert_eq!(vertical("(x^2 - 1)/((x - 1)*(x + 2))"), vec!["-2"]);
    }

    #[test]
    fn test_no_denominator_no_asymptotes() {
        assert!(vertical("x^2 + 1").is_empty());
        assert!(vertical("1/(x^2 + 1)").is_empty());
    }
}
