use tracing::debug;

use crate::backend::SymbolicBackend;
use crate::error::CasError;

/// Real solutions of `f = 0`, in the solver's order.
///
/// The variable is inferred from `f`'s single free symbol. Non-real roots
/// are dropped; a solver failure is returned as is.
pub fn find_x_intercepts<B: SymbolicBackend>(cas: &B, f: &B::Expr) -> Result<Vec<B::Expr>, CasError> {
    let roots = cas.solve(f, None)?;
    let real: Vec<B::Expr> = roots.into_iter().filter(|r| cas.is_real(r)).collect();
    debug!(f = %f, count = real.len(), "x-intercepts");
    Ok(real)
}

/// `f(0)` when it is a real value. Never an error: an undefined or
/// non-real value and a failed substitution are all `None`.
pub fn find_y_intercepts<B: SymbolicBackend>(cas: &B, f: &B::Expr, x: &B::Var) -> Option<B::Expr> {
    let value = match cas.substitute(f, x, &cas.number(0.0)) {
        Ok(v) => v,
        Err(e) => {
            debug!(f = %f, error = %e, "y-intercept substitution failed");
            return None;
        }
    };
    cas.is_real(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::Engine;

    fn check_x(text: &str) -> Vec<String> {
        let engine = Engine::new();
        let f = engine.parse(text).unwrap();
        find_x_intercepts(&engine, &f)
            .unwrap()
            .into_iter()
            .map(|r| r.to_string())
            .collect()
    }

    fn check_y(text: &str) -> Option<String> {
        let engine = Engine::new();
        let f = engine.parse(text).unwrap();
        let x = engine.variable_for(&f).unwrap();
        find_y_intercepts(&engine, &f, &x).map(|v| v.to_string())
    }

    #[test]
    fn test_x_intercepts_of_polynomials() {
        assert_eq!(check_x("x^2 - 4"), vec!["-2", "2"]);
        assert_eq!(check_x("x^3 - x"), vec!["-1", "0", "1"]);
        assert_eq!(check_x("(x - 1)^2"), vec!["1"]);
    }

    #[test]
    fn test_complex_roots_are_dropped() {
        assert!(check_x("x^2 + 1").is_empty());
        assert_eq!(check_x("x^3 + x"), vec!["0"]);
    }

    #[test]
    fn test_no_roots_is_empty_not_error() {
        assert!(check_x("1/x").is_empty());
        assert!(check_x("exp(x)").is_empty());
    }

    #[test]
    fn test_solver_failure_propagates() {
        let engine = Engine::new();
        let f = engine.parse("x^5 - x + 1").unwrap();
        assert!(matches!(find_x_intercepts(&engine, &f), Err(CasError::Unsupported(_))));
        let g = engine.parse("x*y").unwrap();
        assert!(matches!(find_x_intercepts(&engine, &g), Err(CasError::MultipleSymbols(_))));
    }

    #[test]
    fn test_high_powers_evaluate_exactly() {
        assert_eq!(check_y("x^66").as_deref(), Some("0"));
        assert_eq!(check_y("x^1000 + 3").as_deref(), Some("3"));
        assert_eq!(check_y("1/(x^100 - 1)").as_deref(), Some("-1"));
    }

    #[test]
    fn test_cube_root_intercept() {
        let engine = Engine::new();
        let f = engine.parse("x^3 - 2").unwrap();
        let roots = find_x_intercepts(&engine, &f).unwrap();
        assert_eq!(roots.len(), 1);
        assert!((engine.to_f64(&roots[0]).unwrap() - 2f64.cbrt()).abs() < 1e-12);
    }

    #[test]
    fn test_y_intercepts() {
        assert_eq!(check_y("x^2 + 1").as_deref(), Some("1"));
        assert_eq!(check_y("1/x"), None);
        assert_eq!(check_y("ln(x)"), None);
        assert_eq!(check_y("cos(x) + 1").as_deref(), Some("2"));
    }
}
