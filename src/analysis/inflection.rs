use tracing::{debug, trace};

use super::probe::sign_changes;
use super::InflectionPoint;
use crate::backend::SymbolicBackend;
use crate::config::{ProbeOptions, INFLECTION_SIGN_CHANGES};
use crate::error::CasError;

/// Points where `f''` vanishes and changes sign.
///
/// Unlike the extremum probe, the direction of the change does not matter,
/// but it has to be observed on [`INFLECTION_SIGN_CHANGES`] probing steps
/// before the point is accepted.
pub fn find_inflection_points<B: SymbolicBackend>(
    cas: &B,
    f: &B::Expr,
    x: &B::Var,
    opts: ProbeOptions,
) -> Result<Vec<InflectionPoint<B::Expr>>, CasError> {
    let curvature = cas.differentiate(f, x, 2)?;
    let candidates = cas.solve(&curvature, Some(x))?;

    let mut found = Vec::new();
    for p in candidates.iter().filter(|p| cas.is_real(p)) {
        let mut changes = 0;
        for step in sign_changes(cas, &curvature, x, p, opts) {
            if step?.is_some() {
                changes += 1;
                if changes == INFLECTION_SIGN_CHANGES {
                    break;
                }
            }
        }
        if changes < INFLECTION_SIGN_CHANGES {
            trace!(point = %p, changes, "not enough sign changes");
            continue;
        }
        let y = cas.substitute(f, x, p)?;
        found.push(InflectionPoint { x: p.clone(), y });
    }
    debug!(f = %f, count = found.len(), "inflection points");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::Engine;

    fn inflections(text: &str, opts: ProbeOptions) -> Vec<(String, String)> {
        let engine = Engine::new();
        let f = engine.parse(text).unwrap();
        let x = engine.variable_for(&f).unwrap();
        find_inflection_points(&engine, &f, &x, opts)
            .unwrap()
            .into_iter()
            .map(|p| (p.x.to_string(), p.y.to_string()))
            .collect()
    }

    #[test]
    fn test_cubic_inflects_at_origin() {
        assert_eq!(
            inflections("x^3", ProbeOptions::default()),
            vec![("0".to_string(), "0".to_string())]
        );
    }

    #[test]
    fn test_parabola_has_none() {
        assert!(inflections("x^2", ProbeOptions::default()).is_empty());
    }

    #[test]
    fn test_flat_quartic_has_none() {
        // f'' = 12x^2 vanishes at 0 without changing sign
        assert!(inflections("x^4", ProbeOptions::default()).is_empty());
    }

    #[test]
    fn test_quartic_with_two_inflections() {
        // f'' = 12x^2 - 4
        let found = inflections("x^4 - 2x^2", ProbeOptions::default());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "-sqrt(3)/3");
        assert_eq!(found[1].0, "sqrt(3)/3");
    }

    #[test]
    fn test_one_step_is_never_enough() {
        assert!(inflections("x^3", ProbeOptions::new(1e-6, 1)).is_empty());
        assert!(inflections("x^3", ProbeOptions::new(1e-6, 0)).is_empty());
    }
}
