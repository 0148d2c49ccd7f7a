//! Sign-change probing around a critical point.
//!
//! At step `i` a derivative is evaluated at `p - eps*(i+1)` and
//! `p + eps*(i+1)`. A step only counts when one side is strictly negative and
//! the other strictly positive; zeros, undefined values and values whose sign
//! cannot be decided all read as "no change".

use std::cmp::Ordering;

use crate::backend::SymbolicBackend;
use crate::config::ProbeOptions;
use crate::error::CasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignChange {
    /// Negative on the left, positive on the right.
    Rising,
    /// Positive on the left, negative on the right.
    Falling,
}

impl SignChange {
    fn from_sides(left: Option<Ordering>, right: Option<Ordering>) -> Option<SignChange> {
        match (left?, right?) {
            (Ordering::Less, Ordering::Greater) => Some(SignChange::Rising),
            (Ordering::Greater, Ordering::Less) => Some(SignChange::Falling),
            _ => None,
        }
    }
}

/// One observation per probing step, `opts.max_iter` steps at most.
pub fn sign_changes<'a, B: SymbolicBackend>(
    cas: &'a B,
    g: &'a B::Expr,
    var: &'a B::Var,
    point: &'a B::Expr,
    opts: ProbeOptions,
) -> impl Iterator<Item = Result<Option<SignChange>, CasError>> + 'a {
    let sign_at = cas.sign_sampler(g, var);
    (0..opts.max_iter).map(move |i| {
        let offset = opts.offset(i);
        let left = sign_at(&cas.shift(point, -offset))?;
        let right = sign_at(&cas.shift(point, offset))?;
        Ok(SignChange::from_sides(left, right))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::{Engine, Expr, Symbol};

    #[test]
    fn test_from_sides() {
        use Ordering::*;
        assert_eq!(SignChange::from_sides(Some(Less), Some(Greater)), Some(SignChange::Rising));
        assert_eq!(SignChange::from_sides(Some(Greater), Some(Less)), Some(SignChange::Falling));
        assert_eq!(SignChange::from_sides(Some(Equal), Some(Greater)), None);
        assert_eq!(SignChange::from_sides(None, Some(Less)), None);
    }

    #[test]
    fn test_linear_derivative_changes_sign_every_step() {
        let engine = Engine::new();
        let g = Expr::int(2) * Expr::symbol("x");
        let x = Symbol::new("x");
        let steps: Vec<_> = sign_changes(&engine, &g, &x, &Expr::zero(), ProbeOptions::new(1e-6, 3))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(steps, vec![Some(SignChange::Rising); 3]);
    }

    #[test]
    fn test_zero_iterations_observe_nothing() {
        let engine = Engine::new();
        let g = Expr::symbol("x");
        let x = Symbol::new("x");
        let opts = ProbeOptions::new(1e-6, 0);
        assert_eq!(sign_changes(&engine, &g, &x, &Expr::zero(), opts).count(), 0);
    }
}
