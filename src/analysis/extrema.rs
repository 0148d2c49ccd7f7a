use tracing::{debug, trace};

use super::probe::{sign_changes, SignChange};
use super::{Extremum, ExtremumKind};
use crate::backend::SymbolicBackend;
use crate::config::ProbeOptions;
use crate::error::CasError;

/// Relative maxima and minima of `f`.
///
/// Critical points are the real zeros of `f'`. Each one is probed with
/// growing symmetric offsets until `f'` is seen to change sign: `+` to `-`
/// is a maximum, `-` to `+` a minimum. A point that never shows a sign
/// change within `opts.max_iter` steps is left out.
pub fn find_relative_extrema<B: SymbolicBackend>(
    cas: &B,
    f: &B::Expr,
    x: &B::Var,
    opts: ProbeOptions,
) -> Result<Vec<Extremum<B::Expr>>, CasError> {
    let slope = cas.differentiate(f, x, 1)?;
    let critical = cas.solve(&slope, Some(x))?;

    let mut found = Vec::new();
    for p in critical.iter().filter(|p| cas.is_real(p)) {
        let mut kind = None;
        for step in sign_changes(cas, &slope, x, p, opts) {
            kind = match step? {
                Some(SignChange::Falling) => Some(ExtremumKind::Max),
                Some(SignChange::Rising) => Some(ExtremumKind::Min),
                None => continue,
            };
            break;
        }
        let Some(kind) = kind else {
            trace!(point = %p, "no sign change around critical point");
            continue;
        };
        let y = cas.substitute(f, x, p)?;
        found.push(Extremum {
            kind,
            x: p.clone(),
            y,
        });
    }
    debug!(f = %f, count = found.len(), "relative extrema");
    Ok(found)
}
