//! Tunable constants and per-call probing options.

use crate::error::InvalidEps;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Offset unit used when probing around a critical point.
pub const DEFAULT_EPS: f64 = 1e-6;
/// Number of growing offsets tried per critical point before giving up.
pub const DEFAULT_MAX_ITER: usize = 100;
/// Sign changes a second-derivative probe must observe to confirm an inflection.
pub const INFLECTION_SIGN_CHANGES: usize = 2;

/// Number of curve samples over the requested interval.
pub const DEFAULT_SAMPLES: usize = 100;
pub const DEFAULT_LOWER: f64 = -10.0;
pub const DEFAULT_UPPER: f64 = 10.0;

/// L'Hôpital rounds attempted on a 0/0 form before a limit is left unresolved.
pub const MAX_LHOPITAL_STEPS: usize = 8;
/// Highest pole order looked for when signing a one-sided infinite limit.
pub const MAX_POLE_ORDER: usize = 16;
/// Integers above this magnitude are not enumerated for rational-root candidates.
pub const MAX_DIVISOR_SEARCH: u64 = 1_000_000_000_000;
/// Largest integer exponent expanded exactly (`(a+b)^n`, `q^n`).
pub const MAX_EXACT_POWER: u32 = 64;
/// Perfect-square factors are only extracted from radicands below this bound.
pub const MAX_RADICAND_FACTOR: u64 = 1_000_000;

// =============================================================================
// PROBE OPTIONS
// =============================================================================

/// Controls the sign-change probing used by the extrema and inflection finders.
///
/// At iteration `i` the derivative is evaluated at `p ± eps * (i + 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOptions {
    pub eps: f64,
    pub max_iter: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl ProbeOptions {
    pub fn new(eps: f64, max_iter: usize) -> Self {
        Self { eps, max_iter }
    }

    /// Like [`ProbeOptions::new`], but rejects a zero, negative or non-finite
    /// `eps`, which would swap or collapse the two probe sides.
    pub fn checked(eps: f64, max_iter: usize) -> Result<Self, InvalidEps> {
        if !(eps.is_finite() && eps > 0.0) {
            return Err(InvalidEps(eps));
        }
        Ok(Self::new(eps, max_iter))
    }

    /// Offset used at iteration `i` (0-indexed).
    pub fn offset(&self, i: usize) -> f64 {
        self.eps * (i + 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe_options() {
        let opts = ProbeOptions::default();
        assert_eq!(opts.eps, 1e-6);
        assert_eq!(opts.max_iter, 100);
    }

    #[test]
    fn test_checked_rejects_bad_eps() {
        assert_eq!(ProbeOptions::checked(1e-3, 5), Ok(ProbeOptions::new(1e-3, 5)));
        assert_eq!(ProbeOptions::checked(-1e-6, 5), Err(InvalidEps(-1e-6)));
        assert_eq!(ProbeOptions::checked(0.0, 5), Err(InvalidEps(0.0)));
        assert!(ProbeOptions::checked(f64::NAN, 5).is_err());
        assert!(ProbeOptions::checked(f64::INFINITY, 5).is_err());
    }

    #[test]
    fn test_offsets_grow_linearly() {
        let opts = ProbeOptions::new(0.5, 3);
        assert_eq!(opts.offset(0), 0.5);
        assert_eq!(opts.offset(1), 1.0);
        assert_eq!(opts.offset(2), 1.5);
    }
}
