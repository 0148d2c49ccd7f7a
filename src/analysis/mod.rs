//! The function analysis engine.
//!
//! Six independent operations, each a pure function of the expression, the
//! variable and a [`SymbolicBackend`](crate::backend::SymbolicBackend). None
//! of them reads another's output, so they can run in any order or in
//! parallel (see [`crate::report::analyze`]).
//!
//! "Nothing found" is an empty collection (or `None` for the y-intercept);
//! only a failure of the symbolic backend itself is an `Err`.

pub mod asymptotes;
pub mod extrema;
pub mod inflection;
pub mod intercepts;
mod probe;

pub use asymptotes::{find_horizontal_asymptotes, find_vertical_asymptotes};
pub use extrema::find_relative_extrema;
pub use inflection::find_inflection_points;
pub use intercepts::{find_x_intercepts, find_y_intercepts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    Max,
    Min,
}

impl ExtremumKind {
    pub fn label(self) -> &'static str {
        match self {
            ExtremumKind::Max => "Relative Maximum",
            ExtremumKind::Min => "Relative Minimum",
        }
    }
}

/// A relative extremum at `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Extremum<E> {
    pub kind: ExtremumKind,
    pub x: E,
    pub y: E,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InflectionPoint<E> {
    pub x: E,
    pub y: E,
}
