//! A small exact computer-algebra engine over the rationals.
//!
//! Enough algebra to back the function analysis: canonical expression trees,
//! differentiation, closed-form roots up to quadratic surds, and one- or
//! two-sided limits.

pub mod diff;
pub mod engine;
pub mod expr;
pub mod limit;
pub mod parse;
pub mod poly;
pub mod solve;
pub mod surd;

pub use engine::Engine;
pub use expr::{Constant, Expr, Func, Symbol};
