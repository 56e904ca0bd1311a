//! Board primitives for the unbounded plane.
//!
//! - [`coord`]: arbitrary-precision coordinates ([`coord::BigCoord`]).
//! - [`position`]: a deterministic square → piece-code map.

pub mod coord;
pub mod position;
