//! Topology-preserving compression of positions on an unbounded chessboard.
//!
//! Positions may use coordinates far beyond what an `f64` holds exactly. [`compress`] maps such a
//! position onto a small board while keeping every order and short-range relation between pieces,
//! and [`expand`] maps moves chosen on the small board back to the original one.

pub mod compress;
pub mod core;
pub mod expand;
