//! Mapping moves chosen on a compressed board back to the original board.
//!
//! The rule engine only ever sees [`Compression::position`]. Once it has picked a move there,
//! [`expand_move`] finds the equivalent move between original squares:
//!
//! - the start is the mover's original square;
//! - a capture lands on the captured piece's original square;
//! - a short move (both components at most `d / 2`) keeps its exact vector, which covers every
//!   leaper and every step that stays next to the mover's own group;
//! - a longer orthogonal or diagonal slide is stretched through the horizontal / vertical group
//!   layout, so it ends at the same place relative to the surrounding groups.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::compress::axis::Axis;
use crate::compress::group::AxisOrder;
use crate::compress::Compression;
use crate::core::coord::BigCoord;
use crate::core::position::PieceCode;

/// A move between two squares of the compressed board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedMove {
    pub from: BigCoord,
    pub to: BigCoord,
}

/// The same move between original squares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedMove {
    pub piece: PieceCode,
    pub from: BigCoord,
    pub to: BigCoord,
    pub captured: Option<PieceCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// No piece stands on the move's start square.
    NoPieceAt { at: BigCoord },
    /// A long move that is neither orthogonal nor diagonal.
    UnsupportedVector { dx: BigInt, dy: BigInt },
    /// The compression did not lay out the axis a slide needs.
    MissingOrder { axis: Axis },
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::NoPieceAt { at } => write!(f, "no piece on {at}"),
            ExpandError::UnsupportedVector { dx, dy } => {
                write!(f, "cannot expand a long move by ({dx}, {dy})")
            }
            ExpandError::MissingOrder { axis } => {
                write!(f, "no {axis:?} layout to expand through")
            }
        }
    }
}

impl std::error::Error for ExpandError {}

/// Map `mv` from compressed to original coordinates.
pub fn expand_move(
    compression: &Compression,
    mv: &CompressedMove,
) -> Result<ExpandedMove, ExpandError> {
    let mover = compression
        .transform_at(&mv.from)
        .ok_or_else(|| ExpandError::NoPieceAt {
            at: mv.from.clone(),
        })?;
    let from = mover.original.clone();

    if let Some(victim) = compression.transform_at(&mv.to) {
        return Ok(ExpandedMove {
            piece: mover.piece,
            from,
            to: victim.original.clone(),
            captured: Some(victim.piece),
        });
    }

    let delta = &mv.to - &mv.from;
    let half = &compression.min_distance / 2u32;
    let to = if delta.x.abs() <= half && delta.y.abs() <= half {
        &from + &delta
    } else if delta.y.is_zero() {
        let x = expand_on(compression, Axis::Horizontal, &mv.to.x)?;
        BigCoord::new(x, from.y.clone())
    } else if delta.x.is_zero() {
        let y = expand_on(compression, Axis::Vertical, &mv.to.y)?;
        BigCoord::new(from.x.clone(), y)
    } else if delta.x.abs() == delta.y.abs() {
        let k = diagonal_distance(compression, &from, mv)?;
        BigCoord::new(
            &from.x + &k * delta.x.signum(),
            &from.y + &k * delta.y.signum(),
        )
    } else {
        return Err(ExpandError::UnsupportedVector {
            dx: delta.x,
            dy: delta.y,
        });
    };

    Ok(ExpandedMove {
        piece: mover.piece,
        from,
        to,
        captured: None,
    })
}

fn order(compression: &Compression, axis: Axis) -> Result<&AxisOrder, ExpandError> {
    compression
        .order(axis)
        .ok_or(ExpandError::MissingOrder { axis })
}

fn expand_on(compression: &Compression, axis: Axis, t: &BigInt) -> Result<BigInt, ExpandError> {
    order(compression, axis)?
        .expand_scalar(t)
        .ok_or(ExpandError::MissingOrder { axis })
}

/// Original length of a long diagonal slide.
///
/// Both components are expanded through their orthogonal layout. A component whose destination
/// lies inside a group is exact and wins; otherwise the shorter expansion is used.
fn diagonal_distance(
    compression: &Compression,
    from: &BigCoord,
    mv: &CompressedMove,
) -> Result<BigInt, ExpandError> {
    let kx = (expand_on(compression, Axis::Horizontal, &mv.to.x)? - &from.x).abs();
    let ky = (expand_on(compression, Axis::Vertical, &mv.to.y)? - &from.y).abs();

    let x_exact = order(compression, Axis::Horizontal)?.covers_transformed(&mv.to.x);
    let y_exact = order(compression, Axis::Vertical)?.covers_transformed(&mv.to.y);
    Ok(match (x_exact, y_exact) {
        (true, false) => kx,
        (false, true) => ky,
        _ => kx.min(ky),
    })
}
