//! Rigid translation of a solved layout so that an anchor piece keeps its square.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use tracing::{debug, warn};

use crate::compress::axis::{Axis, AxisMap};
use crate::compress::error::CompressError;
use crate::compress::group::AxisOrder;
use crate::compress::transform::PieceTransform;
use crate::core::coord::BigCoord;
use crate::core::position::PieceCode;

const STAGE: &str = "recenter";

/// Picks the piece whose original square the compressed layout should keep.
///
/// Only the first matching piece (in ingestion order) is used.
pub trait AnchorLike {
    fn is_anchor(&self, at: &BigCoord, piece: PieceCode) -> bool;
}

/// No recentering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnchor;

impl AnchorLike for NoAnchor {
    fn is_anchor(&self, _at: &BigCoord, _piece: PieceCode) -> bool {
        false
    }
}

/// Anchor on the first piece with the given code (e.g. the side to move's king).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceAnchor(pub PieceCode);

impl AnchorLike for PieceAnchor {
    fn is_anchor(&self, _at: &BigCoord, piece: PieceCode) -> bool {
        piece == self.0
    }
}

impl<F> AnchorLike for F
where
    F: Fn(&BigCoord, PieceCode) -> bool,
{
    fn is_anchor(&self, at: &BigCoord, piece: PieceCode) -> bool {
        self(at, piece)
    }
}

/// Translate every transformed coordinate and laid-out range so the anchor returns to its
/// original square.
///
/// Returns whether a translation was applied. No anchor, an anchor already in place, or a
/// translation that would push some coordinate past `max_magnitude` all leave the layout as is.
pub fn recenter(
    pieces: &mut [PieceTransform],
    orders: &mut AxisMap<Option<AxisOrder>>,
    anchor: &dyn AnchorLike,
    max_magnitude: &BigInt,
) -> Result<bool, CompressError> {
    let Some(idx) = pieces
        .iter()
        .position(|p| anchor.is_anchor(&p.original, p.piece))
    else {
        return Ok(false);
    };

    let at = pieces[idx]
        .transformed()
        .ok_or_else(|| CompressError::Internal {
            stage: STAGE,
            reason: format!("anchor piece {idx} has no transformed square"),
        })?;
    let offset = &pieces[idx].original - &at;
    if offset.x.is_zero() && offset.y.is_zero() {
        return Ok(false);
    }

    let fits = pieces.iter().all(|p| {
        let x = p.transformed_x.as_ref().map(|x| x + &offset.x);
        let y = p.transformed_y.as_ref().map(|y| y + &offset.y);
        x.map_or(true, |x| x.abs() <= *max_magnitude)
            && y.map_or(true, |y| y.abs() <= *max_magnitude)
    });
    if !fits {
        warn!(
            anchor = idx,
            dx = %offset.x,
            dy = %offset.y,
            "anchor translation would exceed the output magnitude; keeping the compact layout"
        );
        return Ok(false);
    }

    for p in pieces.iter_mut() {
        if let Some(x) = p.transformed_x.as_mut() {
            *x += &offset.x;
        }
        if let Some(y) = p.transformed_y.as_mut() {
            *y += &offset.y;
        }
    }

    for axis in Axis::ALL {
        let Some(order) = orders[axis].as_mut() else {
            continue;
        };
        let shift = axis.scalar(&offset);
        for group in &mut order.groups {
            if let Some(t) = group.transformed.as_mut() {
                *t = t.shifted(&shift);
            }
        }
    }

    debug!(anchor = idx, dx = %offset.x, dy = %offset.y, "recentered on anchor");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laid_out(coords: &[(i64, i64, i64, i64, PieceCode)]) -> Vec<PieceTransform> {
        coords
            .iter()
            .map(|&(ox, oy, tx, ty, piece)| {
                let mut p = PieceTransform::new(piece, BigCoord::new(ox, oy));
                p.transformed_x = Some(BigInt::from(tx));
                p.transformed_y = Some(BigInt::from(ty));
                p
            })
            .collect()
    }

    #[test]
    fn anchor_returns_home_and_others_follow() {
        let mut pieces = laid_out(&[(0, 0, 0, 0, 1), (5000, 7000, 10, 12, 2)]);
        let mut orders = AxisMap::default();
        let moved = recenter(&mut pieces, &mut orders, &PieceAnchor(2), &BigInt::from(1_000_000))
            .unwrap();
        assert!(moved);
        assert_eq!(pieces[1].transformed(), Some(BigCoord::new(5000, 7000)));
        assert_eq!(pieces[0].transformed(), Some(BigCoord::new(4990, 6988)));
    }

    #[test]
    fn missing_anchor_is_a_no_op() {
        let mut pieces = laid_out(&[(0, 0, 0, 0, 1), (5000, 7000, 10, 12, 2)]);
        let before = pieces.clone();
        let mut orders = AxisMap::default();
        assert!(!recenter(&mut pieces, &mut orders, &NoAnchor, &BigInt::from(100)).unwrap());
        assert!(!recenter(&mut pieces, &mut orders, &PieceAnchor(9), &BigInt::from(100)).unwrap());
        assert_eq!(pieces, before);
    }

    #[test]
    fn oversized_translation_is_skipped() {
        let mut pieces = laid_out(&[(0, 0, 0, 0, 1), (5000, 7000, 10, 12, 2)]);
        let before = pieces.clone();
        let mut orders = AxisMap::default();
        let by_square = |at: &BigCoord, _: PieceCode| at.x == BigInt::from(5000);
        assert!(!recenter(&mut pieces, &mut orders, &by_square, &BigInt::from(6000)).unwrap());
        assert_eq!(pieces, before);
    }
}
