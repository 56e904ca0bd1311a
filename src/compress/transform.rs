use num_bigint::BigInt;

use crate::compress::axis::{Axis, AxisMap};
use crate::core::coord::BigCoord;
use crate::core::position::{PieceCode, Position};

/// Per-piece record of where a piece came from and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceTransform {
    pub piece: PieceCode,
    pub original: BigCoord,
    pub transformed_x: Option<BigInt>,
    pub transformed_y: Option<BigInt>,
    /// Index of the owning group in each axis order (`None` for axes that were not grouped).
    pub groups: AxisMap<Option<usize>>,
}

impl PieceTransform {
    pub fn new(piece: PieceCode, original: BigCoord) -> Self {
        Self {
            piece,
            original,
            transformed_x: None,
            transformed_y: None,
            groups: AxisMap::default(),
        }
    }

    /// The solved coordinate, once both components are known.
    pub fn transformed(&self) -> Option<BigCoord> {
        match (&self.transformed_x, &self.transformed_y) {
            (Some(x), Some(y)) => Some(BigCoord::new(x.clone(), y.clone())),
            _ => None,
        }
    }

    #[inline]
    pub fn original_scalar(&self, axis: Axis) -> BigInt {
        axis.scalar(&self.original)
    }

    /// Transformed projection onto `axis`; `None` before the orthogonal phase.
    pub fn transformed_scalar(&self, axis: Axis) -> Option<BigInt> {
        match (&self.transformed_x, &self.transformed_y) {
            (Some(x), Some(y)) => Some(axis.scalar_xy(x, y)),
            _ => None,
        }
    }

    #[inline]
    pub fn group(&self, axis: Axis) -> Option<usize> {
        self.groups[axis]
    }

    pub(crate) fn transformed_mut(&mut self, axis: Axis) -> &mut Option<BigInt> {
        match axis {
            Axis::Horizontal => &mut self.transformed_x,
            Axis::Vertical => &mut self.transformed_y,
            _ => unreachable!("only orthogonal axes carry a transformed coordinate"),
        }
    }
}

/// Turn a position into transform records, in the position's iteration order.
pub fn ingest(position: &Position) -> Vec<PieceTransform> {
    position
        .iter()
        .map(|(at, piece)| PieceTransform::new(piece, at.clone()))
        .collect()
}
