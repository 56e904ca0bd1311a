use num_bigint::BigInt;
use num_traits::Zero;
use tracing::debug;

use crate::compress::axis::Axis;
use crate::compress::group::{AxisOrder, ScalarRange};
use crate::compress::transform::PieceTransform;

/// Lay out the groups of an orthogonal axis back to back, exactly `d` apart.
///
/// Groups keep their original order and internal spacing; member coordinates are written to
/// `pieces` on the order's axis.
pub fn solve_orthogonal(order: &mut AxisOrder, pieces: &mut [PieceTransform], d: &BigInt) {
    debug_assert!(!order.axis.is_diagonal());
    let axis = order.axis;

    let mut cursor = BigInt::zero();
    for group in &mut order.groups {
        let size = group.original.size();
        let transformed = ScalarRange {
            min: cursor.clone(),
            max: &cursor + &size,
        };

        for &m in &group.members {
            let offset = pieces[m].original_scalar(axis) - &group.original.min;
            *pieces[m].transformed_mut(axis) = Some(&transformed.min + offset);
        }

        cursor = &transformed.max + d;
        group.transformed = Some(transformed);
    }

    debug!(
        axis = ?axis,
        groups = order.len(),
        extent = %order
            .groups
            .last()
            .and_then(|g| g.transformed.as_ref())
            .map(|t| t.max.clone())
            .unwrap_or_default(),
        "orthogonal layout done"
    );
}
