use num_bigint::BigInt;

use crate::compress::axis::{Axis, AxisMap};
use crate::compress::error::CompressError;
use crate::compress::group::{AxisOrder, ScalarRange};
use crate::compress::transform::PieceTransform;
use crate::core::position::Position;

const STAGE: &str = "assemble";

/// Set the transformed range of every diagonal group from its members' final coordinates.
pub fn fill_diagonal_ranges(
    orders: &mut AxisMap<Option<AxisOrder>>,
    pieces: &[PieceTransform],
) -> Result<(), CompressError> {
    for axis in Axis::DIAGONAL {
        let Some(order) = orders[axis].as_mut() else {
            continue;
        };
        for (gi, group) in order.groups.iter_mut().enumerate() {
            let mut range: Option<ScalarRange> = None;
            for &m in &group.members {
                let s = pieces[m]
                    .transformed_scalar(axis)
                    .ok_or_else(|| CompressError::Internal {
                        stage: STAGE,
                        reason: format!("piece {m} has no transformed square"),
                    })?;
                range = Some(match range {
                    None => ScalarRange::point(s),
                    Some(r) if s < r.min => ScalarRange { min: s, max: r.max },
                    Some(r) if s > r.max => ScalarRange { min: r.min, max: s },
                    Some(r) => r,
                });
            }
            if range.is_none() {
                return Err(CompressError::Internal {
                    stage: STAGE,
                    reason: format!("{axis:?} group {gi} has no members"),
                });
            }
            group.transformed = range;
        }
    }
    Ok(())
}

/// Build the compressed position from the solved pieces.
///
/// Fails on a coordinate collision (a solver bug) or on a coordinate beyond `max_magnitude`.
pub fn assemble_position(
    pieces: &[PieceTransform],
    max_magnitude: &BigInt,
) -> Result<Position, CompressError> {
    let mut out = Position::new();
    for (i, p) in pieces.iter().enumerate() {
        let at = p.transformed().ok_or_else(|| CompressError::Internal {
            stage: STAGE,
            reason: format!("piece {i} has no transformed square"),
        })?;

        let observed = at.chebyshev_norm();
        if observed > *max_magnitude {
            return Err(CompressError::MagnitudeExceeded {
                limit: max_magnitude.clone(),
                observed,
            });
        }

        if let Some(other) = out.insert(at.clone(), p.piece) {
            return Err(CompressError::Internal {
                stage: STAGE,
                reason: format!(
                    "piece {i} (code {}) collides with code {other} at {at}",
                    p.piece
                ),
            });
        }
    }
    Ok(out)
}
