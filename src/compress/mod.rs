//! Topology-preserving compression of unbounded-board positions.
//!
//! A position with arbitrarily large coordinates is mapped to one whose coordinates fit exactly in
//! an `f64`, keeping every relation a rule engine can observe:
//!
//! - on each active axis, pieces keep their order;
//! - pieces at most `d` apart on an axis keep their exact difference;
//! - pieces farther than `d` apart stay at least `d` apart.
//!
//! The phases run in a fixed order: ingestion, grouping, orthogonal layout, diagonal repair
//! (extended mode only), recentering, assembly. Everything they produce is returned in a
//! [`Compression`] so a move chosen on the compressed board can be mapped back
//! (see [`crate::expand`]).

pub mod assemble;
pub mod axis;
pub mod config;
pub mod diagonal;
pub mod error;
pub mod group;
pub mod orthogonal;
pub mod recenter;
pub mod resources;
pub mod ripple;
pub mod transform;
pub mod verify;

use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

pub use axis::{Axis, AxisMap};
pub use config::{CompressConfig, CompressionMode, ResourceLimits};
pub use error::CompressError;
pub use group::{AxisGroup, AxisOrder, ScalarRange};
pub use recenter::{AnchorLike, NoAnchor, PieceAnchor};
pub use transform::PieceTransform;

use crate::core::coord::BigCoord;
use crate::core::position::Position;

/// Work done by one compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompressionStats {
    /// Diagonal solver passes (zero in orthogonal mode).
    pub iterations: u64,
    pub pushes: u64,
    pub pair_checks: u64,
    /// Whether the layout was translated onto an anchor piece.
    pub recentered: bool,
}

/// A compressed position together with everything needed to map moves back.
#[derive(Debug, Clone)]
pub struct Compression {
    pub position: Position,
    pub mode: CompressionMode,
    pub min_distance: BigInt,
    /// One record per input piece, in ingestion order.
    pub pieces: Vec<PieceTransform>,
    /// `Some` for every axis the mode constrains.
    pub orders: AxisMap<Option<AxisOrder>>,
    pub stats: CompressionStats,
    index: FxHashMap<BigCoord, usize>,
}

impl Compression {
    /// The transform record of the piece now standing on `at`.
    pub fn transform_at(&self, at: &BigCoord) -> Option<&PieceTransform> {
        self.index.get(at).map(|&i| &self.pieces[i])
    }

    pub fn order(&self, axis: Axis) -> Option<&AxisOrder> {
        self.orders[axis].as_ref()
    }
}

/// Compress `position` under `mode`.
///
/// `anchor` picks the piece whose square is kept (pass [`NoAnchor`] to skip recentering).
///
/// Output coordinates are bounded by `config.max_output_magnitude`. Fails when the configuration is
/// invalid, the diagonal solver does not converge within its budget, or the result would not fit.
pub fn compress_position(
    position: &Position,
    mode: CompressionMode,
    config: &CompressConfig,
    anchor: &dyn AnchorLike,
) -> Result<Compression, CompressError> {
    config.validate()?;
    let d = config.min_distance();

    let mut pieces = transform::ingest(position);
    let mut orders: AxisMap<Option<AxisOrder>> = AxisMap::default();
    for &axis in mode.axes() {
        let order = group::build_axis_order(axis, &mut pieces, &d);
        debug!(?axis, groups = order.len(), "grouped");
        orders[axis] = Some(order);
    }

    for axis in Axis::ORTHOGONAL {
        if let Some(order) = orders[axis].as_mut() {
            orthogonal::solve_orthogonal(order, &mut pieces, &d);
        }
    }

    let mut tracker = resources::ResourceTracker::new(config.limits);
    if mode.includes_diagonals() {
        diagonal::solve_diagonals(&mut pieces, &mut orders, config, &mut tracker)?;
    }

    let recentered = recenter::recenter(
        &mut pieces,
        &mut orders,
        anchor,
        &config.max_output_magnitude,
    )?;
    assemble::fill_diagonal_ranges(&mut orders, &pieces)?;
    let compressed = assemble::assemble_position(&pieces, &config.max_output_magnitude)?;

    let mut index = FxHashMap::default();
    index.reserve(pieces.len());
    for (i, p) in pieces.iter().enumerate() {
        if let Some(at) = p.transformed() {
            index.insert(at, i);
        }
    }

    let counts = tracker.counts();
    let stats = CompressionStats {
        iterations: counts.iterations,
        pushes: counts.pushes,
        pair_checks: counts.pair_checks,
        recentered,
    };
    debug!(
        %mode,
        pieces = pieces.len(),
        iterations = stats.iterations,
        pushes = stats.pushes,
        recentered,
        "compressed"
    );

    Ok(Compression {
        position: compressed,
        mode,
        min_distance: d,
        pieces,
        orders,
        stats,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(coords: &[(i64, i64)]) -> Position {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (BigCoord::new(x, y), i as u16 + 1))
            .collect()
    }

    #[test]
    fn empty_position_compresses_to_empty() {
        let out = compress_position(
            &Position::new(),
            CompressionMode::OrthogonalAndDiagonal,
            &CompressConfig::default(),
            &NoAnchor,
        )
        .unwrap();
        assert!(out.position.is_empty());
        assert_eq!(out.stats.pushes, 0);
    }

    #[test]
    fn orthogonal_mode_groups_only_two_axes() {
        let pos = position(&[(0, 0), (100, 3)]);
        let out = compress_position(
            &pos,
            CompressionMode::Orthogonal,
            &CompressConfig::default(),
            &NoAnchor,
        )
        .unwrap();
        assert!(out.order(Axis::Horizontal).is_some());
        assert!(out.order(Axis::PositiveDiagonal).is_none());
        assert_eq!(out.stats.iterations, 0);
        assert_eq!(out.position.get(&BigCoord::new(10, 3)), Some(2));
    }

    #[test]
    fn transform_at_finds_the_record() {
        let pos = position(&[(0, 0), (1_000_000, -1_000_000)]);
        let out = compress_position(
            &pos,
            CompressionMode::OrthogonalAndDiagonal,
            &CompressConfig::default(),
            &NoAnchor,
        )
        .unwrap();
        for (at, piece) in out.position.iter() {
            let rec = out.transform_at(at).unwrap();
            assert_eq!(rec.piece, piece);
            assert_eq!(rec.transformed().as_ref(), Some(at));
        }
        assert!(out.transform_at(&BigCoord::new(5, 5)).is_none());
    }

    #[test]
    fn invalid_config_is_rejected_first() {
        let cfg = CompressConfig {
            min_distance: 7,
            ..CompressConfig::default()
        };
        let pos = position(&[(0, 0)]);
        let err = compress_position(&pos, CompressionMode::Orthogonal, &cfg, &NoAnchor).unwrap_err();
        assert!(matches!(err, CompressError::InvalidConfig { .. }));
    }
}
