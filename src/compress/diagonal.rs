//! Diagonal repair loop.
//!
//! The orthogonal layout compacts x and y independently, which can break what the two diagonals
//! need. This solver scans every pair of pieces, and for each diagonal computes how far the
//! pair's transformed difference is from what the contract demands:
//!
//! - pairs within `d` on the diagonal must keep their exact difference,
//! - pairs farther than `d` must stay at least `d` apart, with the same sign.
//!
//! A violation is repaired by a ripple push of one piece along x or y. Only one direction can move
//! a piece away from the other without dragging the other along, and it is read off the group
//! indices. Passes repeat until one makes no push, or the iteration budget runs out.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::compress::axis::{Axis, AxisMap};
use crate::compress::config::CompressConfig;
use crate::compress::error::CompressError;
use crate::compress::group::AxisOrder;
use crate::compress::resources::ResourceTracker;
use crate::compress::ripple::{candidate_widenings, gap_headrooms, plan_ripple, RipplePlan};
use crate::compress::transform::PieceTransform;

const STAGE: &str = "diagonal";

/// Change of `s(j) - s(i)` the contract requires, given the original and current differences.
///
/// `target` is the separation demanded of far pairs that are currently too close (normally `d`).
pub fn required_push(original: &BigInt, current: &BigInt, d: &BigInt, target: &BigInt) -> BigInt {
    if original.abs() <= *d {
        original - current
    } else if original > d && current < d {
        target - current
    } else if *original < -d && *current > -d {
        -target - current
    } else {
        BigInt::zero()
    }
}

/// Separation demanded of a far pair that has already been repaired `repeats` times.
///
/// Doubles past `escalation_after` repeats, up to `2^escalation_cap * d`, and never beyond the
/// original separation.
pub fn escalated_target(original: &BigInt, repeats: u32, config: &CompressConfig) -> BigInt {
    let d = config.min_distance();
    let exp = repeats
        .saturating_sub(config.escalation_after)
        .min(config.escalation_cap);
    let target = d << exp as usize;
    let limit = original.abs();
    if target > limit {
        limit
    } else {
        target
    }
}

/// The orthogonal move that repairs a diagonal pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushDirection {
    pub axis: Axis,
    /// Group that must stay put.
    pub anchor_group: usize,
    /// Group that moves forward.
    pub mover_group: usize,
}

/// Find the single safe direction that increases `s(hi) - s(lo)` on `diagonal`.
///
/// `gx` / `gy` are the pieces' horizontal / vertical group indices.
pub fn safe_direction(
    diagonal: Axis,
    hi: usize,
    lo: usize,
    gx: &[usize],
    gy: &[usize],
) -> Result<PushDirection, CompressError> {
    let horizontal = match diagonal {
        // y + x grows when `hi` moves right.
        Axis::NegativeDiagonal => (gx[hi] > gx[lo]).then_some(PushDirection {
            axis: Axis::Horizontal,
            anchor_group: gx[lo],
            mover_group: gx[hi],
        }),
        // y - x of `lo` shrinks when `lo` moves right.
        Axis::PositiveDiagonal => (gx[lo] > gx[hi]).then_some(PushDirection {
            axis: Axis::Horizontal,
            anchor_group: gx[hi],
            mover_group: gx[lo],
        }),
        other => {
            return Err(CompressError::Internal {
                stage: STAGE,
                reason: format!("{other:?} is not a diagonal"),
            })
        }
    };
    let vertical = (gy[hi] > gy[lo]).then_some(PushDirection {
        axis: Axis::Vertical,
        anchor_group: gy[lo],
        mover_group: gy[hi],
    });

    match (horizontal, vertical) {
        (Some(dir), None) | (None, Some(dir)) => Ok(dir),
        (h, v) => Err(CompressError::Internal {
            stage: STAGE,
            reason: format!(
                "pieces {lo} -> {hi} on {diagonal:?}: horizontal safe = {}, vertical safe = {}",
                h.is_some(),
                v.is_some()
            ),
        }),
    }
}

struct DiagonalSolver<'a> {
    config: &'a CompressConfig,
    d: BigInt,
    horizontal: &'a mut AxisOrder,
    vertical: &'a mut AxisOrder,
    tracker: &'a mut ResourceTracker,
    gx: Vec<usize>,
    gy: Vec<usize>,
    /// Working copy of the transformed coordinates, written back on success.
    coords: Vec<[BigInt; 2]>,
    /// Original diagonal scalars, `[y - x, y + x]`.
    original: Vec<[BigInt; 2]>,
    repeats: FxHashMap<(usize, usize, Axis), u32>,
}

#[inline]
fn diagonal_slot(axis: Axis) -> usize {
    match axis {
        Axis::PositiveDiagonal => 0,
        _ => 1,
    }
}

#[inline]
fn diagonal_scalar(axis: Axis, xy: &[BigInt; 2]) -> BigInt {
    axis.scalar_xy(&xy[0], &xy[1])
}

impl<'a> DiagonalSolver<'a> {
    fn new(
        pieces: &[PieceTransform],
        orders: &'a mut AxisMap<Option<AxisOrder>>,
        config: &'a CompressConfig,
        tracker: &'a mut ResourceTracker,
    ) -> Result<Self, CompressError> {
        let missing = |what: &str| CompressError::Internal {
            stage: STAGE,
            reason: format!("{what} missing before diagonal solving"),
        };

        let mut gx = Vec::with_capacity(pieces.len());
        let mut gy = Vec::with_capacity(pieces.len());
        let mut coords = Vec::with_capacity(pieces.len());
        let mut original = Vec::with_capacity(pieces.len());
        for p in pieces {
            gx.push(p.group(Axis::Horizontal).ok_or_else(|| missing("horizontal group"))?);
            gy.push(p.group(Axis::Vertical).ok_or_else(|| missing("vertical group"))?);
            let x = p.transformed_x.clone().ok_or_else(|| missing("transformed x"))?;
            let y = p.transformed_y.clone().ok_or_else(|| missing("transformed y"))?;
            coords.push([x, y]);
            original.push([
                p.original_scalar(Axis::PositiveDiagonal),
                p.original_scalar(Axis::NegativeDiagonal),
            ]);
        }

        let [h, v, _, _] = &mut orders.0;
        let horizontal = h.as_mut().ok_or_else(|| missing("horizontal order"))?;
        let vertical = v.as_mut().ok_or_else(|| missing("vertical order"))?;

        Ok(Self {
            config,
            d: config.min_distance(),
            horizontal,
            vertical,
            tracker,
            gx,
            gy,
            coords,
            original,
            repeats: FxHashMap::default(),
        })
    }

    fn order(&self, axis: Axis) -> &AxisOrder {
        match axis {
            Axis::Horizontal => &*self.horizontal,
            _ => &*self.vertical,
        }
    }

    fn run(&mut self) -> Result<(), CompressError> {
        let n = self.coords.len();
        let max_iterations = self.config.limits.max_iterations as u64;

        loop {
            let done = self.tracker.counts().iterations;
            if done >= max_iterations {
                return Err(CompressError::IterationLimit {
                    iterations: done as usize,
                    unresolved: self.count_violations(),
                });
            }
            self.tracker.note_iteration();

            let mut pushes = 0usize;
            for i in 0..n {
                for j in i + 1..n {
                    for axis in Axis::DIAGONAL {
                        if self.repair_pair(i, j, axis)? {
                            pushes += 1;
                        }
                    }
                }
            }

            debug!(iteration = done + 1, pushes, "diagonal pass");
            if pushes == 0 {
                return Ok(());
            }
        }
    }

    /// Check one pair on one diagonal and push if needed. Returns whether a push happened.
    fn repair_pair(&mut self, i: usize, j: usize, axis: Axis) -> Result<bool, CompressError> {
        self.tracker.bump_pair_checks(STAGE, 1)?;

        let slot = diagonal_slot(axis);
        let original = &self.original[j][slot] - &self.original[i][slot];
        let current =
            diagonal_scalar(axis, &self.coords[j]) - diagonal_scalar(axis, &self.coords[i]);

        let key = (i, j, axis);
        let repeats = self.repeats.get(&key).copied().unwrap_or(0);
        let target = escalated_target(&original, repeats, self.config);
        let push = required_push(&original, &current, &self.d, &target);
        if push.is_zero() {
            return Ok(false);
        }
        *self.repeats.entry(key).or_default() += 1;

        let (hi, lo, amount) = if push.is_positive() {
            (j, i, push)
        } else {
            (i, j, -push)
        };
        let dir = safe_direction(axis, hi, lo, &self.gx, &self.gy)?;
        trace!(
            ?axis,
            hi,
            lo,
            %amount,
            along = ?dir.axis,
            mover_group = dir.mover_group,
            "ripple push"
        );
        self.ripple_push(dir, &amount)?;
        self.tracker.note_push();
        Ok(true)
    }

    fn ripple_push(&mut self, dir: PushDirection, amount: &BigInt) -> Result<(), CompressError> {
        let order = self.order(dir.axis);
        let headrooms = gap_headrooms(order, dir.anchor_group, dir.mover_group)?;
        let candidates = candidate_widenings(&headrooms, amount)?;

        let mut best: Option<(BigInt, RipplePlan)> = None;
        let single = candidates.len() == 1;
        for widen in &candidates {
            let plan = plan_ripple(
                self.order(dir.axis),
                dir.anchor_group,
                dir.mover_group,
                widen,
                &self.d,
            )?;
            if single {
                best = Some((BigInt::zero(), plan));
                break;
            }
            let score = self.deficit_with(dir.axis, &plan)?;
            if best.as_ref().map_or(true, |(s, _)| score < *s) {
                best = Some((score, plan));
            }
        }

        match best {
            Some((_, plan)) => self.apply(dir.axis, &plan),
            None => Err(CompressError::Internal {
                stage: STAGE,
                reason: "no ripple candidate".to_string(),
            }),
        }
    }

    /// Total amount by which all diagonal constraints would be violated after `plan`.
    fn deficit_with(&mut self, axis: Axis, plan: &RipplePlan) -> Result<BigInt, CompressError> {
        let n = self.coords.len();
        self.tracker.bump_pair_checks(STAGE, n * n.saturating_sub(1))?;

        let (slot, groups) = match axis {
            Axis::Horizontal => (0, &self.gx),
            _ => (1, &self.gy),
        };
        let trial: Vec<[BigInt; 2]> = self
            .coords
            .iter()
            .zip(groups)
            .map(|(c, &g)| {
                let mut c = c.clone();
                c[slot] += plan.shift(g);
                c
            })
            .collect();

        let mut total = BigInt::zero();
        for i in 0..n {
            for j in i + 1..n {
                for diagonal in Axis::DIAGONAL {
                    let s = diagonal_slot(diagonal);
                    let original = &self.original[j][s] - &self.original[i][s];
                    let current =
                        diagonal_scalar(diagonal, &trial[j]) - diagonal_scalar(diagonal, &trial[i]);
                    total += required_push(&original, &current, &self.d, &self.d).abs();
                }
            }
        }
        Ok(total)
    }

    fn apply(&mut self, axis: Axis, plan: &RipplePlan) -> Result<(), CompressError> {
        self.tracker.bump_ripple_steps(STAGE, plan.moved_groups())?;

        let (slot, groups) = match axis {
            Axis::Horizontal => (0, &self.gx),
            _ => (1, &self.gy),
        };
        for (c, &g) in self.coords.iter_mut().zip(groups) {
            c[slot] += plan.shift(g);
        }

        let order = match axis {
            Axis::Horizontal => &mut *self.horizontal,
            _ => &mut *self.vertical,
        };
        for (group, shift) in order.groups.iter_mut().zip(&plan.shifts) {
            if shift.is_zero() {
                continue;
            }
            if let Some(t) = group.transformed.as_mut() {
                *t = t.shifted(shift);
            }
        }
        Ok(())
    }

    fn count_violations(&self) -> usize {
        let n = self.coords.len();
        let mut count = 0;
        for i in 0..n {
            for j in i + 1..n {
                for diagonal in Axis::DIAGONAL {
                    let s = diagonal_slot(diagonal);
                    let original = &self.original[j][s] - &self.original[i][s];
                    let current = diagonal_scalar(diagonal, &self.coords[j])
                        - diagonal_scalar(diagonal, &self.coords[i]);
                    if !required_push(&original, &current, &self.d, &self.d).is_zero() {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    fn write_back(&self, pieces: &mut [PieceTransform]) {
        for (p, [x, y]) in pieces.iter_mut().zip(&self.coords) {
            p.transformed_x = Some(x.clone());
            p.transformed_y = Some(y.clone());
        }
    }
}

/// Repair diagonal violations left by the orthogonal layout.
///
/// Mutates the transformed coordinates of `pieces` and the transformed ranges of the horizontal
/// and vertical orders in place. Fails with [`CompressError::IterationLimit`] when no fixpoint is
/// reached within the configured number of passes.
pub fn solve_diagonals(
    pieces: &mut [PieceTransform],
    orders: &mut AxisMap<Option<AxisOrder>>,
    config: &CompressConfig,
    tracker: &mut ResourceTracker,
) -> Result<(), CompressError> {
    let mut solver = DiagonalSolver::new(pieces, orders, config, tracker)?;
    solver.run()?;
    solver.write_back(pieces);

    let counts = solver.tracker.counts();
    debug!(
        iterations = counts.iterations,
        pushes = counts.pushes,
        pair_checks = counts.pair_checks,
        "diagonal solver reached a fixpoint"
    );
    Ok(())
}
