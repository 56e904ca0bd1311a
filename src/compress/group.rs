//! Axis grouping: clusters of pieces that stay rigidly linked during compression.
//!
//! On one axis, two pieces whose scalars differ by at most the minimum distance `d` always end
//! up in the same group (transitively). Consecutive groups of an [`AxisOrder`] are therefore more
//! than `d` apart in original space, which is what lets the solvers squeeze every gap down to
//! exactly `d` without touching the relations between nearby pieces.

use std::cmp::Ordering;

use num_bigint::BigInt;
use tracing::trace;

use crate::compress::axis::Axis;
use crate::compress::transform::PieceTransform;

/// Inclusive `[min, max]` range of axis scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarRange {
    pub min: BigInt,
    pub max: BigInt,
}

impl ScalarRange {
    pub fn point(v: BigInt) -> Self {
        Self {
            min: v.clone(),
            max: v,
        }
    }

    #[inline]
    pub fn size(&self) -> BigInt {
        &self.max - &self.min
    }

    #[inline]
    pub fn contains(&self, v: &BigInt) -> bool {
        self.min <= *v && *v <= self.max
    }

    pub fn shifted(&self, by: &BigInt) -> Self {
        Self {
            min: &self.min + by,
            max: &self.max + by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisGroup {
    pub original: ScalarRange,
    /// Set by the orthogonal solver (orthogonal axes) or by assembly (diagonal axes).
    pub transformed: Option<ScalarRange>,
    /// Indices into the piece list.
    pub members: Vec<usize>,
}

impl AxisGroup {
    fn singleton(piece: usize, value: BigInt) -> Self {
        Self {
            original: ScalarRange::point(value),
            transformed: None,
            members: vec![piece],
        }
    }
}

/// Which end of a group's range a registration moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extended {
    None,
    Min,
    Max,
}

/// The sorted, pairwise-separated groups of one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisOrder {
    pub axis: Axis,
    pub groups: Vec<AxisGroup>,
}

impl AxisOrder {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            groups: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Binary search for the group whose range, padded by `d` on both sides, contains `value`.
    ///
    /// `Ok(i)`: group `i` absorbs the value. `Err(i)`: no group does, and `i` is the sorted
    /// insertion index for a new one.
    pub fn find(&self, value: &BigInt, d: &BigInt) -> Result<usize, usize> {
        self.groups.binary_search_by(|g| {
            if *value < &g.original.min - d {
                Ordering::Greater
            } else if *value > &g.original.max + d {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        })
    }

    /// Add `piece` with scalar `value`, merging or inserting groups to keep them separated.
    pub fn register(&mut self, piece: usize, value: BigInt, d: &BigInt) {
        let idx = match self.find(&value, d) {
            Ok(idx) => idx,
            Err(idx) => {
                self.groups.insert(idx, AxisGroup::singleton(piece, value));
                return;
            }
        };

        let group = &mut self.groups[idx];
        group.members.push(piece);
        let extended = if value < group.original.min {
            group.original.min = value;
            Extended::Min
        } else if value > group.original.max {
            group.original.max = value;
            Extended::Max
        } else {
            Extended::None
        };

        match extended {
            Extended::None => {}
            Extended::Min if idx > 0 => {
                if self.reaches(idx - 1, idx, d) {
                    self.merge_into_previous(idx);
                }
            }
            Extended::Max if idx + 1 < self.groups.len() => {
                if self.reaches(idx, idx + 1, d) {
                    self.merge_into_previous(idx + 1);
                }
            }
            _ => {}
        }
    }

    /// Whether group `lo`'s range padded by `d` reaches group `hi` (`lo + 1 == hi`).
    fn reaches(&self, lo: usize, hi: usize, d: &BigInt) -> bool {
        &self.groups[lo].original.max + d >= self.groups[hi].original.min
    }

    fn merge_into_previous(&mut self, idx: usize) {
        let absorbed = self.groups.remove(idx);
        let prev = &mut self.groups[idx - 1];
        trace!(
            axis = ?self.axis,
            at = idx - 1,
            absorbed = absorbed.members.len(),
            "merging adjacent groups"
        );
        prev.original.max = absorbed.original.max;
        prev.members.extend(absorbed.members);
    }

    /// Record each member's group index on this axis.
    pub fn assign_indices(&self, pieces: &mut [PieceTransform]) {
        for (gi, group) in self.groups.iter().enumerate() {
            for &m in &group.members {
                pieces[m].groups[self.axis] = Some(gi);
            }
        }
    }

    /// `original gap - transformed gap` between group `k - 1` and group `k`.
    ///
    /// This is how much further apart the two groups may still be pushed without exceeding
    /// their original separation. `None` until both groups have been laid out.
    pub fn headroom(&self, k: usize) -> Option<BigInt> {
        let prev = &self.groups[k - 1];
        let cur = &self.groups[k];
        let (pt, ct) = (prev.transformed.as_ref()?, cur.transformed.as_ref()?);
        let original_gap = &cur.original.min - &prev.original.max;
        let current_gap = &ct.min - &pt.max;
        Some(original_gap - current_gap)
    }

    /// Whether transformed scalar `t` falls inside a laid-out group.
    pub fn covers_transformed(&self, t: &BigInt) -> bool {
        self.groups
            .iter()
            .any(|g| g.transformed.as_ref().is_some_and(|r| r.contains(t)))
    }

    /// Map a transformed scalar on this axis back to original space.
    ///
    /// Inside a group the offset from the group start is exact. In a gap the offset is taken
    /// from the nearer neighbour and clamped so the result stays strictly inside the original gap.
    /// Before the first or after the last group the offset from that group is kept.
    pub fn expand_scalar(&self, t: &BigInt) -> Option<BigInt> {
        let laid_out: Vec<(&ScalarRange, &ScalarRange)> = self
            .groups
            .iter()
            .map(|g| g.transformed.as_ref().map(|tr| (&g.original, tr)))
            .collect::<Option<_>>()?;
        let (first, last) = (laid_out.first()?, laid_out.last()?);

        if *t < first.1.min {
            return Some(&first.0.min - (&first.1.min - t));
        }
        if *t > last.1.max {
            return Some(&last.0.max + (t - &last.1.max));
        }

        let idx = laid_out.partition_point(|(_, tr)| tr.max < *t);
        let (orig, tr) = laid_out[idx];
        if tr.contains(t) {
            return Some(&orig.min + (t - &tr.min));
        }

        // Strictly between group idx - 1 and group idx.
        let (prev_orig, prev_tr) = laid_out[idx - 1];
        let from_prev = t - &prev_tr.max;
        let to_next = &tr.min - t;
        let one = BigInt::from(1);
        if from_prev <= to_next {
            let limit = &orig.min - &one;
            let v = &prev_orig.max + from_prev;
            Some(if v > limit { limit } else { v })
        } else {
            let limit = &prev_orig.max + &one;
            let v = &orig.min - to_next;
            Some(if v < limit { limit } else { v })
        }
    }
}

/// Group every piece on `axis` and record the resulting indices on the pieces.
pub fn build_axis_order(axis: Axis, pieces: &mut [PieceTransform], d: &BigInt) -> AxisOrder {
    let mut order = AxisOrder::new(axis);
    for (i, p) in pieces.iter().enumerate() {
        order.register(i, p.original_scalar(axis), d);
    }
    order.assign_indices(pieces);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::BigCoord;

    fn d() -> BigInt {
        BigInt::from(10)
    }

    fn ranges(order: &AxisOrder) -> Vec<(i64, i64)> {
        order
            .groups
            .iter()
            .map(|g| {
                (
                    i64::try_from(&g.original.min).unwrap(),
                    i64::try_from(&g.original.max).unwrap(),
                )
            })
            .collect()
    }

    fn register_all(values: &[i64]) -> AxisOrder {
        let mut order = AxisOrder::new(Axis::Horizontal);
        for (i, &v) in values.iter().enumerate() {
            order.register(i, BigInt::from(v), &d());
        }
        order
    }

    #[test]
    fn close_values_share_a_group() {
        let order = register_all(&[0, 10, 20, 31]);
        assert_eq!(ranges(&order), vec![(0, 20), (31, 31)]);
        assert_eq!(order.groups[0].members, vec![0, 1, 2]);
    }

    #[test]
    fn insertion_keeps_groups_sorted() {
        let order = register_all(&[100, -100, 0, 1_000_000]);
        assert_eq!(
            ranges(&order),
            vec![(-100, -100), (0, 0), (100, 100), (1_000_000, 1_000_000)]
        );
    }

    #[test]
    fn bridging_value_merges_neighbours() {
        // 0 and 16 are separate until 8 lands between them.
        let order = register_all(&[0, 16, 40, 8]);
        assert_eq!(ranges(&order), vec![(0, 16), (40, 40)]);
        let mut members = order.groups[0].members.clone();
        members.sort();
        assert_eq!(members, vec![0, 1, 3]);

        // Exactly d from both neighbours: bridges them whichever group absorbs it.
        let order = register_all(&[0, 20, 10]);
        assert_eq!(ranges(&order), vec![(0, 20)]);

        // More than d from the low group: stays apart.
        let order = register_all(&[0, 20, 12]);
        assert_eq!(ranges(&order), vec![(0, 0), (12, 20)]);
    }

    #[test]
    fn find_reports_insertion_index() {
        let order = register_all(&[0, 50]);
        assert_eq!(order.find(&BigInt::from(-11), &d()), Err(0));
        assert_eq!(order.find(&BigInt::from(-10), &d()), Ok(0));
        assert_eq!(order.find(&BigInt::from(25), &d()), Err(1));
        assert_eq!(order.find(&BigInt::from(61), &d()), Err(2));
    }

    #[test]
    fn groups_stay_separated_by_more_than_d() {
        let order = register_all(&[3, -40, 17, 29, -52, 88, 61, 70, 5, 41]);
        for w in order.groups.windows(2) {
            assert!(&w[1].original.min - &w[0].original.max > d());
        }
        let total: usize = order.groups.iter().map(|g| g.members.len()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn build_assigns_indices() {
        let mut pieces: Vec<PieceTransform> = [(0, 0), (5, 1), (300, 2), (-300, 3)]
            .into_iter()
            .map(|(x, y)| PieceTransform::new(1, BigCoord::new(x, y)))
            .collect();
        let order = build_axis_order(Axis::Horizontal, &mut pieces, &d());
        assert_eq!(order.len(), 3);
        let idx: Vec<_> = pieces.iter().map(|p| p.group(Axis::Horizontal)).collect();
        assert_eq!(idx, vec![Some(1), Some(1), Some(2), Some(0)]);
        assert_eq!(pieces[0].group(Axis::Vertical), None);
    }

    #[test]
    fn expand_scalar_inside_gaps_and_beyond() {
        let mut order = register_all(&[0, 4, 1000]);
        order.groups[0].transformed = Some(ScalarRange {
            min: BigInt::from(0),
            max: BigInt::from(4),
        });
        order.groups[1].transformed = Some(ScalarRange::point(BigInt::from(14)));

        let e = |t: i64| i64::try_from(order.expand_scalar(&BigInt::from(t)).unwrap()).unwrap();
        assert_eq!(e(3), 3);
        assert_eq!(e(14), 1000);
        assert_eq!(e(-7), -7);
        assert_eq!(e(20), 1006);
        // Nearer to the low group: offset from its end.
        assert_eq!(e(6), 6);
        // Nearer to the high group: offset back from its start.
        assert_eq!(e(12), 998);
    }
}
