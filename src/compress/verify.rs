//! Independent check of the separation contract on a finished compression.

use std::fmt;

use num_bigint::BigInt;
use num_traits::Signed;

use crate::compress::axis::Axis;
use crate::compress::transform::PieceTransform;

/// One pair of pieces whose transformed relation on `axis` breaks the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub axis: Axis,
    pub first: usize,
    pub second: usize,
    pub original: BigInt,
    pub transformed: BigInt,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: pieces {} and {} were {} apart, now {}",
            self.axis, self.first, self.second, self.original, self.transformed
        )
    }
}

/// Whether a transformed difference honours an original one under minimum distance `d`.
///
/// Close differences (`|o| <= d`) must be kept exactly; far ones must keep their sign and stay at
/// least `d` in magnitude.
pub fn relation_holds(original: &BigInt, transformed: &BigInt, d: &BigInt) -> bool {
    if original.abs() <= *d {
        original == transformed
    } else if original.is_positive() {
        transformed >= d
    } else {
        *transformed <= -d
    }
}

/// Every pair/axis relation that does not hold, for the given axes.
///
/// Pieces without a transformed square are skipped.
pub fn topology_violations(
    pieces: &[PieceTransform],
    axes: &[Axis],
    d: &BigInt,
) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, a) in pieces.iter().enumerate() {
        for (j, b) in pieces.iter().enumerate().skip(i + 1) {
            for &axis in axes {
                let (Some(ta), Some(tb)) = (a.transformed_scalar(axis), b.transformed_scalar(axis))
                else {
                    continue;
                };
                let original = b.original_scalar(axis) - a.original_scalar(axis);
                let transformed = tb - ta;
                if !relation_holds(&original, &transformed, d) {
                    out.push(Violation {
                        axis,
                        first: i,
                        second: j,
                        original,
                        transformed,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::BigCoord;

    #[test]
    fn relation_rules() {
        let d = BigInt::from(10);
        let r = |o: i64, t: i64| relation_holds(&BigInt::from(o), &BigInt::from(t), &d);
        assert!(r(0, 0));
        assert!(r(-10, -10));
        assert!(!r(9, 10));
        assert!(r(11, 10));
        assert!(r(50_000, 10));
        assert!(!r(50_000, 9));
        assert!(!r(-50_000, 10));
        assert!(r(-50_000, -10));
    }

    #[test]
    fn reports_broken_pairs() {
        let mut a = PieceTransform::new(1, BigCoord::new(0, 0));
        a.transformed_x = Some(BigInt::from(0));
        a.transformed_y = Some(BigInt::from(0));
        let mut b = PieceTransform::new(2, BigCoord::new(3, 500));
        b.transformed_x = Some(BigInt::from(3));
        b.transformed_y = Some(BigInt::from(5));

        let found = topology_violations(&[a, b], &Axis::ALL, &BigInt::from(10));
        let axes: Vec<Axis> = found.iter().map(|v| v.axis).collect();
        // y: 500 -> 5; y - x: 497 -> 2; y + x: 503 -> 8.
        assert_eq!(
            axes,
            vec![Axis::Vertical, Axis::PositiveDiagonal, Axis::NegativeDiagonal]
        );
    }
}
