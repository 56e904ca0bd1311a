use std::ops::{Index, IndexMut};

use num_bigint::BigInt;

use crate::core::coord::BigCoord;

/// A direction along which separation constraints are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Scalar `x`.
    Horizontal,
    /// Scalar `y`.
    Vertical,
    /// Scalar `y - x`.
    PositiveDiagonal,
    /// Scalar `y + x`.
    NegativeDiagonal,
}

impl Axis {
    pub const ALL: [Axis; 4] = [
        Axis::Horizontal,
        Axis::Vertical,
        Axis::PositiveDiagonal,
        Axis::NegativeDiagonal,
    ];

    pub const ORTHOGONAL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    pub const DIAGONAL: [Axis; 2] = [Axis::PositiveDiagonal, Axis::NegativeDiagonal];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
            Axis::PositiveDiagonal => 2,
            Axis::NegativeDiagonal => 3,
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        matches!(self, Axis::PositiveDiagonal | Axis::NegativeDiagonal)
    }

    /// Projection of `(x, y)` onto this axis.
    #[inline]
    pub fn scalar_xy(self, x: &BigInt, y: &BigInt) -> BigInt {
        match self {
            Axis::Horizontal => x.clone(),
            Axis::Vertical => y.clone(),
            Axis::PositiveDiagonal => y - x,
            Axis::NegativeDiagonal => y + x,
        }
    }

    #[inline]
    pub fn scalar(self, c: &BigCoord) -> BigInt {
        self.scalar_xy(&c.x, &c.y)
    }
}

/// One value per axis, indexed by [`Axis`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisMap<T>(pub [T; 4]);

impl<T> AxisMap<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> + '_ {
        Axis::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Axis> for AxisMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, axis: Axis) -> &T {
        &self.0[axis.index()]
    }
}

impl<T> IndexMut<Axis> for AxisMap<T> {
    #[inline]
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        &mut self.0[axis.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_match_axis_definitions() {
        let c = BigCoord::new(3, 10);
        assert_eq!(Axis::Horizontal.scalar(&c), BigInt::from(3));
        assert_eq!(Axis::Vertical.scalar(&c), BigInt::from(10));
        assert_eq!(Axis::PositiveDiagonal.scalar(&c), BigInt::from(7));
        assert_eq!(Axis::NegativeDiagonal.scalar(&c), BigInt::from(13));
    }

    #[test]
    fn axis_map_indexes_by_axis() {
        let mut m = AxisMap([0, 10, 20, 30]);
        assert_eq!(m[Axis::NegativeDiagonal], 30);
        m[Axis::Vertical] = 99;
        let collected: Vec<_> = m.iter().map(|(a, v)| (a, *v)).collect();
        assert_eq!(collected[1], (Axis::Vertical, 99));
        assert!(Axis::DIAGONAL.iter().all(|a| a.is_diagonal()));
        assert!(!Axis::ORTHOGONAL.iter().any(|a| a.is_diagonal()));
    }
}
