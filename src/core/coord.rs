use std::fmt;
use std::ops::{Add, Neg, Sub};

use num_bigint::BigInt;
use num_traits::Signed;

/// An arbitrary-precision board coordinate.
///
/// Ordered by `(x, y)`, which is the iteration order of [`crate::core::position::Position`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BigCoord {
    pub x: BigInt,
    pub y: BigInt,
}

impl BigCoord {
    #[inline]
    pub fn new(x: impl Into<BigInt>, y: impl Into<BigInt>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    #[inline]
    pub fn chebyshev_norm(&self) -> BigInt {
        let ax = self.x.abs();
        let ay = self.y.abs();
        if ax >= ay {
            ax
        } else {
            ay
        }
    }

    #[inline]
    pub fn in_linf_bound(&self, bound: &BigInt) -> bool {
        self.x.abs() <= *bound && self.y.abs() <= *bound
    }
}

impl fmt::Display for BigCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for &BigCoord {
    type Output = BigCoord;

    #[inline]
    fn add(self, rhs: &BigCoord) -> BigCoord {
        BigCoord::new(&self.x + &rhs.x, &self.y + &rhs.y)
    }
}

impl Sub for &BigCoord {
    type Output = BigCoord;

    #[inline]
    fn sub(self, rhs: &BigCoord) -> BigCoord {
        BigCoord::new(&self.x - &rhs.x, &self.y - &rhs.y)
    }
}

impl Neg for &BigCoord {
    type Output = BigCoord;

    #[inline]
    fn neg(self) -> BigCoord {
        BigCoord::new(-&self.x, -&self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_x_then_y() {
        let mut cs = vec![
            BigCoord::new(1, -5),
            BigCoord::new(-3, 9),
            BigCoord::new(1, -6),
        ];
        cs.sort();
        assert_eq!(
            cs,
            vec![
                BigCoord::new(-3, 9),
                BigCoord::new(1, -6),
                BigCoord::new(1, -5)
            ]
        );
    }

    #[test]
    fn arithmetic_and_norm() {
        let a = BigCoord::new(7, -2);
        let b = BigCoord::new(-1, 10);
        assert_eq!(&a + &b, BigCoord::new(6, 8));
        assert_eq!(&a - &b, BigCoord::new(8, -12));
        assert_eq!(-&a, BigCoord::new(-7, 2));
        assert_eq!((&a - &b).chebyshev_norm(), BigInt::from(12));
        assert!(a.in_linf_bound(&BigInt::from(7)));
        assert!(!a.in_linf_bound(&BigInt::from(6)));
    }
}
