use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::core::coord::BigCoord;

/// Opaque piece-type code. The compressor never interprets it.
pub type PieceCode = u16;

/// A piece placement on the unbounded board.
///
/// Keys are unique squares. Iteration is in `(x, y)` order, so every phase that walks a
/// position sees the pieces in the same order for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    squares: BTreeMap<BigCoord, PieceCode>,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `piece` on `at`, returning the piece it replaced (if any).
    pub fn insert(&mut self, at: BigCoord, piece: PieceCode) -> Option<PieceCode> {
        self.squares.insert(at, piece)
    }

    pub fn get(&self, at: &BigCoord) -> Option<PieceCode> {
        self.squares.get(at).copied()
    }

    pub fn is_occupied(&self, at: &BigCoord) -> bool {
        self.squares.contains_key(at)
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigCoord, PieceCode)> + '_ {
        self.squares.iter().map(|(c, &p)| (c, p))
    }

    /// Largest absolute coordinate component over all pieces (zero when empty).
    pub fn max_abs_coordinate(&self) -> BigInt {
        self.squares
            .keys()
            .map(BigCoord::chebyshev_norm)
            .max()
            .unwrap_or_else(BigInt::zero)
    }

    /// Whether every coordinate component is within `limit` in absolute value.
    pub fn within_magnitude(&self, limit: &BigInt) -> bool {
        self.squares
            .keys()
            .all(|c| c.in_linf_bound(limit))
    }
}

impl FromIterator<(BigCoord, PieceCode)> for Position {
    fn from_iter<I: IntoIterator<Item = (BigCoord, PieceCode)>>(iter: I) -> Self {
        Self {
            squares: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_and_iterates_sorted() {
        let mut pos = Position::new();
        assert_eq!(pos.insert(BigCoord::new(5, 0), 1), None);
        assert_eq!(pos.insert(BigCoord::new(-5, 3), 2), None);
        assert_eq!(pos.insert(BigCoord::new(5, 0), 7), Some(1));

        assert_eq!(pos.len(), 2);
        assert_eq!(pos.get(&BigCoord::new(5, 0)), Some(7));
        let order: Vec<_> = pos.iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(order, vec![BigCoord::new(-5, 3), BigCoord::new(5, 0)]);
    }

    #[test]
    fn magnitude_helpers() {
        let pos: Position = [(BigCoord::new(-12, 3), 1), (BigCoord::new(4, 9), 2)]
            .into_iter()
            .collect();
        assert_eq!(pos.max_abs_coordinate(), BigInt::from(12));
        assert!(pos.within_magnitude(&BigInt::from(12)));
        assert!(!pos.within_magnitude(&BigInt::from(11)));
        assert_eq!(Position::new().max_abs_coordinate(), BigInt::zero());
    }
}
