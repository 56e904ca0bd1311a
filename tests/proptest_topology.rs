//! Property tests for the separation contract on random positions.
//!
//! For every compression that succeeds:
//! 1. the output has one square per input piece;
//! 2. every pair keeps its order on every constrained axis;
//! 3. pairs within `d` keep their exact difference, farther pairs stay at least `d` apart;
//! 4. coordinates stay small.
//!
//! Orthogonal mode never fails. The diagonal solver is a local search and may give up with
//! `IterationLimit` on rare inputs, but never with an internal fault.

use infinite_compress::compress::verify::topology_violations;
use infinite_compress::compress::{
    compress_position, CompressConfig, CompressError, CompressionMode, NoAnchor,
};
use infinite_compress::core::coord::BigCoord;
use infinite_compress::core::position::{PieceCode, Position};
use num_bigint::BigInt;
use proptest::prelude::*;

fn position_strategy() -> impl Strategy<Value = Position> {
    prop_oneof![Just(20i64), Just(200), Just(10_000), Just(1i64 << 50)].prop_flat_map(|span| {
        proptest::collection::vec((-span..=span, -span..=span), 1..=8).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| (BigCoord::new(x, y), (i % 6) as PieceCode + 1))
                .collect::<Position>()
        })
    })
}

fn check_contract(
    pos: &Position,
    mode: CompressionMode,
) -> Result<Option<CompressError>, TestCaseError> {
    let out = match compress_position(pos, mode, &CompressConfig::default(), &NoAnchor) {
        Ok(out) => out,
        Err(e) => return Ok(Some(e)),
    };

    prop_assert_eq!(out.position.len(), pos.len());
    let violations = topology_violations(&out.pieces, mode.axes(), &out.min_distance);
    prop_assert!(
        violations.is_empty(),
        "{} violations, first: {}",
        violations.len(),
        violations[0]
    );
    prop_assert!(out.position.within_magnitude(&BigInt::from(1i64 << 53)));
    Ok(None)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn orthogonal_mode_always_honours_the_contract(pos in position_strategy()) {
        let err = check_contract(&pos, CompressionMode::Orthogonal)?;
        prop_assert!(err.is_none(), "orthogonal compression failed: {}", err.unwrap());
    }

    #[test]
    fn diagonal_mode_honours_the_contract_or_hits_the_cap(pos in position_strategy()) {
        match check_contract(&pos, CompressionMode::OrthogonalAndDiagonal)? {
            None | Some(CompressError::IterationLimit { .. }) => {}
            Some(other) => prop_assert!(false, "unexpected failure: {}", other),
        }
    }

    #[test]
    fn compression_is_deterministic(pos in position_strategy()) {
        let cfg = CompressConfig::default();
        let a = compress_position(&pos, CompressionMode::OrthogonalAndDiagonal, &cfg, &NoAnchor);
        let b = compress_position(&pos, CompressionMode::OrthogonalAndDiagonal, &cfg, &NoAnchor);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.position, b.position);
                prop_assert_eq!(a.pieces, b.pieces);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "one run failed and the other did not"),
        }
    }
}
