use std::fmt;

use num_bigint::BigInt;

#[derive(Debug)]
/// Structured errors returned by the compressor.
pub enum CompressError {
    /// The configuration breaks one of its own constraints (e.g. an odd minimum distance).
    InvalidConfig { reason: String },
    /// The requested mode is not one the compressor knows.
    UnsupportedMode { mode: String },
    /// The diagonal solver ran out of passes before reaching a fixpoint.
    ///
    /// `unresolved` is the number of pair/axis constraints still violated after the last pass.
    IterationLimit { iterations: usize, unresolved: usize },
    /// A configured work budget was exceeded.
    LimitExceeded {
        stage: &'static str,
        metric: &'static str,
        limit: u64,
        observed: u64,
    },
    /// A grouping/solving invariant does not hold. Always a bug, never bad input.
    Internal { stage: &'static str, reason: String },
    /// The solved layout does not fit the configured output magnitude.
    MagnitudeExceeded { limit: BigInt, observed: BigInt },
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            CompressError::UnsupportedMode { mode } => {
                write!(f, "unsupported compression mode {mode:?}")
            }
            CompressError::IterationLimit {
                iterations,
                unresolved,
            } => write!(
                f,
                "diagonal solver did not converge after {iterations} iterations \
                 ({unresolved} constraints unresolved)"
            ),
            CompressError::LimitExceeded {
                stage,
                metric,
                limit,
                observed,
            } => write!(
                f,
                "limit exceeded at {stage}: {metric} (limit={limit}, observed={observed})"
            ),
            CompressError::Internal { stage, reason } => {
                write!(f, "internal invariant violated at {stage}: {reason}")
            }
            CompressError::MagnitudeExceeded { limit, observed } => write!(
                f,
                "compressed coordinate magnitude {observed} exceeds the limit {limit}"
            ),
        }
    }
}

impl std::error::Error for CompressError {}
