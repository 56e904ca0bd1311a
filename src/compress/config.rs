use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;

use crate::compress::axis::Axis;
use crate::compress::error::CompressError;

/// Which axes the compressor keeps topologically intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMode {
    /// Horizontal and vertical only; the diagonal solver is skipped.
    Orthogonal,
    /// All four axes.
    OrthogonalAndDiagonal,
}

impl CompressionMode {
    pub fn axes(self) -> &'static [Axis] {
        match self {
            CompressionMode::Orthogonal => &Axis::ORTHOGONAL,
            CompressionMode::OrthogonalAndDiagonal => &Axis::ALL,
        }
    }

    pub fn includes_diagonals(self) -> bool {
        matches!(self, CompressionMode::OrthogonalAndDiagonal)
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMode::Orthogonal => f.write_str("orthogonal"),
            CompressionMode::OrthogonalAndDiagonal => f.write_str("diagonal"),
        }
    }
}

impl FromStr for CompressionMode {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orthogonal" => Ok(CompressionMode::Orthogonal),
            "diagonal" | "orthogonal+diagonal" => Ok(CompressionMode::OrthogonalAndDiagonal),
            other => Err(CompressError::UnsupportedMode {
                mode: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Work budgets for one compression.
///
/// - `max_iterations`: full pair-scan passes of the diagonal solver
/// - `max_pair_checks`: pair/axis constraint evaluations (including trial evaluations)
/// - `max_ripple_steps`: individual group shifts performed by ripple pushes
pub struct ResourceLimits {
    pub max_iterations: usize,
    pub max_pair_checks: u64,
    pub max_ripple_steps: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_iterations: 512,
            max_pair_checks: 200_000_000,
            max_ripple_steps: 20_000_000,
        }
    }
}

/// Compressor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressConfig {
    /// The minimum arbitrary distance `d`: pieces closer than this on an axis keep their exact
    /// offset, farther pieces end up at least this far apart.
    pub min_distance: u32,

    /// Longest leap (largest coordinate component) of any short-range jumping piece.
    /// `min_distance` must exceed twice this.
    pub max_leap: u32,

    pub limits: ResourceLimits,

    /// Number of re-violations of the same far pair tolerated before its target separation
    /// starts doubling.
    pub escalation_after: u32,

    /// Largest doubling exponent for a far pair's target separation.
    pub escalation_cap: u32,

    /// Every output coordinate must stay within this absolute value.
    pub max_output_magnitude: BigInt,
}

/// Largest integer an `f64` represents exactly.
pub const F64_EXACT_INTEGER_LIMIT: i64 = (1i64 << 53) - 1;

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            min_distance: 10,
            max_leap: 4,
            limits: ResourceLimits::default(),
            escalation_after: 2,
            escalation_cap: 16,
            max_output_magnitude: BigInt::from(F64_EXACT_INTEGER_LIMIT),
        }
    }
}

impl CompressConfig {
    pub fn min_distance(&self) -> BigInt {
        BigInt::from(self.min_distance)
    }

    pub fn validate(&self) -> Result<(), CompressError> {
        let d = self.min_distance;
        if d == 0 || d % 2 != 0 {
            return Err(CompressError::InvalidConfig {
                reason: format!("min_distance must be positive and even (got {d})"),
            });
        }
        if u64::from(d) <= 2 * u64::from(self.max_leap) {
            return Err(CompressError::InvalidConfig {
                reason: format!(
                    "min_distance {d} must exceed twice the longest leap {}",
                    self.max_leap
                ),
            });
        }
        if self.limits.max_iterations == 0 {
            return Err(CompressError::InvalidConfig {
                reason: "max_iterations must be >= 1".to_string(),
            });
        }
        if self.max_output_magnitude < BigInt::from(d) {
            return Err(CompressError::InvalidConfig {
                reason: "max_output_magnitude must be at least min_distance".to_string(),
            });
        }
        Ok(())
    }
}
