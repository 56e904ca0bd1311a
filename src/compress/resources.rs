//! Work counters for one compression run.
//!
//! The diagonal solver is a local search; on adversarial inputs it could keep pushing for a long
//! time. Every pair evaluation and group shift is counted against [`ResourceLimits`] and surfaced
//! as [`CompressError::LimitExceeded`] instead of running unbounded.

use crate::compress::config::ResourceLimits;
use crate::compress::error::CompressError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Running counters tracked during a compression.
pub struct ResourceCounts {
    pub iterations: u64,
    pub pair_checks: u64,
    pub ripple_steps: u64,
    pub pushes: u64,
}

#[derive(Debug, Clone)]
pub struct ResourceTracker {
    limits: ResourceLimits,
    counts: ResourceCounts,
}

impl ResourceTracker {
    #[inline]
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            counts: ResourceCounts::default(),
        }
    }

    #[inline]
    pub fn counts(&self) -> ResourceCounts {
        self.counts
    }

    /// Start a solver pass. Whether the pass is allowed is the solver's call.
    #[inline]
    pub fn note_iteration(&mut self) {
        self.counts.iterations += 1;
    }

    #[inline]
    pub fn note_push(&mut self) {
        self.counts.pushes += 1;
    }

    #[inline]
    pub fn bump_pair_checks(
        &mut self,
        stage: &'static str,
        delta: usize,
    ) -> Result<(), CompressError> {
        self.bump(
            stage,
            "pair_checks",
            delta as u64,
            self.limits.max_pair_checks,
            |c| &mut c.pair_checks,
        )
    }

    #[inline]
    pub fn bump_ripple_steps(
        &mut self,
        stage: &'static str,
        delta: usize,
    ) -> Result<(), CompressError> {
        self.bump(
            stage,
            "ripple_steps",
            delta as u64,
            self.limits.max_ripple_steps,
            |c| &mut c.ripple_steps,
        )
    }

    fn bump(
        &mut self,
        stage: &'static str,
        metric: &'static str,
        delta: u64,
        limit: u64,
        field: impl FnOnce(&mut ResourceCounts) -> &mut u64,
    ) -> Result<(), CompressError> {
        let observed = {
            let v = field(&mut self.counts);
            *v = v.saturating_add(delta);
            *v
        };

        if observed > limit {
            return Err(CompressError::LimitExceeded {
                stage,
                metric,
                limit,
                observed,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_fails_past_limit() {
        let mut tracker = ResourceTracker::new(ResourceLimits {
            max_iterations: 1,
            max_pair_checks: 5,
            max_ripple_steps: 100,
        });
        tracker.bump_pair_checks("test", 5).unwrap();
        let err = tracker.bump_pair_checks("test", 1).unwrap_err();
        match err {
            CompressError::LimitExceeded {
                metric,
                limit,
                observed,
                ..
            } => {
                assert_eq!(metric, "pair_checks");
                assert_eq!(limit, 5);
                assert_eq!(observed, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
        tracker.bump_ripple_steps("test", 3).unwrap();
        assert_eq!(tracker.counts().ripple_steps, 3);
    }
}
