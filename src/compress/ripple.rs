//! Ripple pushes along one orthogonal axis.
//!
//! A push must move the mover's group `hi` a given amount further from the anchor's group `lo`
//! (`lo < hi`) without moving `lo`. The amount is absorbed by widening the gaps in `(lo, hi]`,
//! each up to its headroom (its original width), and then collapses forward: a successor of `hi`
//! moves only as far as needed to stay `d` behind its predecessor.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::compress::error::CompressError;
use crate::compress::group::AxisOrder;

const STAGE: &str = "ripple";

/// How much to widen each gap `k` in `(lo, hi]`; `widen[k - lo - 1]` belongs to gap `k`.
pub type GapWidening = Vec<BigInt>;

/// Per-group shift produced by one ripple push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RipplePlan {
    /// Dense, one entry per group of the axis order.
    pub shifts: Vec<BigInt>,
}

impl RipplePlan {
    pub fn shift(&self, group: usize) -> &BigInt {
        &self.shifts[group]
    }

    pub fn moved_groups(&self) -> usize {
        self.shifts.iter().filter(|s| !s.is_zero()).count()
    }
}

/// Headroom of every gap in `(lo, hi]`.
pub fn gap_headrooms(
    order: &AxisOrder,
    lo: usize,
    hi: usize,
) -> Result<Vec<BigInt>, CompressError> {
    (lo + 1..=hi)
        .map(|k| {
            order.headroom(k).ok_or_else(|| CompressError::Internal {
                stage: STAGE,
                reason: format!("{:?} group {k} has no layout", order.axis),
            })
        })
        .collect()
}

/// Candidate ways of absorbing `amount` into gaps with the given headrooms.
///
/// Every single gap that can hold the whole amount (nearest the mover first), followed by a split
/// proportional to headroom. Fails when the gaps cannot hold the amount at all.
pub fn candidate_widenings(
    headrooms: &[BigInt],
    amount: &BigInt,
) -> Result<Vec<GapWidening>, CompressError> {
    let total: BigInt = headrooms.iter().sum();
    if total < *amount {
        return Err(CompressError::Internal {
            stage: STAGE,
            reason: format!("push of {amount} exceeds the total headroom {total}"),
        });
    }

    let mut out = Vec::new();
    for k in (0..headrooms.len()).rev() {
        if headrooms[k] >= *amount {
            let mut w = vec![BigInt::zero(); headrooms.len()];
            w[k] = amount.clone();
            out.push(w);
        }
    }
    out.push(proportional_split(headrooms, amount, &total));
    Ok(out)
}

/// Split `amount` proportionally to `headrooms` (largest remainder, ties to the later gap).
fn proportional_split(headrooms: &[BigInt], amount: &BigInt, total: &BigInt) -> GapWidening {
    if total.is_zero() {
        return vec![BigInt::zero(); headrooms.len()];
    }

    let mut shares = Vec::with_capacity(headrooms.len());
    let mut remainders = Vec::with_capacity(headrooms.len());
    for (k, h) in headrooms.iter().enumerate() {
        let scaled = amount * h;
        shares.push(&scaled / total);
        remainders.push((scaled % total, k));
    }

    let assigned: BigInt = shares.iter().sum();
    let mut left = amount - assigned;
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    for (_, k) in remainders {
        if !left.is_positive() {
            break;
        }
        shares[k] += 1u32;
        left -= 1u32;
    }
    shares
}

/// Shifts for widening the gaps in `(lo, hi]` by `widen`, with the collapsing cascade after `hi`.
pub fn plan_ripple(
    order: &AxisOrder,
    lo: usize,
    hi: usize,
    widen: &[BigInt],
    d: &BigInt,
) -> Result<RipplePlan, CompressError> {
    debug_assert_eq!(widen.len(), hi - lo);
    let mut shifts = vec![BigInt::zero(); order.len()];

    let mut acc = BigInt::zero();
    for (k, w) in (lo + 1..=hi).zip(widen) {
        acc += w;
        shifts[k] = acc.clone();
    }

    let laid_out_max = |k: usize| {
        order.groups[k]
            .transformed
            .as_ref()
            .map(|t| t.max.clone())
            .ok_or_else(|| CompressError::Internal {
                stage: STAGE,
                reason: format!("{:?} group {k} has no layout", order.axis),
            })
    };

    let mut prev_max = laid_out_max(hi)? + &acc;
    for q in hi + 1..order.len() {
        let min = match &order.groups[q].transformed {
            Some(t) => &t.min,
            None => {
                return Err(CompressError::Internal {
                    stage: STAGE,
                    reason: format!("{:?} group {q} has no layout", order.axis),
                })
            }
        };
        let need = &prev_max + d - min;
        if !need.is_positive() {
            break;
        }
        prev_max = laid_out_max(q)? + &need;
        shifts[q] = need;
    }

    Ok(RipplePlan { shifts })
}
