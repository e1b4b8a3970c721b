//! Time-indexed rate checkpoints shared by TWAMM sale rates and boosted-fee
//! donation rates.

use crate::error::MathError;
use crate::math::liquidity_math::add_delta;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rate changes taking effect at `time`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRateDelta {
    pub time: u64,
    pub delta0: i128,
    pub delta1: i128,
}

/// Registers a rate window `[start_time, end_time)`: `(delta0, delta1)` is
/// added at the start and removed at the end.
///
/// Boundaries after `last_time` are merged into `deltas` (which stays sorted
/// with no all-zero entries). Boundaries at or before it have already taken
/// effect and are folded into `rates` directly.
pub(crate) fn apply_rate_window(
    deltas: &mut Vec<TimeRateDelta>,
    rates: &mut (u128, u128),
    last_time: u64,
    start_time: u64,
    end_time: u64,
    delta0: i128,
    delta1: i128,
) -> Result<(), MathError> {
    let boundaries = [
        (start_time, delta0, delta1),
        (
            end_time,
            delta0.checked_neg().ok_or(MathError::Overflow)?,
            delta1.checked_neg().ok_or(MathError::Overflow)?,
        ),
    ];

    let mut search_from = 0;

    for (time, delta0, delta1) in boundaries {
        if time <= last_time {
            rates.0 = add_delta(rates.0, delta0)?;
            rates.1 = add_delta(rates.1, delta1)?;
            continue;
        }

        let index = search_from
            + match deltas[search_from..].binary_search_by(|delta| delta.time.cmp(&time)) {
                Ok(index) => index,
                Err(index) => {
                    deltas.insert(
                        search_from + index,
                        TimeRateDelta {
                            time,
                            delta0: 0,
                            delta1: 0,
                        },
                    );
                    index
                }
            };

        let entry = &mut deltas[index];
        entry.delta0 = entry.delta0.checked_add(delta0).ok_or(MathError::Overflow)?;
        entry.delta1 = entry.delta1.checked_add(delta1).ok_or(MathError::Overflow)?;

        if entry.delta0 == 0 && entry.delta1 == 0 {
            deltas.remove(index);
            debug!(time, "rate checkpoint cancelled out");
            // the next entry shifted into `index`
            search_from = index;
        } else {
            search_from = index + 1;
        }
    }

    Ok(())
}

/// Rebuilds a 64-bit execution time from its truncated 32-bit on-chain
/// counterpart, taking the latest candidate not after `estimated`.
#[inline]
pub fn reconcile_execution_time(estimated: u64, truncated: u32) -> u64 {
    let behind = (estimated as u32).wrapping_sub(truncated);
    estimated.saturating_sub(u64::from(behind))
}
