//! Tick arithmetic for the timer scheduler
//!
//! Ticks come from a wrapping 32-bit counter, so distances are taken as
//! signed wrapping differences. Deadlines are assumed to lie within ±2³¹
//! ticks of "now".

/// Signed distance from `now` to `deadline` (negative once it has passed)
#[inline]
pub fn lead(deadline: u32, now: u32) -> i32 {
    deadline.wrapping_sub(now) as i32
}

/// Whether `deadline` is still at least `margin` ticks away
#[inline]
pub fn has_margin(deadline: u32, now: u32, margin: u32) -> bool {
    i64::from(lead(deadline, now)) >= i64::from(margin)
}

/// Push `next_tick` forward by whole intervals until it leads `now` by at
/// least `margin` ticks (and at least one tick)
///
/// Keeping to whole intervals preserves the phase alignment of the ring.
pub fn catch_up(next_tick: u32, now: u32, margin: u32, interval: u32) -> u32 {
    let needed = now.wrapping_add(margin.max(1));
    let lag = lead(needed, next_tick);
    if lag <= 0 || interval == 0 {
        return next_tick;
    }
    let steps = (lag as u32).div_ceil(interval);
    next_tick.wrapping_add(steps.wrapping_mul(interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lead_wraps() {
        assert_eq!(lead(5, u32::MAX - 4), 10);
        assert_eq!(lead(u32::MAX - 4, 5), -10);
    }

    #[test]
    fn test_catch_up_exact_multiple() {
        // 1000 behind with margin 4 needs three 400-tick steps
        assert_eq!(catch_up(0, 1000, 4, 400), 1200);
        // Landing exactly on the margin is enough
        assert_eq!(catch_up(0, 796, 4, 400), 800);
    }

    #[test]
    fn test_catch_up_leaves_future_tick() {
        assert_eq!(catch_up(500, 100, 4, 400), 500);
    }

    proptest! {
        #[test]
        fn prop_catch_up_restores_margin(
            next_tick in any::<u32>(),
            behind in 0u32..(1 << 30),
            margin in 0u32..8,
            interval in 100u32..1000,
        ) {
            let now = next_tick.wrapping_add(behind);
            let adjusted = catch_up(next_tick, now, margin, interval);

            prop_assert!(lead(adjusted, now) > 0);
            prop_assert!(has_margin(adjusted, now, margin));
            // Minimal: one interval less would violate the margin
            prop_assert!(!has_margin(adjusted.wrapping_sub(interval), now, margin.max(1)));
            prop_assert_eq!(adjusted.wrapping_sub(next_tick) % interval, 0);
        }
    }
}
