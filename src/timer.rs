//! One-shot re-arm timer.
//!
//! The trigger machine only needs "call me back once, `dead_time` from now".
//! [`RearmTimer`] is that seam; the platform binds the callback when it
//! creates the timer.
//!
//! Platform timers can race: a fire already queued for dispatch may still
//! run after `cancel()` returned. [`OneShotGuard`] absorbs that by keeping
//! the deadline of the current schedule. A fire that arrives before it is
//! stale and is refused, so a cancel-and-reschedule produces one callback,
//! and never an early one.

use core::sync::atomic::{AtomicI64, Ordering};
use core::time::Duration;

/// A single-callback countdown.
pub trait RearmTimer {
    type Error: core::fmt::Debug;

    /// Cancel any pending countdown and start a new one for `after`.
    ///
    /// When it expires the bound callback runs once. The timer does not
    /// re-schedule itself.
    fn schedule_once(&self, after: Duration) -> Result<(), Self::Error>;
}

impl<T: RearmTimer + ?Sized> RearmTimer for &T {
    type Error = T::Error;

    #[inline]
    fn schedule_once(&self, after: Duration) -> Result<(), Self::Error> {
        (**self).schedule_once(after)
    }
}

/// No fire owed.
const IDLE: i64 = i64::MIN;

/// Deadline of the owed fire, shared between the scheduler and the timer
/// callback. Times are microseconds on one monotonic clock.
///
/// ```ignore
/// // scheduling side
/// hw_timer.cancel();
/// guard.arm(now_us() + after_us);
/// hw_timer.start(after);
///
/// // callback side
/// if guard.take(now_us()) {
///     machine.on_rearm_timer_fire();
/// }
/// ```
pub struct OneShotGuard {
    deadline_us: AtomicI64,
}

impl OneShotGuard {
    pub const fn new() -> Self {
        Self {
            deadline_us: AtomicI64::new(IDLE),
        }
    }

    /// Owe one fire at `deadline_us`. Re-arming replaces the previous
    /// deadline; still exactly one fire is owed.
    #[inline]
    pub fn arm(&self, deadline_us: i64) {
        self.deadline_us.store(deadline_us.max(IDLE + 1), Ordering::Release);
    }

    /// Claim the owed fire at time `now_us`.
    ///
    /// Returns `true` once per `arm()`, and only once `now_us` has reached
    /// the deadline. An early (stale) fire gets `false` and the fire stays
    /// owed.
    #[inline]
    pub fn take(&self, now_us: i64) -> bool {
        let deadline = self.deadline_us.load(Ordering::Acquire);
        if deadline == IDLE || now_us < deadline {
            return false;
        }
        self.deadline_us
            .compare_exchange(deadline, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline_us.load(Ordering::Acquire) != IDLE
    }
}

impl Default for OneShotGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Microseconds in `d`, saturating.
#[inline]
pub fn duration_us(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_fires_once_per_arm() {
        let guard = OneShotGuard::new();
        assert!(!guard.take(0));

        guard.arm(1_000);
        assert!(guard.take(1_000));
        assert!(!guard.take(2_000));
        assert!(!guard.is_pending());
    }

    #[test]
    fn test_early_fire_is_refused_and_stays_owed() {
        let guard = OneShotGuard::new();
        guard.arm(5_000);

        assert!(!guard.take(4_999));
        assert!(guard.is_pending());
        assert!(guard.take(5_000));
    }

    #[test]
    fn test_rearm_moves_deadline() {
        let guard = OneShotGuard::new();

        guard.arm(1_000);
        guard.arm(3_000);

        assert!(!guard.take(1_000), "fire for the old deadline must be refused");
        assert!(guard.take(3_000));
        assert!(!guard.take(3_000));
    }

    #[test]
    fn test_duration_us_saturates() {
        assert_eq!(duration_us(Duration::from_millis(2)), 2_000);
        assert_eq!(duration_us(Duration::MAX), i64::MAX);
    }
}
