//! Trigger state machine.
//!
//! # States
//!
//! ```text
//!            accept_edge()  (CAS Armed -> Locked)
//!   Armed ─────────────────────────────────────▶ Locked
//!     ▲                                            │
//!     │      on_rearm_timer_fire()                 │ edges here: ignored
//!     └────────────────────────────────────────────┘
//! ```
//!
//! `Locked` doubles as the power-on sentinel: the gate starts locked and
//! only [`TriggerMachine::arm`] opens it, after the network is up.
//!
//! # Contexts
//!
//! - Edge ISR: [`TriggerMachine::accept_edge`]. One compare-and-swap, no
//!   allocation, no blocking, no logging.
//! - Main task: [`TriggerMachine::complete_trigger`]. Orange, dispatch,
//!   green or red, schedule re-arm. May block for the HTTP timeout.
//! - Timer task: [`TriggerMachine::on_rearm_timer_fire`].
//!
//! [`TriggerMachine::on_button_edge`] runs both halves inline for
//! platforms that dispatch straight from the edge handler.

use core::sync::atomic::{AtomicU8, Ordering};
use core::time::Duration;

use crate::dispatch::Dispatch;
use crate::indicator::{Indicator, IndicatorState};
use crate::stats::{StatsSnapshot, TriggerStats};
use crate::timer::RearmTimer;

/// Gate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TriggerState {
    /// Next edge is accepted.
    Armed = 0,
    /// Edges are ignored until the re-arm timer fires.
    Locked = 1,
}

impl TriggerState {
    #[inline]
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TriggerState::Armed,
            _ => TriggerState::Locked,
        }
    }
}

/// Atomic cell holding the [`TriggerState`].
pub struct TriggerGate {
    state: AtomicU8,
}

impl TriggerGate {
    /// New gate, locked.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(TriggerState::Locked as u8),
        }
    }

    #[inline]
    pub fn state(&self) -> TriggerState {
        TriggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `Armed -> Locked`. Returns `true` if this caller won the transition.
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(
                TriggerState::Armed as u8,
                TriggerState::Locked as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// `Locked -> Armed`. Returns `false` if the gate was already armed.
    #[inline]
    pub fn try_unlock(&self) -> bool {
        self.state
            .compare_exchange(
                TriggerState::Locked as u8,
                TriggerState::Armed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Force `Armed` regardless of the current state.
    #[inline]
    pub fn force_armed(&self) {
        self.state.store(TriggerState::Armed as u8, Ordering::Release);
    }
}

impl Default for TriggerGate {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Gate was locked; nothing done.
    Ignored,
    /// Accepted; the endpoint acknowledged.
    Delivered,
    /// Accepted; the attempt failed.
    Failed,
}

/// Button trigger machine.
///
/// Shared by reference between the edge ISR, the timer callback and the
/// main task. Holds no heap data and no lock besides the indicator's
/// critical section.
pub struct TriggerMachine<I> {
    gate: TriggerGate,
    indicator: I,
    dead_time: Duration,
    stats: TriggerStats,
}

impl<I: Indicator> TriggerMachine<I> {
    /// New machine, locked until [`arm`](Self::arm) is called.
    ///
    /// The indicator is not touched.
    pub fn new(indicator: I, dead_time: Duration) -> Self {
        Self {
            gate: TriggerGate::new(),
            indicator,
            dead_time,
            stats: TriggerStats::new(),
        }
    }

    /// Open the gate for the first time and show green.
    pub fn arm(&self) {
        self.gate.force_armed();
        self.indicator.set_indicator(IndicatorState::Green);
        log::info!("trigger: armed (dead time {} ms)", self.dead_time.as_millis());
    }

    #[inline]
    pub fn state(&self) -> TriggerState {
        self.gate.state()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Gate half of an edge. ISR-safe.
    ///
    /// Returns `true` if the edge was accepted and the caller must now run
    /// [`complete_trigger`](Self::complete_trigger), `false` if the gate was
    /// locked.
    #[inline]
    pub fn accept_edge(&self) -> bool {
        if self.gate.try_lock() {
            self.stats.record_accepted();
            true
        } else {
            self.stats.record_ignored();
            false
        }
    }

    /// Everything after an accepted edge: orange, one dispatch attempt,
    /// green or red, then the re-arm countdown.
    ///
    /// The lockout is the same whatever the outcome.
    pub fn complete_trigger<D, T>(&self, dispatcher: &mut D, timer: &T) -> EdgeOutcome
    where
        D: Dispatch + ?Sized,
        T: RearmTimer + ?Sized,
    {
        debug_assert_eq!(self.state(), TriggerState::Locked);

        self.indicator.set_indicator(IndicatorState::Orange);

        let delivered = dispatcher.dispatch(None);
        self.stats.record_dispatch(delivered);

        let outcome = if delivered {
            self.indicator.set_indicator(IndicatorState::Green);
            EdgeOutcome::Delivered
        } else {
            self.indicator.set_indicator(IndicatorState::Red);
            EdgeOutcome::Failed
        };

        if let Err(e) = timer.schedule_once(self.dead_time) {
            // Never leave the button dead: re-open now instead.
            log::error!("trigger: re-arm timer failed ({:?}), re-arming now", e);
            self.gate.try_unlock();
        }

        outcome
    }

    /// Full edge handling inline: gate, then dispatch in the same context.
    pub fn on_button_edge<D, T>(&self, dispatcher: &mut D, timer: &T) -> EdgeOutcome
    where
        D: Dispatch + ?Sized,
        T: RearmTimer + ?Sized,
    {
        if !self.accept_edge() {
            return EdgeOutcome::Ignored;
        }
        self.complete_trigger(dispatcher, timer)
    }

    /// Dead time elapsed: re-open the gate and show green.
    ///
    /// Returns `false` (and leaves the indicator alone) if the gate was
    /// already armed.
    pub fn on_rearm_timer_fire(&self) -> bool {
        if !self.gate.try_unlock() {
            return false;
        }
        self.stats.record_rearmed();
        self.indicator.set_indicator(IndicatorState::Green);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_locked() {
        let gate = TriggerGate::new();
        assert_eq!(gate.state(), TriggerState::Locked);
        assert!(!gate.try_lock());
    }

    #[test]
    fn test_gate_transitions() {
        let gate = TriggerGate::new();

        gate.force_armed();
        assert!(gate.try_lock());
        assert_eq!(gate.state(), TriggerState::Locked);
        assert!(!gate.try_lock());

        assert!(gate.try_unlock());
        assert_eq!(gate.state(), TriggerState::Armed);
        assert!(!gate.try_unlock());
    }

    #[test]
    fn test_gate_single_winner_under_contention() {
        use std::sync::atomic::AtomicU32;
        use std::sync::Arc;
        use std::thread;

        let gate = Arc::new(TriggerGate::new());
        gate.force_armed();
        let winners = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    if gate.try_lock() {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::Relaxed), 1);
    }
}
