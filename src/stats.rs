//! Trigger counters.
//!
//! Updated from the edge interrupt, the re-arm timer and the main task,
//! so every field is an atomic. Counters only grow; there is no reset.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counters since boot.
///
/// ```ignore
/// static STATS: TriggerStats = TriggerStats::new();
///
/// // In the edge ISR:
/// STATS.record_ignored();
///
/// // In the main task:
/// let snap = STATS.snapshot();
/// log::info!("{} accepted, {} ignored", snap.accepted, snap.ignored);
/// ```
pub struct TriggerStats {
    /// Edges that passed the gate.
    accepted: AtomicU32,

    /// Edges that hit a locked gate (bounce, rapid presses).
    ignored: AtomicU32,

    /// Dispatch attempts acknowledged by the endpoint.
    delivered: AtomicU32,

    /// Dispatch attempts that ended in any failure.
    failed: AtomicU32,

    /// Locked → Armed transitions caused by the re-arm timer.
    rearmed: AtomicU32,
}

impl TriggerStats {
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU32::new(0),
            ignored: AtomicU32::new(0),
            delivered: AtomicU32::new(0),
            failed: AtomicU32::new(0),
            rearmed: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one dispatch attempt.
    #[inline]
    pub fn record_dispatch(&self, delivered: bool) {
        if delivered {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_rearmed(&self) {
        self.rearmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    ///
    /// Fields are read one by one, so a snapshot taken while an edge is
    /// being processed may be off by one between fields.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rearmed: self.rearmed.load(Ordering::Relaxed),
        }
    }
}

impl Default for TriggerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub accepted: u32,
    pub ignored: u32,
    pub delivered: u32,
    pub failed: u32,
    pub rearmed: u32,
}

impl core::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "accepted={} ignored={} delivered={} failed={} rearmed={}",
            self.accepted, self.ignored, self.delivered, self.failed, self.rearmed
        )
    }
}
