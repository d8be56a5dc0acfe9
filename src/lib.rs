//! # NotifyButton
//!
//! Push-button chat notifier with dead-time lockout.
//!
//! ## Architecture
//!
//! ```text
//! button edge ──▶ TriggerMachine::accept_edge()     (ISR, atomic CAS only)
//!                        │ accepted
//!                        ▼
//!                 complete_trigger()                (main task)
//!                   orange ─▶ Dispatcher ─▶ green / red
//!                        │
//!                        ▼
//!                 RearmTimer::schedule_once(dead_time)
//!                        │ expiry
//!                        ▼
//!                 on_rearm_timer_fire() ─▶ Armed, green
//! ```
//!
//! Everything here is host-testable. ESP-IDF glue (GPIO, Wi-Fi, HTTP,
//! esp_timer) lives with the firmware binary.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod indicator;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod stats;
pub mod timer;
pub mod trigger;

pub use bootstrap::{bootstrap, BootstrapError, ConnectionInfo, Link};
pub use config::{Config, ConfigError, NotificationConfig};
pub use dispatch::{Dispatch, DispatchError, Dispatcher, Transport, TransportResponse};
pub use indicator::{Indicator, IndicatorState, StatusIndicator};
pub use log_globals::EVENT_LOG;
pub use stats::{StatsSnapshot, TriggerStats};
pub use timer::{OneShotGuard, RearmTimer};
pub use trigger::{EdgeOutcome, TriggerGate, TriggerMachine, TriggerState};
