//! esp_timer backed re-arm timer.

use core::time::Duration;
use std::sync::Arc;

use esp_idf_svc::sys::EspError;
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};

use notify_button::timer::duration_us;
use notify_button::{OneShotGuard, RearmTimer};

use super::timestamp_us;

/// One-shot timer whose callback runs on the esp_timer task.
pub struct EspRearmTimer {
    timer: EspTimer<'static>,
    guard: Arc<OneShotGuard>,
}

impl EspRearmTimer {
    /// Bind `on_fire` to a new timer. Nothing is scheduled yet.
    pub fn new<F>(service: &EspTaskTimerService, mut on_fire: F) -> Result<Self, EspError>
    where
        F: FnMut() + Send + 'static,
    {
        let guard = Arc::new(OneShotGuard::new());
        let fire_guard = Arc::clone(&guard);

        let timer = service.timer(move || {
            if fire_guard.take(timestamp_us()) {
                on_fire();
            }
        })?;

        Ok(Self { timer, guard })
    }
}

impl RearmTimer for EspRearmTimer {
    type Error = EspError;

    fn schedule_once(&self, after: Duration) -> Result<(), EspError> {
        self.timer.cancel()?;
        self.guard.arm(timestamp_us().saturating_add(duration_us(after)));
        self.timer.after(after)
    }
}
