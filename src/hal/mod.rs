//! Hardware Abstraction Layer for NotifyButton.
//!
//! Thin wrappers around ESP-IDF peripherals and services.
//! Business logic stays in the library, HAL is just I/O.

pub mod gpio;
pub mod http;
pub mod storage;
pub mod timer;
pub mod wifi;

/// Microseconds since boot. Safe to call from an ISR.
#[inline]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time has no preconditions and is ISR-safe.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}
