//! Two-channel status LED.
//!
//! A green and a red LED (or one bi-colour part) show the trigger phase.
//! Both on reads as orange.
//!
//! | state  | green | red |
//! |--------|-------|-----|
//! | Off    | off   | off |
//! | Green  | on    | off |
//! | Red    | off   | on  |
//! | Orange | on    | on  |
//!
//! The indicator is write-only: nothing in the firmware reads the LED back.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// Visual state of the status LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum IndicatorState {
    /// Not initialised yet.
    Off = 0,
    /// Armed and ready, or last attempt delivered.
    Green = 1,
    /// Attempt in progress.
    Orange = 2,
    /// Last attempt failed, or link not up yet.
    Red = 3,
}

impl IndicatorState {
    /// Channel levels as `(green, red)`.
    #[inline]
    pub const fn channels(self) -> (bool, bool) {
        match self {
            IndicatorState::Off => (false, false),
            IndicatorState::Green => (true, false),
            IndicatorState::Red => (false, true),
            IndicatorState::Orange => (true, true),
        }
    }
}

/// Anything that can show an [`IndicatorState`].
///
/// Implementations must be callable from interrupt context: no allocation,
/// no blocking.
pub trait Indicator {
    fn set_indicator(&self, state: IndicatorState);
}

impl<T: Indicator + ?Sized> Indicator for &T {
    #[inline]
    fn set_indicator(&self, state: IndicatorState) {
        (**self).set_indicator(state)
    }
}

impl<T: Indicator + ?Sized> Indicator for alloc::sync::Arc<T> {
    #[inline]
    fn set_indicator(&self, state: IndicatorState) {
        (**self).set_indicator(state)
    }
}

/// Status LED on two GPIO outputs.
///
/// Both pins sit behind one critical section so that a write from the
/// timer task and a write from the main task never interleave into a
/// mixed colour.
pub struct StatusIndicator<G, R> {
    pins: Mutex<RefCell<(G, R)>>,
}

impl<G: OutputPin, R: OutputPin> StatusIndicator<G, R> {
    /// Take ownership of the two LED pins. The LED is driven off.
    pub fn new(green: G, red: R) -> Self {
        let indicator = Self {
            pins: Mutex::new(RefCell::new((green, red))),
        };
        indicator.set_indicator(IndicatorState::Off);
        indicator
    }

    /// Give the pins back.
    pub fn release(self) -> (G, R) {
        self.pins.into_inner().into_inner()
    }
}

impl<G: OutputPin, R: OutputPin> Indicator for StatusIndicator<G, R> {
    fn set_indicator(&self, state: IndicatorState) {
        let (green_on, red_on) = state.channels();

        critical_section::with(|cs| {
            let mut pins = self.pins.borrow_ref_mut(cs);
            let (green, red) = &mut *pins;
            // Pin errors are not actionable here; the LED is best effort.
            let _ = green.set_state(green_on.into());
            let _ = red.set_state(red_on.into());
        });
    }
}
