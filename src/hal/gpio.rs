//! GPIO HAL for the button input and the status LEDs.
//!
//! Pin map:
//!
//! | GPIO | use                                   |
//! |------|---------------------------------------|
//! | 5    | green LED, active high                |
//! | 4    | red LED, active high                  |
//! | 12   | button to GND, internal pull-up       |
//! | 2    | on-board LED, active low, kept off    |

use esp_idf_svc::hal::gpio::{
    AnyIOPin, AnyOutputPin, IOPin, Input, InterruptType, Output, OutputPin, PinDriver, Pins, Pull,
};
use esp_idf_svc::sys::EspError;

use notify_button::StatusIndicator;

pub type LedPin = PinDriver<'static, AnyOutputPin, Output>;
pub type ButtonPin = PinDriver<'static, AnyIOPin, Input>;
pub type BoardIndicator = StatusIndicator<LedPin, LedPin>;

/// Board I/O after bring-up.
pub struct Board {
    pub indicator: BoardIndicator,
    pub button: ButtonPin,
    /// Held only so the pin stays driven high (LED off).
    pub onboard_led: LedPin,
}

impl Board {
    /// Configure all pins. LEDs start off; the button interrupt type is
    /// set to falling edge but the interrupt stays disabled.
    pub fn new(pins: Pins) -> Result<Self, EspError> {
        let green = PinDriver::output(pins.gpio5.downgrade_output())?;
        let red = PinDriver::output(pins.gpio4.downgrade_output())?;
        let indicator = StatusIndicator::new(green, red);

        let mut onboard_led = PinDriver::output(pins.gpio2.downgrade_output())?;
        onboard_led.set_high()?;

        let mut button = PinDriver::input(pins.gpio12.downgrade())?;
        button.set_pull(Pull::Up)?;
        button.set_interrupt_type(InterruptType::NegEdge)?;

        Ok(Self {
            indicator,
            button,
            onboard_led,
        })
    }
}
