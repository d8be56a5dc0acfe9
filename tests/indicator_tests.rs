//! Status LED tests

mod common;

use common::MockPin;
use notify_button::{Indicator, IndicatorState, StatusIndicator};

fn levels(green: &MockPin, red: &MockPin) -> (bool, bool) {
    (green.is_high(), red.is_high())
}

#[test]
fn test_new_drives_led_off() {
    let green = MockPin::new();
    let red = MockPin::new();
    let mut g = green.clone();
    let mut r = red.clone();
    embedded_hal::digital::OutputPin::set_high(&mut g).unwrap();
    embedded_hal::digital::OutputPin::set_high(&mut r).unwrap();

    let _indicator = StatusIndicator::new(g, r);

    assert_eq!(levels(&green, &red), (false, false));
}

#[test]
fn test_each_state_drives_both_channels() {
    let green = MockPin::new();
    let red = MockPin::new();
    let indicator = StatusIndicator::new(green.clone(), red.clone());

    indicator.set_indicator(IndicatorState::Green);
    assert_eq!(levels(&green, &red), (true, false));

    indicator.set_indicator(IndicatorState::Orange);
    assert_eq!(levels(&green, &red), (true, true));

    indicator.set_indicator(IndicatorState::Red);
    assert_eq!(levels(&green, &red), (false, true));

    indicator.set_indicator(IndicatorState::Off);
    assert_eq!(levels(&green, &red), (false, false));
}

#[test]
fn test_release_returns_pins() {
    let indicator = StatusIndicator::new(MockPin::new(), MockPin::new());
    indicator.set_indicator(IndicatorState::Red);

    let (green, red) = indicator.release();
    assert_eq!(levels(&green, &red), (false, true));
}

#[test]
fn test_shared_across_threads() {
    use std::sync::Arc;
    use std::thread;

    let green = MockPin::new();
    let red = MockPin::new();
    let indicator = Arc::new(StatusIndicator::new(green.clone(), red.clone()));

    let handles: Vec<_> = [IndicatorState::Green, IndicatorState::Red]
        .into_iter()
        .map(|state| {
            let indicator = Arc::clone(&indicator);
            thread::spawn(move || {
                for _ in 0..1000 {
                    indicator.set_indicator(state);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Writes never interleave into orange or off
    let (g, r) = levels(&green, &red);
    assert!(g != r);
}
