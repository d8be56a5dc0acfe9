//! Network bootstrap tests

mod common;

use common::MockLink;
use notify_button::{bootstrap, BootstrapError};

#[test]
fn test_first_attempt_succeeds() {
    let mut link = MockLink::failing(0);
    let config = common::test_config();

    let info = bootstrap(&mut link, &config).unwrap();

    assert_eq!(info, MockLink::info());
    assert_eq!(link.attempts, vec![("home".to_string(), "secret".to_string())]);
}

#[test]
fn test_retries_until_connected() {
    let mut link = MockLink::failing(2);
    let config = common::test_config();

    assert!(bootstrap(&mut link, &config).is_ok());
    assert_eq!(link.attempts.len(), 3);
}

#[test]
fn test_gives_up_after_configured_attempts() {
    let mut link = MockLink::failing(u32::MAX);
    let mut config = common::test_config();
    config.wifi_attempts = 4;

    assert_eq!(
        bootstrap(&mut link, &config),
        Err(BootstrapError::Exhausted { attempts: 4 })
    );
    assert_eq!(link.attempts.len(), 4);
}

#[test]
fn test_zero_attempts_still_tries_once() {
    let mut link = MockLink::failing(0);
    let mut config = common::test_config();
    config.wifi_attempts = 0;

    assert!(bootstrap(&mut link, &config).is_ok());
    assert_eq!(link.attempts.len(), 1);
}

#[test]
fn test_connection_info_display() {
    assert_eq!(MockLink::info().to_string(), "192.168.1.50/24 via 192.168.1.1");
}

#[test]
fn test_exhausted_display() {
    assert_eq!(
        BootstrapError::Exhausted { attempts: 3 }.to_string(),
        "network not reachable after 3 attempt(s)"
    );
}
