//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin};

use notify_button::{
    Config, ConnectionInfo, Dispatch, Indicator, IndicatorState, Link, RearmTimer, Transport,
    TransportResponse,
};

pub const CONFIG_JSON: &str = r#"{
    "wifi_ssid": "home",
    "wifi_pass": "secret",
    "button_deadtime_ms": 2000,
    "telegram": {
        "bot_token": "123:abc",
        "chat_id": "42",
        "default_msg": "Ding dong"
    }
}"#;

pub fn test_config() -> Config {
    Config::from_json(CONFIG_JSON).unwrap()
}

/// Indicator that records every state it is asked to show.
#[derive(Default)]
pub struct RecordingIndicator {
    history: Mutex<Vec<IndicatorState>>,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<IndicatorState> {
        self.history.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<IndicatorState> {
        self.history.lock().unwrap().last().copied()
    }

    pub fn clear(&self) {
        self.history.lock().unwrap().clear();
    }
}

impl Indicator for RecordingIndicator {
    fn set_indicator(&self, state: IndicatorState) {
        self.history.lock().unwrap().push(state);
    }
}

/// Dispatcher returning scripted results; `true` once the script runs out.
#[derive(Default)]
pub struct MockDispatch {
    script: VecDeque<bool>,
    pub messages: Vec<Option<String>>,
}

impl MockDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: &[bool]) -> Self {
        Self {
            script: results.iter().copied().collect(),
            messages: Vec::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.messages.len()
    }
}

impl Dispatch for MockDispatch {
    fn dispatch(&mut self, message: Option<&str>) -> bool {
        self.messages.push(message.map(String::from));
        self.script.pop_front().unwrap_or(true)
    }
}

/// Transport fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unreachable;

/// Transport returning scripted responses and recording requested URLs.
#[derive(Default)]
pub struct MockTransport {
    responses: VecDeque<Result<TransportResponse, Unreachable>>,
    pub urls: Vec<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, status: u16, body: &str) -> Self {
        self.responses.push_back(Ok(TransportResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    pub fn fail(mut self) -> Self {
        self.responses.push_back(Err(Unreachable));
        self
    }
}

impl Transport for MockTransport {
    type Error = Unreachable;

    fn get(&mut self, url: &str) -> Result<TransportResponse, Unreachable> {
        self.urls.push(url.to_string());
        self.responses.pop_front().unwrap_or(Err(Unreachable))
    }
}

/// Timer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerUnavailable;

/// Timer that records requested countdowns; tests fire it by hand.
#[derive(Default)]
pub struct MockTimer {
    scheduled: RefCell<Vec<Duration>>,
    pending: Cell<bool>,
    broken: bool,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn scheduled(&self) -> Vec<Duration> {
        self.scheduled.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Expire the countdown. Returns `false` if nothing was scheduled.
    pub fn expire(&self) -> bool {
        self.pending.replace(false)
    }
}

impl RearmTimer for MockTimer {
    type Error = TimerUnavailable;

    fn schedule_once(&self, after: Duration) -> Result<(), TimerUnavailable> {
        if self.broken {
            return Err(TimerUnavailable);
        }
        self.scheduled.borrow_mut().push(after);
        self.pending.set(true);
        Ok(())
    }
}

/// Association failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoAccessPoint;

/// Link that fails a fixed number of times before connecting.
pub struct MockLink {
    failures_left: u32,
    pub attempts: Vec<(String, String)>,
}

impl MockLink {
    pub fn failing(times: u32) -> Self {
        Self {
            failures_left: times,
            attempts: Vec::new(),
        }
    }

    pub fn info() -> ConnectionInfo {
        ConnectionInfo {
            ip: Ipv4Addr::new(192, 168, 1, 50),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
            netmask_bits: 24,
        }
    }
}

impl Link for MockLink {
    type Error = NoAccessPoint;

    fn connect(&mut self, ssid: &str, password: &str) -> Result<ConnectionInfo, NoAccessPoint> {
        self.attempts.push((ssid.to_string(), password.to_string()));
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(NoAccessPoint);
        }
        Ok(Self::info())
    }
}

/// Output pin whose level is observable after the pin is moved away.
#[derive(Clone, Default)]
pub struct MockPin {
    level: Arc<AtomicBool>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.level.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.level.store(true, Ordering::SeqCst);
        Ok(())
    }
}
