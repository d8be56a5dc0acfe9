//! Notification dispatcher.
//!
//! One trigger, one HTTP GET to the bot API:
//!
//! ```text
//! {api_base}/bot{token}/sendMessage?chat_id={chat_id}&text={message}
//! ```
//!
//! The endpoint answers with JSON. Only `status == 200` together with
//! `"ok": true` counts as delivered. Every other outcome is a
//! [`DispatchError`], and [`Dispatch::dispatch`] collapses all of them to
//! `false`: the caller runs next to an interrupt handler and must never see
//! a fault escape.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use serde_json::Value;

use crate::config::NotificationConfig;

/// Raw response from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Blocking HTTP GET.
///
/// Implementations must bound the call with a timeout.
pub trait Transport {
    type Error: fmt::Debug;

    fn get(&mut self, url: &str) -> Result<TransportResponse, Self::Error>;
}

/// Why a dispatch attempt did not deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Connection, TLS, timeout or read failure.
    Transport,
    /// Non-200 HTTP status.
    Status(u16),
    /// Body is not a JSON object.
    Malformed,
    /// JSON object without an `ok` flag.
    MissingAck,
    /// `"ok": false`, with the endpoint's description if it sent one.
    Rejected(Option<String>),
}

impl core::error::Error for DispatchError {}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Transport => write!(f, "transport failure"),
            DispatchError::Status(code) => write!(f, "HTTP status {}", code),
            DispatchError::Malformed => write!(f, "malformed response body"),
            DispatchError::MissingAck => write!(f, "response has no 'ok' flag"),
            DispatchError::Rejected(Some(why)) => write!(f, "rejected: {}", why),
            DispatchError::Rejected(None) => write!(f, "rejected"),
        }
    }
}

/// One best-effort notification attempt.
pub trait Dispatch {
    /// Send `message`, or the configured default when `None`.
    ///
    /// Returns `true` only when the endpoint acknowledged delivery.
    fn dispatch(&mut self, message: Option<&str>) -> bool;
}

impl<D: Dispatch + ?Sized> Dispatch for &mut D {
    #[inline]
    fn dispatch(&mut self, message: Option<&str>) -> bool {
        (**self).dispatch(message)
    }
}

/// Bot API dispatcher over any [`Transport`].
pub struct Dispatcher<T> {
    transport: T,
    api_base: String,
    bot_token: String,
    chat_id: String,
    default_message: String,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, config: &NotificationConfig) -> Self {
        Self {
            transport,
            api_base: config.api_base.clone(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            default_message: config.default_message.clone(),
        }
    }

    /// Full request URL for `text`.
    pub fn endpoint_url(&self, text: &str) -> String {
        let mut url = String::with_capacity(
            self.api_base.len() + self.bot_token.len() + self.chat_id.len() + text.len() * 3 + 40,
        );
        url.push_str(&self.api_base);
        url.push_str("/bot");
        url.push_str(&self.bot_token);
        url.push_str("/sendMessage?chat_id=");
        percent_encode_into(&mut url, &self.chat_id);
        url.push_str("&text=");
        percent_encode_into(&mut url, text);
        url
    }

    /// Single attempt with the failure reason kept.
    pub fn try_send(&mut self, message: Option<&str>) -> Result<(), DispatchError> {
        let text = message.unwrap_or(&self.default_message);
        let url = self.endpoint_url(text);

        let response = self.transport.get(&url).map_err(|e| {
            log::warn!("dispatch: transport error: {:?}", e);
            DispatchError::Transport
        })?;

        check_response(&response)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Dispatch for Dispatcher<T> {
    fn dispatch(&mut self, message: Option<&str>) -> bool {
        match self.try_send(message) {
            Ok(()) => {
                log::info!("dispatch: delivered");
                true
            }
            Err(e) => {
                log::warn!("dispatch: failed: {}", e);
                false
            }
        }
    }
}

/// Interpret a transport response.
pub fn check_response(response: &TransportResponse) -> Result<(), DispatchError> {
    if response.status != 200 {
        return Err(DispatchError::Status(response.status));
    }

    let body: Value =
        serde_json::from_slice(&response.body).map_err(|_| DispatchError::Malformed)?;
    let ack = body.as_object().ok_or(DispatchError::Malformed)?;

    match ack.get("ok").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        Some(false) => Err(DispatchError::Rejected(
            ack.get("description")
                .and_then(Value::as_str)
                .map(String::from),
        )),
        None => Err(DispatchError::MissingAck),
    }
}

/// Append `value` to `out`, percent-encoding everything except the
/// RFC 3986 unreserved set.
pub fn percent_encode_into(out: &mut String, value: &str) {
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
}
