//! Module: config
//!
//! Purpose: Static device configuration, loaded once at boot from a JSON
//! document and read-only afterwards.
//!
//! Format:
//! ```json
//! {
//!     "wifi_ssid": "home",
//!     "wifi_pass": "secret",
//!     "button_deadtime_ms": 2000,
//!     "telegram": {
//!         "bot_token": "123456:ABC",
//!         "chat_id": "42",
//!         "default_msg": "Ding dong!"
//!     }
//! }
//! ```
//!
//! Optional top-level keys: `wifi_timeout_ms`, `wifi_attempts`.
//! Optional `telegram` keys: `api_base`, `http_timeout_ms`.
//! The `telegram` section is also accepted as `notification`.
//!
//! Safety: Safe. Parsing allocates; call it before any interrupt is enabled.

use alloc::string::String;
use core::fmt;
use core::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Default messaging endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT_MS: u32 = 10_000;

/// Default time allowed for one Wi-Fi association attempt.
pub const DEFAULT_WIFI_TIMEOUT_MS: u32 = 20_000;

/// Default number of Wi-Fi association attempts before giving up.
pub const DEFAULT_WIFI_ATTEMPTS: u32 = 3;

/// Longest SSID allowed by 802.11.
pub const MAX_SSID_LEN: usize = 32;

/// Longest WPA2 passphrase (64 for a raw hex PSK).
pub const MAX_PASSWORD_LEN: usize = 64;

/// Messaging endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub default_message: String,
    pub http_timeout: Duration,
}

/// Complete device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub wifi_timeout: Duration,
    pub wifi_attempts: u32,
    /// Lockout after an accepted trigger.
    pub dead_time: Duration,
    pub notification: NotificationConfig,
}

/// Configuration load error.
#[derive(Debug)]
pub enum ConfigError {
    /// Not valid JSON, or a required key is missing or mistyped.
    Parse(serde_json::Error),
    /// Well-formed but unusable value.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl core::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "config field '{}' {}", field, reason)
            }
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Deserialize)]
struct RawConfig {
    wifi_ssid: String,
    wifi_pass: String,
    button_deadtime_ms: u32,
    #[serde(alias = "notification")]
    telegram: RawNotification,
    #[serde(default = "default_wifi_timeout_ms")]
    wifi_timeout_ms: u32,
    #[serde(default = "default_wifi_attempts")]
    wifi_attempts: u32,
}

#[derive(Deserialize)]
struct RawNotification {
    bot_token: String,
    chat_id: String,
    default_msg: String,
    #[serde(default = "default_api_base")]
    api_base: String,
    #[serde(default = "default_http_timeout_ms")]
    http_timeout_ms: u32,
}

fn default_api_base() -> String {
    String::from(DEFAULT_API_BASE)
}

fn default_http_timeout_ms() -> u32 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_wifi_timeout_ms() -> u32 {
    DEFAULT_WIFI_TIMEOUT_MS
}

fn default_wifi_attempts() -> u32 {
    DEFAULT_WIFI_ATTEMPTS
}

fn require(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

impl Config {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Same as [`Config::from_json`] for a byte buffer read from flash.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Only objects are accepted; serde would otherwise also take the
    /// fields positionally from an array.
    fn from_value(value: Value) -> Result<Self, ConfigError> {
        let root = value.as_object().ok_or(ConfigError::Invalid {
            field: "<root>",
            reason: "must be a JSON object",
        })?;
        if let Some(section) = root.get("telegram").or_else(|| root.get("notification")) {
            require(section.is_object(), "telegram", "must be a JSON object")?;
        }

        let raw: RawConfig = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        require(!raw.wifi_ssid.is_empty(), "wifi_ssid", "must not be empty")?;
        require(raw.wifi_ssid.len() <= MAX_SSID_LEN, "wifi_ssid", "is longer than 32 bytes")?;
        require(
            raw.wifi_pass.len() <= MAX_PASSWORD_LEN,
            "wifi_pass",
            "is longer than 64 bytes",
        )?;
        require(raw.button_deadtime_ms > 0, "button_deadtime_ms", "must be greater than 0")?;
        require(raw.wifi_attempts > 0, "wifi_attempts", "must be at least 1")?;
        require(raw.wifi_timeout_ms > 0, "wifi_timeout_ms", "must be greater than 0")?;

        let n = raw.telegram;
        require(!n.bot_token.is_empty(), "bot_token", "must not be empty")?;
        require(!n.chat_id.is_empty(), "chat_id", "must not be empty")?;
        require(n.http_timeout_ms > 0, "http_timeout_ms", "must be greater than 0")?;
        require(
            n.api_base.starts_with("http://") || n.api_base.starts_with("https://"),
            "api_base",
            "must start with http:// or https://",
        )?;

        let api_base = String::from(n.api_base.trim_end_matches('/'));

        Ok(Config {
            wifi_ssid: raw.wifi_ssid,
            wifi_password: raw.wifi_pass,
            wifi_timeout: Duration::from_millis(raw.wifi_timeout_ms as u64),
            wifi_attempts: raw.wifi_attempts,
            dead_time: Duration::from_millis(raw.button_deadtime_ms as u64),
            notification: NotificationConfig {
                api_base,
                bot_token: n.bot_token,
                chat_id: n.chat_id,
                default_message: n.default_msg,
                http_timeout: Duration::from_millis(n.http_timeout_ms as u64),
            },
        })
    }
}
