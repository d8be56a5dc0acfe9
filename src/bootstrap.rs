//! Network bootstrap.
//!
//! The trigger machine stays locked until this returns `Ok`. Each
//! [`Link::connect`] call is bounded by the link's own timeout; the
//! bootstrap gives up after a fixed number of attempts instead of spinning
//! forever.

use core::fmt;
use core::net::Ipv4Addr;

use crate::config::Config;

/// Addressing obtained from the access point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask_bits: u8,
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} via {}", self.ip, self.netmask_bits, self.gateway)
    }
}

/// Blocking link-layer association.
pub trait Link {
    type Error: fmt::Debug;

    /// Join `ssid` and wait until an address is assigned, or fail after the
    /// implementation's timeout.
    fn connect(&mut self, ssid: &str, password: &str) -> Result<ConnectionInfo, Self::Error>;
}

/// Bootstrap failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapError {
    /// Every attempt failed.
    Exhausted { attempts: u32 },
}

impl core::error::Error for BootstrapError {}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Exhausted { attempts } => {
                write!(f, "network not reachable after {} attempt(s)", attempts)
            }
        }
    }
}

/// Join the configured network, retrying up to `config.wifi_attempts` times.
pub fn bootstrap<L: Link + ?Sized>(
    link: &mut L,
    config: &Config,
) -> Result<ConnectionInfo, BootstrapError> {
    let attempts = config.wifi_attempts.max(1);

    for attempt in 1..=attempts {
        log::info!(
            "bootstrap: connecting to '{}' (attempt {}/{})",
            config.wifi_ssid,
            attempt,
            attempts
        );

        match link.connect(&config.wifi_ssid, &config.wifi_password) {
            Ok(info) => {
                log::info!("bootstrap: connected, {}", info);
                return Ok(info);
            }
            Err(e) => {
                log::warn!("bootstrap: attempt {} failed: {:?}", attempt, e);
            }
        }
    }

    Err(BootstrapError::Exhausted { attempts })
}
