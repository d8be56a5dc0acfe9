//! HTTP transport on the ESP-IDF client.
//!
//! A fresh connection per request: the device sends a handful of messages
//! a day, and a kept-alive socket would mostly be a stale one.

use core::time::Duration;

use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::http::Method;
use esp_idf_svc::sys::EspError;

use notify_button::{Transport, TransportResponse};

/// Response bodies beyond this are cut off (and will then fail to parse).
pub const MAX_BODY_LEN: usize = 4096;

pub struct EspHttpTransport {
    timeout: Duration,
}

impl EspHttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for EspHttpTransport {
    type Error = EspError;

    fn get(&mut self, url: &str) -> Result<TransportResponse, EspError> {
        let mut conn = EspHttpConnection::new(&Configuration {
            timeout: Some(self.timeout),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })?;

        conn.initiate_request(Method::Get, url, &[])?;
        conn.initiate_response()?;
        let status = conn.status();

        let mut body = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = conn.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            let room = MAX_BODY_LEN - body.len();
            body.extend_from_slice(&chunk[..n.min(room)]);
            if n >= room {
                log::warn!("http: body longer than {} bytes, truncated", MAX_BODY_LEN);
                break;
            }
        }

        log::debug!("http: status {}, {} byte body", status, body.len());
        Ok(TransportResponse { status, body })
    }
}
