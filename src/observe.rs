//! Observability hooks for the forwarder.
//!
//! [`RestletClient`](crate::client::RestletClient) reports each stage of a
//! forward through a [`RelayObserver`] instead of logging directly. The server
//! and CLI install [`TracingObserver`]; tests can plug in their own.

use std::time::Duration;

use reqwest::{StatusCode, Url};

use crate::client::ForwardError;
use crate::oauth::SignatureMethod;

pub trait RelayObserver: Send + Sync {
    /// A signed request is about to be sent.
    fn forwarding(&self, _url: &Url, _method: SignatureMethod, _payload_bytes: usize) {}

    /// The RESTlet answered with `status` after `elapsed`.
    fn upstream_responded(&self, _status: StatusCode, _elapsed: Duration) {}

    /// A response was parsed and is being relayed.
    fn relayed(&self, _elapsed: Duration) {}

    fn failed(&self, _error: &ForwardError) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RelayObserver for NoopObserver {}

/// Emits `tracing` events. Never logs credentials or payload contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RelayObserver for TracingObserver {
    fn forwarding(&self, url: &Url, method: SignatureMethod, payload_bytes: usize) {
        tracing::info!(
            host = url.host_str().unwrap_or_default(),
            signature_method = %method,
            "Forwarding lead to NetSuite RESTlet"
        );
        tracing::debug!(%url, payload_bytes, "RESTlet request");
    }

    fn upstream_responded(&self, status: StatusCode, elapsed: Duration) {
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "NetSuite responded"
        );
    }

    fn relayed(&self, elapsed: Duration) {
        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Relaying NetSuite response");
    }

    fn failed(&self, error: &ForwardError) {
        match error {
            ForwardError::Upstream { status, .. } => {
                tracing::error!(status = status.as_u16(), "NetSuite rejected lead: {}", error)
            }
            _ => tracing::error!("Forwarding lead failed: {}", error),
        }
    }
}
