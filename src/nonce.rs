//! Per-request OAuth nonce and timestamp.

use std::time::{SystemTime, UNIX_EPOCH};

/// Length of a generated nonce.
pub const NONCE_LEN: usize = 32;

/// Generate an `oauth_nonce` value.
///
/// Format: 32 ASCII alphanumeric characters, the same shape NetSuite's own
/// TBA samples send. The value is unreserved in RFC 3986, so it survives
/// percent-encoding unchanged.
pub fn generate_nonce() -> String {
    let mut nonce = String::with_capacity(NONCE_LEN);
    for _ in 0..NONCE_LEN {
        nonce.push(fastrand::alphanumeric());
    }
    nonce
}

/// Current time as whole seconds since the Unix epoch (`oauth_timestamp`).
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
