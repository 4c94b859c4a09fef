//! Client Identity Module
//!
//! Derives the rate-limit identifier from the requesting IP and a coarse
//! fingerprint of the client, so that spoofing requires controlling both.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Derives a deterministic identifier for the requesting client.
///
/// The IP is taken from `X-Forwarded-For` (first hop) or `X-Real-IP`; the
/// gateway always runs behind the reverse proxy that sets them. The
/// user-agent string is folded into the digest as the fingerprint component.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let ip = forwarded_ip(headers).unwrap_or("unknown");
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    let digest = hasher.finalize();

    // 16 bytes of the digest is plenty for a counter key
    hex::encode(&digest[..16])
}

fn forwarded_ip(headers: &HeaderMap) -> Option<&str> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().map(str::trim);
        if let Some(ip) = first.filter(|ip| !ip.is_empty()) {
            return Some(ip);
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
}
