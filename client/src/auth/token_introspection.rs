use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use log::warn;

/// Decode the exp (expiration) claim from a JWT without verifying it.
///
/// Only suitable for scheduling a renewal; the server remains the authority.
pub fn decode_exp(token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        warn!("Invalid JWT format: expected 3 parts");
        return None;
    }

    let decoded = match URL_SAFE_NO_PAD.decode(parts[1]) {
        Ok(d) => d,
        Err(e) => {
            warn!("Failed to decode JWT payload: {}", e);
            return None;
        }
    };

    let json: serde_json::Value = match serde_json::from_slice(&decoded) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to parse JWT payload JSON: {}", e);
            return None;
        }
    };

    json.get("exp")?.as_i64()
}

/// Seconds until expiry at `now`; `None` if undecodable or already expired
pub fn seconds_until_expiry_at(token: &str, now: i64) -> Option<i64> {
    let seconds = decode_exp(token)? - now;
    (seconds > 0).then_some(seconds)
}

pub fn seconds_until_expiry(token: &str) -> Option<i64> {
    seconds_until_expiry_at(token, Utc::now().timestamp())
}

/// Check if token is expiring within the specified threshold
pub fn is_expiring_within(token: &str, threshold_secs: i64) -> bool {
    match seconds_until_expiry(token) {
        Some(secs) => secs <= threshold_secs,
        None => true, // Treat invalid/expired as "expiring"
    }
}
