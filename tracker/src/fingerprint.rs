//! Coarse device fingerprint.
//!
//! The hash must stay byte-for-byte compatible with what the collection endpoint
//! already stores: signals joined with `|`, folded over UTF-16 code units with
//! `h = (h << 5) - h + c` in wrapping 32-bit arithmetic, absolute value in base 36,
//! prefixed with `fp_`. Collisions are acceptable.

use crate::browsing::{BrowsingContext, DeviceSignals};

/// Returned when there is no browsing context to read signals from.
pub const SERVER_SENTINEL: &str = "server";

const PREFIX: &str = "fp_";
const DELIMITER: &str = "|";

/// Fingerprint of the current device, or [`SERVER_SENTINEL`] without a browsing context.
pub fn fingerprint(browsing: Option<&dyn BrowsingContext>) -> String {
    match browsing {
        Some(ctx) => fingerprint_signals(&ctx.device_signals()),
        None => SERVER_SENTINEL.to_string(),
    }
}

pub fn fingerprint_signals(signals: &DeviceSignals) -> String {
    let raw = [
        signals.user_agent.clone(),
        signals.language.clone(),
        signals.screen_width.to_string(),
        signals.screen_height.to_string(),
        signals.timezone_offset_minutes.to_string(),
    ]
    .join(DELIMITER);

    let hash = rolling_hash(&raw);
    format!("{PREFIX}{}", to_base36(u64::from(hash.unsigned_abs())))
}

fn rolling_hash(raw: &str) -> i32 {
    raw.encode_utf16().fold(0i32, |h, unit| {
        (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

/// Lowercase base-36 rendering, as produced by `Number.prototype.toString(36)`.
pub(crate) fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
