//! UTM campaign tags pulled from the current location's query string.

use serde_json::Value;
use url::form_urlencoded;

use crate::event::Metadata;

/// Recognized campaign keys, in the order they are looked up.
pub const UTM_KEYS: [&str; 4] = ["utm_source", "utm_medium", "utm_campaign", "utm_content"];

/// Extracts the recognized UTM tags from `location`.
///
/// Keys that are absent or empty are left out. When a key repeats the first
/// occurrence wins.
pub fn extract_utm(location: &str) -> Metadata {
    let mut utm = Metadata::new();
    let query = query_string(location);
    if query.is_empty() {
        return utm;
    }

    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    for key in UTM_KEYS {
        let value = pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default();
        if !value.is_empty() {
            utm.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    utm
}

fn query_string(location: &str) -> &str {
    let Some((_, rest)) = location.split_once('?') else {
        return "";
    };
    rest.split_once('#').map_or(rest, |(query, _)| query)
}
