//! Per-event sample rate resolution.

use serde_json::Value as JsonValue;

use crate::utils::otlp::AttributeSet;

/// Sample rate used when no (valid) hint is present.
pub const DEFAULT_SAMPLE_RATE: i32 = 1;

/// Attribute keys carrying a sample rate hint, in lookup order.
const SAMPLE_RATE_KEYS: [&str; 2] = ["sampleRate", "SampleRate"];

/// Resolve the sample rate from merged event attributes.
///
/// Looks up `sampleRate`, then `SampleRate` (case-sensitive). Numbers and
/// integer strings are clamped into the `i32` range, anything else falls
/// back to [`DEFAULT_SAMPLE_RATE`]. A rate of `0` is reported as `1`.
///
/// The resolved key is removed from `attrs` whenever it was present.
pub fn resolve_sample_rate(attrs: &mut AttributeSet) -> i32 {
    let Some(key) = SAMPLE_RATE_KEYS.iter().find(|k| attrs.contains_key(**k)) else {
        return DEFAULT_SAMPLE_RATE;
    };

    let rate = attrs
        .remove(*key)
        .and_then(|value| parse_sample_rate(&value))
        .unwrap_or(DEFAULT_SAMPLE_RATE);

    if rate == 0 { DEFAULT_SAMPLE_RATE } else { rate }
}

fn parse_sample_rate(value: &JsonValue) -> Option<i32> {
    match value {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(clamp_i32(i))
            } else if let Some(u) = n.as_u64() {
                Some(clamp_i32(i64::try_from(u).unwrap_or(i64::MAX)))
            } else {
                // `as` saturates on overflow and truncates toward zero
                n.as_f64().map(|f| clamp_i32(f as i64))
            }
        }
        JsonValue::String(s) => s.parse::<i64>().ok().map(clamp_i32),
        _ => None,
    }
}

#[inline]
fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
