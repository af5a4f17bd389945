//! OTLP utility functions
//!
//! Provides reusable functions for working with OTLP protobuf types:
//! - Attribute flattening into dynamically typed attribute sets
//! - AnyValue conversion (native JSON types and string rendering)
//! - Shared attribute keys used across translation stages

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};
use serde_json::Value as JsonValue;

/// Flat attribute set: string key -> dynamically typed value.
pub type AttributeSet = serde_json::Map<String, JsonValue>;

// ============================================================================
// SHARED ATTRIBUTE KEYS
// ============================================================================

/// Shared attribute keys for resource and scope extraction
pub mod keys {
    pub const SERVICE_NAME: &str = "service.name";
    pub const TELEMETRY_SDK_LANGUAGE: &str = "telemetry.sdk.language";
    pub const LIBRARY_NAME: &str = "library.name";
    pub const LIBRARY_VERSION: &str = "library.version";
}

// ============================================================================
// ATTRIBUTE FLATTENING
// ============================================================================

/// Flatten a KeyValue list into `dest`, preserving native value types.
///
/// Keys are written as given by the wire format. Later entries overwrite
/// earlier ones on the same key. Entries with an empty key or no value are
/// skipped.
pub fn flatten_attributes(attrs: &[KeyValue], dest: &mut AttributeSet) {
    for kv in attrs {
        if kv.key.is_empty() {
            continue;
        }
        if let Some(value) = kv.value.as_ref() {
            dest.insert(kv.key.clone(), any_value_to_json(value));
        }
    }
}

/// Build a fresh attribute set from a KeyValue list.
pub fn build_attribute_set(attrs: &[KeyValue]) -> AttributeSet {
    let mut set = AttributeSet::new();
    flatten_attributes(attrs, &mut set);
    set
}

// ============================================================================
// VALUE CONVERSION
// ============================================================================

/// Convert AnyValue to JSON value (preserves native types)
pub fn any_value_to_json(value: &AnyValue) -> JsonValue {
    match &value.value {
        Some(any_value::Value::StringValue(s)) => JsonValue::from(s.as_str()),
        Some(any_value::Value::BoolValue(b)) => JsonValue::from(*b),
        Some(any_value::Value::IntValue(i)) => JsonValue::from(*i),
        // NaN and infinities have no JSON representation and become null
        Some(any_value::Value::DoubleValue(d)) => JsonValue::from(*d),
        Some(any_value::Value::ArrayValue(arr)) => {
            JsonValue::Array(arr.values.iter().map(any_value_to_json).collect())
        }
        Some(any_value::Value::KvlistValue(kvlist)) => {
            JsonValue::Object(build_attribute_set(&kvlist.values))
        }
        Some(any_value::Value::BytesValue(b)) => JsonValue::from(hex::encode(b)),
        None => JsonValue::Null,
    }
}

/// Convert AnyValue to string representation
pub fn any_value_to_string(value: &AnyValue) -> String {
    match &value.value {
        Some(any_value::Value::StringValue(s)) => s.clone(),
        Some(any_value::Value::BoolValue(b)) => b.to_string(),
        Some(any_value::Value::IntValue(i)) => i.to_string(),
        Some(any_value::Value::DoubleValue(d)) => d.to_string(),
        Some(any_value::Value::ArrayValue(_)) | Some(any_value::Value::KvlistValue(_)) => {
            any_value_to_json(value).to_string()
        }
        Some(any_value::Value::BytesValue(b)) => hex::encode(b),
        None => String::new(),
    }
}

/// Look up a string attribute in a flattened set.
pub fn get_str<'a>(attrs: &'a AttributeSet, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(JsonValue::as_str)
}
