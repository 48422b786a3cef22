//! JSON key-case conversion applied at the endpoint wire boundary.
//!
//! Models use Rust's `snake_case` field names. Encoding rewrites every object
//! key of the serialized model into the wire convention; decoding rewrites
//! wire keys back into `snake_case` before deserializing. Keys of map-typed
//! fields are rewritten too, so use `Preserve` for models carrying
//! user-defined maps.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key convention used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyConvention {
    /// `created_at`
    #[default]
    SnakeCase,
    /// `createdAt`
    CamelCase,
    /// No rewriting in either direction.
    Preserve,
}

impl KeyConvention {
    /// Serialize `model` to JSON bytes with keys in this convention.
    pub fn encode<T: Serialize>(&self, model: &T) -> Result<Vec<u8>, ApiError> {
        let value = serde_json::to_value(model).map_err(|e| ApiError::Encoding(e.to_string()))?;
        let value = match self {
            KeyConvention::SnakeCase => rewrite_keys(value, &to_snake_case),
            KeyConvention::CamelCase => rewrite_keys(value, &to_camel_case),
            KeyConvention::Preserve => value,
        };
        serde_json::to_vec(&value).map_err(|e| ApiError::Encoding(e.to_string()))
    }

    /// Deserialize wire bytes written in this convention.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ApiError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| ApiError::Decoding(e.to_string()))?;
        let value = match self {
            KeyConvention::SnakeCase | KeyConvention::CamelCase => {
                rewrite_keys(value, &to_snake_case)
            }
            KeyConvention::Preserve => value,
        };
        serde_json::from_value(value).map_err(|e| ApiError::Decoding(e.to_string()))
    }
}

fn rewrite_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (convert(&k), rewrite_keys(v, convert)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rewrite_keys(v, convert)).collect())
        }
        other => other,
    }
}

/// `createdAt` -> `created_at`, `HTTPStatus` -> `http_status`.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `created_at` -> `createdAt`. Leading underscores are kept.
pub fn to_camel_case(key: &str) -> String {
    let trimmed = key.trim_start_matches('_');
    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..key.len() - trimmed.len()]);

    let mut upper_next = false;
    for c in trimmed.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
