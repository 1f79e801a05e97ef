//! Null-tolerant field conversions for the service's loosely-typed JSON.
//!
//! # Design
//! The service reports the same logical field as a number on one endpoint and
//! as a numeric string on another, and omits or nulls fields freely. Every
//! conversion here maps "absent" to `None` and otherwise either converts or
//! fails loudly; nothing falls back to a default value.
//!
//! The `de_*` functions are `deserialize_with` adapters so the record types in
//! `types` can be derived instead of assembled by hand.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::types::Record;

/// Prefix joined onto every relative image path the service returns.
pub const BASE_URL: &str = "https://retroachievements.org";

#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("`{0}` is not an integer")]
    InvalidInt(String),

    #[error("`{0}` is not a number")]
    InvalidFloat(String),

    #[error("`{value}` is not a `YYYY-MM-DD HH:MM:SS` datetime")]
    InvalidDateTime {
        value: String,
        #[source]
        source: time::error::Parse,
    },

    #[error("expected {expected}, found `{found}`")]
    UnexpectedType { expected: &'static str, found: Value },
}

pub fn int_or_none(value: Option<&Value>) -> Result<Option<i64>, CoerceError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                Ok(Some(int))
            } else if let Some(float) = n.as_f64() {
                Ok(Some(float.trunc() as i64))
            } else {
                Err(CoerceError::InvalidInt(n.to_string()))
            }
        }
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CoerceError::InvalidInt(s.clone())),
        other => Err(CoerceError::UnexpectedType {
            expected: "an integer or numeric string",
            found: other.clone(),
        }),
    }
}

pub fn float_or_none(value: Option<&Value>) -> Result<Option<f64>, CoerceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| CoerceError::InvalidFloat(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CoerceError::InvalidFloat(s.clone())),
        Some(other) => Err(CoerceError::UnexpectedType {
            expected: "a number or numeric string",
            found: other.clone(),
        }),
    }
}

pub fn datetime_or_none(value: Option<&str>) -> Result<Option<PrimitiveDateTime>, CoerceError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    PrimitiveDateTime::parse(value, format)
        .map(Some)
        .map_err(|source| CoerceError::InvalidDateTime {
            value: value.to_string(),
            source,
        })
}

pub fn image_url_or_none(path: Option<&str>) -> Option<String> {
    path.map(|path| format!("{BASE_URL}{path}"))
}

/// Booleans arrive as `true`, `1` or `"1"` depending on the endpoint.
pub fn flag_or_none(value: Option<&Value>) -> Result<Option<bool>, CoerceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(other) => match int_or_none(Some(other)) {
            Ok(Some(0)) => Ok(Some(false)),
            Ok(Some(1)) => Ok(Some(true)),
            _ => Err(CoerceError::UnexpectedType {
                expected: "a boolean, 0 or 1",
                found: other.clone(),
            }),
        },
    }
}

pub(crate) fn de_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;

    int_or_none(value.as_ref()).map_err(D::Error::custom)
}

pub(crate) fn de_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;

    float_or_none(value.as_ref()).map_err(D::Error::custom)
}

pub(crate) fn de_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;

    flag_or_none(value.as_ref()).map_err(D::Error::custom)
}

pub(crate) fn de_datetime<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<PrimitiveDateTime>, D::Error> {
    let value = Option::<String>::deserialize(d)?;

    datetime_or_none(value.as_deref()).map_err(D::Error::custom)
}

pub(crate) fn de_image_url<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let path = Option::<String>::deserialize(d)?;

    Ok(image_url_or_none(path.as_deref()))
}

/// A null list is treated like a missing one.
pub(crate) fn de_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default())
}

/// Numbers in text fields (e.g. a numeric motto) are kept as their string form.
pub(crate) fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(CoerceError::UnexpectedType {
            expected: "a string",
            found: other,
        })),
    }
}

/// Deserializes a nested record so that it keeps its own raw fragment.
pub(crate) fn de_record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Record + DeserializeOwned,
{
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_raw(value).map(Some).map_err(D::Error::custom),
    }
}
