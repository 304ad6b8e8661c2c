//! Field-level validation over a raw JSON body
//!
//! Every rule records its failure under a dotted path and keeps going, so a
//! single response lists every problem with the request.

use chrono::NaiveDate;
use nysf_common::db::{AmountError, Money};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Error messages keyed by dotted field path (`team_sports.0.sport_id`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when nothing was recorded
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Join a prefix and a key into a dotted path
pub fn path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Look up a field; JSON `null` and empty strings count as absent
fn present<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

/// Required string, trimmed, at most `max` characters
pub fn required_string(
    obj: &Value,
    prefix: &str,
    key: &str,
    max: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let field = path(prefix, key);
    match present(obj, key) {
        None => {
            errors.add(&field, format!("The {} field is required.", key));
            None
        }
        Some(value) => checked_string(value, &field, key, max, errors),
    }
}

/// Optional string, trimmed, at most `max` characters
pub fn optional_string(
    obj: &Value,
    prefix: &str,
    key: &str,
    max: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let field = path(prefix, key);
    present(obj, key).and_then(|value| checked_string(value, &field, key, max, errors))
}

fn checked_string(
    value: &Value,
    field: &str,
    key: &str,
    max: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let Some(s) = value.as_str() else {
        errors.add(field, format!("The {} field must be a string.", key));
        return None;
    };
    let s = s.trim();
    if s.chars().count() > max {
        errors.add(
            field,
            format!("The {} field must not be greater than {} characters.", key, max),
        );
        return None;
    }
    Some(s.to_string())
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Required integer identifier
pub fn required_integer(
    obj: &Value,
    prefix: &str,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let field = path(prefix, key);
    match present(obj, key) {
        None => {
            errors.add(&field, format!("The {} field is required.", key));
            None
        }
        Some(value) => {
            let n = as_integer(value);
            if n.is_none() {
                errors.add(&field, format!("The {} field must be an integer.", key));
            }
            n
        }
    }
}

/// Largest accepted count
pub const MAX_COUNT: u64 = u32::MAX as u64;

/// Optional non-negative integer count, at most [`MAX_COUNT`]; absent reads as zero
pub fn count(obj: &Value, prefix: &str, key: &str, errors: &mut FieldErrors) -> u64 {
    let Some(value) = present(obj, key) else {
        return 0;
    };
    let field = path(prefix, key);
    match as_integer(value) {
        Some(n) if n >= 0 && n as u64 <= MAX_COUNT => n as u64,
        Some(n) if n >= 0 => {
            errors.add(
                &field,
                format!("The {} field must not be greater than {}.", key, MAX_COUNT),
            );
            0
        }
        Some(_) => {
            errors.add(&field, format!("The {} field must be at least 0.", key));
            0
        }
        None => {
            errors.add(&field, format!("The {} field must be an integer.", key));
            0
        }
    }
}

/// Optional non-negative decimal amount, rounded to hundredths; absent reads as zero
///
/// Numbers are read from their JSON text, so no binary float rounding
/// happens before the decimal rounding.
pub fn amount(obj: &Value, prefix: &str, key: &str, errors: &mut FieldErrors) -> Money {
    let Some(value) = present(obj, key) else {
        return Money::ZERO;
    };
    let parsed = match value {
        Value::Number(n) => Money::parse(&n.to_string()),
        Value::String(s) => Money::parse(s),
        _ => Err(AmountError::NotANumber),
    };
    parsed.unwrap_or_else(|e| {
        let message = match e {
            AmountError::NotANumber => format!("The {} field must be a number.", key),
            AmountError::Negative => format!("The {} field must be at least 0.", key),
            AmountError::TooLarge => format!(
                "The {} field must not be greater than {}.",
                key,
                Money::MAX.as_decimal()
            ),
        };
        errors.add(path(prefix, key), message);
        Money::ZERO
    })
}

/// Optional `YYYY-MM-DD` date
pub fn date(obj: &Value, prefix: &str, key: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let value = present(obj, key)?;
    let parsed = value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
    if parsed.is_none() {
        errors.add(
            path(prefix, key),
            format!("The {} field must be a valid date.", key),
        );
    }
    parsed
}

/// Optional array; absent reads as empty
pub fn array<'a>(obj: &'a Value, key: &str, errors: &mut FieldErrors) -> &'a [Value] {
    match obj.get(key) {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            errors.add(key, format!("The {} field must be an array.", key));
            &[]
        }
    }
}

/// Value restricted to a fixed set, parsed by `parse`
pub fn one_of<T>(
    obj: &Value,
    prefix: &str,
    key: &str,
    required: bool,
    parse: impl Fn(&str) -> Option<T>,
    errors: &mut FieldErrors,
) -> Option<T> {
    let field = path(prefix, key);
    match present(obj, key) {
        None => {
            if required {
                errors.add(&field, format!("The {} field is required.", key));
            }
            None
        }
        Some(value) => {
            let parsed = value.as_str().and_then(|s| parse(s.trim()));
            if parsed.is_none() {
                errors.add(&field, format!("The selected {} is invalid.", key));
            }
            parsed
        }
    }
}
