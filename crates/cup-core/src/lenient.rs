//! Forgiving scalar parsers.
//!
//! Unlike [`Node`](crate::Node)'s accessors these never fail: anything that
//! cannot be read as the requested type becomes zero (or `false`). Each
//! fallback is reported as a `debug` event so silent defaults can still be
//! traced.

use num_bigint::BigInt;
use tracing::debug;

use crate::types::Value;

fn fallback<T: std::fmt::Debug>(target: &'static str, value: &Value, default: T) -> T {
    debug!(target_type = target, value = %value, ?default, "lenient parse fell back to default");
    default
}

pub fn to_i32(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n.to_i32_lossy(),
        Value::String(s) => s.parse().unwrap_or_else(|_| fallback("int", value, 0)),
        _ => fallback("int", value, 0),
    }
}

pub fn to_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.to_i64_lossy(),
        Value::String(s) => s.parse().unwrap_or_else(|_| fallback("long", value, 0)),
        _ => fallback("long", value, 0),
    }
}

pub fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.to_f64_lossy(),
        Value::String(s) => s.trim().parse().unwrap_or_else(|_| fallback("double", value, 0.0)),
        _ => fallback("double", value, 0.0),
    }
}

pub fn to_f32(value: &Value) -> f32 {
    match value {
        Value::Number(n) => n.to_f32_lossy(),
        Value::String(s) => s.trim().parse().unwrap_or_else(|_| fallback("float", value, 0.0)),
        _ => fallback("float", value, 0.0),
    }
}

pub fn to_big_int(value: &Value) -> BigInt {
    let parsed = match value {
        Value::Number(n) => n.to_big_int(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| fallback("big integer", value, BigInt::from(0)))
}

/// `true` for boolean true, the strings `true`/`yes` in any case and `"1"`,
/// and any non-zero number. Everything else is `false`.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s == "1"
        }
        // Truncates first, so 0.5 is false.
        Value::Number(n) => n.to_i32_lossy() != 0,
        _ => fallback("boolean", value, false),
    }
}
