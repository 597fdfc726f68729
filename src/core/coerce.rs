//! Lenient field deserializers for calculator inputs.
//!
//! Inputs are re-evaluated on every keystroke, so a cleared field, `null` or a
//! half-typed value must still produce an input record. Anything that is not a
//! finite number (or a string holding one) becomes `0`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_value).unwrap_or(0.0))
}

/// Non-negative whole number (ages, counts). Fractions round to nearest.
pub fn whole<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = number(deserializer)?;
    Ok(to_whole(v))
}

pub fn to_whole(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn coerce_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}
