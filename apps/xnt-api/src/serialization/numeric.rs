//! Exact numeric handling for wire payloads.

use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// Replace every JSON number that is not a plain 64-bit integer with its
/// wire text.
///
/// `serde_json` is built with `arbitrary_precision`, so a `Number` keeps the
/// digits it was parsed from. Fractional and oversized values are handed to
/// `Decimal` as that text, never through `f64`. Exponent notation is expanded
/// first because `Decimal` only reads plain decimal text. Integers that fit in
/// `i64`/`u64` stay numbers so epoch and id fields keep deserializing.
pub(crate) fn exact_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => Value::String(wire_text(&n)),
        Value::Array(items) => Value::Array(items.into_iter().map(exact_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, exact_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

fn wire_text(n: &Number) -> String {
    let text = n.to_string();
    if text.contains(['e', 'E']) {
        if let Ok(expanded) = Decimal::from_scientific(&text) {
            return expanded.to_string();
        }
    }
    text
}
