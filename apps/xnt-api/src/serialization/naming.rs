//! Field name translation between wire (camelCase) and logical (snake_case) form.
//!
//! Logical names that collide with a Rust keyword carry a trailing `_`
//! (`type` becomes `type_`). The suffix is stripped again on the way out so
//! that `decode(encode(x))` lands on the same field.

use heck::{ToLowerCamelCase, ToSnakeCase};
use serde_json::{Map, Value};

/// Strict and reserved Rust keywords that cannot be used as field names.
const RESERVED: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Logical field name for a wire key.
#[must_use]
pub fn logical_name(wire: &str) -> String {
    let snake = wire.to_snake_case();
    if RESERVED.contains(&snake.as_str()) {
        format!("{snake}_")
    } else {
        snake
    }
}

/// Wire key for a logical field name.
#[must_use]
pub fn wire_name(logical: &str) -> String {
    logical
        .strip_suffix('_')
        .unwrap_or(logical)
        .to_lower_camel_case()
}

/// Rewrite every object key of a serialized model into wire form.
///
/// Unless `keep_null` is set, `null` members and `null` list items are dropped.
pub(crate) fn to_wire(value: Value, keep_null: bool) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| keep_null || !v.is_null())
                .map(|(k, v)| (wire_name(&k), to_wire(v, keep_null)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| keep_null || !v.is_null())
                .map(|v| to_wire(v, keep_null))
                .collect(),
        ),
        other => other,
    }
}

/// Rewrite every object key of a wire payload into logical form.
pub(crate) fn to_logical(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (logical_name(&k), to_logical(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(to_logical).collect()),
        other => other,
    }
}
