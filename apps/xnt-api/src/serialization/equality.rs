//! Order-insensitive structural comparison of encoded models.

use serde_json::Value;

/// Compare two encoded payloads.
///
/// Object key order never matters. List order is ignored (lists compare as
/// multisets) unless the list sits under one of the `ordered` keys, where
/// rows carry meaning by position (order book levels).
pub(crate) fn structurally_equal(a: &Value, b: &Value, ordered: &[&str]) -> bool {
    same(a, b, ordered, false)
}

fn same(a: &Value, b: &Value, ordered: &[&str], keep_order: bool) -> bool {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, lv)| {
                    right.get(key).is_some_and(|rv| {
                        same(lv, rv, ordered, ordered.contains(&key.as_str()))
                    })
                })
        }
        (Value::Array(left), Value::Array(right)) if keep_order => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(lv, rv)| same(lv, rv, ordered, false))
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && same_multiset(left, right, ordered)
        }
        _ => a == b,
    }
}

fn same_multiset(left: &[Value], right: &[Value], ordered: &[&str]) -> bool {
    let mut taken = vec![false; right.len()];
    left.iter().all(|lv| {
        let found = right
            .iter()
            .enumerate()
            .position(|(i, rv)| !taken[i] && same(lv, rv, ordered, false));
        found.is_some_and(|i| {
            taken[i] = true;
            true
        })
    })
}
