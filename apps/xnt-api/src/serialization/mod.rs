//! Wire serialization.
//!
//! Models are serde structs whose field names are the logical (snake_case)
//! identifiers, with every field optional so that a decode always yields a
//! complete instance. This module layers the API's wire conventions on top:
//!
//! - camelCase keys on the wire, keyword-escaped snake_case in memory
//! - exact decimals, never binary floats
//! - a shape check of payload keys against the declared field set
//! - structural, order-insensitive equality of the encoded form
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use xnt_api::domain::models::TradeV3;
//! use xnt_api::serialization::{self, DateFormat};
//!
//! let wire = json!({"timestamp": 1598625378042_i64, "symbolId": "EUR/USD.E.FX",
//!                   "price": "111.047", "size": "14000"});
//! let trade: TradeV3 = serialization::decode_one(&wire, true).unwrap().unwrap();
//! let back = serialization::encode(&trade, false, &DateFormat::EpochMillis).unwrap();
//! assert_eq!(back["price"], json!("111.047"));
//! ```

mod equality;
mod error;
mod naming;
mod numeric;
mod time;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use error::SchemaError;
pub use naming::{logical_name, wire_name};
pub use time::{DateFormat, DatePattern, ISO_FORMAT, Timestamp};

// =============================================================================
// Model contract
// =============================================================================

/// A typed wire shape.
///
/// Implemented through [`wire_model!`]; field lists hold logical names.
pub trait Model:
    Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Model name used in errors and logs.
    const NAME: &'static str;
    /// Every logical field name.
    const FIELDS: &'static [&'static str];
    /// Fields whose key must be present in a payload (the value may be `null`).
    const REQUIRED: &'static [&'static str];
    /// Wire keys whose lists compare by position.
    const ORDERED: &'static [&'static str] = &[];
}

/// Declare a wire model.
///
/// Every field becomes `pub name: Option<T>` with `#[serde(default)]`.
/// Fields listed under `required` must appear as keys in a payload for it to
/// fit the model; `ordered` names wire keys whose lists keep row order in
/// equality.
macro_rules! wire_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            required {
                $( $(#[$rmeta:meta])* $rfield:ident : $rty:ty ),* $(,)?
            }
            $(optional {
                $( $(#[$ometa:meta])* $ofield:ident : $oty:ty ),* $(,)?
            })?
            $(ordered [ $($ordered:literal),* $(,)? ])?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, ::serde::Serialize, ::serde::Deserialize)]
        $vis struct $name {
            $(
                #[doc = concat!("Required `", stringify!($rfield), "`.")]
                $(#[$rmeta])*
                #[serde(default)]
                pub $rfield: Option<$rty>,
            )*
            $($(
                #[doc = concat!("Optional `", stringify!($ofield), "`.")]
                $(#[$ometa])*
                #[serde(default)]
                pub $ofield: Option<$oty>,
            )*)?
        }

        impl $crate::serialization::Model for $name {
            const NAME: &'static str = stringify!($name);
            const FIELDS: &'static [&'static str] = &[
                $(stringify!($rfield),)*
                $($(stringify!($ofield),)*)?
            ];
            const REQUIRED: &'static [&'static str] = &[$(stringify!($rfield),)*];
            const ORDERED: &'static [&'static str] = &[$($($ordered,)*)?];
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::serialization::equals(self, other)
            }
        }
    };
}

pub(crate) use wire_model;

// =============================================================================
// Decode
// =============================================================================

/// Result of decoding a payload that may hold one object or a list of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The payload was a single object (or empty).
    One(T),
    /// The payload was a list; items that failed in lenient mode are absent.
    Many(Vec<T>),
}

impl<T> Decoded<T> {
    /// Apply `f` to every decoded item.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Decoded<U> {
        match self {
            Self::One(item) => Decoded::One(f(item)),
            Self::Many(items) => Decoded::Many(items.into_iter().map(f).collect()),
        }
    }

    /// Every decoded item, a single object becoming a one-item list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    /// The single object, or the first item of a list.
    pub fn into_one(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(items) => items.into_iter().next(),
        }
    }
}

/// Payloads that decode to an all-unset instance.
fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => match items.as_slice() {
            [] => true,
            [Value::Object(map)] => map.is_empty(),
            _ => false,
        },
        _ => false,
    }
}

/// Decode a payload against `M`.
///
/// Accepts an object or a list of objects; `null`, `{}`, `[]` and `[{}]` give
/// an all-unset instance. When a payload does not fit `M`, strict mode fails
/// with a [`SchemaError`] while lenient mode logs a warning and yields `None`
/// (for lists, the failing item is left out).
pub fn decode<M: Model>(data: &Value, strict: bool) -> Result<Option<Decoded<M>>, SchemaError> {
    if is_empty_payload(data) {
        return Ok(Some(Decoded::One(M::default())));
    }
    match data {
        Value::Array(items) => {
            let mut decoded = Vec::with_capacity(items.len());
            for item in items {
                if let Some(model) = lenient::<M, _>(decode_strict::<M>(item), strict)? {
                    decoded.push(model);
                }
            }
            Ok(Some(Decoded::Many(decoded)))
        }
        _ => Ok(lenient::<M, _>(decode_strict::<M>(data), strict)?.map(Decoded::One)),
    }
}

/// Decode a payload expected to hold a single object.
pub fn decode_one<M: Model>(data: &Value, strict: bool) -> Result<Option<M>, SchemaError> {
    Ok(decode::<M>(data, strict)?.and_then(Decoded::into_one))
}

/// Decode one object, always failing on mismatch.
pub fn decode_strict<M: Model>(data: &Value) -> Result<M, SchemaError> {
    if is_empty_payload(data) {
        return Ok(M::default());
    }
    let Value::Object(map) = data else {
        return Err(SchemaError::NotAnObject {
            model: M::NAME,
            payload: data.to_string(),
        });
    };
    check_shape::<M>(map).map_err(|(unknown, missing)| SchemaError::ShapeMismatch {
        model: M::NAME,
        payload: data.to_string(),
        unknown,
        missing,
    })?;
    let logical = naming::to_logical(numeric::exact_numbers(data.clone()));
    serde_json::from_value(logical).map_err(|source| SchemaError::Invalid {
        model: M::NAME,
        payload: data.to_string(),
        source,
    })
}

/// Whether `data` is an object whose keys fit `M`'s field set.
pub fn fits<M: Model>(data: &Value) -> bool {
    match data {
        Value::Object(map) => check_shape::<M>(map).is_ok(),
        _ => false,
    }
}

fn lenient<M: Model, T>(result: Result<T, SchemaError>, strict: bool) -> Result<Option<T>, SchemaError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if strict => Err(e),
        Err(e) => {
            tracing::warn!(model = M::NAME, error = %e, "unable to wrap payload, skipping");
            Ok(None)
        }
    }
}

fn check_shape<M: Model>(map: &Map<String, Value>) -> Result<(), (Vec<String>, Vec<String>)> {
    let keys: Vec<String> = map.keys().map(|k| naming::logical_name(k)).collect();
    let unknown: Vec<String> = keys
        .iter()
        .filter(|k| !M::FIELDS.contains(&k.as_str()))
        .cloned()
        .collect();
    let missing: Vec<String> = M::REQUIRED
        .iter()
        .filter(|field| !keys.iter().any(|k| k == *field))
        .map(|field| (*field).to_string())
        .collect();
    if unknown.is_empty() && missing.is_empty() {
        Ok(())
    } else {
        Err((unknown, missing))
    }
}

// =============================================================================
// Encode / equality
// =============================================================================

/// Encode a model to its wire mapping.
///
/// Keys are camelCase, decimals are strings, enums are wire tokens and
/// timestamps follow `format`. Unset fields are omitted unless `keep_null`.
pub fn encode<M: Model>(
    instance: &M,
    keep_null: bool,
    format: &DateFormat,
) -> Result<Value, SchemaError> {
    let logical = time::with_format(format, || serde_json::to_value(instance)).map_err(
        |source| SchemaError::Encode {
            model: M::NAME,
            source,
        },
    )?;
    Ok(naming::to_wire(logical, keep_null))
}

/// Structural equality of two models.
///
/// Both sides are encoded with nulls kept and compared ignoring key order and
/// list order (except for the models' ordered fields). Models that cannot be
/// encoded never compare equal.
pub fn equals<A: Model, B: Model>(a: &A, b: &B) -> bool {
    let format = DateFormat::Iso8601;
    let (Ok(left), Ok(right)) = (encode(a, true, &format), encode(b, true, &format)) else {
        return false;
    };
    let ordered: Vec<&str> = A::ORDERED.iter().chain(B::ORDERED).copied().collect();
    equality::structurally_equal(&left, &right, &ordered)
}
