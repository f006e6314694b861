//! Serialization errors.

use thiserror::Error;

/// Failure to map a payload onto a model, or a model onto the wire.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The payload keys do not match the model's field set.
    #[error("payload does not fit {model} (unknown: {unknown:?}, missing: {missing:?}): {payload}")]
    ShapeMismatch {
        /// Target model name.
        model: &'static str,
        /// Offending payload, as JSON text.
        payload: String,
        /// Keys the model does not declare.
        unknown: Vec<String>,
        /// Required keys absent from the payload.
        missing: Vec<String>,
    },

    /// The payload has the right keys but a value could not be decoded.
    #[error("could not decode {model} from {payload}: {source}")]
    Invalid {
        /// Target model name.
        model: &'static str,
        /// Offending payload, as JSON text.
        payload: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The payload is neither an object nor a list of objects.
    #[error("{model} expects an object or a list of objects, got {payload}")]
    NotAnObject {
        /// Target model name.
        model: &'static str,
        /// Offending payload, as JSON text.
        payload: String,
    },

    /// A model could not be serialized.
    #[error("could not encode {model}: {source}")]
    Encode {
        /// Source model name.
        model: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A `strftime` pattern contains an unknown specifier.
    #[error("invalid date pattern: {0:?}")]
    InvalidDatePattern(String),
}

impl SchemaError {
    /// Name of the model involved, when there is one.
    #[must_use]
    pub const fn model(&self) -> Option<&'static str> {
        match self {
            Self::ShapeMismatch { model, .. }
            | Self::Invalid { model, .. }
            | Self::NotAnObject { model, .. }
            | Self::Encode { model, .. } => Some(*model),
            Self::InvalidDatePattern(_) => None,
        }
    }
}
