//! Model Registry
//!
//! Maps an abstract domain type and an API version onto the one schema
//! variant that implements it. Each abstract type is an enum with one tuple
//! variant per wire version (see [`versioned!`]); its static variant table is
//! what the registry indexes. Resolution never falls back to another version.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use xnt_api::domain::ApiVersion;
//! use xnt_api::domain::models::Summary;
//! use xnt_api::registry::{AbstractType, ModelRegistry};
//!
//! let registry = ModelRegistry::new().unwrap();
//! let variant = registry.resolve(AbstractType::Summary, ApiVersion::V3).unwrap();
//! assert_eq!(variant.name, "SummaryV3");
//!
//! let summary = registry
//!     .decode_one::<Summary>(&json!({}), ApiVersion::V3, true)
//!     .unwrap();
//! assert_eq!(summary.map(|s| s.version()), Some(ApiVersion::V3));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::domain::ApiVersion;
use crate::domain::models::{
    Change, Execution, Order, OrderRequest, Quote, Summary, Symbol, Trade, Transaction,
};
use crate::serialization::{DateFormat, Decoded, Model, SchemaError};

// =============================================================================
// Descriptors
// =============================================================================

/// Logical entity independent of wire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbstractType {
    /// Trading order as reported by the server.
    Order,
    /// Order placement request.
    OrderRequest,
    /// Instrument definition.
    Symbol,
    /// Bid/ask quote.
    Quote,
    /// Market trade.
    Trade,
    /// Daily change.
    Change,
    /// Account summary.
    Summary,
    /// Account transaction.
    Transaction,
    /// Order execution (fill) event.
    Execution,
}

impl AbstractType {
    /// Every abstract type the registry must resolve.
    pub const ALL: [Self; 9] = [
        Self::Order,
        Self::OrderRequest,
        Self::Symbol,
        Self::Quote,
        Self::Trade,
        Self::Change,
        Self::Summary,
        Self::Transaction,
        Self::Execution,
    ];

    /// Type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "Order",
            Self::OrderRequest => "OrderRequest",
            Self::Symbol => "Symbol",
            Self::Quote => "Quote",
            Self::Trade => "Trade",
            Self::Change => "Change",
            Self::Summary => "Summary",
            Self::Transaction => "Transaction",
            Self::Execution => "Execution",
        }
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one schema variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// Abstract type implemented.
    pub kind: AbstractType,
    /// Wire version the shape belongs to.
    pub version: ApiVersion,
    /// Variant name, e.g. `OrderV3`.
    pub name: &'static str,
    /// Logical field names.
    pub fields: &'static [&'static str],
    /// Fields that must be present in a payload.
    pub required: &'static [&'static str],
}

impl VariantDescriptor {
    /// Describe model `M` as the `version` shape of `kind`.
    #[must_use]
    pub const fn of<M: Model>(kind: AbstractType, version: ApiVersion, name: &'static str) -> Self {
        Self {
            kind,
            version,
            name,
            fields: M::FIELDS,
            required: M::REQUIRED,
        }
    }
}

/// Decoder from a wire payload to the abstract enum `T`.
pub type DecodeFn<T> = fn(&Value, bool) -> Result<Option<Decoded<T>>, SchemaError>;

/// One entry in an abstract type's variant table.
pub struct SchemaVariant<T: 'static> {
    /// What the variant looks like.
    pub descriptor: VariantDescriptor,
    decode: DecodeFn<T>,
    fits: fn(&Value) -> bool,
}

impl<T> SchemaVariant<T> {
    /// Pair a descriptor with its decoder and shape check.
    #[must_use]
    pub const fn new(
        descriptor: VariantDescriptor,
        decode: DecodeFn<T>,
        fits: fn(&Value) -> bool,
    ) -> Self {
        Self {
            descriptor,
            decode,
            fits,
        }
    }

    /// Decode `data` with this variant's shape.
    pub fn decode(&self, data: &Value, strict: bool) -> Result<Option<Decoded<T>>, SchemaError> {
        (self.decode)(data, strict)
    }

    /// Whether `data` is an object whose keys fit this variant.
    pub fn fits(&self, data: &Value) -> bool {
        (self.fits)(data)
    }
}

impl<T> fmt::Debug for SchemaVariant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaVariant")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// An abstract domain type with one concrete shape per API version.
pub trait Versioned: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The abstract type this enum implements.
    const KIND: AbstractType;

    /// Static table of the concrete shapes.
    fn variants() -> &'static [SchemaVariant<Self>];

    /// Wire version of this instance.
    fn version(&self) -> ApiVersion;

    /// Encode through the concrete shape.
    fn encode(&self, keep_null: bool, format: &DateFormat) -> Result<Value, SchemaError>;
}

/// Declare an abstract type as an enum over its three wire shapes.
macro_rules! versioned {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            V1($v1:ty),
            V2($v2:ty),
            V3($v3:ty) $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            /// Wire version 1.0 shape.
            V1($v1),
            /// Wire version 2.0 shape.
            V2($v2),
            /// Wire version 3.0 shape.
            V3($v3),
        }

        impl $crate::registry::Versioned for $name {
            const KIND: $crate::registry::AbstractType = $crate::registry::AbstractType::$kind;

            fn variants() -> &'static [$crate::registry::SchemaVariant<Self>] {
                use $crate::domain::ApiVersion;
                use $crate::registry::{AbstractType, SchemaVariant, VariantDescriptor};
                use $crate::serialization::{self, Decoded, SchemaError};

                fn decode_v1(
                    data: &::serde_json::Value,
                    strict: bool,
                ) -> Result<Option<Decoded<$name>>, SchemaError> {
                    Ok(serialization::decode::<$v1>(data, strict)?.map(|d| d.map($name::V1)))
                }

                fn decode_v2(
                    data: &::serde_json::Value,
                    strict: bool,
                ) -> Result<Option<Decoded<$name>>, SchemaError> {
                    Ok(serialization::decode::<$v2>(data, strict)?.map(|d| d.map($name::V2)))
                }

                fn decode_v3(
                    data: &::serde_json::Value,
                    strict: bool,
                ) -> Result<Option<Decoded<$name>>, SchemaError> {
                    Ok(serialization::decode::<$v3>(data, strict)?.map(|d| d.map($name::V3)))
                }

                static VARIANTS: [SchemaVariant<$name>; 3] = [
                    SchemaVariant::new(
                        VariantDescriptor::of::<$v1>(
                            AbstractType::$kind,
                            ApiVersion::V1,
                            concat!(stringify!($name), "V1"),
                        ),
                        decode_v1,
                        serialization::fits::<$v1>,
                    ),
                    SchemaVariant::new(
                        VariantDescriptor::of::<$v2>(
                            AbstractType::$kind,
                            ApiVersion::V2,
                            concat!(stringify!($name), "V2"),
                        ),
                        decode_v2,
                        serialization::fits::<$v2>,
                    ),
                    SchemaVariant::new(
                        VariantDescriptor::of::<$v3>(
                            AbstractType::$kind,
                            ApiVersion::V3,
                            concat!(stringify!($name), "V3"),
                        ),
                        decode_v3,
                        serialization::fits::<$v3>,
                    ),
                ];
                &VARIANTS
            }

            fn version(&self) -> $crate::domain::ApiVersion {
                match self {
                    Self::V1(_) => $crate::domain::ApiVersion::V1,
                    Self::V2(_) => $crate::domain::ApiVersion::V2,
                    Self::V3(_) => $crate::domain::ApiVersion::V3,
                }
            }

            fn encode(
                &self,
                keep_null: bool,
                format: &$crate::serialization::DateFormat,
            ) -> Result<::serde_json::Value, $crate::serialization::SchemaError> {
                match self {
                    Self::V1(inner) => $crate::serialization::encode(inner, keep_null, format),
                    Self::V2(inner) => $crate::serialization::encode(inner, keep_null, format),
                    Self::V3(inner) => $crate::serialization::encode(inner, keep_null, format),
                }
            }
        }

        impl $name {
            /// Wire version of this instance.
            #[must_use]
            pub fn version(&self) -> $crate::domain::ApiVersion {
                <Self as $crate::registry::Versioned>::version(self)
            }
        }
    };
}

pub(crate) use versioned;

// =============================================================================
// Registry
// =============================================================================

/// Resolution failures. These are configuration errors, never data errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No variant is registered for the pair.
    #[error("no {kind} schema registered for API version {version}")]
    Unresolved {
        /// Abstract type requested.
        kind: AbstractType,
        /// Version requested.
        version: ApiVersion,
    },
    /// More than one variant claims the pair.
    #[error("more than one {kind} schema registered for API version {version}")]
    Ambiguous {
        /// Abstract type requested.
        kind: AbstractType,
        /// Version requested.
        version: ApiVersion,
    },
}

/// Decoding through the registry can fail either way.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The schema could not be resolved.
    #[error(transparent)]
    Resolve(#[from] RegistryError),
    /// The payload did not fit the resolved schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Static table of `(abstract type, version)` to schema variant.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    table: HashMap<(AbstractType, ApiVersion), VariantDescriptor>,
}

impl ModelRegistry {
    /// Build the table from every abstract type and check it is total.
    pub fn new() -> Result<Self, RegistryError> {
        let mut registry = Self {
            table: HashMap::new(),
        };
        registry.register::<Order>()?;
        registry.register::<OrderRequest>()?;
        registry.register::<Symbol>()?;
        registry.register::<Quote>()?;
        registry.register::<Trade>()?;
        registry.register::<Change>()?;
        registry.register::<Summary>()?;
        registry.register::<Transaction>()?;
        registry.register::<Execution>()?;
        for version in ApiVersion::ALL {
            registry.ensure_total(version)?;
        }
        Ok(registry)
    }

    fn register<T: Versioned>(&mut self) -> Result<(), RegistryError> {
        for variant in T::variants() {
            let descriptor = variant.descriptor;
            let key = (T::KIND, descriptor.version);
            if self.table.insert(key, descriptor).is_some() {
                return Err(RegistryError::Ambiguous {
                    kind: T::KIND,
                    version: descriptor.version,
                });
            }
        }
        Ok(())
    }

    /// Check that every abstract type resolves at `version`.
    pub fn ensure_total(&self, version: ApiVersion) -> Result<(), RegistryError> {
        for kind in AbstractType::ALL {
            self.resolve(kind, version)?;
        }
        Ok(())
    }

    /// Descriptor of the variant implementing `kind` at `version`.
    pub fn resolve(
        &self,
        kind: AbstractType,
        version: ApiVersion,
    ) -> Result<&VariantDescriptor, RegistryError> {
        self.table
            .get(&(kind, version))
            .ok_or(RegistryError::Unresolved { kind, version })
    }

    /// Typed variant of `T` at `version`.
    pub fn variant<T: Versioned>(
        &self,
        version: ApiVersion,
    ) -> Result<&'static SchemaVariant<T>, RegistryError> {
        self.resolve(T::KIND, version)?;
        let mut matching = T::variants()
            .iter()
            .filter(|variant| variant.descriptor.version == version);
        let unresolved = RegistryError::Unresolved {
            kind: T::KIND,
            version,
        };
        let variant = matching.next().ok_or(unresolved)?;
        if matching.next().is_some() {
            return Err(RegistryError::Ambiguous {
                kind: T::KIND,
                version,
            });
        }
        Ok(variant)
    }

    /// Decode `data` as `T` at `version`.
    pub fn decode<T: Versioned>(
        &self,
        data: &Value,
        version: ApiVersion,
        strict: bool,
    ) -> Result<Option<Decoded<T>>, DecodeError> {
        Ok(self.variant::<T>(version)?.decode(data, strict)?)
    }

    /// Decode a single `T` at `version`.
    pub fn decode_one<T: Versioned>(
        &self,
        data: &Value,
        version: ApiVersion,
        strict: bool,
    ) -> Result<Option<T>, DecodeError> {
        Ok(self.decode::<T>(data, version, strict)?.and_then(Decoded::into_one))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn registry_is_total() {
        let registry = ModelRegistry::new().unwrap();
        for version in ApiVersion::ALL {
            for kind in AbstractType::ALL {
                let descriptor = registry.resolve(kind, version).unwrap();
                assert_eq!(descriptor.kind, kind);
                assert_eq!(descriptor.version, version);
                assert!(descriptor.name.starts_with(kind.as_str()));
            }
        }
    }

    #[test]
    fn resolve_names_versioned_variant() {
        let registry = ModelRegistry::new().unwrap();
        let order = registry.resolve(AbstractType::Order, ApiVersion::V3).unwrap();
        assert_eq!(order.name, "OrderV3");
        assert!(order.fields.contains(&"order_id"));
        assert!(order.required.contains(&"account_id"));
    }

    #[test]
    fn empty_registry_fails_loudly() {
        let registry = ModelRegistry {
            table: HashMap::new(),
        };
        assert_eq!(
            registry.ensure_total(ApiVersion::V2),
            Err(RegistryError::Unresolved {
                kind: AbstractType::Order,
                version: ApiVersion::V2
            })
        );
        assert!(matches!(
            registry.decode::<Quote>(&json!({}), ApiVersion::V2, true),
            Err(DecodeError::Resolve(RegistryError::Unresolved { .. }))
        ));
    }

    #[test]
    fn duplicate_registration_is_ambiguous() {
        let mut registry = ModelRegistry::new().unwrap();
        assert!(matches!(
            registry.register::<Trade>(),
            Err(RegistryError::Ambiguous {
                kind: AbstractType::Trade,
                ..
            })
        ));
    }

    #[test]
    fn decode_picks_version_shape() {
        let registry = ModelRegistry::new().unwrap();
        let payload = json!({
            "timestamp": 1_598_625_378_042_i64,
            "symbolId": "EUR/USD.E.FX",
            "price": "111.047",
            "size": "14000"
        });
        let trade = registry
            .decode_one::<Trade>(&payload, ApiVersion::V3, true)
            .unwrap()
            .unwrap();
        assert_eq!(trade.version(), ApiVersion::V3);

        // the 1.0 shape calls the price "value"
        assert!(matches!(
            registry.decode::<Trade>(&payload, ApiVersion::V1, true),
            Err(DecodeError::Schema(SchemaError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn variant_fit_matches_shape() {
        let registry = ModelRegistry::new().unwrap();
        let variant = registry.variant::<Order>(ApiVersion::V2).unwrap();
        assert!(!variant.fits(&json!({"group": "client", "message": "rejected"})));
        assert_eq!(variant.descriptor.name, "OrderV2");
    }
}
