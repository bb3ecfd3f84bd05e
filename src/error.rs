//! Error types for mapping derivation and cluster operations.

use thiserror::Error;

/// Error type for esconvert operations.
#[derive(Error, Debug)]
pub enum EsConvertError {
    /// The version selector was neither `v7` nor `v8`.
    #[error("es version must be v7 or v8, got '{0}'")]
    Version(String),

    /// An option the client cannot express.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record type could not be turned into a mapping.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// `create` or `put` on a facade with no client bound.
    #[error("no es client")]
    NoClient,

    /// Request body encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from the 7.x client library.
    #[error(transparent)]
    V7(#[from] elasticsearch7::Error),

    /// Error from the 8.x client library.
    #[error(transparent)]
    V8(#[from] elasticsearch8::Error),
}

/// Mapping derivation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// A field's declared type has no Elasticsearch equivalent.
    #[error("unknown type[{type_name}] for field '{field}'")]
    UnknownType {
        /// Wire name of the field.
        field: String,
        /// The declared type, as written by the compiler.
        type_name: String,
    },

    /// Listing the record's fields panicked.
    #[error("mapping introspection failed: {0}")]
    Introspection(String),
}

/// Result type alias for esconvert operations.
pub type Result<T> = std::result::Result<T, EsConvertError>;
