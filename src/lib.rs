//! Elasticsearch mappings derived from Rust record types.
//!
//! This crate turns a struct description into an index mapping and applies
//! it through a 7.x or 8.x client:
//! - `#[derive(EsMapping)]` lists a struct's fields with their wire names
//! - [`derive_mapping`] classifies each field into an Elasticsearch type
//! - [`MappingClient`] creates indices, updates and reads mappings
//! - [`new_converter`] builds a client from connection options
//!
//! # Example
//!
//! ```rust,no_run
//! use esconvert::{EsMapping, EsVersion, MappingTool, new_converter, with_host};
//! use serde::Serialize;
//!
//! #[derive(Serialize, EsMapping)]
//! struct Trade {
//!     #[serde(rename = "mid")]
//!     merchant_id: String,
//!     date: chrono::DateTime<chrono::Utc>,
//!     number: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tool = new_converter(EsVersion::V8, [with_host(["http://localhost:9200"])])?;
//!
//!     tool.create_for::<Trade>("trades").await?;
//!     println!("{}", tool.get_mapping("trades").await?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate self as esconvert;

mod client;
mod config;
mod error;
mod factory;
mod mapping;
mod schema;
mod version;

pub use client::{EsClient, MappingClient, MappingTool};
pub use config::{
    ConfigOption, DEFAULT_ADDRESS, EsConfig, with_api_key, with_ca_cert, with_cloud_id,
    with_finger, with_host, with_ignore_above, with_pwd, with_token, with_user,
};
pub use error::{DerivationError, EsConvertError, Result};
pub use factory::{connect, new_converter};
pub use mapping::{
    DEFAULT_IGNORE_ABOVE, EsType, FieldMapping, FieldSpec, MappingDocument, ScalarKind,
    derive_mapping, effective_ignore_above,
};
pub use schema::{EsMapping, MappingSource, RecordSchema, TypeSource};
pub use version::EsVersion;

/// Derive macro listing a struct's fields for mapping derivation.
///
/// Wire names come from `#[es(rename = "...")]`, then `#[serde(rename = "...")]`,
/// then the field name with the struct's `#[serde(rename_all = "...")]` rule
/// applied.
pub use esconvert_macros::EsMapping;

/// Common imports.
pub mod prelude {
    pub use crate::{
        EsConfig, EsConvertError, EsMapping, EsVersion, MappingClient, MappingSource, MappingTool,
        RecordSchema, derive_mapping, new_converter,
    };
}
