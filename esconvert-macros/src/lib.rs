//! Derive macro for esconvert.
//!
//! `#[derive(EsMapping)]` lists a struct's fields, in declaration order, with
//! the name each one has on the wire and its declared type. esconvert turns
//! that list into an Elasticsearch mapping.
//!
//! ```ignore
//! use esconvert::EsMapping;
//!
//! #[derive(EsMapping)]
//! struct Order {
//!     #[serde(rename = "mid")]
//!     merchant_id: String,
//!     date: chrono::DateTime<chrono::Utc>,
//!     #[es(rename = "qty")]
//!     quantity: i32,
//! }
//! ```
//!
//! Wire names come from `#[es(rename = "...")]`, then `#[serde(rename = "...")]`,
//! then the field identifier with the struct's `#[serde(rename_all = "...")]`
//! rule applied.

use proc_macro::TokenStream;

mod mapping;

/// Implement `esconvert::EsMapping` for a struct with named fields.
#[proc_macro_derive(EsMapping, attributes(es))]
pub fn derive_es_mapping(input: TokenStream) -> TokenStream {
    mapping::derive_es_mapping_impl(input)
}
