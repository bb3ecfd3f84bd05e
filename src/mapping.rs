//! Mapping derivation.
//!
//! A record type is reduced to a list of [`FieldSpec`]s (wire name plus
//! declared scalar type). [`derive_mapping`] classifies every field with a
//! fixed table and assembles a [`MappingDocument`]. Only types are looked
//! at; field values never are.

use crate::error::DerivationError;
use crate::schema::MappingSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// `ignore_above` used when the configured threshold is zero or negative.
pub const DEFAULT_IGNORE_ABOVE: i64 = 256;

/// Effective keyword threshold for a configured value.
pub fn effective_ignore_above(configured: i64) -> i64 {
    if configured <= 0 {
        DEFAULT_IGNORE_ABOVE
    } else {
        configured
    }
}

/// Declared type of a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `isize`, the platform integer.
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `usize`
    Usize,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `chrono::DateTime<_>`, `chrono::NaiveDateTime` or `std::time::SystemTime`.
    Timestamp,
    /// A timestamp behind `&`, `Box`, `Arc`, `Rc` or `Option`.
    TimestampRef,
    /// `String` or `&str`.
    Text,
    /// Anything else, by type name.
    Other(String),
}

/// Owned text, matched by full path.
const TEXT_TYPES: &[&str] = &["alloc::string::String"];

/// Timestamp types, matched by full path. Generic ones end in `<`.
const TIMESTAMP_TYPES: &[&str] = &[
    "chrono::datetime::DateTime<",
    "chrono::naive::datetime::NaiveDateTime",
    "std::time::SystemTime",
];

/// Wrappers a timestamp may sit behind.
const POINTER_TYPES: &[&str] = &[
    "core::option::Option<",
    "alloc::boxed::Box<",
    "alloc::sync::Arc<",
    "alloc::rc::Rc<",
];

impl ScalarKind {
    /// Classify a type by the name `std::any::type_name` gives it.
    ///
    /// Library types are matched on their full path, so a user type that
    /// happens to be called `String` or `DateTime` is [`ScalarKind::Other`].
    pub fn from_type_name(type_name: &str) -> Self {
        let name = type_name.trim();
        match name {
            "i8" => return ScalarKind::I8,
            "i16" => return ScalarKind::I16,
            "i32" => return ScalarKind::I32,
            "isize" => return ScalarKind::Isize,
            "u8" => return ScalarKind::U8,
            "u16" => return ScalarKind::U16,
            "u32" => return ScalarKind::U32,
            "usize" => return ScalarKind::Usize,
            "i64" => return ScalarKind::I64,
            "u64" => return ScalarKind::U64,
            "f32" => return ScalarKind::F32,
            "f64" => return ScalarKind::F64,
            "&str" | "&mut str" => return ScalarKind::Text,
            _ => {}
        }

        if TEXT_TYPES.contains(&name) {
            return ScalarKind::Text;
        }
        if is_timestamp(name) {
            return ScalarKind::Timestamp;
        }
        if pointee(name).is_some_and(is_timestamp) {
            return ScalarKind::TimestampRef;
        }
        ScalarKind::Other(name.to_string())
    }

    /// Classify `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::from_type_name(std::any::type_name::<T>())
    }

    /// Elasticsearch type for this kind, `None` when there is none.
    pub fn es_type(&self) -> Option<EsType> {
        match self {
            ScalarKind::I8
            | ScalarKind::I16
            | ScalarKind::I32
            | ScalarKind::Isize
            | ScalarKind::U8
            | ScalarKind::U16
            | ScalarKind::U32
            | ScalarKind::Usize => Some(EsType::Integer),
            ScalarKind::I64 | ScalarKind::U64 => Some(EsType::Long),
            ScalarKind::F32 => Some(EsType::Float),
            ScalarKind::F64 => Some(EsType::Double),
            ScalarKind::Timestamp | ScalarKind::TimestampRef => Some(EsType::Date),
            ScalarKind::Text => Some(EsType::Keyword),
            ScalarKind::Other(_) => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::Isize => "isize",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::Usize => "usize",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::TimestampRef => "&timestamp",
            ScalarKind::Text => "String",
            ScalarKind::Other(name) => name.as_str(),
        };
        f.write_str(name)
    }
}

fn is_timestamp(name: &str) -> bool {
    TIMESTAMP_TYPES.iter().any(|ts| match ts.strip_suffix('<') {
        Some(generic) => name
            .strip_prefix(generic)
            .is_some_and(|rest| rest.starts_with('<') && rest.ends_with('>')),
        None => name == *ts,
    })
}

/// The type a pointer-like wrapper points at.
fn pointee(name: &str) -> Option<&str> {
    if let Some(rest) = name.strip_prefix("&mut ") {
        return Some(rest);
    }
    if let Some(rest) = name.strip_prefix('&') {
        return Some(rest);
    }
    POINTER_TYPES
        .iter()
        .find_map(|outer| name.strip_prefix(outer))
        .and_then(|rest| rest.strip_suffix('>'))
}

/// One field of a record: its wire name and declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name the field has on the wire; used verbatim as the mapping key.
    pub wire_name: String,
    /// Declared type.
    pub declared_type: ScalarKind,
}

impl FieldSpec {
    /// Field with an explicit kind.
    pub fn new(wire_name: impl Into<String>, declared_type: ScalarKind) -> Self {
        Self {
            wire_name: wire_name.into(),
            declared_type,
        }
    }

    /// Field declared as `T`.
    pub fn of<T: ?Sized>(wire_name: impl Into<String>) -> Self {
        Self::new(wire_name, ScalarKind::of::<T>())
    }
}

/// Elasticsearch field types produced by derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsType {
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Date.
    Date,
    /// Exact match keyword.
    Keyword,
}

impl EsType {
    /// Name used in mapping JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            EsType::Integer => "integer",
            EsType::Long => "long",
            EsType::Float => "float",
            EsType::Double => "double",
            EsType::Date => "date",
            EsType::Keyword => "keyword",
        }
    }
}

impl fmt::Display for EsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field type.
    #[serde(rename = "type")]
    pub es_type: EsType,
    /// Longest keyword value indexed as a term; keyword fields only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_above: Option<i64>,
}

/// A derived mapping: wire name to field mapping, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDocument {
    properties: IndexMap<String, FieldMapping>,
}

#[derive(Serialize)]
struct CreateIndexBody<'a> {
    mappings: &'a MappingDocument,
}

impl MappingDocument {
    /// All field mappings.
    pub fn properties(&self) -> &IndexMap<String, FieldMapping> {
        &self.properties
    }

    /// Mapping of one field.
    pub fn get(&self, wire_name: &str) -> Option<&FieldMapping> {
        self.properties.get(wire_name)
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no field is mapped.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Body for index creation: `{"mappings": {"properties": {...}}}`.
    pub fn create_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(CreateIndexBody { mappings: self })
    }

    /// Body for a mapping update: `{"properties": {...}}`.
    pub fn put_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Derive the mapping of `source`.
///
/// Keyword fields get `ignore_above` set to
/// [`effective_ignore_above`]`(ignore_above)`. The first field with an
/// unknown type fails the whole derivation. A panic while listing fields is
/// returned as [`DerivationError::Introspection`]; the process panic hook
/// still runs first, so the default hook prints the panic to stderr.
pub fn derive_mapping<S>(source: &S, ignore_above: i64) -> Result<MappingDocument, DerivationError>
where
    S: MappingSource + ?Sized,
{
    let ignore_above = effective_ignore_above(ignore_above);
    match catch_unwind(AssertUnwindSafe(|| assemble(source.fields(), ignore_above))) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "unknown panic while listing record fields".to_string()
            };
            Err(DerivationError::Introspection(message))
        }
    }
}

fn assemble(fields: Vec<FieldSpec>, ignore_above: i64) -> Result<MappingDocument, DerivationError> {
    let mut properties = IndexMap::with_capacity(fields.len());
    for field in fields {
        let es_type = field
            .declared_type
            .es_type()
            .ok_or_else(|| DerivationError::UnknownType {
                field: field.wire_name.clone(),
                type_name: field.declared_type.to_string(),
            })?;
        let ignore_above = (es_type == EsType::Keyword).then_some(ignore_above);
        // Duplicate wire names overwrite, keeping the first position.
        properties.insert(
            field.wire_name,
            FieldMapping {
                es_type,
                ignore_above,
            },
        );
    }
    Ok(MappingDocument { properties })
}
