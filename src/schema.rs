//! Record descriptions fed to mapping derivation.

use crate::mapping::{FieldSpec, ScalarKind};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// A record type that can list its fields.
///
/// Usually implemented with `#[derive(EsMapping)]`:
///
/// ```rust
/// use esconvert::{EsMapping, EsType, derive_mapping};
///
/// #[derive(EsMapping)]
/// struct Order {
///     #[es(rename = "mid")]
///     merchant_id: String,
///     number: i32,
/// }
///
/// let mapping = derive_mapping(&esconvert::TypeSource::<Order>::new(), 0).unwrap();
/// assert_eq!(mapping.get("mid").unwrap().es_type, EsType::Keyword);
/// ```
pub trait EsMapping {
    /// Fields in declaration order.
    fn field_specs() -> Vec<FieldSpec>;
}

impl<T: EsMapping> EsMapping for &T {
    fn field_specs() -> Vec<FieldSpec> {
        T::field_specs()
    }
}

impl<T: EsMapping> EsMapping for &mut T {
    fn field_specs() -> Vec<FieldSpec> {
        T::field_specs()
    }
}

impl<T: EsMapping> EsMapping for Box<T> {
    fn field_specs() -> Vec<FieldSpec> {
        T::field_specs()
    }
}

impl<T: EsMapping> EsMapping for Arc<T> {
    fn field_specs() -> Vec<FieldSpec> {
        T::field_specs()
    }
}

impl<T: EsMapping> EsMapping for Rc<T> {
    fn field_specs() -> Vec<FieldSpec> {
        T::field_specs()
    }
}

/// Anything mapping derivation can read fields from.
///
/// Every [`EsMapping`] value is a source, as are [`RecordSchema`] and
/// [`TypeSource`].
pub trait MappingSource: Sync {
    /// Fields in declaration order.
    fn fields(&self) -> Vec<FieldSpec>;
}

impl<T: EsMapping + Sync> MappingSource for T {
    fn fields(&self) -> Vec<FieldSpec> {
        <T as EsMapping>::field_specs()
    }
}

/// A [`MappingSource`] for `T` without needing a value of `T`.
pub struct TypeSource<T>(PhantomData<fn() -> T>);

impl<T: EsMapping> TypeSource<T> {
    /// Source for `T`.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: EsMapping> Default for TypeSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: EsMapping> MappingSource for TypeSource<T> {
    fn fields(&self) -> Vec<FieldSpec> {
        T::field_specs()
    }
}

/// Record description built at runtime.
///
/// ```rust
/// use esconvert::{RecordSchema, ScalarKind, derive_mapping};
///
/// let schema = RecordSchema::new()
///     .field::<String>("mid")
///     .field::<i64>("number64")
///     .field_kind("legacy", ScalarKind::I32);
/// assert_eq!(derive_mapping(&schema, 0).unwrap().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSchema {
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declared as `T`.
    pub fn field<T: ?Sized>(mut self, wire_name: impl Into<String>) -> Self {
        self.fields.push(FieldSpec::of::<T>(wire_name));
        self
    }

    /// Append a field with an explicit kind.
    pub fn field_kind(mut self, wire_name: impl Into<String>, kind: ScalarKind) -> Self {
        self.fields.push(FieldSpec::new(wire_name, kind));
        self
    }

    /// Append a field spec.
    pub fn push(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    /// Fields added so far.
    pub fn specs(&self) -> &[FieldSpec] {
        &self.fields
    }
}

impl From<Vec<FieldSpec>> for RecordSchema {
    fn from(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }
}

impl FromIterator<FieldSpec> for RecordSchema {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl MappingSource for RecordSchema {
    fn fields(&self) -> Vec<FieldSpec> {
        self.fields.clone()
    }
}
