//! Positional output schema shared by schema derivation and projection.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef};
use serde::{Deserialize, Serialize};

/// Name of the leading timestamp column.
pub const TIMESTAMP_COLUMN: &str = "druid_timestamp";

/// Kind of value an output column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    /// UTF-8 text; used for the timestamp column.
    Text,
    /// Ordered list of text values; used for (possibly multi-valued) dimensions.
    ListOfText,
    /// 64-bit signed integer.
    Int64,
    /// Single-precision float.
    Float32,
    /// Codec-encoded bytes of a complex metric.
    OpaqueBytes,
}

impl FieldKind {
    /// Arrow type used when exporting this kind.
    pub fn arrow_type(&self) -> DataType {
        match self {
            FieldKind::Text => DataType::Utf8,
            FieldKind::ListOfText => {
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
            }
            FieldKind::Int64 => DataType::Int64,
            FieldKind::Float32 => DataType::Float32,
            FieldKind::OpaqueBytes => DataType::Binary,
        }
    }
}

/// A named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputField {
    name: String,
    kind: FieldKind,
}

impl OutputField {
    /// Describe a column.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Ordered set of output columns; field 0 is always the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputSchema {
    fields: Vec<OutputField>,
}

impl OutputSchema {
    pub(crate) fn new(fields: Vec<OutputField>) -> Self {
        Self { fields }
    }

    /// All columns in order.
    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Arrow view of the schema.
    ///
    /// The timestamp column is non-nullable; every other column is nullable
    /// because absent dimensions and metrics project to null.
    pub fn to_arrow(&self) -> SchemaRef {
        let fields = self
            .fields
            .iter()
            .enumerate()
            .map(|(idx, f)| Field::new(&f.name, f.kind.arrow_type(), idx != 0))
            .collect::<Vec<_>>();
        Arc::new(ArrowSchema::new(fields))
    }
}
