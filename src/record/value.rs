use std::ops::Index;

use crate::schema::FieldKind;

/// A single cell of a projected row.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    /// Absent value.
    Null,
    /// Text cell.
    Text(String),
    /// Ordered dimension values, duplicates kept.
    TextList(Vec<String>),
    /// 64-bit integer cell.
    Int64(i64),
    /// Single-precision float cell.
    Float32(f32),
    /// Codec-encoded complex metric.
    Bytes(Vec<u8>),
}

impl OutputValue {
    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, OutputValue::Null)
    }

    /// Kind of a non-null value.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            OutputValue::Null => None,
            OutputValue::Text(_) => Some(FieldKind::Text),
            OutputValue::TextList(_) => Some(FieldKind::ListOfText),
            OutputValue::Int64(_) => Some(FieldKind::Int64),
            OutputValue::Float32(_) => Some(FieldKind::Float32),
            OutputValue::Bytes(_) => Some(FieldKind::OpaqueBytes),
        }
    }
}

/// Positional row matching an [`OutputSchema`](crate::schema::OutputSchema).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    values: Vec<OutputValue>,
}

impl OutputRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, value: OutputValue) {
        self.values.push(value);
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&OutputValue> {
        self.values.get(index)
    }

    /// All cells in schema order.
    pub fn values(&self) -> &[OutputValue] {
        &self.values
    }

    /// Take ownership of the cells.
    pub fn into_values(self) -> Vec<OutputValue> {
        self.values
    }
}

impl From<Vec<OutputValue>> for OutputRecord {
    fn from(values: Vec<OutputValue>) -> Self {
        Self { values }
    }
}

impl Index<usize> for OutputRecord {
    type Output = OutputValue;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}
