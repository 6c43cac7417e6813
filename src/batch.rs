//! Columnar assembly of projected rows into Arrow record batches.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, BinaryBuilder, Float32Builder, Int64Builder, ListBuilder, StringBuilder},
    datatypes::SchemaRef,
    error::ArrowError,
    record_batch::RecordBatch,
};
use thiserror::Error;

use crate::{
    record::{OutputRecord, OutputValue},
    schema::{FieldKind, OutputSchema},
};

/// Error returned when rows cannot be assembled into a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The row does not have one cell per column.
    #[error("row has {actual} cells, schema has {expected} columns")]
    WidthMismatch {
        /// Columns in the schema.
        expected: usize,
        /// Cells in the row.
        actual: usize,
    },
    /// A cell does not match its column's kind.
    #[error("column {column} expects {expected:?}, got {actual:?}")]
    KindMismatch {
        /// Column name.
        column: String,
        /// Kind declared by the schema.
        expected: FieldKind,
        /// Kind of the offending cell.
        actual: FieldKind,
    },
    /// A null cell in a non-nullable column.
    #[error("column {column} is not nullable")]
    NullValue {
        /// Column name.
        column: String,
    },
    /// Arrow rejected the assembled columns.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

enum ColumnBuilder {
    Text(StringBuilder),
    TextList(ListBuilder<StringBuilder>),
    Int64(Int64Builder),
    Float32(Float32Builder),
    Bytes(BinaryBuilder),
}

impl ColumnBuilder {
    fn with_capacity(kind: FieldKind, capacity: usize) -> Self {
        match kind {
            FieldKind::Text => ColumnBuilder::Text(StringBuilder::with_capacity(capacity, 0)),
            FieldKind::ListOfText => {
                ColumnBuilder::TextList(ListBuilder::with_capacity(StringBuilder::new(), capacity))
            }
            FieldKind::Int64 => ColumnBuilder::Int64(Int64Builder::with_capacity(capacity)),
            FieldKind::Float32 => ColumnBuilder::Float32(Float32Builder::with_capacity(capacity)),
            FieldKind::OpaqueBytes => {
                ColumnBuilder::Bytes(BinaryBuilder::with_capacity(capacity, 0))
            }
        }
    }

    // Callers check the cell kind first; a mismatch here appends null.
    fn append(&mut self, value: &OutputValue) {
        match (self, value) {
            (ColumnBuilder::Text(b), OutputValue::Text(v)) => b.append_value(v),
            (ColumnBuilder::Text(b), _) => b.append_null(),
            (ColumnBuilder::TextList(b), OutputValue::TextList(values)) => {
                for v in values {
                    b.values().append_value(v);
                }
                b.append(true);
            }
            (ColumnBuilder::TextList(b), _) => b.append(false),
            (ColumnBuilder::Int64(b), OutputValue::Int64(v)) => b.append_value(*v),
            (ColumnBuilder::Int64(b), _) => b.append_null(),
            (ColumnBuilder::Float32(b), OutputValue::Float32(v)) => b.append_value(*v),
            (ColumnBuilder::Float32(b), _) => b.append_null(),
            (ColumnBuilder::Bytes(b), OutputValue::Bytes(v)) => b.append_value(v),
            (ColumnBuilder::Bytes(b), _) => b.append_null(),
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Text(b) => Arc::new(b.finish()),
            ColumnBuilder::TextList(b) => Arc::new(b.finish()),
            ColumnBuilder::Int64(b) => Arc::new(b.finish()),
            ColumnBuilder::Float32(b) => Arc::new(b.finish()),
            ColumnBuilder::Bytes(b) => Arc::new(b.finish()),
        }
    }
}

/// Accumulates [`OutputRecord`]s column by column.
pub struct OutputBatchBuilder {
    schema: OutputSchema,
    arrow_schema: SchemaRef,
    columns: Vec<ColumnBuilder>,
    len: usize,
}

impl OutputBatchBuilder {
    /// Builder for rows of `schema`, reserving room for `capacity` rows.
    pub fn new(schema: &OutputSchema, capacity: usize) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| ColumnBuilder::with_capacity(f.kind(), capacity))
            .collect();
        Self {
            arrow_schema: schema.to_arrow(),
            schema: schema.clone(),
            columns,
            len: 0,
        }
    }

    /// Append one row. The row is checked in full before any column is
    /// touched, so a rejected row leaves the builder unchanged.
    pub fn push(&mut self, record: &OutputRecord) -> Result<(), BatchError> {
        if record.len() != self.schema.len() {
            return Err(BatchError::WidthMismatch {
                expected: self.schema.len(),
                actual: record.len(),
            });
        }
        for (idx, (field, value)) in self.schema.fields().iter().zip(record.values()).enumerate() {
            match value.kind() {
                None if idx == 0 => {
                    return Err(BatchError::NullValue {
                        column: field.name().to_string(),
                    })
                }
                Some(actual) if actual != field.kind() => {
                    return Err(BatchError::KindMismatch {
                        column: field.name().to_string(),
                        expected: field.kind(),
                        actual,
                    })
                }
                _ => {}
            }
        }
        for (column, value) in self.columns.iter_mut().zip(record.values()) {
            column.append(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Rows appended since the last [`finish`](Self::finish).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no rows are pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Arrow schema of the produced batches.
    pub fn schema(&self) -> SchemaRef {
        self.arrow_schema.clone()
    }

    /// Build a batch from the pending rows and reset the builder.
    pub fn finish(&mut self) -> Result<RecordBatch, BatchError> {
        let arrays = self
            .columns
            .iter_mut()
            .map(ColumnBuilder::finish)
            .collect::<Vec<_>>();
        self.len = 0;
        Ok(RecordBatch::try_new(self.arrow_schema.clone(), arrays)?)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{
        Array, ArrayBuilder, BinaryArray, Float32Array, Int64Array, ListArray, StringArray,
    };

    use super::*;
    use crate::{
        codec::CodecRegistry,
        projector::RowProjector,
        test_util::{row_at, spec},
    };

    impl ColumnBuilder {
        fn pending(&self) -> usize {
            match self {
                ColumnBuilder::Text(b) => b.len(),
                ColumnBuilder::TextList(b) => b.len(),
                ColumnBuilder::Int64(b) => b.len(),
                ColumnBuilder::Float32(b) => b.len(),
                ColumnBuilder::Bytes(b) => b.len(),
            }
        }
    }

    fn projector() -> RowProjector {
        let mut codecs = CodecRegistry::new();
        codecs.register_fn("hyperUnique", |v: &Vec<u8>| Ok(v.clone()));
        RowProjector::new(
            Arc::new(spec(
                &["page"],
                &[("count", "long"), ("added", "float"), ("uniques", "hyperUnique")],
            )),
            Arc::new(codecs),
        )
    }

    #[test]
    fn builds_typed_columns() {
        let projector = projector();
        let mut builder = OutputBatchBuilder::new(&projector.schema(), 4);
        let rows = [
            row_at("2024-01-01T00:00:00Z")
                .with_dimension("page", ["a", "b"])
                .with_metric("count", 1_i64)
                .with_metric("added", 0.5_f32)
                .with_complex("uniques", vec![1_u8, 2]),
            row_at("2024-01-01T00:00:01Z"),
        ];
        for row in &rows {
            builder.push(&projector.project(row).unwrap()).unwrap();
        }
        assert_eq!(builder.len(), 2);
        assert!(builder.columns.iter().all(|c| c.pending() == 2));

        let batch = builder.finish().unwrap();
        assert!(builder.is_empty());
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema(), projector.schema().to_arrow());

        let ts = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(ts.value(1), "2024-01-01T00:00:01.000Z");

        let pages = batch.column(1).as_any().downcast_ref::<ListArray>().unwrap();
        let first = pages.value(0);
        let first = first.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!((first.value(0), first.value(1)), ("a", "b"));
        assert!(pages.is_null(1));

        let count = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(count.value(0), 1);
        assert!(count.is_null(1));

        let added = batch.column(3).as_any().downcast_ref::<Float32Array>().unwrap();
        assert_eq!(added.value(0), 0.5);

        let uniques = batch.column(4).as_any().downcast_ref::<BinaryArray>().unwrap();
        assert_eq!(uniques.value(0), [1, 2]);
        assert!(uniques.is_null(1));
    }

    #[test]
    fn rejected_row_leaves_builder_unchanged() {
        let projector = projector();
        let mut builder = OutputBatchBuilder::new(&projector.schema(), 1);

        let short = OutputRecord::from(vec![OutputValue::Text("t".into())]);
        assert!(matches!(
            builder.push(&short),
            Err(BatchError::WidthMismatch {
                expected: 5,
                actual: 1
            })
        ));

        let wrong_kind = OutputRecord::from(vec![
            OutputValue::Text("t".into()),
            OutputValue::Null,
            OutputValue::Float32(1.0),
            OutputValue::Null,
            OutputValue::Null,
        ]);
        assert!(matches!(
            builder.push(&wrong_kind),
            Err(BatchError::KindMismatch { column, expected: FieldKind::Int64, actual: FieldKind::Float32 })
                if column == "count"
        ));

        let null_timestamp = OutputRecord::from(vec![OutputValue::Null; 5]);
        assert!(matches!(
            builder.push(&null_timestamp),
            Err(BatchError::NullValue { .. })
        ));

        assert!(builder.is_empty());
        assert!(builder.columns.iter().all(|c| c.pending() == 0));
        assert_eq!(builder.finish().unwrap().num_rows(), 0);
    }
}
