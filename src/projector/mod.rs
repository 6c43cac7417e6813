//! Projection of native segment rows into positional output rows.

mod reader;

use std::sync::Arc;

pub use reader::{ProjectingReader, ReadError, ReaderState, RecordReader, VecReader};
use thiserror::Error;

use crate::{
    codec::{CodecError, CodecRegistry, MissingCodecError},
    record::{MetricValue, NativeRecord, OutputRecord, OutputValue},
    schema::OutputSchema,
    spec::{LoadSpec, Metric},
    time::format_timestamp,
};

/// Error returned when a row cannot be projected.
///
/// Every variant aborts the current partition; none of them is transient.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A complex metric has a value but no codec is registered for its type.
    #[error(transparent)]
    MissingCodec(#[from] MissingCodecError),
    /// The registered codec rejected the value.
    #[error("codec for {type_name} failed on metric {metric}: {source}")]
    Codec {
        /// Metric column name.
        metric: String,
        /// Complex type identifier.
        type_name: String,
        /// Codec failure.
        #[source]
        source: CodecError,
    },
    /// A primitive metric column received a complex object.
    #[error("metric {metric} is declared {declared} but the row holds a complex value")]
    UnexpectedComplex {
        /// Metric column name.
        metric: String,
        /// Declared metric type.
        declared: String,
    },
    /// The underlying reader failed or was interrupted.
    #[error("failed to read records from reader: {0}")]
    Read(#[from] ReadError),
}

/// Stateless mapping from [`NativeRecord`]s to [`OutputRecord`]s for one [`LoadSpec`].
///
/// Both the spec and the codec registry are read-only, so a projector can be
/// cloned cheaply and shared across concurrent partitions.
#[derive(Debug, Clone)]
pub struct RowProjector {
    spec: Arc<LoadSpec>,
    codecs: Arc<CodecRegistry>,
}

impl RowProjector {
    /// Create a projector for `spec` using `codecs` for complex metrics.
    pub fn new(spec: Arc<LoadSpec>, codecs: Arc<CodecRegistry>) -> Self {
        Self { spec, codecs }
    }

    /// The spec driving the projection.
    pub fn spec(&self) -> &LoadSpec {
        &self.spec
    }

    /// Schema every projected row conforms to.
    pub fn schema(&self) -> OutputSchema {
        self.spec.derive_schema()
    }

    /// Project one row.
    ///
    /// Either every column is produced or the whole call fails; there is no
    /// partial row.
    pub fn project<R>(&self, row: &R) -> Result<OutputRecord, ProjectionError>
    where
        R: NativeRecord + ?Sized,
    {
        let mut record = OutputRecord::with_capacity(self.spec.column_count());
        record.push(OutputValue::Text(format_timestamp(&row.timestamp())));

        for dimension in self.spec.dimensions() {
            let values = row.dimension(dimension);
            if values.is_empty() {
                record.push(OutputValue::Null);
            } else {
                record.push(OutputValue::TextList(values.to_vec()));
            }
        }

        for metric in self.spec.metrics() {
            record.push(self.project_metric(metric, row.metric(metric.name()))?);
        }

        Ok(record)
    }

    fn project_metric(
        &self,
        metric: &Metric,
        raw: Option<&MetricValue>,
    ) -> Result<OutputValue, ProjectionError> {
        let Some(raw) = raw else {
            return Ok(OutputValue::Null);
        };
        let metric_type = metric.metric_type();

        if !metric_type.is_complex() {
            return match raw {
                MetricValue::Long(v) => Ok(OutputValue::Int64(*v)),
                MetricValue::Float(v) => Ok(OutputValue::Float32(*v)),
                MetricValue::Complex(_) => Err(ProjectionError::UnexpectedComplex {
                    metric: metric.name().to_string(),
                    declared: metric_type.to_string(),
                }),
            };
        }

        let codec = self.codecs.lookup(metric_type.as_str())?;
        let bytes = match raw {
            MetricValue::Complex(value) => codec.to_bytes(value.as_ref()),
            MetricValue::Long(v) => codec.to_bytes(v),
            MetricValue::Float(v) => codec.to_bytes(v),
        }
        .map_err(|source| ProjectionError::Codec {
            metric: metric.name().to_string(),
            type_name: metric_type.to_string(),
            source,
        })?;

        Ok(OutputValue::Bytes(bytes))
    }
}
