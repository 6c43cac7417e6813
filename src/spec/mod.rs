//! The load specification: which dimensions and metrics to read from a
//! data source, and in which order they appear in projected rows.

mod ingestion;

use std::{collections::HashSet, fmt};

pub use ingestion::IngestionSpec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    schema::{FieldKind, OutputField, OutputSchema, TIMESTAMP_COLUMN},
    time::Interval,
};

/// Error returned when a load specification document is unusable.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The document is not valid JSON of the expected shape.
    #[error("malformed load spec: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A dimension or metric has an empty name.
    #[error("empty column name in load spec")]
    EmptyName,
    /// A metric declares an empty type.
    #[error("metric {name} has an empty type")]
    EmptyType {
        /// Metric name.
        name: String,
    },
    /// A dimension or metric reuses the reserved timestamp column name.
    #[error("column name {name} is reserved for the timestamp column")]
    ReservedName {
        /// Colliding name.
        name: String,
    },
    /// Two columns share a name.
    #[error("duplicate column name {name}")]
    DuplicateName {
        /// Colliding name.
        name: String,
    },
}

/// Declared type of a metric column.
///
/// `float` and `long` are primitive; any other identifier names a complex type
/// whose values are serialized through a registered codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricType {
    /// Single-precision float metric.
    Float,
    /// 64-bit integer metric.
    Long,
    /// Complex metric identified by its type name (e.g. `hyperUnique`).
    Complex(String),
}

impl MetricType {
    /// Type identifier as written in the spec document.
    pub fn as_str(&self) -> &str {
        match self {
            MetricType::Float => "float",
            MetricType::Long => "long",
            MetricType::Complex(name) => name,
        }
    }

    /// Whether values of this type go through a complex codec.
    pub fn is_complex(&self) -> bool {
        matches!(self, MetricType::Complex(_))
    }

    /// Output column kind for this metric type.
    pub fn field_kind(&self) -> FieldKind {
        match self {
            MetricType::Float => FieldKind::Float32,
            MetricType::Long => FieldKind::Int64,
            MetricType::Complex(_) => FieldKind::OpaqueBytes,
        }
    }
}

impl From<String> for MetricType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "float" => MetricType::Float,
            "long" => MetricType::Long,
            _ => MetricType::Complex(value),
        }
    }
}

impl From<&str> for MetricType {
    fn from(value: &str) -> Self {
        MetricType::from(value.to_string())
    }
}

impl From<MetricType> for String {
    fn from(value: MetricType) -> Self {
        match value {
            MetricType::Complex(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed metric column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metric {
    name: String,
    #[serde(rename = "type")]
    metric_type: MetricType,
}

impl Metric {
    /// Declare a metric.
    pub fn new(name: impl Into<String>, metric_type: impl Into<MetricType>) -> Self {
        Self {
            name: name.into(),
            metric_type: metric_type.into(),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn metric_type(&self) -> &MetricType {
        &self.metric_type
    }
}

/// Shape of the spec document before validation.
#[derive(Deserialize)]
struct LoadSpecDocument {
    dimensions: Vec<String>,
    metrics: Vec<Metric>,
}

impl TryFrom<LoadSpecDocument> for LoadSpec {
    type Error = SpecError;

    fn try_from(doc: LoadSpecDocument) -> Result<Self, Self::Error> {
        LoadSpec::new(doc.dimensions, doc.metrics)
    }
}

/// Immutable description of the columns to load from a data source.
///
/// Column order is significant: projected rows carry the timestamp first,
/// then every dimension in declaration order, then every metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LoadSpecDocument")]
pub struct LoadSpec {
    dimensions: Vec<String>,
    metrics: Vec<Metric>,
}

impl LoadSpec {
    /// Build a spec, rejecting empty names and name collisions.
    pub fn new(dimensions: Vec<String>, metrics: Vec<Metric>) -> Result<Self, SpecError> {
        let mut seen = HashSet::with_capacity(dimensions.len() + metrics.len());
        for name in dimensions.iter().chain(metrics.iter().map(|m| &m.name)) {
            if name.is_empty() {
                return Err(SpecError::EmptyName);
            }
            if name == TIMESTAMP_COLUMN {
                return Err(SpecError::ReservedName { name: name.clone() });
            }
            if !seen.insert(name.as_str()) {
                return Err(SpecError::DuplicateName { name: name.clone() });
            }
        }
        if let Some(metric) = metrics.iter().find(|m| m.metric_type.as_str().is_empty()) {
            return Err(SpecError::EmptyType {
                name: metric.name.clone(),
            });
        }

        Ok(Self {
            dimensions,
            metrics,
        })
    }

    /// Parse a JSON spec document.
    pub fn parse(document: &[u8]) -> Result<Self, SpecError> {
        let doc: LoadSpecDocument = serde_json::from_slice(document)?;
        LoadSpec::try_from(doc)
    }

    /// Serialize back to the document form accepted by [`LoadSpec::parse`].
    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Dimension names in output order.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Metric declarations in output order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Number of output columns, timestamp included.
    pub fn column_count(&self) -> usize {
        1 + self.dimensions.len() + self.metrics.len()
    }

    /// Derive the positional output schema.
    ///
    /// This is a pure function of the spec, so the planner and every worker
    /// derive identical schemas independently.
    pub fn derive_schema(&self) -> OutputSchema {
        let mut fields = Vec::with_capacity(self.column_count());
        fields.push(OutputField::new(TIMESTAMP_COLUMN, FieldKind::Text));
        fields.extend(
            self.dimensions
                .iter()
                .map(|name| OutputField::new(name.clone(), FieldKind::ListOfText)),
        );
        fields.extend(
            self.metrics
                .iter()
                .map(|m| OutputField::new(m.name.clone(), m.metric_type.field_kind())),
        );
        OutputSchema::new(fields)
    }

    /// Compile the ingestion document handed to the segment input format.
    pub fn compile_ingestion_target(
        &self,
        data_source: impl Into<String>,
        intervals: Vec<Interval>,
    ) -> IngestionSpec {
        IngestionSpec::new(
            data_source.into(),
            intervals,
            self.dimensions.clone(),
            self.metrics.iter().map(|m| m.name.clone()).collect(),
        )
    }
}
