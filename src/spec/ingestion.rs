use serde::{Deserialize, Serialize};

use crate::{spec::SpecError, time::Interval};

/// Ingestion document consumed by the segment input format.
///
/// Names the data source and time range to read, and the columns a reader
/// must materialize for every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSpec {
    data_source: String,
    intervals: Vec<Interval>,
    dimensions: Vec<String>,
    metrics: Vec<String>,
}

impl IngestionSpec {
    pub(crate) fn new(
        data_source: String,
        intervals: Vec<Interval>,
        dimensions: Vec<String>,
        metrics: Vec<String>,
    ) -> Self {
        Self {
            data_source,
            intervals,
            dimensions,
            metrics,
        }
    }

    /// Data source name.
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// Requested time ranges.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Dimension names to read.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Metric names to read.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// JSON form handed to the input format.
    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string(self)?)
    }
}
