//! Configuration shipped from the planner to every worker task.
//!
//! The planner resolves the load spec once and serializes it, together with
//! the data source and intervals, into a single JSON blob attached to each
//! task. Workers never re-read the spec document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    codec::CodecRegistry,
    logging::LogContext,
    projector::{ProjectingReader, RecordReader, RowProjector},
    schema::OutputSchema,
    spec::{IngestionSpec, LoadSpec},
    time::Interval,
};

/// Error returned when a task config blob cannot be encoded or decoded.
#[derive(Debug, Error)]
#[error("invalid task config: {0}")]
pub struct TaskConfigError(#[from] serde_json::Error);

/// Everything a worker needs to read one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    data_source: String,
    schema_location: String,
    intervals: Vec<Interval>,
    spec: Arc<LoadSpec>,
}

impl TaskConfig {
    pub(crate) fn new(
        data_source: String,
        schema_location: String,
        intervals: Vec<Interval>,
        spec: Arc<LoadSpec>,
    ) -> Self {
        Self {
            data_source,
            schema_location,
            intervals,
            spec,
        }
    }

    /// Data source name, used verbatim.
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// Where the planner found the spec.
    pub fn schema_location(&self) -> &str {
        &self.schema_location
    }

    /// Requested time ranges.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// The resolved spec.
    pub fn spec(&self) -> &Arc<LoadSpec> {
        &self.spec
    }

    /// Encode for transport to workers.
    pub fn to_json(&self) -> Result<String, TaskConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode on a worker; the embedded spec is validated again.
    pub fn from_json(json: &str) -> Result<Self, TaskConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ingestion document for the segment input format.
    pub fn ingestion_spec(&self) -> IngestionSpec {
        self.spec
            .compile_ingestion_target(self.data_source.clone(), self.intervals.clone())
    }

    /// Schema of the rows this task produces.
    pub fn output_schema(&self) -> OutputSchema {
        self.spec.derive_schema()
    }

    /// Projector for this task's spec.
    pub fn projector(&self, codecs: Arc<CodecRegistry>) -> RowProjector {
        RowProjector::new(self.spec.clone(), codecs)
    }

    /// Start projecting the rows of one split.
    pub fn open<R: RecordReader>(
        &self,
        reader: R,
        codecs: Arc<CodecRegistry>,
    ) -> ProjectingReader<R> {
        ProjectingReader::new(reader, self.projector(codecs))
            .with_log_context(LogContext::new(format!("data_source={}", self.data_source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        projector::VecReader,
        record::OutputValue,
        test_util::{row_at, spec},
    };

    fn config() -> TaskConfig {
        TaskConfig::new(
            "ads".into(),
            "/specs/ads.json".into(),
            vec!["2024-01-01/2024-01-02".parse().unwrap()],
            Arc::new(spec(&["country"], &[("clicks", "long")])),
        )
    }

    #[test]
    fn json_round_trip() {
        let config = config();
        let json = config.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"dataSource":"ads","schemaLocation":"/specs/ads.json","intervals":["2024-01-01T00:00:00.000Z/2024-01-02T00:00:00.000Z"],"spec":{"dimensions":["country"],"metrics":[{"name":"clicks","type":"long"}]}}"#
        );
        let back = TaskConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.output_schema(), config.output_schema());
    }

    #[test]
    fn invalid_embedded_spec_is_rejected() {
        let json = r#"{"dataSource":"ads","schemaLocation":"x","intervals":[],"spec":{"dimensions":["druid_timestamp"],"metrics":[]}}"#;
        assert!(TaskConfig::from_json(json).is_err());
    }

    #[test]
    fn ingestion_spec_uses_task_fields() {
        let target = config().ingestion_spec();
        assert_eq!(target.data_source(), "ads");
        assert_eq!(target.intervals().len(), 1);
        assert_eq!(target.dimensions(), ["country"]);
        assert_eq!(target.metrics(), ["clicks"]);
    }

    #[test]
    fn open_projects_rows() {
        let reader = VecReader::new(vec![row_at("2024-01-01T00:00:00Z")
            .with_dimension("country", ["US"])
            .with_metric("clicks", 7_i64)]);
        let mut rows = config().open(reader, Arc::new(CodecRegistry::new()));
        let row = rows.next_record().unwrap().unwrap();
        assert_eq!(row[2], OutputValue::Int64(7));
        assert!(rows.next_record().unwrap().is_none());
    }
}
