use crate::time::{Interval, IntervalError};

/// Options of one load: where the spec lives and which time ranges to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub(crate) schema_location: String,
    pub(crate) intervals: Vec<Interval>,
}

impl LoadOptions {
    /// Options reading the spec at `schema_location` with no intervals yet.
    pub fn new(schema_location: impl Into<String>) -> Self {
        LoadOptions {
            schema_location: schema_location.into(),
            intervals: Vec::new(),
        }
    }

    /// Options from a spec location and an ISO-8601 `start/end` interval.
    pub fn parse(schema_location: impl Into<String>, interval: &str) -> Result<Self, IntervalError> {
        Ok(LoadOptions::new(schema_location).interval(interval.parse()?))
    }

    /// Add a time range to read.
    pub fn interval(mut self, interval: Interval) -> Self {
        self.intervals.push(interval);
        self
    }

    /// Replace the time ranges to read.
    pub fn intervals(self, intervals: Vec<Interval>) -> Self {
        LoadOptions { intervals, ..self }
    }

    /// Location of the spec document.
    pub fn schema_location(&self) -> &str {
        &self.schema_location
    }
}
