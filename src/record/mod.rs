//! Native segment rows on the input side and positional rows on the output side.

mod value;

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use chrono::{DateTime, Utc};
pub use value::{OutputRecord, OutputValue};

/// Opaque value of a complex metric, downcast by the codec registered for its type.
pub type ComplexValue = Arc<dyn Any + Send + Sync>;

/// Raw metric value as exposed by a segment reader.
#[derive(Clone)]
pub enum MetricValue {
    /// 64-bit integer metric.
    Long(i64),
    /// Single-precision float metric.
    Float(f32),
    /// Complex metric object.
    Complex(ComplexValue),
}

impl fmt::Debug for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Long(v) => f.debug_tuple("Long").field(v).finish(),
            MetricValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            MetricValue::Complex(_) => f.write_str("Complex(..)"),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Long(value)
    }
}

impl From<f32> for MetricValue {
    fn from(value: f32) -> Self {
        MetricValue::Float(value)
    }
}

/// A timestamped row read from a segment.
///
/// Implemented by the segment reader's row type; the projector only reads
/// from it.
pub trait NativeRecord {
    /// Row timestamp.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Values of a dimension in the order the segment stores them.
    ///
    /// Returns an empty slice when the dimension is absent.
    fn dimension(&self, name: &str) -> &[String];

    /// Raw value of a metric, `None` when absent.
    fn metric(&self, name: &str) -> Option<&MetricValue>;
}

impl<R: NativeRecord + ?Sized> NativeRecord for &R {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn dimension(&self, name: &str) -> &[String] {
        (**self).dimension(name)
    }

    fn metric(&self, name: &str) -> Option<&MetricValue> {
        (**self).metric(name)
    }
}

/// Map-backed [`NativeRecord`].
#[derive(Debug, Clone)]
pub struct InputRow {
    timestamp: DateTime<Utc>,
    dimensions: HashMap<String, Vec<String>>,
    metrics: HashMap<String, MetricValue>,
}

impl InputRow {
    /// Empty row at `timestamp`.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            dimensions: HashMap::new(),
            metrics: HashMap::new(),
        }
    }

    /// Set a dimension's values, replacing earlier ones.
    pub fn with_dimension<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Set a metric's raw value.
    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    /// Set a complex metric's raw value.
    pub fn with_complex<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.metrics
            .insert(name.into(), MetricValue::Complex(Arc::new(value)));
        self
    }
}

impl NativeRecord for InputRow {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn dimension(&self, name: &str) -> &[String] {
        self.dimensions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn input_row_lookups() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let row = InputRow::new(ts)
            .with_dimension("tags", ["a", "b", "a"])
            .with_metric("clicks", 7_i64)
            .with_complex("sketch", vec![1_u8, 2]);

        assert_eq!(row.timestamp(), ts);
        assert_eq!(row.dimension("tags"), ["a", "b", "a"]);
        assert!(row.dimension("missing").is_empty());
        assert!(matches!(row.metric("clicks"), Some(MetricValue::Long(7))));
        assert!(matches!(row.metric("sketch"), Some(MetricValue::Complex(_))));
        assert!(row.metric("missing").is_none());
    }
}
