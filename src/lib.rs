#![deny(missing_docs)]
//! Row projection for Druid segment data.
//!
//! A [`LoadSpec`] lists the dimensions and metrics to read from a data source.
//! On the planning side a [`SegmentLoader`] resolves the spec once, derives
//! the [`OutputSchema`] and packs everything workers need into a
//! [`TaskConfig`]. On the worker side a [`ProjectingReader`] turns native
//! segment rows into positional [`OutputRecord`]s, which an
//! [`OutputBatchBuilder`] can assemble into Arrow record batches.

mod logging;

#[cfg(test)]
mod test_util;

pub mod batch;
pub mod codec;
/// Crate-level error.
pub mod error;
pub mod loader;
/// Load options.
pub mod option;
pub mod projector;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod spec;
pub mod task;
pub mod time;

pub use crate::{
    batch::OutputBatchBuilder,
    codec::{CodecRegistry, ComplexCodec},
    error::Error,
    loader::SegmentLoader,
    option::LoadOptions,
    projector::{ProjectingReader, RecordReader, RowProjector},
    record::{InputRow, MetricValue, NativeRecord, OutputRecord, OutputValue},
    resolve::{FusioStore, SpecResolver, SpecStore},
    schema::{FieldKind, OutputField, OutputSchema, TIMESTAMP_COLUMN},
    spec::{LoadSpec, Metric, MetricType},
    task::TaskConfig,
    time::Interval,
};
