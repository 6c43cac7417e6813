use crate::{
    batch::BatchError, projector::ProjectionError, resolve::ResolveError, spec::SpecError,
    task::TaskConfigError, time::IntervalError,
};

/// Error returned by the projector's public entry points
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid load spec
    #[error("load spec error: {0}")]
    Spec(#[from] SpecError),
    /// Invalid interval
    #[error("interval error: {0}")]
    Interval(#[from] IntervalError),
    /// Load spec could not be resolved
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
    /// Row projection failed
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
    /// Task config could not be encoded or decoded
    #[error("task config error: {0}")]
    TaskConfig(#[from] TaskConfigError),
    /// Rows could not be assembled into a batch
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),
    /// A load was planned without any time interval
    #[error("no interval requested for load spec at {schema_location}")]
    NoIntervals {
        /// Location of the load spec
        schema_location: String,
    },
}
