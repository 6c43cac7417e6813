//! Planning-side adapter: loads the spec once, exposes the output schema and
//! builds the [`TaskConfig`] handed to workers.

use std::sync::Arc;

use crate::{
    error::Error,
    logging::projector_log,
    option::LoadOptions,
    resolve::{ResolveError, SpecResolver, SpecStore},
    schema::OutputSchema,
    spec::LoadSpec,
    task::TaskConfig,
};

/// Loader for one data source.
///
/// Owns its [`LoadSpec`]; the spec document is read at most once per loader
/// no matter how often the schema or a task config is requested.
#[derive(Debug)]
pub struct SegmentLoader {
    options: LoadOptions,
    spec: Option<Arc<LoadSpec>>,
}

impl SegmentLoader {
    /// Create a loader; nothing is read until the spec is first needed.
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            spec: None,
        }
    }

    /// Load options.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// The spec, if it has been loaded.
    pub fn spec(&self) -> Option<&Arc<LoadSpec>> {
        self.spec.as_ref()
    }

    /// Load the spec through `resolver` unless already loaded.
    pub async fn load_spec<S: SpecStore>(
        &mut self,
        resolver: &SpecResolver<S>,
    ) -> Result<Arc<LoadSpec>, ResolveError> {
        if let Some(spec) = &self.spec {
            return Ok(spec.clone());
        }
        let spec = Arc::new(resolver.load(&self.options.schema_location).await?);
        self.spec = Some(spec.clone());
        Ok(spec)
    }

    /// Output schema, available before any data is read.
    pub async fn output_schema<S: SpecStore>(
        &mut self,
        resolver: &SpecResolver<S>,
    ) -> Result<OutputSchema, ResolveError> {
        Ok(self.load_spec(resolver).await?.derive_schema())
    }

    /// Build the task config for `data_source`.
    ///
    /// `data_source` is used verbatim as the data source name. Fails with
    /// [`Error::NoIntervals`] before touching the resolver when no interval
    /// was requested.
    pub async fn plan<S: SpecStore>(
        &mut self,
        data_source: &str,
        resolver: &SpecResolver<S>,
    ) -> Result<TaskConfig, Error> {
        if self.options.intervals.is_empty() {
            return Err(Error::NoIntervals {
                schema_location: self.options.schema_location.clone(),
            });
        }
        let spec = self.load_spec(resolver).await?;
        let config = TaskConfig::new(
            data_source.to_string(),
            self.options.schema_location.clone(),
            self.options.intervals.clone(),
            spec,
        );
        projector_log!(
            log::Level::Info,
            "task_planned",
            "data_source={} intervals={} columns={}",
            data_source,
            config.intervals().len(),
            config.spec().column_count()
        );
        Ok(config)
    }
}
