//! Locating and reading the load spec document.
//!
//! A location is either a path on the local host or a path on the shared
//! (distributed) filesystem. Local files take precedence: an absolute path, or
//! a relative path under the configured local root, that names an existing
//! file is read from disk; everything else goes to the [`SpecStore`].

use std::{
    future::Future,
    io,
    path::{Path as StdPath, PathBuf},
    sync::Arc,
};

use fusio::{fs::OpenOptions, path::Path, DynFs, Read};
use thiserror::Error;

use crate::{
    logging::projector_log,
    spec::{LoadSpec, SpecError},
};

/// Error raised by a [`SpecStore`] or while reading a local file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Local filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Failure in the shared filesystem.
    #[error("fusio error: {0}")]
    Fusio(#[from] fusio::Error),
    /// The location is not a valid shared-filesystem path.
    #[error("invalid path: {0}")]
    Path(#[from] fusio::path::Error),
}

/// Error returned when the load spec cannot be obtained.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither the local host nor the shared filesystem yielded a readable document.
    #[error("load spec not found at {location}: {source}")]
    NotFound {
        /// Requested location.
        location: String,
        /// Failure from the source that was tried.
        #[source]
        source: StoreError,
    },
    /// The document was read but is not a valid load spec.
    #[error("load spec at {location} is invalid: {source}")]
    Malformed {
        /// Requested location.
        location: String,
        /// Parse or validation failure.
        #[source]
        source: SpecError,
    },
}

/// Read access to documents on the shared filesystem.
///
/// Stores are shared by reference across awaits, so resolution stays
/// spawnable on a multi-threaded runtime.
pub trait SpecStore: Send + Sync {
    /// Read the whole document at `location`.
    fn read_spec(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StoreError>> + Send;
}

/// [`SpecStore`] over a fusio filesystem.
#[derive(Clone)]
pub struct FusioStore {
    fs: Arc<dyn DynFs>,
    root: Option<Path>,
}

impl FusioStore {
    /// Store reading locations as paths of `fs`.
    pub fn new(fs: Arc<dyn DynFs>) -> Self {
        Self { fs, root: None }
    }

    /// Resolve locations relative to `root`.
    pub fn root(self, root: Path) -> Self {
        Self {
            root: Some(root),
            ..self
        }
    }

    fn path_for(&self, location: &str) -> Result<Path, StoreError> {
        let path = match &self.root {
            Some(root) => {
                Path::parse(format!("{}/{}", root, location.trim_start_matches('/')))?
            }
            None => Path::parse(location)?,
        };
        Ok(path)
    }
}

impl SpecStore for FusioStore {
    async fn read_spec(&self, location: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(location)?;
        let mut file = self
            .fs
            .open_options(&path, OpenOptions::default().read(true))
            .await?;
        let (result, data) = file.read_to_end_at(Vec::new(), 0).await;
        result?;
        Ok(data)
    }
}

/// Where a location will be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// A file on the local host.
    Local(PathBuf),
    /// A path on the shared filesystem.
    Remote(String),
}

/// Chooses between the local host and the shared filesystem and loads the spec.
pub struct SpecResolver<S> {
    store: S,
    local_root: Option<PathBuf>,
}

impl<S: SpecStore> SpecResolver<S> {
    /// Resolver falling back to `store` for non-local locations.
    pub fn new(store: S) -> Self {
        Self {
            store,
            local_root: None,
        }
    }

    /// Also look for relative locations under `root` on the local host.
    pub fn local_root(self, root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: Some(root.into()),
            ..self
        }
    }

    /// The shared filesystem store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decide where `location` is read from.
    ///
    /// Depends only on the location and the local filesystem state, so the
    /// same location always resolves the same way on a given host.
    pub fn source_for(&self, location: &str) -> SpecSource {
        let path = StdPath::new(location);
        let local = if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            self.local_root.as_ref().map(|root| root.join(path))
        };
        match local {
            Some(candidate) if candidate.is_file() => SpecSource::Local(candidate),
            _ => SpecSource::Remote(location.to_string()),
        }
    }

    /// Read the raw document at `location`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn read(&self, location: &str) -> Result<Vec<u8>, ResolveError> {
        let not_found = |source: StoreError| ResolveError::NotFound {
            location: location.to_string(),
            source,
        };
        match self.source_for(location) {
            SpecSource::Local(path) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|err| not_found(err.into()))?;
                projector_log!(
                    log::Level::Info,
                    "spec_resolved",
                    "source=local path={} bytes={}",
                    path.display(),
                    bytes.len()
                );
                Ok(bytes)
            }
            SpecSource::Remote(remote) => {
                let bytes = self.store.read_spec(&remote).await.map_err(not_found)?;
                projector_log!(
                    log::Level::Info,
                    "spec_resolved",
                    "source=remote location={} bytes={}",
                    remote,
                    bytes.len()
                );
                Ok(bytes)
            }
        }
    }

    /// Read and parse the load spec at `location`.
    pub async fn load(&self, location: &str) -> Result<LoadSpec, ResolveError> {
        let bytes = self.read(location).await?;
        LoadSpec::parse(&bytes).map_err(|source| ResolveError::Malformed {
            location: location.to_string(),
            source,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::HashMap, io, sync::Arc};

    use fusio::{disk::LocalFs, path::Path};
    use tempfile::TempDir;

    use super::*;

    pub(crate) const SPEC: &str =
        r#"{"dimensions":["country"],"metrics":[{"name":"clicks","type":"long"}]}"#;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        docs: HashMap<String, Vec<u8>>,
    }

    impl MemoryStore {
        pub(crate) fn with(mut self, location: &str, doc: &str) -> Self {
            self.docs.insert(location.to_string(), doc.as_bytes().to_vec());
            self
        }
    }

    impl SpecStore for MemoryStore {
        async fn read_spec(&self, location: &str) -> Result<Vec<u8>, StoreError> {
            self.docs.get(location).cloned().ok_or_else(|| {
                StoreError::Io(io::Error::new(io::ErrorKind::NotFound, location.to_string()))
            })
        }
    }

    fn write_spec(dir: &TempDir, name: &str, doc: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, doc).unwrap();
        path
    }

    #[tokio::test]
    async fn local_absolute_path_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, "spec.json", SPEC);
        let location = path.to_str().unwrap();
        let resolver =
            SpecResolver::new(MemoryStore::default().with(location, r#"{"dimensions":[],"metrics":[]}"#));

        assert_eq!(resolver.source_for(location), SpecSource::Local(path.clone()));
        let spec = resolver.load(location).await.unwrap();
        assert_eq!(spec.dimensions(), ["country"]);
    }

    #[tokio::test]
    async fn missing_local_path_falls_back_to_store() {
        let resolver =
            SpecResolver::new(MemoryStore::default().with("/specs/ads.json", SPEC));
        assert_eq!(
            resolver.source_for("/specs/ads.json"),
            SpecSource::Remote("/specs/ads.json".into())
        );
        let spec = resolver.load("/specs/ads.json").await.unwrap();
        assert_eq!(spec.metrics().len(), 1);
    }

    #[tokio::test]
    async fn relative_path_under_local_root() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, "ads.json", SPEC);
        let resolver = SpecResolver::new(MemoryStore::default()).local_root(dir.path());

        assert_eq!(resolver.source_for("ads.json"), SpecSource::Local(path));
        assert_eq!(
            resolver.source_for("other.json"),
            SpecSource::Remote("other.json".into())
        );
        assert!(resolver.load("ads.json").await.is_ok());
    }

    #[tokio::test]
    async fn nowhere_is_not_found() {
        let resolver = SpecResolver::new(MemoryStore::default());
        let err = resolver.load("/no/such/spec.json").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { location, .. } if location == "/no/such/spec.json"));
    }

    #[tokio::test]
    async fn bad_document_is_malformed() {
        let resolver =
            SpecResolver::new(MemoryStore::default().with("bad.json", r#"{"dimensions":1}"#));
        assert!(matches!(
            resolver.load("bad.json").await,
            Err(ResolveError::Malformed {
                source: SpecError::Malformed(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn fusio_store_joins_locations_under_root() {
        let dir = TempDir::new().unwrap();
        write_spec(&dir, "wiki.json", SPEC);
        let root = Path::from_filesystem_path(dir.path()).unwrap();
        let store = FusioStore::new(Arc::new(LocalFs {})).root(root);

        let bytes = store.read_spec("wiki.json").await.unwrap();
        assert_eq!(bytes, SPEC.as_bytes());
        let bytes = store.read_spec("/wiki.json").await.unwrap();
        assert_eq!(bytes, SPEC.as_bytes());
        assert!(store.read_spec("missing.json").await.is_err());
    }
}
