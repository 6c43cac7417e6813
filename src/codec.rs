//! Registry of serializers for complex metric types.
//!
//! Complex metrics (sketches, HyperLogLog collectors, ...) are opaque to the
//! projector. Each type identifier maps to a [`ComplexCodec`] that turns the
//! reader's in-memory object into bytes. The registry is populated once at
//! startup and then shared read-only.

use std::{any::Any, collections::HashMap, fmt, marker::PhantomData, sync::Arc};

use thiserror::Error;

/// Error raised by a codec while encoding a value.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value handed to the codec is not of the type it encodes.
    #[error("unexpected value for codec, expected {expected}")]
    UnexpectedValue {
        /// Rust type name the codec expects.
        expected: &'static str,
    },
    /// The codec failed to encode a value of the right type.
    #[error("encode failed: {0}")]
    Encode(String),
}

/// No codec is registered for a complex metric type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to find complex metric codec for {type_name}")]
pub struct MissingCodecError {
    /// The unregistered type identifier.
    pub type_name: String,
}

/// Serializer for one complex metric type.
pub trait ComplexCodec: Send + Sync {
    /// Encode `value` to its byte representation.
    fn to_bytes(&self, value: &(dyn Any + Send + Sync)) -> Result<Vec<u8>, CodecError>;
}

/// Codec built from a closure over a concrete value type.
pub struct FnCodec<T, F> {
    encode: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> FnCodec<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<Vec<u8>, CodecError> + Send + Sync,
{
    /// Wrap `encode` as a codec for values of type `T`.
    pub fn new(encode: F) -> Self {
        Self {
            encode,
            _marker: PhantomData,
        }
    }
}

impl<T, F> ComplexCodec for FnCodec<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<Vec<u8>, CodecError> + Send + Sync,
{
    fn to_bytes(&self, value: &(dyn Any + Send + Sync)) -> Result<Vec<u8>, CodecError> {
        let value = value
            .downcast_ref::<T>()
            .ok_or(CodecError::UnexpectedValue {
                expected: std::any::type_name::<T>(),
            })?;
        (self.encode)(value)
    }
}

/// Lookup table from complex type identifier to codec.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn ComplexCodec>>,
}

impl CodecRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for `type_name`, returning the codec it replaces.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        codec: Arc<dyn ComplexCodec>,
    ) -> Option<Arc<dyn ComplexCodec>> {
        self.codecs.insert(type_name.into(), codec)
    }

    /// Register a closure encoding values of type `T`.
    pub fn register_fn<T, F>(&mut self, type_name: impl Into<String>, encode: F)
    where
        T: Any,
        F: Fn(&T) -> Result<Vec<u8>, CodecError> + Send + Sync + 'static,
    {
        self.register(type_name, Arc::new(FnCodec::new(encode)));
    }

    /// Builder-style [`CodecRegistry::register`].
    pub fn with(mut self, type_name: impl Into<String>, codec: Arc<dyn ComplexCodec>) -> Self {
        self.register(type_name, codec);
        self
    }

    /// Codec registered under exactly `type_name`.
    pub fn lookup(&self, type_name: &str) -> Result<&dyn ComplexCodec, MissingCodecError> {
        self.codecs
            .get(type_name)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| MissingCodecError {
                type_name: type_name.to_string(),
            })
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.codecs.keys().collect();
        types.sort();
        f.debug_struct("CodecRegistry").field("types", &types).finish()
    }
}
