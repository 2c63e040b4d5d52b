//! Decoder contract and the type-erased value it produces.

use std::any::{Any, TypeId};
use std::path::Path;

use crate::Asset;

/// A freshly decoded asset, type-erased for transport through the staging
/// buffer. Consumed exactly once by the matching type's tick drain.
pub struct LoadedAsset {
    value: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl LoadedAsset {
    /// Box a decoded value together with its runtime type tag
    pub fn new<T: Asset>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Runtime tag of the boxed value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Checked downcast back to the concrete type, consuming the box
    pub fn take<T: Asset>(self) -> Option<T> {
        self.value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub(crate) fn into_parts(self) -> (Box<dyn Any + Send + Sync>, TypeId) {
        (self.value, self.type_id)
    }
}

/// Format-specific decoder, selected by file extension.
///
/// Loaders are external collaborators: the server only asks which lowercase
/// extensions a loader claims and hands it raw bytes to decode. Returning
/// `None` means the bytes could not be decoded; loaders must not panic on
/// malformed input.
pub trait AssetLoader: Send + Sync {
    /// Lowercase extensions this loader claims, without leading dots.
    /// Compound suffixes like `"tar.gz"` are allowed.
    fn extensions(&self) -> &[&str];

    /// Decode `bytes` read from `path` into an asset, or `None` on failure
    fn load(&self, path: &Path, bytes: &[u8]) -> Option<LoadedAsset>;
}
