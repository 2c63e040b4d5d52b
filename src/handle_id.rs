//! Asset identity: deterministic path ids and random typed uids.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use rustc_hash::FxHasher;

/// Deterministic id derived from a canonical asset path.
///
/// Equal paths always hash to equal ids; the hasher is unseeded, so ids are
/// stable across processes as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetPathId(pub(crate) u64);

impl AssetPathId {
    /// Hash a canonical path into its id
    pub fn from_path(path: &Path) -> Self {
        let mut hasher = FxHasher::default();
        path.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Raw id value
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl From<&Path> for AssetPathId {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

/// Identity of an asset: either a path hash or a random typed uid.
///
/// The two variants never compare equal to each other, and both derive their
/// hash from the full variant contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleId {
    /// Deterministic hash of a canonical path
    Path(AssetPathId),
    /// Random 64-bit id tagged with the static type it was minted for
    Uid {
        /// Random discriminant
        id: u64,
        /// `TypeId` of the asset type this uid was created for
        type_id: TypeId,
    },
}

impl HandleId {
    /// Deterministic id for a canonical path
    pub fn from_path(path: &Path) -> Self {
        HandleId::Path(AssetPathId::from_path(path))
    }

    /// Random uid carrying `T`'s type tag, so later typed conversions are
    /// self-contained checks
    pub fn random<T: 'static>() -> Self {
        HandleId::Uid {
            id: rand::random::<u64>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Whether this id was derived from a path
    pub fn is_path(&self) -> bool {
        matches!(self, HandleId::Path(_))
    }
}

impl From<AssetPathId> for HandleId {
    fn from(path_id: AssetPathId) -> Self {
        HandleId::Path(path_id)
    }
}

impl From<&Path> for HandleId {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleId::Path(path_id) => write!(f, "HandleId::Path({})", path_id.0),
            HandleId::Uid { id, type_id } => {
                write!(f, "HandleId::Uid(id: {id}, type_id: {type_id:?})")
            }
        }
    }
}
