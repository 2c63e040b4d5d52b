//! Asset server orchestration: loader registry, per-path load tracking,
//! per-type staging and free lists, refcount reconciliation, and task
//! submission.
//!
//! Host-tick contract: call [`AssetServer::update_asset_ref_count`] once,
//! then [`AssetServer::update_assets`] once per registered type, in that
//! order, every tick, before anything reads the [`Assets`] maps.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{error, warn};

use crate::assets::Assets;
use crate::error::{AssetServerError, Result};
use crate::handle::{Handle, UntypedHandle};
use crate::handle_id::{AssetPathId, HandleId};
use crate::io::{AssetIo, AssetServerSettings, FileAssetIo};
use crate::loader::AssetLoader;
use crate::ref_change::{RefChange, RefChangeChannel};
use crate::task_pool::TaskPool;
use crate::Asset;

/// Progressive state of a path-based load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No load has been requested, or the id is a uid
    #[default]
    NotLoaded,
    /// A load attempt is in flight
    Loading,
    /// The latest load attempt committed its result
    Loaded,
    /// The latest load attempt failed; permanent until a new attempt
    Failed,
}

/// Bookkeeping for one asset path
#[derive(Debug)]
pub struct AssetInfo {
    /// The path this entry tracks
    pub path: PathBuf,
    /// Current load state
    pub load_state: LoadState,
    /// Type tag of the decoded value, known once a load commits
    pub type_id: Option<TypeId>,
    /// Bumped once per new load attempt; gates which in-flight result may
    /// commit
    pub version: u64,
}

/// A decoded value parked until the owning type's next tick drain
struct StagedAsset {
    value: Box<dyn Any + Send + Sync>,
    path_id: AssetPathId,
}

struct AssetServerInternal {
    task_pool: TaskPool,
    io: Arc<dyn AssetIo>,
    channel: RefChangeChannel,
    ref_counts: RwLock<AHashMap<HandleId, usize>>,
    loaders: RwLock<Vec<Arc<dyn AssetLoader>>>,
    extension_to_loader: RwLock<AHashMap<String, usize>>,
    asset_info: RwLock<AHashMap<AssetPathId, AssetInfo>>,
    staged_assets: RwLock<AHashMap<TypeId, Vec<StagedAsset>>>,
    assets_to_free: RwLock<AHashMap<TypeId, Vec<HandleId>>>,
}

/// Orchestrates asset loading and reclamation.
///
/// Cheap to clone; all clones share state. Each internal table sits behind
/// its own lock, so loads of distinct paths never block each other, and no
/// lock is ever held across IO or decode work.
#[derive(Clone)]
pub struct AssetServer {
    internal: Arc<AssetServerInternal>,
}

impl AssetServer {
    /// Create a server over the given byte backend and task pool
    pub fn new(io: impl AssetIo + 'static, task_pool: TaskPool) -> Self {
        Self {
            internal: Arc::new(AssetServerInternal {
                task_pool,
                io: Arc::new(io),
                channel: RefChangeChannel::new(),
                ref_counts: RwLock::new(AHashMap::new()),
                loaders: RwLock::new(Vec::new()),
                extension_to_loader: RwLock::new(AHashMap::new()),
                asset_info: RwLock::new(AHashMap::new()),
                staged_assets: RwLock::new(AHashMap::new()),
                assets_to_free: RwLock::new(AHashMap::new()),
            }),
        }
    }

    /// Create a server with a [`FileAssetIo`] rooted at the configured
    /// asset folder
    pub fn from_settings(settings: &AssetServerSettings) -> Self {
        Self::new(FileAssetIo::new(&settings.asset_folder), TaskPool::new())
    }

    /// The byte-loading backend
    pub fn io(&self) -> &Arc<dyn AssetIo> {
        &self.internal.io
    }

    /// Mint a strong typed handle for `id`
    pub fn get_handle<T: Asset>(&self, id: impl Into<HandleId>) -> Handle<T> {
        Handle::strong(id.into(), self.internal.channel.sender.clone())
    }

    /// Mint a strong untyped handle for `id`
    pub fn get_untyped_handle(&self, id: impl Into<HandleId>) -> UntypedHandle {
        UntypedHandle::strong(id.into(), self.internal.channel.sender.clone())
    }

    /// Register `T` for storage and return its [`Assets`] map.
    ///
    /// Must run once per type before any load of that type; the returned map
    /// is seeded with the refchange sender so handles it mints are strong.
    pub fn register_asset_type<T: Asset>(&self) -> Assets<T> {
        self.internal
            .staged_assets
            .write()
            .entry(TypeId::of::<T>())
            .or_default();
        Assets::new(self.internal.channel.sender.clone())
    }

    /// Register a loader. Extensions already claimed by an earlier loader
    /// are silently re-pointed at this one (last wins).
    pub fn add_asset_loader<L: AssetLoader + 'static>(&self, loader: L) {
        let mut loaders = self.internal.loaders.write();
        let mut extensions = self.internal.extension_to_loader.write();

        let index = loaders.len();
        for extension in loader.extensions() {
            extensions.insert(extension.to_string(), index);
        }
        loaders.push(Arc::new(loader));
    }

    /// Look up the loader registered for an exact extension
    pub fn get_asset_loader_from_extension(&self, extension: &str) -> Option<Arc<dyn AssetLoader>> {
        let index = *self.internal.extension_to_loader.read().get(extension)?;
        self.internal.loaders.read().get(index).cloned()
    }

    /// Resolve a loader from a path's file name, trying progressively
    /// shorter suffixes: `a.tar.gz` probes `tar.gz`, then `gz`.
    pub fn get_asset_loader_from_path(&self, path: &Path) -> Option<Arc<dyn AssetLoader>> {
        // Own the name up front; the probe then works on plain slices.
        let file_name = path.file_name()?.to_string_lossy().into_owned();

        let mut remainder = file_name.as_str();
        while let Some(dot) = remainder.find('.') {
            remainder = &remainder[dot + 1..];
            if let Some(loader) = self.get_asset_loader_from_extension(remainder) {
                return Some(loader);
            }
        }
        None
    }

    /// Load state of a path id; uid ids always report `NotLoaded`
    pub fn get_load_state(&self, handle: impl Into<HandleId>) -> LoadState {
        match handle.into() {
            HandleId::Path(path_id) => self
                .internal
                .asset_info
                .read()
                .get(&path_id)
                .map(|info| info.load_state)
                .unwrap_or(LoadState::NotLoaded),
            // Uid-created assets carry no progressive load state.
            HandleId::Uid { .. } => LoadState::NotLoaded,
        }
    }

    /// Load a path on the calling thread, blocking for the IO + decode
    /// duration.
    ///
    /// The first caller for a path claims its [`AssetInfo`] entry and runs
    /// the load; concurrent duplicates coalesce at admission and return the
    /// shared path id immediately. A result whose version was superseded by
    /// a newer attempt is discarded silently (no error, no storage
    /// mutation).
    pub fn load_sync(&self, path: impl AsRef<Path>) -> Result<AssetPathId> {
        let path = path.as_ref();
        let loader = self
            .get_asset_loader_from_path(path)
            .ok_or(AssetServerError::MissingAssetLoader)?;

        let path_id = AssetPathId::from_path(path);

        // Claim the path entry. Whoever inserts runs the load; everyone
        // else returns the id and polls load state.
        let version = {
            let mut asset_info = self.internal.asset_info.write();
            match asset_info.entry(path_id) {
                Entry::Occupied(_) => return Ok(path_id),
                Entry::Vacant(vacant) => {
                    let info = vacant.insert(AssetInfo {
                        path: path.to_path_buf(),
                        load_state: LoadState::Loading,
                        type_id: None,
                        version: 1,
                    });
                    info.version
                }
            }
        };

        let set_failed = || {
            let mut asset_info = self.internal.asset_info.write();
            if let Some(info) = asset_info.get_mut(&path_id) {
                info.load_state = LoadState::Failed;
            }
        };

        // No lock is held from here until commit.
        let fetch = self.internal.io.load_path(path);
        let bytes = match fetch() {
            Ok(bytes) => bytes,
            Err(err) => {
                set_failed();
                return Err(AssetServerError::AssetIoError(err));
            }
        };

        let loaded = match loader.load(path, &bytes) {
            Some(loaded) => loaded,
            None => {
                set_failed();
                return Err(AssetServerError::AssetLoaderError);
            }
        };
        let (value, type_id) = loaded.into_parts();

        // Commit, fenced on the version captured at claim time.
        {
            let mut asset_info = self.internal.asset_info.write();
            let info = match asset_info.get_mut(&path_id) {
                Some(info) => info,
                None => return Ok(path_id),
            };
            if info.version != version {
                // A newer attempt superseded this result; drop it.
                return Ok(path_id);
            }
            info.type_id = Some(type_id);
            info.load_state = LoadState::Loaded;
        }

        self.internal
            .staged_assets
            .write()
            .entry(type_id)
            .or_default()
            .push(StagedAsset { value, path_id });

        Ok(path_id)
    }

    /// Submit a load to the task pool and return the id before completion.
    /// Errors are logged, never surfaced; poll [`get_load_state`] to observe
    /// `Failed`.
    ///
    /// [`get_load_state`]: AssetServer::get_load_state
    pub fn load_untracked(&self, path: impl AsRef<Path>) -> HandleId {
        let path = path.as_ref().to_path_buf();
        let id = HandleId::from_path(&path);

        let server = self.clone();
        self.internal.task_pool.execute(move || {
            if let Err(err) = server.load_sync(&path) {
                error!(path = %path.display(), error = %err, "failed to load asset");
            }
        });

        id
    }

    /// Fire-and-forget load returning a strong untyped handle
    pub fn load_untyped(&self, path: impl AsRef<Path>) -> UntypedHandle {
        let id = self.load_untracked(path);
        self.get_untyped_handle(id)
    }

    /// Fire-and-forget load returning a strong typed handle
    pub fn load<T: Asset>(&self, path: impl AsRef<Path>) -> Handle<T> {
        let id = self.load_untracked(path);
        self.get_handle(id)
    }

    /// Recursively load everything under `dir` that has a matching loader.
    /// Files without one are skipped; backend failures abort the walk.
    pub fn load_folder(&self, dir: impl AsRef<Path>) -> Result<Vec<UntypedHandle>> {
        self.load_folder_inner(dir.as_ref())
    }

    fn load_folder_inner(&self, dir: &Path) -> Result<Vec<UntypedHandle>> {
        if !self.internal.io.is_directory(dir) {
            return Err(AssetServerError::AssetFolderNotADirectory);
        }

        let mut handles = Vec::new();
        for entry in self.internal.io.read_directory(dir)? {
            if self.internal.io.is_directory(&entry) {
                handles.extend(self.load_folder_inner(&entry)?);
            } else {
                if self.get_asset_loader_from_path(&entry).is_none() {
                    continue;
                }
                handles.push(self.load_untyped(&entry));
            }
        }

        Ok(handles)
    }

    /// Reconciliation pass: drain the refchange channel to exhaustion and
    /// queue ids whose count reached zero on their owning type's free list.
    ///
    /// Single-consumer by contract: run once per tick from the host, before
    /// any [`update_assets`] call, never concurrently with itself.
    ///
    /// [`update_assets`]: AssetServer::update_assets
    pub fn update_asset_ref_count(&self) {
        let mut potential_frees: SmallVec<[HandleId; 8]> = SmallVec::new();

        {
            let mut ref_counts = self.internal.ref_counts.write();
            for change in self.internal.channel.receiver.try_iter() {
                match change {
                    RefChange::Increment(id) => {
                        *ref_counts.entry(id).or_insert(0) += 1;
                    }
                    RefChange::Decrement(id) => {
                        // An id whose Increment was never applied counts as
                        // one, so the Decrement frees it right away.
                        let count = ref_counts.entry(id).or_insert(1);
                        *count -= 1;
                        if *count == 0 {
                            ref_counts.remove(&id);
                            potential_frees.push(id);
                        }
                    }
                }
            }
        }

        if potential_frees.is_empty() {
            return;
        }

        let mut assets_to_free = self.internal.assets_to_free.write();
        let mut asset_info = self.internal.asset_info.write();

        for id in potential_frees {
            // Resolve the owning type: path ids via their info entry (which
            // dies with the last handle), uids via the inline tag.
            let type_id = match id {
                HandleId::Path(path_id) => {
                    asset_info.remove(&path_id).and_then(|info| info.type_id)
                }
                HandleId::Uid { type_id, .. } => Some(type_id),
            };

            if let Some(type_id) = type_id {
                assets_to_free.entry(type_id).or_default().push(id);
            }
        }
    }

    /// Drain `T`'s staging buffer into `assets` (Created/Modified events),
    /// then its free list (Removed events). Run once per tick per
    /// registered type, after [`update_asset_ref_count`].
    ///
    /// [`update_asset_ref_count`]: AssetServer::update_asset_ref_count
    pub fn update_assets<T: Asset>(&self, assets: &mut Assets<T>) {
        let staged = {
            let mut staged_assets = self.internal.staged_assets.write();
            staged_assets
                .get_mut(&TypeId::of::<T>())
                .map(std::mem::take)
                .unwrap_or_default()
        };

        for staged in staged {
            match staged.value.downcast::<T>() {
                Ok(value) => assets.set_asset(HandleId::Path(staged.path_id), *value),
                // Staging vectors are keyed by TypeId; this cannot happen.
                Err(_) => warn!(path_id = staged.path_id.id(), "staged asset has wrong type"),
            }
        }

        // Cheap read-only check before taking the write lock.
        {
            let assets_to_free = self.internal.assets_to_free.read();
            match assets_to_free.get(&TypeId::of::<T>()) {
                None => return,
                Some(ids) if ids.is_empty() => return,
                Some(_) => {}
            }
        }

        let ids = {
            let mut assets_to_free = self.internal.assets_to_free.write();
            assets_to_free
                .get_mut(&TypeId::of::<T>())
                .map(std::mem::take)
                .unwrap_or_default()
        };

        for id in ids {
            assets.remove_asset(id);
        }
    }
}
