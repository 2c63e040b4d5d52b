//! Typed asset storage with change events.

use std::fmt;

use ahash::AHashMap;
use crossbeam::channel::Sender;

use crate::events::Events;
use crate::handle::Handle;
use crate::handle_id::HandleId;
use crate::ref_change::RefChange;
use crate::Asset;

/// Change notification for one asset of type `T`.
///
/// Events carry weak handles; observing a change must not extend the asset's
/// lifetime.
pub enum AssetEvent<T: Asset> {
    /// A new id was inserted
    Created {
        /// Weak alias of the created asset
        handle: Handle<T>,
    },
    /// An existing id was overwritten or mutably borrowed
    Modified {
        /// Weak alias of the modified asset
        handle: Handle<T>,
    },
    /// An id was removed
    Removed {
        /// Weak alias of the removed asset
        handle: Handle<T>,
    },
}

impl<T: Asset> AssetEvent<T> {
    /// The handle this event refers to
    pub fn handle(&self) -> &Handle<T> {
        match self {
            AssetEvent::Created { handle } => handle,
            AssetEvent::Modified { handle } => handle,
            AssetEvent::Removed { handle } => handle,
        }
    }
}

impl<T: Asset> fmt::Debug for AssetEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetEvent::Created { .. } => "Created",
            AssetEvent::Modified { .. } => "Modified",
            AssetEvent::Removed { .. } => "Removed",
        };
        f.debug_struct(name).field("id", &self.handle().id()).finish()
    }
}

/// Typed map from [`HandleId`] to asset values.
///
/// Owns a clone of the refchange sender, so handles minted here default to
/// strong. Entries are created, updated, and removed only through the host's
/// per-tick [`AssetServer::update_assets`] drain or explicit calls here.
///
/// [`AssetServer::update_assets`]: crate::server::AssetServer::update_assets
pub struct Assets<T: Asset> {
    assets: AHashMap<HandleId, T>,
    events: Vec<AssetEvent<T>>,
    sender: Sender<RefChange>,
}

impl<T: Asset> Assets<T> {
    pub(crate) fn new(sender: Sender<RefChange>) -> Self {
        Self {
            assets: AHashMap::new(),
            events: Vec::new(),
            sender,
        }
    }

    /// Mint a strong handle for `id`
    pub fn get_handle(&self, id: impl Into<HandleId>) -> Handle<T> {
        Handle::strong(id.into(), self.sender.clone())
    }

    /// Insert a value under a fresh random uid and return a strong handle
    pub fn add_asset(&mut self, asset: T) -> Handle<T> {
        let id = HandleId::random::<T>();
        self.assets.insert(id, asset);
        self.events.push(AssetEvent::Created {
            handle: Handle::weak(id),
        });
        self.get_handle(id)
    }

    /// Insert or overwrite the value under `id`
    pub fn set_asset(&mut self, id: impl Into<HandleId>, asset: T) {
        let id = id.into();
        let previous = self.assets.insert(id, asset);
        let handle = Handle::weak(id);
        if previous.is_none() {
            self.events.push(AssetEvent::Created { handle });
        } else {
            self.events.push(AssetEvent::Modified { handle });
        }
    }

    /// Shared access to the value under `id`
    pub fn get_asset(&self, id: impl Into<HandleId>) -> Option<&T> {
        self.assets.get(&id.into())
    }

    /// Mutable access to the value under `id`; emits a `Modified` event
    pub fn get_mut_asset(&mut self, id: impl Into<HandleId>) -> Option<&mut T> {
        let id = id.into();
        if self.assets.contains_key(&id) {
            self.events.push(AssetEvent::Modified {
                handle: Handle::weak(id),
            });
        }
        self.assets.get_mut(&id)
    }

    /// Mutable access without an event, for callers that manage notification
    /// themselves
    pub fn get_mut_asset_untracked(&mut self, id: impl Into<HandleId>) -> Option<&mut T> {
        self.assets.get_mut(&id.into())
    }

    /// Remove and return the value under `id`; emits a `Removed` event
    pub fn remove_asset(&mut self, id: impl Into<HandleId>) -> Option<T> {
        let id = id.into();
        let removed = self.assets.remove(&id);
        if removed.is_some() {
            self.events.push(AssetEvent::Removed {
                handle: Handle::weak(id),
            });
        }
        removed
    }

    /// Whether a value exists under `id`
    pub fn contains_asset(&self, id: impl Into<HandleId>) -> bool {
        self.assets.contains_key(&id.into())
    }

    /// Iterate over all stored ids
    pub fn ids(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.assets.keys().copied()
    }

    /// Iterate over all id/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (HandleId, &T)> {
        self.assets.iter().map(|(id, asset)| (*id, asset))
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Drop all stored assets without events
    pub fn clear(&mut self) {
        self.assets.clear();
    }

    /// Reserve capacity for `additional` more assets
    pub fn reserve(&mut self, additional: usize) {
        self.assets.reserve(additional);
    }

    /// Move all pending events into the host's sink. Call exactly once per
    /// tick, after [`AssetServer::update_assets`].
    ///
    /// [`AssetServer::update_assets`]: crate::server::AssetServer::update_assets
    pub fn update_events(&mut self, events: &mut Events<AssetEvent<T>>) {
        events.send_batch(self.events.drain(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ref_change::RefChangeChannel;

    fn assets() -> (Assets<String>, RefChangeChannel) {
        let channel = RefChangeChannel::new();
        (Assets::new(channel.sender.clone()), channel)
    }

    #[test]
    fn test_add_asset_mints_strong_uid_handle() {
        let (mut assets, channel) = assets();
        let handle = assets.add_asset("stone".to_string());

        assert!(handle.is_strong());
        assert!(matches!(handle.id(), HandleId::Uid { .. }));
        assert_eq!(assets.get_asset(&handle), Some(&"stone".to_string()));
        assert_eq!(
            channel.receiver.try_recv(),
            Ok(RefChange::Increment(handle.id()))
        );
    }

    #[test]
    fn test_set_asset_created_then_modified() {
        let (mut assets, _channel) = assets();
        let id = HandleId::random::<String>();

        assets.set_asset(id, "a".to_string());
        assets.set_asset(id, "b".to_string());

        let mut sink = Events::new();
        assets.update_events(&mut sink);
        let events: Vec<_> = sink.drain().collect();
        assert!(matches!(events[0], AssetEvent::Created { .. }));
        assert!(matches!(events[1], AssetEvent::Modified { .. }));
    }

    #[test]
    fn test_get_mut_tracked_and_untracked() {
        let (mut assets, _channel) = assets();
        let id = HandleId::random::<String>();
        assets.set_asset(id, "a".to_string());

        let mut sink = Events::new();
        assets.update_events(&mut sink);
        sink.clear();

        assets.get_mut_asset_untracked(id).unwrap().push('x');
        assets.update_events(&mut sink);
        assert!(sink.is_empty());

        assets.get_mut_asset(id).unwrap().push('y');
        assets.update_events(&mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_remove_asset_emits_removed_once() {
        let (mut assets, _channel) = assets();
        let id = HandleId::random::<String>();
        assets.set_asset(id, "a".to_string());

        assert_eq!(assets.remove_asset(id), Some("a".to_string()));
        assert_eq!(assets.remove_asset(id), None);

        let mut sink = Events::new();
        assets.update_events(&mut sink);
        let events: Vec<_> = sink.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], AssetEvent::Removed { .. }));
    }
}
