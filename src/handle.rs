//! Typed and untyped asset handles.
//!
//! A *strong* handle owns a keep-alive claim on its asset: constructing one
//! enqueues an `Increment` and dropping one enqueues exactly one `Decrement`.
//! A *weak* handle is a plain alias and never touches the channel. Handles
//! are move-only; duplicating a claim is explicit via [`Handle::copy`].

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crossbeam::channel::Sender;

use crate::error::AssetServerError;
use crate::handle_id::HandleId;
use crate::ref_change::RefChange;
use crate::Asset;

/// Typed reference to an asset's identity
pub struct Handle<T: Asset> {
    id: HandleId,
    sender: Option<Sender<RefChange>>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Asset> Handle<T> {
    /// Create a non-owning alias for `id`
    pub fn weak(id: HandleId) -> Self {
        Self {
            id,
            sender: None,
            _phantom: PhantomData,
        }
    }

    /// Create an owning handle; enqueues one `Increment` immediately
    pub fn strong(id: HandleId, sender: Sender<RefChange>) -> Self {
        let _ = sender.send(RefChange::Increment(id));
        Self {
            id,
            sender: Some(sender),
            _phantom: PhantomData,
        }
    }

    /// The identity this handle refers to
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Whether this handle owns a keep-alive claim
    pub fn is_strong(&self) -> bool {
        self.sender.is_some()
    }

    /// Whether this handle is a plain alias
    pub fn is_weak(&self) -> bool {
        self.sender.is_none()
    }

    /// Duplicate this handle. A strong handle yields another strong handle
    /// (enqueueing another `Increment`); a weak one yields another alias.
    pub fn copy(&self) -> Self {
        match &self.sender {
            Some(sender) => Self::strong(self.id, sender.clone()),
            None => Self::weak(self.id),
        }
    }

    /// Duplicate as a non-owning alias, regardless of this handle's strength
    pub fn copy_weak(&self) -> Self {
        Self::weak(self.id)
    }

    /// Erase the static type, transferring the claim without any channel
    /// traffic
    pub fn untyped(mut self) -> UntypedHandle {
        UntypedHandle {
            id: self.id,
            sender: self.sender.take(),
        }
    }

    /// Weak, type-erased alias of this handle
    pub fn copy_weak_untyped(&self) -> UntypedHandle {
        UntypedHandle {
            id: self.id,
            sender: None,
        }
    }
}

impl<T: Asset> Drop for Handle<T> {
    fn drop(&mut self) {
        if let Some(sender) = &self.sender {
            // The server may already be gone during shutdown.
            let _ = sender.send(RefChange::Decrement(self.id));
        }
    }
}

impl<T: Asset> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("strong", &self.is_strong())
            .finish()
    }
}

impl<T: Asset> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: Asset> Eq for Handle<T> {}

impl<T: Asset> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: Asset> From<&Handle<T>> for HandleId {
    fn from(handle: &Handle<T>) -> Self {
        handle.id
    }
}

/// Type-erased asset handle
pub struct UntypedHandle {
    id: HandleId,
    sender: Option<Sender<RefChange>>,
}

impl UntypedHandle {
    /// Create a non-owning alias for `id`
    pub fn weak(id: HandleId) -> Self {
        Self { id, sender: None }
    }

    /// Create an owning handle; enqueues one `Increment` immediately
    pub fn strong(id: HandleId, sender: Sender<RefChange>) -> Self {
        let _ = sender.send(RefChange::Increment(id));
        Self {
            id,
            sender: Some(sender),
        }
    }

    /// The identity this handle refers to
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Whether this handle owns a keep-alive claim
    pub fn is_strong(&self) -> bool {
        self.sender.is_some()
    }

    /// Whether this handle is a plain alias
    pub fn is_weak(&self) -> bool {
        self.sender.is_none()
    }

    /// Duplicate this handle, strength included
    pub fn copy(&self) -> Self {
        match &self.sender {
            Some(sender) => Self::strong(self.id, sender.clone()),
            None => Self::weak(self.id),
        }
    }

    /// Duplicate as a non-owning alias
    pub fn copy_weak(&self) -> Self {
        Self::weak(self.id)
    }

    /// Recover the static type.
    ///
    /// Fails with [`AssetServerError::IncorrectHandleType`] when a uid's
    /// embedded type tag disagrees with `T`; path ids carry no tag and always
    /// convert. On success the claim transfers without any channel traffic;
    /// on failure the consumed handle releases its claim as usual.
    pub fn typed<T: Asset>(mut self) -> Result<Handle<T>, AssetServerError> {
        if let HandleId::Uid { type_id, .. } = self.id {
            if type_id != TypeId::of::<T>() {
                return Err(AssetServerError::IncorrectHandleType);
            }
        }

        Ok(Handle {
            id: self.id,
            sender: self.sender.take(),
            _phantom: PhantomData,
        })
    }
}

impl Drop for UntypedHandle {
    fn drop(&mut self) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(RefChange::Decrement(self.id));
        }
    }
}

impl fmt::Debug for UntypedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UntypedHandle")
            .field("id", &self.id)
            .field("strong", &self.is_strong())
            .finish()
    }
}

impl PartialEq for UntypedHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UntypedHandle {}

impl Hash for UntypedHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&UntypedHandle> for HandleId {
    fn from(handle: &UntypedHandle) -> Self {
        handle.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ref_change::RefChangeChannel;
    use std::path::Path;

    fn drain(channel: &RefChangeChannel) -> Vec<RefChange> {
        channel.receiver.try_iter().collect()
    }

    #[test]
    fn test_strong_handle_increments_then_decrements() {
        let channel = RefChangeChannel::new();
        let id = HandleId::from_path(Path::new("a.png"));

        let handle: Handle<String> = Handle::strong(id, channel.sender.clone());
        assert_eq!(drain(&channel), vec![RefChange::Increment(id)]);

        drop(handle);
        assert_eq!(drain(&channel), vec![RefChange::Decrement(id)]);
    }

    #[test]
    fn test_weak_handle_is_silent() {
        let channel = RefChangeChannel::new();
        let id = HandleId::from_path(Path::new("a.png"));

        let handle: Handle<String> = Handle::weak(id);
        assert!(handle.is_weak());
        drop(handle);
        assert!(drain(&channel).is_empty());
    }

    #[test]
    fn test_copy_sends_another_increment() {
        let channel = RefChangeChannel::new();
        let id = HandleId::from_path(Path::new("a.png"));

        let handle: Handle<String> = Handle::strong(id, channel.sender.clone());
        let copy = handle.copy();
        drop(handle);
        drop(copy);

        let changes = drain(&channel);
        let incs = changes
            .iter()
            .filter(|c| matches!(c, RefChange::Increment(_)))
            .count();
        let decs = changes
            .iter()
            .filter(|c| matches!(c, RefChange::Decrement(_)))
            .count();
        assert_eq!((incs, decs), (2, 2));
    }

    #[test]
    fn test_copy_weak_of_strong_is_silent_on_drop() {
        let channel = RefChangeChannel::new();
        let id = HandleId::from_path(Path::new("a.png"));

        let handle: Handle<String> = Handle::strong(id, channel.sender.clone());
        let weak = handle.copy_weak();
        assert!(weak.is_weak());

        let _ = drain(&channel);
        drop(weak);
        assert!(drain(&channel).is_empty());
        drop(handle);
    }

    #[test]
    fn test_typed_untyped_round_trip_balances_channel() {
        let channel = RefChangeChannel::new();
        let id = HandleId::random::<String>();

        let untyped = UntypedHandle::strong(id, channel.sender.clone());
        let typed: Handle<String> = untyped.typed().unwrap();
        let untyped = typed.untyped();
        drop(untyped);

        // One increment at construction, one decrement at the end. The
        // conversions themselves transfer the claim silently.
        assert_eq!(
            drain(&channel),
            vec![RefChange::Increment(id), RefChange::Decrement(id)]
        );
    }

    #[test]
    fn test_typed_rejects_mismatched_uid() {
        let channel = RefChangeChannel::new();
        let id = HandleId::random::<String>();

        let untyped = UntypedHandle::strong(id, channel.sender.clone());
        let result = untyped.typed::<u32>();
        assert!(matches!(result, Err(AssetServerError::IncorrectHandleType)));

        // The failed conversion consumed the handle and released its claim.
        let changes = drain(&channel);
        assert_eq!(
            changes,
            vec![RefChange::Increment(id), RefChange::Decrement(id)]
        );
    }

    #[test]
    fn test_typed_accepts_path_ids() {
        let id = HandleId::from_path(Path::new("a.png"));
        let untyped = UntypedHandle::weak(id);
        assert!(untyped.typed::<u32>().is_ok());
    }
}
