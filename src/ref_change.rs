//! Reference-count change messages.
//!
//! Handle construction and destruction may happen on any thread, including
//! during unwinding, so they never touch the shared count table directly.
//! They push [`RefChange`] messages onto a lock-free MPMC channel instead;
//! the server drains the channel from a single consumer once per tick.

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::handle_id::HandleId;

/// A single reference-count mutation for one asset id
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefChange {
    /// A strong handle was created
    Increment(HandleId),
    /// A strong handle was dropped
    Decrement(HandleId),
}

impl RefChange {
    /// The id this change applies to
    pub fn id(&self) -> HandleId {
        match self {
            RefChange::Increment(id) => *id,
            RefChange::Decrement(id) => *id,
        }
    }
}

/// Unbounded MPMC channel carrying [`RefChange`] messages
pub struct RefChangeChannel {
    pub sender: Sender<RefChange>,
    pub receiver: Receiver<RefChange>,
}

impl RefChangeChannel {
    /// Create a new channel pair
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl Default for RefChangeChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_channel_preserves_order() {
        let channel = RefChangeChannel::new();
        let id = HandleId::from_path(Path::new("a.png"));

        channel.sender.send(RefChange::Increment(id)).unwrap();
        channel.sender.send(RefChange::Decrement(id)).unwrap();

        assert_eq!(channel.receiver.try_recv(), Ok(RefChange::Increment(id)));
        assert_eq!(channel.receiver.try_recv(), Ok(RefChange::Decrement(id)));
        assert!(channel.receiver.try_recv().is_err());
    }

    #[test]
    fn test_senders_clone_across_threads() {
        let channel = RefChangeChannel::new();
        let id = HandleId::from_path(Path::new("b.png"));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sender = channel.sender.clone();
                std::thread::spawn(move || sender.send(RefChange::Increment(id)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(channel.receiver.try_iter().count(), 4);
    }
}
