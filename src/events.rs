//! Event sink drained by the host once per tick.

use std::collections::VecDeque;

/// Queue of pending events for deferred processing
pub struct Events<T> {
    events: VecDeque<T>,
}

impl<T> Events<T> {
    /// Create an empty sink
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Queue a single event
    pub fn send(&mut self, event: T) {
        self.events.push_back(event);
    }

    /// Queue a batch of events in order
    pub fn send_batch(&mut self, events: impl IntoIterator<Item = T>) {
        self.events.extend(events);
    }

    /// Remove and return all pending events in order
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether anything is pending
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discard all pending events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<T> Default for Events<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_batch_preserves_order() {
        let mut events = Events::new();
        events.send(1);
        events.send_batch([2, 3]);
        assert_eq!(events.len(), 3);
        assert_eq!(events.drain().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(events.is_empty());
    }
}
