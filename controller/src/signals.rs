//! Observer lists for motor notifications.
//!
//! The motor's found-ground and collided signals fire synchronously inside
//! its move resolution, so they cannot go through buffered messages. A
//! subscriber holds the returned handle and releases it on teardown; a
//! released callback never fires again.

/// Handle for one registered observer, used to release it later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T) + Send + Sync>;

/// A list of observers notified synchronously on `emit`.
pub struct SignalHub<T> {
    next_id: u64,
    observers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for SignalHub<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
        }
    }
}

impl<T> SignalHub<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` and return the handle that releases it.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&T) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Release a subscription. Returns false when the handle is unknown
    /// (already released); safe to call twice.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub_id, _)| *sub_id != id);
        self.observers.len() != before
    }

    /// Notify every active observer, in subscription order.
    pub fn emit(&mut self, value: &T) {
        for (_, callback) in self.observers.iter_mut() {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscribe_and_emit() {
        let mut hub: SignalHub<i32> = SignalHub::new();
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        hub.subscribe(move |value: &i32| {
            seen.fetch_add(*value as u32, Ordering::Relaxed);
        });

        hub.emit(&2);
        hub.emit(&3);
        assert_eq!(count.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_unsubscribe_stops_callbacks() {
        let mut hub: SignalHub<()> = SignalHub::new();
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let id = hub.subscribe(move |_: &()| {
            seen.fetch_add(1, Ordering::Relaxed);
        });

        hub.emit(&());
        assert!(hub.unsubscribe(id));
        hub.emit(&());
        assert_eq!(count.load(Ordering::Relaxed), 1);

        // Releasing twice is a no-op
        assert!(!hub.unsubscribe(id));
    }

    #[test]
    fn test_handles_are_distinct() {
        let mut hub: SignalHub<()> = SignalHub::new();
        let a = hub.subscribe(|_: &()| {});
        let b = hub.subscribe(|_: &()| {});
        assert_ne!(a, b);
        assert_eq!(hub.len(), 2);

        hub.unsubscribe(a);
        assert_eq!(hub.len(), 1);
        assert!(!hub.is_empty());
    }
}
