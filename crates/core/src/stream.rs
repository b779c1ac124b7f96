//! Push-based event streams.
//!
//! Producers own a [`Notifier`] endpoint; consumers register callbacks that
//! run on the producer's thread at publish time. This is the subscription
//! model connecting block-commit events to the ordering gate, the ordering
//! gate to the proposal gate, and agreement outcomes back to the pipeline.

use parking_lot::Mutex;
use std::sync::Arc;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A multi-subscriber notification endpoint.
///
/// Callbacks are invoked synchronously, in subscription order, on the thread
/// that calls [`notify`](Notifier::notify). Subscriptions live as long as the
/// notifier; a consumer that may be dropped first should capture a [`Weak`]
/// handle to itself and no-op once the upgrade fails.
///
/// The subscriber list is snapshotted before invocation, so a callback may
/// itself subscribe without deadlocking.
///
/// [`Weak`]: std::sync::Weak
pub struct Notifier<T> {
    subscribers: Mutex<Vec<Callback<T>>>,
}

impl<T> Notifier<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback for every subsequent [`notify`](Notifier::notify).
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.lock().push(Arc::new(callback));
    }

    /// Deliver `value` to every subscriber.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self.subscribers.lock().clone();
        for callback in snapshot {
            callback(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivers_to_all_subscribers() {
        let notifier = Notifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            notifier.subscribe(move |value: &u32| seen.lock().push((tag, *value)));
        }

        notifier.notify(&7);
        assert_eq!(*seen.lock(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_subscribe_during_notify_does_not_deadlock() {
        let notifier = Arc::new(Notifier::<u32>::new());
        let inner = Arc::clone(&notifier);
        notifier.subscribe(move |_| inner.subscribe(|_| {}));

        notifier.notify(&1);
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn test_no_subscribers_is_a_no_op() {
        Notifier::new().notify(&0u8);
    }
}
