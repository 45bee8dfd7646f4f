//! Fan-out of novel records to registered subscriber callbacks.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use crate::frame::DhcpRequestRecord;

type Callback = Arc<dyn Fn(&DhcpRequestRecord) + Send + Sync + 'static>;

/// Registry of subscriber callbacks for one capture session.
///
/// Registration and removal are safe to call from any thread, including
/// while a delivery is in flight. Each delivery reaches every callback
/// registered at the moment it starts; a subscriber added mid-delivery
/// first sees the following record.
#[derive(Default)]
pub struct Dispatcher {
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

impl Dispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a callback and returns the token that removes it again.
    pub fn register(
        self: &Arc<Self>,
        callback: impl Fn(&DhcpRequestRecord) + Send + Sync + 'static,
    ) -> SubscriberToken {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        SubscriberToken {
            id,
            dispatcher: Arc::downgrade(self),
        }
    }

    /// Invokes every currently registered callback with the record.
    ///
    /// A panicking callback is caught and logged; it cannot affect the
    /// remaining subscribers or the capture pipeline.
    pub fn deliver(&self, record: &DhcpRequestRecord) {
        let callbacks: Vec<Callback> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(record))).is_err() {
                tracing::warn!("Subscriber callback panicked while handling {record}");
            }
        }
    }

    fn unregister(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Number of currently registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.len()
    }
}

/// Removes its callback from the [`Dispatcher`] when cancelled.
///
/// Cancelling twice, or cancelling after the session has stopped, is a
/// no-op. Dropping the token without cancelling leaves the subscription
/// in place for the rest of the session.
pub struct SubscriberToken {
    id: u64,
    dispatcher: Weak<Dispatcher>,
}

impl SubscriberToken {
    pub fn cancel(&self) {
        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher.unregister(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MacAddr;

    fn record() -> DhcpRequestRecord {
        DhcpRequestRecord {
            mac_address: MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            ip_address: None,
            hostname: None,
        }
    }

    #[test]
    fn delivers_to_all_subscribers() {
        let dispatcher = Dispatcher::new();
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));

        let first_count = first.clone();
        let _a = dispatcher.register(move |_| *first_count.lock().unwrap() += 1);
        let second_count = second.clone();
        let _b = dispatcher.register(move |_| *second_count.lock().unwrap() += 1);

        dispatcher.deliver(&record());
        dispatcher.deliver(&record());

        assert_eq!(*first.lock().unwrap(), 2);
        assert_eq!(*second.lock().unwrap(), 2);
    }

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let dispatcher = Dispatcher::new();
        let delivered = Arc::new(Mutex::new(0));

        let count = delivered.clone();
        let _well_behaved = dispatcher.register(move |_| *count.lock().unwrap() += 1);
        let _failing = dispatcher.register(|_| panic!("subscriber bug"));

        dispatcher.deliver(&record());

        assert_eq!(*delivered.lock().unwrap(), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let dispatcher = Dispatcher::new();
        let delivered = Arc::new(Mutex::new(0));

        let count = delivered.clone();
        let token = dispatcher.register(move |_| *count.lock().unwrap() += 1);
        assert_eq!(dispatcher.subscriber_count(), 1);

        token.cancel();
        token.cancel();
        assert_eq!(dispatcher.subscriber_count(), 0);

        dispatcher.deliver(&record());
        assert_eq!(*delivered.lock().unwrap(), 0);
    }

    #[test]
    fn cancel_after_dispatcher_dropped_is_noop() {
        let dispatcher = Dispatcher::new();
        let token = dispatcher.register(|_| {});
        drop(dispatcher);
        token.cancel();
    }
}
