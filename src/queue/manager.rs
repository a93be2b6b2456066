use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::thread_queue::ThreadQueue;

/// Tracks the set of live [`ThreadQueue`]s for one `Logger`.
///
/// The mutex is held only long enough to mutate or walk the set — never
/// while a message is being formatted or written to the sink, so a drain
/// pass never blocks a producer's `register` on I/O.
pub(crate) struct ThreadQueueManager {
    queues: Mutex<Vec<Arc<ThreadQueue>>>,
}

impl ThreadQueueManager {
    pub(crate) fn new() -> Self {
        Self {
            queues: Mutex::new(Vec::new()),
        }
    }

    /// Adds `queue` to the live set. Safe to call concurrently with
    /// `for_each` and other `register`/`unregister` calls.
    pub(crate) fn register(&self, queue: Arc<ThreadQueue>) {
        self.queues.lock().push(queue);
    }

    /// Removes `queue` from the live set.
    ///
    /// Before removal, actively waits for the queue to drain by spinning on
    /// `is_empty()` rather than sleeping a fixed interval — a fixed sleep
    /// can still race a slow drainer. The wait happens outside the set's
    /// mutex so a departing thread never blocks a concurrent drain pass or
    /// another thread's registration.
    pub(crate) fn unregister(&self, queue: &Arc<ThreadQueue>) {
        while !queue.is_empty() {
            thread::yield_now();
        }
        self.queues.lock().retain(|q| !Arc::ptr_eq(q, queue));
    }

    /// Calls `visit` once per currently registered queue, under the set's
    /// mutex. Because `unregister` waits for drainage before removing a
    /// queue, any queue observed here stays valid for the whole pass.
    pub(crate) fn for_each(&self, mut visit: impl FnMut(&Arc<ThreadQueue>)) {
        let queues = self.queues.lock();
        for queue in queues.iter() {
            visit(queue);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.queues.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{intern, ArgKind};
    use crate::level::LogLevel;

    #[test]
    fn register_and_unregister_tracks_membership() {
        let manager = ThreadQueueManager::new();
        let queue = Arc::new(ThreadQueue::new(8, 64));
        manager.register(Arc::clone(&queue));
        assert_eq!(manager.len(), 1);
        manager.unregister(&queue);
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn unregister_waits_for_residual_messages_to_drain() {
        let manager = ThreadQueueManager::new();
        let queue = Arc::new(ThreadQueue::new(8, 64));
        manager.register(Arc::clone(&queue));

        let handle = intern("manager::tests", "{}", &[ArgKind::I64]);
        let bytes = 1i64.to_ne_bytes();
        queue.enqueue(LogLevel::Info, handle, |buf| {
            buf[..bytes.len()].copy_from_slice(&bytes);
            Some(bytes.len())
        });

        let drain_queue = Arc::clone(&queue);
        let drainer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            drain_queue.dequeue();
        });

        manager.unregister(&queue);
        drainer.join().unwrap();
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn for_each_visits_every_registered_queue() {
        let manager = ThreadQueueManager::new();
        for _ in 0..3 {
            manager.register(Arc::new(ThreadQueue::new(8, 64)));
        }
        let mut count = 0;
        manager.for_each(|_| count += 1);
        assert_eq!(count, 3);
    }
}
