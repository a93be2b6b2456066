use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use super::manager::ThreadQueueManager;
use super::thread_queue::ThreadQueue;

/// Unregisters its queue from the owning manager on drop, giving it a chance
/// to drain before the queue is discarded. Rust's thread-local destructors
/// run this automatically on thread exit.
struct ThreadQueueHandle {
    manager: Arc<ThreadQueueManager>,
    queue: Arc<ThreadQueue>,
}

impl Drop for ThreadQueueHandle {
    fn drop(&mut self) {
        self.manager.unregister(&self.queue);
    }
}

thread_local! {
    /// Keyed by the owning `Logger`'s manager address, since one thread may
    /// log to several independent `Logger`s and each needs its own queue.
    static LOCAL_QUEUES: RefCell<HashMap<usize, ThreadQueueHandle>> = RefCell::new(HashMap::new());
}

/// Returns this thread's `ThreadQueue` for the `Logger` identified by
/// `logger_id`, lazily creating and registering it with `manager` on first
/// use.
pub(crate) fn thread_queue_for(
    logger_id: usize,
    manager: &Arc<ThreadQueueManager>,
    capacity: usize,
    slot_payload: usize,
) -> Arc<ThreadQueue> {
    LOCAL_QUEUES.with(|cell| {
        let mut queues = cell.borrow_mut();
        if let Some(handle) = queues.get(&logger_id) {
            return Arc::clone(&handle.queue);
        }

        let queue = Arc::new(ThreadQueue::new(capacity, slot_payload));
        manager.register(Arc::clone(&queue));
        queues.insert(
            logger_id,
            ThreadQueueHandle {
                manager: Arc::clone(manager),
                queue: Arc::clone(&queue),
            },
        );
        queue
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_thread_reuses_the_queue() {
        let manager = Arc::new(ThreadQueueManager::new());
        let a = thread_queue_for(1, &manager, 8, 64);
        let b = thread_queue_for(1, &manager, 8, 64);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn distinct_loggers_get_distinct_queues_on_the_same_thread() {
        let manager = Arc::new(ThreadQueueManager::new());
        let a = thread_queue_for(1, &manager, 8, 64);
        let b = thread_queue_for(2, &manager, 8, 64);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn thread_exit_unregisters_the_queue() {
        let manager = Arc::new(ThreadQueueManager::new());
        let manager_for_thread = Arc::clone(&manager);
        std::thread::spawn(move || {
            thread_queue_for(1, &manager_for_thread, 8, 64);
            assert_eq!(manager_for_thread.len(), 1);
        })
        .join()
        .unwrap();
        assert_eq!(manager.len(), 0);
    }
}
