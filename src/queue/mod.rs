//! Discovery and lifecycle of per-thread ring buffers: lazily created on a
//! producer thread's first log call, registered with a `Logger`-owned
//! manager, and unregistered (after draining) on thread exit.

mod local;
mod manager;
mod thread_queue;

pub(crate) use local::thread_queue_for;
pub(crate) use manager::ThreadQueueManager;
pub(crate) use thread_queue::ThreadQueue;
