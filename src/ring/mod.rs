//! The per-thread single-producer/single-consumer ring buffer and the
//! fixed-size message slot it stores.

mod buffer;

pub(crate) use buffer::{DequeuedMessage, RingBuffer};
