use crate::format::FormatterHandle;
use crate::level::LogLevel;
use crate::ring::{DequeuedMessage, RingBuffer};

/// `(owning thread, RingBuffer)`. Created lazily on a producer thread's
/// first logging call to a given `Logger` and torn down when that thread
/// exits.
pub(crate) struct ThreadQueue {
    ring: RingBuffer,
}

impl ThreadQueue {
    pub(crate) fn new(capacity: usize, slot_payload: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity, slot_payload),
        }
    }

    pub(crate) fn slot_payload_capacity(&self) -> usize {
        self.ring.slot_payload_capacity()
    }

    /// Forwards to [`RingBuffer::enqueue_with`]: `encode` writes directly
    /// into the slot's own payload buffer and returns the number of bytes
    /// written, or `None` on overflow. Returns `false` without publishing
    /// the slot in the overflow case.
    pub(crate) fn enqueue(
        &self,
        level: LogLevel,
        formatter: FormatterHandle,
        encode: impl FnOnce(&mut [u8]) -> Option<usize>,
    ) -> bool {
        self.ring.enqueue_with(level, formatter, encode)
    }

    pub(crate) fn dequeue(&self) -> Option<DequeuedMessage> {
        self.ring.dequeue()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
