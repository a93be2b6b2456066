use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::format::FormatterHandle;
use crate::level::LogLevel;

/// One fixed-size record in a [`RingBuffer`]: a formatter handle, a level
/// tag, and an opaque byte payload.
///
/// The payload buffer is allocated once, at ring-buffer construction, and
/// reused in place for the life of the slot; only the first `len` bytes of
/// `payload` are meaningful at any given time.
struct RawSlot {
    formatter: Option<FormatterHandle>,
    level: LogLevel,
    len: usize,
    payload: Box<[u8]>,
}

impl RawSlot {
    fn empty(payload_capacity: usize) -> Self {
        Self {
            formatter: None,
            level: LogLevel::Debug,
            len: 0,
            payload: vec![0u8; payload_capacity].into_boxed_slice(),
        }
    }
}

/// An owned message, copied out of a [`RingBuffer`] slot by `dequeue`.
pub(crate) struct DequeuedMessage {
    pub formatter: FormatterHandle,
    pub level: LogLevel,
    pub payload: Vec<u8>,
}

#[inline]
fn next_index(i: usize, mask: usize) -> usize {
    (i + 1) & mask
}

/// A fixed-capacity single-producer/single-consumer ring buffer of message
/// slots.
///
/// Exactly one producer thread and one consumer thread may operate on a
/// given `RingBuffer` concurrently; any other access pattern is a logic
/// error the type does not attempt to detect. `head` and `tail` each live in
/// their own `CachePadded` region to keep the producer's writes to `tail`
/// from bouncing the consumer's cache line for `head`, and vice versa.
pub(crate) struct RingBuffer {
    slots: Box<[UnsafeCell<RawSlot>]>,
    /// `capacity - 1`; capacity is always a power of two, so index wrap is a
    /// bitwise AND rather than a modulo.
    mask: usize,
    /// Consumer-owned: next slot to read.
    head: CachePadded<AtomicUsize>,
    /// Producer-owned: next slot to write.
    tail: CachePadded<AtomicUsize>,
}

// SAFETY: `slots` is only ever indexed by the producer at `tail` or the
// consumer at `head`, and those two indices are never equal to an
// in-progress write's index at the same time (the capacity-minus-one
// invariant keeps a fully-written slot's index off limits to the producer
// until the consumer has advanced past it). This gives the two threads
// disjoint access to any given slot.
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Creates a ring buffer with room for `capacity - 1` outstanding
    /// messages, each slot preallocated to hold up to `slot_payload` bytes
    /// of encoded arguments.
    ///
    /// # Panics
    /// Panics if `capacity` is not a power of two.
    pub(crate) fn new(capacity: usize, slot_payload: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "ring buffer capacity must be a power of two, got {capacity}"
        );
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(RawSlot::empty(slot_payload)))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            mask: capacity - 1,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// The fixed payload capacity of each slot, in bytes.
    pub(crate) fn slot_payload_capacity(&self) -> usize {
        // SAFETY: read-only access to a field that is never resized after
        // construction; any index is representative.
        unsafe { (*self.slots[0].get()).payload.len() }
    }

    /// Constructs the next slot in place: `encode` is handed a `&mut [u8]`
    /// borrowed directly from that slot's own preallocated payload buffer
    /// (no separate scratch buffer is allocated), and returns the number of
    /// bytes written or `None` on payload overflow. Spins while the buffer
    /// is full; there is no timeout and no drop on backpressure — it is
    /// producer latency, never message loss.
    ///
    /// Returns `false` without publishing the slot if `encode` returns
    /// `None`; `tail` is not advanced and the caller is responsible for any
    /// overflow diagnostic.
    pub(crate) fn enqueue_with(
        &self,
        level: LogLevel,
        formatter: FormatterHandle,
        encode: impl FnOnce(&mut [u8]) -> Option<usize>,
    ) -> bool {
        loop {
            let tail = self.tail.load(Ordering::Relaxed);
            let head = self.head.load(Ordering::Acquire);
            let next = next_index(tail, self.mask);
            if next == head {
                std::hint::spin_loop();
                continue;
            }

            // SAFETY: `tail` is producer-owned; the fullness check above
            // guarantees the consumer is not currently reading this index.
            let slot = unsafe { &mut *self.slots[tail].get() };
            let len = match encode(&mut slot.payload) {
                Some(len) => len,
                None => return false,
            };
            slot.formatter = Some(formatter);
            slot.level = level;
            slot.len = len;

            self.tail.store(next, Ordering::Release);
            return true;
        }
    }

    /// Copies the oldest unread slot out, or returns `None` if the buffer is
    /// empty.
    pub(crate) fn dequeue(&self) -> Option<DequeuedMessage> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: `head` is consumer-owned; `head != tail` guarantees the
        // producer has finished publishing this slot.
        let message = unsafe {
            let slot = &*self.slots[head].get();
            DequeuedMessage {
                formatter: slot
                    .formatter
                    .expect("a published slot always carries a formatter handle"),
                level: slot.level,
                payload: slot.payload[..slot.len].to_vec(),
            }
        };

        self.head.store(next_index(head, self.mask), Ordering::Release);
        Some(message)
    }

    /// True iff there is nothing left to dequeue.
    pub(crate) fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }
}
