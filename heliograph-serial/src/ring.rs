//! Fixed-capacity single-producer single-consumer byte ring.
//!
//! Head is the write index, tail the read index; both stay in `[0, N)`.
//! The ring is empty iff `head == tail` and full when
//! `(head + 1) % N == tail`, so `N` slots hold at most `N - 1` bytes. The
//! fixed bound is deliberate backpressure, not a limitation to relax.

use core::cell::UnsafeCell;

use portable_atomic::{AtomicUsize, Ordering};

/// SPSC byte ring with `N - 1` usable slots.
///
/// Exactly one side may push and exactly one side may pop; with that
/// discipline no lock is needed. The producer publishes `head` with a
/// release store after writing the slot, and the consumer reads the slot
/// only after an acquire load of `head` (and vice versa for `tail`), so
/// each side always observes complete slot writes.
pub struct Ring<const N: usize> {
    head: AtomicUsize,
    tail: AtomicUsize,
    buf: UnsafeCell<[u8; N]>,
}

// SAFETY: the index words are atomic, and the SPSC contract above means the
// producer and the consumer never access the same slot concurrently: the
// producer only writes slots in [head, tail), the consumer only reads slots
// in [tail, head), and each index is advanced only after its slot access.
unsafe impl<const N: usize> Sync for Ring<N> {}

impl<const N: usize> Ring<N> {
    /// Create an empty ring. `N` must be at least 2.
    pub const fn new() -> Self {
        assert!(N >= 2, "a ring needs at least one usable slot");
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            buf: UnsafeCell::new([0; N]),
        }
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (N + head - tail) % N
    }

    /// Whether the ring holds no data.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Whether a push would be refused.
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + 1) % N == tail
    }

    /// Producer side: append one byte.
    ///
    /// Returns `false` when the ring is full; the byte is dropped and
    /// previously buffered bytes stay intact (drop-newest policy).
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let next = (head + 1) % N;
        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }
        // SAFETY: `head` is owned by the single producer, and the consumer
        // does not read this slot until the release store below.
        unsafe {
            (*self.buf.get())[head] = byte;
        }
        self.head.store(next, Ordering::Release);
        true
    }

    /// Consumer side: remove the oldest byte.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Acquire);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `tail` is owned by the single consumer, and the producer
        // does not overwrite this slot until the release store below.
        let byte = unsafe { (*self.buf.get())[tail] };
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(byte)
    }

    /// Consumer side: discard everything currently buffered.
    pub fn clear(&self) {
        self.tail
            .store(self.head.load(Ordering::Acquire), Ordering::Release);
    }
}

impl<const N: usize> Default for Ring<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_ring_is_empty() {
        let ring: Ring<8> = Ring::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_len_tracks_occupancy() {
        let ring: Ring<8> = Ring::new();
        for k in 1..8 {
            assert!(ring.push(k));
            assert_eq!(ring.len(), k as usize);
        }
        // 7 bytes in an 8-slot ring is the maximum before ambiguity
        assert!(ring.is_full());
    }

    #[test]
    fn test_fifo_order() {
        let ring: Ring<8> = Ring::new();
        for b in [10, 20, 30] {
            assert!(ring.push(b));
        }
        assert_eq!(ring.pop(), Some(10));
        assert_eq!(ring.pop(), Some(20));
        assert_eq!(ring.pop(), Some(30));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_full_ring_drops_newest() {
        let ring: Ring<4> = Ring::new();
        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(ring.push(3));
        assert!(!ring.push(4));
        assert_eq!(ring.len(), 3);
        // The earlier bytes survive intact
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
    }

    #[test]
    fn test_indices_wrap_around() {
        let ring: Ring<4> = Ring::new();
        // Cycle well past the capacity to force wraparound
        for round in 0u8..20 {
            assert!(ring.push(round));
            assert!(ring.push(round.wrapping_add(100)));
            assert_eq!(ring.pop(), Some(round));
            assert_eq!(ring.pop(), Some(round.wrapping_add(100)));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_clear_discards_buffered_bytes() {
        let ring: Ring<8> = Ring::new();
        for b in 0..5 {
            assert!(ring.push(b));
        }
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.pop(), None);
        // Still usable afterwards
        assert!(ring.push(42));
        assert_eq!(ring.pop(), Some(42));
    }

    proptest! {
        #[test]
        fn prop_fifo_order_preserved(data in proptest::collection::vec(any::<u8>(), 0..63)) {
            let ring: Ring<64> = Ring::new();
            for &b in &data {
                prop_assert!(ring.push(b));
            }
            prop_assert_eq!(ring.len(), data.len());
            for &b in &data {
                prop_assert_eq!(ring.pop(), Some(b));
            }
            prop_assert_eq!(ring.pop(), None);
        }

        #[test]
        fn prop_occupancy_never_exceeds_capacity(data in proptest::collection::vec(any::<u8>(), 0..200)) {
            let ring: Ring<16> = Ring::new();
            for &b in &data {
                let _ = ring.push(b);
                prop_assert!(ring.len() <= 15);
            }
        }
    }
}
