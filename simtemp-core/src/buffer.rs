//! Fixed-Capacity Ring Buffer with Drop-Oldest Eviction
//!
//! ## Overview
//!
//! Samples produced by the scheduler land in a circular buffer that one or
//! more readers drain. The buffer has a compile-time capacity and never
//! allocates. When it is full, a push first evicts the oldest sample, so the
//! producer never blocks and never fails.
//!
//! ## Design Rationale
//!
//! ### Why drop-oldest?
//!
//! A sensor stream values fresh data over stale data. A reader that falls
//! behind should see the most recent `N` samples, not the first `N` it missed.
//! The producer runs on a periodic deadline and must not wait for readers.
//!
//! ### Two layers
//!
//! - [`RingBuffer`]: the plain, single-threaded ring. Head/tail indices,
//!   length, FIFO order. Easy to reason about and to property-test.
//! - [`SharedRing`]: the ring behind one `parking_lot::Mutex`. Every mutation
//!   *and* every read used for a control decision (`is_empty`, `len`) takes the
//!   same lock, so no caller ever acts on a length that a concurrent push or
//!   pop has already changed underneath it.
//!
//! ### Memory Layout
//!
//! ```text
//! RingBuffer<Sample, 8>, after 10 pushes (2 evicted):
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │ s8  │ s9  │ s2  │ s3  │ s4  │ s5  │ s6  │ s7  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!                ↑
//!           head = tail = 2   (full: oldest is s2, next write replaces it)
//! ```
//!
//! `N` must be a power of two so that index wrapping is a mask.
//!
//! ## Usage Example
//!
//! ```rust
//! use simtemp_core::buffer::RingBuffer;
//!
//! let mut ring: RingBuffer<u32, 4> = RingBuffer::new();
//! for v in 0..6 {
//!     ring.push(v);
//! }
//!
//! // Oldest two were evicted
//! assert_eq!(ring.len(), 4);
//! assert_eq!(ring.pop(), Ok(2));
//! ```

use parking_lot::Mutex;

use crate::errors::BufferEmpty;

/// Fixed-size FIFO ring that evicts its oldest element when full
///
/// ## Internal Invariants
///
/// - `head < N` is the slot of the oldest element (when `len > 0`)
/// - `tail < N` is the slot the next push writes
/// - `len <= N`, and `tail == (head + len) & (N - 1)`
///
/// ## Thread Safety
///
/// Not thread-safe on its own; share it through [`SharedRing`].
#[derive(Debug, Clone)]
pub struct RingBuffer<T: Copy, const N: usize> {
    /// Option instead of MaybeUninit keeps this free of unsafe code
    data: [Option<T>; N],
    head: usize,
    tail: usize,
    len: usize,
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "Ring capacity must be power of 2"
    );

    const MASK: usize = N - 1;

    /// Creates an empty ring
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;

        Self {
            data: [None; N],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Appends `item`, evicting and returning the oldest element if full
    ///
    /// The length never exceeds `N`: on a full ring exactly one element
    /// leaves before the new one is stored.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.pop().ok()
        } else {
            None
        };

        self.data[self.tail] = Some(item);
        self.tail = (self.tail + 1) & Self::MASK;
        self.len += 1;

        evicted
    }

    /// Removes and returns the oldest element
    pub fn pop(&mut self) -> Result<T, BufferEmpty> {
        if self.is_empty() {
            return Err(BufferEmpty);
        }

        let item = self.data[self.head].take().ok_or(BufferEmpty)?;
        self.head = (self.head + 1) & Self::MASK;
        self.len -= 1;
        Ok(item)
    }

    /// Oldest element without removing it
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.data[self.head].as_ref()
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if ring is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if ring is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Fixed capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterate from oldest to newest without consuming
    pub fn iter(&self) -> RingIter<'_, T, N> {
        RingIter {
            ring: self,
            offset: 0,
        }
    }

    /// Remove every element, oldest first
    pub fn drain(&mut self) -> RingDrain<'_, T, N> {
        RingDrain { ring: self }
    }

    /// Drop all elements
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

impl<T: Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ring contents, oldest first
pub struct RingIter<'a, T: Copy, const N: usize> {
    ring: &'a RingBuffer<T, N>,
    offset: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for RingIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.ring.len {
            return None;
        }
        let slot = (self.ring.head + self.offset) & RingBuffer::<T, N>::MASK;
        self.offset += 1;
        self.ring.data[slot].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ring.len - self.offset;
        (remaining, Some(remaining))
    }
}

/// Draining iterator, pops until empty
pub struct RingDrain<'a, T: Copy, const N: usize> {
    ring: &'a mut RingBuffer<T, N>,
}

impl<'a, T: Copy, const N: usize> Iterator for RingDrain<'a, T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.ring.pop().ok()
    }
}

/// Ring shared between the producer and any number of readers
///
/// All operations serialize through one lock. None of them block beyond
/// waiting for that lock: `push` always succeeds, `pop` fails fast.
#[derive(Debug)]
pub struct SharedRing<T: Copy, const N: usize> {
    inner: Mutex<RingBuffer<T, N>>,
}

impl<T: Copy, const N: usize> SharedRing<T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RingBuffer::new()),
        }
    }

    /// Push, evicting the oldest element if full
    pub fn push(&self, item: T) -> Option<T> {
        self.inner.lock().push(item)
    }

    /// Pop the oldest element
    pub fn pop(&self) -> Result<T, BufferEmpty> {
        self.inner.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.lock().is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Remove everything in one critical section, oldest first
    pub fn drain_all(&self) -> Vec<T> {
        let mut ring = self.inner.lock();
        ring.drain().collect()
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().iter().copied().collect()
    }
}

impl<T: Copy, const N: usize> Default for SharedRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn empty_ring() {
        let mut ring: RingBuffer<u32, 8> = RingBuffer::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.pop(), Err(BufferEmpty));
        assert!(ring.peek().is_none());
    }

    #[test]
    fn fifo_order() {
        let mut ring = RingBuffer::<u32, 4>::new();
        ring.push(1);
        ring.push(2);
        ring.push(3);

        assert_eq!(ring.peek(), Some(&1));
        assert_eq!(ring.pop(), Ok(1));
        assert_eq!(ring.pop(), Ok(2));
        assert_eq!(ring.pop(), Ok(3));
        assert_eq!(ring.pop(), Err(BufferEmpty));
    }

    #[test]
    fn full_push_evicts_exactly_one_oldest() {
        let mut ring = RingBuffer::<u32, 4>::new();
        for i in 0..4 {
            assert_eq!(ring.push(i), None);
        }
        assert!(ring.is_full());

        assert_eq!(ring.push(4), Some(0));
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.push(5), Some(1));

        let contents: Vec<u32> = ring.iter().copied().collect();
        assert_eq!(contents, vec![2, 3, 4, 5]);
    }

    #[test]
    fn wraps_after_interleaved_pops() {
        let mut ring = RingBuffer::<u32, 4>::new();
        for i in 0..3 {
            ring.push(i);
        }
        assert_eq!(ring.pop(), Ok(0));
        assert_eq!(ring.pop(), Ok(1));
        for i in 3..6 {
            ring.push(i);
        }

        assert!(ring.is_full());
        let drained: Vec<u32> = ring.drain().collect();
        assert_eq!(drained, vec![2, 3, 4, 5]);
        assert!(ring.is_empty());
    }

    #[test]
    fn clear_resets() {
        let mut ring = RingBuffer::<u32, 2>::new();
        ring.push(1);
        ring.push(2);
        ring.clear();
        assert!(ring.is_empty());
        ring.push(9);
        assert_eq!(ring.pop(), Ok(9));
    }

    #[test]
    fn shared_ring_concurrent_producer_and_consumers() {
        const PUSHES: u32 = 10_000;
        let ring: Arc<SharedRing<u32, 64>> = Arc::new(SharedRing::new());

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut evicted = 0u32;
                for i in 0..PUSHES {
                    if ring.push(i).is_some() {
                        evicted += 1;
                    }
                    assert!(ring.len() <= 64);
                }
                evicted
            })
        };

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let ring = Arc::clone(&ring);
                thread::spawn(move || {
                    let mut last = None;
                    let mut popped = 0u32;
                    for _ in 0..PUSHES {
                        if let Ok(v) = ring.pop() {
                            // Each consumer sees increasing values since the ring is FIFO
                            if let Some(prev) = last {
                                assert!(v > prev);
                            }
                            last = Some(v);
                            popped += 1;
                        }
                    }
                    popped
                })
            })
            .collect();

        let evicted = producer.join().unwrap();
        let popped: u32 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
        let remaining = ring.drain_all().len() as u32;

        // Every pushed value is accounted for exactly once
        assert_eq!(evicted + popped + remaining, PUSHES);
    }

    proptest! {
        #[test]
        fn keeps_exactly_the_last_capacity_pushes(values in proptest::collection::vec(any::<u32>(), 0..64)) {
            let mut ring = RingBuffer::<u32, 8>::new();
            for &v in &values {
                ring.push(v);
                prop_assert!(ring.len() <= 8);
            }

            let expected_len = values.len().min(8);
            prop_assert_eq!(ring.len(), expected_len);

            let expected: Vec<u32> = values[values.len() - expected_len..].to_vec();
            let actual: Vec<u32> = ring.iter().copied().collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
