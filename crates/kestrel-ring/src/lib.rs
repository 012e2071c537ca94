//! Lock-free SPSC ring buffer.
//!
//! Fixed-capacity single-producer single-consumer hand-off channel
//! with cache-line padding to prevent false sharing. One slot is kept
//! in reserve to disambiguate full from empty, so a ring of capacity
//! `N` accepts exactly `N-1` items before reporting full.
//!
//! Both operations are non-blocking: a full ring rejects the push and
//! the caller decides whether to drop, retry, or escalate.

#![no_std]

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU64, Ordering};

/// Padded atomic counter occupying its own cache line.
#[repr(C, align(128))]
struct PaddedAtomicU64 {
    value: AtomicU64,
}

impl PaddedAtomicU64 {
    const fn new(v: u64) -> Self {
        Self {
            value: AtomicU64::new(v),
        }
    }
}

/// Single-producer single-consumer lock-free ring buffer.
///
/// Exactly one thread may push and exactly one (possibly different)
/// thread may pop; more writers or readers require external
/// serialization. Monotone cursors with acquire/release ordering
/// synchronize the hand-off.
#[repr(C)]
pub struct SpscRing<T: Copy, const N: usize> {
    /// Write cursor (owned by producer).
    write_cursor: PaddedAtomicU64,

    /// Cached read position for the producer (reduces cache bouncing).
    cached_read: PaddedAtomicU64,

    /// Read cursor (owned by consumer).
    read_cursor: PaddedAtomicU64,

    /// Cached write position for the consumer.
    cached_write: PaddedAtomicU64,

    /// Slot storage.
    buffer: UnsafeCell<[MaybeUninit<T>; N]>,
}

// SAFETY: the producer/consumer split guarantees each slot is written
// by one thread and read by the other, ordered by the atomic cursors.
unsafe impl<T: Copy + Send, const N: usize> Send for SpscRing<T, N> {}
unsafe impl<T: Copy + Send, const N: usize> Sync for SpscRing<T, N> {}

impl<T: Copy, const N: usize> SpscRing<T, N> {
    const MASK: u64 = (N - 1) as u64;

    /// Create a new ring buffer.
    ///
    /// # Panics
    /// Panics if N is not a power of 2.
    pub fn new() -> Self {
        assert!(N.is_power_of_two(), "capacity must be power of 2");

        Self {
            write_cursor: PaddedAtomicU64::new(0),
            cached_read: PaddedAtomicU64::new(0),
            read_cursor: PaddedAtomicU64::new(0),
            cached_write: PaddedAtomicU64::new(0),
            buffer: UnsafeCell::new(unsafe { MaybeUninit::uninit().assume_init() }),
        }
    }

    /// Total slot count. Usable capacity is one less.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Split into the single producer and single consumer handles.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        (Producer { ring: self }, Consumer { ring: self })
    }
}

impl<T: Copy, const N: usize> Default for SpscRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle (write-only).
pub struct Producer<'a, T: Copy, const N: usize> {
    ring: &'a SpscRing<T, N>,
}

impl<'a, T: Copy, const N: usize> Producer<'a, T, N> {
    /// Attempt to push a value.
    ///
    /// Returns `false` when full; the value is not inserted and the
    /// caller handles the backpressure. Never blocks, never panics.
    #[inline(always)]
    pub fn try_push(&mut self, value: T) -> bool {
        let write_pos = self.ring.write_cursor.value.load(Ordering::Relaxed);

        // Full check against the cached read position first
        let cached_read = self.ring.cached_read.value.load(Ordering::Relaxed);
        if write_pos - cached_read >= Self::usable() {
            // Refresh the cache from the consumer's cursor
            let current_read = self.ring.read_cursor.value.load(Ordering::Acquire);
            self.ring
                .cached_read
                .value
                .store(current_read, Ordering::Relaxed);

            if write_pos - current_read >= Self::usable() {
                return false; // actually full
            }
        }

        let idx = (write_pos & SpscRing::<T, N>::MASK) as usize;
        unsafe {
            let buffer = &mut *self.ring.buffer.get();
            buffer[idx].write(value);
        }

        // Release barrier publishes the slot write
        self.ring
            .write_cursor
            .value
            .store(write_pos + 1, Ordering::Release);

        true
    }

    /// Push each value of a batch, stopping at the first rejection.
    ///
    /// Returns the number of values accepted.
    #[inline]
    pub fn try_push_batch(&mut self, values: &[T]) -> usize {
        for (i, &value) in values.iter().enumerate() {
            if !self.try_push(value) {
                return i;
            }
        }
        values.len()
    }

    /// Free slots remaining before the ring reports full.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        let write_pos = self.ring.write_cursor.value.load(Ordering::Relaxed);
        let read_pos = self.ring.read_cursor.value.load(Ordering::Acquire);
        (Self::usable() - (write_pos - read_pos)) as usize
    }

    /// One slot stays reserved to tell full apart from empty.
    #[inline(always)]
    const fn usable() -> u64 {
        (N - 1) as u64
    }
}

/// Consumer handle (read-only).
pub struct Consumer<'a, T: Copy, const N: usize> {
    ring: &'a SpscRing<T, N>,
}

impl<'a, T: Copy, const N: usize> Consumer<'a, T, N> {
    /// Attempt to pop a value.
    ///
    /// Returns `None` when empty. Never blocks, never panics.
    #[inline(always)]
    pub fn try_pop(&mut self) -> Option<T> {
        let read_pos = self.ring.read_cursor.value.load(Ordering::Relaxed);

        // Empty check against the cached write position first
        let cached_write = self.ring.cached_write.value.load(Ordering::Relaxed);
        if read_pos >= cached_write {
            // Refresh the cache from the producer's cursor
            let current_write = self.ring.write_cursor.value.load(Ordering::Acquire);
            self.ring
                .cached_write
                .value
                .store(current_write, Ordering::Relaxed);

            if read_pos >= current_write {
                return None; // actually empty
            }
        }

        let idx = (read_pos & SpscRing::<T, N>::MASK) as usize;
        let value = unsafe {
            let buffer = &*self.ring.buffer.get();
            buffer[idx].assume_init_read()
        };

        // Release barrier hands the slot back to the producer
        self.ring
            .read_cursor
            .value
            .store(read_pos + 1, Ordering::Release);

        Some(value)
    }

    /// Pop into a batch buffer. Returns the number of items popped.
    #[inline]
    pub fn try_pop_batch(&mut self, buffer: &mut [T]) -> usize {
        let mut count = 0;
        for slot in buffer.iter_mut() {
            match self.try_pop() {
                Some(value) => {
                    *slot = value;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Number of items currently available to pop.
    #[inline]
    pub fn available(&self) -> usize {
        let write_pos = self.ring.write_cursor.value.load(Ordering::Acquire);
        let read_pos = self.ring.read_cursor.value.load(Ordering::Relaxed);
        (write_pos - read_pos) as usize
    }
}
