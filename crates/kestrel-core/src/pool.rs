//! Fixed-capacity slot pool for hot-path value types.
//!
//! Pre-allocates all slots at construction. Uses a LIFO free list for
//! better cache locality on recently released slots. The order book
//! uses one as its order arena; the tick pipeline uses one for
//! in-flight ticks.

use core::mem::MaybeUninit;

/// Index into a [`SlotPool`].
///
/// Uses u32 to save space (supports up to 4 billion slots).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Slot(pub u32);

impl Slot {
    /// Invalid slot constant.
    pub const INVALID: Self = Self(u32::MAX);

    /// Check if the slot is valid.
    #[inline(always)]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Get the raw index.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Pre-allocated pool of fixed-size slots.
///
/// Capacity must be a power of two. Never allocates after construction;
/// exhaustion is reported to the caller as a backpressure signal.
pub struct SlotPool<T: Copy> {
    /// Slot storage.
    slots: Box<[MaybeUninit<T>]>,
    /// LIFO free list for O(1) alloc/dealloc.
    free_list: Vec<u32>,
    /// Total capacity.
    capacity: u32,
    /// Number of live slots.
    active_count: u32,
}

impl<T: Copy> SlotPool<T> {
    /// Create a pool with the given capacity (must be a power of 2).
    ///
    /// # Panics
    /// Panics if capacity is not a power of 2 or exceeds 2^28.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "capacity must be power of 2");
        assert!(capacity <= (1 << 28), "capacity too large (max 2^28)");
        let capacity = capacity as u32;

        let mut slots: Vec<MaybeUninit<T>> = Vec::with_capacity(capacity as usize);
        // SAFETY: MaybeUninit doesn't require initialization
        unsafe {
            slots.set_len(capacity as usize);
        }

        // Reverse order so the LIFO free list hands out low indices first
        let free_list: Vec<u32> = (0..capacity).rev().collect();

        Self {
            slots: slots.into_boxed_slice(),
            free_list,
            capacity,
            active_count: 0,
        }
    }

    /// Allocate a slot. Returns `None` when the pool is exhausted.
    #[inline(always)]
    pub fn allocate(&mut self) -> Option<Slot> {
        self.free_list.pop().map(|idx| {
            self.active_count += 1;
            Slot(idx)
        })
    }

    /// Allocate a slot and write `value` into it.
    #[inline(always)]
    pub fn insert(&mut self, value: T) -> Option<Slot> {
        let slot = self.allocate()?;
        self.slots[slot.index()].write(value);
        Some(slot)
    }

    /// Return a slot to the pool.
    ///
    /// The slot must have been previously allocated and not yet released.
    #[inline(always)]
    pub fn release(&mut self, slot: Slot) {
        debug_assert!(slot.0 < self.capacity, "invalid slot");
        debug_assert!(self.active_count > 0, "double release");

        self.free_list.push(slot.0);
        self.active_count -= 1;
    }

    /// Get an immutable reference to a live slot's value.
    #[inline(always)]
    pub fn get(&self, slot: Slot) -> &T {
        debug_assert!(slot.0 < self.capacity, "slot out of bounds");
        // SAFETY: caller ensures the slot holds an initialized value
        unsafe { self.slots[slot.index()].assume_init_ref() }
    }

    /// Get a mutable reference to a live slot's value.
    #[inline(always)]
    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        debug_assert!(slot.0 < self.capacity, "slot out of bounds");
        // SAFETY: caller ensures the slot holds an initialized value
        unsafe { self.slots[slot.index()].assume_init_mut() }
    }

    /// Number of free slots.
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.free_list.len()
    }

    /// Number of live slots.
    #[inline(always)]
    pub fn active(&self) -> usize {
        self.active_count as usize
    }

    /// Total capacity.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Check if the pool is exhausted.
    #[inline(always)]
    pub fn is_exhausted(&self) -> bool {
        self.free_list.is_empty()
    }
}
