//! Lock-free recycling of single-use objects.
//!
//! Released objects are reset and parked in a bounded free list; `acquire`
//! hands one back out or builds a fresh one. Acquire and release are single
//! atomic queue operations, so the pool can be hammered from any number of
//! tasks without a lock.

use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Objects that can be wiped back to their blank state.
pub trait Recycle: Default {
    /// Clear every mutable field. Allocations may be kept, contents may not.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects built because the free list was empty.
    pub created: usize,
    /// Acquisitions served from the free list.
    pub reused: usize,
    /// Objects parked back into the free list.
    pub released: usize,
    /// Objects currently parked.
    pub idle: usize,
}

pub struct ObjectPool<T> {
    slots: ArrayQueue<T>,
    created: AtomicUsize,
    reused: AtomicUsize,
    released: AtomicUsize,
}

impl<T: Recycle> ObjectPool<T> {
    /// `capacity` of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: ArrayQueue::new(capacity.max(1)),
            created: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// A blank object, recycled when one is available.
    pub fn acquire(&self) -> T {
        match self.slots.pop() {
            Some(item) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                item
            }
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                T::default()
            }
        }
    }

    /// Reset `item` and park it; dropped if the free list is full.
    pub fn release(&self, mut item: T) {
        item.reset();
        if self.slots.push(item).is_ok() {
            self.released.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            idle: self.slots.len(),
        }
    }
}
