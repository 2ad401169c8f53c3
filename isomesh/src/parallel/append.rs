//! Fixed-capacity buffer with lock-free appends
use std::{
    cell::UnsafeCell,
    mem::MaybeUninit,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Pre-sized buffer that many threads can append to at once
///
/// Each [`push`](AppendBuffer::push) claims a slot with a single `fetch_add`
/// on a shared counter, then writes it without locking.  The buffer never
/// grows: once it is full, pushes fail but keep counting, so the caller can
/// find out how much room would have been needed.
///
/// Items must be `Copy`, since stored items are overwritten on reset without
/// being dropped:
///
/// ```compile_fail
/// # use isomesh::parallel::AppendBuffer;
/// let b = AppendBuffer::<String>::new(4);
/// ```
pub struct AppendBuffer<T: Copy> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    next: AtomicUsize,
}

// SAFETY: each slot is written by exactly one `push` (the one that claimed its
// index), and slots are only read through `&mut self`, after every writer is
// done.
unsafe impl<T: Copy + Send> Sync for AppendBuffer<T> {}

impl<T: Copy> std::fmt::Debug for AppendBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppendBuffer")
            .field("capacity", &self.capacity())
            .field("claimed", &self.claimed())
            .finish()
    }
}

impl<T: Copy> Default for AppendBuffer<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Copy> AppendBuffer<T> {
    /// Allocates a buffer with room for `capacity` items
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        Self {
            slots,
            next: AtomicUsize::new(0),
        }
    }

    /// Number of items that fit in the buffer
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of pushes since the last reset, including failed ones
    pub fn claimed(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    /// Number of items stored in the buffer
    pub fn len(&self) -> usize {
        self.claimed().min(self.capacity())
    }

    /// Checks whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether more items were pushed than the buffer could hold
    pub fn overflowed(&self) -> bool {
        self.claimed() > self.capacity()
    }

    /// Appends an item, returning its index
    ///
    /// If the buffer is full, the item is handed back.
    pub fn push(&self, item: T) -> Result<usize, T> {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        match self.slots.get(i) {
            Some(slot) => {
                // SAFETY: `fetch_add` hands out each index once, so no other
                // thread can be writing this slot, and no reader can exist
                // while `&self` is shared.
                unsafe { (*slot.get()).write(item) };
                Ok(i)
            }
            None => Err(item),
        }
    }

    /// Returns every stored item, in claim order
    pub fn as_slice(&mut self) -> &[T] {
        let n = self.len();
        // SAFETY: every index below `n` was claimed by a `push` that wrote it
        // before returning, and `&mut self` guarantees that all of those
        // pushes have finished.  `UnsafeCell` and `MaybeUninit` are both
        // `repr(transparent)`, so the slots have the layout of `T`.
        unsafe {
            std::slice::from_raw_parts(self.slots.as_ptr().cast::<T>(), n)
        }
    }

    /// Forgets every stored item, keeping the allocation
    pub fn reset(&mut self) {
        *self.next.get_mut() = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn concurrent_push() {
        let mut buf = AppendBuffer::new(10_000);
        (0..10_000).into_par_iter().for_each(|i| {
            buf.push(i).unwrap();
        });
        assert!(!buf.overflowed());
        let mut items = buf.as_slice().to_vec();
        items.sort();
        assert_eq!(items, (0..10_000).collect::<Vec<_>>());
    }

    #[test]
    fn overflow_keeps_counting() {
        let mut buf = AppendBuffer::new(3);
        for i in 0..5 {
            let r = buf.push(i);
            if i < 3 {
                assert_eq!(r, Ok(i));
            } else {
                assert_eq!(r, Err(i));
            }
        }
        assert!(buf.overflowed());
        assert_eq!(buf.claimed(), 5);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_slice(), &[0, 1, 2]);

        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.push(9), Ok(0));
        assert_eq!(buf.as_slice(), &[9]);
    }
}
