//! Iterator implementations for `TieredVec`.

use allocator_api2::alloc::{Allocator, Global};

use crate::TieredVec;

/// An iterator over references to elements of a `TieredVec`.
pub struct Iter<'a, T, const N: u32 = 0, A: Allocator = Global> {
    vec: &'a TieredVec<T, N, A>,
    /// Current pointer within segment
    ptr: *const T,
    /// End of the contiguous run starting at `ptr`
    segment_end: *const T,
    /// Logical index of the next front element
    front: usize,
    /// Logical index one past the next back element
    back: usize,
}

impl<'a, T, const N: u32, A: Allocator> Iter<'a, T, N, A> {
    pub(crate) fn new(vec: &'a TieredVec<T, N, A>) -> Self {
        Self {
            vec,
            ptr: std::ptr::null(),
            segment_end: std::ptr::null(),
            front: 0,
            back: vec.len(),
        }
    }

    /// Points `ptr` at `front` and `segment_end` at the end of its segment.
    #[cold]
    fn load_segment(&mut self) {
        let cap = TieredVec::<T, N, A>::SEGMENT_CAPACITY;
        let remaining = cap - (self.front & (cap - 1));
        unsafe {
            let base = self.vec.buf.ptr_at(self.front);
            self.ptr = base;
            self.segment_end = base.add(remaining);
        }
    }
}

impl<'a, T, const N: u32, A: Allocator> Iterator for Iter<'a, T, N, A> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        // For ZSTs `segment_end == ptr` always, so every step reloads.
        if self.ptr == self.segment_end {
            self.load_segment();
        }
        let result = unsafe { &*self.ptr };
        self.ptr = unsafe { self.ptr.add(1) };
        self.front += 1;
        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, const N: u32, A: Allocator> DoubleEndedIterator for Iter<'_, T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { &*self.vec.buf.ptr_at(self.back) })
    }
}

impl<T, const N: u32, A: Allocator> ExactSizeIterator for Iter<'_, T, N, A> {}

impl<T, const N: u32, A: Allocator> std::iter::FusedIterator for Iter<'_, T, N, A> {}

impl<T, const N: u32, A: Allocator> Clone for Iter<'_, T, N, A> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

// Safety: Iter only yields shared references
unsafe impl<T: Sync, const N: u32, A: Allocator + Sync> Sync for Iter<'_, T, N, A> {}
unsafe impl<T: Sync, const N: u32, A: Allocator + Sync> Send for Iter<'_, T, N, A> {}

/// An iterator over mutable references to elements of a `TieredVec`.
pub struct IterMut<'a, T, const N: u32 = 0, A: Allocator = Global> {
    vec: &'a mut TieredVec<T, N, A>,
    /// Current pointer within segment
    ptr: *mut T,
    /// End of the contiguous run starting at `ptr`
    segment_end: *mut T,
    /// Logical index of the next front element
    front: usize,
    /// Logical index one past the next back element
    back: usize,
}

impl<'a, T, const N: u32, A: Allocator> IterMut<'a, T, N, A> {
    pub(crate) fn new(vec: &'a mut TieredVec<T, N, A>) -> Self {
        let back = vec.len();
        Self {
            vec,
            ptr: std::ptr::null_mut(),
            segment_end: std::ptr::null_mut(),
            front: 0,
            back,
        }
    }

    #[cold]
    fn load_segment(&mut self) {
        let cap = TieredVec::<T, N, A>::SEGMENT_CAPACITY;
        let remaining = cap - (self.front & (cap - 1));
        unsafe {
            let base = self.vec.buf.ptr_at(self.front);
            self.ptr = base;
            self.segment_end = base.add(remaining);
        }
    }
}

impl<'a, T, const N: u32, A: Allocator> Iterator for IterMut<'a, T, N, A> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.ptr == self.segment_end {
            self.load_segment();
        }
        let result = self.ptr;
        self.ptr = unsafe { self.ptr.add(1) };
        self.front += 1;
        Some(unsafe { &mut *result })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, const N: u32, A: Allocator> DoubleEndedIterator for IterMut<'_, T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { &mut *self.vec.buf.ptr_at(self.back) })
    }
}

impl<T, const N: u32, A: Allocator> ExactSizeIterator for IterMut<'_, T, N, A> {}

impl<T, const N: u32, A: Allocator> std::iter::FusedIterator for IterMut<'_, T, N, A> {}

// Safety: IterMut yields exclusive references
unsafe impl<T: Send, const N: u32, A: Allocator + Send> Send for IterMut<'_, T, N, A> {}
unsafe impl<T: Sync, const N: u32, A: Allocator + Sync> Sync for IterMut<'_, T, N, A> {}
