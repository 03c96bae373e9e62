//! Owning iterator for `TieredVec`.

use allocator_api2::alloc::{Allocator, Global};

use crate::TieredVec;

/// An owning iterator over elements of a `TieredVec`.
///
/// This struct is created by the `into_iter` method on `TieredVec`
/// (provided by the [`IntoIterator`] trait).
pub struct IntoIter<T, const N: u32 = 0, A: Allocator = Global> {
    vec: TieredVec<T, N, A>,
    /// Elements before `index` have been moved out
    index: usize,
}

impl<T, const N: u32, A: Allocator> IntoIter<T, N, A> {
    /// Creates a new owning iterator from a `TieredVec`.
    #[inline]
    pub fn new(vec: TieredVec<T, N, A>) -> Self {
        Self { vec, index: 0 }
    }
}

impl<T, const N: u32, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vec.len() {
            return None;
        }
        // Safety: index < len, so the element exists and is initialized
        let value = unsafe { self.vec.unchecked_read(self.index) };
        self.index += 1;
        Some(value)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let skip = n.min(self.vec.len() - self.index);
        let start = self.index;
        // Advance first so a panicking drop cannot cause a double drop.
        self.index += skip;
        if std::mem::needs_drop::<T>() {
            for i in start..start + skip {
                unsafe { self.vec.unchecked_drop(i) };
            }
        }
        self.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vec.len() - self.index;
        (remaining, Some(remaining))
    }

    #[inline]
    fn count(self) -> usize {
        self.vec.len() - self.index
    }
}

impl<T, const N: u32, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.vec.len() {
            return None;
        }
        self.vec.pop()
    }
}

impl<T, const N: u32, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: u32, A: Allocator> std::iter::FusedIterator for IntoIter<T, N, A> {}

impl<T, const N: u32, A: Allocator> Drop for IntoIter<T, N, A> {
    fn drop(&mut self) {
        // Drop remaining elements that weren't consumed
        while self.vec.len() > self.index {
            self.vec.pop();
        }
        // Safety: everything before `index` was moved out
        unsafe { self.vec.forget_elements() };
    }
}

impl<T: Clone, const N: u32, A: Allocator + Clone> Clone for IntoIter<T, N, A> {
    fn clone(&self) -> Self {
        // Create a new vec with the remaining elements
        let mut vec = TieredVec::new_in(self.vec.allocator().clone());
        for i in self.index..self.vec.len() {
            if let Some(item) = self.vec.get(i) {
                vec.push(item.clone());
            }
        }
        IntoIter { vec, index: 0 }
    }
}

impl<T: std::fmt::Debug, const N: u32, A: Allocator> std::fmt::Debug for IntoIter<T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntoIter")
            .field("remaining", &(self.vec.len() - self.index))
            .finish()
    }
}
