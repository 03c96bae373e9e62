//! PeekMut implementation for TieredVec.

use core::ops::{Deref, DerefMut};

use allocator_api2::alloc::{Allocator, Global};

use crate::TieredVec;

/// Structure wrapping a mutable reference to the last item in a
/// `TieredVec`.
///
/// This `struct` is created by the [`peek_mut`] method on [`TieredVec`]. See
/// its documentation for more.
///
/// [`peek_mut`]: TieredVec::peek_mut
pub struct PeekMut<'a, T, const N: u32 = 0, A: Allocator = Global> {
    vec: &'a mut TieredVec<T, N, A>,
}

impl<T: std::fmt::Debug, const N: u32, A: Allocator> std::fmt::Debug for PeekMut<'_, T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PeekMut").field(&**self).finish()
    }
}

impl<'a, T, const N: u32, A: Allocator> PeekMut<'a, T, N, A> {
    /// Creates a new `PeekMut` if the vector is non-empty.
    pub(crate) fn new(vec: &'a mut TieredVec<T, N, A>) -> Option<Self> {
        if vec.is_empty() {
            None
        } else {
            Some(Self { vec })
        }
    }

    /// Removes the peeked value from the vector and returns it.
    pub fn pop(this: Self) -> T {
        // Safety: PeekMut is only constructed if the vec is non-empty
        unsafe { this.vec.pop_unchecked() }
    }
}

impl<T, const N: u32, A: Allocator> Deref for PeekMut<'_, T, N, A> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Safety: PeekMut is only constructed if the vec is non-empty
        unsafe { &*self.vec.tail_ptr() }
    }
}

impl<T, const N: u32, A: Allocator> DerefMut for PeekMut<'_, T, N, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // Safety: PeekMut is only constructed if the vec is non-empty
        unsafe { &mut *self.vec.tail_ptr() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_mut_crosses_segment() {
        let mut vec: TieredVec<i32> = (0..4).collect();
        {
            let mut top = vec.peek_mut().unwrap();
            *top = 30;
            assert_eq!(format!("{:?}", top), "PeekMut(30)");
            assert_eq!(PeekMut::pop(top), 30);
        }
        assert_eq!(vec.back(), Some(&2));
        assert_eq!(vec.len(), 3);
    }

    #[test]
    fn test_peek_mut_empty() {
        let mut vec: TieredVec<i32> = TieredVec::new();
        assert!(vec.peek_mut().is_none());
    }
}
