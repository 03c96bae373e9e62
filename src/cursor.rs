//! Random-access cursors over a `TieredVec`.
//!
//! A cursor is a position plus a borrow of the vector. Positions are free
//! to leave `0..len`; only dereferencing checks bounds. Every access goes
//! through the same index decomposition as `TieredVec::get`.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use allocator_api2::alloc::{Allocator, Global};

use crate::TieredVec;

/// A read-only cursor over a `TieredVec`.
///
/// Two cursors are equal when they borrow the same vector and sit at the
/// same position. Subtracting cursors gives the signed distance between
/// them.
///
/// # Example
///
/// ```
/// use tiered_vec::TieredVec;
/// let vec: TieredVec<char> = ['a', 'b', 'c'].into_iter().collect();
/// let begin = vec.cursor_front();
/// assert_eq!((begin + 1).get(), Some(&'b'));
/// assert_eq!(vec.cursor_end() - begin, 3);
/// ```
pub struct Cursor<'a, T, const N: u32 = 0, A: Allocator = Global> {
    vec: &'a TieredVec<T, N, A>,
    index: usize,
}

impl<'a, T, const N: u32, A: Allocator> Cursor<'a, T, N, A> {
    #[inline]
    pub(crate) fn new(vec: &'a TieredVec<T, N, A>, index: usize) -> Self {
        Self { vec, index }
    }

    /// Returns the position of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the element under the cursor, or `None` outside `0..len`.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.vec.get(self.index)
    }

    /// Returns the element `offset` positions away from the cursor.
    #[inline]
    pub fn peek(&self, offset: isize) -> Option<&'a T> {
        self.vec.get(self.index.wrapping_add_signed(offset))
    }

    /// Moves the cursor to the next position.
    #[inline]
    pub fn move_next(&mut self) -> &mut Self {
        self.index = self.index.wrapping_add(1);
        self
    }

    /// Moves the cursor to the previous position.
    #[inline]
    pub fn move_prev(&mut self) -> &mut Self {
        self.index = self.index.wrapping_sub(1);
        self
    }

    /// Returns `true` if the cursor is at or past the end of the vector.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index >= self.vec.len()
    }

    /// Returns the signed distance from `origin` to `self`.
    #[inline]
    pub fn offset_from(&self, origin: &Self) -> isize {
        self.index.wrapping_sub(origin.index) as isize
    }
}

impl<T, const N: u32, A: Allocator> Clone for Cursor<'_, T, N, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: u32, A: Allocator> Copy for Cursor<'_, T, N, A> {}

impl<T, const N: u32, A: Allocator> PartialEq for Cursor<'_, T, N, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.vec, other.vec) && self.index == other.index
    }
}

impl<T, const N: u32, A: Allocator> Eq for Cursor<'_, T, N, A> {}

impl<T, const N: u32, A: Allocator> PartialOrd for Cursor<'_, T, N, A> {
    /// Cursors over different vectors are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if std::ptr::eq(self.vec, other.vec) {
            Some(self.offset_from(other).cmp(&0))
        } else {
            None
        }
    }
}

impl<T, const N: u32, A: Allocator> AddAssign<isize> for Cursor<'_, T, N, A> {
    #[inline]
    fn add_assign(&mut self, offset: isize) {
        self.index = self.index.wrapping_add_signed(offset);
    }
}

impl<T, const N: u32, A: Allocator> SubAssign<isize> for Cursor<'_, T, N, A> {
    #[inline]
    fn sub_assign(&mut self, offset: isize) {
        self.index = self.index.wrapping_add_signed(offset.wrapping_neg());
    }
}

impl<T, const N: u32, A: Allocator> Add<isize> for Cursor<'_, T, N, A> {
    type Output = Self;

    #[inline]
    fn add(mut self, offset: isize) -> Self {
        self += offset;
        self
    }
}

impl<T, const N: u32, A: Allocator> Sub<isize> for Cursor<'_, T, N, A> {
    type Output = Self;

    #[inline]
    fn sub(mut self, offset: isize) -> Self {
        self -= offset;
        self
    }
}

impl<'a, T, const N: u32, A: Allocator> Sub for Cursor<'a, T, N, A> {
    type Output = isize;

    #[inline]
    fn sub(self, origin: Self) -> isize {
        self.offset_from(&origin)
    }
}

impl<T, const N: u32, A: Allocator> std::fmt::Debug for Cursor<'_, T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.vec.len())
            .finish()
    }
}

/// A cursor that can mutate the elements it visits.
///
/// Converts into a read-only [`Cursor`] with `From`; there is no way back.
pub struct CursorMut<'a, T, const N: u32 = 0, A: Allocator = Global> {
    vec: &'a mut TieredVec<T, N, A>,
    index: usize,
}

impl<'a, T, const N: u32, A: Allocator> CursorMut<'a, T, N, A> {
    #[inline]
    pub(crate) fn new(vec: &'a mut TieredVec<T, N, A>, index: usize) -> Self {
        Self { vec, index }
    }

    /// Returns the position of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the element under the cursor, or `None` outside `0..len`.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.vec.get(self.index)
    }

    /// Returns the element under the cursor mutably.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.vec.get_mut(self.index)
    }

    /// Consumes the cursor, returning the element under it for the full borrow.
    #[inline]
    pub fn into_mut(self) -> Option<&'a mut T> {
        let Self { vec, index } = self;
        vec.get_mut(index)
    }

    /// Returns the element `offset` positions away from the cursor mutably.
    #[inline]
    pub fn peek_mut(&mut self, offset: isize) -> Option<&mut T> {
        self.vec.get_mut(self.index.wrapping_add_signed(offset))
    }

    /// Moves the cursor to the next position.
    #[inline]
    pub fn move_next(&mut self) -> &mut Self {
        self.index = self.index.wrapping_add(1);
        self
    }

    /// Moves the cursor to the previous position.
    #[inline]
    pub fn move_prev(&mut self) -> &mut Self {
        self.index = self.index.wrapping_sub(1);
        self
    }

    /// Returns `true` if the cursor is at or past the end of the vector.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index >= self.vec.len()
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    #[inline]
    pub fn as_cursor(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(&*self.vec, self.index)
    }
}

impl<'a, T, const N: u32, A: Allocator> From<CursorMut<'a, T, N, A>> for Cursor<'a, T, N, A> {
    fn from(cursor: CursorMut<'a, T, N, A>) -> Self {
        Cursor::new(cursor.vec, cursor.index)
    }
}

impl<T, const N: u32, A: Allocator> AddAssign<isize> for CursorMut<'_, T, N, A> {
    #[inline]
    fn add_assign(&mut self, offset: isize) {
        self.index = self.index.wrapping_add_signed(offset);
    }
}

impl<T, const N: u32, A: Allocator> SubAssign<isize> for CursorMut<'_, T, N, A> {
    #[inline]
    fn sub_assign(&mut self, offset: isize) {
        self.index = self.index.wrapping_add_signed(offset.wrapping_neg());
    }
}

impl<T, const N: u32, A: Allocator> Add<isize> for CursorMut<'_, T, N, A> {
    type Output = Self;

    #[inline]
    fn add(mut self, offset: isize) -> Self {
        self += offset;
        self
    }
}

impl<T, const N: u32, A: Allocator> Sub<isize> for CursorMut<'_, T, N, A> {
    type Output = Self;

    #[inline]
    fn sub(mut self, offset: isize) -> Self {
        self -= offset;
        self
    }
}

impl<T, const N: u32, A: Allocator> std::fmt::Debug for CursorMut<'_, T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index)
            .field("len", &self.vec.len())
            .finish()
    }
}
