//! A tiered growable vector with stable element addresses.
//!
//! Unlike `Vec`, pushing new elements never moves existing ones. Elements
//! live in fixed-size segments of `1 << N` slots; segments are grouped into
//! blocks whose size and count double on alternating growth steps, so the
//! memory held beyond the live elements stays within `O(sqrt n)` while
//! indexing remains a constant-time bit decomposition.
//!
//! # Example
//!
//! ```
//! use tiered_vec::TieredVec;
//!
//! let mut vec: TieredVec<i32> = TieredVec::new();
//! vec.push(1).push(2);
//!
//! // Get a pointer to the first element
//! let ptr = &vec[0] as *const i32;
//!
//! // Push more elements - the pointer remains valid!
//! for i in 3..100 {
//!     vec.push(i);
//! }
//!
//! assert_eq!(unsafe { *ptr }, 1);
//! assert_eq!(vec.pop(), Some(99));
//! assert_eq!(vec.get(1000), None);
//! ```

mod address;
mod cursor;
mod into_iter;
mod iter;
mod peek_mut;
mod raw_vec;
mod schedule;

pub use cursor::{Cursor, CursorMut};
pub use into_iter::IntoIter;
pub use iter::{Iter, IterMut};
pub use peek_mut::PeekMut;

use address::Address;
use allocator_api2::alloc::{Allocator, Global};
use raw_vec::RawTieredVec;
use schedule::{Growth, Schedule, Shrink};
use std::alloc::Layout;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use thiserror::Error;

/// The error type for `try_push`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{kind}")]
pub struct TryReserveError {
    kind: TryReserveErrorKind,
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
enum TryReserveErrorKind {
    /// The block size computation overflowed.
    #[error("memory allocation failed due to capacity overflow")]
    CapacityOverflow,
    /// Memory allocation failed.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError { layout: Layout },
}

impl TryReserveError {
    pub(crate) fn capacity_overflow() -> Self {
        Self {
            kind: TryReserveErrorKind::CapacityOverflow,
        }
    }

    pub(crate) fn alloc_error(layout: Layout) -> Self {
        Self {
            kind: TryReserveErrorKind::AllocError { layout },
        }
    }

    /// Returns the layout of the failed allocation, if the allocator was reached.
    pub fn layout(&self) -> Option<Layout> {
        match self.kind {
            TryReserveErrorKind::CapacityOverflow => None,
            TryReserveErrorKind::AllocError { layout } => Some(layout),
        }
    }

    /// Escalates the error the way the infallible paths of `Vec` do.
    #[cold]
    pub(crate) fn handle(self) -> ! {
        match self.kind {
            TryReserveErrorKind::CapacityOverflow => panic!("capacity overflow"),
            TryReserveErrorKind::AllocError { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

/// A tiered vector with stable pointers.
///
/// `N` is the segment exponent: every segment holds `1 << N` elements.
///
/// # Memory Layout
///
/// The directory is a list of blocks, each an array of segments allocated
/// at once. Blocks are grouped into superblocks: superblock `k` has
/// `2^floor(k/2)` blocks of `2^ceil(k/2)` segments. A block emptied by
/// `pop` is held for one more growth step before it is freed, so pushing
/// and popping across a block boundary does not thrash the allocator.
pub struct TieredVec<T, const N: u32 = 0, A: Allocator = Global> {
    /// Block directory
    pub(crate) buf: RawTieredVec<T, N, A>,
    /// Segment-level growth bookkeeping
    schedule: Schedule,
    /// Live slots in the tail segment
    segment_fill: usize,
    /// Marker for drop check
    _marker: PhantomData<T>,
}

impl<T, const N: u32> TieredVec<T, N> {
    /// Creates a new empty `TieredVec`.
    ///
    /// Allocates the first one-segment block.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    /// let vec: TieredVec<i32> = TieredVec::new();
    /// assert!(vec.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

// Core implementation
impl<T, const N: u32, A: Allocator> TieredVec<T, N, A> {
    /// Elements per segment.
    pub const SEGMENT_CAPACITY: usize = RawTieredVec::<T, N, A>::SEGMENT_CAP;

    /// Creates a new empty `TieredVec` that allocates from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self {
            buf: RawTieredVec::new_in(alloc),
            schedule: Schedule::new(),
            segment_fill: Self::SEGMENT_CAPACITY,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns the number of elements in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        match self.schedule.segments() {
            0 => 0,
            segments => ((segments - 1) << N) + self.segment_fill,
        }
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.schedule.segments() == 0
    }

    /// Returns the number of slots currently allocated, spare block included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the number of allocated blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.buf.block_count()
    }

    /// Address of the last live slot.
    #[inline]
    fn tail(&self) -> Address {
        debug_assert!(!self.is_empty());
        Address {
            block: self.schedule.depth() - 1,
            segment: self.schedule.block_fill() - 1,
            offset: self.segment_fill - 1,
        }
    }

    /// Pointer to the last element, found from the counters alone.
    ///
    /// # Safety
    ///
    /// The vector must not be empty.
    #[inline]
    pub(crate) unsafe fn tail_ptr(&self) -> *mut T {
        self.buf.slot(self.tail())
    }

    /// Resolves `index` to its slot if it is in bounds.
    #[inline]
    fn slot_ptr(&self, index: usize) -> Option<*mut T> {
        if index < self.len() {
            Some(unsafe { self.buf.ptr_at(index) })
        } else {
            None
        }
    }

    /// Appends an element to the back of the vector.
    ///
    /// Returns the vector so pushes can be chained.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts if allocation fails.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    /// let mut vec: TieredVec<i32> = TieredVec::new();
    /// vec.push(1).push(2).push(3);
    /// assert_eq!(vec.len(), 3);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) -> &mut Self {
        if let Err(err) = self.reserve_slot() {
            err.handle();
        }
        unsafe {
            self.buf.write(self.tail(), value);
        }
        self
    }

    /// Appends an element, reporting allocation failure instead of aborting.
    ///
    /// On error the vector is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<&mut Self, TryReserveError> {
        self.reserve_slot()?;
        unsafe {
            self.buf.write(self.tail(), value);
        }
        Ok(self)
    }

    /// Makes room for one more element at the tail.
    #[inline]
    fn reserve_slot(&mut self) -> Result<(), TryReserveError> {
        if self.segment_fill < Self::SEGMENT_CAPACITY {
            self.segment_fill += 1;
            Ok(())
        } else {
            self.open_segment()
        }
    }

    #[cold]
    #[inline(never)]
    fn open_segment(&mut self) -> Result<(), TryReserveError> {
        let pending = self.schedule.pending_allocation();
        if let Some(segments) = pending {
            self.buf.try_push_block(segments)?;
        }
        let growth = self.schedule.grow();
        debug_assert_eq!(growth == Growth::Opened, pending.is_some());
        debug_assert!(pending.map_or(true, |segments| segments == self.schedule.block_capacity()));
        debug_assert_eq!(self.buf.block_count(), self.schedule.held_blocks());
        self.segment_fill = 1;
        Ok(())
    }

    /// Removes the last element from the vector and returns it, or `None` if empty.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    /// let mut vec: TieredVec<i32> = TieredVec::new();
    /// vec.push(1).push(2);
    /// assert_eq!(vec.pop(), Some(2));
    /// assert_eq!(vec.pop(), Some(1));
    /// assert_eq!(vec.pop(), None);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(unsafe { self.pop_unchecked() })
        }
    }

    /// Moves the last element out and releases its slot.
    ///
    /// # Safety
    ///
    /// The vector must not be empty.
    #[inline]
    pub(crate) unsafe fn pop_unchecked(&mut self) -> T {
        let value = self.buf.read(self.tail());
        self.segment_fill -= 1;
        if self.segment_fill == 0 {
            self.close_segment();
        }
        value
    }

    #[cold]
    #[inline(never)]
    fn close_segment(&mut self) {
        if self.schedule.shrink() == Shrink::Release {
            self.buf.pop_block();
        }
        debug_assert_eq!(self.buf.block_count(), self.schedule.held_blocks());
        self.segment_fill = Self::SEGMENT_CAPACITY;
    }

    /// Returns a reference to the element at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slot_ptr(index).map(|ptr| unsafe { &*ptr })
    }

    /// Returns a mutable reference to the element at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slot_ptr(index).map(|ptr| unsafe { &mut *ptr })
    }

    /// Consumes the vector and returns the element at the given index.
    ///
    /// Every other element is dropped. Returns `None` if the index is out
    /// of bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::TieredVec;
    /// let vec: TieredVec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    /// assert_eq!(vec.into_element(1), Some("b".to_string()));
    /// ```
    pub fn into_element(self, index: usize) -> Option<T> {
        self.into_iter().nth(index)
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a mutable reference to the first element, or `None` if empty.
    #[inline]
    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns a reference to the last element, or `None` if empty.
    ///
    /// Reads the tail position straight from the growth counters.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            Some(unsafe { &*self.tail_ptr() })
        }
    }

    /// Returns a mutable reference to the last element, or `None` if empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            None
        } else {
            Some(unsafe { &mut *self.tail_ptr() })
        }
    }

    /// Returns a guard over the last element that can also pop it, or
    /// `None` if the vector is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use tiered_vec::{PeekMut, TieredVec};
    /// let mut vec: TieredVec<i32> = TieredVec::new();
    /// vec.push(1).push(2);
    /// if let Some(mut top) = vec.peek_mut() {
    ///     *top += 10;
    ///     assert_eq!(PeekMut::pop(top), 12);
    /// }
    /// assert_eq!(vec.len(), 1);
    /// ```
    pub fn peek_mut(&mut self) -> Option<PeekMut<'_, T, N, A>> {
        PeekMut::new(self)
    }

    /// Clears the vector, removing all elements.
    ///
    /// Elements are popped from the back, so all blocks but the first are freed.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    /// Shortens the vector, keeping the first `len` elements and dropping the rest.
    pub fn truncate(&mut self, len: usize) {
        while self.len() > len {
            self.pop();
        }
    }

    /// Forgets every element without dropping it and returns to the
    /// initial one-block layout.
    ///
    /// # Safety
    ///
    /// All elements must already have been moved out or dropped.
    pub(crate) unsafe fn forget_elements(&mut self) {
        while self.buf.block_count() > 1 {
            self.buf.pop_block();
        }
        self.schedule = Schedule::new();
        self.segment_fill = Self::SEGMENT_CAPACITY;
    }

    /// Returns an iterator over references to the elements.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N, A> {
        Iter::new(self)
    }

    /// Returns an iterator over mutable references to the elements.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N, A> {
        IterMut::new(self)
    }

    /// Returns a cursor at the first element.
    #[inline]
    pub fn cursor_front(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, 0)
    }

    /// Returns a cursor one past the last element.
    #[inline]
    pub fn cursor_end(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, self.len())
    }

    /// Returns a cursor at `index`.
    #[inline]
    pub fn cursor_at(&self, index: usize) -> Cursor<'_, T, N, A> {
        Cursor::new(self, index)
    }

    /// Returns a mutable cursor at the first element.
    #[inline]
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, N, A> {
        CursorMut::new(self, 0)
    }

    /// Returns a mutable cursor at `index`.
    #[inline]
    pub fn cursor_at_mut(&mut self, index: usize) -> CursorMut<'_, T, N, A> {
        CursorMut::new(self, index)
    }

    /// Read a value from an index without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()` and the slot must be treated
    /// as empty afterwards.
    #[inline]
    pub(crate) unsafe fn unchecked_read(&self, index: usize) -> T {
        self.buf.ptr_at(index).read()
    }

    /// Drop the element at an index in place.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()` and the slot must be treated
    /// as empty afterwards.
    #[inline]
    pub(crate) unsafe fn unchecked_drop(&mut self, index: usize) {
        std::ptr::drop_in_place(self.buf.ptr_at(index));
    }
}

impl<T, const N: u32, A: Allocator> TieredVec<T, N, A> {
    /// Drops every live element in place, segment by segment.
    fn drop_elements(&mut self) {
        if !std::mem::needs_drop::<T>() {
            return;
        }
        let depth = self.schedule.depth();
        for block in 0..depth {
            let segments = if block + 1 == depth {
                self.schedule.block_fill()
            } else {
                self.buf.block_segments(block)
            };
            for segment in 0..segments {
                let live = if block + 1 == depth && segment + 1 == segments {
                    self.segment_fill
                } else {
                    Self::SEGMENT_CAPACITY
                };
                unsafe {
                    let base = self.buf.slot(Address {
                        block,
                        segment,
                        offset: 0,
                    });
                    std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(base, live));
                }
            }
        }
    }
}

// Trait implementations
impl<T, const N: u32, A: Allocator> Drop for TieredVec<T, N, A> {
    fn drop(&mut self) {
        self.drop_elements();
        // RawTieredVec will be dropped automatically and free the memory
    }
}

impl<T: Clone, const N: u32, A: Allocator + Clone> Clone for TieredVec<T, N, A> {
    fn clone(&self) -> Self {
        let mut vec = Self::new_in(self.allocator().clone());
        vec.extend(self.iter().cloned());
        vec
    }
}

impl<T: PartialEq, const N: u32, A: Allocator> PartialEq for TieredVec<T, N, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const N: u32, A: Allocator> Eq for TieredVec<T, N, A> {}

impl<T: PartialOrd, const N: u32, A: Allocator> PartialOrd for TieredVec<T, N, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, const N: u32, A: Allocator> Ord for TieredVec<T, N, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: std::hash::Hash, const N: u32, A: Allocator> std::hash::Hash for TieredVec<T, N, A> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T: std::fmt::Debug, const N: u32, A: Allocator> std::fmt::Debug for TieredVec<T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: u32> Default for TieredVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: u32, A: Allocator> Index<usize> for TieredVec<T, N, A> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.len(),
                index
            ),
        }
    }
}

impl<T, const N: u32, A: Allocator> IndexMut<usize> for TieredVec<T, N, A> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len();
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!(
                "index out of bounds: the len is {} but the index is {}",
                len, index
            ),
        }
    }
}

impl<T, const N: u32, A: Allocator> Extend<T> for TieredVec<T, N, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Clone + 'a, const N: u32, A: Allocator> Extend<&'a T> for TieredVec<T, N, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item.clone());
        }
    }
}

impl<T, const N: u32> FromIterator<T> for TieredVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T, const N: u32, A: Allocator> IntoIterator for TieredVec<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, const N: u32, A: Allocator> IntoIterator for &'a TieredVec<T, N, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: u32, A: Allocator> IntoIterator for &'a mut TieredVec<T, N, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
