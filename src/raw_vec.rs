//! Raw block allocation management for `TieredVec`.
//!
//! This module owns the directory: the ordered list of blocks, each a run
//! of `segments << N` uninitialized slots obtained from the allocator in a
//! single allocation. Like `RawVec` for `Vec`, it never tracks which slots
//! are live and never drops elements; `TieredVec` does that.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

use allocator_api2::alloc::{Allocator, Global};
use tracing::debug;

use crate::address::{locate, Address};
use crate::TryReserveError;

/// A single directory entry.
struct Block<T> {
    ptr: NonNull<T>,
    /// Number of segments in this block.
    segments: usize,
}

/// Directory of blocks that handles allocation without element management.
pub(crate) struct RawTieredVec<T, const N: u32, A: Allocator = Global> {
    blocks: Vec<Block<T>>,
    /// Total slots across all blocks
    slots: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, const N: u32, A: Allocator> RawTieredVec<T, N, A> {
    /// Slots per segment.
    pub(crate) const SEGMENT_CAP: usize = {
        assert!(N < 32, "segment exponent must be below 32");
        1 << N
    };

    /// Creates a directory holding a single one-segment block.
    ///
    /// # Panics
    ///
    /// Aborts through `handle_alloc_error` if the allocation fails.
    pub(crate) fn new_in(alloc: A) -> Self {
        let mut raw = Self {
            blocks: Vec::new(),
            slots: 0,
            alloc,
            _marker: PhantomData,
        };
        raw.push_block(1);
        raw
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of directory entries.
    #[inline]
    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the total number of allocated slots.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots
    }

    /// Returns the segment count of the directory entry at `block`.
    #[inline]
    pub(crate) fn block_segments(&self, block: usize) -> usize {
        self.blocks[block].segments
    }

    fn block_layout(segments: usize) -> Result<Layout, TryReserveError> {
        let slots = segments
            .checked_mul(Self::SEGMENT_CAP)
            .ok_or_else(TryReserveError::capacity_overflow)?;
        Layout::array::<T>(slots).map_err(|_| TryReserveError::capacity_overflow())
    }

    /// Appends a block of `segments` segments.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts through `handle_alloc_error`
    /// if the allocation fails.
    pub(crate) fn push_block(&mut self, segments: usize) {
        if let Err(err) = self.try_push_block(segments) {
            err.handle();
        }
    }

    /// Tries to append a block of `segments` segments.
    ///
    /// On error the directory is unchanged.
    pub(crate) fn try_push_block(&mut self, segments: usize) -> Result<(), TryReserveError> {
        let layout = Self::block_layout(segments)?;
        let ptr = self
            .alloc
            .allocate(layout)
            .map_err(|_| TryReserveError::alloc_error(layout))?
            .cast::<T>();

        debug!(block = self.blocks.len(), segments, "allocated block");
        self.blocks.push(Block { ptr, segments });
        self.slots += segments << N;
        Ok(())
    }

    /// Frees the trailing block.
    ///
    /// Does not drop elements - the caller must ensure the block holds no
    /// live slot.
    pub(crate) fn pop_block(&mut self) {
        if let Some(block) = self.blocks.pop() {
            debug!(
                block = self.blocks.len(),
                segments = block.segments,
                "released block"
            );
            self.slots -= block.segments << N;
            self.free(block);
        }
    }

    fn free(&self, block: Block<T>) {
        // The layout was valid when the block was allocated.
        if let Ok(layout) = Self::block_layout(block.segments) {
            unsafe {
                self.alloc.deallocate(block.ptr.cast::<u8>(), layout);
            }
        }
    }

    /// Returns a raw pointer to the slot at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must name an allocated slot.
    #[inline]
    pub(crate) unsafe fn slot(&self, addr: Address) -> *mut T {
        debug_assert!(addr.block < self.blocks.len());
        let block = self.blocks.get_unchecked(addr.block);
        debug_assert!(addr.segment < block.segments);
        debug_assert!(addr.offset < Self::SEGMENT_CAP);
        block.ptr.as_ptr().add((addr.segment << N) + addr.offset)
    }

    /// Returns a raw pointer to the slot holding logical `index`.
    ///
    /// # Safety
    ///
    /// `index` must be within the allocated address range.
    #[inline]
    pub(crate) unsafe fn ptr_at(&self, index: usize) -> *mut T {
        self.slot(locate(index, N))
    }

    /// Constructs `value` in the slot at `addr`.
    ///
    /// # Safety
    ///
    /// The slot must be allocated and empty; a live value there is leaked.
    #[inline]
    pub(crate) unsafe fn write(&mut self, addr: Address, value: T) -> &mut T {
        let slot = self.slot(addr);
        slot.write(value);
        &mut *slot
    }

    /// Moves the value out of the slot at `addr`, leaving it empty.
    ///
    /// # Safety
    ///
    /// The slot must be live; afterwards it must be treated as empty.
    #[inline]
    pub(crate) unsafe fn read(&mut self, addr: Address) -> T {
        self.slot(addr).read()
    }
}

impl<T, const N: u32, A: Allocator> Drop for RawTieredVec<T, N, A> {
    fn drop(&mut self) {
        // Only frees memory; `TieredVec` drops the live elements first.
        while let Some(block) = self.blocks.pop() {
            self.free(block);
        }
        self.slots = 0;
    }
}

// Safety: RawTieredVec owns its allocations and T determines thread safety
unsafe impl<T: Send, const N: u32, A: Allocator + Send> Send for RawTieredVec<T, N, A> {}
unsafe impl<T: Sync, const N: u32, A: Allocator + Sync> Sync for RawTieredVec<T, N, A> {}
