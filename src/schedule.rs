//! Growth and shrink bookkeeping for `TieredVec`.
//!
//! The schedule counts whole segments. It decides when the next segment
//! needs a new directory entry and which capacity that block gets, and
//! when an emptied trailing block may be released. It never touches
//! memory itself: the owner allocates the block reported by
//! [`Schedule::pending_allocation`] before calling [`Schedule::grow`], and
//! releases the trailing block whenever [`Schedule::shrink`] returns
//! [`Shrink::Release`].
//!
//! Block capacity and blocks-per-superblock double on alternating steps,
//! so both stay within a factor of two of `sqrt(segments)`.

/// What a call to [`Schedule::grow`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Growth {
    /// The new segment lives in the current block.
    Within,
    /// A new block was opened by reusing the held spare.
    Reused,
    /// A new block was opened; it must already have been allocated.
    Opened,
}

/// What a call to [`Schedule::shrink`] asks of the directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shrink {
    Keep,
    /// Free the trailing (spare) block.
    Release,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Schedule {
    /// Segments in use.
    segments: usize,
    /// Blocks in use.
    depth: usize,
    /// Growth step; odd steps double `tier_cap`, even ones `block_cap`.
    step: usize,
    /// Segments used in the active block.
    block_fill: usize,
    /// Segment capacity of blocks in the active superblock.
    block_cap: usize,
    /// Blocks used in the active superblock.
    tier_fill: usize,
    /// Block capacity of the active superblock.
    tier_cap: usize,
    /// The last directory entry is an empty block held for reuse.
    spare: bool,
}

impl Schedule {
    /// The state of an empty vector: one block of one segment, held as spare.
    pub(crate) const fn new() -> Self {
        Self {
            segments: 0,
            depth: 0,
            step: 1,
            block_fill: 1,
            block_cap: 1,
            tier_fill: 0,
            tier_cap: 1,
            spare: true,
        }
    }

    #[inline]
    pub(crate) const fn segments(&self) -> usize {
        self.segments
    }

    #[inline]
    pub(crate) const fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub(crate) const fn block_fill(&self) -> usize {
        self.block_fill
    }

    #[inline]
    pub(crate) const fn block_capacity(&self) -> usize {
        self.block_cap
    }

    #[cfg(test)]
    pub(crate) const fn has_spare(&self) -> bool {
        self.spare
    }

    /// Number of directory entries the owner must hold.
    #[inline]
    pub(crate) const fn held_blocks(&self) -> usize {
        self.depth + self.spare as usize
    }

    /// Segment capacity of the block the next [`grow`](Self::grow) needs
    /// freshly allocated, if any.
    #[inline]
    pub(crate) const fn pending_allocation(&self) -> Option<usize> {
        if self.block_fill != self.block_cap || self.spare {
            return None;
        }
        if self.tier_fill == self.tier_cap && (self.step + 1) & 1 == 0 {
            Some(self.block_cap << 1)
        } else {
            Some(self.block_cap)
        }
    }

    /// Accounts for one more segment.
    pub(crate) fn grow(&mut self) -> Growth {
        let mut growth = Growth::Within;
        if self.block_fill == self.block_cap {
            if self.tier_fill == self.tier_cap {
                self.step += 1;
                if self.step & 1 == 1 {
                    self.tier_cap <<= 1;
                } else {
                    self.block_cap <<= 1;
                }
                self.tier_fill = 0;
            }
            growth = if self.spare {
                Growth::Reused
            } else {
                Growth::Opened
            };
            self.spare = false;
            self.depth += 1;
            self.tier_fill += 1;
            self.block_fill = 0;
        }
        self.segments += 1;
        self.block_fill += 1;
        growth
    }

    /// Accounts for one segment less.
    ///
    /// An emptied block is kept as spare; a spare still held from an earlier
    /// step is released at that point.
    pub(crate) fn shrink(&mut self) -> Shrink {
        debug_assert!(self.segments > 0, "shrink on an empty schedule");
        let mut shrink = Shrink::Keep;
        self.segments -= 1;
        self.block_fill -= 1;
        if self.block_fill == 0 {
            if self.spare {
                shrink = Shrink::Release;
            }
            self.depth -= 1;
            self.tier_fill -= 1;
            if self.tier_fill == 0 {
                self.step -= 1;
                if self.step & 1 == 0 {
                    self.tier_cap >>= 1;
                } else {
                    self.block_cap >>= 1;
                }
                self.tier_fill = self.tier_cap;
            }
            self.block_fill = self.block_cap;
            self.spare = true;
        }
        if self.segments == 0 {
            *self = Self::new();
        }
        shrink
    }
}
