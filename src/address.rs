//! Logical index to physical slot translation for `TieredVec`.
//!
//! Segment number `pos` (the logical index with the in-segment offset
//! shifted out) is decoded through `pos + 1`: its most significant bit `k`
//! names the superblock, which holds `2^floor(k/2)` blocks of
//! `2^ceil(k/2)` segments each. The bits right below the MSB select the
//! block inside the superblock and the low `ceil(k/2)` bits select the
//! segment inside that block.

/// Physical location of a slot: directory entry, segment within the block,
/// slot within the segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Address {
    pub(crate) block: usize,
    pub(crate) segment: usize,
    pub(crate) offset: usize,
}

impl Address {
    #[inline]
    const fn new(block: usize, segment: usize, offset: usize) -> Self {
        Self {
            block,
            segment,
            offset,
        }
    }
}

/// Resolves logical `index` for segments of `1 << exp` slots.
///
/// Pure arithmetic: no allocation and no bounds check. The caller must have
/// verified that `index` lies inside the allocated address range.
#[inline]
pub(crate) const fn locate(index: usize, exp: u32) -> Address {
    let offset = index & ((1usize << exp) - 1);
    let pos = index >> exp;

    // `pos + 1 <= 3` leaves the mask arithmetic below degenerate.
    match pos {
        0 => return Address::new(0, 0, offset),
        1 => return Address::new(1, 0, offset),
        2 => return Address::new(1, 1, offset),
        _ => {}
    }

    let pos = pos + 1;
    let k = pos.ilog2() as usize;
    let half = k >> 1;
    let odd = k & 1;

    let blocks_before_half = (1usize << half) - 1;
    // floor(k/2) bits right below the MSB.
    let block_mask = (blocks_before_half << half) << odd;
    // low ceil(k/2) bits.
    let segment_mask = ((1usize << half) << odd) - 1;

    let block_in_superblock = ((pos & block_mask) >> half) >> odd;
    let segment = pos & segment_mask;

    let first_block = (blocks_before_half << 1) + odd * (1usize << half);
    Address::new(first_block + block_in_superblock, segment, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays out superblocks explicitly and yields `(block, segment)` for
    /// every segment number in order.
    fn reference_layout(segments: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(segments);
        let mut block = 0;
        let mut k = 0u32;
        while out.len() < segments {
            let blocks = 1usize << (k / 2);
            let per_block = 1usize << k.div_ceil(2);
            for _ in 0..blocks {
                for seg in 0..per_block {
                    out.push((block, seg));
                }
                block += 1;
            }
            k += 1;
        }
        out.truncate(segments);
        out
    }

    #[test]
    fn test_base_cases() {
        assert_eq!(locate(0, 0), Address::new(0, 0, 0));
        assert_eq!(locate(1, 0), Address::new(1, 0, 0));
        assert_eq!(locate(2, 0), Address::new(1, 1, 0));
        assert_eq!(locate(3, 0), Address::new(2, 0, 0));
    }

    #[test]
    fn test_first_superblocks() {
        // superblock 2: blocks 2,3 of 2 segments
        assert_eq!(locate(4, 0), Address::new(2, 1, 0));
        assert_eq!(locate(5, 0), Address::new(3, 0, 0));
        assert_eq!(locate(6, 0), Address::new(3, 1, 0));
        // superblock 3: blocks 4,5 of 4 segments
        assert_eq!(locate(7, 0), Address::new(4, 0, 0));
        assert_eq!(locate(10, 0), Address::new(4, 3, 0));
        assert_eq!(locate(11, 0), Address::new(5, 0, 0));
        // superblock 4: blocks 6..10 of 4 segments
        assert_eq!(locate(15, 0), Address::new(6, 0, 0));
        assert_eq!(locate(30, 0), Address::new(9, 3, 0));
    }

    #[test]
    fn test_matches_reference_layout() {
        let layout = reference_layout(1 << 14);
        for (pos, &(block, segment)) in layout.iter().enumerate() {
            let addr = locate(pos, 0);
            assert_eq!((addr.block, addr.segment), (block, segment), "pos {}", pos);
            assert_eq!(addr.offset, 0);
        }
    }

    #[test]
    fn test_segment_offset() {
        // 4-slot segments
        assert_eq!(locate(0, 2), Address::new(0, 0, 0));
        assert_eq!(locate(3, 2), Address::new(0, 0, 3));
        assert_eq!(locate(4, 2), Address::new(1, 0, 0));
        assert_eq!(locate(9, 2), Address::new(1, 1, 1));
        assert_eq!(locate(12, 2), Address::new(2, 0, 0));

        let layout = reference_layout(512);
        for index in 0..(512 << 3) {
            let addr = locate(index, 3);
            let (block, segment) = layout[index >> 3];
            assert_eq!(addr, Address::new(block, segment, index & 7));
        }
    }
}
