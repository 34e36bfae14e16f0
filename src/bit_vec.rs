//! Fixed-size list of bits.

use std::mem;
use std::ops::Index;

/// A fixed-size list of bits implemented using a `Vec<u64>`. Tracks the number of set bits.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bit_vec::BitVec;
///
/// let mut bv = BitVec::new(70);
///
/// assert!(bv.set(0));
/// assert!(bv.set(69));
/// assert!(!bv.set(69));
/// assert_eq!(bv.count_ones(), 2);
/// assert_eq!(bv.get(69), Some(true));
/// assert_eq!(bv.get(70), None);
///
/// bv.clear();
/// assert_eq!(bv.count_ones(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVec {
    blocks: Vec<u64>,
    len: usize,
    one_count: usize,
}

const BLOCK_BIT_COUNT: usize = mem::size_of::<u64>() * 8;

impl BitVec {
    fn get_block_count(len: usize) -> usize {
        (len + BLOCK_BIT_COUNT - 1) / BLOCK_BIT_COUNT
    }

    /// Constructs a new `BitVec` with `len` bits, all unset.
    pub fn new(len: usize) -> Self {
        BitVec {
            blocks: vec![0; Self::get_block_count(len)],
            len,
            one_count: 0,
        }
    }

    /// Sets the bit at `index`. Returns `true` if the bit was previously unset.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize) -> bool {
        assert!(index < self.len, "index out of bounds");
        let block = &mut self.blocks[index / BLOCK_BIT_COUNT];
        let mask = 1 << (index % BLOCK_BIT_COUNT);
        if *block & mask == 0 {
            *block |= mask;
            self.one_count += 1;
            true
        } else {
            false
        }
    }

    /// Returns the bit at `index`, or `None` if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let block = self.blocks[index / BLOCK_BIT_COUNT];
        Some(block >> (index % BLOCK_BIT_COUNT) & 1 == 1)
    }

    /// Unsets every bit.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            *block = 0;
        }
        self.one_count = 0;
    }

    /// Sets every bit that is set in `other`.
    ///
    /// # Panics
    ///
    /// Panics if the two `BitVec`s have different lengths.
    pub fn union(&mut self, other: &Self) {
        assert_eq!(self.len, other.len);
        for (block, other_block) in self.blocks.iter_mut().zip(&other.blocks) {
            *block |= *other_block;
        }
        self.one_count = self
            .blocks
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum();
    }

    /// Returns the number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the `BitVec` holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.one_count
    }

    /// Returns the number of unset bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.one_count
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl Index<usize> for BitVec {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        match self.get(index) {
            Some(true) => &TRUE,
            Some(false) => &FALSE,
            None => panic!("index out of bounds"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BitVec;

    #[test]
    fn test_new() {
        let bv = BitVec::new(130);
        assert_eq!(bv.len(), 130);
        assert_eq!(bv.blocks.len(), 3);
        assert_eq!(bv.count_zeros(), 130);
        assert!(!bv.is_empty());
        assert!(BitVec::new(0).is_empty());
    }

    #[test]
    fn test_set() {
        let mut bv = BitVec::new(130);
        assert!(bv.set(64));
        assert!(bv.set(129));
        assert!(!bv.set(64));
        assert!(bv[64]);
        assert!(!bv[63]);
        assert_eq!(bv.count_ones(), 2);
        assert_eq!(bv.count_zeros(), 128);
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_bounds() {
        let mut bv = BitVec::new(10);
        bv.set(10);
    }

    #[test]
    fn test_union() {
        let mut bv1 = BitVec::new(100);
        let mut bv2 = BitVec::new(100);
        bv1.set(1);
        bv1.set(2);
        bv2.set(2);
        bv2.set(99);

        bv1.union(&bv2);
        assert_eq!(bv1.count_ones(), 3);
        assert!(bv1[1] && bv1[2] && bv1[99]);
    }
}
