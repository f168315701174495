// Copyright (c) 2020 Helge Wrede, Alexander Schultheiß, Lukas Simon
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Bit array backing the filter.
use std::fmt::Debug;

use crate::error::Error;

/// A packed, fixed-capacity bit array.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8`, least significant bit
/// first. The array is zeroed on construction and never grows or shrinks.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVec {
    bytes: Vec<u8>,
    nbits: usize,
}

impl BitVec {
    /// Allocate a zeroed bit array holding `capacity` bits.
    ///
    /// Exactly `ceil(capacity / 8)` bytes are reserved. Running out of memory
    /// is reported as [`Error::Alloc`] instead of aborting the process.
    pub fn try_new(capacity: usize) -> Result<Self, Error> {
        let byte_length = capacity / 8 + usize::from(capacity % 8 != 0);
        let mut bytes = Vec::new();

        bytes
            .try_reserve_exact(byte_length)
            .map_err(|source| Error::Alloc {
                what: "bit array",
                source,
            })?;
        bytes.resize(byte_length, 0);

        Ok(Self {
            nbits: capacity,
            bytes,
        })
    }

    /// Get the length in bits of the vector.
    pub fn len(&self) -> usize {
        self.nbits
    }

    /// Check whether this vector is empty, ie. has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Size of the backing storage, in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Set a single bit to `1`.
    pub fn set(&mut self, index: usize) {
        let (byte_index, mask) = self.locate(index);

        self.bytes[byte_index] |= mask;
    }

    /// Check whether a bit is set.
    pub fn is_set(&self, index: usize) -> bool {
        let (byte_index, mask) = self.locate(index);

        self.bytes[byte_index] & mask == mask
    }

    /// Count the number of `1` bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Count the number of `0` bits.
    pub fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    fn locate(&self, index: usize) -> (usize, u8) {
        if index >= self.len() {
            panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.len(),
                index,
            )
        }
        (index / 8, 0x01 << (index % 8))
    }
}

impl Debug for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Filters reach hundreds of millions of bits; only print small ones in full.
        if self.nbits > 64 {
            return f
                .debug_struct("BitVec")
                .field("len", &self.nbits)
                .field("ones", &self.count_ones())
                .finish();
        }
        let bits: String = (0..self.nbits)
            .map(|i| if self.is_set(i) { '1' } else { '0' })
            .collect();
        write!(f, "BitVec({})", bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitvec_with_length() {
        let bitvec = BitVec::try_new(1).unwrap();
        assert_eq!(1, bitvec.len());
        assert_eq!(1, bitvec.byte_len());

        let bitvec = BitVec::try_new(8).unwrap();
        assert_eq!(8, bitvec.len());
        assert_eq!(1, bitvec.byte_len());

        let bitvec = BitVec::try_new(9).unwrap();
        assert_eq!(9, bitvec.len());
        assert_eq!(2, bitvec.byte_len());

        let bitvec = BitVec::try_new(0).unwrap();
        assert!(bitvec.is_empty());
        assert_eq!(0, bitvec.byte_len());
    }

    #[test]
    fn huge_allocation_is_an_error() {
        let err = BitVec::try_new(usize::MAX).unwrap_err();
        assert!(err.is_exhaustion());
    }

    #[test]
    fn set_last_bit_only() {
        let mut bitvec = BitVec::try_new(9).unwrap();
        bitvec.set(8);
        for i in 0..8 {
            assert_eq!(false, bitvec.is_set(i));
        }
        assert_eq!(true, bitvec.is_set(8));
        assert_eq!(0x01, bitvec.bytes[1]);
    }

    #[test]
    fn bit_layout_is_lsb_first() {
        let mut bitvec = BitVec::try_new(16).unwrap();
        bitvec.set(0);
        bitvec.set(7);
        bitvec.set(10);
        assert_eq!(vec![0b1000_0001u8, 0b0000_0100], bitvec.bytes);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn must_set_with_correct_index() {
        BitVec::try_new(5).unwrap().set(5);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn must_get_with_correct_index() {
        BitVec::try_new(12).unwrap().is_set(12);
    }

    #[test]
    fn set_is_idempotent() {
        let mut bitvec = BitVec::try_new(24).unwrap();
        bitvec.set(3);
        bitvec.set(3);
        assert_eq!(1, bitvec.count_ones());
        assert_eq!(23, bitvec.count_zeros());
    }

    #[test]
    fn set_each_bit_one_by_one() {
        let mut bitvec = BitVec::try_new(9).unwrap();
        assert_eq!(0, bitvec.count_ones());
        assert_eq!(9, bitvec.count_zeros());

        for i in 0..9 {
            bitvec.set(i);
            assert_eq!(true, bitvec.is_set(i));
            assert_eq!(i + 1, bitvec.count_ones());
            assert_eq!(8 - i, bitvec.count_zeros());
        }
    }

    #[test]
    fn debug_output() {
        let mut bitvec = BitVec::try_new(4).unwrap();
        bitvec.set(1);
        assert_eq!("BitVec(0100)", format!("{:?}", bitvec));

        let bitvec = BitVec::try_new(1000).unwrap();
        assert_eq!("BitVec { len: 1000, ones: 0 }", format!("{:?}", bitvec));
    }
}
