// Copyright (c) 2018 Aleksandr Bezobchuk
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! A Bloom filter over byte strings with `k` independently seeded hashes.

use std::f64;

use crate::bitvec::BitVec;
use crate::error::Error;
use crate::hash;

/// `ln` squared.
const LN_SQR: f64 = f64::consts::LN_2 * f64::consts::LN_2;

/// Largest bit count every index of which a 32-bit digest can reach.
const MAX_ADDRESSABLE_BITS: u64 = 1 << 32;

/// A Bloom filter of `m` bits probed by `k` hashes per item.
///
/// Both parameters are fixed at construction. Bits only ever go from `0` to
/// `1`, so an inserted item is never reported absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    bits: BitVec,
    nhashes: u32,
}

impl BloomFilter {
    /// Return a new, empty Bloom filter of `nbits` bits using `nhashes` hashes.
    ///
    /// Fails with [`Error::InvalidParameters`] if either value is zero, and with
    /// [`Error::Alloc`] if the bit array cannot be allocated.
    pub fn new(nbits: usize, nhashes: u32) -> Result<Self, Error> {
        if nbits == 0 {
            return Err(Error::InvalidParameters("bit array size must be positive"));
        }
        if nhashes == 0 {
            return Err(Error::InvalidParameters("hash count must be positive"));
        }
        if nbits as u64 > MAX_ADDRESSABLE_BITS {
            tracing::warn!(
                bits = nbits,
                "Bit array is larger than a 32-bit digest can address; upper bits stay unused"
            );
        }
        let bits = BitVec::try_new(nbits)?;

        tracing::debug!(
            bits = nbits,
            hashes = nhashes,
            bytes = bits.byte_len(),
            "Allocated Bloom filter"
        );

        Ok(Self { bits, nhashes })
    }

    /// Return a new Bloom filter sized for `capacity` items at the given
    /// false positive rate.
    pub fn with_rate(capacity: usize, fp_rate: f64) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidParameters("capacity must be positive"));
        }
        if !(fp_rate > 0. && fp_rate < 1.) {
            return Err(Error::InvalidParameters(
                "false positive rate must be between 0 and 1",
            ));
        }
        let nbits = optimal_bits(capacity, fp_rate);
        let nhashes = optimal_hashes(nbits, capacity);

        Self::new(nbits, nhashes)
    }

    /// Set an item in the Bloom filter. This operation is idempotent with regards
    /// to each unique item.
    pub fn insert(&mut self, item: impl AsRef<[u8]>) {
        let item = item.as_ref();

        for seed in 0..self.nhashes {
            let index = self.index(item, seed);
            self.bits.set(index);
        }
    }

    /// Return whether or not a given item is likely in the Bloom filter or not. There is a
    /// possibility for a false positive, but a false negative will never occur.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let item = item.as_ref();

        (0..self.nhashes).all(|seed| self.bits.is_set(self.index(item, seed)))
    }

    /// Return the number of bits in this filter (`m`).
    pub fn bits(&self) -> usize {
        self.bits.len()
    }

    /// Number of hashes used (`k` parameter).
    pub fn hashes(&self) -> u32 {
        self.nhashes
    }

    /// Number of bits currently set to `1`.
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Count the approximate number of distinct items in the filter.
    pub fn count(&self) -> usize {
        let nbits = self.bits.len() as f64;
        let nbits_set = self.bits.count_ones() as f64;
        let nhashes = self.nhashes as f64;
        let count = -(nbits / nhashes) * (1. - (nbits_set / nbits)).ln();

        count.round() as usize
    }

    /// Expected false positive rate after `items` distinct insertions.
    pub fn expected_false_positive_rate(&self, items: usize) -> f64 {
        false_positive_rate(self.bits(), items, self.nhashes)
    }

    fn index(&self, item: &[u8], seed: u32) -> usize {
        (hash::digest(item, seed) as u64 % self.bits.len() as u64) as usize
    }
}

/// Return the optimal bit vector size for a Bloom filter given an approximate
/// size and a desired false positive rate.
pub fn optimal_bits(capacity: usize, fp_rate: f64) -> usize {
    (-((fp_rate.ln() * (capacity as f64)) / LN_SQR)).ceil() as usize
}

/// Return the optimal number of hash functions for a Bloom filter given a
/// bit vector size and an approximate set size. Never less than one.
///
/// Also called `k`.
pub fn optimal_hashes(nbits: usize, capacity: usize) -> u32 {
    let k = ((nbits as f64 / capacity.max(1) as f64) * f64::consts::LN_2).round() as u32;
    k.max(1)
}

/// Probability that a never-inserted item is reported present, given `nbits`
/// bits, `items` distinct insertions and `nhashes` hashes:
/// `(1 - e^(-kn/m))^k`.
pub fn false_positive_rate(nbits: usize, items: usize, nhashes: u32) -> f64 {
    let k = nhashes as f64;
    let exponent = -k * items as f64 / nbits as f64;

    (1. - exponent.exp()).powf(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::iter;

    fn key() -> String {
        let rng = fastrand::Rng::new();
        iter::repeat_with(|| rng.alphanumeric()).take(32).collect()
    }

    fn items(size: usize) -> Vec<String> {
        let mut items = HashSet::<String>::new();
        while items.len() < size {
            items.insert(key());
        }
        items.into_iter().collect()
    }

    #[test]
    fn test_bloom_filter() {
        let n = 1024;
        let items = items(n);
        let mut bf = BloomFilter::with_rate(items.len(), 0.01).unwrap();

        // Test inclusion.
        for item in items.iter() {
            bf.insert(item);

            assert_eq!(
                bf.contains(item),
                true,
                "item {} should result in a positive inclusion",
                item,
            );
        }

        // Test false negatives.
        for item in items.iter() {
            assert_eq!(bf.contains(item), true, "item {} resulted in a false negative", item);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            BloomFilter::new(0, 4),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            BloomFilter::new(1024, 0),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            BloomFilter::with_rate(0, 0.01),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            BloomFilter::with_rate(10, 1.5),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_allocation_failure() {
        let err = BloomFilter::new(usize::MAX, 4).unwrap_err();
        assert!(err.is_exhaustion(), "{}", err);
    }

    #[test]
    fn test_small_scenario() {
        let mut bf = BloomFilter::new(1024, 4).unwrap();

        for item in ["alpha", "beta", "gamma"] {
            bf.insert(item);
        }
        assert!(bf.contains("alpha"));
        assert!(bf.contains("beta"));
        assert!(bf.contains("gamma"));
        assert!(bf.bits_set() <= 12);

        // At 3 items in 1024 bits, (1 - e^(-12/1024))^4 is about 2e-8.
        let false_positives = (0..10_000)
            .filter(|i| bf.contains(format!("zzz-not-inserted-{}", i)))
            .count();
        assert!(false_positives <= 1, "{} false positives", false_positives);
    }

    #[test]
    fn test_empty_filter() {
        let bf = BloomFilter::new(4096, 3).unwrap();

        assert_eq!(bf.bits_set(), 0);
        assert_eq!(bf.count(), 0);
        for item in items(256) {
            assert!(!bf.contains(&item));
        }
        assert!(!bf.contains(""));
    }

    #[test]
    fn test_single_bit_filter() {
        let mut bf = BloomFilter::new(1, 1).unwrap();

        assert!(!bf.contains("x"));
        bf.insert("x");
        assert!(bf.contains("x"));
        assert!(bf.contains("anything"));
    }

    #[test]
    fn test_monotonic() {
        let mut bf = BloomFilter::new(2048, 5).unwrap();
        let mut previous = bf.clone();

        for item in items(300) {
            bf.insert(&item);
            assert!(bf.bits_set() >= previous.bits_set());

            for i in 0..bf.bits() {
                if previous.bits.is_set(i) {
                    assert!(bf.bits.is_set(i), "bit {} was cleared", i);
                }
            }
            previous = bf.clone();
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut bf = BloomFilter::new(4096, 7).unwrap();

        bf.insert("repeat");
        let once = bf.clone();
        bf.insert("repeat");

        assert_eq!(bf, once);
    }

    #[test]
    fn test_order_independent() {
        let mut items = items(500);
        let mut a = BloomFilter::new(8192, 6).unwrap();
        let mut b = BloomFilter::new(8192, 6).unwrap();

        for item in &items {
            a.insert(item);
        }
        items.reverse();
        fastrand::shuffle(&mut items);
        for item in &items {
            b.insert(item);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_utf8_items() {
        let mut bf = BloomFilter::new(1 << 16, 4).unwrap();
        let latin1: &[u8] = b"caf\xe9";

        bf.insert(latin1);
        assert!(bf.contains(latin1));
        assert!(!bf.contains("café"));
    }

    #[test]
    fn test_false_positive_rate_matches_theory() {
        let n = 2000;
        let (m, k) = (20_000, 5);
        let mut bf = BloomFilter::new(m, k).unwrap();

        for i in 0..n {
            bf.insert(format!("member-{}", i));
        }
        let probes = 50_000;
        let false_positives = (0..probes)
            .filter(|i| bf.contains(format!("outsider-{}", i)))
            .count();
        let observed = false_positives as f64 / probes as f64;
        let expected = bf.expected_false_positive_rate(n);

        // Expected is about 0.0094.
        assert!(
            (observed - expected).abs() < expected * 0.3,
            "observed {} expected {}",
            observed,
            expected
        );
    }

    #[test]
    fn test_count() {
        let mut a = BloomFilter::with_rate(4096, 0.01).unwrap();

        for i in 0..12u16 {
            a.insert(i.to_le_bytes());
        }
        assert_eq!(a.count(), 12);

        for i in 0..2048u16 {
            a.insert(i.to_le_bytes());
        }
        let count = a.count();
        assert!((1948..=2148).contains(&count), "estimated {}", count);
    }

    #[test]
    fn test_with_rate() {
        let bf = BloomFilter::with_rate(5000, 0.01).unwrap();

        assert_eq!(bf.bits(), 47926);
        assert_eq!(bf.hashes(), 7);
    }

    #[test]
    fn test_optimal_bits() {
        assert_eq!(optimal_bits(10, 0.04), 67);
        assert_eq!(optimal_bits(5000, 0.01), 47926);
        assert_eq!(optimal_bits(100000, 0.01), 958506);
    }

    #[test]
    fn test_optimal_hashes() {
        assert_eq!(optimal_hashes(67, 10), 5);
        assert_eq!(optimal_hashes(47926, 5000), 7);
        assert_eq!(optimal_hashes(958506, 100000), 7);
        assert_eq!(optimal_hashes(10, 100), 1);
    }

    #[test]
    fn test_false_positive_rate() {
        assert_eq!(false_positive_rate(1024, 0, 4), 0.);

        let p = false_positive_rate(958506, 100000, 7);
        assert!((p - 0.01).abs() < 0.001, "{}", p);

        let saturated = false_positive_rate(64, 1_000_000, 3);
        assert!((saturated - 1.).abs() < 1e-9);
    }
}
