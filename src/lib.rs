//! Build a Bloom filter from one word list and measure how well it predicts
//! membership for another.
//!
//! # Bloom Filters
//!
//! A Bloom filter is a space-efficient probabilistic data structure that is
//! used to test whether an element is a member of a set. It allows for queries
//! to return: "possibly in set" or "definitely not in set". Elements can be
//! added to the set, but not removed; the more elements that are added to the
//! set, the larger the probability of false positives.
//!
//! # Hashing
//!
//! Each of the `k` bit positions for an item comes from its own hash
//! evaluation: the item's bytes followed by the seed `i` are run through keyed
//! SipHash-1-3, and the top 32 bits of the result are reduced modulo `m`.
//! The expected false positive rate after `n` distinct insertions is
//!
//! (1 - e<sup>-kn/m</sup>)<sup>k</sup>
//!
//! # Evaluation
//!
//! The [`pipeline`] module loads a reference corpus into both a filter and an
//! exact [`ReferenceSet`], then classifies every line of a query corpus into a
//! [`Confusion`] matrix. [`evaluate`] also accepts any [`GroundTruth`], such
//! as a plain `HashSet<Vec<u8>>` built by the caller.
//!
//! # Example
//!
//! ```
//! use bloom_eval::BloomFilter;
//!
//! let mut filter = BloomFilter::new(1024, 4).unwrap();
//!
//! filter.insert("alpha");
//! filter.insert("beta");
//!
//! assert!(filter.contains("alpha"));
//! assert!(filter.contains("beta"));
//! filter.contains("gamma"); // almost certainly false
//! ```
#![warn(missing_docs)]
#![allow(clippy::bool_assert_comparison)]

pub mod bitvec;
pub mod bloom;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod hash;
pub mod pipeline;

pub use bloom::BloomFilter;
pub use corpus::{Lines, ReferenceSet};
pub use error::Error;
pub use eval::{evaluate, Confusion, GroundTruth, Verdict};
pub use pipeline::{run, Config, Report, Sizing};
