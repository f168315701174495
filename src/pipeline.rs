//! The load, evaluate and report sequence.
use std::io::Write;
use std::path::PathBuf;

use crate::bloom::BloomFilter;
use crate::corpus::{self, Lines, ReferenceSet, DEFAULT_MAX_LINE_LEN};
use crate::error::Error;
use crate::eval::{self, Confusion};

/// Default bit-array size.
pub const DEFAULT_BITS: usize = 206_237_738;
/// Default hash count.
pub const DEFAULT_HASHES: u32 = 10;

/// How the filter is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Explicit `m` and `k`.
    Explicit {
        /// Bit-array size (`m`).
        bits: usize,
        /// Hash count (`k`).
        hashes: u32,
    },
    /// Derived from an expected item count and a target false positive rate.
    Rate {
        /// Expected number of distinct items.
        capacity: usize,
        /// Target false positive rate.
        fp_rate: f64,
    },
}

impl Default for Sizing {
    fn default() -> Self {
        Self::Explicit {
            bits: DEFAULT_BITS,
            hashes: DEFAULT_HASHES,
        }
    }
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Corpus inserted into the filter; also the ground truth.
    pub reference: PathBuf,
    /// Corpus of queries.
    pub queries: PathBuf,
    /// Filter size.
    pub sizing: Sizing,
    /// Lines longer than this many bytes are truncated, in both corpora.
    pub max_line_len: usize,
    /// Write `maybe` or `no` for every query.
    pub verdicts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference: PathBuf::from("rockyou.ISO-8859-1.txt"),
            queries: PathBuf::from("dictionary.txt"),
            sizing: Sizing::default(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            verdicts: false,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Confusion counters over the query corpus.
    pub confusion: Confusion,
    /// Bit-array size used.
    pub bits: usize,
    /// Hash count used.
    pub hashes: u32,
    /// Bits set after loading.
    pub bits_set: usize,
    /// Distinct reference items.
    pub distinct: usize,
    /// Theoretical false positive rate for this load.
    pub expected_fp_rate: f64,
}

/// Build the filter from the reference corpus, then score the query corpus.
///
/// Per-query verdicts go to `out` when enabled. Counters are only returned
/// once both corpora have been fully processed.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Report, Error> {
    let mut filter = match config.sizing {
        Sizing::Explicit { bits, hashes } => BloomFilter::new(bits, hashes)?,
        Sizing::Rate { capacity, fp_rate } => BloomFilter::with_rate(capacity, fp_rate)?,
    };
    tracing::info!(
        bits = filter.bits(),
        hashes = filter.hashes(),
        "Created Bloom filter"
    );

    // Open both sources before the long loading pass.
    let mut reference_lines = Lines::open(&config.reference, config.max_line_len)?;
    let query_lines = Lines::open(&config.queries, config.max_line_len)?;

    let mut reference = ReferenceSet::new();
    corpus::load(&mut reference_lines, &mut filter, Some(&mut reference))?;

    let confusion = eval::evaluate(&filter, query_lines, &reference, |_, verdict| {
        if config.verdicts {
            writeln!(out, "{}", verdict).map_err(Error::Write)?;
        }
        Ok(())
    })?;

    let report = Report {
        confusion,
        bits: filter.bits(),
        hashes: filter.hashes(),
        bits_set: filter.bits_set(),
        distinct: reference.len(),
        expected_fp_rate: filter.expected_false_positive_rate(reference.len()),
    };
    tracing::info!(
        bits_set = report.bits_set,
        fill = report.bits_set as f64 / report.bits as f64,
        expected_fp_rate = report.expected_fp_rate,
        observed_fp_rate = ?report.confusion.observed_false_positive_rate(),
        "Run complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(
            config.sizing,
            Sizing::Explicit {
                bits: 206_237_738,
                hashes: 10
            }
        );
        assert_eq!(config.max_line_len, 255);
        assert!(!config.verdicts);
    }

    #[test]
    fn test_invalid_sizing_fails_before_reading() {
        let config = Config {
            reference: PathBuf::from("/nonexistent/reference.txt"),
            sizing: Sizing::Explicit { bits: 0, hashes: 3 },
            ..Config::default()
        };
        let mut out = Vec::new();

        let err = run(&config, &mut out).unwrap_err();

        assert!(matches!(err, Error::InvalidParameters(_)));
        assert!(out.is_empty());
    }
}
