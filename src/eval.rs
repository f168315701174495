//! Scoring filter verdicts against exact membership.
use std::collections::HashSet;
use std::fmt;

use crate::bloom::BloomFilter;
use crate::corpus::ReferenceSet;
use crate::error::Error;

/// Exact membership oracle for query items.
pub trait GroundTruth {
    /// Whether `item` truly belongs to the reference corpus.
    fn is_member(&self, item: &[u8]) -> bool;
}

impl GroundTruth for ReferenceSet {
    fn is_member(&self, item: &[u8]) -> bool {
        self.contains(item)
    }
}

impl GroundTruth for HashSet<Vec<u8>> {
    fn is_member(&self, item: &[u8]) -> bool {
        self.contains(item)
    }
}

/// What the filter said about one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Possibly a member.
    Maybe,
    /// Definitely not a member.
    No,
}

impl Verdict {
    /// The word printed for this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maybe => "maybe",
            Self::No => "no",
        }
    }
}

impl From<bool> for Verdict {
    fn from(present: bool) -> Self {
        if present {
            Self::Maybe
        } else {
            Self::No
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confusion matrix counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    /// Reported present, and present.
    pub true_positive: u64,
    /// Reported absent, and absent.
    pub true_negative: u64,
    /// Reported present, but absent.
    pub false_positive: u64,
    /// Reported absent, but present.
    pub false_negative: u64,
}

impl Confusion {
    /// Count one query in exactly one bucket.
    pub fn record(&mut self, verdict: Verdict, member: bool) {
        match (verdict, member) {
            (Verdict::Maybe, true) => self.true_positive += 1,
            (Verdict::Maybe, false) => self.false_positive += 1,
            (Verdict::No, true) => self.false_negative += 1,
            (Verdict::No, false) => self.true_negative += 1,
        }
    }

    /// Number of queries recorded.
    pub fn total(&self) -> u64 {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    /// Share of true non-members the filter let through, if any were queried.
    pub fn observed_false_positive_rate(&self) -> Option<f64> {
        let negatives = self.false_positive + self.true_negative;

        if negatives == 0 {
            return None;
        }
        Some(self.false_positive as f64 / negatives as f64)
    }
}

impl fmt::Display for Confusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "True Positives: {}", self.true_positive)?;
        writeln!(f, "True Negatives: {}", self.true_negative)?;
        writeln!(f, "False Positives: {}", self.false_positive)?;
        write!(f, "False Negatives: {}", self.false_negative)
    }
}

/// Classify every query against the filter and the ground truth.
///
/// `on_verdict` sees each query and its verdict in input order. The first
/// error from the query stream or from `on_verdict` aborts evaluation and no
/// counters are returned.
pub fn evaluate<I, T, F>(
    filter: &BloomFilter,
    queries: I,
    truth: &T,
    mut on_verdict: F,
) -> Result<Confusion, Error>
where
    I: IntoIterator<Item = Result<Vec<u8>, Error>>,
    T: GroundTruth + ?Sized,
    F: FnMut(&[u8], Verdict) -> Result<(), Error>,
{
    let mut confusion = Confusion::default();

    for query in queries {
        let query = query?;
        let verdict = Verdict::from(filter.contains(&query));

        on_verdict(&query, verdict)?;
        confusion.record(verdict, truth.is_member(&query));
    }

    if confusion.false_negative > 0 {
        tracing::warn!(
            false_negatives = confusion.false_negative,
            "Inserted items were reported absent; the ground truth does not match the filter's contents"
        );
    }
    tracing::info!(
        queries = confusion.total(),
        true_positive = confusion.true_positive,
        false_positive = confusion.false_positive,
        "Evaluated query corpus"
    );

    Ok(confusion)
}
