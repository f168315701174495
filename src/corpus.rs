//! Newline-delimited corpora.
//!
//! Both the reference corpus and the query corpus go through the same
//! [`Lines`] reader, so every item is normalized identically before it reaches
//! the filter or the ground-truth set.
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::bloom::BloomFilter;
use crate::error::Error;

/// Maximum item length in bytes, unless configured otherwise.
pub const DEFAULT_MAX_LINE_LEN: usize = 255;

/// Iterator over the normalized lines of a byte stream.
///
/// Each line is cut at the first carriage return, line feed or NUL byte, then
/// truncated to `max_len` bytes.
pub struct Lines<R> {
    reader: R,
    path: PathBuf,
    max_len: usize,
    count: u64,
    truncated: u64,
}

impl Lines<BufReader<File>> {
    /// Open a corpus file.
    pub fn open(path: impl AsRef<Path>, max_len: usize) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_owned(),
            source,
        })?;

        Ok(Self::new(BufReader::new(file), path, max_len))
    }
}

impl<R: BufRead> Lines<R> {
    /// Read lines from an existing reader. `path` is only used in errors.
    pub fn new(reader: R, path: impl Into<PathBuf>, max_len: usize) -> Self {
        Self {
            reader,
            path: path.into(),
            max_len,
            count: 0,
            truncated: 0,
        }
    }

    /// Number of lines yielded so far.
    pub fn lines_read(&self) -> u64 {
        self.count
    }

    /// Number of lines yielded so far that exceeded the length limit.
    pub fn lines_truncated(&self) -> u64 {
        self.truncated
    }

    /// The source this reader was created for.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one physical line, keeping at most `max_len` bytes of it.
    ///
    /// Bytes past a `\r`, a NUL or the length limit are skipped in place
    /// without being buffered. Returns `None` at end of input.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, Error> {
        let mut line = Vec::new();
        let mut seen = false;
        let mut cut = false;

        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::Read {
                        path: self.path.clone(),
                        source,
                    })
                }
            };
            if buf.is_empty() {
                if !seen {
                    return Ok(None);
                }
                break;
            }
            seen = true;

            let newline = buf.iter().position(|&b| b == b'\n');
            let chunk = &buf[..newline.unwrap_or(buf.len())];

            if !cut {
                let end = chunk
                    .iter()
                    .position(|&b| matches!(b, b'\r' | 0))
                    .unwrap_or(chunk.len());
                let room = self.max_len - line.len();
                let keep = end.min(room);

                line.try_reserve_exact(keep)
                    .map_err(|source| Error::Alloc {
                        what: "line buffer",
                        source,
                    })?;
                line.extend_from_slice(&chunk[..keep]);

                if end > room {
                    self.truncated += 1;
                    cut = true;
                } else if end < chunk.len() {
                    cut = true;
                }
            }
            let used = newline.map_or(buf.len(), |i| i + 1);
            self.reader.consume(used);

            if newline.is_some() {
                break;
            }
        }
        line.shrink_to_fit();
        self.count += 1;

        Ok(Some(line))
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

/// The reference corpus held in memory for exact-match lookups.
#[derive(Debug, Default, Clone)]
pub struct ReferenceSet {
    items: HashSet<Vec<u8>>,
}

impl ReferenceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, reporting memory exhaustion instead of aborting.
    /// Returns whether the item was new.
    pub fn insert(&mut self, item: Vec<u8>) -> Result<bool, Error> {
        self.items
            .try_reserve(1)
            .map_err(|source| Error::Alloc {
                what: "reference set",
                source,
            })?;

        Ok(self.items.insert(item))
    }

    /// Exact membership.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.items.contains(item)
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Vec<u8>> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Summary of a loading pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Lines read from the corpus.
    pub lines: u64,
    /// Lines cut down to the length limit.
    pub truncated: u64,
}

/// Insert every line of `lines` into `filter`, and into `reference` when given.
///
/// The corpus is read once; the same normalized bytes feed both structures.
pub fn load<R: BufRead>(
    lines: &mut Lines<R>,
    filter: &mut BloomFilter,
    mut reference: Option<&mut ReferenceSet>,
) -> Result<LoadStats, Error> {
    for line in lines.by_ref() {
        let line = line?;

        filter.insert(&line);
        if let Some(reference) = reference.as_deref_mut() {
            reference.insert(line)?;
        }
    }
    let stats = LoadStats {
        lines: lines.lines_read(),
        truncated: lines.lines_truncated(),
    };

    tracing::info!(
        path = %lines.path().display(),
        lines = stats.lines,
        truncated = stats.truncated,
        distinct = ?reference.map(|r| r.len()),
        bits_set = filter.bits_set(),
        "Loaded reference corpus"
    );

    Ok(stats)
}
