/*!
 * Candidate generation for online WPA2 trials
 *
 * Two sources feed the orchestrator: an exhaustive generator walking every
 * combination of a charset by increasing length, and a dictionary replaying
 * a list of lines in file order. Both are single-pass iterators.
 */

use crate::error::SourceError;
use std::path::Path;

/// One secret value to try against the target network
pub type Candidate = String;

/// Default exhaustive charset: lowercase letters followed by digits
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Which flavour of source produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Exhaustive,
    Dictionary,
}

/// Ordered, finite sequence of candidates
#[derive(Debug)]
pub enum CandidateSource {
    Exhaustive(ExhaustiveGenerator),
    Dictionary(DictionaryList),
}

impl CandidateSource {
    /// Total number of candidates this source yields, known before iteration
    pub fn total(&self) -> u128 {
        match self {
            CandidateSource::Exhaustive(gen) => gen.total_combinations(),
            CandidateSource::Dictionary(list) => list.total() as u128,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            CandidateSource::Exhaustive(_) => SourceKind::Exhaustive,
            CandidateSource::Dictionary(_) => SourceKind::Dictionary,
        }
    }
}

impl Iterator for CandidateSource {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        match self {
            CandidateSource::Exhaustive(gen) => gen.next(),
            CandidateSource::Dictionary(list) => list.next(),
        }
    }
}

/// Cartesian-product generator over a charset
///
/// Lengths are walked from `min_len` to `max_len`. Within one length the
/// leftmost symbol varies slowest, so `{a,b}` at length 2 gives
/// `aa, ab, ba, bb`.
#[derive(Debug)]
pub struct ExhaustiveGenerator {
    charset: Vec<char>,
    min_len: usize,
    max_len: usize,
    /// Odometer of charset indices for the next candidate; `None` once drained
    indices: Option<Vec<usize>>,
}

impl ExhaustiveGenerator {
    /// Create a generator for all strings of `min_len..=max_len` symbols
    ///
    /// Repeated symbols in `charset` are collapsed, keeping the first occurrence.
    ///
    /// # Errors
    /// * `SourceError::EmptyCharset` - no symbols to combine
    /// * `SourceError::InvalidRange` - `min_len` is zero or greater than `max_len`
    pub fn new(charset: &str, min_len: usize, max_len: usize) -> Result<Self, SourceError> {
        let mut symbols: Vec<char> = Vec::with_capacity(charset.len());
        for c in charset.chars() {
            if !symbols.contains(&c) {
                symbols.push(c);
            }
        }

        if symbols.is_empty() {
            return Err(SourceError::EmptyCharset);
        }
        if min_len == 0 || min_len > max_len {
            return Err(SourceError::InvalidRange {
                min: min_len,
                max: max_len,
            });
        }

        Ok(Self {
            charset: symbols,
            min_len,
            max_len,
            indices: Some(vec![0; min_len]),
        })
    }

    /// Number of distinct symbols in use
    pub fn charset_len(&self) -> usize {
        self.charset.len()
    }

    /// Get total number of combinations (saturates at `u128::MAX`)
    pub fn total_combinations(&self) -> u128 {
        let k = self.charset.len() as u128;
        if k == 1 {
            return (self.max_len - self.min_len) as u128 + 1;
        }

        // k >= 2 overflows u128 before length 128
        (self.min_len..=self.max_len)
            .try_fold(0u128, |acc, n| {
                let count = k.checked_pow(u32::try_from(n).ok()?)?;
                acc.checked_add(count)
            })
            .unwrap_or(u128::MAX)
    }

    fn advance(&mut self) {
        let Some(indices) = self.indices.as_mut() else {
            return;
        };

        // Rightmost position ticks first
        for pos in (0..indices.len()).rev() {
            indices[pos] += 1;
            if indices[pos] < self.charset.len() {
                return;
            }
            indices[pos] = 0;
        }

        let next_len = indices.len() + 1;
        self.indices = if next_len <= self.max_len {
            Some(vec![0; next_len])
        } else {
            None
        };
    }
}

impl Iterator for ExhaustiveGenerator {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let indices = self.indices.as_ref()?;
        let candidate: String = indices.iter().map(|&i| self.charset[i]).collect();
        self.advance();
        Some(candidate)
    }
}

/// Candidates replayed from a list of lines
#[derive(Debug)]
pub struct DictionaryList {
    total: usize,
    remaining: std::vec::IntoIter<Candidate>,
}

impl DictionaryList {
    /// Build a dictionary from raw lines
    ///
    /// Lines are trimmed; blank lines are dropped and do not count.
    ///
    /// # Arguments
    /// * `lines` - Raw lines in replay order
    /// * `origin` - Where the lines came from, used in error messages
    pub fn from_lines<I, S>(lines: I, origin: &str) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates: Vec<Candidate> = lines
            .into_iter()
            .filter_map(|line| {
                let trimmed = line.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();

        if candidates.is_empty() {
            return Err(SourceError::Empty {
                origin: origin.to_string(),
            });
        }

        Ok(Self {
            total: candidates.len(),
            remaining: candidates.into_iter(),
        })
    }

    /// Load a dictionary file, one candidate per line
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_lines(contents.lines(), &path.display().to_string())
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for DictionaryList {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        self.remaining.next()
    }
}
