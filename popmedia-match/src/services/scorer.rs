//! Similarity scoring between normalized names
//!
//! Any [`Scorer`] must return values in `[0, 1]` and score a non-empty
//! string against itself as exactly `1.0`. Symmetry is not part of the
//! contract.

use std::fmt;
use std::str::FromStr;

/// Bounded similarity between two normalized names
pub trait Scorer {
    /// Similarity in `[0, 1]`
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Which scorer a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScorerKind {
    /// Ratcliff/Obershelp sequence ratio
    #[default]
    Sequence,
    /// Normalized Levenshtein distance
    Levenshtein,
}

impl ScorerKind {
    /// Instantiate the scorer
    pub fn build(self) -> Box<dyn Scorer> {
        match self {
            ScorerKind::Sequence => Box::new(SequenceRatio),
            ScorerKind::Levenshtein => Box::new(NormalizedLevenshtein),
        }
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(ScorerKind::Sequence),
            "levenshtein" => Ok(ScorerKind::Levenshtein),
            other => Err(format!(
                "Unknown scorer '{}' (expected 'sequence' or 'levenshtein')",
                other
            )),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerKind::Sequence => f.write_str("sequence"),
            ScorerKind::Levenshtein => f.write_str("levenshtein"),
        }
    }
}

/// Ratcliff/Obershelp ratio: `2 * M / (|a| + |b|)`
///
/// `M` is the total length of the matching blocks found by repeatedly
/// taking the longest common substring and recursing on both sides of it.
/// Among equally long candidates the one starting earliest in `a`, then
/// earliest in `b`, is taken. Works on `char`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SequenceRatio {
    /// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`
    ///
    /// Returns `(i, j, len)`; `len == 0` when nothing matches.
    fn longest_match(
        a: &[char],
        b: &[char],
        (alo, ahi): (usize, usize),
        (blo, bhi): (usize, usize),
    ) -> (usize, usize, usize) {
        let width = bhi - blo + 1;
        let mut prev = vec![0usize; width];
        let mut curr = vec![0usize; width];
        let mut best = (alo, blo, 0);

        for i in alo..ahi {
            for j in blo..bhi {
                let k = if a[i] == b[j] { prev[j - blo] + 1 } else { 0 };
                curr[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        best
    }

    /// Total length of all matching blocks
    fn matched_chars(a: &[char], b: &[char]) -> usize {
        let mut pending = vec![((0, a.len()), (0, b.len()))];
        let mut matched = 0;

        while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
            let (i, j, k) = Self::longest_match(a, b, (alo, ahi), (blo, bhi));
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push(((alo, i), (blo, j)));
            }
            if i + k < ahi && j + k < bhi {
                pending.push(((i + k, ahi), (j + k, bhi)));
            }
        }

        matched
    }
}

impl Scorer for SequenceRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }

        let matched = Self::matched_chars(&a, &b);
        (2.0 * matched as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// `1 - levenshtein(a, b) / max(|a|, |b|)`
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl Scorer for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b).clamp(0.0, 1.0)
    }
}
