//! Subsequence fuzzy scoring
//!
//! A candidate matches a pattern when every pattern character occurs in the candidate,
//! in order, ignoring case. Matching candidates are scored by three components compared
//! lexicographically:
//!
//! 1. `consecutive`: the largest number of adjacent matched-character pairs over all
//!    alignments of the pattern into the candidate (longer runs beat scattered hits)
//! 2. `prefix`: whether the match can start at the first character of the candidate
//! 3. shortness: shorter candidates beat longer ones (denser match)
//!
//! The best alignment is found with a small dynamic program, O(pattern × candidate).

use std::cmp::Ordering;

use serde::Serialize;

/// Ordering key for a matched candidate. Greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Score {
    consecutive: u32,
    prefix: bool,
    length: u32,
}

impl Score {
    /// Uniform score given to every candidate when the pattern is empty.
    pub const MINIMUM: Score = Score {
        consecutive: 0,
        prefix: false,
        length: u32::MAX,
    };

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Candidate length in characters
    pub fn length(&self) -> u32 {
        self.length
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.consecutive
            .cmp(&other.consecutive)
            .then(self.prefix.cmp(&other.prefix))
            .then(other.length.cmp(&self.length))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Simple case folding: the first character of the Unicode lowercase mapping.
#[inline]
pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// A pattern folded once and scored against many candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    chars: Vec<char>,
}

impl Pattern {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().map(fold).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Scores `candidate`, or `None` when the pattern is not a subsequence of it.
    pub fn score(&self, candidate: &str) -> Option<Score> {
        if self.chars.is_empty() {
            return Some(Score::MINIMUM);
        }

        let folded: Vec<char> = candidate.chars().map(fold).collect();
        if !is_subsequence(&self.chars, &folded) {
            return None;
        }

        let consecutive = max_adjacent_pairs(&self.chars, &folded)?;
        Some(Score {
            consecutive,
            prefix: folded[0] == self.chars[0],
            length: u32::try_from(folded.len()).unwrap_or(u32::MAX),
        })
    }
}

/// Convenience wrapper for one-off scoring.
pub fn score(pattern: &str, candidate: &str) -> Option<Score> {
    Pattern::new(pattern).score(candidate)
}

fn is_subsequence(pattern: &[char], candidate: &[char]) -> bool {
    let mut remaining = pattern.iter().peekable();
    for c in candidate {
        if remaining.peek() == Some(&c) {
            remaining.next();
        }
    }
    remaining.peek().is_none()
}

/// Maximum number of adjacent matched pairs over every alignment of `pattern`
/// into `candidate`.
///
/// `row[j]` holds the best count with the current pattern character placed at `j`,
/// or `NONE` when no alignment puts it there.
fn max_adjacent_pairs(pattern: &[char], candidate: &[char]) -> Option<u32> {
    const NONE: i32 = -1;

    let mut prev: Vec<i32> = candidate
        .iter()
        .map(|&c| if c == pattern[0] { 0 } else { NONE })
        .collect();
    let mut cur = vec![NONE; candidate.len()];

    for &pc in &pattern[1..] {
        // Best of prev[0..=j-2]: placements that leave a gap before j
        let mut best_with_gap = NONE;
        for j in 0..candidate.len() {
            cur[j] = NONE;
            if j == 0 {
                continue;
            }
            if candidate[j] == pc {
                let adjacent = if prev[j - 1] == NONE { NONE } else { prev[j - 1] + 1 };
                cur[j] = best_with_gap.max(adjacent);
            }
            best_with_gap = best_with_gap.max(prev[j - 1]);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev.into_iter()
        .max()
        .filter(|&best| best >= 0)
        .and_then(|best| u32::try_from(best).ok())
}
