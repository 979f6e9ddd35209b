//! Ratcliff–Obershelp similarity between company names.
//!
//! The ratio is `2·M / (|a| + |b|)` where `M` counts the characters covered by
//! the longest common substring, found recursively on the unmatched text to its
//! left and right. Lengths are in Unicode scalar values after lower-casing.

use std::collections::HashMap;

/// Scores candidate names against one query.
///
/// The query is lower-cased once and reused for every candidate.
#[derive(Clone, Debug)]
pub struct NameMatcher {
    query: Vec<char>,
}

impl NameMatcher {
    /// Creates a matcher for a query name.
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase().chars().collect(),
        }
    }

    /// Returns the similarity of `candidate` to the query, in `[0, 1]`.
    ///
    /// Two empty strings score 0.
    #[must_use]
    pub fn score(&self, candidate: &str) -> f64 {
        let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
        let total = self.query.len() + candidate.len();
        if total == 0 {
            return 0.0;
        }

        let matched = matching_characters(&self.query, &candidate);
        (2 * matched) as f64 / total as f64
    }
}

/// Returns the similarity ratio of two names.
#[must_use]
pub fn score(query: &str, candidate: &str) -> f64 {
    NameMatcher::new(query).score(candidate)
}

/// Total length of the recursively found matching blocks.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        positions.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &positions, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
///
/// Ties resolve to the earliest start in `a`, then in `b`.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run length of the match ending at (i - 1, j), keyed by j
    let mut run_ending: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next = HashMap::new();
        if let Some(js) = positions.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        run_ending = next;
    }

    (best_i, best_j, best_k)
}
