//! Word-order-insensitive similarity between two normalized keys.
//!
//! Keys are split on whitespace, tokens sorted and re-joined, then compared
//! with an edit-distance ratio scaled to 0..=100.

use serde::{Deserialize, Serialize};

use crate::model::NormalizedKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    /// `100 * (1 - levenshtein / max(len_a, len_b))`.
    #[default]
    Levenshtein,
    /// `100 * (1 - indel / (len_a + len_b))`, indel counting insertions and deletions only.
    /// Punctuation is turned into token breaks first, so "и.и." and "и. и." compare equal.
    Indel,
}

impl std::fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Levenshtein => write!(f, "levenshtein"),
            Self::Indel => write!(f, "indel"),
        }
    }
}

/// Score two keys. Symmetric. Equal keys containing a letter or digit score 100;
/// an empty key scores 0.
pub fn score(a: &NormalizedKey, b: &NormalizedKey, method: ScoreMethod) -> u8 {
    token_sort_ratio(a.as_str(), b.as_str(), method)
}

pub fn token_sort_ratio(a: &str, b: &str, method: ScoreMethod) -> u8 {
    let (a, b) = match method {
        ScoreMethod::Levenshtein => (token_sort(a), token_sort(b)),
        ScoreMethod::Indel => (
            token_sort(&punctuation_to_spaces(a)),
            token_sort(&punctuation_to_spaces(b)),
        ),
    };
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    match method {
        ScoreMethod::Levenshtein => {
            let distance = strsim::generic_levenshtein(&a, &b);
            let longest = a.len().max(b.len());
            percent(longest - distance, longest)
        }
        ScoreMethod::Indel => {
            let lcs = lcs_len(&a, &b);
            percent(2 * lcs, a.len() + b.len())
        }
    }
}

/// Split on whitespace, sort tokens, re-join with single spaces.
pub fn token_sort(key: &str) -> String {
    let mut tokens: Vec<&str> = key.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Every character other than a letter, digit or underscore becomes a space.
pub fn punctuation_to_spaces(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect()
}

/// `100 * num / den` rounded half to even.
fn percent(num: usize, den: usize) -> u8 {
    let scaled = 100 * num;
    let q = scaled / den;
    let r = scaled % den;
    let rounded = match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q % 2),
    };
    rounded.min(100) as u8
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
