//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! `ratio` is `2 * M / T` where `M` is the number of characters covered by
//! recursively found longest common blocks and `T` the combined length of
//! both strings. Identical strings score 1.0, disjoint ones 0.0.

/// Default acceptance threshold for approximate label matches.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start_a, start_b, len)`. Earliest block in `a`, then `b`, wins ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // run[j] = length of the common suffix ending at a[i-1], b[j-1]
    let mut prev = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        let mut cur = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                cur[j - blo + 1] = k;
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        prev = cur;
    }
    (best_i, best_j, best_len)
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        queue.push((alo, i, blo, j));
        queue.push((i + k, ahi, j + k, bhi));
    }
    total
}

/// Similarity of two strings on a 0–1 scale.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Best scoring candidate with `ratio >= cutoff`.
///
/// On equal scores the candidate listed first wins, so callers pass
/// candidates in their preferred order (code order for label sets).
pub fn best_match<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for cand in candidates {
        let score = ratio(word, cand);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, s)) if s >= score => {}
            _ => best = Some((cand, score)),
        }
    }
    best
}
