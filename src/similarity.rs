/// Score assigned when one string contains the other, regardless of length.
pub const CONTAINMENT_SCORE: f64 = 0.8;

/// Levenshtein edit distance counted in chars, two-row dynamic programming.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Normalized similarity in [0.0, 1.0].
///
/// Equal strings score 1.0 and an empty string against a non-empty one scores
/// 0.0. After lower-casing, containment in either direction is a flat 0.8;
/// anything else is `1 - distance / max_len`.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return CONTAINMENT_SCORE;
    }

    // Both sides are non-empty here, so max_len > 0.
    let max_len = a.chars().count().max(b.chars().count());
    (1.0 - levenshtein(&a, &b) as f64 / max_len as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "a",
        "RENT PAYMENT",
        "rent payment",
        "RENT",
        "AMAZON MKTPL*2K4",
        "AMAZON MARKETPLACE",
        "MONTHLY SALARY DEPOSIT",
        "Café Zoë",
        "kitten",
        "sitting",
    ];

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_exact_equality_scores_one() {
        assert_eq!(similarity("RENT PAYMENT", "RENT PAYMENT"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_case_only_difference_scores_one() {
        assert_eq!(similarity("RENT PAYMENT", "rent payment"), 1.0);
    }

    #[test]
    fn test_empty_against_non_empty_scores_zero() {
        assert_eq!(similarity("", "rent"), 0.0);
        assert_eq!(similarity("rent", ""), 0.0);
    }

    #[test]
    fn test_containment_is_flat_regardless_of_length() {
        assert_eq!(similarity("RENT", "RENT PAYMENT"), CONTAINMENT_SCORE);
        assert_eq!(similarity("rent payment for march and april", "RENT"), CONTAINMENT_SCORE);
    }

    #[test]
    fn test_edit_distance_normalized_by_longer_string() {
        // kitten -> sitting: 3 edits over 7 chars
        let s = similarity("kitten", "sitting");
        assert!((s - (1.0 - 3.0 / 7.0)).abs() < 1e-12);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_symmetric_for_all_sample_pairs() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(similarity(a, b), similarity(b, a), "asymmetric for {a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn test_bounded_for_all_sample_pairs() {
        for a in SAMPLES {
            for b in SAMPLES {
                let s = similarity(a, b);
                assert!((0.0..=1.0).contains(&s), "{s} out of range for {a:?} / {b:?}");
            }
            if !a.is_empty() {
                assert_eq!(similarity(a, a), 1.0);
            }
        }
    }
}
