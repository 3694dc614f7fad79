//! Trigram-based fuzzy text similarity.
//!
//! Strings are lowercased and reduced to the **set** of their contiguous three-character
//! substrings. Similarity is the Jaccard coefficient `|A ∩ B| / |A ∪ B|` of the two sets.
//!
//! Repeated trigrams are counted once. Counting them as a multiset would inflate the
//! intersection for strings with repeated letters and overstate similarity.
//!
//! Edge cases:
//! - both inputs empty: `1.0`
//! - exactly one input empty: `0.0`
//! - a one- or two-character string yields a single trigram, the whole string

use std::collections::HashSet;

/// The deduplicated trigrams of a string.
///
/// Build one per input when the same string is compared many times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrigramSet(HashSet<String>);

impl TrigramSet {
    /// Lowercases `text` and extracts its trigrams (by character, not byte).
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        let grams = match chars.len() {
            0 => HashSet::new(),
            1 | 2 => HashSet::from([chars.iter().collect::<String>()]),
            _ => chars
                .windows(3)
                .map(|w| w.iter().collect::<String>())
                .collect(),
        };
        Self(grams)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, gram: &str) -> bool {
        self.0.contains(gram)
    }

    /// Jaccard coefficient against `other`, always in `[0.0, 1.0]`.
    pub fn jaccard(&self, other: &TrigramSet) -> f64 {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => return 1.0,
            (true, false) | (false, true) => return 0.0,
            (false, false) => {}
        }

        let intersection = self.0.intersection(&other.0).count();
        let union = self.len() + other.len() - intersection;
        intersection as f64 / union as f64
    }
}

/// Similarity of two strings in `[0.0, 1.0]`.
///
/// ```
/// use intake_core::similarity::similarity;
///
/// assert_eq!(similarity("Smith", "smith"), 1.0);
/// assert!(similarity("hello", "hallo") < 0.7);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    TrigramSet::new(a).jaccard(&TrigramSet::new(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        for s in ["", "a", "ab", "abc", "hello", "Mississippi", "ñandú"] {
            assert_eq!(similarity(s, s), 1.0, "similarity({s:?}, {s:?})");
        }
    }

    #[test]
    fn one_empty_input_scores_zero() {
        assert_eq!(similarity("", "x"), 0.0);
        assert_eq!(similarity("x", ""), 0.0);
    }

    #[test]
    fn repeated_letters_are_not_double_counted() {
        // {hel, ell, llo} vs {hal, all, llo}: 1 shared of 5 distinct.
        let score = similarity("hello", "hallo");
        assert!(approx_eq(score, 0.2), "got {score}");
        assert!(score < 0.7);
    }

    #[test]
    fn trigram_set_deduplicates() {
        // "aaaa" has windows aaa, aaa
        let set = TrigramSet::new("aaaa");
        assert_eq!(set.len(), 1);
        assert!(set.contains("aaa"));
        assert_eq!(similarity("aaaa", "aaa"), 1.0);
    }

    #[test]
    fn comparison_is_case_insensitive() {
        assert_eq!(similarity("JOHNSON", "johnson"), 1.0);
    }

    #[test]
    fn short_strings_use_whole_string_as_trigram() {
        let set = TrigramSet::new("Al");
        assert_eq!(set.len(), 1);
        assert!(set.contains("al"));
        assert_eq!(similarity("al", "AL"), 1.0);
        assert_eq!(similarity("al", "ali"), 0.0);
    }

    #[test]
    fn trigrams_follow_characters_not_bytes() {
        let set = TrigramSet::new("Zoë");
        assert_eq!(set.len(), 1);
        assert!(set.contains("zoë"));
    }

    #[test]
    fn partial_overlap_scores_between_bounds() {
        // {jon, ona, nat, ath, tha, han} vs {jon, ona, nat, ath, tho, hon}: 4 of 8
        let score = similarity("Jonathan", "Jonathon");
        assert!(approx_eq(score, 0.5), "got {score}");
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(similarity("abcdef", "uvwxyz"), 0.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [("smith", "smyth"), ("ann", "anne"), ("", "q"), ("abc", "bcd")];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }
}
