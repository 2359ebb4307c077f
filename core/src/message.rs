use std::sync::Arc;

use crate::detector::VariableDetector;

#[derive(Debug, Clone)]
pub struct Message {
    pub raw: String,
    pub processed: String,
    pub tokens: Vec<String>,
    pub length: usize,
    detector: Arc<VariableDetector>,
}

impl Message {
    pub fn new(raw: String, processed: String, tokens: Vec<String>, detector: Arc<VariableDetector>) -> Self {
        let length = tokens.len();
        Self {
            raw,
            processed,
            tokens,
            length,
            detector,
        }
    }

    pub fn edit_distance(&self, other: &Message) -> usize {
        let a = &self.tokens;
        let b = &other.tokens;
        let (m, n) = (a.len(), b.len());
        if m == 0 {
            return n;
        }
        if n == 0 {
            return m;
        }

        let mut prev: Vec<usize> = (0..=n).collect();
        let mut curr = vec![0usize; n + 1];

        for i in 1..=m {
            curr[0] = i;
            for j in 1..=n {
                if self.detector.tokens_match(&a[i - 1], &b[j - 1]) {
                    curr[j] = prev[j - 1];
                } else {
                    curr[j] = 1 + prev[j - 1].min(prev[j]).min(curr[j - 1]);
                }
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        prev[n]
    }

    pub fn similarity(&self, other: &Message) -> f64 {
        let max_len = self.length.max(other.length);
        if max_len == 0 {
            return 1.0;
        }
        1.0 - (self.edit_distance(other) as f64) / (max_len as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(tokens: &[&str], detector: &Arc<VariableDetector>) -> Message {
        let tokens: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        Message::new(String::new(), String::new(), tokens, Arc::clone(detector))
    }

    #[test]
    fn identical_messages_have_zero_distance_and_similarity_one() {
        use float_cmp::approx_eq;

        let d = Arc::new(VariableDetector::standard());
        let a = msg(&["a", "b", "c"], &d);
        let b = msg(&["a", "b", "c"], &d);
        assert_eq!(a.edit_distance(&b), 0);
        assert!(approx_eq!(f64, a.similarity(&b), 1.0, ulps = 2));
    }

    #[test]
    fn both_empty_similarity_is_one() {
        let d = Arc::new(VariableDetector::standard());
        let a = msg(&[], &d);
        let b = msg(&[], &d);
        assert_eq!(a.similarity(&b), 1.0);
    }

    #[test]
    fn edit_distance_is_symmetric() {
        let d = Arc::new(VariableDetector::standard());
        let a = msg(&["a", "b", "c", "d"], &d);
        let b = msg(&["a", "x", "c"], &d);
        assert_eq!(a.edit_distance(&b), b.edit_distance(&a));
    }

    #[test]
    fn self_similarity_is_one() {
        let d = Arc::new(VariableDetector::standard());
        let a = msg(&["a", "b", "c"], &d);
        assert_eq!(a.similarity(&a), 1.0);
    }

    #[test]
    fn similarity_bounds() {
        let d = Arc::new(VariableDetector::standard());
        let a = msg(&["a", "b", "c"], &d);
        let b = msg(&["x", "y", "z", "w", "q"], &d);
        let sim = a.similarity(&b);
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn numeric_tokens_count_as_equal_via_detector() {
        let d = Arc::new(VariableDetector::standard());
        let a = msg(&["Request", "12345", "processed"], &d);
        let b = msg(&["Request", "67890", "processed"], &d);
        assert_eq!(a.edit_distance(&b), 0);
        assert_eq!(a.similarity(&b), 1.0);
    }

    proptest::proptest! {
        #[test]
        fn similarity_is_always_bounded(
            a in proptest::collection::vec("[a-z]{1,4}", 0..8),
            b in proptest::collection::vec("[a-z]{1,4}", 0..8),
        ) {
            let d = Arc::new(VariableDetector::standard());
            let ma = msg(&a.iter().map(String::as_str).collect::<Vec<_>>(), &d);
            let mb = msg(&b.iter().map(String::as_str).collect::<Vec<_>>(), &d);
            let sim = ma.similarity(&mb);
            proptest::prop_assert!((0.0..=1.0).contains(&sim));
        }

        #[test]
        fn edit_distance_is_symmetric_for_any_pair(
            a in proptest::collection::vec("[a-z]{1,4}", 0..8),
            b in proptest::collection::vec("[a-z]{1,4}", 0..8),
        ) {
            let d = Arc::new(VariableDetector::standard());
            let ma = msg(&a.iter().map(String::as_str).collect::<Vec<_>>(), &d);
            let mb = msg(&b.iter().map(String::as_str).collect::<Vec<_>>(), &d);
            proptest::prop_assert_eq!(ma.edit_distance(&mb), mb.edit_distance(&ma));
        }

        #[test]
        fn self_similarity_is_always_one(a in proptest::collection::vec("[a-z]{1,4}", 0..8)) {
            let d = Arc::new(VariableDetector::standard());
            let ma = msg(&a.iter().map(String::as_str).collect::<Vec<_>>(), &d);
            proptest::prop_assert_eq!(ma.similarity(&ma), 1.0);
        }
    }
}
