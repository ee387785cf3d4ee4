//! Naive keyword sentiment over buyer text.
//!
//! Deliberately crude: word-list hits, no stemming, no negation
//! handling. Good enough to flag a conversation trending sour.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "great", "good", "fair", "deal", "perfect", "thanks", "thank", "love", "excellent",
        "interested", "works", "happy", "appreciate", "nice", "awesome", "yes",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "no", "never", "overpriced", "expensive", "ridiculous", "scam", "waste",
        "terrible", "awful", "insulting", "lowball", "refuse", "forget", "pass",
    ]
    .into_iter()
    .collect()
});

/// Coarse sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Word-hit sentiment for a block of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// In `[-1.0, 1.0]`; 0 when no listed word appears.
    pub score: f64,
    pub label: SentimentLabel,
    pub positive_hits: usize,
    pub negative_hits: usize,
}

impl Sentiment {
    /// Scores a block of text by keyword hits.
    pub fn of(text: &str) -> Self {
        let mut positive = 0usize;
        let mut negative = 0usize;
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            let word = word.to_lowercase();
            if word.is_empty() {
                continue;
            }
            if POSITIVE_WORDS.contains(word.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(word.as_str()) {
                negative += 1;
            }
        }

        let total = positive + negative;
        let score = if total == 0 {
            0.0
        } else {
            (positive as f64 - negative as f64) / total as f64
        };
        let label = if score > 0.2 {
            SentimentLabel::Positive
        } else if score < -0.2 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        Self {
            score,
            label,
            positive_hits: positive,
            negative_hits: negative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_text_scores_positive() {
        let s = Sentiment::of("Great, that's a fair deal, thanks!");
        assert_eq!(s.label, SentimentLabel::Positive);
        assert!(s.score > 0.0);
    }

    #[test]
    fn negative_text_scores_negative() {
        let s = Sentiment::of("That's ridiculous and overpriced, forget it.");
        assert_eq!(s.label, SentimentLabel::Negative);
    }

    #[test]
    fn unlisted_words_are_neutral() {
        let s = Sentiment::of("Does it come with the original charger?");
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(Sentiment::of("GREAT DEAL").label, SentimentLabel::Positive);
    }

    #[test]
    fn mixed_text_balances_out() {
        let s = Sentiment::of("good but expensive");
        assert_eq!(s.label, SentimentLabel::Neutral);
    }
}
