//! Rule tables shared by the quality and momentum scorers.
//!
//! Each scorer is a fixed list of `(predicate, delta, signal)` rows walked in
//! order. Rows are independent: every row whose predicate holds contributes its
//! delta, and the sum is clamped to `[0, MAX_SCORE]` only at the end.

/// Upper bound for quality and momentum scores.
pub const MAX_SCORE: i32 = 10;

/// One row of a scoring table.
pub struct ScoreRule<T> {
    /// Human-readable signal recorded when the rule fires. Some rules only
    /// adjust the score.
    pub signal: Option<&'static str>,
    pub delta: i32,
    pub applies: fn(&T) -> bool,
}

/// Result of walking a rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreCard {
    /// Clamped score in `[0, MAX_SCORE]`.
    pub score: u8,
    /// Unclamped sum of the fired deltas.
    pub raw: i32,
    /// Signals in table order.
    pub signals: Vec<&'static str>,
}

pub fn evaluate<T>(rules: &[ScoreRule<T>], input: &T) -> ScoreCard {
    let mut raw = 0;
    let mut signals = Vec::new();

    for rule in rules {
        if (rule.applies)(input) {
            raw += rule.delta;
            if let Some(signal) = rule.signal {
                signals.push(signal);
            }
        }
    }

    ScoreCard {
        score: clamp_score(raw),
        raw,
        signals,
    }
}

pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, MAX_SCORE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[ScoreRule<i32>] = &[
        ScoreRule {
            signal: Some("Positive"),
            delta: 4,
            applies: |v| *v > 0,
        },
        ScoreRule {
            signal: None,
            delta: 3,
            applies: |v| *v > 10,
        },
        ScoreRule {
            signal: Some("Large"),
            delta: 5,
            applies: |v| *v > 100,
        },
        ScoreRule {
            signal: Some("Negative"),
            delta: -2,
            applies: |v| *v < 0,
        },
    ];

    #[test]
    fn test_rules_are_additive() {
        let card = evaluate(TABLE, &50);
        assert_eq!(card.raw, 7);
        assert_eq!(card.score, 7);
        assert_eq!(card.signals, vec!["Positive"]);
    }

    #[test]
    fn test_score_clamped_to_upper_bound() {
        let card = evaluate(TABLE, &500);
        assert_eq!(card.raw, 12);
        assert_eq!(card.score, 10);
        assert_eq!(card.signals, vec!["Positive", "Large"]);
    }

    #[test]
    fn test_score_clamped_to_zero() {
        let card = evaluate(TABLE, &-1);
        assert_eq!(card.raw, -2);
        assert_eq!(card.score, 0);
        assert_eq!(card.signals, vec!["Negative"]);
    }

    #[test]
    fn test_no_rule_fires() {
        let card = evaluate(TABLE, &0);
        assert_eq!(card, ScoreCard::default());
    }
}
