use analysis_core::Verdict;

/// P/E above which weak momentum forces a trim.
pub const EXTREME_PE: f64 = 100.0;
const EXTREME_PE_MOMENTUM_CEILING: u8 = 5;

struct VerdictRule {
    applies: fn(u8, u8) -> bool,
    verdict: Verdict,
}

/// Score bands in evaluation order. The bands overlap (quality 8 / momentum 8
/// also sits in the HOLD band), so only the first matching row applies.
const VERDICT_RULES: &[VerdictRule] = &[
    // Compounder
    VerdictRule {
        applies: |q, m| q >= 7 && m >= 6,
        verdict: Verdict::Buy,
    },
    // Value pick
    VerdictRule {
        applies: |q, m| q >= 7 && m < 4,
        verdict: Verdict::Accumulate,
    },
    // Momentum without quality
    VerdictRule {
        applies: |q, m| q < 4 && m >= 7,
        verdict: Verdict::Trim,
    },
    // Trap
    VerdictRule {
        applies: |q, m| q < 4 && m < 4,
        verdict: Verdict::Sell,
    },
    VerdictRule {
        applies: |q, m| q >= 5 && m >= 5,
        verdict: Verdict::Hold,
    },
];

/// Maps the two scores (and P/E for the valuation override) to a verdict.
pub fn decide_verdict(quality: u8, momentum: u8, pe_ratio: Option<f64>) -> Verdict {
    let mut verdict = VERDICT_RULES
        .iter()
        .find(|rule| (rule.applies)(quality, momentum))
        .map(|rule| rule.verdict)
        .unwrap_or_default();

    // Extreme valuation with fading momentum overrides everything above
    if pe_ratio.is_some_and(|pe| pe > EXTREME_PE) && momentum < EXTREME_PE_MOMENTUM_CEILING {
        verdict = Verdict::Trim;
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_table() {
        assert_eq!(decide_verdict(8, 8, None), Verdict::Buy);
        assert_eq!(decide_verdict(2, 2, None), Verdict::Sell);
        assert_eq!(decide_verdict(8, 2, None), Verdict::Accumulate);
        assert_eq!(decide_verdict(2, 8, None), Verdict::Trim);
        assert_eq!(decide_verdict(6, 6, None), Verdict::Hold);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        assert_eq!(decide_verdict(4, 4, None), Verdict::Hold);
        assert_eq!(decide_verdict(7, 5, None), Verdict::Hold);
        assert_eq!(decide_verdict(3, 5, None), Verdict::Hold);
    }

    #[test]
    fn test_first_matching_band_wins() {
        // Also inside the HOLD band, but BUY is checked first
        assert_eq!(decide_verdict(7, 6, None), Verdict::Buy);
        assert_eq!(decide_verdict(10, 10, None), Verdict::Buy);
        assert_eq!(decide_verdict(10, 8, None), Verdict::Buy);
        assert_eq!(decide_verdict(5, 5, None), Verdict::Hold);
    }

    #[test]
    fn test_extreme_pe_override() {
        assert_eq!(decide_verdict(8, 3, Some(150.0)), Verdict::Trim);
        assert_eq!(decide_verdict(5, 4, Some(100.5)), Verdict::Trim);
        // Momentum at the ceiling escapes the override
        assert_eq!(
            decide_verdict(8, 5, Some(150.0)),
            decide_verdict(8, 5, None)
        );
        // P/E exactly 100 is not extreme
        assert_eq!(decide_verdict(8, 2, Some(100.0)), Verdict::Accumulate);
    }
}
