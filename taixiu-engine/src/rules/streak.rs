use std::collections::HashMap;
use taixiu_db::models::Round;
use super::{tail, Rule, Verdict};

/// Après une série de `window` résultats identiques, parie sur la cassure.
pub struct StreakReversalRule {
    name: &'static str,
    window: usize,
    confidence: f64,
}

impl StreakReversalRule {
    pub fn new(name: &'static str, window: usize, confidence: f64) -> Self {
        Self { name, window, confidence }
    }

    pub fn long_streak() -> Self {
        Self::new("streak_reversal", 5, 0.75)
    }

    pub fn triple() -> Self {
        Self::new("triple_reversal", 3, 0.60)
    }
}

impl Rule for StreakReversalRule {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        if self.window == 0 || rounds.len() < self.window {
            return None;
        }
        let last = tail(rounds, self.window);
        let first = last[0].outcome;
        if last.iter().all(|r| r.outcome == first) {
            Some(Verdict::new(first.opposite(), self.confidence))
        } else {
            None
        }
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.window as f64),
            ("confidence".to_string(), self.confidence),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::make_rounds;
    use taixiu_db::models::Outcome;

    #[test]
    fn test_long_streak_over() {
        let verdict = StreakReversalRule::long_streak().evaluate(&make_rounds("XTTTTT")).unwrap();
        assert_eq!(verdict.outcome, Outcome::Under);
        assert!((verdict.confidence - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_long_streak_under() {
        let verdict = StreakReversalRule::long_streak().evaluate(&make_rounds("XXXXX")).unwrap();
        assert_eq!(verdict.outcome, Outcome::Over);
    }

    #[test]
    fn test_streak_broken() {
        assert!(StreakReversalRule::long_streak().evaluate(&make_rounds("TTTXT")).is_none());
    }

    #[test]
    fn test_streak_too_short() {
        assert!(StreakReversalRule::long_streak().evaluate(&make_rounds("TTTT")).is_none());
    }

    #[test]
    fn test_triple() {
        let rule = StreakReversalRule::triple();
        assert_eq!(rule.evaluate(&make_rounds("TXXX")).unwrap().outcome, Outcome::Over);
        assert!(rule.evaluate(&make_rounds("XXTX")).is_none());
    }
}
