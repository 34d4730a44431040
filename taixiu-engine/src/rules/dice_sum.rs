use std::collections::HashMap;
use taixiu_db::models::{Outcome, Round};
use super::{tail, Rule, Verdict};

/// Moyenne des sommes sur la fenêtre comparée au milieu 10/11 ;
/// ne se prononce que si la moyenne s'en écarte nettement.
pub struct DiceSumAverageRule {
    window: usize,
    high: f64,
    low: f64,
}

impl DiceSumAverageRule {
    pub fn new(window: usize, high: f64, low: f64) -> Self {
        Self { window, high, low }
    }

    pub fn mean_sum(&self, rounds: &[Round]) -> Option<f64> {
        let last = tail(rounds, self.window);
        if last.is_empty() {
            return None;
        }
        let total: u32 = last.iter().map(|r| r.sum as u32).sum();
        Some(total as f64 / last.len() as f64)
    }
}

impl Rule for DiceSumAverageRule {
    fn name(&self) -> &str {
        "dice_sum_average"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        let mean = self.mean_sum(rounds)?;
        if mean >= self.high {
            Some(Verdict::new(Outcome::Over, 0.55))
        } else if mean <= self.low {
            Some(Verdict::new(Outcome::Under, 0.55))
        } else {
            None
        }
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.window as f64),
            ("high".to_string(), self.high),
            ("low".to_string(), self.low),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{make_rounds, make_rounds_with};

    #[test]
    fn test_mean_sum() {
        let rule = DiceSumAverageRule::new(5, 12.0, 9.0);
        let rounds = make_rounds_with("TXXTX", [6, 6, 5], [3, 4, 3]);
        // 17 + 10 + 10 + 17 + 10 = 64
        assert!((rule.mean_sum(&rounds).unwrap() - 12.8).abs() < 1e-10);
        assert!(rule.mean_sum(&[]).is_none());
    }

    #[test]
    fn test_high_average() {
        let rule = DiceSumAverageRule::new(5, 12.0, 9.0);
        let rounds = make_rounds_with("TXXTX", [6, 6, 5], [3, 4, 3]);
        assert_eq!(rule.evaluate(&rounds).unwrap().outcome, Outcome::Over);
    }

    #[test]
    fn test_low_average() {
        let rule = DiceSumAverageRule::new(5, 12.0, 9.0);
        let rounds = make_rounds_with("TTXXX", [4, 4, 3], [1, 2, 3]);
        // 11 + 11 + 6 + 6 + 6 = 40
        assert_eq!(rule.evaluate(&rounds).unwrap().outcome, Outcome::Under);
    }

    #[test]
    fn test_near_midpoint() {
        let rule = DiceSumAverageRule::new(5, 12.0, 9.0);
        assert!(rule.evaluate(&make_rounds("TXTXT")).is_none());
    }
}
