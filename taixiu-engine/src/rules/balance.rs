use std::collections::HashMap;
use taixiu_db::models::{Outcome, Round};
use super::{count_over, tail, Rule, Verdict};

/// Sur les `window` derniers tours : trop de Tài → Xỉu, trop peu → Tài.
/// Seuils inclusifs, en nombre de tours.
pub struct ShortWindowBalanceRule {
    window: usize,
    high: usize,
    low: usize,
}

impl ShortWindowBalanceRule {
    pub fn new(window: usize, high: usize, low: usize) -> Self {
        Self { window, high, low }
    }
}

impl Rule for ShortWindowBalanceRule {
    fn name(&self) -> &str {
        "short_window_balance"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        if self.window == 0 || rounds.len() < self.window {
            return None;
        }
        let over = count_over(tail(rounds, self.window));
        if over >= self.high {
            Some(Verdict::new(Outcome::Under, 0.70))
        } else if over <= self.low {
            Some(Verdict::new(Outcome::Over, 0.70))
        } else {
            None
        }
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.window as f64),
            ("high".to_string(), self.high as f64),
            ("low".to_string(), self.low as f64),
        ])
    }
}

/// Même idée sur une fenêtre longue, seuils stricts en proportion.
pub struct LongWindowRatioRule {
    window: usize,
    high: f64,
    low: f64,
}

impl LongWindowRatioRule {
    pub fn new(window: usize, high: f64, low: f64) -> Self {
        Self { window, high, low }
    }
}

impl Rule for LongWindowRatioRule {
    fn name(&self) -> &str {
        "long_window_ratio"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        if self.window == 0 || rounds.len() < self.window {
            return None;
        }
        let share = count_over(tail(rounds, self.window)) as f64 / self.window as f64;
        if share > self.high {
            Some(Verdict::new(Outcome::Under, 0.65))
        } else if share < self.low {
            Some(Verdict::new(Outcome::Over, 0.65))
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
