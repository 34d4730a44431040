use std::collections::HashMap;
use taixiu_db::models::Round;
use super::{tail, Rule, Verdict};

/// Alternance stricte sur `window` tours (T X T X) : on suit l'alternance.
pub struct AlternationRule {
    window: usize,
}

impl AlternationRule {
    pub fn new(window: usize) -> Self {
        Self { window: window.max(2) }
    }
}

impl Rule for AlternationRule {
    fn name(&self) -> &str {
        "alternation"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        if rounds.len() < self.window {
            return None;
        }
        let last = tail(rounds, self.window);
        let alternating = last.windows(2).all(|w| w[0].outcome != w[1].outcome);
        if !alternating {
            return None;
        }
        let latest = last[last.len() - 1].outcome;
        Some(Verdict::new(latest.opposite(), 0.65))
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("window".to_string(), self.window as f64)])
    }
}
