use std::collections::HashMap;
use taixiu_db::models::{Outcome, Round};
use super::{count_over, tail, Rule, Verdict};

/// Dernier recours : majorité sur la fenêtre. S'applique toujours.
pub struct MajorityRule {
    window: usize,
}

impl MajorityRule {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl Rule for MajorityRule {
    fn name(&self) -> &str {
        "majority"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        let last = tail(rounds, self.window);
        let over = count_over(last);
        let outcome = if over * 2 > last.len() {
            Outcome::Over
        } else {
            Outcome::Under
        };
        Some(Verdict::new(outcome, 0.52))
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("window".to_string(), self.window as f64)])
    }
}
