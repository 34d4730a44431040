use rand::{Rng, RngCore};

use taixiu_db::models::{Outcome, Prediction, Round};
use crate::rules::{default_rules, Rule};

/// En dessous, le moteur tire au hasard.
pub const MIN_HISTORY: usize = 5;
pub const INSUFFICIENT_DATA: &str = "insufficient_data";
/// Aucune règle de la chaîne ne s'est appliquée (chaîne personnalisée sans repli).
pub const NO_MATCH: &str = "no_match";
const FALLBACK_CONFIDENCE: f64 = 0.5;

pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
    min_history: usize,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            min_history: MIN_HISTORY,
        }
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    /// rounds : ordre chronologique. La première règle applicable gagne.
    /// Le hasard n'intervient que dans les cas de repli, via `rng`.
    pub fn evaluate(&self, rounds: &[Round], rng: &mut dyn RngCore) -> Prediction {
        if rounds.len() < self.min_history {
            return random_prediction(INSUFFICIENT_DATA, rng);
        }

        for rule in &self.rules {
            if let Some(verdict) = rule.evaluate(rounds) {
                return Prediction {
                    outcome: verdict.outcome,
                    rule_name: rule.name().to_string(),
                    confidence: verdict.confidence.clamp(0.0, 1.0),
                };
            }
        }

        random_prediction(NO_MATCH, rng)
    }
}

fn random_prediction(rule_name: &str, rng: &mut dyn RngCore) -> Prediction {
    let outcome = if rng.random_bool(0.5) {
        Outcome::Over
    } else {
        Outcome::Under
    };
    Prediction {
        outcome,
        rule_name: rule_name.to_string(),
        confidence: FALLBACK_CONFIDENCE,
    }
}
