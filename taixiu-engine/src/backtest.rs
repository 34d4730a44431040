use rand::RngCore;
use serde::{Deserialize, Serialize};

use taixiu_db::models::Round;
use crate::engine::RuleEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleScore {
    pub rule_name: String,
    pub fired: usize,
    pub hits: usize,
}

impl RuleScore {
    pub fn hit_rate(&self) -> f64 {
        if self.fired == 0 {
            0.0
        } else {
            self.hits as f64 / self.fired as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub window: usize,
    pub n_tests: usize,
    pub correct: usize,
    pub rule_scores: Vec<RuleScore>,
}

impl BacktestReport {
    pub fn accuracy(&self) -> f64 {
        if self.n_tests == 0 {
            0.0
        } else {
            self.correct as f64 / self.n_tests as f64
        }
    }
}

/// Rejoue l'archive : pour chaque tour t, on évalue sur rounds[t-window..t]
/// (strictement avant t) et on compare au résultat du tour t.
///
/// rounds[0] = le plus ancien.
pub fn walk_forward(
    engine: &RuleEngine,
    rounds: &[Round],
    window: usize,
    rng: &mut dyn RngCore,
) -> BacktestReport {
    let mut rule_scores: Vec<RuleScore> = engine
        .rules()
        .iter()
        .map(|r| RuleScore {
            rule_name: r.name().to_string(),
            fired: 0,
            hits: 0,
        })
        .collect();

    let mut n_tests = 0usize;
    let mut correct = 0usize;
    let start = engine.min_history().max(1);

    for t in start..rounds.len() {
        let train = &rounds[t.saturating_sub(window)..t];
        let prediction = engine.evaluate(train, rng);
        let hit = prediction.outcome == rounds[t].outcome;

        n_tests += 1;
        if hit {
            correct += 1;
        }

        let idx = match rule_scores.iter().position(|s| s.rule_name == prediction.rule_name) {
            Some(idx) => idx,
            None => {
                rule_scores.push(RuleScore {
                    rule_name: prediction.rule_name.clone(),
                    fired: 0,
                    hits: 0,
                });
                rule_scores.len() - 1
            }
        };
        rule_scores[idx].fired += 1;
        if hit {
            rule_scores[idx].hits += 1;
        }
    }

    BacktestReport {
        window,
        n_tests,
        correct,
        rule_scores,
    }
}
