use std::collections::HashMap;
use taixiu_db::models::{Outcome, Round};
use super::{tail, Rule, Verdict};

/// Poids linéaires croissants avec la récence : w = 1 pour le plus ancien, w = n pour le plus récent.
/// Si l'écart pondéré relatif dépasse `gap`, on parie sur le résultat le moins pondéré.
pub struct WeightedMomentumRule {
    window: usize,
    gap: f64,
}

impl WeightedMomentumRule {
    pub fn new(window: usize, gap: f64) -> Self {
        Self { window, gap }
    }

    pub fn weighted_scores(&self, rounds: &[Round]) -> (f64, f64) {
        let mut over = 0.0f64;
        let mut under = 0.0f64;
        for (i, round) in tail(rounds, self.window).iter().enumerate() {
            let weight = (i + 1) as f64;
            match round.outcome {
                Outcome::Over => over += weight,
                Outcome::Under => under += weight,
            }
        }
        (over, under)
    }
}

impl Rule for WeightedMomentumRule {
    fn name(&self) -> &str {
        "weighted_momentum"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        let (over, under) = self.weighted_scores(rounds);
        let total = over + under;
        if total <= 0.0 {
            return None;
        }
        if (over - under).abs() / total <= self.gap {
            return None;
        }
        let outcome = if over < under { Outcome::Over } else { Outcome::Under };
        Some(Verdict::new(outcome, 0.58))
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.window as f64),
            ("gap".to_string(), self.gap),
        ])
    }
}

/// Tài = +1, Xỉu = -1 sur la fenêtre ; au-delà de ±`threshold`, on suit la tendance.
pub struct DirectionalTrendRule {
    window: usize,
    threshold: i32,
}

impl DirectionalTrendRule {
    pub fn new(window: usize, threshold: i32) -> Self {
        Self { window, threshold }
    }
}

impl Rule for DirectionalTrendRule {
    fn name(&self) -> &str {
        "directional_trend"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        let trend: i32 = tail(rounds, self.window)
            .iter()
            .map(|r| match r.outcome {
                Outcome::Over => 1,
                Outcome::Under => -1,
            })
            .sum();
        if trend >= self.threshold {
            Some(Verdict::new(Outcome::Over, 0.57))
        } else if trend <= -self.threshold {
            Some(Verdict::new(Outcome::Under, 0.57))
        } else {
            None
        }
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("window".to_string(), self.window as f64),
            ("threshold".to_string(), self.threshold as f64),
        ])
    }
}
