pub mod alternation;
pub mod balance;
pub mod dice_sum;
pub mod majority;
pub mod momentum;
pub mod motif;
pub mod streak;

use std::collections::HashMap;
use taixiu_db::models::{Outcome, Round};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub confidence: f64,
}

impl Verdict {
    pub fn new(outcome: Outcome, confidence: f64) -> Self {
        Self { outcome, confidence }
    }
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    /// rounds.last() = tour le plus récent. `None` si la règle ne s'applique pas.
    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict>;
    fn params(&self) -> HashMap<String, f64>;
}

/// Les `n` derniers tours (moins si l'historique est plus court).
pub fn tail(rounds: &[Round], n: usize) -> &[Round] {
    &rounds[rounds.len().saturating_sub(n)..]
}

pub fn count_over(rounds: &[Round]) -> usize {
    rounds.iter().filter(|r| r.outcome == Outcome::Over).count()
}

/// Chaîne par défaut. L'ordre compte : la première règle qui s'applique gagne.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(streak::StreakReversalRule::long_streak()),
        Box::new(alternation::AlternationRule::new(4)),
        Box::new(balance::ShortWindowBalanceRule::new(10, 7, 3)),
        Box::new(balance::LongWindowRatioRule::new(20, 0.65, 0.35)),
        Box::new(motif::MotifRule::default()),
        Box::new(streak::StreakReversalRule::triple()),
        Box::new(momentum::WeightedMomentumRule::new(20, 0.25)),
        Box::new(momentum::DirectionalTrendRule::new(10, 5)),
        Box::new(dice_sum::DiceSumAverageRule::new(5, 12.0, 9.0)),
        Box::new(majority::MajorityRule::new(5)),
    ]
}

/// Construit un historique à partir d'un motif "TTX..." (T = somme 11, X = somme 10).
pub fn make_rounds(pattern: &str) -> Vec<Round> {
    make_rounds_with(pattern, [4, 4, 3], [3, 4, 3])
}

pub fn make_rounds_with(pattern: &str, over_dice: [u8; 3], under_dice: [u8; 3]) -> Vec<Round> {
    pattern
        .chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .filter_map(|(i, c)| {
            let dice = match c {
                'T' => over_dice,
                'X' => under_dice,
                _ => return None,
            };
            Round::new(i as i64, dice).ok()
        })
        .collect()
}
