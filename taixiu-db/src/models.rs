use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Seuil canonique : somme > 10 → Tài.
pub const OVER_THRESHOLD: u8 = 10;
pub const MIN_SUM: u8 = 3;
pub const MAX_SUM: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "Tài", alias = "Tai", alias = "Over")]
    Over,
    #[serde(rename = "Xỉu", alias = "Xiu", alias = "Under")]
    Under,
}

impl Outcome {
    pub fn from_sum(sum: u8) -> Self {
        if sum > OVER_THRESHOLD {
            Outcome::Over
        } else {
            Outcome::Under
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Outcome::Over => Outcome::Under,
            Outcome::Under => Outcome::Over,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Outcome::Over => 'T',
            Outcome::Under => 'X',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Over => "Tài",
            Outcome::Under => "Xỉu",
        }
    }

    /// Interprète un libellé textuel amont ("Tài", "tai", "X", "under"...).
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "tài" | "tai" | "t" | "over" => Some(Outcome::Over),
            "xỉu" | "xiu" | "x" | "under" => Some(Outcome::Under),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub sequence_id: i64,
    pub dice: [u8; 3],
    pub sum: u8,
    pub outcome: Outcome,
}

impl Round {
    /// Seul point d'entrée : somme et résultat sont toujours dérivés des dés.
    pub fn new(sequence_id: i64, dice: [u8; 3]) -> Result<Self> {
        validate_dice(&dice)?;
        let sum: u8 = dice.iter().sum();
        Ok(Self {
            sequence_id,
            dice,
            sum,
            outcome: Outcome::from_sum(sum),
        })
    }

    /// Vérifie la cohérence d'un tour désérialisé (snapshot édité à la main, etc.).
    pub fn is_consistent(&self) -> bool {
        validate_dice(&self.dice).is_ok()
            && self.dice.iter().sum::<u8>() == self.sum
            && Outcome::from_sum(self.sum) == self.outcome
    }
}

pub fn validate_dice(dice: &[u8; 3]) -> Result<()> {
    for &d in dice {
        if !(1..=6).contains(&d) {
            bail!("Dé {} hors limites (1-6)", d);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionStats {
    pub total_predictions: u64,
    pub correct: u64,
    pub incorrect: u64,
}

impl PredictionStats {
    pub fn record(&mut self, predicted: Outcome, actual: Outcome) {
        self.total_predictions += 1;
        if predicted == actual {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    /// Pourcentage de bonnes prédictions, 0 tant que rien n'a été évalué.
    pub fn accuracy(&self) -> f64 {
        if self.total_predictions == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total_predictions as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub outcome: Outcome,
    pub rule_name: String,
    pub confidence: f64,
}
