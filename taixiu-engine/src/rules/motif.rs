use std::collections::HashMap;
use taixiu_db::models::{Outcome, Round};
use super::{tail, Rule, Verdict};

/// Motifs de trois symboles codés en dur → prédiction associée.
pub struct MotifRule {
    motifs: Vec<([Outcome; 3], Outcome)>,
}

impl MotifRule {
    pub fn new(motifs: Vec<([Outcome; 3], Outcome)>) -> Self {
        Self { motifs }
    }
}

impl Default for MotifRule {
    fn default() -> Self {
        use Outcome::{Over, Under};
        Self::new(vec![
            ([Over, Over, Under], Over),
            ([Under, Under, Over], Under),
        ])
    }
}

impl Rule for MotifRule {
    fn name(&self) -> &str {
        "motif"
    }

    fn evaluate(&self, rounds: &[Round]) -> Option<Verdict> {
        if rounds.len() < 3 {
            return None;
        }
        let last: Vec<Outcome> = tail(rounds, 3).iter().map(|r| r.outcome).collect();
        self.motifs
            .iter()
            .find(|(motif, _)| motif.as_slice() == last.as_slice())
            .map(|(_, prediction)| Verdict::new(*prediction, 0.60))
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("motifs".to_string(), self.motifs.len() as f64)])
    }
}
