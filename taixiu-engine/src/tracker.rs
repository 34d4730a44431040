use chrono::{DateTime, Utc};
use rand::RngCore;

use taixiu_db::history::History;
use taixiu_db::models::{Prediction, PredictionStats, Round};
use taixiu_db::snapshot::Snapshot;
use crate::engine::RuleEngine;

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// `scored` : verdict de la prédiction précédente, s'il y en avait une.
    Accepted {
        scored: Option<bool>,
        prediction: Prediction,
    },
    Duplicate,
    /// Identifiant antérieur au dernier tour connu : l'historique reste chronologique.
    Stale { latest: i64 },
}

/// État complet du prédicteur : historique, compteurs et prédiction en attente.
/// Construit explicitement au démarrage et possédé par l'appelant.
#[derive(Debug, Clone)]
pub struct PredictorState {
    history: History,
    stats: PredictionStats,
    pending: Option<Prediction>,
    last_update: Option<DateTime<Utc>>,
}

impl PredictorState {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
            stats: PredictionStats::default(),
            pending: None,
            last_update: None,
        }
    }

    /// Restaure depuis un snapshot et recalcule la prédiction en attente.
    /// Retourne aussi le nombre d'entrées écartées du snapshot.
    pub fn restore(
        snapshot: Snapshot,
        capacity: usize,
        engine: &RuleEngine,
        rng: &mut dyn RngCore,
    ) -> (Self, usize) {
        let last_update = snapshot.updated_at;
        let (history, stats, dropped) = snapshot.restore(capacity);
        let mut state = Self {
            history,
            stats,
            pending: None,
            last_update,
        };
        if !state.history.is_empty() {
            state.pending = Some(engine.evaluate(state.history.as_slice(), rng));
        }
        (state, dropped)
    }

    /// Ajoute un tour validé. La prédiction précédente est comptée contre le
    /// vrai résultat avant d'évaluer la suivante. Un doublon ou un tour plus
    /// ancien que le dernier connu ne change rien.
    pub fn ingest(&mut self, round: Round, engine: &RuleEngine, rng: &mut dyn RngCore) -> IngestOutcome {
        if self.history.contains(round.sequence_id) {
            return IngestOutcome::Duplicate;
        }
        if let Some(latest) = self.history.latest() {
            if round.sequence_id < latest.sequence_id {
                return IngestOutcome::Stale { latest: latest.sequence_id };
            }
        }

        let actual = round.outcome;
        if !self.history.append(round) {
            return IngestOutcome::Duplicate;
        }

        let scored = self.pending.take().map(|previous| {
            self.stats.record(previous.outcome, actual);
            previous.outcome == actual
        });

        let prediction = engine.evaluate(self.history.as_slice(), rng);
        self.pending = Some(prediction.clone());
        self.last_update = Some(Utc::now());

        IngestOutcome::Accepted { scored, prediction }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            updated_at: self.last_update,
            ..Snapshot::capture(&self.history, &self.stats)
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn stats(&self) -> &PredictionStats {
        &self.stats
    }

    /// Prédiction publiée pour le prochain tour.
    pub fn pending(&self) -> Option<&Prediction> {
        self.pending.as_ref()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::FixedRng;
    use crate::engine::INSUFFICIENT_DATA;
    use taixiu_db::models::Outcome;

    fn over(id: i64) -> Round {
        Round::new(id, [6, 5, 4]).unwrap()
    }

    fn under(id: i64) -> Round {
        Round::new(id, [1, 2, 3]).unwrap()
    }

    #[test]
    fn test_first_round_not_scored() {
        let engine = RuleEngine::default();
        let mut state = PredictorState::new(20);
        let outcome = state.ingest(over(1), &engine, &mut FixedRng(0));
        match outcome {
            IngestOutcome::Accepted { scored, prediction } => {
                assert_eq!(scored, None);
                assert_eq!(prediction.rule_name, INSUFFICIENT_DATA);
            }
            other => panic!("should be accepted, got {:?}", other),
        }
        assert_eq!(state.stats().total_predictions, 0);
        assert!(state.last_update().is_some());
    }

    #[test]
    fn test_scores_previous_prediction() {
        let engine = RuleEngine::default();
        let mut state = PredictorState::new(20);
        // FixedRng(0) → prédiction aléatoire Tài tant que l'historique est court
        state.ingest(over(1), &engine, &mut FixedRng(0));
        state.ingest(over(2), &engine, &mut FixedRng(0));
        state.ingest(under(3), &engine, &mut FixedRng(0));

        let stats = state.stats();
        assert_eq!(stats.total_predictions, 2);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(state.pending().unwrap().outcome, Outcome::Over);
    }

    #[test]
    fn test_duplicate_leaves_state_untouched() {
        let engine = RuleEngine::default();
        let mut state = PredictorState::new(20);
        state.ingest(over(1), &engine, &mut FixedRng(0));
        state.ingest(under(2), &engine, &mut FixedRng(0));
        let stats_before = *state.stats();
        let len_before = state.history().len();

        assert_eq!(state.ingest(over(2), &engine, &mut FixedRng(0)), IngestOutcome::Duplicate);
        assert_eq!(*state.stats(), stats_before);
        assert_eq!(state.history().len(), len_before);
    }

    #[test]
    fn test_restore_primes_prediction() {
        let engine = RuleEngine::default();
        let mut state = PredictorState::new(20);
        for id in 0..5 {
            state.ingest(over(id), &engine, &mut FixedRng(0));
        }
        let snapshot = state.snapshot();

        let (restored, dropped) = PredictorState::restore(snapshot, 20, &engine, &mut FixedRng(0));
        assert_eq!(dropped, 0);
        assert_eq!(restored.history(), state.history());
        assert_eq!(restored.stats(), state.stats());
        let pending = restored.pending().unwrap();
        assert_eq!(pending.rule_name, "streak_reversal");
        assert_eq!(pending.outcome, Outcome::Under);
        assert_eq!(restored.last_update(), state.last_update());
        assert!(restored.last_update().is_some());
    }

    #[test]
    fn test_stale_round_rejected_after_eviction() {
        let engine = RuleEngine::default();
        let mut state = PredictorState::new(3);
        for id in 10..15 {
            state.ingest(over(id), &engine, &mut FixedRng(0));
        }
        // 10 et 11 ont été évincés : ils ne doivent pas revenir en queue
        let stats_before = *state.stats();
        assert_eq!(
            state.ingest(under(10), &engine, &mut FixedRng(0)),
            IngestOutcome::Stale { latest: 14 }
        );
        assert_eq!(state.ingest(under(13), &engine, &mut FixedRng(0)), IngestOutcome::Duplicate);
        assert_eq!(*state.stats(), stats_before);
        assert_eq!(state.history().pattern_string(), "TTT");

        // Un saut d'identifiants vers l'avant reste accepté
        assert!(matches!(
            state.ingest(under(20), &engine, &mut FixedRng(0)),
            IngestOutcome::Accepted { .. }
        ));
        let ids: Vec<i64> = state.history().rounds().map(|r| r.sequence_id).collect();
        assert_eq!(ids, vec![13, 14, 20]);
    }

    #[test]
    fn test_restore_empty_snapshot() {
        let engine = RuleEngine::default();
        let (restored, _) = PredictorState::restore(Snapshot::default(), 20, &engine, &mut FixedRng(0));
        assert!(restored.history().is_empty());
        assert!(restored.pending().is_none());
    }
}
