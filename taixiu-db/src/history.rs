use std::collections::VecDeque;

use crate::models::Round;

/// Capacité par défaut de l'historique glissant.
pub const HISTORY_CAPACITY: usize = 50;

/// Historique borné, du plus ancien au plus récent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    rounds: VecDeque<Round>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rounds: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Ajoute un tour en queue. Retourne `false` (sans rien modifier) si
    /// l'identifiant est déjà présent ; évince le plus ancien au-delà de la capacité.
    pub fn append(&mut self, round: Round) -> bool {
        if self.contains(round.sequence_id) {
            return false;
        }
        self.rounds.push_back(round);
        while self.rounds.len() > self.capacity {
            self.rounds.pop_front();
        }
        true
    }

    pub fn contains(&self, sequence_id: i64) -> bool {
        self.rounds.iter().any(|r| r.sequence_id == sequence_id)
    }

    /// Les `k` derniers tours, ordre chronologique.
    pub fn recent(&self, k: usize) -> Vec<Round> {
        let start = self.rounds.len().saturating_sub(k);
        self.rounds.range(start..).cloned().collect()
    }

    pub fn pattern_string(&self) -> String {
        self.rounds.iter().map(|r| r.outcome.symbol()).collect()
    }

    pub fn latest(&self) -> Option<&Round> {
        self.rounds.back()
    }

    /// Vue contiguë pour le moteur de règles.
    pub fn as_slice(&mut self) -> &[Round] {
        self.rounds.make_contiguous()
    }

    pub fn rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }

    pub fn to_vec(&self) -> Vec<Round> {
        self.rounds.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(id: i64) -> Round {
        let d = (id.rem_euclid(6) + 1) as u8;
        Round::new(id, [d, d, 1]).unwrap()
    }

    #[test]
    fn test_append_and_len() {
        let mut history = History::new(5);
        assert!(history.is_empty());
        assert!(history.append(round(1)));
        assert!(history.append(round(2)));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().sequence_id, 2);
    }

    #[test]
    fn test_capacity_fifo_eviction() {
        let mut history = History::new(20);
        for id in 0..57 {
            history.append(round(id));
            assert!(history.len() <= 20);
        }
        let ids: Vec<i64> = history.rounds().map(|r| r.sequence_id).collect();
        assert_eq!(ids, (37..57).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_ignored() {
        let mut history = History::new(10);
        history.append(round(1));
        history.append(round(2));
        let before = history.clone();

        assert!(!history.append(round(1)));
        assert_eq!(history, before);
    }

    #[test]
    fn test_recent_order() {
        let mut history = History::new(10);
        for id in 1..=6 {
            history.append(round(id));
        }
        let ids: Vec<i64> = history.recent(3).iter().map(|r| r.sequence_id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
        assert_eq!(history.recent(100).len(), 6);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_pattern_string() {
        let mut history = History::new(10);
        history.append(Round::new(1, [6, 6, 6]).unwrap());
        history.append(Round::new(2, [1, 2, 3]).unwrap());
        history.append(Round::new(3, [4, 4, 3]).unwrap());
        assert_eq!(history.pattern_string(), "TXT");
    }

    #[test]
    fn test_as_slice_after_wraparound() {
        let mut history = History::new(3);
        for id in 1..=5 {
            history.append(round(id));
        }
        let ids: Vec<i64> = history.as_slice().iter().map(|r| r.sequence_id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }
}
