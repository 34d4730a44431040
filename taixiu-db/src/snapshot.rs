use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::History;
use crate::models::{PredictionStats, Round};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub history: Vec<Round>,
    #[serde(default)]
    pub stats: PredictionStats,
    /// Date du dernier tour accepté avant la sauvegarde.
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn capture(history: &History, stats: &PredictionStats) -> Self {
        Self {
            history: history.to_vec(),
            stats: *stats,
            updated_at: None,
        }
    }

    /// Reconstruit l'historique en repassant par `History::append` :
    /// capacité, doublons et cohérence des dés sont revérifiés.
    /// Retourne aussi le nombre d'entrées écartées.
    pub fn restore(self, capacity: usize) -> (History, PredictionStats, usize) {
        let mut history = History::new(capacity);
        let mut dropped = 0;
        for round in self.history {
            if !round.is_consistent() || !history.append(round) {
                dropped += 1;
            }
        }
        (history, self.stats, dropped)
    }
}

pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
        }
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire le snapshot {:?}", path))?;
    Ok(())
}

/// `Ok(None)` si le fichier n'existe pas encore.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire le snapshot {:?}", path))?;
    let snapshot: Snapshot = serde_json::from_str(&json)
        .with_context(|| format!("Snapshot illisible {:?}", path))?;
    Ok(Some(snapshot))
}
