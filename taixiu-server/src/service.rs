use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use taixiu_db::db::insert_round;
use taixiu_db::models::{Outcome, Prediction, Round};
use taixiu_db::rusqlite::Connection;
use taixiu_db::snapshot::{load_snapshot, save_snapshot};
use taixiu_engine::engine::RuleEngine;
use taixiu_engine::tracker::{IngestOutcome, PredictorState};

use crate::config::{FetchMode, ServiceConfig};
use crate::fetch::{parse_record, FetchError, PayloadError, RoundSource, UpstreamRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestReport {
    Accepted {
        round_id: i64,
        scored: Option<bool>,
        prediction: Prediction,
    },
    Duplicate(i64),
    /// Tour plus ancien que le dernier tour connu.
    Stale { round_id: i64, latest: i64 },
    Rejected(PayloadError),
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub round_id: i64,
    pub outcome: Outcome,
    pub dice: [u8; 3],
    pub sum: u8,
    pub prediction: Outcome,
    pub rule: String,
    pub confidence: f64,
    pub pattern: String,
    pub total_predictions: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub accuracy: f64,
    pub history_len: usize,
    pub updated_at: Option<DateTime<Utc>>,
    pub operator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub pattern: String,
    pub rounds: Vec<Round>,
    pub operator: String,
}

/// Orchestrateur : une seule mutation à la fois (`ingest_lock`), lectures
/// concurrentes sur l'état publié (`state`).
pub struct PredictorService {
    engine: RuleEngine,
    state: RwLock<PredictorState>,
    ingest_lock: Mutex<()>,
    rng: std::sync::Mutex<StdRng>,
    source: Arc<dyn RoundSource>,
    archive: Option<std::sync::Mutex<Connection>>,
    snapshot_path: Option<PathBuf>,
    operator: String,
    fetch_mode: FetchMode,
}

impl PredictorService {
    pub fn new(config: ServiceConfig, source: Arc<dyn RoundSource>, archive: Option<Connection>) -> Self {
        let engine = RuleEngine::default();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let state = match &config.snapshot_path {
            None => PredictorState::new(config.capacity),
            Some(path) => match load_snapshot(path) {
                Ok(Some(snapshot)) => {
                    let (state, dropped) = PredictorState::restore(snapshot, config.capacity, &engine, &mut rng);
                    info!(
                        path = %path.display(),
                        rounds = state.history().len(),
                        dropped,
                        "Snapshot chargé"
                    );
                    state
                }
                Ok(None) => {
                    info!(path = %path.display(), "Aucun snapshot, démarrage à vide");
                    PredictorState::new(config.capacity)
                }
                Err(e) => {
                    warn!("Snapshot ignoré, démarrage à vide : {:#}", e);
                    PredictorState::new(config.capacity)
                }
            },
        };

        Self {
            engine,
            state: RwLock::new(state),
            ingest_lock: Mutex::new(()),
            rng: std::sync::Mutex::new(rng),
            source,
            archive: archive.map(std::sync::Mutex::new),
            snapshot_path: config.snapshot_path,
            operator: config.operator,
            fetch_mode: config.fetch_mode,
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Récupère un tour auprès de la source puis l'ingère.
    pub async fn refresh(&self) -> Result<IngestReport, FetchError> {
        let record = self.source.fetch().await?;
        Ok(self.ingest_record(&record).await)
    }

    /// Valide puis applique un enregistrement amont. Un enregistrement rejeté
    /// ne touche ni l'historique ni les compteurs.
    pub async fn ingest_record(&self, record: &UpstreamRecord) -> IngestReport {
        let round = match parse_record(record) {
            Ok(round) => round,
            Err(e) => {
                warn!(error = %e, "Enregistrement amont rejeté");
                return IngestReport::Rejected(e);
            }
        };

        if let Some(reported) = record.reported_outcome() {
            if reported != round.outcome {
                warn!(
                    round_id = round.sequence_id,
                    sum = round.sum,
                    reported = %reported,
                    computed = %round.outcome,
                    "Libellé amont incohérent avec la somme, le seuil canonique fait foi"
                );
            }
        }

        let _guard = self.ingest_lock.lock().await;

        let (scored, prediction, snapshot) = {
            let mut state = self.state.write().await;
            let outcome = {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                state.ingest(round.clone(), &self.engine, &mut *rng)
            };
            match outcome {
                IngestOutcome::Duplicate => {
                    debug!(round_id = round.sequence_id, "Tour déjà connu, ignoré");
                    return IngestReport::Duplicate(round.sequence_id);
                }
                IngestOutcome::Stale { latest } => {
                    warn!(round_id = round.sequence_id, latest, "Tour antérieur au dernier connu, ignoré");
                    return IngestReport::Stale {
                        round_id: round.sequence_id,
                        latest,
                    };
                }
                IngestOutcome::Accepted { scored, prediction } => {
                    let snapshot = self.snapshot_path.as_ref().map(|_| state.snapshot());
                    (scored, prediction, snapshot)
                }
            }
        };

        info!(
            round_id = round.sequence_id,
            dice = ?round.dice,
            sum = round.sum,
            outcome = %round.outcome,
            scored = ?scored,
            prediction = %prediction.outcome,
            rule = %prediction.rule_name,
            "Tour accepté"
        );

        if let (Some(path), Some(snapshot)) = (&self.snapshot_path, snapshot) {
            if let Err(e) = save_snapshot(&snapshot, path) {
                error!("Échec de la sauvegarde du snapshot : {:#}", e);
            }
        }

        if let Some(archive) = &self.archive {
            let conn = archive.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = insert_round(&conn, &round, &Utc::now().to_rfc3339()) {
                warn!(round_id = round.sequence_id, "Archivage impossible : {:#}", e);
            }
        }

        IngestReport::Accepted {
            round_id: round.sequence_id,
            scored,
            prediction,
        }
    }

    /// Dernier état publié ; `None` tant qu'aucun tour n'a été accepté.
    pub async fn view(&self) -> Option<PredictionView> {
        let state = self.state.read().await;
        let latest = state.history().latest()?;
        let pending = state.pending()?;
        let stats = state.stats();

        Some(PredictionView {
            round_id: latest.sequence_id,
            outcome: latest.outcome,
            dice: latest.dice,
            sum: latest.sum,
            prediction: pending.outcome,
            rule: pending.rule_name.clone(),
            confidence: pending.confidence,
            pattern: state.history().pattern_string(),
            total_predictions: stats.total_predictions,
            correct: stats.correct,
            incorrect: stats.incorrect,
            accuracy: (stats.accuracy() * 100.0).round() / 100.0,
            history_len: state.history().len(),
            updated_at: state.last_update(),
            operator: self.operator.clone(),
        })
    }

    pub async fn history_view(&self) -> HistoryView {
        let state = self.state.read().await;
        HistoryView {
            pattern: state.history().pattern_string(),
            rounds: state.history().to_vec(),
            operator: self.operator.clone(),
        }
    }

    pub async fn history_len(&self) -> usize {
        self.state.read().await.history().len()
    }
}
