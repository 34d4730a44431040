use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::service::{IngestReport, PredictorService};

/// Une itération : récupère, valide, applique. Les erreurs sont journalisées
/// et la boucle continue.
pub async fn poll_once(service: &PredictorService) -> Option<IngestReport> {
    match service.refresh().await {
        Ok(report) => {
            if let IngestReport::Duplicate(id) = &report {
                debug!(round_id = *id, "Pas de nouveau tour");
            }
            Some(report)
        }
        Err(e) => {
            warn!(source = %service.source_description(), "Récupération impossible : {}", e);
            None
        }
    }
}

/// Tâche de fond indépendante des requêtes HTTP. Un tick manqué est décalé,
/// jamais rattrapé en rafale.
pub fn spawn_poller(service: Arc<PredictorService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            source = %service.source_description(),
            period_secs = period.as_secs(),
            "Démarrage de la récupération périodique"
        );
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            poll_once(&service).await;
        }
    })
}
