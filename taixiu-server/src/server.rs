use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::FetchMode;
use crate::service::PredictorService;

type AppState = Arc<PredictorService>;

pub fn create_router(service: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", get(predict))
        .route("/history", get(history))
        .layer(cors)
        .with_state(service)
}

async fn root(State(service): State<AppState>) -> String {
    format!("taixiu predictor en ligne ({})", service.operator())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}

async fn predict(State(service): State<AppState>) -> impl IntoResponse {
    if service.fetch_mode() == FetchMode::OnRequest {
        // Un échec amont laisse servir le dernier état valide
        if let Err(e) = service.refresh().await {
            warn!(source = %service.source_description(), "Récupération à la demande impossible : {}", e);
        }
    }

    match service.view().await {
        Some(view) => (StatusCode::OK, Json(json!(view))),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "outcome": "error",
                "message": "Aucun tour reçu pour le moment",
                "operator": service.operator(),
            })),
        ),
    }
}

async fn history(State(service): State<AppState>) -> impl IntoResponse {
    Json(service.history_view().await)
}
