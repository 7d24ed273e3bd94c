use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::Pipeline;
use crate::models::{HealthResponse, PetDescription};
use crate::routes::pipeline_error_response;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Configure health and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/search", web::post().to(search_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        corpus_size: state.pipeline.corpus().len(),
        embeddings_enabled: state.pipeline.embeddings_enabled(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run only the matching stage
///
/// POST /api/v1/matches/search
///
/// Request body: a structured `PetDescription`
/// ```json
/// {
///   "species": "dog",
///   "size": "medium",
///   "colors": ["white", "brown"],
///   "distinctive_features": ["red collar"],
///   "last_seen_location": {"province": "San José", "canton": "Escazú", "district": "San Rafael"}
/// }
/// ```
async fn search_matches(
    state: web::Data<AppState>,
    req: web::Json<PetDescription>,
) -> impl Responder {
    let query = req.into_inner();

    tracing::info!(
        "Searching matches for {} {} in {}",
        query.size,
        query.species,
        query.last_seen_location.canton
    );

    match state.pipeline.search(query).await {
        Ok(result) => {
            tracing::info!(
                "Returning {} candidates, confidence {}",
                result.candidates.len(),
                result.confidence_level
            );
            HttpResponse::Ok().json(result)
        }
        Err(e) => pipeline_error_response(&e),
    }
}
