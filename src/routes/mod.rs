// Route exports
pub mod matches;
pub mod reports;

use actix_web::{error, http::StatusCode, web, HttpResponse};

use crate::core::PipelineError;
use crate::models::ErrorResponse;

pub use matches::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(reports::configure),
    );
}

/// JSON extractor config that answers malformed bodies with an `ErrorResponse`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = error_response(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", err));
    error::InternalError::from_response(err, response).into()
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Input problems are the caller's fault, anything later is ours
pub(crate) fn pipeline_error_response(err: &PipelineError) -> HttpResponse {
    match err {
        PipelineError::InvalidInput(e) => {
            error_response(StatusCode::BAD_REQUEST, "Validation failed", e.to_string())
        }
        PipelineError::InvalidMatchResult(_) | PipelineError::InvalidOutput(_) => {
            tracing::error!("Pipeline produced an invalid result: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Processing failed",
                err.to_string(),
            )
        }
    }
}
