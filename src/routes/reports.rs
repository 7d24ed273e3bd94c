use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{ReportKind, ReportRequest};
use crate::routes::{error_response, matches::AppState, pipeline_error_response};

/// Configure report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/reports/lost", web::post().to(report_lost))
        .route("/reports/sighting", web::post().to(report_sighting))
        .route("/reports/{id}", web::get().to(get_report));
}

/// POST /api/v1/reports/lost
async fn report_lost(state: web::Data<AppState>, req: web::Json<ReportRequest>) -> impl Responder {
    process_report(&state, req.into_inner(), ReportKind::Lost).await
}

/// POST /api/v1/reports/sighting
async fn report_sighting(state: web::Data<AppState>, req: web::Json<ReportRequest>) -> impl Responder {
    process_report(&state, req.into_inner(), ReportKind::Sighting).await
}

async fn process_report(state: &AppState, mut request: ReportRequest, kind: ReportKind) -> HttpResponse {
    // The route decides the kind, whatever the body says
    request.report_type = kind;

    if let Err(errors) = request.validate() {
        tracing::info!("Validation failed for {} report: {:?}", kind, errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    match state.pipeline.process(request).await {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => pipeline_error_response(&e),
    }
}

/// GET /api/v1/reports/{id}
async fn get_report(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.pipeline.corpus().get(&id) {
        Some(record) => HttpResponse::Ok().json(record),
        None => error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("Report {} not found", id),
        ),
    }
}
