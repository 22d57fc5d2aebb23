//! HTTP surface: one rendering endpoint, a sample endpoint and a service
//! description.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::{Error, ReportConfig, ReportData, render_report};

/// Rendering failure reported to the client as HTTP 500.
#[derive(Debug)]
pub struct ApiError(String);

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::error!("Error generando PDF: {}", self.0);
        let body = ErrorBody {
            detail: format!("Error generando PDF: {}", self.0),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn pdf_response(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn render(config: Arc<ReportConfig>, data: ReportData) -> Result<Vec<u8>, ApiError> {
    let bytes = tokio::task::spawn_blocking(move || render_report(&data, &config)).await??;
    Ok(bytes)
}

async fn generate_pdf(
    State(config): State<Arc<ReportConfig>>,
    Json(data): Json<ReportData>,
) -> Result<Response, ApiError> {
    log::info!(
        "Generating report for {} ({} dimensions)",
        data.organizacion.nombre.as_deref().unwrap_or("N/A"),
        data.dimensiones.len()
    );
    let file_name = data.file_name();
    let bytes = render(config, data).await?;
    Ok(pdf_response(bytes, &file_name))
}

async fn sample_pdf(State(config): State<Arc<ReportConfig>>) -> Result<Response, ApiError> {
    let bytes = render(config, ReportData::sample()).await?;
    Ok(pdf_response(bytes, "reporte-test.pdf"))
}

async fn describe() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Servicio de reportes PDF funcionando.",
        "endpoints": {
            "POST /generar-pdf": "Genera PDF desde JSON (principal)",
            "GET /pdf": "Genera PDF de prueba",
        },
    }))
}

pub fn router(config: Arc<ReportConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(describe))
        .route("/generar-pdf", post(generate_pdf))
        .route("/pdf", get(sample_pdf))
        .layer(cors)
        .with_state(config)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, config: ReportConfig) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!(
        "Listening on {} (assets {}, fonts {})",
        listener.local_addr()?,
        config.assets_dir.display(),
        config.font_family.as_deref().unwrap_or("built-in"),
    );
    axum::serve(listener, router(Arc::new(config)))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Failed to listen for Ctrl-C: {e}");
            }
            log::info!("Shutting down");
        })
        .await?;
    Ok(())
}
