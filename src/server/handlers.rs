use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::codec::PNG_MIME;
use crate::ocr::OcrEngine;
use crate::settings::Settings;

use super::SERVICE_NAME;
use super::error::ServerError;
use super::models::{DetectResponse, HealthResponse};
use super::pipeline;
use super::state::ServerState;
use super::util::read_upload;

pub async fn run_server(settings: Settings, engine: Arc<dyn OcrEngine>) -> Result<()> {
    let state = ServerState::new(&settings, engine);
    let listener = TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("failed to bind server address: {}", settings.server_addr))?;
    info!(addr = %settings.server_addr, "{} listening", SERVICE_NAME);
    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: ServerState) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub fn router(state: ServerState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/detect", post(detect))
        .route("/inpaint", post(inpaint))
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            message: format!("{} is running", SERVICE_NAME),
        }),
    )
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("*"),
    );
}

async fn detect(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ServerError> {
    let mut upload = read_upload(multipart).await?;
    let file = upload.take_file()?;
    let regions = run_blocking(&state, move |state| pipeline::detect(state, &file)).await?;
    Ok(Json(DetectResponse { regions }))
}

async fn inpaint(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ServerError> {
    let mut upload = read_upload(multipart).await?;
    let rect = upload.rect()?;
    let file = upload.take_file()?;
    let png = run_blocking(&state, move |state| pipeline::inpaint(state, &file, &rect)).await?;
    Ok(([(header::CONTENT_TYPE, PNG_MIME)], png).into_response())
}

/// Runs CPU-bound request work off the async workers, bounded by the
/// configured request timeout. A timed-out job is abandoned, not cancelled.
async fn run_blocking<T, F>(state: &Arc<ServerState>, job: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(&ServerState) -> Result<T, ServerError> + Send + 'static,
{
    let worker_state = state.clone();
    let task = tokio::task::spawn_blocking(move || job(worker_state.as_ref()));
    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Err(ServerError::internal(format!("server task failed: {}", err))),
        Err(_) => Err(ServerError::unavailable(format!(
            "request timed out after {}s",
            state.request_timeout.as_secs()
        ))),
    }
}
