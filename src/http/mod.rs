//! HTTP surface of the clip service

mod cors;
mod error;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use futures_util::Stream;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::app::{AppContainer, ArtifactSet, ClipInteractor, ClipOutput};
use crate::domain::model::ClipParams;
use crate::ports::ToolInfoPort;

pub use error::{ApiError, ApiResult, PROCESSING_ERROR};

/// Offers the clip to the browser as a download named `clip.mp4`
pub const CLIP_DISPOSITION: &str = "attachment; filename=\"clip.mp4\"";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub interactor: Arc<ClipInteractor>,
    pub tool_info: Arc<dyn ToolInfoPort>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(container: &dyn AppContainer, allowed_origins: Vec<String>) -> Self {
        Self {
            interactor: container.clip_interactor(),
            tool_info: container.tool_info(),
            allowed_origins: Arc::new(allowed_origins),
        }
    }
}

/// Body of `POST /api/trim`
#[derive(Debug, Default, Deserialize)]
pub struct TrimBody {
    pub url: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub quality: Option<String>,
}

impl From<TrimBody> for ClipParams {
    fn from(body: TrimBody) -> Self {
        ClipParams {
            url: body.url,
            start: body.start,
            end: body.end,
            quality: body.quality,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/trim", get(trim_wrong_method).post(trim))
        .route("/health", get(health))
        .route("/test-ytdlp", get(test_ytdlp))
        .layer(middleware::from_fn_with_state(state.clone(), cors::cors))
        .with_state(state)
}

async fn trim(
    State(state): State<AppState>,
    body: Result<Json<TrimBody>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let output = state.interactor.clip(&body.into()).await?;
    clip_response(output).await
}

async fn trim_wrong_method() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Use POST" })),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn test_ytdlp(State(state): State<AppState>) -> Response {
    match state.tool_info.version().await {
        Ok(version) => Json(json!({
            "status": "ok",
            "version": version,
            "message": "yt-dlp is working correctly",
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Stream the finished clip; its artifacts go away with the body
async fn clip_response(output: ClipOutput) -> ApiResult<Response> {
    let ClipOutput {
        path,
        size,
        artifacts,
    } = output;

    // On error `artifacts` is dropped here, which removes the files
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        ApiError::Processing(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let body = Body::from_stream(ArtifactStream::new(ReaderStream::new(file), artifacts));
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(CLIP_DISPOSITION),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    Ok(response)
}

/// Byte stream that removes the request's artifacts once it is exhausted or dropped
struct ArtifactStream<S> {
    inner: S,
    artifacts: Option<ArtifactSet>,
}

impl<S> ArtifactStream<S> {
    fn new(inner: S, artifacts: ArtifactSet) -> Self {
        Self {
            inner,
            artifacts: Some(artifacts),
        }
    }
}

impl<S> Stream for ArtifactStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(None) = polled {
            if let Some(artifacts) = self.artifacts.take() {
                debug!("Response body sent");
                artifacts.release();
            }
        }
        polled
    }
}
