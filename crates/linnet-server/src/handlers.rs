use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use linnet_gazetteer::Gazetteer;
use linnet_spans::{encode_bilou, resolve};
use linnet_text::{NumberLexicon, normalize, tokenize};
use linnet_types::Span;

#[derive(Clone)]
pub struct AppState {
    pub gazetteer: Arc<Gazetteer>,
    pub lexicon: Arc<NumberLexicon>,
    pub max_text_len: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct TextQuery {
    pub text: String,
}

#[derive(Serialize)]
pub struct EntityDto {
    text: String,
    start: usize,
    end: usize,
    labels: Vec<String>,
}

impl From<Span> for EntityDto {
    fn from(span: Span) -> Self {
        Self {
            text: span.text,
            start: span.start,
            end: span.end,
            labels: span.labels.into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
pub struct AnnotateResponse {
    tokens: Vec<String>,
    entities: Vec<EntityDto>,
    tags: Vec<String>,
}

#[derive(Serialize)]
pub struct NormalizeResponse {
    text: String,
    normalized: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/annotate", get(annotate))
        .route("/v1/normalize", get(normalize_text))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn annotate(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = checked_text(&params.text, state.max_text_len)?;

    let tokens = tokenize(text);
    let candidates = state.gazetteer.find_spans(&tokens);
    let entities = resolve(candidates, tokens.len()).map_err(|e| {
        error!("gazetteer produced an unresolvable span set: {e}");
        ApiError::Internal
    })?;
    let tags = encode_bilou(tokens.len(), &entities).map_err(|e| {
        error!("resolved spans failed BILOU encoding: {e}");
        ApiError::Internal
    })?;

    let response = AnnotateResponse {
        tokens,
        entities: entities.into_iter().map(EntityDto::from).collect(),
        tags: tags.iter().map(ToString::to_string).collect(),
    };
    Ok(cached_json(response, state.disable_cache))
}

async fn normalize_text(
    State(state): State<AppState>,
    Query(params): Query<TextQuery>,
) -> Result<Response, ApiError> {
    let text = checked_text(&params.text, state.max_text_len)?;
    let response = NormalizeResponse {
        text: text.to_string(),
        normalized: normalize(text, &state.lexicon),
    };
    Ok(cached_json(response, state.disable_cache))
}

fn checked_text(raw: &str, max_len: usize) -> Result<&str, ApiError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    if text.len() > max_len {
        return Err(ApiError::bad_request(format!(
            "text must be at most {max_len} bytes"
        )));
    }
    Ok(text)
}

fn cached_json<T: Serialize>(body: T, disable_cache: bool) -> Response {
    if disable_cache {
        return Json(body).into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        Json(body),
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
