use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info_span};
use uuid::Uuid;

use crate::controller::{Controller, ControllerError, SessionView};
use crate::i18n::{Language, Translation};
use crate::upload::UploadError;

// Multipart framing on top of the raw file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "E_BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "E_NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "E_CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL"),
        };
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ControllerError::Transition(_) => ApiError::Conflict(err.to_string()),
            ControllerError::Upload(_) => ApiError::BadRequest(err.to_string()),
            ControllerError::TaskFailed(_) => {
                error!(error = %err, "analysis task failed");
                ApiError::Internal("internal error".to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

pub fn router(controller: Arc<Controller>) -> Router {
    let body_limit = controller.max_upload_bytes() + MULTIPART_OVERHEAD;

    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            info_span!("http_request", method = %request.method(), uri = %request.uri().path())
        });

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/languages", get(languages))
        .route("/api/translations/:lang", get(translations))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/language", put(set_language))
        .route(
            "/api/sessions/:id/image",
            post(upload_image).delete(discard_image),
        )
        .route("/api/sessions/:id/analyze", post(analyze))
        .route("/api/sessions/:id/dismiss-error", post(dismiss_error))
        .route("/api/sessions/:id/reset", post(reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(AppState { controller })
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageOption {
    code: Language,
    label: &'static str,
    rtl: bool,
}

async fn languages() -> Json<Vec<LanguageOption>> {
    Json(
        Language::ALL
            .into_iter()
            .map(|code| LanguageOption {
                code,
                label: code.native_name(),
                rtl: code.is_rtl(),
            })
            .collect(),
    )
}

fn parse_language(raw: &str) -> Result<Language, ApiError> {
    raw.parse::<Language>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn translations(Path(lang): Path<String>) -> Result<Json<&'static Translation>, ApiError> {
    Ok(Json(parse_language(&lang)?.texts()))
}

#[derive(Debug, Deserialize)]
struct LanguageBody {
    language: Option<String>,
}

async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let requested = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<LanguageBody>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid body: {}", e)))?
            .language
    };
    let language = match requested {
        Some(raw) => parse_language(&raw)?,
        None => Language::default(),
    };
    let view = state.controller.create_session(language).await;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.controller.view(id).await?))
}

async fn set_language(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LanguageBody>,
) -> Result<Json<SessionView>, ApiError> {
    let raw = body
        .language
        .ok_or_else(|| ApiError::BadRequest("Missing language field".to_string()))?;
    let language = parse_language(&raw)?;
    Ok(Json(state.controller.set_language(id, language).await?))
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, ApiError> {
    let mut file: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
        file = Some((data.to_vec(), content_type));
        // One file per upload.
        break;
    }

    let (bytes, content_type) =
        file.ok_or_else(|| ApiError::BadRequest("Missing image field".to_string()))?;

    match state
        .controller
        .select_image(id, &bytes, content_type.as_deref())
        .await
    {
        Err(ControllerError::Upload(UploadError::NotAnImage(_))) => {
            let language = state.controller.view(id).await?.language;
            Err(ApiError::BadRequest(language.texts().not_an_image.to_string()))
        }
        other => Ok(Json(other?)),
    }
}

async fn discard_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.controller.discard_image(id).await?))
}

async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.controller.analyze(id).await?))
}

async fn dismiss_error(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.controller.dismiss_error(id).await?))
}

async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.controller.reset(id).await?))
}
