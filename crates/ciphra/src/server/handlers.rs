//! Axum request handlers for all service endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    CatalogEntryView, CatalogResponse, ComponentView, CreateSessionRequest,
    CreateSessionResponse, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse,
    ErrorResponse, HealthResponse, KeyStatusResponse, SelectRequest, SuiteResponse,
};
use common::ServiceError;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::state::{AppState, DemoSession};
use crate::crypto::jwk::KEY_FILE_NAME;
use crate::session::SessionError;
use crate::suite::{
    build_export_record, export::EXPORT_FILE_NAME, score, CatalogEntry, Category, SuiteError,
    SuiteSelector,
};

/// Handler error: a [`ServiceError`] rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

impl From<SuiteError> for ApiError {
    fn from(e: SuiteError) -> Self {
        ApiError(ServiceError::BadRequest(e.to_string()))
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        let msg = e.to_string();
        let err = match e {
            SessionError::KeyGenerationFailed | SessionError::EncryptionFailed => {
                ServiceError::EncryptionFailure(msg)
            }
            SessionError::NoKeyAvailable => ServiceError::Unavailable(msg),
            SessionError::MalformedKeyRecord(_)
            | SessionError::UnsupportedKeyAlgorithm(_)
            | SessionError::EmptyPlaintext
            | SessionError::MalformedCiphertextInput
            | SessionError::AuthenticationFailed => ServiceError::BadRequest(msg),
        };
        ApiError(err)
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn lookup(state: &AppState, id: Uuid) -> ApiResult<Arc<Mutex<DemoSession>>> {
    state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError(ServiceError::NotFound(format!("unknown session: {id}"))))
}

fn component_view(selector: &SuiteSelector, category: Category) -> ComponentView {
    let state = selector.state();
    ComponentView {
        id: state.get(category).map(str::to_owned),
        name: state.display_name(category).to_owned(),
        label: score(state)
            .per_component
            .get(category)
            .map(|l| l.as_str().to_owned()),
    }
}

/// Render a selector and its derived score.
pub fn suite_view(selector: &SuiteSelector) -> SuiteResponse {
    let composite = score(selector.state());
    SuiteResponse {
        cipher: component_view(selector, Category::Cipher),
        key_exchange: component_view(selector, Category::KeyExchange),
        authentication: component_view(selector, Category::Authentication),
        overall_percent: composite.overall_percent,
        tier: composite.tier().as_str().to_owned(),
        forward_secrecy: composite.forward_secrecy,
        complete: selector.is_complete(),
    }
}

fn attachment(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    warn!(error = %e, "serialisation failed");
    ApiError(ServiceError::Internal("failed to serialise response".into()))
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// `GET /health` — liveness and capacity check.
///
/// Returns `503 Service Unavailable` once the session registry is full.
pub async fn health(State(state): State<AppState>) -> Response {
    let sessions = state.sessions.len().await;
    let max_sessions = state.sessions.max_sessions();

    let (status_code, status_str) = if sessions < max_sessions {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        sessions,
        max_sessions,
    };
    (status_code, Json(body)).into_response()
}

/// `GET /catalog` — every selectable algorithm.
pub async fn catalog() -> Json<CatalogResponse> {
    let view = |entries: &[CatalogEntry]| -> Vec<CatalogEntryView> {
        entries
            .iter()
            .map(|e| CatalogEntryView {
                id: e.id.to_owned(),
                name: e.display_name.to_owned(),
                strength: e.strength,
                forward_secrecy: e.forward_secrecy,
            })
            .collect()
    };
    Json(CatalogResponse {
        cipher: view(Category::Cipher.entries()),
        key_exchange: view(Category::KeyExchange.entries()),
        authentication: view(Category::Authentication.entries()),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

fn parse_create_request(body: &[u8]) -> ApiResult<CreateSessionRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateSessionRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError(ServiceError::BadRequest(format!("invalid session request: {e}")))
    })
}

/// `POST /sessions` — start a demo session with a freshly generated key.
///
/// A body naming any suite component hands that suite off to the session;
/// an empty body applies the configured default selection. A body that is not
/// a valid [`CreateSessionRequest`] is rejected with `400 Bad Request`.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let req = parse_create_request(&body)?;
    let handoff =
        req.cipher.is_some() || req.key_exchange.is_some() || req.authentication.is_some();

    let suite = if handoff {
        SuiteSelector::from_ids(
            req.cipher.as_deref(),
            req.key_exchange.as_deref(),
            req.authentication.as_deref(),
        )?
    } else if state.preselect_recommended {
        SuiteSelector::recommended()
    } else {
        SuiteSelector::new()
    };

    let mut session = DemoSession {
        suite,
        ..DemoSession::default()
    };
    session.crypto.generate_key()?;
    let view = suite_view(&session.suite);

    let session_id = state.sessions.insert(session).await.map_err(|e| {
        warn!(error = %e, "session rejected");
        ApiError(ServiceError::Unavailable(e.to_string()))
    })?;
    info!(%session_id, "demo session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            suite: view,
        }),
    ))
}

/// `DELETE /sessions/:id`
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(&id).await {
        info!(session_id = %id, "demo session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError(ServiceError::NotFound(format!("unknown session: {id}"))))
    }
}

// ---------------------------------------------------------------------------
// Suite
// ---------------------------------------------------------------------------

/// `GET /sessions/:id/suite`
pub async fn get_suite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuiteResponse>> {
    let session = lookup(&state, id).await?;
    let session = session.lock().await;
    Ok(Json(suite_view(&session.suite)))
}

/// `PUT /sessions/:id/suite/:category` — select one component.
pub async fn select_component(
    State(state): State<AppState>,
    Path((id, category)): Path<(Uuid, String)>,
    Json(req): Json<SelectRequest>,
) -> ApiResult<Json<SuiteResponse>> {
    let category = Category::from_segment(&category).ok_or_else(|| {
        ApiError(ServiceError::NotFound(format!("unknown category: {category}")))
    })?;
    let session = lookup(&state, id).await?;
    let mut session = session.lock().await;
    session.suite.select(category, &req.id)?;
    Ok(Json(suite_view(&session.suite)))
}

/// `DELETE /sessions/:id/suite` — clear the selection.
pub async fn reset_suite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuiteResponse>> {
    let session = lookup(&state, id).await?;
    let mut session = session.lock().await;
    session.suite.reset();
    Ok(Json(suite_view(&session.suite)))
}

/// `GET /sessions/:id/export` — download the suite configuration.
///
/// Only a complete suite can be exported.
pub async fn export_suite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let session = lookup(&state, id).await?;
    let session = session.lock().await;
    if !session.suite.is_complete() {
        return Err(ApiError(ServiceError::Conflict(
            "select a cipher, key exchange, and authentication algorithm before exporting".into(),
        )));
    }
    let selection = session.suite.state();
    let record = build_export_record(selection, &score(selection));
    let body = record.to_json_pretty().map_err(internal)?;
    info!(session_id = %id, overall = record.security_metrics.overall_score, "suite exported");
    Ok(attachment(EXPORT_FILE_NAME, body))
}

// ---------------------------------------------------------------------------
// Key and encryption demo
// ---------------------------------------------------------------------------

/// `POST /sessions/:id/key` — replace the session key with a new random one.
pub async fn generate_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<KeyStatusResponse>> {
    let session = lookup(&state, id).await?;
    session.lock().await.crypto.generate_key()?;
    Ok(Json(KeyStatusResponse {
        status: "generated".into(),
    }))
}

/// `GET /sessions/:id/key` — download the session key as a JSON Web Key.
pub async fn export_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let session = lookup(&state, id).await?;
    let record = session.lock().await.crypto.export_key()?;
    let body = record.to_json_pretty().map_err(internal)?;
    Ok(attachment(KEY_FILE_NAME, body))
}

/// `PUT /sessions/:id/key` — install a JSON Web Key sent as the request body.
pub async fn import_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: String,
) -> ApiResult<Json<KeyStatusResponse>> {
    let session = lookup(&state, id).await?;
    session.lock().await.crypto.import_key(&body)?;
    Ok(Json(KeyStatusResponse {
        status: "imported".into(),
    }))
}

/// `POST /sessions/:id/encrypt`
pub async fn encrypt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EncryptRequest>,
) -> ApiResult<Json<EncryptResponse>> {
    let session = lookup(&state, id).await?;
    let mut session = session.lock().await;
    let message = session.crypto.encrypt(&req.plaintext)?;
    Ok(Json(EncryptResponse {
        ciphertext: message.ciphertext_base64(),
        record: message.to_wire_json().map_err(internal)?,
    }))
}

/// `POST /sessions/:id/decrypt`
pub async fn decrypt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecryptRequest>,
) -> ApiResult<Json<DecryptResponse>> {
    let session = lookup(&state, id).await?;
    let plaintext = session.lock().await.crypto.decrypt_wire(&req.record)?;
    Ok(Json(DecryptResponse { plaintext }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .with_state(state)
    }

    #[tokio::test]
    async fn health_is_ok_with_capacity() {
        let app = test_router(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_degraded_when_full() {
        let state = AppState::new(1, true);
        state.sessions.insert(DemoSession::default()).await.unwrap();
        let app = test_router(state);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn suite_view_of_empty_selector() {
        let view = suite_view(&SuiteSelector::new());
        assert_eq!(view.overall_percent, 0);
        assert_eq!(view.cipher.name, "Not Selected");
        assert!(view.cipher.label.is_none());
        assert!(view.forward_secrecy.is_none());
        assert!(!view.complete);
        assert_eq!(view.tier, "weak");
    }

    #[test]
    fn suite_view_of_recommended_selector() {
        let view = suite_view(&SuiteSelector::recommended());
        assert_eq!(view.overall_percent, 95);
        assert_eq!(view.key_exchange.name, "ECDHE-X25519");
        assert_eq!(view.authentication.label.as_deref(), Some("Excellent"));
        assert_eq!(view.forward_secrecy, Some(true));
        assert!(view.complete);
        assert_eq!(view.tier, "strong");
    }

    #[test]
    fn session_errors_map_to_statuses() {
        let status = |e: SessionError| ApiError::from(e).0.http_status();
        assert_eq!(status(SessionError::EmptyPlaintext), 400);
        assert_eq!(status(SessionError::AuthenticationFailed), 400);
        assert_eq!(status(SessionError::MalformedCiphertextInput), 400);
        assert_eq!(status(SessionError::NoKeyAvailable), 503);
        assert_eq!(status(SessionError::KeyGenerationFailed), 500);
    }

    #[test]
    fn empty_create_body_means_no_handoff() {
        let req = parse_create_request(b"").unwrap();
        assert!(req.cipher.is_none() && req.key_exchange.is_none());
        assert!(parse_create_request(b" \n").is_ok());
    }

    #[test]
    fn malformed_create_body_is_bad_request() {
        for body in [r#"{"cipher":5}"#, "not json", r#"{"kex":"rsa-2048"}"#] {
            let err = parse_create_request(body.as_bytes()).unwrap_err();
            assert_eq!(err.0.http_status(), 400);
        }
    }

    #[test]
    fn unknown_id_maps_to_bad_request() {
        let err = ApiError::from(SuiteError::UnknownCatalogId {
            category: Category::Cipher,
            id: "rot13".into(),
        });
        assert_eq!(err.0.http_status(), 400);
        assert!(err.0.message().contains("rot13"));
    }
}
