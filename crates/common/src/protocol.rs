//! Request and response types exchanged over the HTTP API.
//!
//! Key material records and exported suite configurations are passed through
//! as [`serde_json::Value`] so their exact shape is owned by the core crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Optional body for `POST /sessions`: an initial suite to hand off to the session.
///
/// Absent fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub cipher: Option<String>,
    #[serde(default, alias = "keyExchange")]
    pub key_exchange: Option<String>,
    #[serde(default)]
    pub authentication: Option<String>,
}

/// Response body for `POST /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub suite: SuiteResponse,
}

// ---------------------------------------------------------------------------
// Suite selection
// ---------------------------------------------------------------------------

/// Body for `PUT /sessions/:id/suite/:category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    /// Catalog id to select, e.g. `"aes-256-gcm"`.
    pub id: String,
}

/// One category of the current selection as rendered in the summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentView {
    /// Selected catalog id, `None` when unset.
    pub id: Option<String>,
    /// Display name, `"Unknown"` or `"Not Selected"`.
    pub name: String,
    /// Strength label, absent when unset.
    pub label: Option<String>,
}

/// Current selection plus its derived composite score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResponse {
    pub cipher: ComponentView,
    pub key_exchange: ComponentView,
    pub authentication: ComponentView,
    /// Rounded mean strength of the selected components (0 when none).
    pub overall_percent: u8,
    /// `"strong"`, `"moderate"` or `"weak"`.
    pub tier: String,
    /// Forward secrecy of the selected key exchange, absent when unset.
    pub forward_secrecy: Option<bool>,
    /// Whether all three categories are selected (gates test and export).
    pub complete: bool,
}

/// One catalog entry as listed by `GET /catalog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntryView {
    pub id: String,
    pub name: String,
    pub strength: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_secrecy: Option<bool>,
}

/// Response body for `GET /catalog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub cipher: Vec<CatalogEntryView>,
    pub key_exchange: Vec<CatalogEntryView>,
    pub authentication: Vec<CatalogEntryView>,
}

// ---------------------------------------------------------------------------
// Encryption demo
// ---------------------------------------------------------------------------

/// Body for `POST /sessions/:id/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    pub plaintext: String,
}

/// Response body for `POST /sessions/:id/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Base64 ciphertext (with tag) for display.
    pub ciphertext: String,
    /// Serialized `{ciphertext, iv}` record to feed back into decrypt.
    pub record: String,
}

/// Body for `POST /sessions/:id/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Serialized `{ciphertext, iv}` record as produced by encrypt.
    pub record: String,
}

/// Response body for `POST /sessions/:id/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub plaintext: String,
}

/// Response body for key generation and import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyStatusResponse {
    /// `"generated"` or `"imported"`.
    pub status: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Number of live demo sessions.
    pub sessions: usize,
    /// Configured session capacity.
    pub max_sessions: usize,
}
