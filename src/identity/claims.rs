use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque bearer string obtained at login and attached to every authorized
/// request. Deliberately not `Display`: raw tokens stay out of log lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self { Credential(raw.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

/// Claims embedded in the credential. Only `role` is interpreted by the
/// guard; everything else is carried verbatim for the embedder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Seconds since epoch, as issued. Carried as data; local expiry
    /// enforcement belongs to the backends.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("credential is not a three-segment token")]
    Malformed,
    #[error("claims segment is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("claims segment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("role claim missing")]
    MissingRole,
    #[error("unrecognized role claim: {0}")]
    UnknownRole(String),
}

/// Parse the claims segment of a bearer credential. Pure local computation:
/// no signature verification and no network, validation is the backends'
/// job. Idempotent by construction.
pub fn decode_claims(credential: &Credential) -> Result<Claims, DecodeError> {
    let mut segments = credential.as_str().split('.');
    let (header, payload, signature) = match (segments.next(), segments.next(), segments.next()) {
        (Some(h), Some(p), Some(s)) => (h, p, s),
        _ => return Err(DecodeError::Malformed),
    };
    if segments.next().is_some() || header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(DecodeError::Malformed);
    }
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload)?;
    let claims: Claims = serde_json::from_slice(&bytes)?;
    Ok(claims)
}
