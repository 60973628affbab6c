//! Client-side credential decoding.
//!
//! The client holds no verification key, so the signature is NOT checked here.
//! This is a validated parse of the claims payload that fails closed: any shape
//! mismatch means "not authenticated". The server stays the authority (401).

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Errors returned while turning a stored token into a `Session`.
#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("token is not in compact JWS form (header.payload.signature)")]
    NotCompact,
    #[error("invalid token header: {0}")]
    Header(#[from] jsonwebtoken::errors::Error),
    #[error("invalid base64url payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid claims payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required claim: {0}")]
    MissingClaim(&'static str),
    #[error("invalid claim: {0}")]
    InvalidClaim(&'static str),
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
}

impl ClaimsError {
    /// `true` when the token decoded fine but is past its expiry.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// Raw claims as issued by the backend login endpoint.
///
/// NOTE:
/// - `exp` / `role` are required; everything else is informational.
/// - `user_id` is numeric on the backend, so keep it as `Value`.
/// - `exp` is a NumericDate and may carry a fractional part.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Role label carried by the credential. Normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "admin";
    pub const USER: &'static str = "user";

    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_ascii_lowercase())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded, validated, unexpired credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub subject: Option<String>,
}

/// Parse the claims payload of a compact token. Does not check expiry.
pub fn decode_claims(token: &str) -> Result<TokenClaims, ClaimsError> {
    let token = token.trim();

    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::NotCompact);
    };
    if payload.is_empty() {
        return Err(ClaimsError::NotCompact);
    }

    // JOSE header must be well-formed (typ / alg).
    jsonwebtoken::decode_header(token)?;

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Validate decoded claims against `now`.
///
/// Expiry is inclusive: `exp == now` is already expired. A fractional `exp` is
/// floored to whole seconds.
pub fn validate(claims: TokenClaims, now: DateTime<Utc>) -> Result<Session, ClaimsError> {
    let exp = claims.exp.ok_or(ClaimsError::MissingClaim("exp"))?;
    if !exp.is_finite() || exp < 1.0 {
        return Err(ClaimsError::InvalidClaim("exp"));
    }
    let exp = exp.floor() as i64;
    let expires_at = DateTime::from_timestamp(exp, 0).ok_or(ClaimsError::InvalidClaim("exp"))?;

    let role = claims
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(Role::new)
        .ok_or(ClaimsError::MissingClaim("role"))?;

    if exp <= now.timestamp() {
        return Err(ClaimsError::Expired {
            expired_at: expires_at,
        });
    }

    let subject = claims
        .sub
        .filter(|s| !s.trim().is_empty())
        .or_else(|| claims.user_id.as_ref().map(value_to_subject))
        .or(claims.username);

    Ok(Session {
        role,
        expires_at,
        subject,
    })
}

/// `decode_claims` + `validate`.
pub fn decode_session(token: &str, now: DateTime<Utc>) -> Result<Session, ClaimsError> {
    validate(decode_claims(token)?, now)
}

fn value_to_subject(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::testing::{encode_token, mint_token};
    use chrono::Duration;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn decodes_valid_token() {
        let token = encode_token(&json!({
            "user_id": 42,
            "role": "Admin",
            "exp": now().timestamp() + 3600,
        }));

        let session = decode_session(&token, now()).unwrap();
        assert!(session.role.is_admin());
        assert_eq!(session.subject.as_deref(), Some("42"));
        assert_eq!(session.expires_at, now() + Duration::seconds(3600));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let at_now = mint_token("user", now());
        let past = mint_token("user", now() - Duration::seconds(1));
        let future = mint_token("user", now() + Duration::seconds(1));

        assert!(decode_session(&at_now, now()).unwrap_err().is_expired());
        assert!(decode_session(&past, now()).unwrap_err().is_expired());
        assert!(decode_session(&future, now()).is_ok());
    }

    #[test]
    fn non_compact_tokens_are_rejected() {
        for token in ["", "abc", "a.b", "a.b.c.d", "a..c"] {
            assert!(
                matches!(decode_claims(token), Err(ClaimsError::NotCompact)),
                "{token:?}"
            );
        }
    }

    #[test]
    fn backend_placeholder_token_is_rejected() {
        assert!(decode_session("some_generated_jwt_token_for_testuser", now()).is_err());
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let valid = mint_token("user", now() + Duration::hours(1));
        let header = valid.split('.').next().unwrap();

        let not_base64 = format!("{header}.!!!.sig");
        assert!(matches!(
            decode_claims(&not_base64),
            Err(ClaimsError::Base64(_))
        ));

        let not_json = format!("{header}.{}.sig", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(decode_claims(&not_json), Err(ClaimsError::Json(_))));
    }

    #[test]
    fn bad_header_is_rejected() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"role":"user","exp":9999999999}"#);
        let token = format!("{}.{payload}.sig", URL_SAFE_NO_PAD.encode("{}"));

        assert!(matches!(decode_claims(&token), Err(ClaimsError::Header(_))));
    }

    #[test]
    fn missing_claims_are_rejected() {
        let no_role = encode_token(&json!({ "exp": now().timestamp() + 60 }));
        let no_exp = encode_token(&json!({ "role": "user" }));
        let blank_role = encode_token(&json!({ "role": " ", "exp": now().timestamp() + 60 }));
        let zero_exp = encode_token(&json!({ "role": "user", "exp": 0 }));

        assert!(matches!(
            decode_session(&no_role, now()),
            Err(ClaimsError::MissingClaim("role"))
        ));
        assert!(matches!(
            decode_session(&no_exp, now()),
            Err(ClaimsError::MissingClaim("exp"))
        ));
        assert!(matches!(
            decode_session(&blank_role, now()),
            Err(ClaimsError::MissingClaim("role"))
        ));
        assert!(matches!(
            decode_session(&zero_exp, now()),
            Err(ClaimsError::InvalidClaim("exp"))
        ));
    }

    #[test]
    fn wrongly_typed_claims_are_rejected() {
        let token = encode_token(&json!({ "role": ["admin"], "exp": "tomorrow" }));

        assert!(matches!(decode_claims(&token), Err(ClaimsError::Json(_))));
    }

    #[test]
    fn fractional_exp_is_floored() {
        let exp = now().timestamp() as f64 + 60.5;
        let token = encode_token(&json!({ "role": "user", "exp": exp }));

        let session = decode_session(&token, now()).unwrap();
        assert_eq!(session.expires_at, now() + Duration::seconds(60));

        let at_now = encode_token(&json!({ "role": "user", "exp": now().timestamp() as f64 + 0.5 }));
        assert!(decode_session(&at_now, now()).unwrap_err().is_expired());
    }
}
