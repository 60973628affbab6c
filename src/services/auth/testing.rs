//! Token builders for unit tests. Signatures are placeholders; the client never checks them.
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde_json::json;

pub(crate) fn encode_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({ "alg": "HS256", "typ": "JWT" }).to_string());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub(crate) fn mint_token(role: &str, expires_at: DateTime<Utc>) -> String {
    encode_token(&json!({
        "user_id": 7,
        "role": role,
        "exp": expires_at.timestamp(),
    }))
}
