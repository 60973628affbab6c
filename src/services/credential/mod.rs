/*
 * Responsibility
 * - 認証トークン (credential) の唯一の読み書き窓口 (get / set / clear)
 * - Navigation guard と Request client が同じ値を見るための single owner
 * - Storage backend の違い (file / memory) はここで吸収する
 */
use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::services::storage::{KeyValueStorage, StorageError};

/// Fixed storage key the credential lives under.
pub const TOKEN_KEY: &str = "token";

/// Single point of read/write/clear for the bearer token.
///
/// No caching: every `get` goes to the backing storage.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token
        f.debug_struct("CredentialStore")
            .field("backend", &self.storage.backend_name())
            .finish()
    }
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Current token, if a non-empty one is stored.
    ///
    /// A storage failure reads as "no credential" (fail closed).
    pub fn get(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(Some(token)) if !token.trim().is_empty() => Some(token),
            Ok(_) => None,
            Err(err) => {
                warn!(
                    error = %err,
                    backend = self.storage.backend_name(),
                    "failed to read credential; treating as absent"
                );
                None
            }
        }
    }

    /// Store `token` verbatim, replacing any previous credential.
    ///
    /// Tokens that could not be sent as a header value are rejected.
    pub fn set(&self, token: &str) -> Result<(), StorageError> {
        if token.trim().is_empty() {
            return Err(StorageError::InvalidValue("empty token".to_string()));
        }
        if token.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7f) {
            return Err(StorageError::InvalidValue(
                "token contains control characters".to_string(),
            ));
        }
        self.storage.set_item(TOKEN_KEY, token)?;
        debug!(token_fingerprint = %fingerprint(token), "credential stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)?;
        debug!("credential cleared");
        Ok(())
    }
}

/// Short, non-reversible identifier for a token, safe to put in logs.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(12);
    encoded
}
