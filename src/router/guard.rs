//! Navigation guard: decides, before every route transition, whether the target
//! may be entered with the currently held credential.
//!
//! Evaluation is local. No network call is made; a token the server no longer
//! accepts is caught later by the request client (401).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::router::routes::{Route, RouteTable};
use crate::services::auth::{Clock, Session, claims};
use crate::services::credential::{CredentialStore, fingerprint};

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Navigate to the named route instead.
    Redirect(String),
}

/// Authentication state derived from the stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Session),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Anonymous => None,
        }
    }
}

#[derive(Clone)]
pub struct NavigationGuard {
    store: CredentialStore,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("store", &self.store)
            .finish()
    }
}

impl NavigationGuard {
    pub fn new(store: CredentialStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Read and decode the stored credential.
    ///
    /// A malformed or expired credential is cleared and reads as `Anonymous`.
    pub fn auth_state(&self) -> AuthState {
        let Some(token) = self.store.get() else {
            return AuthState::Anonymous;
        };

        match claims::decode_session(&token, self.clock.now()) {
            Ok(session) => AuthState::Authenticated(session),
            Err(err) => {
                warn!(
                    error = %err,
                    token_fingerprint = %fingerprint(&token),
                    "discarding unusable credential"
                );
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "failed to clear unusable credential");
                }
                AuthState::Anonymous
            }
        }
    }

    /// Decide whether navigation from `current` to `target` may proceed.
    pub fn evaluate(
        &self,
        table: &RouteTable,
        target: &Route,
        current: Option<&Route>,
    ) -> GuardDecision {
        let state = self.auth_state();
        let decision = decide(table, target, &state);

        debug!(
            from = current.map(|r| r.name.as_str()).unwrap_or("-"),
            to = %target.name,
            authenticated = state.is_authenticated(),
            ?decision,
            "navigation guard"
        );

        decision
    }
}

fn decide(table: &RouteTable, target: &Route, state: &AuthState) -> GuardDecision {
    if target.meta.requires_auth {
        let Some(session) = state.session() else {
            return GuardDecision::Redirect(table.login().name.clone());
        };

        if let Some(required) = &target.meta.required_role {
            if &session.role != required {
                return GuardDecision::Redirect(table.home().name.clone());
            }
        }

        return GuardDecision::Proceed;
    }

    // Already signed in: do not show the login page again.
    if table.is_login(target) && state.is_authenticated() {
        return GuardDecision::Redirect(table.home().name.clone());
    }

    GuardDecision::Proceed
}
