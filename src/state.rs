/*
 * Responsibility
 * - プロセス全体の共有コンテキスト (AppState)
 *   - credential store / request client / navigation guard / route table
 * - Config から依存を組み立てる
 */
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::router::{NavigationGuard, Navigator, RouteTable, portal_routes};
use crate::services::api::{self, ApiClient, ClearCredential, LogOnly, UnauthorizedPolicy};
use crate::services::auth::SystemClock;
use crate::services::credential::CredentialStore;
use crate::services::storage::FileStorage;

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: CredentialStore,
    pub api: &'static ApiClient,
    pub guard: NavigationGuard,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let store = CredentialStore::new(Arc::new(FileStorage::new(&config.storage_path)));

        let policy: Arc<dyn UnauthorizedPolicy> = if config.clear_credential_on_unauthorized {
            Arc::new(ClearCredential::new(store.clone()))
        } else {
            Arc::new(LogOnly)
        };

        let api = api::configure_with(|| {
            Ok(ApiClient::new(
                config.api_base_url.as_str(),
                config.api_timeout,
                store.clone(),
            )?
            .with_unauthorized_policy(policy))
        })?;

        let guard = NavigationGuard::new(store.clone(), Arc::new(SystemClock));
        let routes = portal_routes()?;

        Ok(Self {
            store,
            api,
            guard,
            routes,
        })
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.routes.clone(), self.guard.clone())
    }
}
