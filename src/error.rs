/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - 各層の error (config / storage / api / routing) を統一的に変換
 */
use thiserror::Error;

use crate::config::ConfigError;
use crate::router::{NavigationError, RouteTableError};
use crate::services::api::ApiError;
use crate::services::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Routes(#[from] RouteTableError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

impl AppError {
    /// `true` when the server rejected the held credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api(e) if e.is_unauthorized())
    }
}
