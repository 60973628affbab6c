pub mod api;
pub mod auth;
pub mod credential;
pub mod storage;
