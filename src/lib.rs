//! Client-side authentication boundary of the monitoring portal.
//!
//! - `router`: route table, navigation guard and navigator
//! - `services::credential`: the single owner of the stored bearer token
//! - `services::api`: shared request client (bearer attachment, 401 detection)

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod router;
pub mod services;
pub mod state;
