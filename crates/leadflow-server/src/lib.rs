//! Leadflow Server: HTTP surface, access gate, configuration and
//! application wiring.

pub mod api;
pub mod app;
pub mod config;
pub mod middleware;

pub use app::{AppState, build_router, user_repository};
pub use config::ServerConfig;
