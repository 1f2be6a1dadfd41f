//! Auth Service
//!
//! Cookie-based JWT authentication: registration with email activation,
//! login/refresh/logout and password reset. Issues the tokens every other
//! Streamforge service validates.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod security;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AuthError, Result};

use services::AuthService;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
}
