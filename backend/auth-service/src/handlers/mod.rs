/// HTTP handlers for auth-service
pub mod auth;

pub use auth::{
    activate, login, logout, password_reset, password_reset_confirm, refresh, register,
};
