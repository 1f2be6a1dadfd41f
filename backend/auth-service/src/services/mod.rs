/// Service layer: account lifecycle and outbound email.
pub mod auth_service;
pub mod email_service;

pub use auth_service::{ActivationOutcome, AuthService, RegisteredAccount};
pub use email_service::EmailService;
