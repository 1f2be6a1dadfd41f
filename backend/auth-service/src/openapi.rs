/// OpenAPI documentation for the Streamforge Auth Service
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Streamforge Auth Service API",
        version = "1.0.0",
        description = "Cookie-based JWT authentication with email activation and password reset. Access and refresh tokens are delivered as HttpOnly cookies and validated by every other Streamforge service.",
        contact(
            name = "Streamforge Team",
            email = "team@streamforge.dev"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Development server"),
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::activate,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
        crate::handlers::auth::logout,
        crate::handlers::auth::password_reset,
        crate::handlers::auth::password_reset_confirm,
    ),
    components(schemas(
        crate::models::RegisterRequest,
        crate::models::LoginRequest,
        crate::models::PasswordResetRequest,
        crate::models::PasswordResetConfirmRequest,
        crate::models::RegisterResponse,
        crate::models::RegisteredUser,
        crate::models::MessageResponse,
        crate::models::DetailResponse,
    )),
    tags(
        (name = "auth", description = "Registration, activation, login and password reset")
    )
)]
pub struct ApiDoc;
