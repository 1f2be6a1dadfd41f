/// Authentication handlers
///
/// Tokens are delivered as HttpOnly cookies; response bodies stay small and
/// never contain the tokens themselves (except the activation token, which
/// is also emailed).
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::config::CookieConfig;
use crate::error::{AuthError, Result};
use crate::models::{
    DetailResponse, LoginRequest, MessageResponse, PasswordResetConfirmRequest,
    PasswordResetRequest, RegisterRequest, RegisterResponse, RegisteredUser,
};
use crate::services::ActivationOutcome;
use crate::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

const ACCESS_COOKIE_TTL_MINUTES: i64 = 60;
const REFRESH_COOKIE_TTL_DAYS: i64 = 30;

fn auth_cookie(
    config: &CookieConfig,
    name: &'static str,
    value: String,
    max_age: CookieDuration,
) -> Cookie<'static> {
    let mut builder = Cookie::build(name, value)
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::None)
        .path("/")
        .max_age(max_age);

    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }

    builder.finish()
}

fn removal_cookie(config: &CookieConfig, name: &'static str) -> Cookie<'static> {
    auth_cookie(config, name, String::new(), CookieDuration::ZERO)
}

/// Register a new account and send the activation email.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = DetailResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|_| AuthError::RegistrationRejected)?;

    let account = state.auth.register(&payload.email, &payload.password).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        user: RegisteredUser {
            id: account.user.id,
            email: account.user.email,
        },
        token: account.activation_token,
    }))
}

/// Activate an account via the emailed link.
#[utoipa::path(
    get,
    path = "/api/v1/auth/activate/{uid}/{token}",
    tag = "auth",
    responses(
        (status = 200, description = "Account activated", body = MessageResponse),
        (status = 400, description = "Invalid or expired link", body = DetailResponse)
    )
)]
pub async fn activate(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (uid, token) = path.into_inner();

    let message = match state.auth.activate(&uid, &token).await? {
        ActivationOutcome::Activated => "Account successfully activated.",
        ActivationOutcome::AlreadyActive => "Account is already activated.",
    };

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Log in with email and password; sets both token cookies.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = DetailResponse)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate().map_err(|_| AuthError::InvalidCredentials)?;

    let (_user, pair) = state.auth.login(&payload.email, &payload.password).await?;

    let cookies = &state.config.cookies;
    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(
            cookies,
            ACCESS_COOKIE,
            pair.access_token,
            CookieDuration::minutes(ACCESS_COOKIE_TTL_MINUTES),
        ))
        .cookie(auth_cookie(
            cookies,
            REFRESH_COOKIE,
            pair.refresh_token,
            CookieDuration::days(REFRESH_COOKIE_TTL_DAYS),
        ))
        .json(MessageResponse {
            message: "Login successful".to_string(),
        }))
}

/// Refresh the access cookie from the refresh cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "Access token refreshed", body = MessageResponse),
        (status = 400, description = "Refresh cookie missing", body = DetailResponse),
        (status = 401, description = "Refresh token invalid", body = DetailResponse)
    )
)]
pub async fn refresh(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let refresh_token = req
        .cookie(REFRESH_COOKIE)
        .ok_or(AuthError::RefreshTokenMissing)?;

    let access = state.auth.refresh(refresh_token.value()).await?;

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(
            &state.config.cookies,
            ACCESS_COOKIE,
            access,
            CookieDuration::minutes(ACCESS_COOKIE_TTL_MINUTES),
        ))
        .json(MessageResponse {
            message: "Access token refreshed".to_string(),
        }))
}

/// Log out: revoke the refresh token and clear both cookies.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = DetailResponse)
    )
)]
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(refresh_token) = req.cookie(REFRESH_COOKIE) {
        if let Err(e) = state.auth.logout(refresh_token.value()).await {
            tracing::warn!("refresh token revocation failed: {}", e);
        }
    }

    let cookies = &state.config.cookies;
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(cookies, ACCESS_COOKIE))
        .cookie(removal_cookie(cookies, REFRESH_COOKIE))
        .json(DetailResponse {
            detail: "Logout successful. All tokens have been invalidated.".to_string(),
        }))
}

/// Request a password-reset email. Always answers 200 so account existence
/// is never disclosed.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset",
    tag = "auth",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = DetailResponse),
        (status = 400, description = "Invalid input", body = DetailResponse)
    )
)]
pub async fn password_reset(
    state: web::Data<AppState>,
    payload: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|_| AuthError::Validation("A valid email address is required".to_string()))?;

    state.auth.request_password_reset(&payload.email).await?;

    Ok(HttpResponse::Ok().json(DetailResponse {
        detail: "An email has been sent to reset your password.".to_string(),
    }))
}

/// Confirm a password reset via the emailed link.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm/{uid}/{token}",
    tag = "auth",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password updated", body = DetailResponse),
        (status = 400, description = "Invalid or expired link", body = DetailResponse)
    )
)]
pub async fn password_reset_confirm(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<PasswordResetConfirmRequest>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|_| AuthError::WeakPassword)?;

    let (uid, token) = path.into_inner();
    state
        .auth
        .confirm_password_reset(&uid, &token, &payload.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(DetailResponse {
        detail: "Your password has been successfully reset.".to_string(),
    }))
}
