/// Account lifecycle: registration, activation, login, token refresh and
/// password reset.
use auth_token::{JwtKeys, TokenPair, TOKEN_TYPE_REFRESH};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::db::{token_repo, user_repo};
use crate::error::{AuthError, Result};
use crate::models::{token_purpose, User};
use crate::security::{
    decode_uid, encode_uid, generate_one_time_token, hash_password, hash_token, verify_password,
};
use crate::services::EmailService;

const ACTIVATION_TOKEN_TTL_HOURS: i64 = 24;
const RESET_TOKEN_TTL_HOURS: i64 = 1;
const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

pub struct AuthService {
    db: PgPool,
    keys: JwtKeys,
    email: EmailService,
}

/// A freshly registered account plus its raw activation token.
pub struct RegisteredAccount {
    pub user: User,
    pub activation_token: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated,
    AlreadyActive,
}

impl AuthService {
    pub fn new(db: PgPool, keys: JwtKeys, email: EmailService) -> Self {
        Self { db, keys, email }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Create an inactive account and send the activation email.
    ///
    /// Mail failures are logged but do not undo the registration; the raw
    /// token is also returned to the caller.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisteredAccount> {
        let password_hash = hash_password(password)?;
        let user = user_repo::create_user(&self.db, email, &password_hash).await?;

        let activation_token = generate_one_time_token();
        token_repo::create_account_token(
            &self.db,
            user.id,
            &hash_token(&activation_token),
            token_purpose::ACTIVATION,
            Utc::now() + Duration::hours(ACTIVATION_TOKEN_TTL_HOURS),
        )
        .await?;

        let uid = encode_uid(user.id);
        if let Err(e) = self
            .email
            .send_activation_email(&user.email, &uid, &activation_token)
            .await
        {
            warn!(user_id = %user.id, "activation email failed: {}", e);
        }

        info!(user_id = %user.id, "user registered");
        Ok(RegisteredAccount {
            user,
            activation_token,
        })
    }

    /// Activate an account via the emailed link.
    pub async fn activate(&self, uid_b64: &str, token: &str) -> Result<ActivationOutcome> {
        let user_id = decode_uid(uid_b64)?;
        let user = user_repo::get_user_by_id(&self.db, user_id)
            .await?
            .ok_or(AuthError::InvalidLink)?;

        token_repo::consume_account_token(
            &self.db,
            user.id,
            &hash_token(token),
            token_purpose::ACTIVATION,
        )
        .await?
        .ok_or(AuthError::TokenInvalid)?;

        if user.is_active {
            return Ok(ActivationOutcome::AlreadyActive);
        }

        user_repo::activate_user(&self.db, user.id).await?;
        info!(user_id = %user.id, "account activated");
        Ok(ActivationOutcome::Activated)
    }

    /// Verify credentials of an active account and issue a token pair. The
    /// refresh token is persisted hashed so logout can revoke it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair)> {
        let user = user_repo::get_user_by_email(&self.db, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        if !user.is_active {
            // An unactivated account looks no different from a wrong
            // password.
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self
            .keys
            .generate_token_pair(user.id, &user.email)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        token_repo::create_refresh_token(
            &self.db,
            user.id,
            &hash_token(&pair.refresh_token),
            Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS),
        )
        .await?;

        info!(user_id = %user.id, "user logged in");
        Ok((user, pair))
    }

    /// Exchange a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self
            .keys
            .validate_token_of_type(refresh_token, TOKEN_TYPE_REFRESH)?;

        token_repo::get_valid_refresh_token(&self.db, &hash_token(refresh_token))
            .await?
            .ok_or(AuthError::RefreshTokenInvalid)?;

        let user_id = claims.user_id().map_err(|_| AuthError::RefreshTokenInvalid)?;
        let access = self
            .keys
            .generate_access_token(user_id, &claims.email)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(%user_id, "access token refreshed");
        Ok(access)
    }

    /// Revoke the presented refresh token. Invalid tokens are ignored;
    /// logout always succeeds.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        token_repo::revoke_refresh_token(&self.db, &hash_token(refresh_token)).await?;
        Ok(())
    }

    /// Issue a password-reset token and email its link. Silently does
    /// nothing for unknown or inactive accounts, so the endpoint never
    /// discloses which emails exist.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let Some(user) = user_repo::get_user_by_email(&self.db, email).await? else {
            return Ok(());
        };
        if !user.is_active {
            return Ok(());
        }

        let reset_token = generate_one_time_token();
        token_repo::create_account_token(
            &self.db,
            user.id,
            &hash_token(&reset_token),
            token_purpose::PASSWORD_RESET,
            Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS),
        )
        .await?;

        let uid = encode_uid(user.id);
        if let Err(e) = self
            .email
            .send_password_reset_email(&user.email, &uid, &reset_token)
            .await
        {
            warn!(user_id = %user.id, "password reset email failed: {}", e);
        }

        Ok(())
    }

    /// Set a new password through the emailed reset link. Consuming the
    /// token also revokes every live refresh token of the account.
    pub async fn confirm_password_reset(
        &self,
        uid_b64: &str,
        token: &str,
        new_password: &str,
    ) -> Result<()> {
        let user_id = decode_uid(uid_b64)?;
        let user = user_repo::get_user_by_id(&self.db, user_id)
            .await?
            .ok_or(AuthError::InvalidLink)?;

        token_repo::consume_account_token(
            &self.db,
            user.id,
            &hash_token(token),
            token_purpose::PASSWORD_RESET,
        )
        .await?
        .ok_or(AuthError::TokenInvalid)?;

        let password_hash = hash_password(new_password)?;
        user_repo::update_password(&self.db, user.id, &password_hash).await?;
        token_repo::revoke_user_tokens(&self.db, user.id).await?;

        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}
