/// Refresh-token and one-time-token persistence. All tokens are stored as
/// sha256 digests; raw values never touch the database.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AccountToken, RefreshToken};

pub async fn create_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at)
        VALUES (gen_random_uuid(), $1, $2, $3, false, NOW())
        "#,
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up a live (unrevoked, unexpired) refresh token by digest.
pub async fn get_valid_refresh_token(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<RefreshToken>> {
    let token = sqlx::query_as::<_, RefreshToken>(
        "SELECT * FROM refresh_tokens \
         WHERE token_hash = $1 AND revoked = false AND expires_at > NOW()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(token)
}

/// Revoke one refresh token by digest (logout).
pub async fn revoke_refresh_token(pool: &PgPool, token_hash: &str) -> Result<()> {
    sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

/// Revoke every refresh token of a user (password reset).
pub async fn revoke_user_tokens(pool: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_account_token(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    purpose: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO account_tokens (id, user_id, token_hash, purpose, expires_at, used, created_at)
        VALUES (gen_random_uuid(), $1, $2, $3, $4, false, NOW())
        "#,
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(purpose)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Atomically consume a live one-time token for a user and purpose.
/// Returns `None` when no matching unused, unexpired token exists.
pub async fn consume_account_token(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    purpose: &str,
) -> Result<Option<AccountToken>> {
    let token = sqlx::query_as::<_, AccountToken>(
        "UPDATE account_tokens SET used = true \
         WHERE user_id = $1 AND token_hash = $2 AND purpose = $3 \
           AND used = false AND expires_at > NOW() \
         RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(purpose)
    .fetch_optional(pool)
    .await?;

    Ok(token)
}
