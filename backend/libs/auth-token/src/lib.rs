//! Shared JWT token library for Streamforge services
//!
//! The auth-service issues access and refresh tokens; every other service
//! only validates them. Keys are injected explicitly at construction time
//! instead of living in process-global state, so each binary decides once,
//! at startup, which secret it trusts.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token kinds carried in the `token_type` claim.
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("wrong token type: expected {expected}, got {actual}")]
    WrongType { expected: String, actual: String },

    #[error("subject is not a valid user id")]
    InvalidSubject,
}

pub type Result<T> = std::result::Result<T, TokenError>;

/// JWT claims shared by all Streamforge services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as UUID string)
    pub sub: String,
    /// Email address of the authenticated user
    pub email: String,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Parse the subject claim back into a user id.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::InvalidSubject)
    }
}

/// Access/refresh token pair returned by login and refresh flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Signing and validation keys for one shared secret.
///
/// Cheap to clone; both keys wrap the same HMAC secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Generate a short-lived access token.
    pub fn generate_access_token(&self, user_id: Uuid, email: &str) -> Result<String> {
        self.generate(
            user_id,
            email,
            TOKEN_TYPE_ACCESS,
            Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
        )
    }

    /// Generate a long-lived refresh token.
    pub fn generate_refresh_token(&self, user_id: Uuid, email: &str) -> Result<String> {
        self.generate(
            user_id,
            email,
            TOKEN_TYPE_REFRESH,
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        )
    }

    /// Generate both tokens at once, as login does.
    pub fn generate_token_pair(&self, user_id: Uuid, email: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id, email)?,
            refresh_token: self.generate_refresh_token(user_id, email)?,
            expires_in: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
        })
    }

    /// Validate signature and expiry, returning the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(JWT_ALGORITHM);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Validate and additionally require a specific `token_type` claim.
    pub fn validate_token_of_type(&self, token: &str, expected: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected: expected.to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    fn generate(
        &self,
        user_id: Uuid,
        email: &str,
        token_type: &str,
        ttl: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: token_type.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &self.encoding,
        )?)
    }
}
