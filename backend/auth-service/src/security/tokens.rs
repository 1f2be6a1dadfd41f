/// One-time token material for activation and password-reset links
///
/// Raw tokens travel only in email links; the database stores a sha256
/// digest. User ids inside links are base64-encoded, mirroring the link
/// format the frontend expects.
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuthError, Result};

/// Generate a fresh random token (64 hex chars).
pub fn generate_one_time_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Digest of a token as stored at rest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Encode a user id for inclusion in an email link.
pub fn encode_uid(user_id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(user_id.to_string().as_bytes())
}

/// Decode the uid component of an activation or reset link.
pub fn decode_uid(encoded: &str) -> Result<Uuid> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| AuthError::InvalidLink)?;
    let raw = String::from_utf8(bytes).map_err(|_| AuthError::InvalidLink)?;
    Uuid::parse_str(&raw).map_err(|_| AuthError::InvalidLink)
}
