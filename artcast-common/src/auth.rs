//! Session tokens and credential hashing
//!
//! Tokens are `base64url(payload).mac` where the MAC is a SHA-256 digest
//! over the encoded payload followed by the signing secret. The payload
//! carries the principal fields plus an `exp` unix timestamp. Verification
//! yields the principal or nothing; callers treat nothing as
//! unauthenticated.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::Principal;
use crate::{Error, Result};

/// Session validity window: 24 hours
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    principal: Principal,
    exp: i64,
}

/// Generate a random hex-encoded signing secret (32 bytes of entropy).
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    to_hex(&bytes)
}

/// Issue a signed session token for `principal`, expiring `ttl_secs` from now.
pub fn issue_token(secret: &str, principal: &Principal, ttl_secs: i64) -> Result<String> {
    let claims = TokenClaims {
        principal: principal.clone(),
        exp: Utc::now().timestamp() + ttl_secs,
    };
    let bytes = serde_json::to_vec(&claims)
        .map_err(|e| Error::Internal(format!("failed to serialize session claims: {e}")))?;
    let payload = URL_SAFE_NO_PAD.encode(bytes);
    let mac = sign_payload(&payload, secret);
    Ok(format!("{payload}.{mac}"))
}

/// Verify a session token.
///
/// Returns the embedded principal, or None on bad encoding, MAC mismatch
/// or expiry.
pub fn verify_token(secret: &str, token: &str) -> Option<Principal> {
    let (payload, mac) = token.split_once('.')?;
    if sign_payload(payload, secret) != mac {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;
    if claims.exp < Utc::now().timestamp() {
        return None;
    }
    Some(claims.principal)
}

/// Hash a password with a fresh random salt, `salt$digest` format.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);
    let salt = to_hex(&salt);
    let digest = digest_password(&salt, password);
    format!("{salt}${digest}")
}

/// Check a password against a stored `salt$digest` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => digest_password(salt, password) == digest,
        None => false,
    }
}

fn sign_payload(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
