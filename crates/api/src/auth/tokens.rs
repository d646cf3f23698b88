//! Random single-use tokens (email links, OAuth `state`).
//!
//! Email tokens are sent in links and stored only as a SHA-256 hex digest.

use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated email-link tokens.
pub const EMAIL_TOKEN_LENGTH: usize = 48;

/// Length of the OAuth `state` parameter.
pub const OAUTH_STATE_LENGTH: usize = 32;

/// A random alphanumeric string of `len` characters.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Compute the SHA-256 hex digest of a token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate an email-link token. Returns `(plaintext, sha256_hex_hash)`.
pub fn generate_email_token() -> (String, String) {
    let plaintext = random_token(EMAIL_TOKEN_LENGTH);
    let hash = hash_token(&plaintext);
    (plaintext, hash)
}
