use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Bytes of OS randomness behind every refresh secret.
const SECRET_BYTES: usize = 32;

/// Generates a new opaque refresh secret, URL-safe base64 without padding.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a bearer secret as 64 lowercase hex characters.
///
/// This is the only form in which refresh secrets reach the store; presented
/// secrets are looked up by recomputing it.
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}
