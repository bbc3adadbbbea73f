//! Session cookie values.
//!
//! A token is 32 random bytes, base64url without padding. Storage only
//! ever sees `hash_session_token(token)`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of the raw token.
pub fn hash_session_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_cookie_safe_and_fresh() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 43);
        assert!(a.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_'));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_stable_hex() {
        let h = hash_session_token("cookie-value");
        assert_eq!(h, hash_session_token("cookie-value"));
        assert_eq!(h.len(), 64);
        assert!(h.bytes().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(h, hash_session_token("cookie-valuf"));
    }
}
