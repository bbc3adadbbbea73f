//! Password checks against stored Argon2id hashes.

use argon2::password_hash::{Error as HashError, PasswordHash};
use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Returns `Ok(false)` for a wrong password and `Err` only when the
/// stored hash cannot be parsed. The pepper, when configured, is
/// prefixed to the password exactly as the user store does on insert.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("stored hash unreadable: {e}")))?;

    let candidate = match pepper {
        Some(pepper) => format!("{pepper}{password}"),
        None => password.to_owned(),
    };

    // Cost parameters come from the PHC string itself.
    match Argon2::default().verify_password(candidate.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("password check failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_db::repository::hash_password;

    #[test]
    fn matching_password_verifies() {
        let hash = hash_password("open sesame", None).unwrap();
        assert!(verify_password("open sesame", &hash, None).unwrap());
        assert!(!verify_password("open sesame!", &hash, None).unwrap());
    }

    #[test]
    fn pepper_must_match() {
        let hash = hash_password("open sesame", Some("kitchen")).unwrap();
        assert!(verify_password("open sesame", &hash, Some("kitchen")).unwrap());
        assert!(!verify_password("open sesame", &hash, Some("garden")).unwrap());
        assert!(!verify_password("open sesame", &hash, None).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", "plaintext-oops", None),
            Err(AuthError::Crypto(_))
        ));
    }
}
