use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use rand_core::OsRng;

/// Hash compared against when the account does not exist, so unknown emails
/// cost the same as wrong passwords.
static DECOY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("decoy-password-for-timing").ok());

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Unparseable stored hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Burn one verification against the decoy hash. Always false.
pub fn verify_against_decoy(password: &str) -> bool {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let hash = hash_password("pw1").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("pw2", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("pw1").expect("hash");
        let second = hash_password("pw1").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_never_matches() {
        assert!(!verify_password("pw1", "pw1"));
        assert!(!verify_password("pw1", ""));
    }

    #[test]
    fn decoy_never_matches() {
        assert!(!verify_against_decoy("decoy-password-for-timing"));
    }
}
