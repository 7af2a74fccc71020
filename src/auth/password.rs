use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

lazy_static! {
    static ref DUMMY_HASH: String =
        hash_password("gatekeep-dummy-password").unwrap_or_default();
}

/// Valid PHC hash of a throwaway password, computed once.
/// Login verifies against it when the email is unknown.
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.as_str()
}

/// Argon2id hash with a fresh random salt, in PHC string format.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Constant-time check of `plain` against a stored PHC hash.
/// A malformed hash is treated as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "StrongPass123!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("StrongPass123!").unwrap();
        let b = hash_password("StrongPass123!").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("StrongPass123!", &a));
        assert!(verify_password("StrongPass123!", &b));
    }

    #[test]
    fn dummy_hash_is_well_formed_and_stable() {
        assert!(dummy_hash().starts_with("$argon2"));
        assert!(PasswordHash::new(dummy_hash()).is_ok());
        assert_eq!(dummy_hash(), dummy_hash());
        assert!(!verify_password("StrongPass123!", dummy_hash()));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }
}
