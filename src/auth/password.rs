//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Hashes are stored as PHC strings (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`),
//! so the iteration count travels with each hash and can be raised without
//! invalidating existing ones.

use password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use pbkdf2::{Algorithm, Params, Pbkdf2};

const OUTPUT_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] password_hash::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let params = Params {
            rounds: self.iterations,
            output_length: OUTPUT_LEN,
        };

        let hash = Pbkdf2.hash_password_customized(
            password.as_bytes(),
            Some(Algorithm::Pbkdf2Sha256.ident()),
            None,
            params,
            salt.as_salt(),
        )?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC string.
    ///
    /// Malformed hashes and other algorithms never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let parsed = match PasswordHash::new(encoded) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
    }

    /// Burn the cost of one verification without a stored hash.
    ///
    /// Used when the account does not exist so that unknown emails take as
    /// long to reject as wrong passwords.
    pub fn verify_absent(&self, password: &str) -> bool {
        if let Err(e) = self.hash(password) {
            tracing::debug!(error = %e, "Placeholder hash failed");
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(1_000);
        let encoded = hasher.hash("password123").unwrap();

        assert!(encoded.starts_with("$pbkdf2-sha256$i=1000,l=32$"));
        assert!(hasher.verify("password123", &encoded));
        assert!(!hasher.verify("password124", &encoded));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new(10);
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_uses_stored_iterations() {
        let old = PasswordHasher::new(50).hash("password123").unwrap();
        assert!(old.contains("i=50,"));
        assert!(PasswordHasher::new(5_000).verify("password123", &old));
    }

    #[test]
    fn test_other_pbkdf2_variant_verifies() {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let sha512 = Pbkdf2
            .hash_password_customized(
                b"password123",
                Some(Algorithm::Pbkdf2Sha512.ident()),
                None,
                Params {
                    rounds: 10,
                    output_length: 64,
                },
                salt.as_salt(),
            )
            .unwrap()
            .to_string();

        let hasher = PasswordHasher::new(10);
        assert!(hasher.verify("password123", &sha512));
        assert!(!hasher.verify("password", &sha512));
    }

    #[test]
    fn test_absent_account_never_verifies() {
        let hasher = PasswordHasher::new(10);
        assert!(!hasher.verify_absent("password123"));
        assert!(!hasher.verify_absent(""));
    }

    #[test]
    fn test_malformed_hashes_rejected() {
        let hasher = PasswordHasher::new(10);
        for encoded in [
            "",
            "plaintext",
            "pbkdf2-sha256$10$c2FsdA$aGFzaA",
            "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW",
            "$argon2id$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG",
            "$pbkdf2-sha256$i=10,l=32$!!!$aGFzaA",
            "$pbkdf2-sha256$i=10,l=32$c2FsdHNhbHQ$aGFzaA",
        ] {
            assert!(!hasher.verify("password123", encoded), "{encoded}");
        }
    }
}
