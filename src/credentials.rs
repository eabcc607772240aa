//! Password hashing and verification.
//!
//! Salts are 22-character alphanumeric strings from a CSPRNG; hashes are
//! Argon2id PHC strings. The same salt is stored both as its own column and
//! inside the PHC string, and [`CredentialManager::verify`] refuses to match
//! when the two disagree.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Length of generated salts. Alphanumeric, so always a valid B64 subset.
pub const SALT_LENGTH: usize = 22;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("Unusable salt: {0}")]
    BadSalt(String),

    #[error("Malformed stored password hash: {0}")]
    MalformedHash(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Produces and verifies password hashes. Cheap to clone; holds only the
/// Argon2 cost parameters.
#[derive(Clone)]
pub struct CredentialManager {
    argon2: Argon2<'static>,
}

impl CredentialManager {
    pub fn new(security: &SecurityConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            security.argon2_memory_cost_kib,
            security.argon2_time_cost,
            security.argon2_parallelism,
            None,
        )
        .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Generates a random 22-character alphanumeric salt.
    ///
    /// `rand::rng()` is a CSPRNG (ChaCha-based), so salts are suitable for
    /// credential storage, not just uniqueness.
    ///
    /// The result must decode as canonical B64: 22 characters hold 132 bits
    /// but only 128 are used, so the final character's low 4 bits must be
    /// zero or strict decoders reject the salt. The last character is drawn
    /// from the alphanumeric subset with that property.
    #[must_use]
    pub fn generate_salt() -> String {
        use rand::Rng;
        use rand::distr::Alphanumeric;

        const CANONICAL_TAIL: &[u8] = b"AEIMQUYcgkosw048";

        let mut rng = rand::rng();
        let mut salt: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(SALT_LENGTH - 1)
            .map(char::from)
            .collect();
        salt.push(char::from(
            CANONICAL_TAIL[rng.random_range(0..CANONICAL_TAIL.len())],
        ));
        salt
    }

    /// Hashes a plaintext with the given salt into a PHC string.
    ///
    /// Deterministic for a fixed (plaintext, salt, params) triple, which is
    /// what makes verification possible.
    pub fn hash(&self, plaintext: &str, salt: &str) -> Result<String, CredentialError> {
        let salt = SaltString::from_b64(salt).map_err(|e| CredentialError::BadSalt(e.to_string()))?;

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext against a stored hash and its salt column.
    ///
    /// Wrong passwords and salt-column disagreement are a plain `Ok(false)`;
    /// only an undecodable stored hash is an error. The underlying comparison
    /// is constant-time.
    pub fn verify(
        &self,
        plaintext: &str,
        stored_hash: &str,
        salt: &str,
    ) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

        // The standalone salt column must agree with the salt baked into the
        // PHC string, otherwise the record is inconsistent and cannot match.
        if parsed.salt.is_none_or(|s| s.as_str() != salt) {
            return Ok(false);
        }

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::MalformedHash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> CredentialManager {
        CredentialManager::new(&SecurityConfig::default()).unwrap()
    }

    fn fast_manager() -> CredentialManager {
        CredentialManager::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_generate_salt_shape() {
        let salt = CredentialManager::generate_salt();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt.chars().all(char::is_alphanumeric));
        // Shape alone is not enough; the hashing path must accept it too.
        assert!(fast_manager().hash("pw", &salt).is_ok());
    }

    #[test]
    fn test_generated_salts_decode_as_canonical_b64() {
        // Strict B64 decoders reject a 22-char salt whose final character
        // carries non-zero trailing bits, so every generated salt must make
        // it through hashing, not just most of them.
        let manager = fast_manager();
        for _ in 0..32 {
            let salt = CredentialManager::generate_salt();
            assert!(manager.hash("pw", &salt).is_ok(), "salt rejected: {salt}");
        }
    }

    #[test]
    fn test_non_canonical_salt_is_rejected_by_hash() {
        // 'B' = 0b000001: trailing bits set, so the encoding is non-canonical.
        let result = fast_manager().hash("pw", "aaaaaaaaaaaaaaaaaaaaaB");
        assert!(matches!(result, Err(CredentialError::BadSalt(_) | CredentialError::Hash(_))));
    }

    #[test]
    fn test_generate_salt_is_random() {
        assert_ne!(
            CredentialManager::generate_salt(),
            CredentialManager::generate_salt()
        );
    }

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let manager = manager();
        let salt = CredentialManager::generate_salt();
        let hash = manager.hash("hunter22", &salt).unwrap();
        assert!(manager.verify("hunter22", &hash, &salt).unwrap());
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let manager = manager();
        let salt = CredentialManager::generate_salt();
        let hash = manager.hash("correct horse", &salt).unwrap();
        assert!(!manager.verify("battery staple", &hash, &salt).unwrap());
    }

    #[test]
    fn test_hash_is_deterministic_for_fixed_salt() {
        let manager = manager();
        let salt = CredentialManager::generate_salt();
        assert_eq!(
            manager.hash("secret", &salt).unwrap(),
            manager.hash("secret", &salt).unwrap()
        );
    }

    #[test]
    fn test_salt_column_disagreement_is_a_mismatch() {
        let manager = manager();
        let salt = CredentialManager::generate_salt();
        let other_salt = CredentialManager::generate_salt();
        let hash = manager.hash("secret", &salt).unwrap();
        assert!(!manager.verify("secret", &hash, &other_salt).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_fatal() {
        let manager = manager();
        let salt = CredentialManager::generate_salt();
        let result = manager.verify("secret", "not-a-phc-string", &salt);
        assert!(matches!(result, Err(CredentialError::MalformedHash(_))));
    }

    #[test]
    fn test_verify_survives_param_changes() {
        // Hashes carry their own cost params, so a manager with different
        // costs still verifies older hashes.
        let old = manager();
        let salt = CredentialManager::generate_salt();
        let hash = old.hash("secret", &salt).unwrap();

        let new = CredentialManager::new(&SecurityConfig {
            argon2_memory_cost_kib: 4096,
            argon2_time_cost: 2,
            ..SecurityConfig::default()
        })
        .unwrap();
        assert!(new.verify("secret", &hash, &salt).unwrap());
    }
}
