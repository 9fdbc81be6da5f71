//! Credential domain model
//!
//! Secrets are stored as Argon2id PHC strings and only ever verified, never
//! compared in the clear.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;

/// Argon2id cost parameters used when hashing new secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Argon2Params {
    pub time_cost: u32,
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl Argon2Params {
    /// Check the parameters are accepted by argon2 without hashing anything
    pub fn validate(&self) -> Result<()> {
        self.hasher().map(|_| ())
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| Error::credential(format!("invalid argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// A one-way hashed secret
#[derive(Clone)]
pub struct Credential {
    phc: String,
    params: Argon2Params,
}

impl Credential {
    /// Hash a secret with a fresh random salt
    pub fn hash(secret: &str, params: &Argon2Params) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = params
            .hasher()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| Error::credential(format!("failed to hash secret: {e}")))?
            .to_string();

        Ok(Self {
            phc,
            params: params.clone(),
        })
    }

    /// Check a claimed secret against the stored hash
    ///
    /// A stored hash that cannot be parsed never verifies.
    pub fn verify(&self, claimed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(claimed.as_bytes(), &parsed)
            .is_ok()
    }

    /// Hash a replacement secret with the same cost parameters
    pub fn rehash(&self, secret: &str) -> Result<Self> {
        Self::hash(secret, &self.params)
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("algorithm", &"argon2id")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_params() -> Argon2Params {
    Argon2Params {
        time_cost: 1,
        memory_cost: 1024,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let credential = Credential::hash("password123", &test_params()).unwrap();
        assert!(credential.verify("password123"));
        assert!(!credential.verify("password124"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn test_salt_is_random() {
        let a = Credential::hash("same", &test_params()).unwrap();
        let b = Credential::hash("same", &test_params()).unwrap();
        assert_ne!(a.phc, b.phc);
        assert!(a.phc.starts_with("$argon2id$"));
    }

    #[test]
    fn test_rehash_keeps_params() {
        let credential = Credential::hash("old-secret", &test_params()).unwrap();
        let next = credential.rehash("new-secret").unwrap();
        assert_eq!(next.params(), &test_params());
        assert!(next.verify("new-secret"));
        assert!(!next.verify("old-secret"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Argon2Params {
            time_cost: 0,
            ..test_params()
        };
        assert!(matches!(Credential::hash("x", &params), Err(Error::Credential(_))));
        assert!(params.validate().is_err());
        assert!(test_params().validate().is_ok());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let credential = Credential {
            phc: "not-a-phc-string".to_string(),
            params: test_params(),
        };
        assert!(!credential.verify("not-a-phc-string"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let credential = Credential::hash("secret", &test_params()).unwrap();
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("$argon2id$"));
        assert!(rendered.contains("argon2id"));
    }

    #[test]
    fn test_default_params() {
        let params = Argon2Params::default();
        assert_eq!(params.memory_cost, 65536);
        assert_eq!(params.time_cost, 3);
        assert_eq!(params.parallelism, 4);
    }
}
