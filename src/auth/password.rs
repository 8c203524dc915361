use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

fn hasher(cfg: &PasswordConfig) -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(cfg.memory_kib, cfg.iterations, Params::DEFAULT_P_COST, None)
        .map_err(|e| {
            error!(error = %e, "argon2 params error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(plain: &str, cfg: &PasswordConfig) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(cfg)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Cost parameters are read back from the stored hash, so hashes made under an
/// older configuration keep verifying.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordConfig {
        PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
        }
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, &cheap()).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple", &cheap()).unwrap();
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn hashes_are_salted_and_carry_configured_cost() {
        let a = hash_password("p", &cheap()).unwrap();
        let b = hash_password("p", &cheap()).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(a.contains("m=1024,t=1"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn invalid_cost_is_an_error() {
        let cfg = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
        };
        assert!(hash_password("p", &cfg).is_err());
    }
}
