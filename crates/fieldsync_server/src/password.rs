//! Password hashing for reconciled user rows.
//!
//! Stored format: `sha256$<salt hex>$<digest hex>` where the digest is
//! SHA-256 over salt bytes followed by the password bytes. The scheme
//! prefix lets the sanitizer tell an already-hashed value from a
//! plaintext one, so a hash is never re-hashed on its next sync.

use crate::hex;
use fieldsync_protocol::DEFAULT_PASSWORD;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Hashes a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_with_salt(plain, &salt)
}

/// Hashes the default password assigned to user rows that arrive
/// without one.
pub fn hash_default_password() -> String {
    hash_password(DEFAULT_PASSWORD)
}

/// Verifies a plaintext password against a stored hash.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(salt_hex), Some(digest_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let (Some(salt), Some(digest)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    digest_with_salt(plain, &salt).as_slice() == digest.as_slice()
}

/// Returns true if the value is already in stored-hash format.
pub fn is_hashed(value: &str) -> bool {
    let mut parts = value.split('$');
    matches!(
        (parts.next(), parts.next(), parts.next(), parts.next()),
        (Some(SCHEME), Some(salt), Some(digest), None)
            if hex::decode(salt).is_some() && hex::decode(digest).is_some()
    )
}

fn digest_with_salt(plain: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    hasher.finalize().to_vec()
}

fn hash_with_salt(plain: &str, salt: &[u8]) -> String {
    let digest = digest_with_salt(plain, salt);
    format!("{SCHEME}${}${}", hex::encode(salt), hex::encode(&digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn default_password_verifies() {
        let stored = hash_default_password();
        assert!(verify_password(DEFAULT_PASSWORD, &stored));
        assert!(!stored.contains(DEFAULT_PASSWORD));
    }

    #[test]
    fn detects_hashed_values() {
        let stored = hash_password("x");
        assert!(is_hashed(&stored));
        assert!(!is_hashed("123456"));
        assert!(!is_hashed("sha256$nothex$nothex"));
        assert!(!is_hashed("md5$00$00"));
    }
}
