//! Salted SHA-256 PIN hashing
//!
//! `hex(sha256(salt || pin))`. The salt is fixed per hasher, which keeps the
//! function deterministic for a given machine configuration.

use crate::core::traits::PinHasher;
use crate::types::PinHash;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length in bytes of a generated salt
const SALT_LEN: usize = 16;

/// PIN hasher using SHA-256 over a salt and the PIN
#[derive(Clone)]
pub struct Sha256PinHasher {
    salt: Vec<u8>,
}

impl Sha256PinHasher {
    /// Hasher with a caller-provided salt
    pub fn new(salt: impl AsRef<[u8]>) -> Self {
        Self {
            salt: salt.as_ref().to_vec(),
        }
    }

    /// Hasher with a freshly generated random salt
    pub fn with_random_salt() -> Self {
        let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
        Self {
            salt: salt.to_vec(),
        }
    }
}

impl std::fmt::Debug for Sha256PinHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256PinHasher").finish_non_exhaustive()
    }
}

impl PinHasher for Sha256PinHasher {
    fn hash(&self, pin: &str) -> PinHash {
        let mut hasher = Sha256::new();
        hasher.update(&self.salt);
        hasher.update(pin.as_bytes());
        PinHash::new(hex::encode(hasher.finalize()))
    }
}
