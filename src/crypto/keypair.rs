//! Ethereum keypair generation.

use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};

use super::{Address, KeyError};

/// Represents an Ethereum keypair (private key, public key and derived address).
#[derive(Clone)]
pub struct Keypair {
    /// The private key bytes (32 bytes)
    secret_key: [u8; 32],
    /// Uncompressed public key (0x04 || X || Y)
    public_key: [u8; 65],
    /// The derived Ethereum address
    address: Address,
}

impl Keypair {
    /// Generates a new random keypair from OS entropy.
    ///
    /// Convenience for one-off use; the search loop keeps a [`KeypairGenerator`]
    /// so the secp256k1 context and RNG are not rebuilt for every key.
    pub fn generate() -> Self {
        KeypairGenerator::new().generate()
    }

    /// Builds a keypair from an existing secret key.
    pub fn from_secret_key(secret_bytes: [u8; 32]) -> Result<Self, KeyError> {
        let secp = Secp256k1::signing_only();
        let secret_key =
            SecretKey::from_slice(&secret_bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_parts(&secp, &secret_key))
    }

    /// Builds a keypair from a hex encoded secret key (optional `0x`).
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let digits = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)?;
        Self::from_secret_key(bytes)
    }

    fn from_parts(secp: &Secp256k1<SignOnly>, secret_key: &SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(secp, secret_key).serialize_uncompressed();
        Self {
            secret_key: secret_key.secret_bytes(),
            public_key,
            address: Address::from_public_key(&public_key),
        }
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    /// Returns the uncompressed public key as hex (`04` prefix included).
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Returns the uncompressed public key bytes.
    pub fn public_key_bytes(&self) -> &[u8; 65] {
        &self.public_key
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Where a worker's random scalars come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomSource {
    /// Each worker owns a ChaCha-based `StdRng` seeded from OS entropy.
    #[default]
    Entropy,
    /// Worker `i` uses `StdRng` seeded with `seed + i`. Reproducible; not for real keys.
    Seeded(u64),
}

impl RandomSource {
    /// Builds the RNG owned by worker `worker_id`.
    pub fn rng_for(self, worker_id: usize) -> StdRng {
        match self {
            RandomSource::Entropy => StdRng::from_entropy(),
            RandomSource::Seeded(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker_id as u64)),
        }
    }
}

/// Produces random keypairs from an owned RNG and secp256k1 context.
pub struct KeypairGenerator<R = StdRng> {
    secp: Secp256k1<SignOnly>,
    rng: R,
}

impl KeypairGenerator<StdRng> {
    /// Creates a generator backed by OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for KeypairGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> KeypairGenerator<R> {
    /// Creates a generator drawing scalars from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            secp: Secp256k1::signing_only(),
            rng,
        }
    }

    /// Generates the next keypair.
    ///
    /// A drawn scalar of zero or at least the curve order is discarded and
    /// redrawn, so the caller never sees an invalid key.
    #[inline]
    pub fn generate(&mut self) -> Keypair {
        let mut bytes = [0u8; 32];
        loop {
            self.rng.fill_bytes(&mut bytes);
            if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
                return Keypair::from_parts(&self.secp, &secret_key);
            }
        }
    }
}
