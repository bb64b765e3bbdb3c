//! Cryptographic operations for Ethereum key and address generation.
//!
//! This module provides:
//! - Secure random key generation using secp256k1
//! - Ethereum address derivation using Keccak-256
//! - EIP-55 checksum encoding

mod address;
mod keypair;

pub use address::{Address, PREFIXED_HEX_LEN};
pub use keypair::{Keypair, KeypairGenerator, RandomSource};

use tiny_keccak::{Hasher, Keccak};

/// Errors raised when parsing keys or addresses supplied from outside the search loop.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid secret key: scalar must be in [1, n-1]")]
    InvalidSecretKey,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Keccak-256 digest of `data`.
#[inline]
pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}
