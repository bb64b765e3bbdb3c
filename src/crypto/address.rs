//! Ethereum address representation and utilities.

use std::fmt;
use std::str::FromStr;

use super::{keccak256, KeyError};

/// Length of `0x` followed by 40 hex characters.
pub const PREFIXED_HEX_LEN: usize = 42;

/// An Ethereum address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives the address of an uncompressed secp256k1 public key.
    ///
    /// Process:
    /// 1. Drop the first byte (0x04 prefix)
    /// 2. Hash the remaining 64 bytes (X || Y) with Keccak-256
    /// 3. Take the last 20 bytes of the hash
    #[inline]
    pub fn from_public_key(public_key: &[u8; 65]) -> Self {
        let hash = keccak256(&public_key[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Parses a 40 character hex address, with or without `0x`, in any case.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(KeyError::InvalidAddress(format!(
                "expected 40 hex characters, got {}",
                digits.len()
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Returns the address as a lowercase hex string (without 0x prefix).
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the lowercase address with 0x prefix.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Returns the lowercase `0x` form as ASCII bytes, without allocating.
    #[inline]
    pub fn hex_prefixed_bytes(&self) -> [u8; PREFIXED_HEX_LEN] {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buf = [0u8; PREFIXED_HEX_LEN];
        buf[0] = b'0';
        buf[1] = b'x';
        for (i, byte) in self.0.iter().enumerate() {
            buf[2 + 2 * i] = DIGITS[usize::from(byte >> 4)];
            buf[3 + 2 * i] = DIGITS[usize::from(byte & 0x0f)];
        }
        buf
    }

    /// Returns the address with checksum encoding (EIP-55).
    ///
    /// Character `i` of the lowercase hex is uppercased when nibble `i` of
    /// `keccak256(lowercase_hex)` is 8 or greater.
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let hash = keccak256(hex_addr.as_bytes());

        let mut checksum = String::with_capacity(PREFIXED_HEX_LEN);
        checksum.push_str("0x");

        for (i, c) in hex_addr.chars().enumerate() {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };

            if hash_nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeypairGenerator, RandomSource};

    #[test]
    fn test_checksum_address() {
        // Test vectors from EIP-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let addr = Address::from_hex(expected).unwrap();
            assert_eq!(addr.to_checksum(), expected);
        }
    }

    #[test]
    fn test_checksum_is_stable_after_lowercasing() {
        let mut generator = KeypairGenerator::with_rng(RandomSource::Seeded(55).rng_for(0));
        for _ in 0..300 {
            let addr = *generator.generate().address();
            let checksum = addr.to_checksum();
            let again = Address::from_hex(&checksum.to_lowercase()).unwrap();
            assert_eq!(again, addr);
            assert_eq!(again.to_checksum(), checksum);
        }
    }

    #[test]
    fn test_hex_output() {
        let bytes = [0u8; 20];
        let addr = Address::from_bytes(bytes);
        assert_eq!(addr.to_hex(), "0000000000000000000000000000000000000000");
        assert_eq!(
            addr.to_hex_prefixed(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_hex_prefixed_bytes_matches_to_hex_prefixed() {
        let mut generator = KeypairGenerator::with_rng(RandomSource::Seeded(7).rng_for(0));
        let mut addresses = vec![
            Address::from_bytes([0u8; 20]),
            Address::from_bytes([0xff; 20]),
            Address::from_hex("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap(),
        ];
        addresses.extend((0..50).map(|_| *generator.generate().address()));

        for addr in addresses {
            assert_eq!(&addr.hex_prefixed_bytes()[..], addr.to_hex_prefixed().as_bytes());
        }
    }

    #[test]
    fn test_parse_from_str() {
        let addr: Address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
        assert_eq!(addr.to_hex(), "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("zz00000000000000000000000000000000000000").is_err());
    }
}
