// Account addresses

pub mod bech32;

use crate::crypto::{hash160, sha256};
use crate::error::{Error, Result, ValidationError};
use secp256k1::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_SIZE_BYTES: usize = 20;

/// 20-byte account address: the last 20 bytes of SHA-256 over the
/// compressed public key.
///
/// Displays and serializes in checksummed hex form (`0x` + mixed case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_SIZE_BYTES]);

impl Address {
    pub fn new(bytes: [u8; ADDRESS_SIZE_BYTES]) -> Self {
        Self(bytes)
    }

    /// Create an address from a slice of exactly 20 bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; ADDRESS_SIZE_BYTES] = slice.try_into().map_err(|_| {
            ValidationError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_SIZE_BYTES,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Derive the address of a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::from_public_key_bytes(&public_key.serialize())
    }

    pub fn from_public_key_bytes(compressed: &[u8]) -> Self {
        Self(hash160(compressed))
    }

    /// Parse 40 hex digits in any case, `0x` optional. The checksum is not
    /// enforced here; see [`Address::from_str`] for strict parsing.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let normalized = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if normalized.len() != ADDRESS_SIZE_BYTES * 2 {
            return Err(ValidationError::InvalidAddress(format!(
                "expected {} hex digits, got {}",
                ADDRESS_SIZE_BYTES * 2,
                normalized.len()
            ))
            .into());
        }
        let bytes = hex::decode(normalized)
            .map_err(|e| ValidationError::InvalidAddress(format!("not hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Decode a `zil1...` address
    pub fn from_bech32(text: &str) -> Result<Self> {
        Ok(Self(bech32::from_bech32(text)?))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE_BYTES] {
        &self.0
    }

    /// Lowercase hex, no prefix (the form `GetBalance` expects)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Checksummed hex with `0x` prefix.
    ///
    /// Hex letter i is uppercased when bit (255 - 6i) of SHA-256 over the
    /// raw address bytes is set.
    pub fn to_checksum(&self) -> String {
        let lower = self.to_hex();
        let hash = sha256(&self.0);

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let bit = 6 * i;
            if c.is_ascii_alphabetic() && (hash[bit / 8] >> (7 - bit % 8)) & 1 == 1 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    pub fn to_bech32(&self) -> String {
        bech32::encode_address(&self.0)
    }

    /// True when `text` is `0x` + 40 hex digits whose case matches the checksum
    pub fn is_valid_checksum(text: &str) -> bool {
        match Self::from_hex(text) {
            Ok(address) => text.strip_prefix("0x").unwrap_or(text) == &address.to_checksum()[2..],
            Err(_) => false,
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Accepts a bech32 address or checksummed hex
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if bech32::is_bech32(s) {
            return Self::from_bech32(s);
        }
        if Self::is_valid_checksum(s) {
            return Self::from_hex(s);
        }
        Err(ValidationError::InvalidAddress(format!("Address format is invalid: {}", s)).into())
    }
}

impl From<[u8; ADDRESS_SIZE_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    const CHECKSUMMED: &str = "0x1d19918A737306218b5CBB3241FcdcBd998c3a72";
    const BECH: &str = "zil1r5verznnwvrzrz6uhveyrlxuhkvccwnju4aehf";

    #[test]
    fn test_checksum_vectors() {
        let a = Address::from_hex("1d19918a737306218b5cbb3241fcdcbd998c3a72").unwrap();
        assert_eq!(a.to_checksum(), CHECKSUMMED);

        let b = Address::from_hex("0xE6854848A9F9C628D9F5A85EDB8E5C505023109F").unwrap();
        assert_eq!(b.to_checksum(), "0xe6854848A9F9C628d9F5A85eDb8e5c505023109F");
    }

    #[test]
    fn test_is_valid_checksum() {
        assert!(Address::is_valid_checksum(CHECKSUMMED));
        assert!(!Address::is_valid_checksum(&CHECKSUMMED.to_lowercase()));
        assert!(!Address::is_valid_checksum("0x1234"));
    }

    #[test]
    fn test_address_from_scalar_one() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let kp = KeyPair::from_secret_bytes(&one).unwrap();
        let address = kp.address();
        assert_eq!(address.to_checksum(), "0x29e562f73488c8a2bB9Dbc5700b361D54b9B0554");
        assert_eq!(address.to_bech32(), "zil198jk9ae53ry29wuah3tspvmp649ekp250ajt0a");
    }

    #[test]
    fn test_parse_normalises() {
        let from_bech: Address = BECH.parse().unwrap();
        let from_hex: Address = CHECKSUMMED.parse().unwrap();
        assert_eq!(from_bech, from_hex);
        assert_eq!(from_bech.to_bech32(), BECH);

        // lowercase hex fails the checksum
        assert!("0x1d19918a737306218b5cbb3241fcdcbd998c3a72".parse::<Address>().is_err());
        assert!("not an address".parse::<Address>().is_err());
    }

    #[test]
    fn test_from_slice_length() {
        assert!(Address::from_slice(&[0u8; 19]).is_err());
        assert!(Address::from_slice(&[0u8; 20]).is_ok());
        assert!(Address::from_hex("zz".repeat(20).as_str()).is_err());
    }

    #[test]
    fn test_serde_as_checksum_string() {
        let a: Address = CHECKSUMMED.parse().unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED));

        let back: Address = serde_json::from_str(&format!("\"{}\"", BECH)).unwrap();
        assert_eq!(back, a);
        assert_eq!(a.to_string(), CHECKSUMMED);
    }
}
