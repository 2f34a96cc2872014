// Key pairs

use crate::address::Address;
use crate::crypto::drbg::HmacDrbg;
use crate::error::{Result, ValidationError};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::constants::CURVE_ORDER;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

pub const PRIVKEY_SIZE_BYTES: usize = 32;
pub const PUBKEY_COMPRESSED_SIZE_BYTES: usize = 33;

/// Personalization string for private key generation
const KEYGEN_PERS: &[u8] = b"zilliqajs+secp256k1+SHA256";

/// Sample a private key in [1, n-1].
///
/// The DRBG is seeded with curve-order-sized OS entropy; candidates outside
/// the scalar range are discarded.
pub fn generate_private_key() -> SecretKey {
    let mut entropy = [0u8; PRIVKEY_SIZE_BYTES];
    OsRng.fill_bytes(&mut entropy);

    let mut drbg = HmacDrbg::new(&entropy, &CURVE_ORDER, KEYGEN_PERS);
    loop {
        if let Ok(key) = SecretKey::from_slice(&drbg.generate_32()) {
            return key;
        }
    }
}

/// Parse a hex private key, with or without `0x`
pub fn parse_private_key(hex_str: &str) -> Result<SecretKey> {
    let trimmed = hex_str.trim();
    let normalized = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let bytes = hex::decode(normalized)
        .map_err(|e| ValidationError::InvalidPrivateKey(format!("not hex: {}", e)))?;

    if bytes.len() != PRIVKEY_SIZE_BYTES {
        return Err(ValidationError::InvalidPrivateKey(format!(
            "expected {} bytes, got {}",
            PRIVKEY_SIZE_BYTES,
            bytes.len()
        ))
        .into());
    }

    SecretKey::from_slice(&bytes)
        .map_err(|_| ValidationError::InvalidPrivateKey("scalar out of range".to_string()).into())
}

/// Parse a 33-byte compressed public key
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != PUBKEY_COMPRESSED_SIZE_BYTES {
        return Err(ValidationError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            PUBKEY_COMPRESSED_SIZE_BYTES,
            bytes.len()
        ))
        .into());
    }

    PublicKey::from_slice(bytes)
        .map_err(|e| ValidationError::InvalidPublicKey(e.to_string()).into())
}

/// Parse a hex compressed public key, with or without `0x`
pub fn parse_public_key_hex(hex_str: &str) -> Result<PublicKey> {
    let normalized = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(normalized)
        .map_err(|e| ValidationError::InvalidPublicKey(format!("not hex: {}", e)))?;
    parse_public_key(&bytes)
}

/// Key pair
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new key pair
    pub fn generate() -> Self {
        Self::from_secret_key(generate_private_key())
    }

    /// Derive the public half from a secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = secret_key.public_key(&secp);

        Self {
            secret_key,
            public_key,
        }
    }

    /// Create from secret key bytes
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|_| ValidationError::InvalidPrivateKey("scalar out of range".to_string()))?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Create from a hex private key
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Ok(Self::from_secret_key(parse_private_key(hex_str)?))
    }

    /// Get compressed public key bytes
    pub fn pubkey_bytes(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    /// Address derived from the public key
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Lowercase hex private key, no prefix
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.pubkey_bytes()))
            .finish_non_exhaustive()
    }
}
