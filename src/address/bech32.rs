// Bech32 address encoding (HRP "zil")

use ::bech32::{FromBase32, ToBase32, Variant};

use crate::error::{Result, ValidationError};

/// Human-readable part of Zilliqa bech32 addresses
pub const HRP: &str = "zil";

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

fn invalid(msg: impl Into<String>) -> ValidationError {
    ValidationError::InvalidAddress(msg.into())
}

/// Encode a 20-byte address as `zil1...`
pub fn encode_address(address: &[u8; 20]) -> String {
    // "zil" is a valid HRP, so encoding cannot fail
    ::bech32::encode(HRP, address.to_base32(), Variant::Bech32).unwrap_or_default()
}

/// Encode raw bytes as a bech32 address; input must be exactly 20 bytes
pub fn to_bech32(bytes: &[u8]) -> Result<String> {
    let address: &[u8; 20] = bytes
        .try_into()
        .map_err(|_| invalid(format!("expected 20 bytes, got {}", bytes.len())))?;
    Ok(encode_address(address))
}

/// Decode a `zil1...` address into its 20 raw bytes
pub fn from_bech32(text: &str) -> Result<[u8; 20]> {
    let (hrp, words, variant) =
        ::bech32::decode(text).map_err(|e| invalid(format!("invalid bech32: {}", e)))?;

    if variant != Variant::Bech32 {
        return Err(invalid("expected bech32, got bech32m").into());
    }
    if hrp != HRP {
        return Err(invalid(format!("Expected hrp to be {} but got {}", HRP, hrp)).into());
    }

    let bytes = Vec::<u8>::from_base32(&words)
        .map_err(|e| invalid(format!("could not convert 5-bit words to bytes: {}", e)))?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| invalid(format!("expected 20 bytes, got {}", bytes.len())).into())
}

/// Quick shape check: `zil1` followed by 38 charset symbols
pub fn is_bech32(text: &str) -> bool {
    text.len() == 42
        && text.starts_with("zil1")
        && text[4..].bytes().all(|c| CHARSET.contains(&c))
}
