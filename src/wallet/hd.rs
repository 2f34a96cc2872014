// BIP-39 mnemonics and BIP-32 secp256k1 derivation

use bip39::{Language, Mnemonic};
use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use secp256k1::{Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::{Result, ValidationError};

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;
const SHA512_BLOCK_LEN: usize = 128;
const MIN_WORDS: usize = 12;

/// BIP-44 coin type registered for ZIL
pub const ZIL_COIN_TYPE: u32 = 313;

fn invalid(msg: impl Into<String>) -> ValidationError {
    ValidationError::InvalidMnemonic(msg.into())
}

/// Standard path `m/44'/313'/0'/0/{index}`
pub fn mnemonic_path(index: u32) -> String {
    format!("m/44'/{}'/0'/0/{}", ZIL_COIN_TYPE, index)
}

/// Ledger-compatible path `m/44'/313'/{index}'/0'/0'`
pub fn ledger_path(index: u32) -> String {
    format!("m/44'/{}'/{}'/0'/0'", ZIL_COIN_TYPE, index)
}

/// True for a valid English phrase of at least 12 words
pub fn is_valid_mnemonic(phrase: &str) -> bool {
    parse_mnemonic(phrase).is_ok()
}

fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
    let words = phrase.split_whitespace().count();
    if words < MIN_WORDS {
        return Err(invalid(format!("expected at least {} words, got {}", MIN_WORDS, words)).into());
    }
    Mnemonic::parse_in(Language::English, phrase).map_err(|e| invalid(e.to_string()).into())
}

/// Seed from the phrase with an empty passphrase
fn mnemonic_to_seed(phrase: &str) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}

/// Parse `m/a'/b/...`; `'` or `h` marks a hardened step
fn parse_derivation_path(path: &str) -> Result<Vec<u32>> {
    let path = path.trim();
    let rest = path
        .strip_prefix("m/")
        .ok_or_else(|| invalid(format!("path must start with 'm/': {}", path)))?;

    let mut components = Vec::new();
    for part in rest.split('/') {
        if part.is_empty() {
            continue;
        }

        let (num_str, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
            Some(num) => (num, true),
            None => (part, false),
        };

        let num: u32 = num_str
            .parse()
            .map_err(|_| invalid(format!("invalid path component: {}", part)))?;
        if num >= HARDENED {
            return Err(invalid(format!("path index too large: {}", part)).into());
        }

        components.push(if hardened { num | HARDENED } else { num });
    }

    Ok(components)
}

/// HMAC-SHA512 with a key shorter than one block; HMAC zero-pads such keys
fn hmac_sha512<const N: usize>(key: &[u8; N], parts: &[&[u8]]) -> Zeroizing<[u8; 64]> {
    let mut block = Zeroizing::new([0u8; SHA512_BLOCK_LEN]);
    block[..N].copy_from_slice(key);
    let mut mac = <HmacSha512 as KeyInit>::new(Key::<HmacSha512>::from_slice(&block[..]));
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Derive the private key at `path` from a seed
pub fn derive_from_seed(seed: &[u8], path: &str) -> Result<SecretKey> {
    let components = parse_derivation_path(path)?;
    let secp = Secp256k1::new();

    let master = hmac_sha512(b"Bitcoin seed", &[seed]);
    let mut key = SecretKey::from_slice(&master[..32])
        .map_err(|_| invalid("seed yields an invalid master key"))?;
    let mut chain_code = Zeroizing::new([0u8; 32]);
    chain_code.copy_from_slice(&master[32..]);

    for index in components {
        let index_bytes = index.to_be_bytes();
        let secret = Zeroizing::new(key.secret_bytes());
        let public = key.public_key(&secp).serialize();

        let i = if index & HARDENED != 0 {
            hmac_sha512(&*chain_code, &[&[0x00], &secret[..], &index_bytes])
        } else {
            hmac_sha512(&*chain_code, &[&public, &index_bytes])
        };

        let mut tweak_bytes = Zeroizing::new([0u8; 32]);
        tweak_bytes.copy_from_slice(&i[..32]);
        // IL >= n or a zero child key invalidates this index
        let tweak = Scalar::from_be_bytes(*tweak_bytes)
            .map_err(|_| invalid(format!("index {} yields an invalid key", index)))?;
        key = key
            .add_tweak(&tweak)
            .map_err(|_| invalid(format!("index {} yields an invalid key", index)))?;
        chain_code.copy_from_slice(&i[32..]);
    }

    Ok(key)
}

/// Derive the private key at `path` from a mnemonic phrase
pub fn derive_private_key(phrase: &str, path: &str) -> Result<SecretKey> {
    let seed = mnemonic_to_seed(phrase)?;
    derive_from_seed(&seed[..], path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn derive_hex(path: &str) -> String {
        hex::encode(derive_private_key(PHRASE, path).unwrap().secret_bytes())
    }

    #[test]
    fn test_paths() {
        assert_eq!(mnemonic_path(3), "m/44'/313'/0'/0/3");
        assert_eq!(ledger_path(3), "m/44'/313'/3'/0'/0'");
        assert_eq!(
            parse_derivation_path("m/44'/313'/0'/0/1").unwrap(),
            vec![44 | HARDENED, 313 | HARDENED, HARDENED, 0, 1]
        );
        assert!(parse_derivation_path("44'/0").is_err());
        assert!(parse_derivation_path("m/x").is_err());
        assert!(parse_derivation_path("m/2147483648").is_err());
    }

    #[test]
    fn test_standard_path_vectors() {
        assert_eq!(
            derive_hex(&mnemonic_path(0)),
            "17f08231f4ae546f5d8d65d5dfa456fa999c8af629420d67c9af19161d78667f"
        );
        assert_eq!(
            derive_hex(&mnemonic_path(1)),
            "7e790298f776028caf50f1a3be83f176c8025038659f5932b679ea852521c2b2"
        );

        let kp = KeyPair::from_secret_key(derive_private_key(PHRASE, &mnemonic_path(0)).unwrap());
        assert_eq!(kp.address().to_checksum(), "0x21f0cA38bC8feb3155864763d3f39D4938f34E27");
    }

    #[test]
    fn test_ledger_path_vectors() {
        assert_eq!(
            derive_hex(&ledger_path(0)),
            "7f2648d364520551577a9c2d2d3131eba1337082665f6d219bd4c64324dfcc76"
        );
        assert_eq!(
            derive_hex(&ledger_path(1)),
            "662faa646890b777dc866758e2383b05d4a7a0a162d2bc2f2267acd698546dca"
        );
    }

    #[test]
    fn test_rejects_bad_phrases() {
        assert!(!is_valid_mnemonic("abandon abandon abandon"));
        // right length, bad checksum word
        let bad = "abandon ".repeat(11) + "abandon";
        assert!(!is_valid_mnemonic(&bad));
        assert!(is_valid_mnemonic(PHRASE));

        let err = derive_private_key("hello world", &mnemonic_path(0)).unwrap_err();
        assert!(err.is_validation());
    }
}
