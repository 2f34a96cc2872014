// Schnorr signatures over secp256k1
//
// r = SHA256(compress(k*G) || pubkey || msg) mod n
// s = k - r*priv mod n
// verify: Q = s*G + r*P, accept iff H(Q || pubkey || msg) mod n == r

use crate::crypto::drbg::HmacDrbg;
use crate::crypto::hash::sha256;
use crate::crypto::keys::{parse_public_key, PUBKEY_COMPRESSED_SIZE_BYTES};
use crate::error::{Result, ValidationError};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::constants::CURVE_ORDER;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use std::fmt;

/// Personalization string used for HMAC-DRBG instantiation
pub const ALG: &[u8; 16] = b"Schnorr+SHA256  ";

/// Length in bytes of entropy inputs to HMAC-DRBG
pub const ENT_LEN: usize = 32;

/// Schnorr signature (r, s), each a 32-byte big-endian scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Self { r, s }
    }

    /// 64 bytes: r || s
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(ValidationError::InvalidSignature(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            ))
            .into());
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self { r, s })
    }

    /// 128 lowercase hex characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let normalized = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(normalized)
            .map_err(|e| ValidationError::InvalidSignature(format!("not hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Reduce a 256-bit big-endian integer modulo the curve order.
///
/// Any 256-bit value is below 2n, so at most one subtraction is needed.
fn reduce_mod_n(value: [u8; 32]) -> [u8; 32] {
    if Scalar::from_be_bytes(value).is_ok() {
        return value;
    }

    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = value[i] as i16 - CURVE_ORDER[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    out
}

/// Challenge r = SHA256(Q || pubkey || msg) mod n
fn challenge(q_compressed: &[u8; 33], pubkey: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(PUBKEY_COMPRESSED_SIZE_BYTES * 2 + msg.len());
    buf.extend_from_slice(q_compressed);
    buf.extend_from_slice(pubkey);
    buf.extend_from_slice(msg);
    reduce_mod_n(sha256(&buf))
}

fn is_zero(bytes: &[u8; 32]) -> bool {
    bytes.iter().all(|&b| b == 0)
}

/// Seed a DRBG for one signature: fresh entropy, the message as nonce,
/// fresh entropy || ALG as personalization.
fn signing_drbg(msg: &[u8]) -> HmacDrbg {
    let mut entropy = [0u8; ENT_LEN];
    OsRng.fill_bytes(&mut entropy);

    let mut pers = [0u8; ENT_LEN + 16];
    OsRng.fill_bytes(&mut pers[..ENT_LEN]);
    pers[ENT_LEN..].copy_from_slice(ALG);

    HmacDrbg::new(&entropy, msg, &pers)
}

/// Sign `msg`. Retries internally until a usable nonce is drawn.
pub fn sign(msg: &[u8], secret_key: &SecretKey, public_key: &PublicKey) -> Signature {
    let mut drbg = signing_drbg(msg);
    let pubkey = public_key.serialize();

    loop {
        let k = drbg.generate_32();
        if let Some(sig) = try_sign(msg, &k, secret_key, &pubkey) {
            return sig;
        }
        log::debug!("Schnorr nonce rejected, drawing again");
    }
}

/// One signing attempt with an explicit nonce `k`.
///
/// Returns `None` when k is outside [1, n-1] or when r or s comes out zero.
pub fn try_sign(msg: &[u8], k: &[u8; 32], secret_key: &SecretKey, pubkey: &[u8]) -> Option<Signature> {
    let secp = Secp256k1::new();

    // k must be a valid non-zero scalar
    let k_key = SecretKey::from_slice(k).ok()?;

    // Commitment Q = kG
    let q = k_key.public_key(&secp).serialize();

    let r = challenge(&q, pubkey, msg);
    if is_zero(&r) {
        return None;
    }
    let r_scalar = Scalar::from_be_bytes(r).ok()?;

    // s = k - r * priv mod n
    let r_priv = secret_key.mul_tweak(&r_scalar).ok()?;
    let s_key = k_key.add_tweak(&Scalar::from(r_priv.negate())).ok()?;

    Some(Signature {
        r,
        s: s_key.secret_bytes(),
    })
}

/// Verify a signature against a compressed public key.
///
/// Out-of-range (r, s) and undecodable keys are errors; a well-formed
/// signature that does not match returns `Ok(false)`.
pub fn verify(msg: &[u8], signature: &Signature, pubkey: &[u8]) -> Result<bool> {
    let secp = Secp256k1::new();

    // r and s must lie in [1, n-1]
    let r_key = SecretKey::from_slice(&signature.r)
        .map_err(|_| ValidationError::InvalidSignature("r out of range".to_string()))?;
    let s_key = SecretKey::from_slice(&signature.s)
        .map_err(|_| ValidationError::InvalidSignature("s out of range".to_string()))?;

    let public_key = parse_public_key(pubkey)?;

    // Q = sG + rP
    let s_g = s_key.public_key(&secp);
    let r_p = public_key
        .mul_tweak(&secp, &Scalar::from(r_key))
        .map_err(|e| ValidationError::InvalidSignature(e.to_string()))?;
    let q = s_g
        .combine(&r_p)
        .map_err(|_| ValidationError::InvalidSignature("intermediate point at infinity".to_string()))?;

    let r1 = challenge(&q.serialize(), pubkey, msg);
    if is_zero(&r1) {
        return Err(ValidationError::InvalidSignature("invalid hash".to_string()).into());
    }

    Ok(r1 == signature.r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    fn scalar(last: u8) -> [u8; 32] {
        let mut b = [0u8; 32];
        b[31] = last;
        b
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        for _ in 0..8 {
            let kp = KeyPair::generate();
            let msg = b"transfer 100 ZIL";
            let sig = sign(msg, &kp.secret_key, &kp.public_key);
            assert!(verify(msg, &sig, &kp.pubkey_bytes()).unwrap());
        }
    }

    #[test]
    fn test_signature_components_in_range() {
        let kp = KeyPair::generate();
        for i in 0..16u8 {
            let sig = sign(&[i; 40], &kp.secret_key, &kp.public_key);
            assert!(SecretKey::from_slice(&sig.r).is_ok());
            assert!(SecretKey::from_slice(&sig.s).is_ok());
        }
    }

    #[test]
    fn test_signing_is_randomized() {
        let kp = KeyPair::generate();
        let msg = b"same message";
        let a = sign(msg, &kp.secret_key, &kp.public_key);
        let b = sign(msg, &kp.secret_key, &kp.public_key);
        assert_ne!(a, b);
        assert!(verify(msg, &a, &kp.pubkey_bytes()).unwrap());
        assert!(verify(msg, &b, &kp.pubkey_bytes()).unwrap());
    }

    #[test]
    fn test_try_sign_is_deterministic_for_fixed_k() {
        let kp = KeyPair::generate();
        let k = [0x42u8; 32];
        let a = try_sign(b"msg", &k, &kp.secret_key, &kp.pubkey_bytes()).unwrap();
        let b = try_sign(b"msg", &k, &kp.secret_key, &kp.pubkey_bytes()).unwrap();
        assert_eq!(a, b);
        assert!(verify(b"msg", &a, &kp.pubkey_bytes()).unwrap());
    }

    #[test]
    fn test_try_sign_rejects_bad_nonce() {
        let kp = KeyPair::generate();
        let pk = kp.pubkey_bytes();
        assert!(try_sign(b"msg", &[0u8; 32], &kp.secret_key, &pk).is_none());
        assert!(try_sign(b"msg", &CURVE_ORDER, &kp.secret_key, &pk).is_none());
        assert!(try_sign(b"msg", &[0xff; 32], &kp.secret_key, &pk).is_none());
    }

    #[test]
    fn test_message_tamper_detected() {
        let kp = KeyPair::generate();
        let msg = b"pay alice 10".to_vec();
        let sig = sign(&msg, &kp.secret_key, &kp.public_key);

        for i in 0..msg.len() {
            let mut tampered = msg.clone();
            tampered[i] ^= 0x01;
            assert!(!verify(&tampered, &sig, &kp.pubkey_bytes()).unwrap());
        }
    }

    #[test]
    fn test_signature_tamper_detected() {
        let kp = KeyPair::generate();
        let msg = b"pay bob 20";
        let sig = sign(msg, &kp.secret_key, &kp.public_key);
        let bytes = sig.to_bytes();

        for i in 0..64 {
            let mut tampered = bytes;
            tampered[i] ^= 0x80;
            let tampered = Signature::from_bytes(&tampered).unwrap();
            // flipping a high bit may push r or s out of range, which errors
            match verify(msg, &tampered, &kp.pubkey_bytes()) {
                Ok(valid) => assert!(!valid),
                Err(e) => assert!(e.is_validation()),
            }
        }
    }

    #[test]
    fn test_wrong_key_returns_false() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let sig = sign(b"hello", &kp.secret_key, &kp.public_key);
        assert!(!verify(b"hello", &sig, &other.pubkey_bytes()).unwrap());
    }

    #[test]
    fn test_verify_rejects_out_of_range() {
        let kp = KeyPair::generate();
        let pk = kp.pubkey_bytes();
        let good = sign(b"m", &kp.secret_key, &kp.public_key);

        let zero_r = Signature::new([0u8; 32], good.s);
        assert!(verify(b"m", &zero_r, &pk).is_err());

        let zero_s = Signature::new(good.r, [0u8; 32]);
        assert!(verify(b"m", &zero_s, &pk).is_err());

        let big_r = Signature::new(CURVE_ORDER, good.s);
        assert!(verify(b"m", &big_r, &pk).is_err());

        let big_s = Signature::new(good.r, [0xff; 32]);
        assert!(verify(b"m", &big_s, &pk).is_err());
    }

    #[test]
    fn test_verify_rejects_invalid_public_key() {
        let kp = KeyPair::generate();
        let sig = sign(b"m", &kp.secret_key, &kp.public_key);

        let err = verify(b"m", &sig, &[0x05; 33]).unwrap_err();
        assert!(err.is_validation());
        assert!(verify(b"m", &sig, &kp.pubkey_bytes()[..32]).is_err());
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = Signature::new(scalar(1), scalar(2));
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 128);
        assert_eq!(Signature::from_hex(&hex).unwrap(), sig);
        assert!(Signature::from_hex("abcd").is_err());
    }

    #[test]
    fn test_reduce_mod_n() {
        // n reduces to zero, n + 1 to one, values below n are unchanged
        assert_eq!(reduce_mod_n(CURVE_ORDER), [0u8; 32]);

        let mut n_plus_one = CURVE_ORDER;
        n_plus_one[31] += 1;
        assert_eq!(reduce_mod_n(n_plus_one), scalar(1));

        assert_eq!(reduce_mod_n(scalar(9)), scalar(9));

        let max = reduce_mod_n([0xff; 32]);
        assert_eq!(
            hex::encode(max),
            "000000000000000000000000000000014551231950b75fc4402da1732fc9bebe"
        );
    }
}
