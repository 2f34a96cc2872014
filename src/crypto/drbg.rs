// HMAC-DRBG (NIST SP 800-90A) over SHA256

use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const OUTLEN: usize = 32;
const SHA256_BLOCK_LEN: usize = 64;

/// Deterministic random bit generator used to draw signing nonces and
/// private keys.
pub struct HmacDrbg {
    k: [u8; OUTLEN],
    v: [u8; OUTLEN],
    reseed_counter: u64,
}

impl HmacDrbg {
    /// Instantiate from entropy, nonce and personalization string
    pub fn new(entropy: &[u8], nonce: &[u8], pers: &[u8]) -> Self {
        let mut drbg = Self {
            k: [0x00; OUTLEN],
            v: [0x01; OUTLEN],
            reseed_counter: 1,
        };

        let mut seed = Vec::with_capacity(entropy.len() + nonce.len() + pers.len());
        seed.extend_from_slice(entropy);
        seed.extend_from_slice(nonce);
        seed.extend_from_slice(pers);
        drbg.update(Some(&seed));

        drbg
    }

    /// HMAC-SHA256 keyed by `K`; HMAC zero-pads keys shorter than a block
    fn hmac(key: &[u8; OUTLEN], parts: &[&[u8]]) -> [u8; OUTLEN] {
        let mut block = [0u8; SHA256_BLOCK_LEN];
        block[..OUTLEN].copy_from_slice(key);
        let mut mac = <HmacSha256 as KeyInit>::new(Key::<HmacSha256>::from_slice(&block));
        for part in parts {
            mac.update(part);
        }
        let mut out = [0u8; OUTLEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    fn update(&mut self, seed: Option<&[u8]>) {
        let seed_bytes = seed.unwrap_or(&[]);
        self.k = Self::hmac(&self.k, &[&self.v, &[0x00], seed_bytes]);
        self.v = Self::hmac(&self.k, &[&self.v]);

        if seed.is_none() {
            return;
        }

        self.k = Self::hmac(&self.k, &[&self.v, &[0x01], seed_bytes]);
        self.v = Self::hmac(&self.k, &[&self.v]);
    }

    /// Generate `len` pseudo-random bytes
    pub fn generate(&mut self, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len + OUTLEN);
        while out.len() < len {
            self.v = Self::hmac(&self.k, &[&self.v]);
            out.extend_from_slice(&self.v);
        }
        out.truncate(len);

        self.update(None);
        self.reseed_counter += 1;
        out
    }

    /// Generate exactly 32 bytes (one scalar candidate)
    pub fn generate_32(&mut self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.generate(32));
        out
    }

    pub fn reseed_counter(&self) -> u64 {
        self.reseed_counter
    }
}
