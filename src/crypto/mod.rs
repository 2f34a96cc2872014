// Keys, hashing and Schnorr signatures

mod hash;
mod drbg;
mod keys;
pub mod schnorr;

pub use hash::{sha256, hash160};
pub use drbg::HmacDrbg;
pub use keys::{
    KeyPair, generate_private_key, parse_private_key, parse_public_key, parse_public_key_hex,
    PRIVKEY_SIZE_BYTES, PUBKEY_COMPRESSED_SIZE_BYTES,
};
pub use schnorr::{Signature, sign, verify};
