// Wallet, accounts and signing

mod account;
mod keystore;
mod signer;
pub mod hd;

pub use account::{Account, NonceState};
pub use keystore::{KeystoreDecryptor, Wallet};
pub use signer::{SignMode, Signer};
