// Accounts held by a wallet

use secp256k1::PublicKey;
use tokio::sync::{Mutex, MutexGuard};

use crate::address::Address;
use crate::crypto::{schnorr, KeyPair, Signature};
use crate::error::{Result, ValidationError};

/// Last nonce this process allocated for an account
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NonceState {
    last: Option<u64>,
}

impl NonceState {
    /// Allocate `max(chain_nonce, last) + 1`; the state is unchanged on overflow
    pub fn allocate(&mut self, chain_nonce: u64) -> Result<u64> {
        let next = chain_nonce
            .max(self.last.unwrap_or(0))
            .checked_add(1)
            .ok_or_else(|| ValidationError::InvalidTransaction("nonce space exhausted".to_string()))?;
        self.last = Some(next);
        Ok(next)
    }

    /// Record a nonce chosen by the caller so later allocations stay above it
    pub fn observe(&mut self, nonce: u64) {
        self.last = Some(self.last.map_or(nonce, |last| last.max(nonce)));
    }

    pub fn last(&self) -> Option<u64> {
        self.last
    }
}

/// A key pair, its address, and the signing lock guarding its nonce
pub struct Account {
    keypair: KeyPair,
    address: Address,
    nonce: Mutex<NonceState>,
}

impl Account {
    pub fn new(keypair: KeyPair) -> Self {
        let address = keypair.address();
        Self {
            keypair,
            address,
            nonce: Mutex::new(NonceState::default()),
        }
    }

    pub fn generate() -> Self {
        Self::new(KeyPair::generate())
    }

    pub fn from_private_key(hex_str: &str) -> Result<Self> {
        Ok(Self::new(KeyPair::from_hex(hex_str)?))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keypair.public_key
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Schnorr-sign arbitrary bytes with this account's key
    pub fn sign_bytes(&self, msg: &[u8]) -> Signature {
        schnorr::sign(msg, &self.keypair.secret_key, &self.keypair.public_key)
    }

    /// Acquire the signing lock; held across balance lookup and nonce assignment
    pub async fn lock_nonce(&self) -> MutexGuard<'_, NonceState> {
        self.nonce.lock().await
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_allocation() {
        let mut state = NonceState::default();
        assert_eq!(state.allocate(5).unwrap(), 6);
        // chain has not caught up yet
        assert_eq!(state.allocate(5).unwrap(), 7);
        // chain moved past the local view
        assert_eq!(state.allocate(10).unwrap(), 11);
        assert_eq!(state.last(), Some(11));
    }

    #[test]
    fn test_observe_explicit_nonce() {
        let mut state = NonceState::default();
        state.observe(20);
        assert_eq!(state.allocate(3).unwrap(), 21);

        // a lower replacement nonce does not move allocation backwards
        state.observe(4);
        assert_eq!(state.allocate(3).unwrap(), 22);
    }

    #[test]
    fn test_allocate_overflow() {
        let mut state = NonceState::default();
        assert!(state.allocate(u64::MAX).is_err());
        assert_eq!(state.last(), None);

        state.observe(u64::MAX);
        assert!(state.allocate(0).is_err());
        assert_eq!(state.last(), Some(u64::MAX));
    }

    #[test]
    fn test_account_address_matches_key() {
        let account = Account::from_private_key(
            "82453a2882829fcc959a07c86b6f36ac613c18f2591390b669a3449e90412e41",
        )
        .unwrap();
        assert_eq!(account.address().to_checksum(), "0xe6854848A9F9C628d9F5A85eDb8e5c505023109F");
        assert!(!format!("{:?}", account).contains("82453a28"));

        let sig = account.sign_bytes(b"payload");
        assert!(schnorr::verify(b"payload", &sig, &account.public_key().serialize()).unwrap());
    }
}
