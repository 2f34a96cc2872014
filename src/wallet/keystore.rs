// Wallet: accounts, default account, nonce allocation and signing

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::account::Account;
use super::hd;
use super::signer::{SignMode, Signer};
use crate::address::Address;
use crate::core::Transaction;
use crate::crypto::KeyPair;
use crate::error::{Error, Result, ValidationError};
use crate::network::Provider;

/// Decrypts an encrypted keystore blob into a raw private key
#[async_trait]
pub trait KeystoreDecryptor: Send + Sync {
    async fn decrypt(&self, keystore: &str, passphrase: &str) -> Result<[u8; 32]>;
}

/// Funds check shared by single and batch signing; `None` debt means overflow
fn check_funds(debt: Option<u128>, have: u128) -> Result<()> {
    match debt {
        Some(need) if need <= have => Ok(()),
        Some(need) => Err(Error::InsufficientFunds { need, have }),
        None => Err(Error::InsufficientFunds { need: u128::MAX, have }),
    }
}

fn reject_signed(tx: &Transaction) -> Result<()> {
    if tx.signature.is_some() {
        return Err(ValidationError::InvalidTransaction("transaction is already signed".to_string()).into());
    }
    Ok(())
}

/// Wallet - owns accounts and signs on their behalf
pub struct Wallet {
    accounts: HashMap<Address, Account>,
    default_account: Option<Address>,
    provider: Arc<dyn Provider>,
}

impl Wallet {
    /// Create an empty wallet
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            accounts: HashMap::new(),
            default_account: None,
            provider,
        }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    fn insert(&mut self, account: Account) -> Address {
        let address = account.address();

        // Same key, same account: keep the existing entry and its nonce state
        if !self.accounts.contains_key(&address) {
            log::info!("Added account {}", address);
            self.accounts.insert(address, account);
        }

        // Set as default if first address
        if self.default_account.is_none() {
            self.default_account = Some(address);
        }

        address
    }

    /// Generate a new account
    pub fn create(&mut self) -> Address {
        self.insert(Account::generate())
    }

    pub fn add_by_private_key(&mut self, hex_str: &str) -> Result<Address> {
        Ok(self.insert(Account::from_private_key(hex_str)?))
    }

    /// Import an encrypted keystore through an external decryptor
    pub async fn add_by_keystore(
        &mut self,
        decryptor: &dyn KeystoreDecryptor,
        keystore: &str,
        passphrase: &str,
    ) -> Result<Address> {
        let secret = Zeroizing::new(decryptor.decrypt(keystore, passphrase).await?);
        let keypair = KeyPair::from_secret_bytes(&secret)?;
        Ok(self.insert(Account::new(keypair)))
    }

    /// Import the key at `m/44'/313'/0'/0/{index}`
    pub fn add_by_mnemonic(&mut self, phrase: &str, index: u32) -> Result<Address> {
        let secret_key = hd::derive_private_key(phrase, &hd::mnemonic_path(index))?;
        Ok(self.insert(Account::new(KeyPair::from_secret_key(secret_key))))
    }

    /// Import the key at the Ledger path `m/44'/313'/{index}'/0'/0'`
    pub fn add_by_mnemonic_ledger(&mut self, phrase: &str, index: u32) -> Result<Address> {
        let secret_key = hd::derive_private_key(phrase, &hd::ledger_path(index))?;
        Ok(self.insert(Account::new(KeyPair::from_secret_key(secret_key))))
    }

    /// Remove an account; removing the default clears the default
    pub fn remove(&mut self, address: &Address) -> bool {
        let removed = self.accounts.remove(address).is_some();
        if removed && self.default_account.as_ref() == Some(address) {
            self.default_account = None;
        }
        removed
    }

    pub fn set_default(&mut self, address: &Address) -> Result<()> {
        if !self.accounts.contains_key(address) {
            return Err(Error::UnknownSigner(*address));
        }
        self.default_account = Some(*address);
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.keys().copied().collect()
    }

    pub fn default_account(&self) -> Option<&Account> {
        self.default_account.as_ref().and_then(|a| self.accounts.get(a))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sign with a specific account.
    ///
    /// A missing nonce is allocated from the node's view under the account's
    /// signing lock (one `GetBalance` call); offline mode requires the nonce.
    pub async fn sign_with(&self, mut tx: Transaction, address: &Address, mode: SignMode) -> Result<Transaction> {
        reject_signed(&tx)?;
        let account = self.accounts.get(address).ok_or(Error::UnknownSigner(*address))?;

        if tx.nonce.is_none() && mode == SignMode::Offline {
            return Err(Error::NonceRequiredOffline);
        }

        let mut nonce_state = account.lock_nonce().await;
        let nonce = match tx.nonce {
            Some(nonce) => {
                nonce_state.observe(nonce);
                nonce
            }
            None => {
                let balance = self.provider.get_balance(address).await?;
                check_funds(tx.debt(), balance.balance_qa()?)?;
                nonce_state.allocate(balance.nonce)?
            }
        };

        tx.nonce = Some(nonce);
        tx.pub_key = Some(*account.public_key());
        tx.signature = Some(account.sign_bytes(&tx.bytes()));
        drop(nonce_state);

        log::debug!("Signed transaction from {} with nonce {}", address, nonce);
        Ok(tx)
    }

    /// Sign several transactions with the default account.
    ///
    /// One `GetBalance` call covers the batch; nonces are assigned
    /// consecutively in input order, replacing any nonce or key the caller set.
    pub async fn sign_batch(&self, txs: Vec<Transaction>) -> Result<Vec<Transaction>> {
        let address = self.default_account.ok_or(Error::NoDefaultAccount)?;
        let account = self.accounts.get(&address).ok_or(Error::UnknownSigner(address))?;

        if txs.is_empty() {
            return Ok(txs);
        }
        for tx in &txs {
            reject_signed(tx)?;
        }

        let total = txs
            .iter()
            .try_fold(0u128, |acc, tx| tx.debt().and_then(|d| acc.checked_add(d)));

        let mut nonce_state = account.lock_nonce().await;
        let balance = self.provider.get_balance(&address).await?;
        check_funds(total, balance.balance_qa()?)?;

        // all or nothing: a failed allocation leaves the nonce state untouched
        let start = *nonce_state;
        let mut nonces = Vec::with_capacity(txs.len());
        for _ in 0..txs.len() {
            match nonce_state.allocate(balance.nonce) {
                Ok(nonce) => nonces.push(nonce),
                Err(e) => {
                    *nonce_state = start;
                    return Err(e);
                }
            }
        }

        let mut signed = Vec::with_capacity(txs.len());
        for (mut tx, nonce) in txs.into_iter().zip(nonces) {
            tx.nonce = Some(nonce);
            tx.pub_key = Some(*account.public_key());
            tx.signature = Some(account.sign_bytes(&tx.bytes()));
            signed.push(tx);
        }
        drop(nonce_state);

        log::debug!("Signed batch of {} transactions from {}", signed.len(), address);
        Ok(signed)
    }
}

#[async_trait]
impl Signer for Wallet {
    /// Signs with the account matching the transaction's sender key, or the
    /// default account when no key is set.
    async fn sign(&self, tx: Transaction, mode: SignMode) -> Result<Transaction> {
        let address = match &tx.pub_key {
            Some(key) => {
                let sender = Address::from_public_key(key);
                if !self.accounts.contains_key(&sender) {
                    return Err(Error::UnknownSigner(sender));
                }
                sender
            }
            None => self.default_account.ok_or(Error::NoDefaultAccount)?,
        };
        self.sign_with(tx, &address, mode).await
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("accounts", &self.accounts.keys().collect::<Vec<_>>())
            .field("default_account", &self.default_account)
            .finish_non_exhaustive()
    }
}
