// CLI commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::address::Address;
use crate::chain::ChainClient;
use crate::config::Config;
use crate::core::Transaction;
use crate::crypto::KeyPair;
use crate::error::Result;
use crate::network::{HttpProvider, Provider};
use crate::wallet::{hd, SignMode, Wallet};

/// Minimum gas price accepted by the network, in Qa
pub const DEFAULT_GAS_PRICE: u128 = 2_000_000_000;
/// Gas limit of a plain transfer
pub const DEFAULT_GAS_LIMIT: u64 = 50;

#[derive(Parser)]
#[command(name = "zil-core")]
#[command(about = "Zilliqa keys, addresses and transactions", long_about = None)]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new key pair
    Keygen,

    /// Show an address in checksummed hex and bech32 form
    Address {
        /// Address in either form
        address: String,
    },

    /// Derive an account from a mnemonic phrase
    Mnemonic {
        /// Space-separated BIP-39 words
        phrase: String,
        #[arg(long, default_value_t = 0)]
        index: u32,
        /// Use the Ledger derivation path
        #[arg(long)]
        ledger: bool,
    },

    /// Get balance and nonce for an address
    Balance {
        address: String,
    },

    /// Send ZIL
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in Qa
        #[arg(long)]
        amount: u128,
        /// Gas price in Qa
        #[arg(long, default_value_t = DEFAULT_GAS_PRICE)]
        gas_price: u128,
        #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
        gas_limit: u64,
        /// Explicit nonce; fetched from the node when omitted
        #[arg(long)]
        nonce: Option<u64>,
        /// Return after broadcast without polling for a receipt
        #[arg(long)]
        no_confirm: bool,
        /// Sender private key (hex)
        #[arg(long, env = "ZIL_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },

    /// Look up a transaction's status
    Status {
        tx_id: String,
    },
}

/// CLI handler
pub struct CliHandler {
    config: Config,
    provider: Arc<dyn Provider>,
}

impl CliHandler {
    /// Load config (file, then environment) and connect to the node
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Config::load(path)?
            }
            None => Config::default(),
        };
        config.apply_env()?;

        let provider: Arc<dyn Provider> = Arc::new(HttpProvider::new(config.rpc_url.clone())?);
        Ok(Self { config, provider })
    }

    /// Handle CLI command
    pub async fn handle(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Keygen => {
                let kp = KeyPair::generate();
                let address = kp.address();
                println!("Private key: {}", kp.secret_hex());
                println!("Public key:  {}", hex::encode(kp.pubkey_bytes()));
                println!("Address:     {}", address);
                println!("Bech32:      {}", address.to_bech32());
                Ok(())
            }
            Commands::Address { address } => {
                let address: Address = address.parse()?;
                println!("Checksummed: {}", address);
                println!("Bech32:      {}", address.to_bech32());
                Ok(())
            }
            Commands::Mnemonic { phrase, index, ledger } => {
                let path = if ledger { hd::ledger_path(index) } else { hd::mnemonic_path(index) };
                let kp = KeyPair::from_secret_key(hd::derive_private_key(&phrase, &path)?);
                let address = kp.address();
                println!("Path:       {}", path);
                println!("Public key: {}", hex::encode(kp.pubkey_bytes()));
                println!("Address:    {}", address);
                println!("Bech32:     {}", address.to_bech32());
                Ok(())
            }
            Commands::Balance { address } => {
                let address: Address = address.parse()?;
                let balance = self.provider.get_balance(&address).await?;
                println!("Balance for {}:", address);
                println!("  {} Qa", balance.balance_qa()?);
                println!("  nonce {}", balance.nonce);
                Ok(())
            }
            Commands::Transfer {
                to,
                amount,
                gas_price,
                gas_limit,
                nonce,
                no_confirm,
                private_key,
            } => {
                let mut wallet = Wallet::new(self.provider.clone());
                let from = wallet.add_by_private_key(&private_key)?;

                let mut builder = Transaction::builder(to.parse()?)
                    .version(self.config.version())
                    .amount(amount)
                    .gas_price(gas_price)
                    .gas_limit(gas_limit);
                if let Some(nonce) = nonce {
                    builder = builder.nonce(nonce);
                }

                let tx = wallet.sign_with(builder.build()?, &from, SignMode::Online).await?;
                let client = ChainClient::new(self.provider.clone());

                let tx = if no_confirm {
                    client.create_transaction_without_confirm(tx).await?
                } else {
                    client.create_transaction(tx, &self.config.confirm_options()).await?
                };

                println!("Transaction: {}", tx.id.as_deref().unwrap_or("-"));
                println!("  status: {}", tx.status);
                if let Some(receipt) = &tx.receipt {
                    println!("  epoch:  {}", receipt.epoch_num);
                    println!("  gas:    {}", receipt.cumulative_gas);
                }
                Ok(())
            }
            Commands::Status { tx_id } => {
                let client = ChainClient::new(self.provider.clone());
                let status = client.get_transaction_status(&tx_id).await?;
                println!("Transaction {}: {}", status.id, status.message);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer() {
        let cli = Cli::try_parse_from([
            "zil-core",
            "transfer",
            "--to",
            "zil1r5verznnwvrzrz6uhveyrlxuhkvccwnju4aehf",
            "--amount",
            "1000",
            "--private-key",
            "01",
        ])
        .unwrap();

        match cli.command {
            Commands::Transfer { amount, gas_price, gas_limit, nonce, no_confirm, .. } => {
                assert_eq!(amount, 1000);
                assert_eq!(gas_price, DEFAULT_GAS_PRICE);
                assert_eq!(gas_limit, DEFAULT_GAS_LIMIT);
                assert!(nonce.is_none());
                assert!(!no_confirm);
            }
            _ => panic!("expected transfer"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["zil-core", "mnemonic", "a b c", "--ledger", "--config", "c.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Mnemonic { ledger: true, index: 0, .. }));
    }
}
