use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Command-line arguments for token-transfer
#[derive(Parser, Clone)]
#[command(
    name = "token-transfer",
    version,
    about = "Send an ERC-20 token transfer through an Ethereum JSON-RPC node",
    long_about = "Connects to an Ethereum JSON-RPC endpoint, prints the sender's ether and token balances, then builds, signs and broadcasts an ERC-20 transfer. The private key never leaves this process."
)]
pub struct Cli {
    /// HTTP(S) URL of the Ethereum JSON-RPC endpoint
    pub provider_endpoint_uri: String,

    /// Hex-encoded private key of the sending account (0x prefix optional)
    pub private_key: String,

    /// TOML file with transfer settings
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Token contract address
    #[arg(long = "contract", value_name = "ADDRESS")]
    pub contract: Option<String>,

    /// Recipient of the tokens
    #[arg(long = "to", value_name = "ADDRESS")]
    pub to: Option<String>,

    /// Amount in raw token base units
    #[arg(long = "amount", value_name = "AMOUNT")]
    pub amount: Option<String>,

    /// Chain ID used for replay protection
    #[arg(long = "chain-id", value_name = "ID")]
    pub chain_id: Option<u64>,

    /// Gas limit of the transfer
    #[arg(long = "gas-limit", value_name = "GAS")]
    pub gas_limit: Option<u64>,

    /// Fixed gas price (legacy) or max fee (EIP-1559) in gwei
    #[arg(long = "gas-price-gwei", value_name = "GWEI")]
    pub gas_price_gwei: Option<String>,

    /// Transaction envelope to sign
    #[arg(long = "tx-type", value_enum)]
    pub tx_type: Option<TxType>,

    /// Fixed EIP-1559 priority fee in gwei
    #[arg(long = "priority-fee-gwei", value_name = "GWEI")]
    pub priority_fee_gwei: Option<String>,

    /// Per-request RPC timeout
    #[arg(long = "timeout-secs", value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Sign and print the transaction without broadcasting it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Log verbosity when RUST_LOG is unset
    #[arg(long = "log-level", value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Transaction envelope
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    /// Pre-London transaction signed under EIP-155
    #[default]
    Legacy,
    /// Type-2 transaction with base and priority fees
    Eip1559,
}

/// Log level enumeration
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl LogLevel {
    /// `EnvFilter` directives: the chosen level for this workspace's crates,
    /// `warn` for everything else.
    pub fn filter_directives(self) -> String {
        let level = tracing::Level::from(self).as_str().to_lowercase();
        format!("warn,token_transfer={level},eth_rpc={level},eth_core={level}")
    }
}
