//! Transfer settings: built-in defaults, optionally overlaid by a TOML file,
//! then by command-line flags.

use std::path::Path;
use std::time::Duration;

use alloy_primitives::U256;
use anyhow::{bail, Context, Result};
use eth_core::address::validate_address;
use eth_core::units::{parse_units, GWEI_DECIMALS};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, TxType};

/// JMToken on Ropsten.
pub const DEFAULT_CONTRACT: &str = "0xB7E7AeD7a722ccb62cBE1C87b950D5792512589d";
pub const DEFAULT_RECIPIENT: &str = "0x1441cF38f688C15Fb07741E390948CbA3C7B2590";
pub const DEFAULT_AMOUNT: &str = "1";
pub const DEFAULT_CHAIN_ID: u64 = 3;
pub const DEFAULT_GAS_LIMIT: u64 = 100_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transfer settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransferConfig {
    pub contract: String,
    pub recipient: String,
    /// Raw token base units, as a decimal string.
    pub amount: String,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub tx_type: TxType,
    pub gas_price_gwei: Option<String>,
    pub priority_fee_gwei: Option<String>,
    pub timeout_secs: u64,
    pub dry_run: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT.to_string(),
            recipient: DEFAULT_RECIPIENT.to_string(),
            amount: DEFAULT_AMOUNT.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            tx_type: TxType::Legacy,
            gas_price_gwei: None,
            priority_fee_gwei: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dry_run: false,
        }
    }
}

/// How the transaction pays for gas. `None` fields are read from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSettings {
    Legacy {
        gas_price: Option<u128>,
    },
    Eip1559 {
        max_fee: Option<u128>,
        priority_fee: Option<u128>,
    },
}

/// Validated, typed settings the transfer flow runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub contract: String,
    pub recipient: String,
    pub amount: U256,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub fee: FeeSettings,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl TransferConfig {
    /// Loads the config file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("invalid config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies command-line overrides.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(contract) = &cli.contract {
            self.contract = contract.clone();
        }
        if let Some(to) = &cli.to {
            self.recipient = to.clone();
        }
        if let Some(amount) = &cli.amount {
            self.amount = amount.clone();
        }
        if let Some(chain_id) = cli.chain_id {
            self.chain_id = chain_id;
        }
        if let Some(gas_limit) = cli.gas_limit {
            self.gas_limit = gas_limit;
        }
        if let Some(tx_type) = cli.tx_type {
            self.tx_type = tx_type;
        }
        if cli.gas_price_gwei.is_some() {
            self.gas_price_gwei = cli.gas_price_gwei.clone();
        }
        if cli.priority_fee_gwei.is_some() {
            self.priority_fee_gwei = cli.priority_fee_gwei.clone();
        }
        if let Some(timeout_secs) = cli.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self.dry_run |= cli.dry_run;
        self
    }

    /// Validates every field and converts to [`TransferSettings`].
    pub fn resolve(&self) -> Result<TransferSettings> {
        check_address("contract", &self.contract)?;
        check_address("recipient", &self.recipient)?;

        let amount = parse_units(&self.amount, 0)
            .with_context(|| format!("invalid amount `{}`", self.amount))?;

        if self.gas_limit == 0 {
            bail!("gas limit must be non-zero");
        }
        if self.timeout_secs == 0 {
            bail!("timeout must be non-zero");
        }

        let gas_price = self
            .gas_price_gwei
            .as_deref()
            .map(|gwei| gwei_to_wei("gas price", gwei))
            .transpose()?;

        let fee = match self.tx_type {
            TxType::Legacy => {
                if self.priority_fee_gwei.is_some() {
                    bail!("a priority fee only applies to eip1559 transactions");
                }
                FeeSettings::Legacy { gas_price }
            }
            TxType::Eip1559 => {
                let priority_fee = self
                    .priority_fee_gwei
                    .as_deref()
                    .map(|gwei| gwei_to_wei("priority fee", gwei))
                    .transpose()?;
                if let (Some(max), Some(tip)) = (gas_price, priority_fee) {
                    if tip > max {
                        bail!("priority fee exceeds max fee");
                    }
                }
                FeeSettings::Eip1559 {
                    max_fee: gas_price,
                    priority_fee,
                }
            }
        };

        Ok(TransferSettings {
            contract: self.contract.clone(),
            recipient: self.recipient.clone(),
            amount,
            chain_id: self.chain_id,
            gas_limit: self.gas_limit,
            fee,
            timeout: Duration::from_secs(self.timeout_secs),
            dry_run: self.dry_run,
        })
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT.to_string(),
            recipient: DEFAULT_RECIPIENT.to_string(),
            amount: U256::from(1u64),
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            fee: FeeSettings::Legacy { gas_price: None },
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dry_run: false,
        }
    }
}

fn check_address(field: &str, address: &str) -> Result<()> {
    let valid = validate_address(address).with_context(|| format!("invalid {field} address"))?;
    if !valid {
        bail!("{field} address {address} fails its EIP-55 checksum");
    }
    Ok(())
}

fn gwei_to_wei(field: &str, gwei: &str) -> Result<u128> {
    let wei = parse_units(gwei, GWEI_DECIMALS)
        .with_context(|| format!("invalid {field} `{gwei}` gwei"))?;
    if wei.bit_len() > 128 {
        bail!("{field} `{gwei}` gwei is out of range");
    }
    let bytes = wei.to_be_bytes::<32>();
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Ok(u128::from_be_bytes(low))
}
