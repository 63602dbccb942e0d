use std::io::Write;

use alloy_primitives::U256;
use anyhow::{bail, Context, Result};
use eth_core::abi::validate_abi;
use eth_core::address::validate_address;
use eth_core::chains::{explorer_tx_url, native_symbol};
use eth_core::erc20::{jmtoken_abi, Erc20Contract, JMTOKEN_ABI};
use eth_core::transaction::{
    build_erc20_transfer, sign_transaction, EthTransaction, Fee, SignedEthTransaction,
};
use eth_core::units::{format_units, ETHER_DECIMALS};
use eth_core::PrivateKey;
use eth_rpc::{BlockTag, RpcClient, TokenClient};
use tracing::{info, warn};

use crate::config::{FeeSettings, TransferSettings};

/// Everything the transfer printed, in order.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub is_connected: bool,
    pub contract_address_valid: bool,
    pub abi_valid: bool,
    pub address: String,
    pub ether_balance: U256,
    pub token_balance: U256,
    pub nonce: u64,
    pub transaction: EthTransaction,
    pub signed: SignedEthTransaction,
    /// Hash returned by the node; `None` on a dry run.
    pub tx_id: Option<String>,
    pub explorer_url: Option<String>,
}

/// Writes `label:value` lines as the flow progresses.
struct Printer<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> Printer<'_, W> {
    fn line(&mut self, label: &str, value: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "{label}:{value}").context("failed to write report")
    }
}

/// Runs the token transfer against `rpc`, signing with the hex `private_key`.
///
/// Each step is awaited in order and the first failure aborts the run. The
/// key is parsed once the node and contract checks have been reported.
/// Nothing is broadcast when `settings.dry_run` is set.
pub async fn run_transfer<W: Write>(
    rpc: &RpcClient,
    private_key: &str,
    settings: &TransferSettings,
    out: &mut W,
) -> Result<TransferReport> {
    let mut printer = Printer { out };

    let is_connected = rpc.is_connected().await;
    printer.line("isConnected", is_connected)?;
    if !is_connected {
        bail!("cannot reach the RPC endpoint at {}", rpc.endpoint());
    }

    let contract_address_valid = validate_address(&settings.contract).unwrap_or(false);
    printer.line("validate_address", contract_address_valid)?;
    let abi_valid = match serde_json::from_str::<serde_json::Value>(JMTOKEN_ABI) {
        Ok(abi) => validate_abi(&abi).is_ok(),
        Err(_) => false,
    };
    printer.line("validate_abi", abi_valid)?;
    if !contract_address_valid || !abi_valid {
        bail!("token contract {} or its ABI is invalid", settings.contract);
    }

    let contract = Erc20Contract::new(&settings.contract, jmtoken_abi()?)
        .context("failed to bind token contract")?;
    let token = TokenClient::new(rpc, &contract);

    check_chain_id(rpc, settings.chain_id).await;
    log_token_metadata(&token).await;

    let key = PrivateKey::from_hex(private_key).context("invalid private key")?;
    let address = key.address().context("failed to derive sender address")?;
    printer.line("address", &address)?;

    let ether_balance = rpc
        .get_balance(&address, BlockTag::Latest)
        .await
        .context("eth_getBalance failed")?;
    printer.line("Ether balance", format_units(ether_balance, ETHER_DECIMALS))?;
    info!(
        balance = %format_units(ether_balance, ETHER_DECIMALS),
        symbol = native_symbol(settings.chain_id),
        "native balance"
    );

    let token_balance = token
        .balance_of(&address)
        .await
        .context("balanceOf call failed")?;
    printer.line("JMToken balance", format_units(token_balance, ETHER_DECIMALS))?;

    let nonce = rpc
        .get_transaction_count(&address, BlockTag::Pending)
        .await
        .context("eth_getTransactionCount failed")?;
    printer.line("nonce", nonce)?;

    let fee = resolve_fee(rpc, settings.fee).await?;
    let transaction = build_erc20_transfer(
        settings.chain_id,
        nonce,
        &contract,
        &settings.recipient,
        settings.amount,
        fee,
        settings.gas_limit,
    )
    .context("failed to build transfer")?;
    printer.line("tx", &transaction)?;

    let signed = sign_transaction(&transaction, &key).context("failed to sign transfer")?;
    printer.line("signed_tx", &signed)?;

    if settings.dry_run {
        info!(tx_hash = %signed.tx_hash, "dry run, transaction not broadcast");
        return Ok(TransferReport {
            is_connected,
            contract_address_valid,
            abi_valid,
            address,
            ether_balance,
            token_balance,
            nonce,
            transaction,
            signed,
            tx_id: None,
            explorer_url: None,
        });
    }

    let tx_id = rpc
        .send_raw_transaction(&signed.raw_tx)
        .await
        .context("eth_sendRawTransaction failed")?;
    printer.line("tx_id", &tx_id)?;
    if !tx_id.eq_ignore_ascii_case(&signed.tx_hash) {
        warn!(node = %tx_id, local = %signed.tx_hash, "node returned a different transaction hash");
    }

    let explorer_url = explorer_tx_url(settings.chain_id, &tx_id);
    if let Some(url) = &explorer_url {
        printer.line("explorer", url)?;
    }
    info!(tx_id = %tx_id, to = %settings.recipient, amount = %settings.amount, "transfer broadcast");

    Ok(TransferReport {
        is_connected,
        contract_address_valid,
        abi_valid,
        address,
        ether_balance,
        token_balance,
        nonce,
        transaction,
        signed,
        tx_id: Some(tx_id),
        explorer_url,
    })
}

/// Fills in fee fields the settings leave to the node.
async fn resolve_fee(rpc: &RpcClient, settings: FeeSettings) -> Result<Fee> {
    match settings {
        FeeSettings::Legacy { gas_price } => {
            let gas_price = match gas_price {
                Some(price) => price,
                None => rpc.gas_price().await.context("eth_gasPrice failed")?,
            };
            Ok(Fee::Legacy { gas_price })
        }
        FeeSettings::Eip1559 {
            max_fee,
            priority_fee,
        } => {
            let max_priority_fee_per_gas = match priority_fee {
                Some(fee) => fee,
                None => rpc
                    .max_priority_fee_per_gas()
                    .await
                    .context("eth_maxPriorityFeePerGas failed")?,
            };
            let max_fee_per_gas = match max_fee {
                Some(fee) => fee,
                None => {
                    let base_fee = rpc
                        .latest_base_fee()
                        .await
                        .context("eth_getBlockByNumber failed")?
                        .context("the node's latest block has no base fee; use --tx-type legacy")?;
                    base_fee
                        .saturating_mul(2)
                        .saturating_add(max_priority_fee_per_gas)
                }
            };
            Ok(Fee::Eip1559 {
                max_priority_fee_per_gas,
                max_fee_per_gas,
            })
        }
    }
}

async fn check_chain_id(rpc: &RpcClient, expected: u64) {
    match rpc.chain_id().await {
        Ok(actual) if actual == expected => {}
        Ok(actual) => warn!(
            expected,
            actual, "node reports a different chain id; the transaction will be rejected"
        ),
        Err(err) => warn!(error = %err, "could not read chain id"),
    }
}

async fn log_token_metadata(token: &TokenClient<'_>) {
    let name = token.name().await;
    let symbol = token.symbol().await;
    let decimals = token.decimals().await;
    match (name, symbol, decimals) {
        (Ok(name), Ok(symbol), Ok(decimals)) => {
            info!(%name, %symbol, decimals, contract = token.contract().address(), "token")
        }
        _ => warn!(contract = token.contract().address(), "token metadata unavailable"),
    }
}
