//! Typed wrappers for the `eth_*` / `web3_*` methods the transfer flow uses.

use alloy_primitives::U256;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::RpcClient;
use crate::error::RpcError;
use crate::models::{decode_data, encode_data, parse_u128, parse_u256, parse_u64, BlockTag};

impl RpcClient {
    /// `web3_clientVersion`
    pub async fn client_version(&self) -> Result<String, RpcError> {
        self.request("web3_clientVersion", json!([])).await
    }

    /// Probes the endpoint with `web3_clientVersion`. Any failure reads as
    /// disconnected.
    pub async fn is_connected(&self) -> bool {
        match self.client_version().await {
            Ok(version) => {
                debug!(%version, endpoint = %self.endpoint(), "connected");
                true
            }
            Err(err) => {
                warn!(error = %err, endpoint = %self.endpoint(), "connectivity check failed");
                false
            }
        }
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: String = self.request("eth_chainId", json!([])).await?;
        parse_u64(&id)
    }

    /// `eth_getBalance`, in wei.
    pub async fn get_balance(&self, address: &str, block: BlockTag) -> Result<U256, RpcError> {
        let balance: String = self
            .request("eth_getBalance", json!([address, block]))
            .await?;
        parse_u256(&balance)
    }

    /// `eth_call` against `to` with raw calldata. Returns the raw return data.
    pub async fn call(&self, to: &str, data: &[u8], block: BlockTag) -> Result<Vec<u8>, RpcError> {
        let result: String = self
            .request(
                "eth_call",
                json!([{ "to": to, "data": encode_data(data) }, block]),
            )
            .await?;
        decode_data(&result)
    }

    /// `eth_getTransactionCount`. With [`BlockTag::Pending`] this is the next
    /// usable nonce.
    pub async fn get_transaction_count(
        &self,
        address: &str,
        block: BlockTag,
    ) -> Result<u64, RpcError> {
        let count: String = self
            .request("eth_getTransactionCount", json!([address, block]))
            .await?;
        parse_u64(&count)
    }

    /// `eth_gasPrice`, in wei.
    pub async fn gas_price(&self) -> Result<u128, RpcError> {
        let price: String = self.request("eth_gasPrice", json!([])).await?;
        parse_u128(&price)
    }

    /// `eth_maxPriorityFeePerGas`, in wei.
    pub async fn max_priority_fee_per_gas(&self) -> Result<u128, RpcError> {
        let fee: String = self.request("eth_maxPriorityFeePerGas", json!([])).await?;
        parse_u128(&fee)
    }

    /// Base fee of the latest block, or `None` on a pre-London chain.
    pub async fn latest_base_fee(&self) -> Result<Option<u128>, RpcError> {
        let block: Value = self
            .request("eth_getBlockByNumber", json!([BlockTag::Latest, false]))
            .await?;

        match block.get("baseFeePerGas") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(fee)) => parse_u128(fee).map(Some),
            Some(other) => Err(RpcError::MalformedResponse(format!(
                "baseFeePerGas is not a quantity: {other}"
            ))),
        }
    }

    /// `eth_sendRawTransaction`. Returns the transaction hash reported by the node.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, RpcError> {
        self.request("eth_sendRawTransaction", json!([encode_data(raw_tx)]))
            .await
    }
}
