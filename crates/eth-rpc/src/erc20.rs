use alloy_primitives::U256;
use eth_core::erc20::Erc20Contract;

use crate::client::RpcClient;
use crate::error::RpcError;
use crate::models::BlockTag;

/// Read-only ERC-20 queries against a live node.
pub struct TokenClient<'a> {
    rpc: &'a RpcClient,
    contract: &'a Erc20Contract,
}

impl<'a> TokenClient<'a> {
    pub fn new(rpc: &'a RpcClient, contract: &'a Erc20Contract) -> Self {
        Self { rpc, contract }
    }

    pub fn contract(&self) -> &Erc20Contract {
        self.contract
    }

    /// `balanceOf(owner)` at the latest block, in token base units.
    pub async fn balance_of(&self, owner: &str) -> Result<U256, RpcError> {
        let data = self.contract.encode_balance_of(owner)?;
        let output = self.call(&data).await?;
        Ok(self.contract.decode_uint("balanceOf", &output)?)
    }

    pub async fn name(&self) -> Result<String, RpcError> {
        let output = self.call_no_args("name").await?;
        Ok(self.contract.decode_string("name", &output)?)
    }

    pub async fn symbol(&self) -> Result<String, RpcError> {
        let output = self.call_no_args("symbol").await?;
        Ok(self.contract.decode_string("symbol", &output)?)
    }

    pub async fn decimals(&self) -> Result<u8, RpcError> {
        let output = self.call_no_args("decimals").await?;
        Ok(self.contract.decode_decimals(&output)?)
    }

    pub async fn total_supply(&self) -> Result<U256, RpcError> {
        let output = self.call_no_args("totalSupply").await?;
        Ok(self.contract.decode_uint("totalSupply", &output)?)
    }

    async fn call_no_args(&self, function: &str) -> Result<Vec<u8>, RpcError> {
        let data = self.contract.encode_call(function, &[])?;
        self.call(&data).await
    }

    async fn call(&self, data: &[u8]) -> Result<Vec<u8>, RpcError> {
        self.rpc
            .call(self.contract.address(), data, BlockTag::Latest)
            .await
    }
}
