//! JSON-RPC 2.0 envelopes and Ethereum quantity encoding.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// A JSON-RPC response carrying either `result` or `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl From<RpcErrorObject> for RpcError {
    fn from(err: RpcErrorObject) -> Self {
        RpcError::Node {
            code: err.code,
            message: err.message,
        }
    }
}

/// Block selector for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Pending,
    Earliest,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Latest => f.write_str("latest"),
            BlockTag::Pending => f.write_str("pending"),
            BlockTag::Earliest => f.write_str("earliest"),
            BlockTag::Number(n) => f.write_str(&to_quantity(*n)),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Encodes a number as an Ethereum quantity (`0x`-hex, no leading zeros).
pub fn to_quantity(value: u64) -> String {
    format!("{value:#x}")
}

fn quantity_digits(quantity: &str) -> Result<&str, RpcError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| RpcError::InvalidQuantity(format!("`{quantity}` lacks 0x prefix")))?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RpcError::InvalidQuantity(format!("`{quantity}` is not hex")));
    }
    Ok(digits)
}

pub fn parse_u64(quantity: &str) -> Result<u64, RpcError> {
    let digits = quantity_digits(quantity)?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidQuantity(format!("`{quantity}`: {e}")))
}

pub fn parse_u128(quantity: &str) -> Result<u128, RpcError> {
    let digits = quantity_digits(quantity)?;
    u128::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidQuantity(format!("`{quantity}`: {e}")))
}

pub fn parse_u256(quantity: &str) -> Result<U256, RpcError> {
    let digits = quantity_digits(quantity)?;
    U256::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidQuantity(format!("`{quantity}`: {e}")))
}

/// Decodes `0x`-prefixed unformatted data. `0x` alone is empty data.
pub fn decode_data(data: &str) -> Result<Vec<u8>, RpcError> {
    let digits = data
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::InvalidHex(format!("`{data}` lacks 0x prefix")))?;
    hex::decode(digits).map_err(|e| RpcError::InvalidHex(format!("`{data}`: {e}")))
}

pub fn encode_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}
