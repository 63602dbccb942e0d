//! Async JSON-RPC 2.0 client for Ethereum nodes over HTTP.
//!
//! [`RpcClient`] handles the envelope, ids, timeouts and error mapping. The
//! typed `eth_*` methods live in [`eth`], ERC-20 reads in [`TokenClient`].

mod client;
pub mod erc20;
mod error;
pub mod eth;
pub mod models;

pub use client::{RpcClient, RpcClientBuilder, DEFAULT_TIMEOUT};
pub use erc20::TokenClient;
pub use error::RpcError;
pub use models::BlockTag;
