//! Offline Ethereum primitives for the token-transfer tool.
//!
//! This crate provides:
//! - Private key handling and address derivation (with EIP-55 checksums)
//! - Contract ABI parsing, validation and encoding
//! - ERC-20 call encoding against a bound contract ABI
//! - Legacy (EIP-155) and EIP-1559 transaction building and signing
//! - Wei/ether unit conversion and known network metadata
//!
//! Nothing here touches the network; see the `eth-rpc` crate for that.

pub mod abi;
pub mod address;
pub mod chains;
pub mod erc20;
pub mod error;
pub mod key;
pub mod transaction;
pub mod units;

pub use error::EthError;
pub use key::PrivateKey;
