//! ERC-20 token transfer through an Ethereum JSON-RPC node.
//!
//! The binary wires [`cli::Cli`] and [`config::TransferConfig`] into
//! [`flow::run_transfer`]; the pieces are exposed here so the flow can be
//! driven against a mock node in tests.

pub mod cli;
pub mod config;
pub mod flow;

pub use config::{FeeSettings, TransferConfig, TransferSettings};
pub use flow::{run_transfer, TransferReport};
