use alloy_primitives::U256;

use crate::abi::{Abi, AbiValue, Function};
use crate::address::{checksum_address, parse_address};
use crate::error::EthError;

/// ABI of the JMToken ERC-20 contract (ERC-20 plus owned/safe-math helpers).
pub const JMTOKEN_ABI: &str = include_str!("../abi/jmtoken.json");

/// Parses the embedded JMToken ABI.
pub fn jmtoken_abi() -> Result<Abi, EthError> {
    Abi::from_json(JMTOKEN_ABI)
}

/// An ERC-20 token contract: its address bound to its ABI.
///
/// Calldata is always produced through the ABI, so a contract whose ABI
/// declares `transfer` or `balanceOf` differently is rejected up front.
#[derive(Debug, Clone)]
pub struct Erc20Contract {
    address: String,
    abi: Abi,
}

impl Erc20Contract {
    /// Binds `address` to `abi`.
    ///
    /// Fails if the address is malformed or the ABI lacks the
    /// `transfer(address,uint256)` / `balanceOf(address)` pair.
    pub fn new(address: &str, abi: Abi) -> Result<Self, EthError> {
        let address = checksum_address(address)?;

        for expected in ["transfer(address,uint256)", "balanceOf(address)"] {
            let name = &expected[..expected.find('(').unwrap_or(expected.len())];
            let function = abi.function(name)?;
            if function.signature() != expected {
                return Err(EthError::InvalidAbi(format!(
                    "expected `{expected}`, found `{}`",
                    function.signature()
                )));
            }
        }

        Ok(Self { address, abi })
    }

    /// EIP-55 checksummed contract address.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Encodes `transfer(to, amount)`.
    pub fn encode_transfer(&self, to: &str, amount: U256) -> Result<Vec<u8>, EthError> {
        let to = parse_address(to)?;
        self.encode_call("transfer", &[AbiValue::Address(to), AbiValue::Uint(amount)])
    }

    /// Encodes `balanceOf(owner)`.
    pub fn encode_balance_of(&self, owner: &str) -> Result<Vec<u8>, EthError> {
        let owner = parse_address(owner)?;
        self.encode_call("balanceOf", &[AbiValue::Address(owner)])
    }

    /// Encodes `approve(spender, amount)`.
    pub fn encode_approve(&self, spender: &str, amount: U256) -> Result<Vec<u8>, EthError> {
        let spender = parse_address(spender)?;
        self.encode_call("approve", &[AbiValue::Address(spender), AbiValue::Uint(amount)])
    }

    /// Encodes a call to any function declared in the ABI.
    pub fn encode_call(&self, function: &str, args: &[AbiValue]) -> Result<Vec<u8>, EthError> {
        self.abi.function(function)?.encode_input(args)
    }

    /// Decodes a single unsigned integer returned by `function`.
    pub fn decode_uint(&self, function: &str, data: &[u8]) -> Result<U256, EthError> {
        self.single_output(function, data)?
            .as_uint()
            .ok_or_else(|| EthError::DecodingError(format!("{function} does not return a uint")))
    }

    /// Decodes a single string returned by `function`.
    pub fn decode_string(&self, function: &str, data: &[u8]) -> Result<String, EthError> {
        match self.single_output(function, data)? {
            AbiValue::String(s) => Ok(s),
            _ => Err(EthError::DecodingError(format!("{function} does not return a string"))),
        }
    }

    /// Decodes the `decimals()` return value.
    pub fn decode_decimals(&self, data: &[u8]) -> Result<u8, EthError> {
        let value = self.decode_uint("decimals", data)?;
        if value > U256::from(u8::MAX) {
            return Err(EthError::DecodingError(format!("decimals {value} exceeds u8")));
        }
        Ok(value.to_be_bytes::<32>()[31])
    }

    fn single_output(&self, function: &str, data: &[u8]) -> Result<AbiValue, EthError> {
        let function: &Function = self.abi.function(function)?;
        function
            .decode_output(data)?
            .into_iter()
            .next()
            .ok_or_else(|| EthError::DecodingError(format!("{} returns nothing", function.name)))
    }
}
