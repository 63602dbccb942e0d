//! Contract ABI model and call encoding.
//!
//! Parses the JSON ABI of a contract into typed entries, validates it, and
//! encodes/decodes function calls with the standard head/tail layout. Array
//! and tuple values are outside what this crate encodes; array types are still
//! accepted in an ABI so that signatures and selectors stay correct.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::U256;
use serde::Deserialize;
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::address::{to_checksum, ADDRESS_LEN};
use crate::error::EthError;

/// Size of one ABI word.
const WORD: usize = 32;

// ---------------------------------------------------------------------------
// Parameter types
// ---------------------------------------------------------------------------

/// A Solidity parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Bool,
    String,
    Bytes,
    /// `bytes1` .. `bytes32`.
    FixedBytes(usize),
    /// `uint8` .. `uint256`.
    Uint(usize),
    /// `int8` .. `int256`.
    Int(usize),
    /// `T[]`.
    Array(Box<ParamType>),
    /// `T[k]`.
    FixedArray(Box<ParamType>, usize),
}

impl ParamType {
    /// Parses a canonical or shorthand Solidity type (`uint` is `uint256`).
    pub fn parse(input: &str) -> Result<Self, EthError> {
        let ty = input.trim();

        if let Some(inner) = ty.strip_suffix(']') {
            let open = inner
                .rfind('[')
                .ok_or_else(|| EthError::InvalidAbi(format!("unbalanced brackets in `{ty}`")))?;
            let element = Box::new(Self::parse(&inner[..open])?);
            let size = &inner[open + 1..];
            if size.is_empty() {
                return Ok(Self::Array(element));
            }
            let len = size
                .parse::<usize>()
                .map_err(|_| EthError::InvalidAbi(format!("invalid array length in `{ty}`")))?;
            return Ok(Self::FixedArray(element, len));
        }

        match ty {
            "address" => return Ok(Self::Address),
            "bool" => return Ok(Self::Bool),
            "string" => return Ok(Self::String),
            "bytes" => return Ok(Self::Bytes),
            "uint" => return Ok(Self::Uint(256)),
            "int" => return Ok(Self::Int(256)),
            _ => {}
        }

        if let Some(bits) = ty.strip_prefix("uint") {
            return parse_bits(ty, bits).map(Self::Uint);
        }
        if let Some(bits) = ty.strip_prefix("int") {
            return parse_bits(ty, bits).map(Self::Int);
        }
        if let Some(len) = ty.strip_prefix("bytes") {
            let len = len
                .parse::<usize>()
                .map_err(|_| EthError::InvalidAbi(format!("unknown type `{ty}`")))?;
            if !(1..=32).contains(&len) {
                return Err(EthError::InvalidAbi(format!("invalid size for `{ty}`")));
            }
            return Ok(Self::FixedBytes(len));
        }

        Err(EthError::InvalidAbi(format!("unknown type `{ty}`")))
    }

    /// Whether the value lives in the tail section of an encoding.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::FixedArray(element, _) => element.is_dynamic(),
            _ => false,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::FixedArray(element, len) => write!(f, "{element}[{len}]"),
        }
    }
}

fn parse_bits(ty: &str, bits: &str) -> Result<usize, EthError> {
    let bits = bits
        .parse::<usize>()
        .map_err(|_| EthError::InvalidAbi(format!("unknown type `{ty}`")))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(EthError::InvalidAbi(format!("invalid size for `{ty}`")));
    }
    Ok(bits)
}

// ---------------------------------------------------------------------------
// ABI entries
// ---------------------------------------------------------------------------

/// A named, typed function or event parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawParam")]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
    /// Only meaningful for event inputs.
    pub indexed: bool,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    indexed: bool,
}

impl TryFrom<RawParam> for Param {
    type Error = EthError;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        Ok(Self {
            name: raw.name,
            kind: ParamType::parse(&raw.kind)?,
            indexed: raw.indexed,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub outputs: Vec<Param>,
    #[serde(default)]
    pub state_mutability: Option<String>,
    #[serde(default)]
    pub constant: Option<bool>,
    #[serde(default)]
    pub payable: Option<bool>,
}

impl Function {
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// First four bytes of the Keccak-256 of the signature.
    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }

    /// Whether calling this function cannot modify chain state.
    pub fn is_read_only(&self) -> bool {
        match self.state_mutability.as_deref() {
            Some(mutability) => mutability == "view" || mutability == "pure",
            None => self.constant.unwrap_or(false),
        }
    }

    /// Encodes `selector || encode(inputs)`.
    pub fn encode_input(&self, values: &[AbiValue]) -> Result<Vec<u8>, EthError> {
        let types: Vec<ParamType> = self.inputs.iter().map(|p| p.kind.clone()).collect();
        encode_function_call(self.selector(), &types, values)
            .map_err(|e| EthError::EncodingError(format!("{}: {e}", self.name)))
    }

    /// Decodes the return data of a call to this function.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, EthError> {
        let types: Vec<ParamType> = self.outputs.iter().map(|p| p.kind.clone()).collect();
        decode(&types, data).map_err(|e| EthError::DecodingError(format!("{}: {e}", self.name)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub anonymous: bool,
}

impl Event {
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// Keccak-256 of the signature, used as `topics[0]` of emitted logs.
    pub fn topic(&self) -> [u8; 32] {
        let hash = Keccak256::digest(self.signature().as_bytes());
        let mut topic = [0u8; 32];
        topic.copy_from_slice(&hash);
        topic
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub state_mutability: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fallback {
    #[serde(default)]
    pub state_mutability: Option<String>,
    #[serde(default)]
    pub payable: Option<bool>,
}

/// Custom error declaration (Solidity >= 0.8.4).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDecl {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
}

/// One entry of a contract ABI.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    Function(Function),
    Constructor(Constructor),
    Fallback(Fallback),
    Receive(Fallback),
    Event(Event),
    Error(ErrorDecl),
}

fn signature(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.kind.to_string()).collect();
    format!("{name}({})", types.join(","))
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

// ---------------------------------------------------------------------------
// Whole ABI
// ---------------------------------------------------------------------------

/// A parsed and validated contract ABI.
#[derive(Debug, Clone)]
pub struct Abi {
    items: Vec<AbiItem>,
    functions: HashMap<String, usize>,
}

impl Abi {
    /// Parses and validates an ABI from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, EthError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EthError::InvalidAbi(format!("malformed json: {e}")))?;
        Self::from_value(value)
    }

    /// Parses and validates an ABI from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, EthError> {
        validate_abi(&value)?;

        let items: Vec<AbiItem> =
            serde_json::from_value(value).map_err(|e| EthError::InvalidAbi(e.to_string()))?;

        let mut functions = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            let AbiItem::Function(function) = item else {
                continue;
            };
            // Overloads resolve to the first declaration by name.
            functions.entry(function.name.clone()).or_insert(index);
        }

        Ok(Self { items, functions })
    }

    pub fn items(&self) -> &[AbiItem] {
        &self.items
    }

    /// Looks up a function by name.
    pub fn function(&self, name: &str) -> Result<&Function, EthError> {
        self.functions
            .get(name)
            .and_then(|&index| match &self.items[index] {
                AbiItem::Function(function) => Some(function),
                _ => None,
            })
            .ok_or_else(|| EthError::UnknownFunction(name.to_string()))
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Event(event) => Some(event),
            _ => None,
        })
    }
}

/// Structural validation of a JSON ABI.
///
/// The ABI must be an array of objects, each with a known `type`. Functions,
/// events and errors need a non-empty `name`, and every parameter needs a
/// parseable `type`. No two functions may share a selector.
pub fn validate_abi(abi: &Value) -> Result<(), EthError> {
    let entries = abi
        .as_array()
        .ok_or_else(|| EthError::InvalidAbi("abi must be a json array".into()))?;

    let mut selectors: HashMap<[u8; 4], String> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let object = entry
            .as_object()
            .ok_or_else(|| EthError::InvalidAbi(format!("entry {index} is not an object")))?;

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EthError::InvalidAbi(format!("entry {index} has no `type`")))?;

        let named = match kind {
            "function" | "event" | "error" => true,
            "constructor" | "fallback" | "receive" => false,
            other => {
                return Err(EthError::InvalidAbi(format!(
                    "entry {index} has unknown type `{other}`"
                )))
            }
        };

        if named {
            let has_name = object
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| !name.is_empty());
            if !has_name {
                return Err(EthError::InvalidAbi(format!("{kind} entry {index} has no name")));
            }
        }

        for field in ["inputs", "outputs"] {
            let Some(params) = object.get(field) else {
                continue;
            };
            let params = params.as_array().ok_or_else(|| {
                EthError::InvalidAbi(format!("entry {index}: `{field}` must be an array"))
            })?;
            for param in params {
                let ty = param.get("type").and_then(Value::as_str).ok_or_else(|| {
                    EthError::InvalidAbi(format!("entry {index}: parameter without `type`"))
                })?;
                ParamType::parse(ty)?;
            }
        }

        if kind == "function" {
            let signature = entry_signature(object)?;
            let selector = selector(&signature);
            if let Some(existing) = selectors.insert(selector, signature.clone()) {
                return Err(EthError::InvalidAbi(format!(
                    "functions `{existing}` and `{signature}` share selector 0x{}",
                    hex::encode(selector)
                )));
            }
        }
    }

    Ok(())
}

/// Canonical signature of an already type-checked ABI entry.
fn entry_signature(object: &serde_json::Map<String, Value>) -> Result<String, EthError> {
    let name = object.get("name").and_then(Value::as_str).unwrap_or_default();
    let types = object
        .get("inputs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|param| {
            let ty = param.get("type").and_then(Value::as_str).unwrap_or_default();
            ParamType::parse(ty).map(|kind| kind.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{name}({})", types.join(",")))
}

// ---------------------------------------------------------------------------
// Values and encoding
// ---------------------------------------------------------------------------

/// A value passed to or returned from a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address([u8; ADDRESS_LEN]),
    Uint(U256),
    /// Two's-complement 256-bit word.
    Int(U256),
    Bool(bool),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<String> {
        match self {
            Self::Address(addr) => Some(to_checksum(addr)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Encodes a function call: `selector || encode(values)`.
///
/// # Parameters
///
/// - `selector`: The 4-byte function selector (e.g., `0xa9059cbb` for ERC-20
///   `transfer`).
/// - `types`: Declared input types, in order.
/// - `values`: One value per declared type.
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    values: &[AbiValue],
) -> Result<Vec<u8>, EthError> {
    let body = encode(types, values)?;
    let mut data = Vec::with_capacity(4 + body.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&body);
    Ok(data)
}

/// Encodes a parameter list with the head/tail layout.
///
/// Static values sit in the head. Dynamic values sit in the tail, and the head
/// holds their byte offset measured from the start of the encoding.
pub fn encode(types: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, EthError> {
    if types.len() != values.len() {
        return Err(EthError::EncodingError(format!(
            "expected {} values, got {}",
            types.len(),
            values.len()
        )));
    }

    let head_len = types.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (ty, value) in types.iter().zip(values) {
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&encode_dynamic(ty, value)?);
        } else {
            head.extend_from_slice(&encode_static(ty, value)?);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_static(ty: &ParamType, value: &AbiValue) -> Result<[u8; WORD], EthError> {
    match (ty, value) {
        (ParamType::Address, AbiValue::Address(addr)) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; WORD];
            word[WORD - ADDRESS_LEN..].copy_from_slice(addr);
            Ok(word)
        }
        (ParamType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bit_len() > *bits {
                return Err(EthError::EncodingError(format!("{v} does not fit in {ty}")));
            }
            Ok(v.to_be_bytes::<WORD>())
        }
        (ParamType::Int(bits), AbiValue::Int(v)) => {
            if !fits_int(v, *bits) {
                return Err(EthError::EncodingError(format!("{v} does not fit in {ty}")));
            }
            Ok(v.to_be_bytes::<WORD>())
        }
        (ParamType::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; WORD];
            word[WORD - 1] = u8::from(*b);
            Ok(word)
        }
        (ParamType::FixedBytes(len), AbiValue::FixedBytes(bytes)) => {
            if bytes.len() != *len {
                return Err(EthError::EncodingError(format!(
                    "{ty} needs {len} bytes, got {}",
                    bytes.len()
                )));
            }
            // Right-pad: data + trailing zero bytes.
            let mut word = [0u8; WORD];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word)
        }
        (ParamType::Array(_) | ParamType::FixedArray(..), _) => Err(EthError::EncodingError(
            format!("array parameters ({ty}) are not supported"),
        )),
        _ => Err(EthError::EncodingError(format!("value {value:?} is not a {ty}"))),
    }
}

fn encode_dynamic(ty: &ParamType, value: &AbiValue) -> Result<Vec<u8>, EthError> {
    let bytes: &[u8] = match (ty, value) {
        (ParamType::Bytes, AbiValue::Bytes(bytes)) => bytes,
        (ParamType::String, AbiValue::String(s)) => s.as_bytes(),
        (ParamType::Array(_) | ParamType::FixedArray(..), _) => {
            return Err(EthError::EncodingError(format!(
                "array parameters ({ty}) are not supported"
            )))
        }
        _ => return Err(EthError::EncodingError(format!("value {value:?} is not a {ty}"))),
    };

    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded_len, 0);
    Ok(out)
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Decodes a parameter list encoded with the head/tail layout.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<AbiValue>, EthError> {
    types
        .iter()
        .enumerate()
        .map(|(index, ty)| {
            let head = read_word(data, index * WORD)?;
            if ty.is_dynamic() {
                decode_dynamic(ty, data, word_to_usize(&head)?)
            } else {
                decode_static(ty, &head)
            }
        })
        .collect()
}

fn decode_static(ty: &ParamType, word: &[u8; WORD]) -> Result<AbiValue, EthError> {
    match ty {
        ParamType::Address => {
            let mut addr = [0u8; ADDRESS_LEN];
            addr.copy_from_slice(&word[WORD - ADDRESS_LEN..]);
            Ok(AbiValue::Address(addr))
        }
        ParamType::Uint(bits) => {
            let value = U256::from_be_bytes(*word);
            if value.bit_len() > *bits {
                return Err(EthError::DecodingError(format!("{value} overflows {ty}")));
            }
            Ok(AbiValue::Uint(value))
        }
        ParamType::Int(bits) => {
            let value = U256::from_be_bytes(*word);
            if !fits_int(&value, *bits) {
                return Err(EthError::DecodingError(format!("{value} overflows {ty}")));
            }
            Ok(AbiValue::Int(value))
        }
        ParamType::Bool => match word[WORD - 1] {
            0 | 1 if word[..WORD - 1].iter().all(|&b| b == 0) => {
                Ok(AbiValue::Bool(word[WORD - 1] == 1))
            }
            _ => Err(EthError::DecodingError("invalid bool word".into())),
        },
        ParamType::FixedBytes(len) => Ok(AbiValue::FixedBytes(word[..*len].to_vec())),
        _ => Err(EthError::DecodingError(format!("cannot decode {ty}"))),
    }
}

fn decode_dynamic(ty: &ParamType, data: &[u8], offset: usize) -> Result<AbiValue, EthError> {
    let len = word_to_usize(&read_word(data, offset)?)?;
    let start = offset + WORD;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            EthError::DecodingError(format!("{ty} of length {len} runs past the return data"))
        })?;
    let bytes = data[start..end].to_vec();

    match ty {
        ParamType::Bytes => Ok(AbiValue::Bytes(bytes)),
        ParamType::String => String::from_utf8(bytes)
            .map(AbiValue::String)
            .map_err(|e| EthError::DecodingError(format!("string is not utf-8: {e}"))),
        _ => Err(EthError::DecodingError(format!("cannot decode {ty}"))),
    }
}

/// Whether a two's-complement word sign-extends from its low `bits`.
fn fits_int(value: &U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    // Bits from the sign bit upward must be all zeros or all ones.
    let high = *value >> (bits - 1);
    high.is_zero() || high == U256::MAX >> (bits - 1)
}

fn read_word(data: &[u8], offset: usize) -> Result<[u8; WORD], EthError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            EthError::DecodingError(format!(
                "expected a word at offset {offset}, data is {} bytes",
                data.len()
            ))
        })
}

fn word_to_usize(word: &[u8; WORD]) -> Result<usize, EthError> {
    if word[..WORD - 8].iter().any(|&b| b != 0) {
        return Err(EthError::DecodingError("offset or length out of range".into()));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| EthError::DecodingError("offset or length out of range".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn function(json: Value) -> Function {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parse_elementary_types() {
        assert_eq!(ParamType::parse("address").unwrap(), ParamType::Address);
        assert_eq!(ParamType::parse("uint").unwrap(), ParamType::Uint(256));
        assert_eq!(ParamType::parse("uint8").unwrap(), ParamType::Uint(8));
        assert_eq!(ParamType::parse("int128").unwrap(), ParamType::Int(128));
        assert_eq!(ParamType::parse("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(ParamType::parse("bytes").unwrap(), ParamType::Bytes);
    }

    #[test]
    fn parse_array_types() {
        assert_eq!(
            ParamType::parse("address[]").unwrap(),
            ParamType::Array(Box::new(ParamType::Address))
        );
        assert_eq!(
            ParamType::parse("uint256[3][]").unwrap().to_string(),
            "uint256[3][]"
        );
    }

    #[test]
    fn parse_rejects_bad_types() {
        assert!(ParamType::parse("uint7").is_err());
        assert!(ParamType::parse("uint264").is_err());
        assert!(ParamType::parse("bytes33").is_err());
        assert!(ParamType::parse("bytes0").is_err());
        assert!(ParamType::parse("tuple").is_err());
        assert!(ParamType::parse("address]").is_err());
    }

    #[test]
    fn selector_matches_known_erc20_values() {
        let transfer = function(json!({
            "name": "transfer",
            "inputs": [{"name": "to", "type": "address"}, {"name": "tokens", "type": "uint256"}],
        }));
        assert_eq!(transfer.signature(), "transfer(address,uint256)");
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);

        let balance_of = function(json!({
            "name": "balanceOf",
            "inputs": [{"name": "tokenOwner", "type": "address"}],
        }));
        assert_eq!(hex::encode(balance_of.selector()), "70a08231");
    }

    #[test]
    fn read_only_detection() {
        let legacy_view = function(json!({"name": "owner", "constant": true}));
        let modern_view = function(json!({"name": "owner", "stateMutability": "view"}));
        let write = function(json!({"name": "transfer", "stateMutability": "nonpayable"}));
        assert!(legacy_view.is_read_only());
        assert!(modern_view.is_read_only());
        assert!(!write.is_read_only());
    }

    #[test]
    fn event_topic_matches_transfer_event() {
        let event: Event = serde_json::from_value(json!({
            "name": "Transfer",
            "inputs": [
                {"indexed": true, "name": "from", "type": "address"},
                {"indexed": true, "name": "to", "type": "address"},
                {"indexed": false, "name": "tokens", "type": "uint256"}
            ]
        }))
        .unwrap();
        assert!(hex::encode(event.topic()).starts_with("ddf252ad"));
        assert!(event.inputs[0].indexed);
    }

    #[test]
    fn validate_rejects_non_array() {
        assert!(validate_abi(&json!({"type": "function"})).is_err());
    }

    #[test]
    fn validate_rejects_unknown_entry_type() {
        let abi = json!([{"type": "modifier", "name": "onlyOwner"}]);
        let err = validate_abi(&abi).unwrap_err();
        assert!(err.to_string().contains("unknown type `modifier`"));
    }

    #[test]
    fn validate_rejects_unnamed_function() {
        let abi = json!([{"type": "function", "inputs": []}]);
        assert!(validate_abi(&abi).is_err());
    }

    #[test]
    fn validate_rejects_bad_parameter_type() {
        let abi = json!([{"type": "function", "name": "f", "inputs": [{"name": "x", "type": "uint7"}]}]);
        assert!(validate_abi(&abi).is_err());
    }

    #[test]
    fn validate_rejects_duplicate_selectors() {
        let abi = json!([
            {"type": "function", "name": "transfer", "inputs": [{"name": "to", "type": "address"}, {"name": "v", "type": "uint256"}]},
            {"type": "function", "name": "transfer", "inputs": [{"name": "a", "type": "address"}, {"name": "b", "type": "uint"}]}
        ]);
        let err = validate_abi(&abi).unwrap_err();
        assert!(err.to_string().contains("share selector 0xa9059cbb"));
    }

    #[test]
    fn validate_accepts_overloads() {
        let abi = json!([
            {"type": "function", "name": "f", "inputs": [{"name": "a", "type": "uint256"}]},
            {"type": "function", "name": "f", "inputs": [{"name": "a", "type": "address"}]}
        ]);
        assert!(validate_abi(&abi).is_ok());
    }

    #[test]
    fn from_value_rejects_duplicate_selectors() {
        let abi = json!([
            {"type": "function", "name": "f", "inputs": [{"name": "a", "type": "uint256"}]},
            {"type": "function", "name": "f", "inputs": [{"name": "b", "type": "uint"}]}
        ]);
        let err = Abi::from_value(abi).unwrap_err();
        assert!(err.to_string().contains("share selector"));
    }

    #[test]
    fn from_value_accepts_constructor_and_fallback() {
        let abi = json!([
            {"inputs": [], "payable": false, "stateMutability": "nonpayable", "type": "constructor"},
            {"payable": true, "stateMutability": "payable", "type": "fallback"},
            {"type": "function", "name": "owner", "inputs": [], "outputs": [{"name": "", "type": "address"}]}
        ]);
        let abi = Abi::from_value(abi).unwrap();
        assert_eq!(abi.items().len(), 3);
        assert_eq!(abi.functions().count(), 1);
        assert!(abi.function("owner").is_ok());
        assert!(matches!(
            abi.function("mint"),
            Err(EthError::UnknownFunction(name)) if name == "mint"
        ));
    }

    #[test]
    fn from_json_rejects_malformed_json() {
        assert!(Abi::from_json("[{").is_err());
    }

    #[test]
    fn encode_static_words() {
        let mut addr = [0u8; 20];
        addr[0] = 0xde;
        addr[19] = 0xad;

        let encoded = encode(
            &[ParamType::Address, ParamType::Uint(256), ParamType::Bool],
            &[
                AbiValue::Address(addr),
                AbiValue::Uint(U256::from(100u64)),
                AbiValue::Bool(true),
            ],
        )
        .unwrap();

        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..32], &addr);
        assert_eq!(encoded[63], 100);
        assert_eq!(encoded[95], 1);
    }

    #[test]
    fn encode_dynamic_string_uses_head_offset() {
        let encoded = encode(
            &[ParamType::Uint(256), ParamType::String],
            &[AbiValue::Uint(U256::from(7u64)), AbiValue::String("JMToken".into())],
        )
        .unwrap();

        // head: uint, offset(64); tail: len(7), data padded to 32.
        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 64);
        assert_eq!(encoded[95], 7);
        assert_eq!(&encoded[96..103], b"JMToken");
        assert!(encoded[103..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_reverses_dynamic_encoding() {
        let types = [ParamType::String, ParamType::Uint(8), ParamType::Bytes];
        let values = [
            AbiValue::String("a string that is longer than one word, 40+".into()),
            AbiValue::Uint(U256::from(18u64)),
            AbiValue::Bytes(vec![1, 2, 3]),
        ];
        let encoded = encode(&types, &values).unwrap();
        assert_eq!(decode(&types, &encoded).unwrap(), values);
    }

    #[test]
    fn encode_rejects_mismatches() {
        assert!(encode(&[ParamType::Address], &[]).is_err());
        assert!(encode(&[ParamType::Bool], &[AbiValue::Uint(U256::ZERO)]).is_err());
        assert!(encode(&[ParamType::Uint(8)], &[AbiValue::Uint(U256::from(256u64))]).is_err());
        assert!(encode(&[ParamType::FixedBytes(4)], &[AbiValue::FixedBytes(vec![1])]).is_err());
        assert!(encode(
            &[ParamType::Array(Box::new(ParamType::Address))],
            &[AbiValue::Bytes(vec![])]
        )
        .is_err());
    }

    #[test]
    fn decode_rejects_short_data() {
        assert!(decode(&[ParamType::Uint(256)], &[0u8; 16]).is_err());
    }

    #[test]
    fn decode_rejects_out_of_range_uint() {
        let mut word = [0u8; 32];
        word[30] = 1;
        assert!(decode(&[ParamType::Uint(8)], &word).is_err());
    }

    #[test]
    fn decode_rejects_string_past_end() {
        let mut data = vec![0u8; 64];
        data[31] = 32; // offset
        data[63] = 10; // length, but no bytes follow
        assert!(decode(&[ParamType::String], &data).is_err());
    }

    #[test]
    fn decode_rejects_offset_near_usize_max() {
        let mut data = vec![0u8; 32];
        data[24..].copy_from_slice(&u64::MAX.to_be_bytes());
        let err = decode(&[ParamType::String], &data).unwrap_err();
        assert!(matches!(err, EthError::DecodingError(_)));
    }

    #[test]
    fn int_range_follows_bit_width() {
        let minus = |n: u64| U256::ZERO.wrapping_sub(U256::from(n));
        let int8 = [ParamType::Int(8)];

        assert!(encode(&int8, &[AbiValue::Int(U256::from(127u64))]).is_ok());
        assert!(encode(&int8, &[AbiValue::Int(minus(128))]).is_ok());
        assert!(encode(&int8, &[AbiValue::Int(U256::from(128u64))]).is_err());
        assert!(encode(&int8, &[AbiValue::Int(minus(129))]).is_err());
        assert!(encode(&[ParamType::Int(256)], &[AbiValue::Int(U256::MAX)]).is_ok());

        let word = minus(1).to_be_bytes::<32>();
        assert_eq!(decode(&int8, &word).unwrap(), vec![AbiValue::Int(minus(1))]);
        let word = U256::from(200u64).to_be_bytes::<32>();
        assert!(decode(&int8, &word).is_err());
    }

    #[test]
    fn decode_ignores_extra_bytes() {
        let mut data = vec![0u8; 64];
        data[31] = 42;
        data[63] = 99;
        let values = decode(&[ParamType::Uint(256)], &data).unwrap();
        assert_eq!(values[0].as_uint(), Some(U256::from(42u64)));
    }
}
