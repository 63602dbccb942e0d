use std::fmt;

use alloy_primitives::U256;
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature};
use sha3::{Digest, Keccak256};

use crate::address::{parse_address, ADDRESS_LEN};
use crate::erc20::Erc20Contract;
use crate::error::EthError;
use crate::key::PrivateKey;

/// EIP-2718 type byte of EIP-1559 transactions.
const EIP1559_TX_TYPE: u8 = 0x02;

/// How a transaction pays for gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fee {
    /// Pre-London pricing, signed with EIP-155 replay protection.
    Legacy { gas_price: u128 },
    /// EIP-1559 pricing, sent as a type-2 transaction.
    Eip1559 {
        max_priority_fee_per_gas: u128,
        max_fee_per_gas: u128,
    },
}

/// An unsigned Ethereum transaction.
#[derive(Debug, Clone)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub fee: Fee,
    pub gas_limit: u64,
    /// Recipient address as a 0x-prefixed hex string.
    pub to: String,
    /// Transfer value in wei.
    pub value: U256,
    /// Calldata (empty for plain value transfers).
    pub data: Vec<u8>,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// Network encoding of the signed transaction.
    pub raw_tx: Vec<u8>,
    /// Transaction hash as a 0x-prefixed hex string.
    pub tx_hash: String,
    /// `v` as it appears on the wire: `chain_id * 2 + 35 + y_parity` for
    /// legacy transactions, the bare y-parity for EIP-1559.
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl SignedEthTransaction {
    /// The raw transaction as 0x-prefixed hex.
    pub fn raw_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }
}

impl fmt::Display for EthTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chainId={} nonce={} to={} value={} gas={}",
            self.chain_id, self.nonce, self.to, self.value, self.gas_limit
        )?;
        match self.fee {
            Fee::Legacy { gas_price } => write!(f, " gasPrice={gas_price}")?,
            Fee::Eip1559 {
                max_priority_fee_per_gas,
                max_fee_per_gas,
            } => write!(
                f,
                " maxPriorityFeePerGas={max_priority_fee_per_gas} maxFeePerGas={max_fee_per_gas}"
            )?,
        }
        write!(f, " data=0x{}", hex::encode(&self.data))
    }
}

impl fmt::Display for SignedEthTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hash={} v={} r=0x{} s=0x{} raw={}",
            self.tx_hash,
            self.v,
            hex::encode(self.r),
            hex::encode(self.s),
            self.raw_tx_hex()
        )
    }
}

/// Builds an unsigned ERC-20 `transfer(to, amount)` transaction.
///
/// The transaction is addressed to the token contract and carries no ether.
pub fn build_erc20_transfer(
    chain_id: u64,
    nonce: u64,
    token: &Erc20Contract,
    to: &str,
    amount: U256,
    fee: Fee,
    gas_limit: u64,
) -> Result<EthTransaction, EthError> {
    let data = token.encode_transfer(to, amount)?;

    let tx = EthTransaction {
        chain_id,
        nonce,
        fee,
        gas_limit,
        to: token.address().to_string(),
        value: U256::ZERO,
        data,
    };
    tx.validate()?;
    Ok(tx)
}

impl EthTransaction {
    /// Checks field consistency before encoding.
    pub fn validate(&self) -> Result<(), EthError> {
        parse_address(&self.to)?;

        if self.gas_limit == 0 {
            return Err(EthError::TransactionBuildError("gas limit must be non-zero".into()));
        }

        if let Fee::Eip1559 {
            max_priority_fee_per_gas,
            max_fee_per_gas,
        } = self.fee
        {
            if max_priority_fee_per_gas > max_fee_per_gas {
                return Err(EthError::TransactionBuildError(format!(
                    "priority fee {max_priority_fee_per_gas} exceeds max fee {max_fee_per_gas}"
                )));
            }
        }

        Ok(())
    }

    /// The bytes whose Keccak-256 hash is signed.
    ///
    /// - Legacy: `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`
    /// - EIP-1559: `0x02 || rlp([chainId, nonce, maxPriorityFee, maxFee, gas,
    ///   to, value, data, accessList])`
    pub fn signing_payload(&self) -> Result<Vec<u8>, EthError> {
        self.validate()?;
        let to = RlpAddress(parse_address(&self.to)?);
        let value = RlpU256(self.value.to_be_bytes::<32>());
        let data = RlpBytes(self.data.clone());

        let mut out = Vec::new();
        match self.fee {
            Fee::Legacy { gas_price } => {
                LegacySigningFields {
                    nonce: self.nonce,
                    gas_price,
                    gas_limit: self.gas_limit,
                    to,
                    value,
                    data,
                    chain_id: self.chain_id,
                    empty_r: 0,
                    empty_s: 0,
                }
                .encode(&mut out);
            }
            Fee::Eip1559 {
                max_priority_fee_per_gas,
                max_fee_per_gas,
            } => {
                out.push(EIP1559_TX_TYPE);
                Eip1559SigningFields {
                    chain_id: self.chain_id,
                    nonce: self.nonce,
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas_limit: self.gas_limit,
                    to,
                    value,
                    data,
                    access_list: EmptyAccessList,
                }
                .encode(&mut out);
            }
        }

        Ok(out)
    }
}

/// Signs a transaction with the given account key.
///
/// The signing process:
/// 1. Build the signing payload (see [`EthTransaction::signing_payload`]).
/// 2. Keccak-256 hash the payload.
/// 3. Sign the hash with k256 (RFC 6979 deterministic nonce, low-s).
/// 4. Re-encode the fields with `v`, `r`, `s` appended.
/// 5. Hash the raw bytes to get the transaction hash.
pub fn sign_transaction(
    tx: &EthTransaction,
    key: &PrivateKey,
) -> Result<SignedEthTransaction, EthError> {
    let payload = tx.signing_payload()?;
    let msg_hash = Keccak256::digest(&payload);

    let signing_key = key.signing_key()?;
    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(&msg_hash[..])
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let y_parity = recovery_id.is_y_odd();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());

    let to = RlpAddress(parse_address(&tx.to)?);
    let value = RlpU256(tx.value.to_be_bytes::<32>());
    let data = RlpBytes(tx.data.clone());

    let mut raw_tx = Vec::new();
    let v = match tx.fee {
        Fee::Legacy { gas_price } => {
            let v = tx
                .chain_id
                .checked_mul(2)
                .and_then(|v| v.checked_add(35 + u64::from(y_parity)))
                .ok_or_else(|| {
                    EthError::SigningError(format!("chain id {} too large for EIP-155", tx.chain_id))
                })?;
            LegacySignedFields {
                nonce: tx.nonce,
                gas_price,
                gas_limit: tx.gas_limit,
                to,
                value,
                data,
                v,
                r: RlpU256(r),
                s: RlpU256(s),
            }
            .encode(&mut raw_tx);
            v
        }
        Fee::Eip1559 {
            max_priority_fee_per_gas,
            max_fee_per_gas,
        } => {
            raw_tx.push(EIP1559_TX_TYPE);
            Eip1559SignedFields {
                chain_id: tx.chain_id,
                nonce: tx.nonce,
                max_priority_fee_per_gas,
                max_fee_per_gas,
                gas_limit: tx.gas_limit,
                to,
                value,
                data,
                access_list: EmptyAccessList,
                y_parity,
                r: RlpU256(r),
                s: RlpU256(s),
            }
            .encode(&mut raw_tx);
            u64::from(y_parity)
        }
    };

    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedEthTransaction {
        raw_tx,
        tx_hash,
        v,
        r,
        s,
    })
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct LegacySigningFields {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    chain_id: u64,
    empty_r: u8,
    empty_s: u8,
}

#[derive(RlpEncodable)]
struct LegacySignedFields {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    v: u64,
    r: RlpU256,
    s: RlpU256,
}

#[derive(RlpEncodable)]
struct Eip1559SigningFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    access_list: EmptyAccessList,
}

#[derive(RlpEncodable)]
struct Eip1559SignedFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    access_list: EmptyAccessList,
    y_parity: bool,
    r: RlpU256,
    s: RlpU256,
}

/// An EIP-2930 access list. Transfers never pre-declare storage access.
#[derive(Debug, Clone, Copy)]
struct EmptyAccessList;

impl Encodable for EmptyAccessList {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        alloy_rlp::BufMut::put_u8(out, alloy_rlp::EMPTY_LIST_CODE);
    }

    fn length(&self) -> usize {
        1
    }
}

/// A 20-byte address, RLP-encoded as a byte string.
#[derive(Debug, Clone)]
struct RlpAddress([u8; ADDRESS_LEN]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Arbitrary bytes (calldata), RLP-encoded as a byte string rather than as a
/// list of single-byte items.
#[derive(Debug, Clone)]
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// A big-endian 256-bit integer, RLP-encoded with leading zeros stripped.
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl RlpU256 {
    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}
