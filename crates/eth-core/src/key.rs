use std::fmt;
use std::str::FromStr;

use k256::ecdsa::SigningKey;
use secrecy::{ExposeSecret, SecretBox};
use zeroize::Zeroizing;

use crate::address::pubkey_to_eth_address;
use crate::error::EthError;

/// A secp256k1 account key.
///
/// The scalar lives in a [`SecretBox`] and is wiped when the key is dropped.
/// `Debug` never prints the key material.
pub struct PrivateKey(SecretBox<[u8; 32]>);

impl PrivateKey {
    /// Parses a 32-byte private key from hex. The `0x` prefix is optional and
    /// surrounding whitespace is ignored.
    pub fn from_hex(input: &str) -> Result<Self, EthError> {
        let trimmed = input.trim();
        let hex_str = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let decoded = Zeroizing::new(
            hex::decode(hex_str)
                .map_err(|e| EthError::InvalidPrivateKey(format!("invalid hex: {e}")))?,
        );

        let bytes: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            EthError::InvalidPrivateKey(format!("expected 32 bytes, got {}", decoded.len()))
        })?;

        Self::from_bytes(bytes)
    }

    /// Wraps raw key bytes, rejecting zero and out-of-range scalars.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, EthError> {
        let secret = SecretBox::new(Box::new(bytes));
        let key = Self(secret);
        key.signing_key()?;
        Ok(key)
    }

    /// Returns the EIP-55 checksummed address controlled by this key.
    pub fn address(&self) -> Result<String, EthError> {
        let signing_key = self.signing_key()?;
        let uncompressed = signing_key.verifying_key().to_encoded_point(false);

        let mut key_65 = [0u8; 65];
        key_65.copy_from_slice(uncompressed.as_bytes());

        pubkey_to_eth_address(&key_65)
    }

    pub(crate) fn signing_key(&self) -> Result<SigningKey, EthError> {
        SigningKey::from_bytes(self.0.expose_secret().into())
            .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))
    }
}

impl FromStr for PrivateKey {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
