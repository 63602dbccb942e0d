use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Number of bytes in an Ethereum account address.
pub const ADDRESS_LEN: usize = 20;

/// Derives the EIP-55 checksummed address of an uncompressed secp256k1 public
/// key (65 bytes, starting with 0x04).
///
/// The address is the last 20 bytes of the Keccak-256 hash of the 64-byte key
/// body (the 0x04 tag is not hashed).
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);

    let mut addr = [0u8; ADDRESS_LEN];
    addr.copy_from_slice(&hash[12..]);

    Ok(to_checksum(&addr))
}

/// Parses a 0x-prefixed hex address into its 20 raw bytes.
///
/// The checksum is not verified here; use [`validate_address`] for that.
pub fn parse_address(address: &str) -> Result<[u8; ADDRESS_LEN], EthError> {
    let hex_part = strip_hex_prefix(address)?;

    if hex_part.len() != ADDRESS_LEN * 2 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let mut addr = [0u8; ADDRESS_LEN];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

/// Validates an Ethereum address string.
///
/// Malformed input (missing prefix, wrong length, non-hex) is an error.
/// Well-formed input returns `Ok(true)` when it is all-lowercase,
/// all-uppercase, or a correct EIP-55 mixed-case checksum, and `Ok(false)`
/// when the mixed-case checksum does not match.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let raw = parse_address(address)?;
    let hex_part = &address[2..];

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(to_checksum(&raw)[2..] == *hex_part)
}

/// Applies EIP-55 mixed-case checksum encoding to an address string in any
/// case.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    parse_address(address).map(|raw| to_checksum(&raw))
}

/// Renders raw address bytes in EIP-55 checksummed form.
pub fn to_checksum(address: &[u8; ADDRESS_LEN]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut checksummed = String::with_capacity(2 + ADDRESS_LEN * 2);
    checksummed.push_str("0x");

    for (i, c) in lower.chars().enumerate() {
        // High nibble for even positions, low nibble for odd ones.
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}

fn strip_hex_prefix(address: &str) -> Result<&str, EthError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let lower = expected.to_lowercase();
            let result = checksum_address(&lower).unwrap();
            assert_eq!(&result, expected, "checksum mismatch for {expected}");
        }
    }

    #[test]
    fn default_addresses_carry_valid_checksums() {
        assert!(validate_address("0xB7E7AeD7a722ccb62cBE1C87b950D5792512589d").unwrap());
        assert!(validate_address("0x1441cF38f688C15Fb07741E390948CbA3C7B2590").unwrap());
    }

    #[test]
    fn validate_all_lowercase_and_uppercase() {
        assert!(validate_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap());
        assert!(validate_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap());
    }

    #[test]
    fn validate_bad_checksum_returns_false() {
        let addr = "0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(!validate_address(addr).unwrap());
    }

    #[test]
    fn validate_malformed_addresses_error() {
        assert!(validate_address("0x5aAeb6053F").is_err());
        assert!(validate_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(validate_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn parse_address_accepts_upper_prefix() {
        let raw = parse_address("0X000000000000000000000000000000000000dEaD").unwrap();
        assert_eq!(raw[18], 0xde);
        assert_eq!(raw[19], 0xad);
    }

    #[test]
    fn pubkey_to_address_known_vector() {
        use k256::elliptic_curve::sec1::ToEncodedPoint;
        use k256::SecretKey;

        let mut privkey = [0u8; 32];
        privkey[31] = 1;

        let secret = SecretKey::from_bytes((&privkey).into()).expect("valid private key");
        let uncompressed = secret.public_key().to_encoded_point(false);

        let mut key_65 = [0u8; 65];
        key_65.copy_from_slice(uncompressed.as_bytes());

        let address = pubkey_to_eth_address(&key_65).unwrap();
        assert_eq!(address, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    }

    #[test]
    fn invalid_uncompressed_prefix_errors() {
        let mut key = [0u8; 65];
        key[0] = 0x03;
        assert!(pubkey_to_eth_address(&key).is_err());
    }
}
