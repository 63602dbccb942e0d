use alloy_primitives::U256;

use crate::error::EthError;

/// Decimals of ether (and of most ERC-20 tokens).
pub const ETHER_DECIMALS: u8 = 18;

/// Decimals of gwei relative to wei.
pub const GWEI_DECIMALS: u8 = 9;

/// Renders a base-unit amount as a plain decimal string.
///
/// Trailing fractional zeros are dropped: `1500000000000000000` with 18
/// decimals is `1.5`, zero is `0`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Parses a decimal amount into base units, e.g. `1.5` ether into
/// `1500000000000000000` wei.
///
/// Amounts with more fractional digits than `decimals` are rejected rather
/// than rounded.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, EthError> {
    let amount = amount.trim();
    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(EthError::InvalidAmount(format!("`{amount}` is not a number")));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(EthError::InvalidAmount(format!("`{amount}` is not a decimal number")));
    }
    if frac_part.len() > usize::from(decimals) {
        return Err(EthError::InvalidAmount(format!(
            "`{amount}` has more than {decimals} decimal places"
        )));
    }

    let mut digits = String::with_capacity(int_part.len() + usize::from(decimals));
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.push_str(&"0".repeat(usize::from(decimals) - frac_part.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|e| EthError::InvalidAmount(format!("`{amount}` is out of range: {e}")))
}
