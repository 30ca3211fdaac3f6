//! Decimal-string ⇄ wei conversion at the UI boundary. On-chain amounts are
//! fixed-point integers in wei; humans type "10" or "0.5".

use alloy::primitives::U256;
use alloy::primitives::utils::{format_ether, parse_ether};

use crate::error::{ClientError, ClientResult};

/// Parse a human-entered decimal ETH amount into wei. Empty, malformed and
/// zero amounts are rejected; every write flow requires a positive value.
pub fn parse_amount(text: &str) -> ClientResult<U256> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidAmount("amount is empty".to_string()));
    }

    let wei = parse_ether(trimmed)
        .map_err(|e| ClientError::InvalidAmount(format!("{trimmed}: {e}")))?;

    if wei.is_zero() {
        return Err(ClientError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }

    Ok(wei)
}

/// Format wei back into a decimal ETH string with trailing fractional zeros
/// trimmed, so an entered "10" reads back as "10", not "10.000000000000000000".
pub fn format_amount(wei: U256) -> String {
    let full = format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => full,
    }
}

/// Approximate ETH value of a wei amount, for ratio math only (progress
/// percentages). Never converted back to an on-chain amount.
pub(crate) fn approx_ether(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_whole_amount() {
        let wei = parse_amount("10").unwrap();
        assert_eq!(wei, U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(format_amount(wei), "10");
    }

    #[test]
    fn test_round_trip_fractional_amount() {
        let wei = parse_amount("0.5").unwrap();
        assert_eq!(format_amount(wei), "0.5");

        let wei = parse_amount("10.25").unwrap();
        assert_eq!(format_amount(wei), "10.25");
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("   ").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_rejects_zero() {
        assert!(matches!(
            parse_amount("0"),
            Err(ClientError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_amount(U256::ZERO), "0");
    }

    #[test]
    fn test_approx_ether() {
        let five = parse_amount("5").unwrap();
        assert_eq!(approx_ether(five), 5.0);
    }
}
