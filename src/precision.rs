use rust_decimal::prelude::*;

use crate::error::{Neo3Error, Result};

/// 将原始代币金额（最小单位）转换为人类可读的十进制格式
///
/// Neo nodes report NEP-17 amounts as decimal integer strings, e.g. GAS with
/// 8 decimals: `"150000000"` is 1.5 GAS.
///
/// # 示例
/// ```ignore
/// let gas = to_decimal("150000000", 8)?; // Decimal 1.5
/// ```
pub fn to_decimal(raw_amount: &str, decimals: u8) -> Result<Decimal> {
    let raw = raw_amount.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Neo3Error::Precision(format!(
            "Amount must be a non-negative integer: '{}'",
            raw_amount
        )));
    }

    let amount = Decimal::from_str(raw)
        .map_err(|e| Neo3Error::Precision(format!("Failed to parse amount: {}", e)))?;

    let mut divisor = Decimal::ONE;
    for _ in 0..decimals {
        divisor = divisor
            .checked_mul(Decimal::TEN)
            .ok_or_else(|| Neo3Error::Precision("Too many decimals".to_string()))?;
    }

    amount
        .checked_div(divisor)
        .ok_or_else(|| Neo3Error::Precision("Division overflow".to_string()))
}

/// Formats a raw amount without trailing zeros.
pub fn format_amount(raw_amount: &str, decimals: u8) -> Result<String> {
    let decimal = to_decimal(raw_amount, decimals)?;
    Ok(decimal.normalize().to_string())
}
