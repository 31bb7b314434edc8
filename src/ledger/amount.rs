//! Defensive amount parsing
//!
//! The one place where dirty numeric input is tolerated. Anything that cannot
//! be read as a non-negative decimal becomes zero instead of an error, so a
//! malformed ledger still renders.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parses a backend amount, falling back to zero.
///
/// Accepts plain decimals (`"5000000"`, `"5000000.00"`) and scientific
/// notation (`"5e6"`). Empty, unparsable, and negative input all yield `0`.
pub fn parse_or_zero(raw: &str) -> Decimal {
    let raw = raw.trim();
    if raw.is_empty() {
        return Decimal::ZERO;
    }

    let parsed = if raw.contains(['e', 'E']) {
        Decimal::from_scientific(raw)
    } else {
        Decimal::from_str(raw)
    }
    .unwrap_or(Decimal::ZERO);

    if parsed.is_sign_negative() {
        Decimal::ZERO
    } else {
        parsed.normalize()
    }
}
