use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values (EUR). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Values already expressed on a 0-100 scale (cap rate, OPEX ratio, risks).
pub type Percent = Decimal;

/// Integer category score, always within [0, 100].
pub type Score = u8;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Largest representable magnitude; overflowing arithmetic saturates here.
pub const DECIMAL_CAP: Decimal = Decimal::MAX;

fn signed_cap(negative: bool) -> Decimal {
    if negative {
        -DECIMAL_CAP
    } else {
        DECIMAL_CAP
    }
}

/// Checked multiplication that returns ±DECIMAL_CAP on overflow instead of panicking.
pub fn capped_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b)
        .unwrap_or_else(|| signed_cap(a.is_sign_negative() != b.is_sign_negative()))
}

/// Checked division with the same saturation. `b` must be non-zero.
pub fn capped_div(a: Decimal, b: Decimal) -> Decimal {
    a.checked_div(b)
        .unwrap_or_else(|| signed_cap(a.is_sign_negative() != b.is_sign_negative()))
}

pub fn capped_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b)
        .unwrap_or_else(|| signed_cap(a.is_sign_negative()))
}

pub fn capped_sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b)
        .unwrap_or_else(|| signed_cap(a.is_sign_negative()))
}

/// `a / b * 100`, or `None` when the quotient leaves Decimal's range.
pub fn checked_pct(a: Decimal, b: Decimal) -> Option<Percent> {
    a.checked_div(b)?.checked_mul(dec!(100))
}

/// Round half up to an integer (…5 goes towards +∞, also for negatives).
pub fn round_half_up(value: Decimal) -> Decimal {
    value.checked_add(dec!(0.5)).unwrap_or(value).floor()
}

/// Clamp to [0, 100] and round into a [`Score`].
pub fn to_score(value: Decimal) -> Score {
    let clamped = round_half_up(value).max(Decimal::ZERO).min(dec!(100));
    clamped.to_u8().unwrap_or(0)
}
