//! Null-propagating arithmetic for statement data.
//!
//! Every function here returns `None` instead of failing. A zero
//! denominator, an overflowing operation and a raw value that is not a
//! finite number all mean "no value", and that `None` flows on through the
//! feature and scoring stages.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Coerce a loosely typed provider value into a `Decimal`.
///
/// Numbers and numeric strings (plain or scientific notation) coerce.
/// `null`, booleans, `"NaN"`, `"inf"`, empty strings, arrays and objects
/// do not.
pub fn coerce_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

/// Parse a numeric literal, accepting scientific notation.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// `num / den`, or `None` when `den` is zero or the quotient overflows.
pub fn safe_div(num: Decimal, den: Decimal) -> Option<Decimal> {
    if den.is_zero() {
        return None;
    }
    num.checked_div(den)
}

/// Division over nullable operands.
pub fn ratio(num: Option<Decimal>, den: Option<Decimal>) -> Option<Decimal> {
    safe_div(num?, den?)
}

/// Subtraction over nullable operands.
pub fn difference(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    a?.checked_sub(b?)
}

/// Fractional change `current / previous - 1`.
pub fn pct_change(current: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    ratio(current, previous)?.checked_sub(Decimal::ONE)
}

/// Period-over-period change of a series.
///
/// Each present value is compared with the last earlier present value, so an
/// interior gap is bridged. Positions whose own value is null stay `None`,
/// as does the first present value.
pub fn pct_change_series(values: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    let mut out = Vec::with_capacity(values.len());
    let mut previous = None;
    for current in values {
        match current {
            Some(v) => {
                out.push(pct_change(Some(*v), previous));
                previous = Some(*v);
            }
            None => out.push(None),
        }
    }
    out
}

/// The last non-null element of a series.
pub fn latest_present(values: &[Option<Decimal>]) -> Option<Decimal> {
    values.iter().rev().find_map(|v| *v)
}

/// Display rounding for nullable values.
pub fn round_opt(value: Option<Decimal>, dp: u32) -> Option<Decimal> {
    value.map(|v| v.round_dp(dp))
}
