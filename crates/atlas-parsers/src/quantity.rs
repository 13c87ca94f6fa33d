//! Kubernetes resource quantity parsing.
//!
//! Quantities come back from the API as strings (`"4"`, `"500m"`, `"2Gi"`,
//! `"1e3"`). Device counts such as `nvidia.com/gpu` are integers in practice,
//! but the value is read the way the API machinery does: fractional results
//! round up to the next integer.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuantityError {
    #[error("Empty quantity")]
    Empty,
    #[error("Invalid number in quantity: {0}")]
    InvalidNumber(String),
    #[error("Unknown quantity suffix: {0}")]
    UnknownSuffix(String),
    #[error("Quantity out of range: {0}")]
    Overflow(String),
}

/// Scale of a quantity suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    /// Multiply by 10^n (may be negative).
    Decimal(i32),
    /// Multiply by 2^n.
    Binary(u32),
}

fn parse_suffix(suffix: &str) -> Result<Scale, QuantityError> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        "Ki" => Scale::Binary(10),
        "Mi" => Scale::Binary(20),
        "Gi" => Scale::Binary(30),
        "Ti" => Scale::Binary(40),
        "Pi" => Scale::Binary(50),
        "Ei" => Scale::Binary(60),
        other => {
            // Exponent form: e3, E-2, e+6
            let exp = other
                .strip_prefix('e')
                .or_else(|| other.strip_prefix('E'))
                .ok_or_else(|| QuantityError::UnknownSuffix(other.to_string()))?;
            let exp = exp.strip_prefix('+').unwrap_or(exp);
            let n = exp
                .parse::<i32>()
                .map_err(|_| QuantityError::UnknownSuffix(other.to_string()))?;
            Scale::Decimal(n)
        }
    };
    Ok(scale)
}

/// Divide rounding away from zero for a non-negative numerator.
fn div_ceil(n: u128, d: u128) -> u128 {
    n / d + u128::from(n % d != 0)
}

/// Parse a quantity string into its integer value, rounding up.
pub fn parse_quantity(s: &str) -> Result<i64, QuantityError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (negative, rest) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let number_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (number, suffix) = rest.split_at(number_len);

    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if (int_part.is_empty() && frac_part.is_empty()) || frac_part.contains('.') {
        return Err(QuantityError::InvalidNumber(s.to_string()));
    }

    let overflow = || QuantityError::Overflow(s.to_string());

    let digits = format!("{int_part}{frac_part}");
    let mantissa: u128 = digits.parse().map_err(|_| overflow())?;
    let frac_len = frac_part.len() as i32;

    let magnitude = match parse_suffix(suffix)? {
        Scale::Decimal(exp) => {
            let exp = exp - frac_len;
            if exp >= 0 {
                let factor = 10u128.checked_pow(exp as u32).ok_or_else(overflow)?;
                mantissa.checked_mul(factor).ok_or_else(overflow)?
            } else {
                match 10u128.checked_pow((-exp) as u32) {
                    Some(divisor) => div_ceil(mantissa, divisor),
                    // Divisor larger than any mantissa: anything non-zero rounds up to 1.
                    None => u128::from(mantissa != 0),
                }
            }
        }
        Scale::Binary(shift) => {
            let scaled = mantissa.checked_mul(1u128 << shift).ok_or_else(overflow)?;
            let divisor = 10u128.checked_pow(frac_len as u32).ok_or_else(overflow)?;
            div_ceil(scaled, divisor)
        }
    };

    let value = i64::try_from(magnitude).map_err(|_| overflow())?;
    Ok(if negative { -value } else { value })
}

/// Integer value of a quantity, or 0 when it cannot be parsed.
pub fn quantity_value(quantity: &Quantity) -> i64 {
    parse_quantity(&quantity.0).unwrap_or(0)
}
