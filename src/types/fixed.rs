//! Fixed-point decimal codec.
//!
//! Coinbase sends prices and sizes as decimal strings (`"21921.73"`,
//! `"0.06317902"`). They are stored as `i64` scaled by 10^8 so the book never
//! touches floating point:
//!
//! - `"12.3"` -> `1_230_000_000`
//! - `"0.00000001"` -> `1`
//!
//! Digits past the eighth fractional place are truncated, not rounded.

use thiserror::Error;

/// Number of fractional decimal digits carried by a fixed-point value
pub const DECIMALS: usize = 8;

/// Multiplier between a whole unit and its fixed-point representation (10^8)
pub const SCALE: i64 = 100_000_000;

/// Failure to decode a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was the empty string
    #[error("empty decimal string")]
    Empty,

    /// Input contained something other than ASCII digits and one `.`
    #[error("invalid decimal string: {0:?}")]
    InvalidDigit(String),

    /// Value does not fit in an `i64` once scaled
    #[error("decimal value out of range: {0:?}")]
    Overflow(String),
}

/// Decode a non-negative decimal string into a scaled integer.
///
/// # Errors
///
/// - [`ParseError::Empty`] for `""`
/// - [`ParseError::InvalidDigit`] for signs, whitespace, a missing integer
///   part (`".5"`), more than one `.` or any non-digit
/// - [`ParseError::Overflow`] when the scaled value exceeds `i64::MAX`
///
/// An empty fractional part (`"12."`) is accepted and reads as `.00000000`.
///
/// # Example
///
/// ```rust
/// use coinbase_book::types::fixed;
///
/// assert_eq!(fixed::decode("12.3"), Ok(1_230_000_000));
/// assert_eq!(fixed::decode("7"), Ok(700_000_000));
/// assert!(fixed::decode("-1").is_err());
/// ```
pub fn decode(s: &str) -> Result<i64, ParseError> {
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (s, ""),
    };

    let whole = parse_digits(whole, s)?;
    let fraction = parse_fraction(fraction, s)?;

    whole
        .checked_mul(SCALE)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| ParseError::Overflow(s.to_string()))
}

/// Encode a scaled integer as a decimal string with exactly 8 fractional digits.
///
/// Negative values are written as `-` followed by the encoding of their
/// magnitude; [`decode`] does not accept them back.
///
/// # Example
///
/// ```rust
/// use coinbase_book::types::fixed;
///
/// assert_eq!(fixed::encode(1_230_000_000), "12.30000000");
/// assert_eq!(fixed::encode(1), "0.00000001");
/// ```
#[must_use]
pub fn encode(value: i64) -> String {
    let magnitude = value.unsigned_abs();
    let scale = SCALE as u64;
    let sign = if value < 0 { "-" } else { "" };
    format!(
        "{sign}{}.{:0width$}",
        magnitude / scale,
        magnitude % scale,
        width = DECIMALS
    )
}

fn parse_digits(part: &str, input: &str) -> Result<i64, ParseError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidDigit(input.to_string()));
    }
    part.parse::<i64>()
        .map_err(|_| ParseError::Overflow(input.to_string()))
}

/// Digits beyond the eighth place are dropped but must still be digits.
fn parse_fraction(part: &str, input: &str) -> Result<i64, ParseError> {
    if part.is_empty() {
        return Ok(0);
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidDigit(input.to_string()));
    }
    let truncated = &part[..part.len().min(DECIMALS)];
    let digits = parse_digits(truncated, input)?;
    // right-pad to 8 places: "3" means 30_000_000
    Ok(digits * 10_i64.pow((DECIMALS - truncated.len()) as u32))
}
