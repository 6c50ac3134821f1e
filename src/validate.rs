use crate::error::RowError;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the trimmed value, or `MissingField` when nothing is left.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RowError::MissingField { field });
    }
    Ok(value)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, RowError> {
    let malformed = || RowError::MalformedDate {
        value: value.to_string(),
    };

    if !is_iso_layout(value) {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| malformed())
}

/// Exactly `DDDD-DD-DD`. chrono alone also takes signed years and
/// single-digit months or days.
fn is_iso_layout(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parses a plain or scientific decimal and rejects anything below zero.
///
/// The sign is judged from the text, so a negative value is reported as
/// such even when it is too small or too large for `Decimal`. A well-formed
/// value `Decimal` cannot hold is `QuantityOutOfRange`.
pub fn parse_quantity(value: &str) -> Result<Decimal, RowError> {
    let Some(number) = scan_number(value) else {
        return Err(RowError::MalformedNumber {
            value: value.to_string(),
        });
    };

    if number.zero {
        return Ok(Decimal::ZERO);
    }
    if number.negative {
        return Err(RowError::NegativeQuantity {
            value: value.to_string(),
        });
    }

    match Decimal::from_str(value).or_else(|_| Decimal::from_scientific(value)) {
        Ok(quantity) if !quantity.is_zero() => Ok(quantity),
        _ => Err(RowError::QuantityOutOfRange {
            value: value.to_string(),
        }),
    }
}

struct Number {
    negative: bool,
    zero: bool,
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`
fn scan_number(value: &str) -> Option<Number> {
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let (mantissa, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };

    let (int, frac) = match mantissa.split_once('.') {
        Some((_, "")) => return None,
        Some(parts) => parts,
        None => (mantissa, ""),
    };
    if int.is_empty() || !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    if let Some(exponent) = exponent {
        let digits = exponent
            .strip_prefix('+')
            .or_else(|| exponent.strip_prefix('-'))
            .unwrap_or(exponent);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    Some(Number {
        negative,
        zero: int.bytes().chain(frac.bytes()).all(|b| b == b'0'),
    })
}
