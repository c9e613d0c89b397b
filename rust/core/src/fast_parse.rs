// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast Numeric Token Parsing
//!
//! Allocation-free conversion of whitespace-delimited tokens to numbers.
//! Every field of every line in a surface file goes through these functions,
//! so failures are reported as `None` rather than as errors.
//!
//! Performance: fast-float for floats, lexical-core for integers. Both work
//! directly on the byte slice, no UTF-8 validation or locale handling.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{eof, opt, recognize},
    sequence::{pair, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// Parse a token as `f64`.
///
/// The whole token must be consumed. Accepts `inf`/`nan` spellings as
/// fast-float does; callers that need finite values check `is_finite`.
#[inline]
pub fn parse_f64(token: &[u8]) -> Option<f64> {
    fast_float::parse::<f64, _>(token).ok()
}

/// Parse a token as `f32`
#[inline]
pub fn parse_f32(token: &[u8]) -> Option<f32> {
    fast_float::parse::<f32, _>(token).ok()
}

/// Parse a token as a finite `f64`, rejecting infinities and NaN
#[inline]
pub fn parse_finite_f64(token: &[u8]) -> Option<f64> {
    parse_f64(token).filter(|v| v.is_finite())
}

/// Parse a token as `i64`
#[inline]
pub fn parse_i64(token: &[u8]) -> Option<i64> {
    lexical_core::parse::<i64>(token).ok()
}

/// Parse a token as `u32`
#[inline]
pub fn parse_u32(token: &[u8]) -> Option<u32> {
    lexical_core::parse::<u32>(token).ok()
}

/// Parse a grid index token.
///
/// Some exporters write integral indices as floats (`12.0`), so an integral
/// float spelling is accepted as well.
#[inline]
pub fn parse_grid_index(token: &[u8]) -> Option<i64> {
    if let Some(value) = parse_i64(token) {
        return Some(value);
    }
    let value = parse_finite_f64(token)?;
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse a token as `f64`, leaving `out` untouched on failure.
///
/// Returns whether `out` was written.
#[inline]
pub fn parse_f64_into(token: &[u8], out: &mut f64) -> bool {
    match parse_f64(token) {
        Some(value) => {
            *out = value;
            true
        }
        None => false,
    }
}

/// Check if a token is a `nan` literal in any letter case
#[inline]
pub fn is_nan_literal(token: &[u8]) -> bool {
    token.eq_ignore_ascii_case(b"nan")
}

/// Check if a token spells infinity (`inf`, `-Infinity`, ...)
#[inline]
fn is_infinity_literal(token: &[u8]) -> bool {
    let unsigned = match token.first() {
        Some(b'+' | b'-') => &token[1..],
        _ => token,
    };
    unsigned.eq_ignore_ascii_case(b"inf") || unsigned.eq_ignore_ascii_case(b"infinity")
}

/// Strictly parse a value token where `nan` marks a missing measurement.
///
/// Anything that is neither a number nor a `nan` literal is an error, and so
/// is a finite spelling outside the `f64` range (`1e400`).
#[inline]
pub fn parse_f64_or_nan(token: &[u8]) -> Result<f64> {
    if is_nan_literal(token) {
        return Ok(f64::NAN);
    }
    match parse_f64(token) {
        Some(value) if value.is_finite() || is_infinity_literal(token) => Ok(value),
        _ => Err(Error::invalid_number(token)),
    }
}

/// Strictly parse a whitespace-separated list of floats (`nan` allowed)
pub fn parse_f64_list(bytes: &[u8]) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(estimate_token_count(bytes));
    for token in crate::line_reader::split_tokens(bytes) {
        values.push(parse_f64_or_nan(token)?);
    }
    Ok(values)
}

/// Strictly parse a whitespace-separated list of unsigned indices
pub fn parse_u32_list(bytes: &[u8]) -> Result<Vec<u32>> {
    let mut values = Vec::with_capacity(estimate_token_count(bytes));
    for token in crate::line_reader::split_tokens(bytes) {
        values.push(parse_u32(token).ok_or_else(|| Error::invalid_number(token))?);
    }
    Ok(values)
}

/// Rough estimate of tokens in a buffer (~6 bytes per token including delimiter)
#[inline]
fn estimate_token_count(bytes: &[u8]) -> usize {
    bytes.len() / 6
}

/// Decimal number grammar: `-12`, `3.5`, `.5`, `7.`, `1.5E-10`
fn decimal_number(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// Non-finite spellings fast-float accepts
fn special_number(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(pair(
        opt(one_of("+-")),
        alt((tag_no_case("infinity"), tag_no_case("inf"), tag_no_case("nan"))),
    ))(input)
}

/// Check whether a token is purely numeric.
///
/// Line formats treat any line whose first token fails this check as a
/// comment or header line.
pub fn is_numeric_token(token: &[u8]) -> bool {
    let result: IResult<&[u8], &[u8]> =
        terminated(alt((decimal_number, special_number)), eof)(token);
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_f64() {
        assert_relative_eq!(parse_f64(b"3.25").unwrap(), 3.25);
        assert_relative_eq!(parse_f64(b"-1.5E-3").unwrap(), -1.5e-3);
        assert_relative_eq!(parse_f64(b"42").unwrap(), 42.0);
        assert!(parse_f64(b"12abc").is_none());
        assert!(parse_f64(b"").is_none());
    }

    #[test]
    fn test_parse_finite_rejects_infinity() {
        assert!(parse_finite_f64(b"inf").is_none());
        assert!(parse_finite_f64(b"nan").is_none());
        assert_relative_eq!(parse_finite_f64(b"7.0").unwrap(), 7.0);
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_i64(b"-17"), Some(-17));
        assert_eq!(parse_i64(b"1.0"), None);
        assert_eq!(parse_u32(b"4000000000"), Some(4_000_000_000));
        assert_eq!(parse_u32(b"-1"), None);
    }

    #[test]
    fn test_parse_grid_index_accepts_integral_floats() {
        assert_eq!(parse_grid_index(b"12"), Some(12));
        assert_eq!(parse_grid_index(b"12.0"), Some(12));
        assert_eq!(parse_grid_index(b"12.5"), None);
        assert_eq!(parse_grid_index(b"x"), None);
    }

    #[test]
    fn test_parse_into_leaves_value_on_failure() {
        let mut value = 9.0;
        assert!(!parse_f64_into(b"abc", &mut value));
        assert_relative_eq!(value, 9.0);
        assert!(parse_f64_into(b"2.5", &mut value));
        assert_relative_eq!(value, 2.5);
    }

    #[test]
    fn test_nan_literals() {
        for token in [&b"nan"[..], b"NaN", b"NAN"] {
            assert!(parse_f64_or_nan(token).unwrap().is_nan());
        }
        assert!(matches!(
            parse_f64_or_nan(b"missing"),
            Err(Error::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_out_of_range_values_are_invalid() {
        for token in [&b"1e400"[..], b"-1e400", b"1e309"] {
            assert!(matches!(
                parse_f64_or_nan(token),
                Err(Error::InvalidNumber { .. })
            ));
        }
        assert!(parse_f64_list(b"0.5 1e400 2").is_err());

        for token in [&b"inf"[..], b"-inf", b"+Infinity", b"INF"] {
            assert!(parse_f64_or_nan(token).unwrap().is_infinite());
        }
        assert_relative_eq!(parse_f64_or_nan(b"1e300").unwrap(), 1e300);
    }

    #[test]
    fn test_parse_lists() {
        let values = parse_f64_list(b"  1.0 2\n -3.5e1\tNaN ").unwrap();
        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[2], -35.0);
        assert!(values[3].is_nan());

        assert_eq!(parse_u32_list(b"0 1 2\n3 4 5").unwrap(), vec![0, 1, 2, 3, 4, 5]);
        assert!(parse_u32_list(b"0 1 x").is_err());
        assert!(parse_f64_list(b"1.0 oops").is_err());
    }

    #[test]
    fn test_is_numeric_token() {
        assert!(is_numeric_token(b"12"));
        assert!(is_numeric_token(b"-12.5"));
        assert!(is_numeric_token(b"+.5"));
        assert!(is_numeric_token(b"7."));
        assert!(is_numeric_token(b"1.5E-10"));
        assert!(is_numeric_token(b"inf"));
        assert!(!is_numeric_token(b"#"));
        assert!(!is_numeric_token(b"X"));
        assert!(!is_numeric_token(b"12m"));
        assert!(!is_numeric_token(b"-"));
        assert!(!is_numeric_token(b""));
    }
}
