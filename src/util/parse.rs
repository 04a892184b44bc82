use crate::{
    error::{
        util::{CompoundError, ParseIntError},
        ErrorContext,
    },
    util::escape,
    Error,
};

/// Parses an `i64` number from the beginning to the end of the given slice of
/// ASCII digit characters.
///
/// If any byte in the given slice is not `[0-9]`, then this returns an error.
/// Similarly, if the number parsed does not fit into a `i64`, then this
/// returns an error. Notably, this routine does not permit parsing a negative
/// integer. (We use signed integers because they are generally easier to
/// reason about.)
#[inline(always)]
pub(crate) fn i64(bytes: &[u8]) -> Result<i64, ParseIntError> {
    if bytes.is_empty() {
        return Err(ParseIntError::NoDigitsFound);
    }
    let mut n: i64 = 0;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(ParseIntError::InvalidDigit(byte));
        }
        let digit = i64::from(byte - b'0');
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add(digit))
            .ok_or(ParseIntError::TooBig)?;
    }
    Ok(n)
}

/// Parses a signed `i64` from a slice of ASCII digits.
///
/// Negative numbers are accumulated below zero, so `i64::MIN` parses even
/// though its magnitude does not fit in an `i64`.
#[inline(always)]
pub(crate) fn signed_i64(
    bytes: &[u8],
    negative: bool,
) -> Result<i64, ParseIntError> {
    if !negative {
        return i64(bytes);
    }
    if bytes.is_empty() {
        return Err(ParseIntError::NoDigitsFound);
    }
    let mut n: i64 = 0;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(ParseIntError::InvalidDigit(byte));
        }
        let digit = i64::from(byte - b'0');
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_sub(digit))
            .ok_or(ParseIntError::TooBig)?;
    }
    Ok(n)
}

/// A single `<quantity><unit>` pair found in compound text like `3d-12h`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Pair<'i> {
    /// The signed quantity.
    pub(crate) quantity: i64,
    /// The unit text, exactly as written. Callers compare it without
    /// regard to ASCII case.
    pub(crate) unit: &'i str,
    /// The byte offset of the unit text in the input.
    pub(crate) unit_position: usize,
}

/// Splits compound text into its `<quantity><unit>` pairs.
///
/// The grammar is `(-?[0-9]+[A-Za-z]+)+` with no separators. The whole input
/// is checked against a whitelist of characters before any pair is
/// produced, so the first error reported for text like `3d,12h` is the
/// offending comma.
///
/// The `what` label is used in error messages (e.g., "duration").
pub(crate) fn pairs<'i>(
    what: &'static str,
    input: &'i str,
) -> Result<Vec<Pair<'i>>, Error> {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return Err(CompoundError::Empty { what }.into());
    }
    if let Some(position) = bytes
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-'))
    {
        return Err(CompoundError::InvalidCharacter {
            what,
            position,
            found: bytes[position],
        }
        .into());
    }

    let mut pairs = vec![];
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        let negative = bytes[pos] == b'-';
        if negative {
            pos += 1;
        }
        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if digits_start == pos {
            return Err(CompoundError::ExpectedQuantity {
                what,
                position: start,
                rest: escape::rest(input, start),
            }
            .into());
        }
        let quantity = signed_i64(&bytes[digits_start..pos], negative)
            .with_context(|| CompoundError::ExpectedQuantity {
                what,
                position: start,
                rest: escape::rest(input, start),
            })?;

        let unit_position = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if unit_position == pos {
            return Err(CompoundError::ExpectedUnit {
                what,
                position: unit_position,
            }
            .into());
        }
        // OK because every byte in the input was checked to be ASCII above.
        let unit = &input[unit_position..pos];
        pairs.push(Pair { quantity, unit, unit_position });
    }
    Ok(pairs)
}
