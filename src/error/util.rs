use crate::{error, util::escape::Byte};

#[derive(Clone, Debug)]
pub(crate) enum ParseIntError {
    NoDigitsFound,
    InvalidDigit(u8),
    TooBig,
}

impl From<ParseIntError> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: ParseIntError) -> error::Error {
        error::ErrorKind::ParseInt(err).into()
    }
}

impl error::IntoError for ParseIntError {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for ParseIntError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ParseIntError::*;

        match *self {
            NoDigitsFound => write!(f, "invalid number, no digits found"),
            InvalidDigit(got) => {
                write!(f, "invalid digit, expected 0-9 but got {}", Byte(got))
            }
            TooBig => {
                write!(f, "number too big to parse into 64-bit integer")
            }
        }
    }
}

/// An error found while scanning compound `<quantity><unit>` text, like
/// `3d12h` or `1y2m`.
///
/// `what` names the thing being parsed (e.g., "duration" or "tenor"), and
/// every `position` is a byte offset into the original input.
#[derive(Clone, Debug)]
pub(crate) enum CompoundError {
    Empty { what: &'static str },
    InvalidCharacter { what: &'static str, position: usize, found: u8 },
    ExpectedQuantity { what: &'static str, position: usize, rest: Box<str> },
    ExpectedUnit { what: &'static str, position: usize },
}

impl From<CompoundError> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: CompoundError) -> error::Error {
        error::ErrorKind::Compound(err).into()
    }
}

impl error::IntoError for CompoundError {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for CompoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::CompoundError::*;

        match *self {
            Empty { what } => write!(
                f,
                "failed to parse {what}: expected at least one \
                 quantity and unit pair, but found empty input",
            ),
            InvalidCharacter { what, position, found } => write!(
                f,
                "failed to parse {what}: found invalid character {found:?} \
                 at position {position}",
                found = Byte(found),
            ),
            ExpectedQuantity { what, position, ref rest } => write!(
                f,
                "failed to parse {what}: expected a signed integer \
                 quantity at position {position}, but found {rest:?}",
            ),
            ExpectedUnit { what, position } => write!(
                f,
                "failed to parse {what}: expected a unit \
                 after the quantity at position {position}",
            ),
        }
    }
}
