use crate::{error, util::escape::Byte};

/// Context for errors that occur while formatting or parsing.
#[derive(Clone, Debug)]
pub(crate) enum Error {
    FailedFormat { kind: &'static str },
    FailedParse { input: Box<str> },
    FailedPattern { pattern: Box<str> },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Fmt(err).into()
    }
}

impl error::IntoError for Error {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::Error::*;

        match *self {
            FailedFormat { kind } => write!(f, "failed to format {kind}"),
            FailedParse { ref input } => {
                write!(f, "failed to parse {input:?}")
            }
            FailedPattern { ref pattern } => {
                write!(f, "invalid pattern {pattern:?}")
            }
        }
    }
}

/// An error found while compiling a pattern.
#[derive(Clone, Debug)]
pub(crate) enum PatternError {
    UnclosedQuote { position: usize },
    UnknownField { letter: u8, position: usize },
    UnsupportedWidth { letter: u8, width: usize, position: usize },
}

impl From<PatternError> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: PatternError) -> error::Error {
        error::ErrorKind::FmtPattern(err).into()
    }
}

impl error::IntoError for PatternError {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for PatternError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::PatternError::*;

        match *self {
            UnclosedQuote { position } => write!(
                f,
                "quoted literal starting at position {position} \
                 is never closed",
            ),
            UnknownField { letter, position } => write!(
                f,
                "illegal pattern character {letter:?} at position \
                 {position} (quote it to use it as a literal)",
                letter = Byte(letter),
            ),
            UnsupportedWidth { letter, width, position } => write!(
                f,
                "pattern field {letter:?} at position {position} \
                 cannot be {width} letters wide",
                letter = Byte(letter),
            ),
        }
    }
}

/// An error found while parsing input against a compiled pattern.
#[derive(Clone, Debug)]
pub(crate) enum ParseError {
    ExpectedLiteral { expected: Box<str>, position: usize, rest: Box<str> },
    ExpectedName { field: &'static str, position: usize, rest: Box<str> },
    ExpectedNumber { field: &'static str, position: usize, rest: Box<str> },
    ExpectedOffset { position: usize, rest: Box<str> },
    UnconsumedInput { position: usize, rest: Box<str> },
    ZoneNameUnsupported { position: usize },
}

impl From<ParseError> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: ParseError) -> error::Error {
        error::ErrorKind::FmtParse(err).into()
    }
}

impl error::IntoError for ParseError {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ParseError::*;

        match *self {
            ExpectedLiteral { ref expected, position, ref rest } => write!(
                f,
                "expected {expected:?} at position {position}, \
                 but found {rest:?}",
            ),
            ExpectedName { field, position, ref rest } => write!(
                f,
                "expected {field} name at position {position}, \
                 but found {rest:?}",
            ),
            ExpectedNumber { field, position, ref rest } => write!(
                f,
                "expected {field} digits at position {position}, \
                 but found {rest:?}",
            ),
            ExpectedOffset { position, ref rest } => write!(
                f,
                "expected a UTC offset like +0100 at position {position}, \
                 but found {rest:?}",
            ),
            UnconsumedInput { position, ref rest } => write!(
                f,
                "parsed all pattern fields, but found unconsumed \
                 input {rest:?} at position {position}",
            ),
            ZoneNameUnsupported { position } => write!(
                f,
                "time zone names cannot be parsed (at position {position}), \
                 use an offset field instead",
            ),
        }
    }
}
