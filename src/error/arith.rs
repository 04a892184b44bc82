use crate::{error, unit::TemporalUnit};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    Overflow { operation: &'static str },
    UnsupportedTimeUnit { unit: TemporalUnit },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Arith(err).into()
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
            Overflow { operation } => write!(
                f,
                "{operation} overflowed the range of a \
                 64-bit nanosecond count",
            ),
            UnsupportedTimeUnit { unit } => write!(
                f,
                "calendar arithmetic on a time of day only supports \
                 hours, minutes, seconds and milliseconds, \
                 but got {unit}",
                unit = unit.plural(),
            ),
        }
    }
}
