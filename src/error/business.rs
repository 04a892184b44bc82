use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    EmptyTable { time_zone: Box<str> },
    FailedLoad { time_zone: Box<str> },
    MalformedRecord { line: usize, reason: &'static str, text: Box<str> },
    NoSourceDirectory { var: &'static str },
    OutsideTable { date: Box<str>, first: Box<str>, last: Box<str> },
    ScanLimit { operation: &'static str, limit: i64 },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Business(err).into()
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
            EmptyTable { ref time_zone } => write!(
                f,
                "holiday source for time zone {time_zone:?} \
                 produced no holidays",
            ),
            FailedLoad { ref time_zone } => write!(
                f,
                "failed to load business calendar for time zone \
                 {time_zone:?}",
            ),
            MalformedRecord { line, reason, ref text } => write!(
                f,
                "malformed holiday record on line {line} ({reason}): \
                 {text:?}",
            ),
            NoSourceDirectory { var } => write!(
                f,
                "no holiday data directory found (set {var} to a \
                 directory containing <time-zone>.csv files)",
            ),
            OutsideTable { ref date, ref first, ref last } => write!(
                f,
                "date {date} is outside the holiday table, \
                 which covers {first} through {last}",
            ),
            ScanLimit { operation, limit } => write!(
                f,
                "gave up searching for {operation} after {limit} days",
            ),
        }
    }
}
