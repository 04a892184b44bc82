use crate::{engine::CivilFields, error};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    Calendar { operation: &'static str, time_zone: Box<str>, reason: Box<str> },
    InvalidFields { fields: CivilFields, reason: Box<str> },
    UnknownTimeZone { name: Box<str>, reason: Box<str> },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Engine(err).into()
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
            Calendar { operation, ref time_zone, ref reason } => write!(
                f,
                "calendar engine failed to {operation} \
                 in time zone {time_zone:?}: {reason}",
            ),
            InvalidFields { ref fields, ref reason } => write!(
                f,
                "invalid calendar fields {fields}: {reason}",
            ),
            UnknownTimeZone { ref name, ref reason } => write!(
                f,
                "unknown time zone identifier {name:?}: {reason}",
            ),
        }
    }
}
