use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    UnknownAlias { alias: Box<str> },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Unit(err).into()
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
            UnknownAlias { ref alias } => write!(
                f,
                "unrecognized temporal unit {alias:?} (expected one of \
                 ns, us, ms, s, m, h or d, or one of their long forms)",
            ),
        }
    }
}
