use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    AlreadyInitialized,
    ZeroCapacity,
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Cache(err).into()
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
            AlreadyInitialized => f.write_str(
                "global memoization caches have already been initialized \
                 and can no longer be reconfigured",
            ),
            ZeroCapacity => f.write_str(
                "memoization cache capacity must be greater than zero",
            ),
        }
    }
}
