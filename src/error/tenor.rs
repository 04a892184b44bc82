use crate::{error, tenor::TenorUnit, util::escape::Byte};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    DuplicateUnit { unit: TenorUnit, position: usize },
    UnknownUnit { found: u8, position: usize },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Tenor(err).into()
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
            DuplicateUnit { unit, position } => write!(
                f,
                "failed to parse tenor: unit '{unit}' at position \
                 {position} was already given earlier in the tenor \
                 (each unit may appear at most once)",
                unit = unit.as_char(),
            ),
            UnknownUnit { found, position } => write!(
                f,
                "failed to parse tenor: found unrecognized unit {found:?} \
                 at position {position} (expected one of b, d, w, m or y)",
                found = Byte(found),
            ),
        }
    }
}
