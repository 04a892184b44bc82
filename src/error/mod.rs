use std::sync::Arc;

pub(crate) mod arith;
pub(crate) mod business;
pub(crate) mod cache;
pub(crate) mod engine;
pub(crate) mod fmt;
pub(crate) mod tenor;
pub(crate) mod unit;
pub(crate) mod util;

/// An error that can occur in this crate.
///
/// The most common type of error is a result of a value falling outside
/// of its supported range. But other errors exist as well:
///
/// * Parse errors, for durations, tenors, patterns, pattern input and
/// holiday records.
/// * Configuration problems, such as an unknown time zone identifier or a
/// missing holiday table.
/// * Illegal units, such as a duplicate unit in a tenor or a date unit
/// given to time-of-day arithmetic.
///
/// # Introspection is limited
///
/// Other than implementing the [`std::error::Error`] trait, the
/// [`core::fmt::Debug`] trait and the [`core::fmt::Display`] trait, this
/// error type provides a handful of predicates for classification:
/// [`Error::is_range`], [`Error::is_parse`], [`Error::is_configuration`]
/// and [`Error::is_illegal_unit`]. The predicates always consult the root
/// cause of an error, so adding context never changes how it is classified.
///
/// # Design
///
/// There is only one error type for every fallible operation in this crate.
/// Errors are cheap to clone and are one word in size. Each error may carry
/// a chain of causes, which is rendered by the `Display` impl with each
/// link separated by `: `.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// This is in an `Arc` to make an `Error` cloneable. It embeds things
    /// like `std::io::Error` which aren't.
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// This is useful for implementations of [`CalendarEngine`] or
    /// [`HolidaySource`] outside of this crate that need to report a failure
    /// with a custom message.
    ///
    /// [`CalendarEngine`]: crate::engine::CalendarEngine
    /// [`HolidaySource`]: crate::business::HolidaySource
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::Error;
    ///
    /// let err = Error::from_args(format_args!("something failed"));
    /// assert_eq!(err.to_string(), "something failed");
    /// ```
    pub fn from_args<'a>(message: core::fmt::Arguments<'a>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Creates a new error for a time zone identifier that couldn't be
    /// resolved.
    ///
    /// This is meant for implementations of [`CalendarEngine`] outside of
    /// this crate. The error returned reports true for
    /// [`Error::is_configuration`].
    ///
    /// [`CalendarEngine`]: crate::engine::CalendarEngine
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::Error;
    ///
    /// let err = Error::unknown_time_zone("Mars/Olympus_Mons", "no such zone");
    /// assert!(err.is_configuration());
    /// assert_eq!(
    ///     err.to_string(),
    ///     "unknown time zone identifier \"Mars/Olympus_Mons\": no such zone",
    /// );
    /// ```
    pub fn unknown_time_zone(
        name: &str,
        reason: impl core::fmt::Display,
    ) -> Error {
        Error::from(self::engine::Error::UnknownTimeZone {
            name: name.into(),
            reason: reason.to_string().into_boxed_str(),
        })
    }

    /// Returns true when this error originated as a result of a value being
    /// out of its supported range.
    ///
    /// This includes arithmetic overflow and queries against a business
    /// calendar that fall outside of its holiday table.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::NanoDateTime;
    ///
    /// assert!(NanoDateTime::from_nanoseconds(i64::MIN).unwrap_err().is_range());
    /// ```
    pub fn is_range(&self) -> bool {
        use self::ErrorKind::*;
        use self::{arith::Error as ArithError, business::Error as BizError};

        matches!(
            *self.root().kind(),
            Range(_)
                | SlimRange(_)
                | Arith(ArithError::Overflow { .. })
                | Business(
                    BizError::OutsideTable { .. }
                        | BizError::ScanLimit { .. }
                )
                | Engine(
                    self::engine::Error::InvalidFields { .. }
                        | self::engine::Error::Calendar { .. }
                )
                | Jiff(_)
        )
    }

    /// Returns true when this error originated from malformed text.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{NanoTimeDelta, Tenor};
    ///
    /// assert!("3d12x".parse::<NanoTimeDelta>().unwrap_err().is_parse());
    /// assert!("1y1y".parse::<Tenor>().unwrap_err().is_parse());
    /// ```
    pub fn is_parse(&self) -> bool {
        use self::ErrorKind::*;

        matches!(
            *self.root().kind(),
            Compound(_)
                | FmtPattern(_)
                | FmtParse(_)
                | ParseInt(_)
                | Unit(self::unit::Error::UnknownAlias { .. })
                | Tenor(_)
                | Business(self::business::Error::MalformedRecord { .. })
        )
    }

    /// Returns true when this error originated from invalid configuration.
    ///
    /// This includes unknown time zone identifiers and missing or unreadable
    /// holiday data.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::ZonedNanoDate;
    ///
    /// let err = ZonedNanoDate::from_nanoseconds("Mars/Olympus_Mons", 0);
    /// assert!(err.unwrap_err().is_configuration());
    /// ```
    pub fn is_configuration(&self) -> bool {
        use self::ErrorKind::*;
        use self::{business::Error as BizError, engine::Error as EngineError};

        matches!(
            *self.root().kind(),
            Cache(_)
                | IO(_)
                | Engine(EngineError::UnknownTimeZone { .. })
                | Business(
                    BizError::EmptyTable { .. }
                        | BizError::NoSourceDirectory { .. }
                )
        )
    }

    /// Returns true when this error originated from a unit that isn't
    /// allowed in the requested operation.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{arith, NanoTime, TemporalUnit};
    ///
    /// let t = NanoTime::midday();
    /// let err = arith::plus_calendar_unit(&t, TemporalUnit::Day, 1);
    /// assert!(err.unwrap_err().is_illegal_unit());
    /// ```
    pub fn is_illegal_unit(&self) -> bool {
        use self::ErrorKind::*;

        matches!(
            *self.root().kind(),
            Tenor(self::tenor::Error::DuplicateUnit { .. })
                | Arith(self::arith::Error::UnsupportedTimeUnit { .. })
        )
    }
}

impl Error {
    /// Creates a new error indicating that a `given` value is out of the
    /// specified `min..=max` range. The given `what` label is used in the
    /// error message as a human readable description of what exactly is out
    /// of range. (e.g., "month")
    #[inline(never)]
    #[cold]
    pub(crate) fn range(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> Error {
        Error::from(ErrorKind::Range(RangeError::new(what, given, min, max)))
    }

    /// Creates a new error indicating that a `given` value is out of the
    /// allowed range, without saying what the value or range are.
    ///
    /// This is used when the value couldn't be represented in the first
    /// place, e.g., when a sum overflows.
    #[inline(never)]
    #[cold]
    pub(crate) fn slim_range(what: &'static str) -> Error {
        Error::from(ErrorKind::SlimRange(SlimRangeError { what }))
    }

    /// Wraps an error reported by the `jiff` crate.
    #[inline(never)]
    #[cold]
    pub(crate) fn jiff(err: jiff::Error) -> Error {
        Error::from(ErrorKind::Jiff(err))
    }

    /// A convenience constructor for building an I/O error.
    ///
    /// Callers should always attach some kind of context to this error
    /// (like a file path).
    #[inline(never)]
    #[cold]
    pub(crate) fn io(err: std::io::Error) -> Error {
        Error::from(ErrorKind::IO(IOError { err }))
    }

    /// Contextualizes this error by associating the given file path with it.
    #[inline(never)]
    #[cold]
    pub(crate) fn path(self, path: impl Into<std::path::PathBuf>) -> Error {
        let err = Error::from(ErrorKind::FilePath(FilePathError {
            path: path.into(),
        }));
        self.context(err)
    }

    #[inline(always)]
    pub(crate) fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        let inner = match err.inner {
            Some(ref mut inner) => inner,
            None => {
                err = Error::from(ErrorKind::Unknown);
                // Just created above, so this always matches.
                match err.inner {
                    Some(ref mut inner) => inner,
                    None => return self,
                }
            }
        };
        // A freshly created consequent has exactly one reference. If it
        // has been shared already, the cause is attached to a new copy.
        match Arc::get_mut(inner) {
            Some(inner) if inner.cause.is_none() => {
                inner.cause = Some(self);
                err
            }
            _ => self,
        }
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        let mut err = self;
        while let Some(cause) =
            err.inner.as_ref().and_then(|inner| inner.cause.as_ref())
        {
            err = cause;
        }
        err
    }

    /// Returns a chain of error values.
    ///
    /// This starts with the most recent error added to the chain. That is,
    /// the highest level context. The last error in the chain is always the
    /// "root" cause.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f
                    .debug_struct("Error")
                    .field("kind", &"None")
                    .finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

/// The underlying kind of a [`Error`].
#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Arith(self::arith::Error),
    Business(self::business::Error),
    Cache(self::cache::Error),
    Compound(self::util::CompoundError),
    Engine(self::engine::Error),
    FilePath(FilePathError),
    Fmt(self::fmt::Error),
    FmtParse(self::fmt::ParseError),
    FmtPattern(self::fmt::PatternError),
    IO(IOError),
    Jiff(jiff::Error),
    ParseInt(self::util::ParseIntError),
    Range(RangeError),
    SlimRange(SlimRangeError),
    Tenor(self::tenor::Error),
    Unit(self::unit::Error),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            Adhoc(ref msg) => msg.fmt(f),
            Arith(ref err) => err.fmt(f),
            Business(ref err) => err.fmt(f),
            Cache(ref err) => err.fmt(f),
            Compound(ref err) => err.fmt(f),
            Engine(ref err) => err.fmt(f),
            FilePath(ref err) => err.fmt(f),
            Fmt(ref err) => err.fmt(f),
            FmtParse(ref err) => err.fmt(f),
            FmtPattern(ref err) => err.fmt(f),
            IO(ref err) => err.fmt(f),
            Jiff(ref err) => err.fmt(f),
            ParseInt(ref err) => err.fmt(f),
            Range(ref err) => err.fmt(f),
            SlimRange(ref err) => err.fmt(f),
            Tenor(ref err) => err.fmt(f),
            Unit(ref err) => err.fmt(f),
            Unknown => f.write_str("unknown nanotemporals error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Some(Arc::new(ErrorInner { kind, cause: None })) }
    }
}

/// A generic error message.
///
/// This supports the `Error::from_args` public API, which permits users to
/// manifest their own `Error` values from an arbitrary message.
struct AdhocError {
    message: Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        AdhocError { message: message.to_string().into_boxed_str() }
    }
}

impl std::error::Error for AdhocError {}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// An error that occurs when an input value is out of bounds.
///
/// The error message produced by this type will include a name describing
/// which input was out of bounds, the value given and its minimum and maximum
/// allowed values.
#[derive(Debug)]
struct RangeError {
    what: &'static str,
    given: i128,
    min: i128,
    max: i128,
}

impl RangeError {
    fn new(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> RangeError {
        RangeError { what, given: given.into(), min: min.into(), max: max.into() }
    }
}

impl std::error::Error for RangeError {}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let RangeError { what, given, min, max } = *self;
        write!(
            f,
            "parameter '{what}' with value {given} \
             is not in the required range of {min}..={max}",
        )
    }
}

/// A slim error that occurs when an input value is out of bounds.
#[derive(Clone, Debug)]
struct SlimRangeError {
    what: &'static str,
}

impl std::error::Error for SlimRangeError {}

impl core::fmt::Display for SlimRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let SlimRangeError { what } = *self;
        write!(f, "parameter '{what}' is not in the required range")
    }
}

/// A `std::io::Error`.
#[derive(Debug)]
struct IOError {
    err: std::io::Error,
}

impl std::error::Error for IOError {}

impl core::fmt::Display for IOError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.err)
    }
}

#[derive(Debug)]
struct FilePathError {
    path: std::path::PathBuf,
}

impl std::error::Error for FilePathError {}

impl core::fmt::Display for FilePathError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This trait basically exists to make `Error::context` work without needing
/// to rely on public `From` impls.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

impl IntoError for jiff::Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        Error::jiff(self)
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or `Result<T, Error>`.
/// Specifically, in the latter case, it absolves one of the need to call
/// `map_err` everywhere one wants to add context to an error.
pub(crate) trait ErrorContext<T, E> {
    /// Contextualize the given consequent error with this (`self`) error as
    /// the cause.
    ///
    /// This is equivalent to saying that "consequent is caused by self."
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure.
    ///
    /// This avoids paying the cost of building a contextual error (which
    /// may allocate) on the happy path.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: IntoError,
{
    #[inline(always)]
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent.into_error())
        })
    }

    #[inline(always)]
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The size of `Error` is one word. If this changes, it should be on
    // purpose since nearly every fallible routine returns it.
    #[test]
    fn error_size() {
        assert_eq!(
            core::mem::size_of::<usize>(),
            core::mem::size_of::<Error>()
        );
    }

    #[test]
    fn context_chain_renders_outermost_first() {
        let err = Error::slim_range("nanoseconds")
            .context(Error::from_args(format_args!("failed to add")));
        assert_eq!(
            err.to_string(),
            "failed to add: parameter 'nanoseconds' is not in the required range",
        );
        // Predicates look at the root cause.
        assert!(err.is_range());
        assert!(!err.is_parse());
    }

    #[test]
    fn result_context() {
        let result: Result<(), Error> =
            Err(Error::range("month", 13, 1, 12));
        let err = result
            .with_context(|| Error::from_args(format_args!("bad date")))
            .unwrap_err();
        insta::assert_snapshot!(
            err,
            @"bad date: parameter 'month' with value 13 is not in the required range of 1..=12"
        );
    }
}
