use crate::{
    error::ErrorContext,
    unit::TemporalUnit,
    util::parse,
    Error,
};

/// A signed, fixed-length duration with nanosecond precision.
///
/// A `NanoTimeDelta` is either the result of subtracting two points in time
/// (see [`arith::difference`](crate::arith::difference)) or is built
/// explicitly. It has no calendar component: a day is always exactly 24
/// hours. For calendar-relative periods like "1 month" or "3 business days",
/// use a [`Tenor`](crate::Tenor) instead.
///
/// Two values are reserved as sentinels. [`NanoTimeDelta::MAX`] means
/// "unbounded positive" and [`NanoTimeDelta::MIN`] means "unbounded
/// negative." Adding either to a point in time saturates to that point's
/// maximum or minimum value.
///
/// # Parsing
///
/// A duration can be parsed from one or more `<quantity><unit>` pairs
/// written with no separators. Units may be any of the aliases accepted by
/// [`TemporalUnit`], and repeated units are summed:
///
/// ```
/// use nanotemporals::{NanoTimeDelta, TemporalUnit};
///
/// let delta: NanoTimeDelta = "3d12h".parse()?;
/// assert_eq!(delta.to_whole_hours(), 84);
///
/// let delta: NanoTimeDelta = "1s-250ms1s".parse()?;
/// assert_eq!(delta.to_whole_milliseconds(), 1_750);
///
/// assert!("3 days".parse::<NanoTimeDelta>().is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NanoTimeDelta {
    nanoseconds: i64,
}

impl NanoTimeDelta {
    /// The "unbounded positive" sentinel.
    ///
    /// This is also the largest finite duration. A difference of exactly
    /// `i64::MAX` nanoseconds, such as the one between
    /// `NanoDateTime::from_nanoseconds(0)` and [`NanoDateTime::max`], is
    /// equal to this sentinel and [`NanoTimeDelta::is_unbounded`] reports it
    /// as unbounded.
    ///
    /// [`NanoDateTime::max`]: crate::NanoDateTime::max
    pub const MAX: NanoTimeDelta = NanoTimeDelta { nanoseconds: i64::MAX };
    /// The "unbounded negative" sentinel.
    ///
    /// Like [`NanoTimeDelta::MAX`], a finite duration of exactly `i64::MIN`
    /// nanoseconds can't be told apart from it.
    pub const MIN: NanoTimeDelta = NanoTimeDelta { nanoseconds: i64::MIN };
    /// A zero length duration.
    pub const ZERO: NanoTimeDelta = NanoTimeDelta { nanoseconds: 0 };

    /// Creates a duration from a count of nanoseconds.
    #[inline]
    pub const fn from_nanoseconds(nanoseconds: i64) -> NanoTimeDelta {
        NanoTimeDelta { nanoseconds }
    }

    /// Creates a duration from a count of microseconds.
    ///
    /// This returns an error if the duration overflows a 64-bit count of
    /// nanoseconds.
    pub fn from_microseconds(microseconds: i64) -> Result<NanoTimeDelta, Error> {
        NanoTimeDelta::new(TemporalUnit::Microsecond, microseconds)
    }

    /// Creates a duration from a count of milliseconds.
    ///
    /// This returns an error if the duration overflows a 64-bit count of
    /// nanoseconds.
    pub fn from_milliseconds(milliseconds: i64) -> Result<NanoTimeDelta, Error> {
        NanoTimeDelta::new(TemporalUnit::Millisecond, milliseconds)
    }

    /// Creates a duration from a count of seconds.
    ///
    /// This returns an error if the duration overflows a 64-bit count of
    /// nanoseconds.
    pub fn from_seconds(seconds: i64) -> Result<NanoTimeDelta, Error> {
        NanoTimeDelta::new(TemporalUnit::Second, seconds)
    }

    /// Creates a duration `length` units long.
    ///
    /// # Errors
    ///
    /// This returns an error if the duration overflows a 64-bit count of
    /// nanoseconds.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{NanoTimeDelta, TemporalUnit};
    ///
    /// let delta = NanoTimeDelta::new(TemporalUnit::Minute, 90)?;
    /// assert_eq!(delta.to_whole_hours(), 1);
    /// assert_eq!(delta.total(TemporalUnit::Hour), 1.5);
    ///
    /// assert!(NanoTimeDelta::new(TemporalUnit::Day, 200_000).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(unit: TemporalUnit, length: i64) -> Result<NanoTimeDelta, Error> {
        length
            .checked_mul(unit.nanoseconds())
            .map(NanoTimeDelta::from_nanoseconds)
            .ok_or_else(|| Error::slim_range(unit.plural()))
    }

    /// Returns a builder for summing several `(unit, length)` pairs.
    pub fn builder() -> NanoTimeDeltaBuilder {
        NanoTimeDeltaBuilder::default()
    }

    /// Parses a duration from compound text such as `3d12h`.
    ///
    /// This is the same as using this type's `FromStr` impl.
    pub fn parse(text: &str) -> Result<NanoTimeDelta, Error> {
        let pairs = parse::pairs("duration", text)?;
        // Every pair is resolved before anything is summed, so that an
        // unknown unit is reported in preference to an overflow.
        let mut units = Vec::with_capacity(pairs.len());
        for pair in pairs.iter() {
            let unit = TemporalUnit::from_alias(pair.unit).with_context(|| {
                Error::from_args(format_args!(
                    "failed to parse duration {text:?} at position {}",
                    pair.unit_position,
                ))
            })?;
            units.push(unit);
        }
        let mut builder = NanoTimeDelta::builder();
        for (pair, unit) in pairs.iter().zip(units) {
            builder = builder.add(unit, pair.quantity);
        }
        builder.build().with_context(|| {
            Error::from_args(format_args!("failed to parse duration {text:?}"))
        })
    }

    /// Returns true if this duration is strictly greater than zero.
    pub fn is_positive(self) -> bool {
        self.nanoseconds > 0
    }

    /// Returns true if this duration is strictly less than zero.
    pub fn is_negative(self) -> bool {
        self.nanoseconds < 0
    }

    /// Returns true if this duration is one of the unbounded sentinels,
    /// [`NanoTimeDelta::MAX`] or [`NanoTimeDelta::MIN`].
    pub fn is_unbounded(self) -> bool {
        self == NanoTimeDelta::MAX || self == NanoTimeDelta::MIN
    }

    /// Returns the number of whole `unit`s in this duration, truncating
    /// toward zero.
    pub fn whole(self, unit: TemporalUnit) -> i64 {
        self.nanoseconds / unit.nanoseconds()
    }

    /// Returns the length of this duration in `unit`s as a floating point
    /// number.
    ///
    /// The integral and fractional parts are converted separately, so that
    /// durations longer than 2^53 nanoseconds don't lose their sub-unit
    /// precision in the intermediate result.
    pub fn total(self, unit: TemporalUnit) -> f64 {
        let per = unit.nanoseconds();
        let whole = self.nanoseconds / per;
        let rem = self.nanoseconds % per;
        whole as f64 + (rem as f64 / per as f64)
    }

    pub fn to_whole_nanoseconds(self) -> i64 {
        self.nanoseconds
    }

    pub fn to_whole_microseconds(self) -> i64 {
        self.whole(TemporalUnit::Microsecond)
    }

    pub fn to_whole_milliseconds(self) -> i64 {
        self.whole(TemporalUnit::Millisecond)
    }

    pub fn to_whole_seconds(self) -> i64 {
        self.whole(TemporalUnit::Second)
    }

    pub fn to_whole_minutes(self) -> i64 {
        self.whole(TemporalUnit::Minute)
    }

    pub fn to_whole_hours(self) -> i64 {
        self.whole(TemporalUnit::Hour)
    }

    pub fn to_whole_days(self) -> i64 {
        self.whole(TemporalUnit::Day)
    }
}

impl core::fmt::Debug for NanoTimeDelta {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

/// Renders the duration as a count of nanoseconds, e.g., `1500ns`.
///
/// The output can be parsed back with this type's `FromStr` impl.
impl core::fmt::Display for NanoTimeDelta {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}ns", self.nanoseconds)
    }
}

impl core::str::FromStr for NanoTimeDelta {
    type Err = Error;

    fn from_str(s: &str) -> Result<NanoTimeDelta, Error> {
        NanoTimeDelta::parse(s)
    }
}

impl From<NanoTimeDelta> for i64 {
    fn from(delta: NanoTimeDelta) -> i64 {
        delta.nanoseconds
    }
}

/// A builder for a [`NanoTimeDelta`] made of several `(unit, length)`
/// pairs.
///
/// Every pair is summed. Overflow is only reported when the duration is
/// built.
///
/// # Example
///
/// ```
/// use nanotemporals::{NanoTimeDelta, TemporalUnit};
///
/// let delta = NanoTimeDelta::builder()
///     .add(TemporalUnit::Hour, 1)
///     .add(TemporalUnit::Minute, 30)
///     .add(TemporalUnit::Minute, -15)
///     .build()?;
/// assert_eq!(delta.to_whole_minutes(), 75);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct NanoTimeDeltaBuilder {
    // Wider than the result, so that intermediate sums can't overflow for
    // any realistic number of pairs.
    nanoseconds: i128,
    overflowed: Option<TemporalUnit>,
}

impl NanoTimeDeltaBuilder {
    /// Adds `length` of `unit` to the duration being built.
    pub fn add(mut self, unit: TemporalUnit, length: i64) -> NanoTimeDeltaBuilder {
        let product = i128::from(length) * i128::from(unit.nanoseconds());
        match self.nanoseconds.checked_add(product) {
            Some(sum) => self.nanoseconds = sum,
            None => self.overflowed = Some(unit),
        }
        self
    }

    /// Builds the duration.
    ///
    /// This returns an error if the sum doesn't fit in a 64-bit count of
    /// nanoseconds.
    pub fn build(&self) -> Result<NanoTimeDelta, Error> {
        if let Some(unit) = self.overflowed {
            return Err(Error::slim_range(unit.plural()));
        }
        i64::try_from(self.nanoseconds)
            .map(NanoTimeDelta::from_nanoseconds)
            .map_err(|_| {
                Error::range(
                    "duration nanoseconds",
                    self.nanoseconds,
                    i64::MIN,
                    i64::MAX,
                )
            })
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for NanoTimeDelta {
    fn arbitrary(g: &mut quickcheck::Gen) -> NanoTimeDelta {
        NanoTimeDelta::from_nanoseconds(
            <i64 as quickcheck::Arbitrary>::arbitrary(g),
        )
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = NanoTimeDelta>> {
        Box::new(
            quickcheck::Arbitrary::shrink(&self.nanoseconds)
                .map(NanoTimeDelta::from_nanoseconds),
        )
    }
}
