use std::sync::{Arc, OnceLock};

use crate::{
    arith::{self, sealed, Point},
    cache::Cache,
    civil::{self, Interned},
    engine::{CalendarEngine, UTC},
    fmt::{NanoDateTimeFormat, DEFAULT_TIME_PATTERN},
    unit::TemporalUnit,
    util::{b, civil::Hms},
    Error,
};

/// A time of day with nanosecond precision.
///
/// A `NanoTime` is a count of nanoseconds since midnight. Its range is
/// `00:00:00.000000000` through [`NanoTime::midnight_next_day`], which is
/// the end of the day and is only ever produced explicitly or by arithmetic
/// that lands on it exactly.
///
/// # Arithmetic
///
/// Arithmetic wraps around the clock, the way a wall clock does:
///
/// ```
/// use nanotemporals::{arith, NanoTime};
///
/// let t = NanoTime::parse("22:30:00.000")?;
/// assert_eq!(arith::plus_hours(&t, 3)?.to_string(), "01:30:00.000000000");
/// assert_eq!(arith::plus_minutes(&t, 90)?, NanoTime::midnight_next_day());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Interning
///
/// Values are interned. Two values built from the same count of
/// nanoseconds are usually the same instance, which [`NanoTime::ptr_eq`]
/// reports. Equality never depends on this.
#[derive(Clone)]
pub struct NanoTime {
    inner: Arc<Interned>,
}

impl NanoTime {
    /// Creates a time from nanoseconds since midnight.
    ///
    /// This returns a range error when `nanoseconds` is negative or greater
    /// than the number of nanoseconds in a day.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::NanoTime;
    ///
    /// let t = NanoTime::from_nanoseconds(67_507_345_920_678)?;
    /// assert_eq!(t.to_string(), "18:45:07.345920678");
    /// assert!(NanoTime::from_nanoseconds(-1).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_nanoseconds(nanoseconds: i64) -> Result<NanoTime, Error> {
        let nanoseconds = b::NanosecondsSinceMidnight::check(nanoseconds)?;
        Ok(NanoTime::intern(nanoseconds))
    }

    /// Creates a time from milliseconds since midnight.
    pub fn from_milliseconds(milliseconds: i64) -> Result<NanoTime, Error> {
        let nanoseconds = milliseconds
            .checked_mul(b::NANOS_PER_MILLI)
            .ok_or_else(|| Error::slim_range("milliseconds since midnight"))?;
        NanoTime::from_nanoseconds(nanoseconds)
    }

    /// Returns the interned time for an already validated count.
    pub(crate) fn intern(nanoseconds: i64) -> NanoTime {
        fn cache() -> &'static Cache<i64, NanoTime> {
            static CACHE: OnceLock<Cache<i64, NanoTime>> = OnceLock::new();
            CACHE.get_or_init(Cache::global)
        }

        debug_assert!((0..=b::NANOS_PER_DAY).contains(&nanoseconds));
        cache().get_or_insert_with(nanoseconds, || NanoTime {
            inner: Arc::new(Interned::new(nanoseconds)),
        })
    }

    /// Returns `00:00:00.000000000`.
    pub fn midnight() -> NanoTime {
        NanoTime::intern(0)
    }

    /// Returns `12:00:00.000000000`.
    pub fn midday() -> NanoTime {
        NanoTime::intern(12 * b::NANOS_PER_HOUR)
    }

    /// Returns the end of the day, which renders as `24:00:00.000000000`.
    pub fn midnight_next_day() -> NanoTime {
        NanoTime::intern(b::NANOS_PER_DAY)
    }

    /// Returns a builder for a time from its clock fields.
    pub fn builder() -> NanoTimeBuilder {
        NanoTimeBuilder::default()
    }

    /// Parses a time with the default pattern, `HH:mm:ss.SSS`.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::NanoTime;
    ///
    /// let t = NanoTime::parse("09:05:00.250")?;
    /// assert_eq!(t.milliseconds_since_midnight(), 32_700_250);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(text: &str) -> Result<NanoTime, Error> {
        NanoTime::parse_with_pattern(DEFAULT_TIME_PATTERN, text)
    }

    /// Parses a time with the given pattern, read in UTC.
    ///
    /// When the pattern also has date fields, only the time of day is
    /// kept.
    pub fn parse_with_pattern(
        pattern: &str,
        text: &str,
    ) -> Result<NanoTime, Error> {
        let parsed = NanoDateTimeFormat::new(UTC, pattern, false)?.parse(text)?;
        let nanos = parsed.nanoseconds().rem_euclid(b::NANOS_PER_DAY);
        Ok(NanoTime::intern(nanos))
    }

    /// Returns the nanoseconds since midnight.
    #[inline]
    pub fn nanoseconds(&self) -> i64 {
        self.inner.nanoseconds
    }

    /// Returns the whole milliseconds since midnight.
    #[inline]
    pub fn milliseconds_since_midnight(&self) -> i64 {
        self.nanoseconds() / b::NANOS_PER_MILLI
    }

    /// Returns the hour, in the range `0..=24`.
    ///
    /// Only [`NanoTime::midnight_next_day`] has an hour of `24`.
    #[inline]
    pub fn hour(&self) -> i8 {
        self.clock().hour
    }

    #[inline]
    pub fn minute(&self) -> i8 {
        self.clock().minute
    }

    #[inline]
    pub fn second(&self) -> i8 {
        self.clock().second
    }

    /// Returns the millisecond of the second, in the range `0..=999`.
    #[inline]
    pub fn millisecond(&self) -> i16 {
        // OK because it's less than one thousand.
        (self.clock().subsec_nanosecond / 1_000_000) as i16
    }

    /// Returns the nanosecond of the second, in the range
    /// `0..=999_999_999`.
    #[inline]
    pub fn subsec_nanosecond(&self) -> i32 {
        self.clock().subsec_nanosecond
    }

    /// Returns true when both values are the same interned instance.
    #[inline]
    pub fn ptr_eq(&self, other: &NanoTime) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn clock(&self) -> Hms {
        Hms::from_nanoseconds(self.nanoseconds())
    }
}

civil::comparisons!(NanoTime);

impl Eq for NanoTime {}

impl PartialEq for NanoTime {
    #[inline]
    fn eq(&self, other: &NanoTime) -> bool {
        self.nanoseconds() == other.nanoseconds()
    }
}

impl Ord for NanoTime {
    #[inline]
    fn cmp(&self, other: &NanoTime) -> core::cmp::Ordering {
        self.nanoseconds().cmp(&other.nanoseconds())
    }
}

impl PartialOrd for NanoTime {
    #[inline]
    fn partial_cmp(&self, other: &NanoTime) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::hash::Hash for NanoTime {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.nanoseconds().hash(state);
    }
}

impl Default for NanoTime {
    fn default() -> NanoTime {
        NanoTime::midnight()
    }
}

impl core::fmt::Debug for NanoTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "NanoTime({self})")
    }
}

/// Renders `HH:mm:ss.NNNNNNNNN`.
impl core::fmt::Display for NanoTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let rendered =
            self.inner.rendered.get_or_init(|| civil::render_time(self.clock()));
        f.write_str(rendered)
    }
}

impl core::str::FromStr for NanoTime {
    type Err = Error;

    fn from_str(text: &str) -> Result<NanoTime, Error> {
        NanoTime::parse(text)
    }
}

impl sealed::Sealed for NanoTime {
    fn shift(&self, nanoseconds: i128) -> Result<NanoTime, Error> {
        let day = i128::from(b::NANOS_PER_DAY);
        let sum = i128::from(self.nanoseconds()) + nanoseconds;
        let wrapped = if sum == day { sum } else { sum.rem_euclid(day) };
        // OK because it's in the range 0..=NANOS_PER_DAY.
        Ok(NanoTime::intern(wrapped as i64))
    }

    fn saturate(&self, positive: bool) -> NanoTime {
        if positive {
            NanoTime::midnight_next_day()
        } else {
            NanoTime::midnight()
        }
    }

    fn plus_calendar_unit_with(
        &self,
        _engine: &mut dyn CalendarEngine,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<NanoTime, Error> {
        arith::plus_time_calendar_unit(self, unit, amount)
    }
}

impl Point for NanoTime {
    type Family = sealed::Times;

    #[inline]
    fn nanoseconds(&self) -> i64 {
        NanoTime::nanoseconds(self)
    }
}

/// A builder for a [`NanoTime`].
///
/// Every field is additive and may exceed its usual clock range, so
/// `hour(1).minute(90)` is `02:30`. The total must still land within a
/// single day.
///
/// # Example
///
/// ```
/// use nanotemporals::NanoTime;
///
/// let t = NanoTime::builder().hour(1).minute(90).microsecond(5).build()?;
/// assert_eq!(t.to_string(), "02:30:00.000005000");
///
/// assert!(NanoTime::builder().hour(25).build().is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct NanoTimeBuilder {
    hour: i64,
    minute: i64,
    second: i64,
    millisecond: i64,
    microsecond: i64,
    nanosecond: i64,
}

impl NanoTimeBuilder {
    pub fn hour(self, hour: i64) -> NanoTimeBuilder {
        NanoTimeBuilder { hour, ..self }
    }

    pub fn minute(self, minute: i64) -> NanoTimeBuilder {
        NanoTimeBuilder { minute, ..self }
    }

    pub fn second(self, second: i64) -> NanoTimeBuilder {
        NanoTimeBuilder { second, ..self }
    }

    pub fn millisecond(self, millisecond: i64) -> NanoTimeBuilder {
        NanoTimeBuilder { millisecond, ..self }
    }

    pub fn microsecond(self, microsecond: i64) -> NanoTimeBuilder {
        NanoTimeBuilder { microsecond, ..self }
    }

    pub fn nanosecond(self, nanosecond: i64) -> NanoTimeBuilder {
        NanoTimeBuilder { nanosecond, ..self }
    }

    /// Builds the time, returning a range error when the fields sum to a
    /// value outside of a single day.
    pub fn build(&self) -> Result<NanoTime, Error> {
        let parts = [
            (self.hour, TemporalUnit::Hour),
            (self.minute, TemporalUnit::Minute),
            (self.second, TemporalUnit::Second),
            (self.millisecond, TemporalUnit::Millisecond),
            (self.microsecond, TemporalUnit::Microsecond),
            (self.nanosecond, TemporalUnit::Nanosecond),
        ];
        let total: i128 = parts
            .iter()
            .map(|&(n, unit)| i128::from(n) * i128::from(unit.nanoseconds()))
            .sum();
        let total = i64::try_from(total).map_err(|_| {
            Error::range(
                b::NanosecondsSinceMidnight::WHAT,
                total,
                b::NanosecondsSinceMidnight::MIN,
                b::NanosecondsSinceMidnight::MAX,
            )
        })?;
        NanoTime::from_nanoseconds(total)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for NanoTime {
    fn arbitrary(g: &mut quickcheck::Gen) -> NanoTime {
        let n = <i64 as quickcheck::Arbitrary>::arbitrary(g);
        NanoTime::intern(n.rem_euclid(b::NANOS_PER_DAY + 1))
    }
}
