use std::sync::{Arc, OnceLock};

use crate::{
    arith::{self, sealed, CalendarPoint, Point},
    cache::Cache,
    civil::{self, Interned, NanoDateTime},
    engine::{CalendarEngine, Weekday, UTC},
    fmt::{NanoDateTimeFormat, DEFAULT_DATE_PATTERN},
    unit::TemporalUnit,
    util::{
        b,
        civil::{self as cal, Ymd},
    },
    zoned::ZonedNanoDate,
    Error,
};

/// A calendar date.
///
/// A `NanoDate` is stored as the nanoseconds since the Unix epoch at
/// midnight UTC starting the date, so its count is always a multiple of the
/// number of nanoseconds in a day. Its year, month and day are the UTC
/// reading of that count.
///
/// Dates range from `1900.01.01` through `2262.04.11`.
///
/// # Example
///
/// ```
/// use nanotemporals::{engine::Weekday, NanoDate};
///
/// let date = NanoDate::builder().year(2019).month(5).day(21).build()?;
/// assert_eq!(date.to_string(), "2019.05.21");
/// assert_eq!(date.weekday(), Weekday::Tuesday);
/// assert_eq!(date.nanoseconds(), 1_558_396_800_000_000_000);
///
/// // Any count within the day truncates to the start of the day.
/// let same = NanoDate::from_nanoseconds(1_558_464_307_345_000_000)?;
/// assert_eq!(same, date);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct NanoDate {
    inner: Arc<Interned>,
}

impl NanoDate {
    /// Creates the date containing the given nanoseconds since the Unix
    /// epoch, read in UTC.
    ///
    /// This returns a range error when `nanoseconds` is before
    /// `1900-01-01T00:00:00Z`.
    pub fn from_nanoseconds(nanoseconds: i64) -> Result<NanoDate, Error> {
        let nanoseconds = b::EpochNanoseconds::check(nanoseconds)?;
        Ok(NanoDate::intern(cal::epoch_day(nanoseconds)))
    }

    /// Creates the date containing the given milliseconds since the Unix
    /// epoch, read in UTC.
    pub fn from_milliseconds(milliseconds: i64) -> Result<NanoDate, Error> {
        let nanoseconds = milliseconds
            .checked_mul(b::NANOS_PER_MILLI)
            .ok_or_else(|| Error::slim_range("epoch milliseconds"))?;
        NanoDate::from_nanoseconds(nanoseconds)
    }

    /// Returns the interned date for a day number already known to be in
    /// range.
    pub(crate) fn intern(epoch_day: i32) -> NanoDate {
        fn cache() -> &'static Cache<i32, NanoDate> {
            static CACHE: OnceLock<Cache<i32, NanoDate>> = OnceLock::new();
            CACHE.get_or_init(Cache::global)
        }

        cache().get_or_insert_with(epoch_day, || {
            let nanoseconds = i64::from(epoch_day) * b::NANOS_PER_DAY;
            NanoDate { inner: Arc::new(Interned::new(nanoseconds)) }
        })
    }

    /// Returns a builder for a date from its year, month and day.
    pub fn builder() -> NanoDateBuilder {
        NanoDateBuilder::default()
    }

    /// Parses a date with the default pattern, `yyyy.MM.dd`.
    pub fn parse(text: &str) -> Result<NanoDate, Error> {
        NanoDate::parse_with_pattern(DEFAULT_DATE_PATTERN, text)
    }

    /// Parses a date with the given pattern.
    ///
    /// Fields are read in UTC. If the pattern has time fields, the time is
    /// dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::NanoDate;
    ///
    /// let date = NanoDate::parse_with_pattern("dd MMM yyyy", "27 May 2019")?;
    /// assert_eq!(date.to_string(), "2019.05.27");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_with_pattern(
        pattern: &str,
        text: &str,
    ) -> Result<NanoDate, Error> {
        let parsed = NanoDateTimeFormat::new(UTC, pattern, false)?.parse(text)?;
        NanoDate::from_nanoseconds(parsed.nanoseconds())
    }

    /// Returns the nanoseconds since the Unix epoch at midnight UTC
    /// starting this date.
    #[inline]
    pub fn nanoseconds(&self) -> i64 {
        self.inner.nanoseconds
    }

    /// Returns the milliseconds since the Unix epoch at midnight UTC
    /// starting this date.
    #[inline]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.nanoseconds() / b::NANOS_PER_MILLI
    }

    pub fn year(&self) -> i16 {
        self.ymd().year
    }

    /// Returns the month, where January is `1`.
    pub fn month(&self) -> i8 {
        self.ymd().month
    }

    pub fn day(&self) -> i8 {
        self.ymd().day
    }

    pub fn weekday(&self) -> Weekday {
        cal::weekday(cal::epoch_day(self.nanoseconds()))
    }

    /// Returns the day of the year, where the first of January is `1`.
    pub fn day_of_year(&self) -> i16 {
        self.ymd().day_of_year()
    }

    /// Returns the datetime at midnight UTC starting this date.
    pub fn to_datetime(&self) -> NanoDateTime {
        NanoDateTime::intern(self.nanoseconds())
    }

    /// Attaches a time zone to this date.
    pub fn to_zoned(&self, time_zone: &str) -> Result<ZonedNanoDate, Error> {
        ZonedNanoDate::from_date(time_zone, self)
    }

    /// Returns true when both values are the same interned instance.
    #[inline]
    pub fn ptr_eq(&self, other: &NanoDate) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn ymd(&self) -> Ymd {
        Ymd::from_nanoseconds(self.nanoseconds())
    }
}

civil::comparisons!(NanoDate);

impl Eq for NanoDate {}

impl PartialEq for NanoDate {
    #[inline]
    fn eq(&self, other: &NanoDate) -> bool {
        self.nanoseconds() == other.nanoseconds()
    }
}

impl Ord for NanoDate {
    #[inline]
    fn cmp(&self, other: &NanoDate) -> core::cmp::Ordering {
        self.nanoseconds().cmp(&other.nanoseconds())
    }
}

impl PartialOrd for NanoDate {
    #[inline]
    fn partial_cmp(&self, other: &NanoDate) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::hash::Hash for NanoDate {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.nanoseconds().hash(state);
    }
}

impl core::fmt::Debug for NanoDate {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "NanoDate({self})")
    }
}

/// Renders `yyyy.MM.dd`.
impl core::fmt::Display for NanoDate {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let rendered =
            self.inner.rendered.get_or_init(|| civil::render_date(self.ymd()));
        f.write_str(rendered)
    }
}

impl core::str::FromStr for NanoDate {
    type Err = Error;

    fn from_str(text: &str) -> Result<NanoDate, Error> {
        NanoDate::parse(text)
    }
}

impl sealed::Sealed for NanoDate {
    fn shift(&self, nanoseconds: i128) -> Result<NanoDate, Error> {
        let sum = civil::shift_epoch(self.nanoseconds(), nanoseconds)?;
        NanoDate::from_nanoseconds(sum)
    }

    fn saturate(&self, positive: bool) -> NanoDate {
        let nanoseconds = if positive {
            b::EpochNanoseconds::MAX
        } else {
            b::EpochNanoseconds::MIN
        };
        NanoDate::intern(cal::epoch_day(nanoseconds))
    }

    fn plus_calendar_unit_with(
        &self,
        engine: &mut dyn CalendarEngine,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<NanoDate, Error> {
        arith::plus_calendar_unit_with(engine, self, unit, amount)
    }
}

impl sealed::CalendarSealed for NanoDate {
    const IS_DATE: bool = true;

    fn rebuild(&self, nanoseconds: i64) -> Result<NanoDate, Error> {
        NanoDate::from_nanoseconds(nanoseconds)
    }
}

impl Point for NanoDate {
    type Family = sealed::Dates;

    #[inline]
    fn nanoseconds(&self) -> i64 {
        NanoDate::nanoseconds(self)
    }
}

impl CalendarPoint for NanoDate {
    fn time_zone(&self) -> &str {
        UTC
    }
}

/// A builder for a [`NanoDate`].
///
/// The year defaults to `1970`, and the month and day default to `1`.
/// Building validates the fields, so February 30th is a range error.
#[derive(Clone, Debug)]
pub struct NanoDateBuilder {
    year: i16,
    month: i8,
    day: i8,
}

impl NanoDateBuilder {
    pub fn year(self, year: i16) -> NanoDateBuilder {
        NanoDateBuilder { year, ..self }
    }

    pub fn month(self, month: i8) -> NanoDateBuilder {
        NanoDateBuilder { month, ..self }
    }

    pub fn day(self, day: i8) -> NanoDateBuilder {
        NanoDateBuilder { day, ..self }
    }

    pub fn build(&self) -> Result<NanoDate, Error> {
        arith::date_from_fields(self.year, self.month, self.day)
    }
}

impl Default for NanoDateBuilder {
    fn default() -> NanoDateBuilder {
        NanoDateBuilder { year: 1970, month: 1, day: 1 }
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for NanoDate {
    fn arbitrary(g: &mut quickcheck::Gen) -> NanoDate {
        let first = cal::epoch_day(b::EpochNanoseconds::MIN);
        let last = cal::epoch_day(b::EpochNanoseconds::MAX);
        let n = <i32 as quickcheck::Arbitrary>::arbitrary(g);
        NanoDate::intern(first + n.rem_euclid(last - first + 1))
    }
}
