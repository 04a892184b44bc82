use std::sync::{Arc, OnceLock};

use crate::{
    arith::{self, sealed, CalendarPoint, Point},
    cache::Cache,
    civil::{self, NanoDate},
    engine::{CalendarEngine, Weekday, UTC},
    fmt::{NanoDateTimeFormat, DEFAULT_DATE_PATTERN},
    unit::TemporalUnit,
    util::{
        b,
        civil::{self as cal, Ymd},
    },
    zoned::ZonedInterned,
    Error,
};

/// A calendar date in a time zone.
///
/// The year, month and day of a `ZonedNanoDate` are encoded exactly as for
/// a [`NanoDate`]: the count is midnight UTC starting the date. The time
/// zone only matters when the date meets the time line. Arithmetic shifts
/// the date at noon in its zone, and combining it with a time of day (see
/// [`ZonedNanoDateTime::from_date_and_time`]) reads the wall clock in its
/// zone.
///
/// [`ZonedNanoDateTime::from_date_and_time`]: crate::ZonedNanoDateTime::from_date_and_time
///
/// # Example
///
/// ```
/// use nanotemporals::{arith, ZonedNanoDate};
///
/// let date = ZonedNanoDate::builder()
///     .time_zone("Europe/London")
///     .year(2019)
///     .month(3)
///     .day(30)
///     .build()?;
/// // The clocks go forward overnight, but the date still moves by a day.
/// let next = arith::plus_days(&date, 1)?;
/// assert_eq!(next.to_string(), "2019.03.31");
/// assert_eq!(format!("{next:?}"), "ZonedNanoDate(2019.03.31, Europe/London)");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ZonedNanoDate {
    inner: Arc<ZonedInterned>,
}

impl ZonedNanoDate {
    /// Creates the date containing the given nanoseconds since the Unix
    /// epoch, read in UTC, in the given time zone.
    pub fn from_nanoseconds(
        time_zone: &str,
        nanoseconds: i64,
    ) -> Result<ZonedNanoDate, Error> {
        ZonedNanoDate::from_resolved(arith::resolve(time_zone)?, nanoseconds)
    }

    pub fn from_milliseconds(
        time_zone: &str,
        milliseconds: i64,
    ) -> Result<ZonedNanoDate, Error> {
        let nanoseconds = milliseconds
            .checked_mul(b::NANOS_PER_MILLI)
            .ok_or_else(|| Error::slim_range("epoch milliseconds"))?;
        ZonedNanoDate::from_nanoseconds(time_zone, nanoseconds)
    }

    /// Attaches a time zone to a date.
    pub fn from_date(
        time_zone: &str,
        date: &NanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        ZonedNanoDate::from_nanoseconds(time_zone, date.nanoseconds())
    }

    /// Creates a date from an identifier that the calendar engine has
    /// already resolved.
    pub(crate) fn from_resolved(
        time_zone: Arc<str>,
        nanoseconds: i64,
    ) -> Result<ZonedNanoDate, Error> {
        let nanoseconds = b::EpochNanoseconds::check(nanoseconds)?;
        Ok(ZonedNanoDate::intern(time_zone, cal::epoch_day(nanoseconds)))
    }

    fn intern(time_zone: Arc<str>, epoch_day: i32) -> ZonedNanoDate {
        fn cache() -> &'static Cache<(Arc<str>, i32), ZonedNanoDate> {
            static CACHE: OnceLock<Cache<(Arc<str>, i32), ZonedNanoDate>> =
                OnceLock::new();
            CACHE.get_or_init(Cache::global)
        }

        let key = (Arc::clone(&time_zone), epoch_day);
        cache().get_or_insert_with(key, || {
            let nanoseconds = i64::from(epoch_day) * b::NANOS_PER_DAY;
            let inner = ZonedInterned::new(time_zone, nanoseconds);
            ZonedNanoDate { inner: Arc::new(inner) }
        })
    }

    /// Returns a builder for a date from its time zone, year, month and
    /// day.
    pub fn builder() -> ZonedNanoDateBuilder {
        ZonedNanoDateBuilder::default()
    }

    /// Parses a date with the default pattern, `yyyy.MM.dd`.
    pub fn parse(time_zone: &str, text: &str) -> Result<ZonedNanoDate, Error> {
        ZonedNanoDate::parse_with_pattern(time_zone, DEFAULT_DATE_PATTERN, text)
    }

    /// Parses a date with the given pattern.
    ///
    /// The year, month and day are taken as written. The time zone is
    /// attached afterwards.
    pub fn parse_with_pattern(
        time_zone: &str,
        pattern: &str,
        text: &str,
    ) -> Result<ZonedNanoDate, Error> {
        let time_zone = arith::resolve(time_zone)?;
        let parsed = NanoDateTimeFormat::new(UTC, pattern, false)?.parse(text)?;
        ZonedNanoDate::from_resolved(time_zone, parsed.nanoseconds())
    }

    /// Returns the nanoseconds since the Unix epoch at midnight UTC
    /// starting this date.
    #[inline]
    pub fn nanoseconds(&self) -> i64 {
        self.inner.nanoseconds
    }

    #[inline]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.nanoseconds() / b::NANOS_PER_MILLI
    }

    /// Returns the IANA identifier of this date's time zone.
    #[inline]
    pub fn time_zone(&self) -> &str {
        &self.inner.time_zone
    }

    #[inline]
    pub(crate) fn time_zone_arc(&self) -> &Arc<str> {
        &self.inner.time_zone
    }

    pub fn year(&self) -> i16 {
        self.ymd().year
    }

    pub fn month(&self) -> i8 {
        self.ymd().month
    }

    pub fn day(&self) -> i8 {
        self.ymd().day
    }

    pub fn weekday(&self) -> Weekday {
        cal::weekday(cal::epoch_day(self.nanoseconds()))
    }

    pub fn day_of_year(&self) -> i16 {
        self.ymd().day_of_year()
    }

    /// Drops the time zone.
    pub fn to_date(&self) -> NanoDate {
        NanoDate::intern(cal::epoch_day(self.nanoseconds()))
    }

    /// Returns true when both values are the same interned instance.
    #[inline]
    pub fn ptr_eq(&self, other: &ZonedNanoDate) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn ymd(&self) -> Ymd {
        Ymd::from_nanoseconds(self.nanoseconds())
    }
}

civil::comparisons!(ZonedNanoDate);

impl core::fmt::Debug for ZonedNanoDate {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "ZonedNanoDate({self}, {})", self.time_zone())
    }
}

/// Renders `yyyy.MM.dd`, without the time zone.
impl core::fmt::Display for ZonedNanoDate {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let rendered =
            self.inner.rendered.get_or_init(|| civil::render_date(self.ymd()));
        f.write_str(rendered)
    }
}

impl sealed::Sealed for ZonedNanoDate {
    fn shift(&self, nanoseconds: i128) -> Result<ZonedNanoDate, Error> {
        let sum = civil::shift_epoch(self.nanoseconds(), nanoseconds)?;
        ZonedNanoDate::from_resolved(Arc::clone(self.time_zone_arc()), sum)
    }

    fn saturate(&self, positive: bool) -> ZonedNanoDate {
        let nanoseconds = if positive {
            b::EpochNanoseconds::MAX
        } else {
            b::EpochNanoseconds::MIN
        };
        let time_zone = Arc::clone(self.time_zone_arc());
        ZonedNanoDate::intern(time_zone, cal::epoch_day(nanoseconds))
    }

    fn plus_calendar_unit_with(
        &self,
        engine: &mut dyn CalendarEngine,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<ZonedNanoDate, Error> {
        arith::plus_calendar_unit_with(engine, self, unit, amount)
    }
}

impl sealed::CalendarSealed for ZonedNanoDate {
    const IS_DATE: bool = true;

    fn rebuild(&self, nanoseconds: i64) -> Result<ZonedNanoDate, Error> {
        ZonedNanoDate::from_resolved(Arc::clone(self.time_zone_arc()), nanoseconds)
    }
}

impl Point for ZonedNanoDate {
    type Family = sealed::Dates;

    #[inline]
    fn nanoseconds(&self) -> i64 {
        ZonedNanoDate::nanoseconds(self)
    }
}

impl CalendarPoint for ZonedNanoDate {
    fn time_zone(&self) -> &str {
        ZonedNanoDate::time_zone(self)
    }
}

/// A builder for a [`ZonedNanoDate`].
///
/// The time zone defaults to `UTC`, the year to `1970`, and the month and
/// day to `1`.
#[derive(Clone, Debug)]
pub struct ZonedNanoDateBuilder {
    time_zone: String,
    year: i16,
    month: i8,
    day: i8,
}

impl ZonedNanoDateBuilder {
    pub fn time_zone(self, time_zone: &str) -> ZonedNanoDateBuilder {
        ZonedNanoDateBuilder { time_zone: time_zone.to_string(), ..self }
    }

    pub fn year(self, year: i16) -> ZonedNanoDateBuilder {
        ZonedNanoDateBuilder { year, ..self }
    }

    pub fn month(self, month: i8) -> ZonedNanoDateBuilder {
        ZonedNanoDateBuilder { month, ..self }
    }

    pub fn day(self, day: i8) -> ZonedNanoDateBuilder {
        ZonedNanoDateBuilder { day, ..self }
    }

    pub fn build(&self) -> Result<ZonedNanoDate, Error> {
        arith::zoned_date_from_fields(
            &self.time_zone,
            self.year,
            self.month,
            self.day,
        )
    }
}

impl Default for ZonedNanoDateBuilder {
    fn default() -> ZonedNanoDateBuilder {
        ZonedNanoDateBuilder {
            time_zone: UTC.to_string(),
            year: 1970,
            month: 1,
            day: 1,
        }
    }
}
