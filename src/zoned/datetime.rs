use std::sync::{Arc, OnceLock};

use crate::{
    arith::{self, sealed, CalendarPoint, Point},
    cache::Cache,
    civil::{self, NanoDate, NanoDateTime, NanoTime},
    engine::CalendarEngine,
    fmt::{NanoDateTimeFormat, Parsed, DEFAULT_DATETIME_PATTERN},
    unit::TemporalUnit,
    util::b,
    zoned::{ZonedInterned, ZonedNanoDate},
    Error,
};

/// An instant with nanosecond precision, read in a time zone.
///
/// The calendar fields, the rendering and any arithmetic on calendar
/// fields follow the wall clock of the time zone. Fixed-duration
/// arithmetic doesn't:
///
/// ```
/// use nanotemporals::{arith, ZonedNanoDateTime};
///
/// let zdt = ZonedNanoDateTime::parse("Europe/London", "2019.03.30T12:00:00.000")?;
/// // A calendar day keeps the wall clock time across the DST transition.
/// let day = arith::plus_days(&zdt, 1)?;
/// assert_eq!(day.to_string(), "2019.03.31T12:00:00.000000000");
/// // Twenty four hours don't.
/// let hours = arith::plus_hours(&zdt, 24)?;
/// assert_eq!(hours.to_string(), "2019.03.31T13:00:00.000000000");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ZonedNanoDateTime {
    inner: Arc<ZonedInterned>,
}

impl ZonedNanoDateTime {
    /// Creates a zoned datetime from nanoseconds since the Unix epoch.
    ///
    /// This returns a configuration error for an unknown time zone and a
    /// range error for a count before `1900-01-01T00:00:00Z`.
    pub fn from_nanoseconds(
        time_zone: &str,
        nanoseconds: i64,
    ) -> Result<ZonedNanoDateTime, Error> {
        ZonedNanoDateTime::from_resolved(arith::resolve(time_zone)?, nanoseconds)
    }

    pub fn from_milliseconds(
        time_zone: &str,
        milliseconds: i64,
    ) -> Result<ZonedNanoDateTime, Error> {
        let nanoseconds = milliseconds
            .checked_mul(b::NANOS_PER_MILLI)
            .ok_or_else(|| Error::slim_range("epoch milliseconds"))?;
        ZonedNanoDateTime::from_nanoseconds(time_zone, nanoseconds)
    }

    /// Attaches a time zone to an instant.
    pub fn from_datetime(
        time_zone: &str,
        datetime: &NanoDateTime,
    ) -> Result<ZonedNanoDateTime, Error> {
        ZonedNanoDateTime::from_nanoseconds(time_zone, datetime.nanoseconds())
    }

    /// Returns the instant at which the wall clock in the date's time zone
    /// shows the given date and time.
    ///
    /// A wall clock time skipped by a daylight saving time transition is
    /// moved forward by the length of the gap. An ambiguous one resolves to
    /// the earlier instant.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{NanoTime, ZonedNanoDate, ZonedNanoDateTime};
    ///
    /// let date = ZonedNanoDate::parse("America/New_York", "2019.05.21")?;
    /// let time = NanoTime::parse("14:45:07.345")?;
    /// let zdt = ZonedNanoDateTime::from_date_and_time(&date, &time)?;
    /// assert_eq!(zdt.to_datetime().to_string(), "2019.05.21T18:45:07.345000000");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_date_and_time(
        date: &ZonedNanoDate,
        time: &NanoTime,
    ) -> Result<ZonedNanoDateTime, Error> {
        arith::with_default(|arith| arith.zoned_from_date_and_time(date, time))
    }

    /// Like [`ZonedNanoDateTime::from_date_and_time`], but the date doesn't
    /// carry its time zone yet.
    pub fn from_local(
        time_zone: &str,
        date: &NanoDate,
        time: &NanoTime,
    ) -> Result<ZonedNanoDateTime, Error> {
        let date = ZonedNanoDate::from_date(time_zone, date)?;
        ZonedNanoDateTime::from_date_and_time(&date, time)
    }

    /// Creates a datetime from an identifier that the calendar engine has
    /// already resolved.
    pub(crate) fn from_resolved(
        time_zone: Arc<str>,
        nanoseconds: i64,
    ) -> Result<ZonedNanoDateTime, Error> {
        let nanoseconds = b::EpochNanoseconds::check(nanoseconds)?;
        Ok(ZonedNanoDateTime::intern(time_zone, nanoseconds))
    }

    fn intern(time_zone: Arc<str>, nanoseconds: i64) -> ZonedNanoDateTime {
        fn cache() -> &'static Cache<(Arc<str>, i64), ZonedNanoDateTime> {
            static CACHE: OnceLock<Cache<(Arc<str>, i64), ZonedNanoDateTime>> =
                OnceLock::new();
            CACHE.get_or_init(Cache::global)
        }

        let key = (Arc::clone(&time_zone), nanoseconds);
        cache().get_or_insert_with(key, || {
            let inner = ZonedInterned::new(time_zone, nanoseconds);
            ZonedNanoDateTime { inner: Arc::new(inner) }
        })
    }

    /// Parses a datetime with the default pattern,
    /// `yyyy.MM.dd'T'HH:mm:ss.SSS`, on the wall clock of the given time
    /// zone.
    pub fn parse(
        time_zone: &str,
        text: &str,
    ) -> Result<ZonedNanoDateTime, Error> {
        ZonedNanoDateTime::parse_with_pattern(
            time_zone,
            DEFAULT_DATETIME_PATTERN,
            text,
        )
    }

    /// Parses a datetime with the given pattern.
    ///
    /// Fields are read on the wall clock of the given time zone, unless
    /// the pattern has an offset field, which then fixes the instant. The
    /// result is always in the given time zone.
    pub fn parse_with_pattern(
        time_zone: &str,
        pattern: &str,
        text: &str,
    ) -> Result<ZonedNanoDateTime, Error> {
        let format = NanoDateTimeFormat::new(time_zone, pattern, true)?;
        match format.parse(text)? {
            Parsed::Zoned(zdt) => Ok(zdt),
            Parsed::DateTime(dt) => {
                ZonedNanoDateTime::from_datetime(time_zone, &dt)
            }
        }
    }

    /// Returns the nanoseconds since the Unix epoch.
    #[inline]
    pub fn nanoseconds(&self) -> i64 {
        self.inner.nanoseconds
    }

    /// Returns the milliseconds since the Unix epoch, rounding toward
    /// negative infinity.
    #[inline]
    pub fn epoch_milliseconds(&self) -> i64 {
        b::split_millis(self.nanoseconds()).0
    }

    /// Returns the IANA identifier of this datetime's time zone.
    #[inline]
    pub fn time_zone(&self) -> &str {
        &self.inner.time_zone
    }

    #[inline]
    pub(crate) fn time_zone_arc(&self) -> &Arc<str> {
        &self.inner.time_zone
    }

    /// Returns the date on the wall clock, in the same time zone.
    pub fn date(&self) -> Result<ZonedNanoDate, Error> {
        arith::with_default(|arith| arith.local_date(self))
    }

    /// Returns the time on the wall clock.
    pub fn time(&self) -> Result<NanoTime, Error> {
        arith::with_default(|arith| arith.local_time(self))
    }

    /// Drops the time zone, keeping the instant.
    pub fn to_datetime(&self) -> NanoDateTime {
        NanoDateTime::intern(self.nanoseconds())
    }

    /// Returns the abbreviation of the time zone at this instant, like
    /// `BST`.
    pub fn abbreviation(&self) -> Result<String, Error> {
        arith::with_default(|arith| arith.abbreviation(self))
    }

    /// Returns true when both values are the same interned instance.
    #[inline]
    pub fn ptr_eq(&self, other: &ZonedNanoDateTime) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn render(&self) -> String {
        match arith::fields(self) {
            Ok(fields) => civil::render_fields(&fields, self.nanoseconds()),
            Err(_err) => {
                debug!(
                    "failed to read calendar fields of {nanos}ns in \
                     time zone {tz:?}, rendering in UTC instead: {_err}",
                    nanos = self.nanoseconds(),
                    tz = self.time_zone(),
                );
                self.to_datetime().to_string()
            }
        }
    }
}

civil::comparisons!(ZonedNanoDateTime);

impl core::fmt::Debug for ZonedNanoDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "ZonedNanoDateTime({self}, {})", self.time_zone())
    }
}

/// Renders `yyyy.MM.ddTHH:mm:ss.NNNNNNNNN` on the wall clock of the time
/// zone.
impl core::fmt::Display for ZonedNanoDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.inner.rendered.get_or_init(|| self.render()))
    }
}

impl sealed::Sealed for ZonedNanoDateTime {
    fn shift(&self, nanoseconds: i128) -> Result<ZonedNanoDateTime, Error> {
        let sum = civil::shift_epoch(self.nanoseconds(), nanoseconds)?;
        ZonedNanoDateTime::from_resolved(Arc::clone(self.time_zone_arc()), sum)
    }

    fn saturate(&self, positive: bool) -> ZonedNanoDateTime {
        let nanoseconds = if positive {
            b::EpochNanoseconds::MAX
        } else {
            b::EpochNanoseconds::MIN
        };
        ZonedNanoDateTime::intern(Arc::clone(self.time_zone_arc()), nanoseconds)
    }

    fn plus_calendar_unit_with(
        &self,
        engine: &mut dyn CalendarEngine,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<ZonedNanoDateTime, Error> {
        arith::plus_calendar_unit_with(engine, self, unit, amount)
    }
}

impl sealed::CalendarSealed for ZonedNanoDateTime {
    const IS_DATE: bool = false;

    fn rebuild(&self, nanoseconds: i64) -> Result<ZonedNanoDateTime, Error> {
        ZonedNanoDateTime::from_resolved(
            Arc::clone(self.time_zone_arc()),
            nanoseconds,
        )
    }
}

impl Point for ZonedNanoDateTime {
    type Family = sealed::DateTimes;

    #[inline]
    fn nanoseconds(&self) -> i64 {
        ZonedNanoDateTime::nanoseconds(self)
    }
}

impl CalendarPoint for ZonedNanoDateTime {
    fn time_zone(&self) -> &str {
        ZonedNanoDateTime::time_zone(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock() {
        let _ = env_logger::try_init();

        let zdt = ZonedNanoDateTime::from_nanoseconds(
            "Europe/London",
            1_558_464_307_345_920_678,
        )
        .unwrap();
        assert_eq!(zdt.to_string(), "2019.05.21T19:45:07.345920678");
        assert_eq!(zdt.date().unwrap().to_string(), "2019.05.21");
        assert_eq!(zdt.date().unwrap().time_zone(), "Europe/London");
        assert_eq!(zdt.time().unwrap().to_string(), "19:45:07.345920678");
        assert_eq!(zdt.abbreviation().unwrap(), "BST");
        assert_eq!(
            ZonedNanoDateTime::from_date_and_time(
                &zdt.date().unwrap(),
                &zdt.time().unwrap(),
            )
            .unwrap(),
            zdt,
        );
    }

    #[test]
    fn local_date_can_differ_from_utc() {
        let zdt = ZonedNanoDateTime::parse(
            "Asia/Tokyo",
            "2019.05.22T03:45:07.345",
        )
        .unwrap();
        assert_eq!(zdt.to_datetime().date().to_string(), "2019.05.21");
        assert_eq!(zdt.date().unwrap().to_string(), "2019.05.22");
    }

    #[test]
    fn equality_and_ordering() {
        let dt = NanoDateTime::parse("2019.05.21T18:45:07.345").unwrap();
        let london = dt.to_zoned("Europe/London").unwrap();
        let tokyo = dt.to_zoned("Asia/Tokyo").unwrap();
        assert_ne!(london, tokyo);
        assert!(tokyo < london);
        assert!(london.after_or_equal(&tokyo));
        assert!(!london.strictly_after(&tokyo));
        assert_eq!(london.to_datetime(), tokyo.to_datetime());

        let again =
            ZonedNanoDateTime::from_datetime("Europe/London", &dt).unwrap();
        assert!(again.ptr_eq(&london));
    }

    #[test]
    fn from_local_skips_gaps() {
        let date = NanoDate::parse("2019.03.31").unwrap();
        let time = NanoTime::parse("01:30:00.000").unwrap();
        let zdt =
            ZonedNanoDateTime::from_local("Europe/London", &date, &time).unwrap();
        assert_eq!(zdt.to_string(), "2019.03.31T02:30:00.000000000");

        let end = ZonedNanoDateTime::from_local(
            "Europe/London",
            &date,
            &NanoTime::midnight_next_day(),
        )
        .unwrap();
        assert_eq!(end.to_string(), "2019.04.01T00:00:00.000000000");
    }
}
