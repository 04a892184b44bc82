use std::sync::{Arc, OnceLock};

use crate::{
    arith::{self, sealed, CalendarPoint, Point},
    cache::Cache,
    civil::{self, Interned, NanoDate, NanoTime},
    engine::{CalendarEngine, UTC},
    fmt::{NanoDateTimeFormat, DEFAULT_DATETIME_PATTERN},
    unit::TemporalUnit,
    util::{
        b,
        civil::{self as cal, Hms, Ymd},
    },
    zoned::ZonedNanoDateTime,
    Error,
};

/// An instant with nanosecond precision, read in UTC.
///
/// A `NanoDateTime` is a signed 64-bit count of nanoseconds since the Unix
/// epoch. Its range is [`NanoDateTime::min`] (`1900-01-01T00:00:00Z`)
/// through [`NanoDateTime::max`] (`2262-04-11T23:47:16.854775807Z`).
///
/// A datetime is exactly a [`NanoDate`] plus a [`NanoTime`]:
///
/// ```
/// use nanotemporals::NanoDateTime;
///
/// let dt = NanoDateTime::parse("2019.05.21T18:45:07.345")?;
/// assert_eq!(dt.date().to_string(), "2019.05.21");
/// assert_eq!(dt.time().to_string(), "18:45:07.345000000");
/// assert_eq!(
///     NanoDateTime::from_date_and_time(&dt.date(), &dt.time())?,
///     dt,
/// );
///
/// // A different time zone changes the rendering, not the instant.
/// assert_eq!(
///     dt.to_string_in("Asia/Tokyo")?,
///     "2019.05.22T03:45:07.345000000",
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct NanoDateTime {
    inner: Arc<Interned>,
}

impl NanoDateTime {
    /// Creates a datetime from nanoseconds since the Unix epoch.
    ///
    /// This returns a range error for counts before
    /// `1900-01-01T00:00:00Z`.
    pub fn from_nanoseconds(nanoseconds: i64) -> Result<NanoDateTime, Error> {
        let nanoseconds = b::EpochNanoseconds::check(nanoseconds)?;
        Ok(NanoDateTime::intern(nanoseconds))
    }

    /// Creates a datetime from milliseconds since the Unix epoch.
    pub fn from_milliseconds(
        milliseconds: i64,
    ) -> Result<NanoDateTime, Error> {
        let nanoseconds = milliseconds
            .checked_mul(b::NANOS_PER_MILLI)
            .ok_or_else(|| Error::slim_range("epoch milliseconds"))?;
        NanoDateTime::from_nanoseconds(nanoseconds)
    }

    pub(crate) fn intern(nanoseconds: i64) -> NanoDateTime {
        fn cache() -> &'static Cache<i64, NanoDateTime> {
            static CACHE: OnceLock<Cache<i64, NanoDateTime>> = OnceLock::new();
            CACHE.get_or_init(Cache::global)
        }

        debug_assert!(nanoseconds >= b::EpochNanoseconds::MIN);
        cache().get_or_insert_with(nanoseconds, || NanoDateTime {
            inner: Arc::new(Interned::new(nanoseconds)),
        })
    }

    /// Returns the earliest datetime, `1900.01.01T00:00:00.000000000`.
    pub fn min() -> NanoDateTime {
        NanoDateTime::intern(b::EpochNanoseconds::MIN)
    }

    /// Returns the latest datetime, `2262.04.11T23:47:16.854775807`.
    pub fn max() -> NanoDateTime {
        NanoDateTime::intern(b::EpochNanoseconds::MAX)
    }

    /// Combines a date with a time of day, in UTC.
    ///
    /// Combining with [`NanoTime::midnight_next_day`] yields midnight at the
    /// start of the following day. This returns a range error when the
    /// result is past [`NanoDateTime::max`].
    pub fn from_date_and_time(
        date: &NanoDate,
        time: &NanoTime,
    ) -> Result<NanoDateTime, Error> {
        let nanoseconds = date
            .nanoseconds()
            .checked_add(time.nanoseconds())
            .ok_or_else(|| arith::overflow("combining a date and a time"))?;
        NanoDateTime::from_nanoseconds(nanoseconds)
    }

    /// Parses a datetime with the default pattern,
    /// `yyyy.MM.dd'T'HH:mm:ss.SSS`, read in UTC.
    pub fn parse(text: &str) -> Result<NanoDateTime, Error> {
        NanoDateTime::parse_with_pattern(DEFAULT_DATETIME_PATTERN, text)
    }

    /// Parses a datetime with the given pattern.
    ///
    /// Fields are read in UTC, unless the pattern has an offset field.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::NanoDateTime;
    ///
    /// let dt = NanoDateTime::parse_with_pattern(
    ///     "yyyy-MM-dd HH:mm Z",
    ///     "2019-05-21 19:45 +0100",
    /// )?;
    /// assert_eq!(dt.to_string(), "2019.05.21T18:45:00.000000000");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_with_pattern(
        pattern: &str,
        text: &str,
    ) -> Result<NanoDateTime, Error> {
        let parsed = NanoDateTimeFormat::new(UTC, pattern, false)?.parse(text)?;
        Ok(parsed.to_datetime())
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

    /// Returns the UTC date of this datetime.
    pub fn date(&self) -> NanoDate {
        NanoDate::intern(cal::epoch_day(self.nanoseconds()))
    }

    /// Returns the UTC time of day of this datetime.
    pub fn time(&self) -> NanoTime {
        NanoTime::intern(self.nanoseconds().rem_euclid(b::NANOS_PER_DAY))
    }

    /// Attaches a time zone to this instant.
    ///
    /// This returns a configuration error for an unknown time zone.
    pub fn to_zoned(
        &self,
        time_zone: &str,
    ) -> Result<ZonedNanoDateTime, Error> {
        ZonedNanoDateTime::from_datetime(time_zone, self)
    }

    /// Renders this instant on the wall clock of the given time zone, in
    /// the same format as `Display`.
    pub fn to_string_in(&self, time_zone: &str) -> Result<String, Error> {
        let fields = arith::fields_in(time_zone, self)?;
        Ok(civil::render_fields(&fields, self.nanoseconds()))
    }

    /// Returns true when both values are the same interned instance.
    #[inline]
    pub fn ptr_eq(&self, other: &NanoDateTime) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

civil::comparisons!(NanoDateTime);

impl Eq for NanoDateTime {}

impl PartialEq for NanoDateTime {
    #[inline]
    fn eq(&self, other: &NanoDateTime) -> bool {
        self.nanoseconds() == other.nanoseconds()
    }
}

impl Ord for NanoDateTime {
    #[inline]
    fn cmp(&self, other: &NanoDateTime) -> core::cmp::Ordering {
        self.nanoseconds().cmp(&other.nanoseconds())
    }
}

impl PartialOrd for NanoDateTime {
    #[inline]
    fn partial_cmp(
        &self,
        other: &NanoDateTime,
    ) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::hash::Hash for NanoDateTime {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.nanoseconds().hash(state);
    }
}

impl core::fmt::Debug for NanoDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "NanoDateTime({self})")
    }
}

/// Renders `yyyy.MM.ddTHH:mm:ss.NNNNNNNNN` in UTC.
impl core::fmt::Display for NanoDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let rendered = self.inner.rendered.get_or_init(|| {
            let nanos = self.nanoseconds();
            let ymd = Ymd::from_nanoseconds(nanos);
            let hms = Hms::from_nanoseconds(nanos.rem_euclid(b::NANOS_PER_DAY));
            civil::render_datetime(ymd, hms)
        });
        f.write_str(rendered)
    }
}

impl core::str::FromStr for NanoDateTime {
    type Err = Error;

    fn from_str(text: &str) -> Result<NanoDateTime, Error> {
        NanoDateTime::parse(text)
    }
}

impl sealed::Sealed for NanoDateTime {
    fn shift(&self, nanoseconds: i128) -> Result<NanoDateTime, Error> {
        let sum = civil::shift_epoch(self.nanoseconds(), nanoseconds)?;
        NanoDateTime::from_nanoseconds(sum)
    }

    fn saturate(&self, positive: bool) -> NanoDateTime {
        if positive {
            NanoDateTime::max()
        } else {
            NanoDateTime::min()
        }
    }

    fn plus_calendar_unit_with(
        &self,
        engine: &mut dyn CalendarEngine,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<NanoDateTime, Error> {
        arith::plus_calendar_unit_with(engine, self, unit, amount)
    }
}

impl sealed::CalendarSealed for NanoDateTime {
    const IS_DATE: bool = false;

    fn rebuild(&self, nanoseconds: i64) -> Result<NanoDateTime, Error> {
        NanoDateTime::from_nanoseconds(nanoseconds)
    }
}

impl Point for NanoDateTime {
    type Family = sealed::DateTimes;

    #[inline]
    fn nanoseconds(&self) -> i64 {
        NanoDateTime::nanoseconds(self)
    }
}

impl CalendarPoint for NanoDateTime {
    fn time_zone(&self) -> &str {
        UTC
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for NanoDateTime {
    fn arbitrary(g: &mut quickcheck::Gen) -> NanoDateTime {
        let min = i128::from(b::EpochNanoseconds::MIN);
        let span = i128::from(b::EpochNanoseconds::MAX) - min + 1;
        let n = i128::from(<i64 as quickcheck::Arbitrary>::arbitrary(g));
        // OK because the result is within the bounds of a datetime.
        NanoDateTime::intern((min + n.rem_euclid(span)) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert_eq!(
            NanoDateTime::min().to_string(),
            "1900.01.01T00:00:00.000000000",
        );
        assert_eq!(
            NanoDateTime::max().to_string(),
            "2262.04.11T23:47:16.854775807",
        );
        let err = NanoDateTime::from_nanoseconds(i64::MIN).unwrap_err();
        insta::assert_snapshot!(
            err,
            @"parameter 'epoch nanoseconds' with value -9223372036854775808 is not in the required range of -2208988800000000000..=9223372036854775807"
        );
        assert!(NanoDateTime::from_milliseconds(i64::MAX).is_err());
    }

    #[test]
    fn date_plus_time() {
        let dt = NanoDateTime::from_nanoseconds(-1).unwrap();
        assert_eq!(dt.to_string(), "1969.12.31T23:59:59.999999999");
        assert_eq!(dt.date().to_string(), "1969.12.31");
        assert_eq!(dt.time().to_string(), "23:59:59.999999999");
        assert_eq!(dt.epoch_milliseconds(), -1);

        let date = NanoDate::parse("2019.12.31").unwrap();
        let end = NanoDateTime::from_date_and_time(
            &date,
            &NanoTime::midnight_next_day(),
        )
        .unwrap();
        assert_eq!(end.to_string(), "2020.01.01T00:00:00.000000000");

        let last = NanoDateTime::max().date();
        let noon =
            NanoDateTime::from_date_and_time(&last, &NanoTime::midday()).unwrap();
        assert_eq!(noon.to_string(), "2262.04.11T12:00:00.000000000");
        let latest =
            NanoDateTime::from_date_and_time(&last, &NanoDateTime::max().time())
                .unwrap();
        assert_eq!(latest, NanoDateTime::max());

        let late = NanoTime::parse("23:47:16.855").unwrap();
        let err = NanoDateTime::from_date_and_time(&last, &late).unwrap_err();
        assert!(err.is_range());
        let err = NanoDateTime::from_date_and_time(
            &last,
            &NanoTime::midnight_next_day(),
        )
        .unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn rendering_in_time_zones() {
        let _ = env_logger::try_init();

        let dt = NanoDateTime::from_nanoseconds(1_558_464_307_345_920_678)
            .unwrap();
        assert_eq!(dt.to_string(), "2019.05.21T18:45:07.345920678");
        assert_eq!(
            dt.to_string_in("Europe/London").unwrap(),
            "2019.05.21T19:45:07.345920678",
        );
        assert_eq!(
            dt.to_string_in("America/New_York").unwrap(),
            "2019.05.21T14:45:07.345920678",
        );
        assert!(dt.to_string_in("Nowhere/Special").unwrap_err().is_configuration());
        assert_eq!(
            format!("{dt:?}"),
            "NanoDateTime(2019.05.21T18:45:07.345920678)",
        );
    }

    #[test]
    fn zoned_keeps_the_instant() {
        let dt = NanoDateTime::parse("2019.05.21T18:45:07.345").unwrap();
        let zoned = dt.to_zoned("Europe/London").unwrap();
        assert_eq!(zoned.nanoseconds(), dt.nanoseconds());
        assert_eq!(zoned.to_datetime(), dt);
    }

    quickcheck::quickcheck! {
        fn prop_nanoseconds_roundtrip(dt: NanoDateTime) -> bool {
            let got = NanoDateTime::from_nanoseconds(dt.nanoseconds()).unwrap();
            got == dt && got.nanoseconds() == dt.nanoseconds()
        }

        fn prop_date_plus_time(dt: NanoDateTime) -> bool {
            NanoDateTime::from_date_and_time(&dt.date(), &dt.time()).ok()
                == Some(dt)
        }

        fn prop_ordering_is_total(a: NanoDateTime, b: NanoDateTime) -> bool {
            let count = [
                a.strictly_before(&b),
                a == b,
                a.strictly_after(&b),
            ]
            .iter()
            .filter(|&&x| x)
            .count();
            count == 1 && a.before_or_equal(&b) == !a.strictly_after(&b)
        }
    }
}
