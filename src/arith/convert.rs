/*!
Conversions between this crate's value types and other representations.

This covers millisecond counts, [`std::time::SystemTime`] and the `jiff`
crate's types. Conversions to coarser representations floor: the
millisecond count of `-1ns` is `-1`, not `0`.

# Example

```
use nanotemporals::{arith::convert, NanoDateTime};

let dt = NanoDateTime::parse("2019.05.21T18:45:07.345")?;
let ts = convert::to_timestamp(&dt)?;
assert_eq!(ts.to_string(), "2019-05-21T18:45:07.345Z");
assert_eq!(convert::from_timestamp(ts)?, dt);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use jiff::{civil, tz::TimeZone, Timestamp, Zoned};

use crate::{
    arith::{self, CalendarPoint, Point},
    civil::{NanoDate, NanoDateTime, NanoTime},
    engine::UTC,
    util::b,
    zoned::ZonedNanoDateTime,
    Error,
};

/// Returns the whole milliseconds of a point, rounding toward negative
/// infinity.
///
/// For a [`NanoTime`], this is the milliseconds since midnight.
pub fn to_milliseconds<P: Point>(point: &P) -> i64 {
    b::split_millis(point.nanoseconds()).0
}

/// Returns the instant of a point as a `SystemTime`.
pub fn to_system_time<P: CalendarPoint>(point: &P) -> Result<SystemTime, Error> {
    let nanos = point.nanoseconds();
    let magnitude = Duration::from_nanos(nanos.unsigned_abs());
    let time = if nanos >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(magnitude)
    } else {
        SystemTime::UNIX_EPOCH.checked_sub(magnitude)
    };
    time.ok_or_else(|| Error::slim_range("system time"))
}

/// Returns the datetime of a `SystemTime`, truncated to nanoseconds.
pub fn from_system_time(time: SystemTime) -> Result<NanoDateTime, Error> {
    let nanos = match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(since) => i128::try_from(since.as_nanos()),
        Err(err) => i128::try_from(err.duration().as_nanos()).map(|n| -n),
    }
    .map_err(|_| Error::slim_range("system time"))?;
    NanoDateTime::from_nanoseconds(narrow(nanos)?)
}

/// Like [`from_system_time`], but attaches a time zone.
pub fn zoned_from_system_time(
    time_zone: &str,
    time: SystemTime,
) -> Result<ZonedNanoDateTime, Error> {
    let datetime = from_system_time(time)?;
    ZonedNanoDateTime::from_datetime(time_zone, &datetime)
}

/// Returns the instant of a point as a `jiff` timestamp.
pub fn to_timestamp<P: CalendarPoint>(point: &P) -> Result<Timestamp, Error> {
    Timestamp::from_nanosecond(i128::from(point.nanoseconds()))
        .map_err(Error::jiff)
}

/// Returns the datetime of a `jiff` timestamp.
pub fn from_timestamp(timestamp: Timestamp) -> Result<NanoDateTime, Error> {
    NanoDateTime::from_nanoseconds(narrow(timestamp.as_nanosecond())?)
}

/// Returns a zoned datetime as a `jiff` zoned datetime in the same time
/// zone.
pub fn to_zoned(datetime: &ZonedNanoDateTime) -> Result<Zoned, Error> {
    let tz = if datetime.time_zone() == UTC {
        TimeZone::UTC
    } else {
        TimeZone::get(datetime.time_zone()).map_err(|err| {
            Error::unknown_time_zone(datetime.time_zone(), err)
        })?
    };
    Ok(to_timestamp(datetime)?.to_zoned(tz))
}

/// Returns the zoned datetime of a `jiff` zoned datetime.
///
/// This requires the `jiff` value's time zone to have an IANA identifier.
/// Fixed offset time zones are rejected.
pub fn from_zoned(zoned: &Zoned) -> Result<ZonedNanoDateTime, Error> {
    let Some(name) = zoned.time_zone().iana_name() else {
        return Err(Error::unknown_time_zone(
            &zoned.offset().to_string(),
            "time zones without an IANA identifier are not supported",
        ));
    };
    let time_zone: Arc<str> = arith::resolve(name)?;
    let nanos = narrow(zoned.timestamp().as_nanosecond())?;
    ZonedNanoDateTime::from_resolved(time_zone, nanos)
}

/// Returns the calendar date of a point in its time zone.
pub fn to_civil_date<P: CalendarPoint>(point: &P) -> Result<civil::Date, Error> {
    let fields = arith::fields(point)?;
    civil::Date::new(fields.year, fields.month, fields.day).map_err(Error::jiff)
}

/// Returns the date of a `jiff` civil date.
pub fn from_civil_date(date: civil::Date) -> Result<NanoDate, Error> {
    arith::date_from_fields(date.year(), date.month(), date.day())
}

/// Returns a time of day as a `jiff` civil time.
///
/// Since `jiff` has no way to represent midnight at the end of a day,
/// [`NanoTime::midnight_next_day`] returns an error.
pub fn to_civil_time(time: &NanoTime) -> Result<civil::Time, Error> {
    let subsec = time.nanoseconds() % b::NANOS_PER_SECOND;
    civil::Time::new(
        time.hour(),
        time.minute(),
        time.second(),
        // OK because it's less than one billion.
        subsec as i32,
    )
    .map_err(Error::jiff)
}

/// Returns the time of day of a `jiff` civil time.
pub fn from_civil_time(time: civil::Time) -> NanoTime {
    let nanos = i64::from(time.hour()) * b::NANOS_PER_HOUR
        + i64::from(time.minute()) * b::NANOS_PER_MINUTE
        + i64::from(time.second()) * b::NANOS_PER_SECOND
        + i64::from(time.subsec_nanosecond());
    NanoTime::intern(nanos)
}

/// Returns the wall clock datetime of a point in its time zone.
pub fn to_civil_datetime<P: CalendarPoint>(
    point: &P,
) -> Result<civil::DateTime, Error> {
    let fields = arith::fields(point)?;
    let (_, remainder) = b::split_millis(point.nanoseconds());
    let subsec = i64::from(fields.millisecond) * b::NANOS_PER_MILLI + remainder;
    civil::DateTime::new(
        fields.year,
        fields.month,
        fields.day,
        fields.hour,
        fields.minute,
        fields.second,
        // OK because it's less than one billion.
        subsec as i32,
    )
    .map_err(Error::jiff)
}

/// Returns the datetime of a `jiff` civil datetime, read as UTC.
pub fn from_civil_datetime(
    datetime: civil::DateTime,
) -> Result<NanoDateTime, Error> {
    let zoned = datetime.to_zoned(TimeZone::UTC).map_err(Error::jiff)?;
    from_timestamp(zoned.timestamp())
}

fn narrow(nanos: i128) -> Result<i64, Error> {
    i64::try_from(nanos).map_err(|_| {
        Error::range("epoch nanoseconds", nanos, i64::MIN, i64::MAX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milliseconds_floor() {
        let dt = NanoDateTime::from_nanoseconds(-1).unwrap();
        assert_eq!(to_milliseconds(&dt), -1);
        let dt = NanoDateTime::from_nanoseconds(1_999_999).unwrap();
        assert_eq!(to_milliseconds(&dt), 1);
        let t = NanoTime::midday();
        assert_eq!(to_milliseconds(&t), 43_200_000);
    }

    #[test]
    fn system_time_roundtrip() {
        let dt = NanoDateTime::parse("1969.07.20T20:17:40.000").unwrap();
        let time = to_system_time(&dt).unwrap();
        assert!(time < SystemTime::UNIX_EPOCH);
        assert_eq!(from_system_time(time).unwrap(), dt);

        let now = from_system_time(SystemTime::now()).unwrap();
        assert!(now.strictly_after(&dt));
    }

    #[test]
    fn jiff_roundtrip() {
        let zoned = ZonedNanoDateTime::parse(
            "Europe/London",
            "2019.05.21T18:45:07.345",
        )
        .unwrap();
        let jiff_zoned = to_zoned(&zoned).unwrap();
        assert_eq!(jiff_zoned.hour(), 18);
        assert_eq!(jiff_zoned.offset().seconds(), 3600);
        assert_eq!(from_zoned(&jiff_zoned).unwrap(), zoned);

        let date = to_civil_date(&zoned).unwrap();
        assert_eq!(date, civil::date(2019, 5, 21));
        assert_eq!(from_civil_date(date).unwrap().to_string(), "2019.05.21");

        let dt = to_civil_datetime(&zoned).unwrap();
        assert_eq!(dt, civil::date(2019, 5, 21).at(18, 45, 7, 345_000_000));
        assert_eq!(
            from_civil_datetime(dt).unwrap().to_string(),
            "2019.05.21T18:45:07.345000000",
        );
    }

    #[test]
    fn civil_time() {
        let t = from_civil_time(civil::time(18, 45, 7, 345_920_678));
        assert_eq!(t.to_string(), "18:45:07.345920678");
        assert_eq!(to_civil_time(&t).unwrap(), civil::time(18, 45, 7, 345_920_678));
        assert!(to_civil_time(&NanoTime::midnight_next_day()).is_err());
    }

    #[test]
    fn out_of_range() {
        let ts = Timestamp::MAX;
        assert!(from_timestamp(ts).unwrap_err().is_range());
        let early = civil::date(1800, 1, 1).at(0, 0, 0, 0);
        assert!(from_civil_datetime(early).unwrap_err().is_range());
    }
}
